//! GeoJSON input, Mercator fitting and planar geometry on projected shapes.

use bevy::math::Vec2;
use serde::Deserialize;

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// GeoJSON
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<FeatureProperties>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn name(&self) -> Option<&str> {
        self.properties.as_ref()?.name.as_deref()
    }

    pub fn postal(&self) -> Option<&str> {
        self.properties.as_ref()?.postal.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub postal: Option<String>,
}

/// Positions are `[longitude, latitude, ..]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Vec<f64>),
    MultiPoint(Vec<Vec<f64>>),
    LineString(Vec<Vec<f64>>),
    MultiLineString(Vec<Vec<Vec<f64>>>),
    Polygon(Vec<Vec<Vec<f64>>>),
    MultiPolygon(Vec<Vec<Vec<Vec<f64>>>>),
}

impl Geometry {
    fn for_each_position(&self, f: &mut impl FnMut(f64, f64)) {
        let mut visit = |p: &Vec<f64>| {
            if let [lon, lat, ..] = p.as_slice() {
                f(*lon, *lat);
            }
        };
        match self {
            Geometry::Point(p) => visit(p),
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.iter().for_each(visit),
            Geometry::MultiLineString(ls) | Geometry::Polygon(ls) => {
                ls.iter().flatten().for_each(visit)
            }
            Geometry::MultiPolygon(polys) => polys.iter().flatten().flatten().for_each(visit),
        }
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

const MAX_LATITUDE: f64 = 85.0;

fn mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lambda = lon.to_radians();
    let phi = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let y = (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln();
    // screen y grows downward
    (lambda, -y)
}

/// Spherical Mercator scaled and translated so a collection fills a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorFit {
    scale: f64,
    translate: (f64, f64),
}

impl MercatorFit {
    /// Fit `collection` inside `size`, preserving aspect ratio and centering
    /// the slack. Returns `None` for a collection without positions.
    pub fn fit_size(size: Vec2, collection: &FeatureCollection) -> Option<Self> {
        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for geometry in collection.features.iter().filter_map(|f| f.geometry.as_ref()) {
            geometry.for_each_position(&mut |lon, lat| {
                let (x, y) = mercator(lon, lat);
                min = (min.0.min(x), min.1.min(y));
                max = (max.0.max(x), max.1.max(y));
            });
        }
        if !min.0.is_finite() || !max.0.is_finite() {
            return None;
        }
        let (w, h) = (size.x as f64, size.y as f64);
        let dx = (max.0 - min.0).max(f64::EPSILON);
        let dy = (max.1 - min.1).max(f64::EPSILON);
        let scale = (w / dx).min(h / dy);
        let translate = (
            (w - scale * (max.0 + min.0)) / 2.0,
            (h - scale * (max.1 + min.1)) / 2.0,
        );
        Some(Self { scale, translate })
    }

    pub fn project(&self, lon: f64, lat: f64) -> Vec2 {
        let (x, y) = mercator(lon, lat);
        Vec2::new(
            (x * self.scale + self.translate.0) as f32,
            (y * self.scale + self.translate.1) as f32,
        )
    }

    fn project_ring(&self, ring: &[Vec<f64>]) -> Vec<Vec2> {
        ring.iter()
            .filter_map(|p| match p.as_slice() {
                [lon, lat, ..] => Some(self.project(*lon, *lat)),
                _ => None,
            })
            .collect()
    }

    /// Project one feature into local box coordinates.
    pub fn project_feature(&self, feature: &Feature) -> ProjectedFeature {
        let mut shape = ProjectedFeature {
            name: feature.name().map(str::to_string),
            postal: feature.postal().map(str::to_string),
            polygons: Vec::new(),
            lines: Vec::new(),
        };
        match &feature.geometry {
            Some(Geometry::Polygon(rings)) => {
                shape.polygons.push(rings.iter().map(|r| self.project_ring(r)).collect());
            }
            Some(Geometry::MultiPolygon(polys)) => {
                for rings in polys {
                    shape
                        .polygons
                        .push(rings.iter().map(|r| self.project_ring(r)).collect());
                }
            }
            Some(Geometry::LineString(line)) => shape.lines.push(self.project_ring(line)),
            Some(Geometry::MultiLineString(lines)) => {
                shape.lines.extend(lines.iter().map(|l| self.project_ring(l)));
            }
            Some(Geometry::Point(_)) | Some(Geometry::MultiPoint(_)) | None => {}
        }
        shape
    }
}

// ---------------------------------------------------------------------------
// Projected shapes
// ---------------------------------------------------------------------------

/// Rings of one polygon: exterior first, then holes.
pub type Polygon = Vec<Vec<Vec2>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedFeature {
    pub name: Option<String>,
    pub postal: Option<String>,
    pub polygons: Vec<Polygon>,
    pub lines: Vec<Vec<Vec2>>,
}

/// One horizontal fill strip covering `[x0, x1] × [y0, y1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strip {
    pub y0: f32,
    pub y1: f32,
    pub x0: f32,
    pub x1: f32,
}

impl ProjectedFeature {
    fn rings(&self) -> impl Iterator<Item = &Vec<Vec2>> {
        self.polygons.iter().flatten()
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let mut points = self.rings().flatten().chain(self.lines.iter().flatten());
        let first = *points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))))
    }

    /// Area-weighted centroid; holes subtract. Falls back to the bounds
    /// center for degenerate shapes.
    pub fn centroid(&self) -> Option<Vec2> {
        let mut weighted = Vec2::ZERO;
        let mut total = 0.0f32;
        for polygon in &self.polygons {
            for (k, ring) in polygon.iter().enumerate() {
                let (area, center) = ring_area_centroid(ring);
                let area = if k == 0 { area.abs() } else { -area.abs() };
                weighted += center * area;
                total += area;
            }
        }
        if total.abs() > 1e-6 {
            Some(weighted / total)
        } else {
            self.bounds().map(|(lo, hi)| (lo + hi) * 0.5)
        }
    }

    /// Even-odd point containment over every ring.
    pub fn contains(&self, point: Vec2) -> bool {
        let mut inside = false;
        for ring in self.rings() {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let (a, b) = (ring[i], ring[j]);
                if (a.y > point.y) != (b.y > point.y)
                    && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
                {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }

    /// Interior x-intervals along the horizontal line at `y` (even-odd).
    pub fn spans_at(&self, y: f32) -> Vec<(f32, f32)> {
        let mut xs = Vec::new();
        for ring in self.rings() {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let (a, b) = (ring[i], ring[j]);
                if (a.y > y) != (b.y > y) {
                    xs.push(a.x + (y - a.y) / (b.y - a.y) * (b.x - a.x));
                }
                j = i;
            }
        }
        xs.sort_by(f32::total_cmp);
        xs.chunks_exact(2).map(|c| (c[0], c[1])).collect()
    }

    /// Decompose the filled area into horizontal strips of height `step`,
    /// sampled at each strip's vertical center.
    pub fn fill_strips(&self, step: f32) -> Vec<Strip> {
        let Some((lo, hi)) = self.bounds() else {
            return Vec::new();
        };
        if step <= 0.0 {
            return Vec::new();
        }
        let mut strips = Vec::new();
        let mut y0 = lo.y;
        while y0 < hi.y {
            let y1 = (y0 + step).min(hi.y);
            for (x0, x1) in self.spans_at((y0 + y1) * 0.5) {
                strips.push(Strip { y0, y1, x0, x1 });
            }
            y0 = y1;
        }
        strips
    }
}

fn ring_area_centroid(ring: &[Vec2]) -> (f32, Vec2) {
    let n = ring.len();
    if n < 3 {
        return (0.0, Vec2::ZERO);
    }
    let mut area = 0.0;
    let mut c = Vec2::ZERO;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        area += cross;
        c += (a + b) * cross;
    }
    area *= 0.5;
    if area.abs() < 1e-9 {
        return (0.0, Vec2::ZERO);
    }
    (area, c / (6.0 * area))
}
