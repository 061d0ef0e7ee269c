//! Curve interpolation for line and area paths.
//!
//! Both curves return densely sampled polylines so the drawing layer only
//! ever strokes straight segments.

use bevy::math::Vec2;

/// Samples per cubic segment.
const SEGMENT_SAMPLES: usize = 12;

/// Monotone cubic interpolation in x (Fritsch-Carlson tangents).
///
/// Never overshoots between samples, so a series that stays above a
/// threshold is drawn above it. Points must be sorted by x.
pub fn monotone_x(points: &[Vec2]) -> Vec<Vec2> {
    match points.len() {
        0 => return Vec::new(),
        1 | 2 => return points.to_vec(),
        _ => {}
    }

    let n = points.len();
    let mut tangents = vec![0.0f32; n];
    for i in 1..n - 1 {
        tangents[i] = interior_slope(points[i - 1], points[i], points[i + 1]);
    }
    tangents[0] = end_slope(points[0], points[1], tangents[1]);
    tangents[n - 1] = end_slope(points[n - 2], points[n - 1], tangents[n - 2]);

    let mut out = Vec::with_capacity((n - 1) * SEGMENT_SAMPLES + 1);
    out.push(points[0]);
    for i in 0..n - 1 {
        let (p0, p1) = (points[i], points[i + 1]);
        let dx = (p1.x - p0.x) / 3.0;
        let c0 = Vec2::new(p0.x + dx, p0.y + dx * tangents[i]);
        let c1 = Vec2::new(p1.x - dx, p1.y - dx * tangents[i + 1]);
        for s in 1..=SEGMENT_SAMPLES {
            let t = s as f32 / SEGMENT_SAMPLES as f32;
            out.push(cubic_bezier(p0, c0, c1, p1, t));
        }
    }
    out
}

fn interior_slope(p0: Vec2, p1: Vec2, p2: Vec2) -> f32 {
    let h0 = p1.x - p0.x;
    let h1 = p2.x - p1.x;
    let s0 = if h0 != 0.0 { (p1.y - p0.y) / h0 } else { 0.0 };
    let s1 = if h1 != 0.0 { (p2.y - p1.y) / h1 } else { 0.0 };
    if h0 + h1 == 0.0 {
        return 0.0;
    }
    let p = (s0 * h1 + s1 * h0) / (h0 + h1);
    (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs())
}

fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn end_slope(p0: Vec2, p1: Vec2, t: f32) -> f32 {
    let h = p1.x - p0.x;
    if h != 0.0 {
        (3.0 * (p1.y - p0.y) / h - t) / 2.0
    } else {
        t
    }
}

fn cubic_bezier(p0: Vec2, c0: Vec2, c1: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + c0 * (3.0 * u * u * t) + c1 * (3.0 * u * t * t) + p1 * (t * t * t)
}

/// Catmull-Rom spline through `points` with knot parameter `alpha`
/// (0 uniform, 0.5 centripetal, 1 chordal).
pub fn catmull_rom(points: &[Vec2], alpha: f32) -> Vec<Vec2> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let n = points.len();
    let first = points[0] * 2.0 - points[1];
    let last = points[n - 1] * 2.0 - points[n - 2];

    let mut out = Vec::with_capacity((n - 1) * SEGMENT_SAMPLES + 1);
    out.push(points[0]);
    for i in 0..n - 1 {
        let p0 = if i == 0 { first } else { points[i - 1] };
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = if i + 2 < n { points[i + 2] } else { last };
        for s in 1..=SEGMENT_SAMPLES {
            let t = s as f32 / SEGMENT_SAMPLES as f32;
            out.push(catmull_rom_point(p0, p1, p2, p3, alpha, t));
        }
    }
    out
}

fn catmull_rom_point(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, alpha: f32, u: f32) -> Vec2 {
    let knot = |a: Vec2, b: Vec2| a.distance(b).powf(alpha).max(1e-4);
    let t0 = 0.0;
    let t1 = t0 + knot(p0, p1);
    let t2 = t1 + knot(p1, p2);
    let t3 = t2 + knot(p2, p3);
    let t = t1 + (t2 - t1) * u;

    let a1 = p0 * ((t1 - t) / (t1 - t0)) + p1 * ((t - t0) / (t1 - t0));
    let a2 = p1 * ((t2 - t) / (t2 - t1)) + p2 * ((t - t1) / (t2 - t1));
    let a3 = p2 * ((t3 - t) / (t3 - t2)) + p3 * ((t - t2) / (t3 - t2));
    let b1 = a1 * ((t2 - t) / (t2 - t0)) + a2 * ((t - t0) / (t2 - t0));
    let b2 = a2 * ((t3 - t) / (t3 - t1)) + a3 * ((t - t1) / (t3 - t1));
    b1 * ((t2 - t) / (t2 - t1)) + b2 * ((t - t1) / (t2 - t1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotone_passes_through_points() {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(2.0, 2.5),
            Vec2::new(3.0, 1.0),
        ];
        let curve = monotone_x(&pts);
        assert_eq!(curve.len(), 3 * SEGMENT_SAMPLES + 1);
        for (k, p) in pts.iter().enumerate() {
            let sample = curve[k * SEGMENT_SAMPLES];
            assert!(sample.distance(*p) < 1e-4, "point {k}: {sample:?}");
        }
    }

    #[test]
    fn test_monotone_never_overshoots_flat_step() {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 10.0),
            Vec2::new(3.0, 10.0),
        ];
        for p in monotone_x(&pts) {
            assert!(p.y >= -1e-4 && p.y <= 10.0 + 1e-4, "overshoot at {p:?}");
        }
    }

    #[test]
    fn test_short_inputs_pass_through() {
        assert!(monotone_x(&[]).is_empty());
        let two = [Vec2::ZERO, Vec2::ONE];
        assert_eq!(monotone_x(&two), two.to_vec());
        assert_eq!(catmull_rom(&two, 0.5), two.to_vec());
    }

    #[test]
    fn test_catmull_rom_interpolates_controls() {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 30.0),
            Vec2::new(-5.0, 60.0),
            Vec2::new(4.0, 90.0),
        ];
        let curve = catmull_rom(&pts, 0.9);
        for (k, p) in pts.iter().enumerate() {
            let sample = curve[k * SEGMENT_SAMPLES];
            assert!(sample.distance(*p) < 1e-3, "point {k}: {sample:?}");
        }
    }
}
