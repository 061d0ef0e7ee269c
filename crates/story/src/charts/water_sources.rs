//! Phoenix water portfolio (2015-2019 average) as a two-column Sankey.
//!
//! The graph is built in; nothing is fetched. [`SankeyGraph::layout`] places
//! nodes in columns by depth and stacks link bands on both ends, following
//! the usual Sankey construction: node value is the larger of its in- and
//! out-flow, and one vertical scale `ky` is shared by every column so equal
//! values always get equal heights.

use bevy::math::Vec2;

use crate::config::StoryConfig;
use crate::error::LoadError;
use crate::step::ChartKind;

use super::StepDataset;

pub const NODE_WIDTH: f32 = 14.0;
pub const NODE_PADDING: f32 = 18.0;
/// Nodes are never drawn thinner than this.
pub const MIN_NODE_HEIGHT: f32 = 4.0;

pub const LINK_OPACITY: f32 = 0.65;
pub const LINK_DIM_OPACITY: f32 = 0.12;
pub const NODE_DIM_OPACITY: f32 = 0.45;

/// Detail text shown until a node or link is clicked.
pub const SANKEY_TIP: &str = "Tip: Hover a flow to see how much of Phoenix's water moves \
from each source (left) to each type of use (right). Click a node or flow for a short \
explanation.";

/// Node names and weighted links; values are percent of the total portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct SankeyGraph {
    pub nodes: Vec<&'static str>,
    pub links: Vec<(usize, usize, f64)>,
}

impl SankeyGraph {
    pub fn phoenix_portfolio() -> Self {
        Self {
            nodes: vec![
                "SRP",
                "CAP",
                "Reclaimed water",
                "Groundwater",
                "City taps",
                "Parks & irrigation",
                "Cooling & industry",
            ],
            links: vec![
                (0, 4, 36.0),
                (0, 5, 12.0),
                (0, 6, 4.0),
                (1, 4, 16.0),
                (1, 5, 14.0),
                (1, 6, 8.0),
                (2, 5, 6.0),
                (2, 6, 2.0),
                (3, 4, 1.0),
                (3, 6, 1.0),
            ],
        }
    }

    /// Longest path from any source. Nodes without outgoing links are pushed
    /// to the last column.
    fn depths(&self) -> Vec<usize> {
        let n = self.nodes.len();
        let mut depth = vec![0usize; n];
        // A DAG settles in at most n passes.
        for _ in 0..n {
            let mut changed = false;
            for &(s, t, _) in &self.links {
                if depth[t] < depth[s] + 1 {
                    depth[t] = depth[s] + 1;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        let max_depth = depth.iter().copied().max().unwrap_or(0);
        (0..n)
            .map(|i| {
                let has_out = self.links.iter().any(|&(s, _, _)| s == i);
                if has_out {
                    depth[i]
                } else {
                    max_depth
                }
            })
            .collect()
    }

    fn flow(&self, node: usize) -> (f64, f64) {
        self.links.iter().fold((0.0, 0.0), |(inc, out), &(s, t, v)| {
            (
                inc + if t == node { v } else { 0.0 },
                out + if s == node { v } else { 0.0 },
            )
        })
    }

    pub fn layout(&self, size: Vec2, node_width: f32, padding: f32) -> SankeyLayout {
        let depths = self.depths();
        let columns = depths.iter().copied().max().unwrap_or(0) + 1;
        let column_step = if columns > 1 {
            (size.x - node_width) / (columns - 1) as f32
        } else {
            0.0
        };

        let mut nodes: Vec<SankeyNode> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, &name)| {
                let (inflow, outflow) = self.flow(index);
                let x0 = depths[index] as f32 * column_step;
                SankeyNode {
                    index,
                    name,
                    depth: depths[index],
                    value: inflow.max(outflow),
                    x0,
                    x1: x0 + node_width,
                    y0: 0.0,
                    y1: 0.0,
                }
            })
            .collect();

        let column_members: Vec<Vec<usize>> = (0..columns)
            .map(|c| {
                nodes
                    .iter()
                    .filter(|n| n.depth == c)
                    .map(|n| n.index)
                    .collect()
            })
            .collect();

        let ky = column_members
            .iter()
            .filter(|members| !members.is_empty())
            .map(|members| {
                let total: f64 = members.iter().map(|&i| nodes[i].value).sum();
                let gaps = padding * (members.len() - 1) as f32;
                if total > 0.0 {
                    (size.y - gaps).max(0.0) / total as f32
                } else {
                    0.0
                }
            })
            .fold(f32::INFINITY, f32::min);
        let ky = if ky.is_finite() { ky } else { 0.0 };

        for members in &column_members {
            let mut y = 0.0;
            for &i in members {
                let h = nodes[i].value as f32 * ky;
                nodes[i].y0 = y;
                nodes[i].y1 = y + h;
                y += h + padding;
            }
            let used = (y - padding).max(0.0);
            let offset = (size.y - used) / 2.0;
            for &i in members {
                nodes[i].y0 += offset;
                nodes[i].y1 += offset;
            }
        }

        let mut links: Vec<SankeyLink> = self
            .links
            .iter()
            .enumerate()
            .map(|(index, &(source, target, value))| SankeyLink {
                index,
                source,
                target,
                value,
                width: value as f32 * ky,
                y0: 0.0,
                y1: 0.0,
            })
            .collect();

        // Outgoing bands stack in the order of their targets, incoming in the
        // order of their sources, so bands never cross at a node.
        for node in &nodes {
            let mut outgoing: Vec<usize> = links
                .iter()
                .filter(|l| l.source == node.index)
                .map(|l| l.index)
                .collect();
            outgoing.sort_by(|&a, &b| {
                nodes[links[a].target]
                    .y0
                    .total_cmp(&nodes[links[b].target].y0)
            });
            let mut y = node.y0;
            for i in outgoing {
                links[i].y0 = y + links[i].width / 2.0;
                y += links[i].width;
            }

            let mut incoming: Vec<usize> = links
                .iter()
                .filter(|l| l.target == node.index)
                .map(|l| l.index)
                .collect();
            incoming.sort_by(|&a, &b| {
                nodes[links[a].source]
                    .y0
                    .total_cmp(&nodes[links[b].source].y0)
            });
            let mut y = node.y0;
            for i in incoming {
                links[i].y1 = y + links[i].width / 2.0;
                y += links[i].width;
            }
        }

        SankeyLayout {
            size,
            ky,
            nodes,
            links,
        }
    }
}

impl Default for SankeyGraph {
    fn default() -> Self {
        Self::phoenix_portfolio()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyNode {
    pub index: usize,
    pub name: &'static str,
    pub depth: usize,
    pub value: f64,
    pub x0: f32,
    pub x1: f32,
    pub y0: f32,
    pub y1: f32,
}

impl SankeyNode {
    /// Drawn rectangle as `(min, max)`.
    pub fn rect(&self) -> (Vec2, Vec2) {
        let h = (self.y1 - self.y0).max(MIN_NODE_HEIGHT);
        (Vec2::new(self.x0, self.y0), Vec2::new(self.x1, self.y0 + h))
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let (min, max) = self.rect();
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    pub fn description(&self) -> (String, String) {
        let body = match self.name {
            "SRP" => "SRP (Salt River Project) brings Salt & Verde River water into Phoenix. \
It supplies the largest and most senior share of the city's portfolio.",
            "CAP" => "CAP (Central Arizona Project) delivers Colorado River water hundreds of \
miles to central Arizona. It's critical, but also the most exposed to shortage tiers.",
            "Reclaimed water" => "Highly treated wastewater reused for cooling, industry, and \
irrigation, which reduces demand on drinking water.",
            "Groundwater" => "Phoenix's emergency savings account, pumped carefully to avoid \
long-term aquifer decline.",
            "City taps" => "Potable water delivered to homes and businesses for everyday use.",
            "Parks & irrigation" => "Golf courses, city parks, landscaping, and other outdoor \
irrigation.",
            "Cooling & industry" => "Power-plant cooling towers, data centers, and industrial \
customers that can often use reclaimed water.",
            _ => "",
        };
        (self.name.to_string(), body.to_string())
    }
}

/// One flow band. `y0`/`y1` are the band centerline at the source and
/// target node.
#[derive(Debug, Clone, PartialEq)]
pub struct SankeyLink {
    pub index: usize,
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub width: f32,
    pub y0: f32,
    pub y1: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyLayout {
    pub size: Vec2,
    pub ky: f32,
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

impl SankeyLayout {
    /// Horizontal cubic from the source's right edge to the target's left
    /// edge, both control points at the mid x.
    pub fn link_curve(&self, link: &SankeyLink) -> [Vec2; 4] {
        let x0 = self.nodes[link.source].x1;
        let x1 = self.nodes[link.target].x0;
        let xm = (x0 + x1) / 2.0;
        [
            Vec2::new(x0, link.y0),
            Vec2::new(xm, link.y0),
            Vec2::new(xm, link.y1),
            Vec2::new(x1, link.y1),
        ]
    }

    /// Centerline y of `link` at `x`, or `None` outside its horizontal span.
    pub fn link_y_at(&self, link: &SankeyLink, x: f32) -> Option<f32> {
        let [p0, p1, p2, p3] = self.link_curve(link);
        if x < p0.x || x > p3.x {
            return None;
        }
        // x(t) is monotone for this control layout; bisect on t.
        let (mut lo, mut hi) = (0.0f32, 1.0f32);
        for _ in 0..24 {
            let mid = (lo + hi) / 2.0;
            if cubic(p0, p1, p2, p3, mid).x < x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(cubic(p0, p1, p2, p3, (lo + hi) / 2.0).y)
    }

    pub fn node_at(&self, p: Vec2) -> Option<&SankeyNode> {
        self.nodes.iter().find(|n| n.contains(p))
    }

    /// Topmost link under `p`. Bands thinner than one pixel still hit at 1px.
    pub fn link_at(&self, p: Vec2) -> Option<&SankeyLink> {
        self.links.iter().rev().find(|l| {
            self.link_y_at(l, p.x)
                .is_some_and(|y| (p.y - y).abs() <= l.width.max(1.0) / 2.0)
        })
    }

    pub fn hit(&self, p: Vec2) -> Highlight {
        if let Some(node) = self.node_at(p) {
            Highlight::Node(node.index)
        } else if let Some(link) = self.link_at(p) {
            Highlight::Link(link.index)
        } else {
            Highlight::None
        }
    }

    pub fn link_description(&self, link: &SankeyLink) -> (String, String) {
        (
            format!(
                "{} → {}",
                self.nodes[link.source].name, self.nodes[link.target].name
            ),
            format!(
                "Roughly {}% of Phoenix's total water portfolio flows along this path in \
a typical 2015-2019 year.",
                link.value
            ),
        )
    }

    /// Title and body for whatever `highlight` points at.
    pub fn describe(&self, highlight: Highlight) -> Option<(String, String)> {
        match highlight {
            Highlight::None => None,
            Highlight::Node(i) => self.nodes.get(i).map(SankeyNode::description),
            Highlight::Link(i) => self.links.get(i).map(|l| self.link_description(l)),
        }
    }
}

fn cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

/// Hover state of the diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Highlight {
    #[default]
    None,
    Node(usize),
    Link(usize),
}

impl Highlight {
    pub fn link_opacity(self, link: &SankeyLink) -> f32 {
        let lit = match self {
            Highlight::None => true,
            Highlight::Node(n) => link.source == n || link.target == n,
            Highlight::Link(l) => link.index == l,
        };
        if lit {
            LINK_OPACITY
        } else {
            LINK_DIM_OPACITY
        }
    }

    pub fn node_opacity(self, node: usize, layout: &SankeyLayout) -> f32 {
        let lit = match self {
            Highlight::None => true,
            Highlight::Node(n) => node == n,
            Highlight::Link(l) => layout
                .links
                .get(l)
                .is_some_and(|link| link.source == node || link.target == node),
        };
        if lit {
            1.0
        } else {
            NODE_DIM_OPACITY
        }
    }
}

/// Built-in dataset behind the water-sources step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaterSources {
    pub graph: SankeyGraph,
}

impl StepDataset for WaterSources {
    const KIND: ChartKind = ChartKind::WaterSources;

    fn path(_config: &StoryConfig) -> Option<String> {
        None
    }

    fn transform(_text: &str) -> Result<Self, LoadError> {
        Ok(Self::default())
    }

    fn builtin() -> Option<Self> {
        Some(Self::default())
    }
}
