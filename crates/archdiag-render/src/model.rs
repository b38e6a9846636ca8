use archdiag_core::{Direction, IconCategory};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    /// Bounds of a box given by its center and size.
    pub fn from_center(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x: x - width / 2.0,
            min_y: y - height / 2.0,
            max_x: x + width / 2.0,
            max_y: y + height / 2.0,
        }
    }

    pub fn include(&mut self, other: &Bounds) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, other: &Bounds) -> bool {
        const EPS: f64 = 1e-6;
        other.min_x >= self.min_x - EPS
            && other.min_y >= self.min_y - EPS
            && other.max_x <= self.max_x + EPS
            && other.max_y <= self.max_y + EPS
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        const EPS: f64 = 1e-6;
        self.min_x < other.max_x - EPS
            && other.min_x < self.max_x - EPS
            && self.min_y < other.max_y - EPS
            && other.min_y < self.max_y - EPS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

/// A text box, centered on `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
}

/// A placed node. `(x, y)` is the center of the icon + label block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub icon: IconCategory,
    pub icon_size: f64,
    pub label: LayoutLabel,
}

impl LayoutNode {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_center(self.x, self.y, self.width, self.height)
    }

    /// Top-left corner of the icon square.
    pub fn icon_origin(&self) -> (f64, f64) {
        (self.x - self.icon_size / 2.0, self.y - self.height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutCluster {
    pub id: String,
    pub parent: Option<String>,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub title: LayoutLabel,
}

impl LayoutCluster {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_center(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeCurve {
    /// Straight segments between consecutive points.
    #[default]
    Polyline,
    /// `points` are `[start, c1, c2, end]` of one cubic Bézier.
    Cubic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    /// Position of the edge in `Scene::edges`.
    pub index: usize,
    pub from: String,
    pub to: String,
    pub curve: EdgeCurve,
    pub points: Vec<LayoutPoint>,
    pub label: Option<LayoutLabel>,
}

/// The positioned scene: the inspectable intermediate representation between the scene model
/// and the SVG/raster output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutedScene {
    pub direction: Direction,
    pub width: f64,
    pub height: f64,
    pub clusters: Vec<LayoutCluster>,
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub title: Option<LayoutLabel>,
}

impl LayoutedScene {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn cluster(&self, id: &str) -> Option<&LayoutCluster> {
        self.clusters.iter().find(|c| c.id == id)
    }
}
