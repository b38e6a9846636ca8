//! Hierarchical layered layout.
//!
//! Every cluster (and the scene root) is laid out as its own scope: each direct member, node or
//! sub-cluster, becomes one block, and scene edges are lifted onto the pair of blocks holding
//! their endpoints. Blocks are ranked and ordered per scope, so sub-clusters never overlap their
//! siblings. Edges are routed afterwards between the final node boxes.

mod detour;
mod order;
mod position;
mod rank;
mod route;

pub use route::Splines;

use crate::model::{
    Bounds, EdgeCurve, LayoutCluster, LayoutEdge, LayoutLabel, LayoutNode, LayoutPoint,
    LayoutedScene,
};
use crate::text::{TextMeasurer, TextStyle};
use crate::{Error, Result};
use archdiag_core::{Attrs, DiagramConfig, Direction, Member, Node, Scene};
use rustc_hash::{FxHashMap, FxHashSet};
use route::Port;

/// Inner padding between a cluster border and its members.
pub const CLUSTER_PADDING: f64 = 16.0;
/// Space between a cluster title and the first row of members.
pub const CLUSTER_TITLE_GAP: f64 = 8.0;
/// Space between a node icon and its label.
pub const LABEL_GAP: f64 = 4.0;
/// Clearance kept on both sides of an edge label along the rank axis.
pub const EDGE_LABEL_MARGIN: f64 = 12.0;
/// Space between the diagram content and the title below it.
pub const TITLE_GAP: f64 = 16.0;
/// Icon edge length when no `iconsize` attribute is set.
pub const DEFAULT_ICON_SIZE: f64 = 64.0;

const DEFAULT_NODE_SEP: f64 = 0.60 * archdiag_core::config::POINTS_PER_INCH;
const DEFAULT_RANK_SEP: f64 = 0.75 * archdiag_core::config::POINTS_PER_INCH;

#[derive(Debug, Clone)]
struct NodeBox {
    width: f64,
    height: f64,
    icon_size: f64,
    label: LayoutLabel,
}

#[derive(Debug, Clone)]
struct ScopeLayout<'a> {
    width: f64,
    height: f64,
    /// Member centers relative to the scope's content origin.
    members: Vec<(Member<'a>, f64, f64)>,
}

#[derive(Debug, Clone)]
struct ClusterBox<'a> {
    width: f64,
    height: f64,
    header: f64,
    content_dx: f64,
    content: ScopeLayout<'a>,
    title: LayoutLabel,
    labeljust: char,
}

struct Ctx<'a> {
    scene: &'a Scene,
    direction: Direction,
    node_sep: f64,
    rank_sep: f64,
    measurer: &'a dyn TextMeasurer,
    cluster_attr: Attrs,
    edge_attr: Attrs,
    nodes: FxHashMap<&'a str, NodeBox>,
    clusters: FxHashMap<&'a str, ClusterBox<'a>>,
}

fn text_style(attrs: &Attrs, fallback_size: f64) -> TextStyle {
    TextStyle {
        font_family: attrs.get("fontname").map(str::to_string),
        font_size: attrs.get_f64("fontsize").unwrap_or(fallback_size),
    }
}

fn measure_label(measurer: &dyn TextMeasurer, text: &str, style: &TextStyle) -> LayoutLabel {
    let (width, height) = if text.trim().is_empty() {
        (0.0, 0.0)
    } else {
        let m = measurer.measure(text, style);
        (m.width, m.height)
    };
    LayoutLabel {
        text: text.to_string(),
        x: 0.0,
        y: 0.0,
        width,
        height,
        font_size: style.font_size,
    }
}

fn node_box(measurer: &dyn TextMeasurer, node: &Node, node_attr: &Attrs) -> NodeBox {
    let attrs = node_attr.merged(&node.attrs);
    let icon_size = attrs.get_f64("iconsize").unwrap_or(DEFAULT_ICON_SIZE);
    let label = measure_label(measurer, &node.label, &text_style(&attrs, 13.0));
    let height = if label.height > 0.0 {
        icon_size + LABEL_GAP + label.height
    } else {
        icon_size
    };
    NodeBox {
        width: icon_size.max(label.width),
        height,
        icon_size,
        label,
    }
}

/// The direct member of `scope` that contains `node`, if any.
fn member_in_scope<'a>(scene: &'a Scene, node: &'a Node, scope: Option<&str>) -> Option<&'a str> {
    if node.cluster.as_deref() == scope {
        return Some(node.id.as_str());
    }
    scene
        .ancestors(node.cluster.as_deref())
        .into_iter()
        .find(|id| scene.cluster(id).and_then(|c| c.parent.as_deref()) == scope)
}

impl<'a> Ctx<'a> {
    fn block_size(&self, member: &Member<'a>) -> (f64, f64) {
        match member {
            Member::Node(n) => self
                .nodes
                .get(n.id.as_str())
                .map(|b| (b.width, b.height))
                .unwrap_or((0.0, 0.0)),
            Member::Cluster(c) => self
                .clusters
                .get(c.id.as_str())
                .map(|b| (b.width, b.height))
                .unwrap_or((0.0, 0.0)),
        }
    }

    fn layout_scope(&mut self, scope: Option<&'a str>) -> ScopeLayout<'a> {
        let members = self.scene.children_of(scope);
        for m in &members {
            if let Member::Cluster(c) = *m {
                self.measure_cluster(c.id.as_str());
            }
        }

        let index: FxHashMap<&str, usize> = members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id(), i))
            .collect();

        let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
        let mut lifted: Vec<(usize, usize)> = Vec::new();
        let mut label_extent: f64 = 0.0;
        for edge in &self.scene.edges {
            let (Some(from), Some(to)) = (self.scene.node(&edge.from), self.scene.node(&edge.to))
            else {
                continue;
            };
            let (Some(a), Some(b)) = (
                member_in_scope(self.scene, from, scope).and_then(|id| index.get(id)),
                member_in_scope(self.scene, to, scope).and_then(|id| index.get(id)),
            ) else {
                continue;
            };
            if a == b {
                continue;
            }
            if let Some(text) = edge.label.as_deref() {
                let attrs = self.edge_attr.merged(&edge.attrs);
                let label = measure_label(self.measurer, text, &text_style(&attrs, 12.0));
                let along = if self.direction.is_horizontal() {
                    label.width
                } else {
                    label.height
                };
                label_extent = label_extent.max(along);
            }
            if seen.insert((*a, *b)) {
                lifted.push((*a, *b));
            }
        }

        let sizes: Vec<(f64, f64)> = members.iter().map(|m| self.block_size(m)).collect();
        let acyclic = rank::make_acyclic(members.len(), &lifted);
        let ranks = rank::longest_path(members.len(), &acyclic);
        let layers = order::order_layers(&ranks, &acyclic, order::SWEEPS);

        let rank_sep = if label_extent > 0.0 {
            self.rank_sep.max(label_extent + 2.0 * EDGE_LABEL_MARGIN)
        } else {
            self.rank_sep
        };
        let placed = position::place(&layers, &sizes, self.direction, self.node_sep, rank_sep);

        tracing::trace!(
            scope = scope.unwrap_or("<root>"),
            members = members.len(),
            edges = lifted.len(),
            ranks = layers.len(),
            "scope laid out"
        );

        ScopeLayout {
            width: placed.width,
            height: placed.height,
            members: members
                .into_iter()
                .zip(placed.centers)
                .map(|(m, (x, y))| (m, x, y))
                .collect(),
        }
    }

    fn measure_cluster(&mut self, id: &'a str) {
        if self.clusters.contains_key(id) {
            return;
        }
        let Some(cluster) = self.scene.cluster(id) else {
            return;
        };
        let content = self.layout_scope(Some(id));

        let attrs = self.cluster_attr.merged(&cluster.attrs);
        let title = measure_label(self.measurer, &cluster.label, &text_style(&attrs, 12.0));
        let labeljust = match attrs.get("labeljust").map(str::trim) {
            Some("r" | "R") => 'r',
            Some("c" | "C") => 'c',
            _ => 'l',
        };

        let inner_width = content.width.max(title.width);
        let header = CLUSTER_PADDING / 2.0
            + title.height
            + if title.height > 0.0 { CLUSTER_TITLE_GAP } else { 0.0 };
        let width = inner_width + 2.0 * CLUSTER_PADDING;
        let height = header + content.height + CLUSTER_PADDING;
        let content_dx = CLUSTER_PADDING + (inner_width - content.width) / 2.0;

        self.clusters.insert(
            id,
            ClusterBox {
                width,
                height,
                header,
                content_dx,
                content,
                title,
                labeljust,
            },
        );
    }

    fn emit_scope(
        &self,
        scope: &ScopeLayout<'a>,
        origin: (f64, f64),
        parent: Option<&str>,
        depth: usize,
        out: &mut LayoutedScene,
    ) {
        for (member, cx, cy) in &scope.members {
            let (x, y) = (origin.0 + cx, origin.1 + cy);
            match member {
                Member::Node(n) => {
                    let Some(b) = self.nodes.get(n.id.as_str()) else {
                        continue;
                    };
                    let top = y - b.height / 2.0;
                    let mut label = b.label.clone();
                    label.x = x;
                    label.y = top + b.icon_size + LABEL_GAP + label.height / 2.0;
                    out.nodes.push(LayoutNode {
                        id: n.id.clone(),
                        x,
                        y,
                        width: b.width,
                        height: b.height,
                        icon: n.icon,
                        icon_size: b.icon_size,
                        label,
                    });
                }
                Member::Cluster(c) => {
                    let Some(b) = self.clusters.get(c.id.as_str()) else {
                        continue;
                    };
                    let left = x - b.width / 2.0;
                    let top = y - b.height / 2.0;
                    let mut title = b.title.clone();
                    title.x = match b.labeljust {
                        'r' => left + b.width - CLUSTER_PADDING - title.width / 2.0,
                        'c' => x,
                        _ => left + CLUSTER_PADDING + title.width / 2.0,
                    };
                    title.y = top + CLUSTER_PADDING / 2.0 + title.height / 2.0;
                    out.clusters.push(LayoutCluster {
                        id: c.id.clone(),
                        parent: parent.map(str::to_string),
                        depth,
                        x,
                        y,
                        width: b.width,
                        height: b.height,
                        title,
                    });
                    self.emit_scope(
                        &b.content,
                        (left + b.content_dx, top + b.header),
                        Some(c.id.as_str()),
                        depth + 1,
                        out,
                    );
                }
            }
        }
    }

    fn route_edges(
        &self,
        splines: Splines,
        nodes: &[LayoutNode],
        clusters: &[LayoutCluster],
    ) -> Vec<LayoutEdge> {
        let ports: FxHashMap<&str, Port> = nodes
            .iter()
            .map(|n| {
                let block = n.bounds();
                let (ix, iy) = n.icon_origin();
                let icon = Bounds {
                    min_x: ix,
                    min_y: iy,
                    max_x: ix + n.icon_size,
                    max_y: iy + n.icon_size,
                };
                (n.id.as_str(), Port { block, icon })
            })
            .collect();

        let mut edges = Vec::with_capacity(self.scene.edges.len());
        for (i, edge) in self.scene.edges.iter().enumerate() {
            let (Some(src), Some(dst)) =
                (ports.get(edge.from.as_str()), ports.get(edge.to.as_str()))
            else {
                continue;
            };
            let (curve, points) = if edge.is_self_loop() {
                (EdgeCurve::Polyline, route::self_loop(src, self.direction))
            } else {
                let obstacles = self.obstacles(&edge.from, &edge.to, nodes, clusters);
                route::route(src, dst, self.direction, splines, &obstacles)
            };

            let label = edge
                .label
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .and_then(|text| {
                    let attrs = self.edge_attr.merged(&edge.attrs);
                    let label = measure_label(self.measurer, text, &text_style(&attrs, 12.0));
                    place_edge_label(label, curve, &points, nodes, clusters)
                });

            edges.push(LayoutEdge {
                id: format!("edge_{i}"),
                index: i,
                from: edge.from.clone(),
                to: edge.to.clone(),
                curve,
                points,
                label,
            });
        }
        edges
    }

    /// Boxes an edge between `from` and `to` must not cross: every other node, and every
    /// cluster that holds neither endpoint.
    fn obstacles(
        &self,
        from: &str,
        to: &str,
        nodes: &[LayoutNode],
        clusters: &[LayoutCluster],
    ) -> Vec<Bounds> {
        let enclosing: FxHashSet<&str> = [from, to]
            .into_iter()
            .filter_map(|id| self.scene.node(id))
            .flat_map(|n| self.scene.ancestors(n.cluster.as_deref()))
            .collect();
        nodes
            .iter()
            .filter(|n| n.id != from && n.id != to)
            .map(LayoutNode::bounds)
            .chain(
                clusters
                    .iter()
                    .filter(|c| !enclosing.contains(c.id.as_str()))
                    .map(LayoutCluster::bounds),
            )
            .map(|b| detour::inflate(&b))
            .collect()
    }
}

/// Anchors `label` just above its route, at the position nearest the route midpoint where it
/// neither straddles a cluster border nor covers a node.
fn place_edge_label(
    mut label: LayoutLabel,
    curve: EdgeCurve,
    points: &[LayoutPoint],
    nodes: &[LayoutNode],
    clusters: &[LayoutCluster],
) -> Option<LayoutLabel> {
    let at = |(x, y): (f64, f64)| (x, y - label.height / 2.0 - 2.0);
    let fits = |(x, y): (f64, f64)| {
        let b = Bounds::from_center(x, y, label.width, label.height);
        let straddles = clusters.iter().any(|c| {
            let cb = c.bounds();
            cb.overlaps(&b) && !cb.contains(&b)
        });
        !straddles && !nodes.iter().any(|n| n.bounds().overlaps(&b))
    };
    let anchors = route::label_anchors(curve, points);
    let first = anchors.first().copied().map(at)?;
    let (x, y) = anchors.into_iter().map(at).find(|&p| fits(p)).unwrap_or(first);
    label.x = x;
    label.y = y;
    Some(label)
}

fn label_bounds(label: &LayoutLabel) -> Option<Bounds> {
    (label.width > 0.0 && label.height > 0.0)
        .then(|| Bounds::from_center(label.x, label.y, label.width, label.height))
}

fn content_bounds(out: &LayoutedScene) -> Option<Bounds> {
    let mut boxes = out
        .clusters
        .iter()
        .map(LayoutCluster::bounds)
        .chain(out.nodes.iter().map(LayoutNode::bounds))
        .chain(out.edges.iter().filter_map(|e| {
            Bounds::from_points(e.points.iter().map(|p| (p.x, p.y)))
        }))
        .chain(
            out.edges
                .iter()
                .filter_map(|e| e.label.as_ref().and_then(label_bounds)),
        );
    let mut acc = boxes.next()?;
    for b in boxes {
        acc.include(&b);
    }
    Some(acc)
}

fn translate(out: &mut LayoutedScene, dx: f64, dy: f64) {
    let shift = |label: &mut LayoutLabel| {
        label.x += dx;
        label.y += dy;
    };
    for c in &mut out.clusters {
        c.x += dx;
        c.y += dy;
        shift(&mut c.title);
    }
    for n in &mut out.nodes {
        n.x += dx;
        n.y += dy;
        shift(&mut n.label);
    }
    for e in &mut out.edges {
        for p in &mut e.points {
            p.x += dx;
            p.y += dy;
        }
        if let Some(label) = e.label.as_mut() {
            shift(label);
        }
    }
}

/// Lays out a validated scene.
///
/// Coordinates are pixels with the origin at the top-left of the canvas; `width`/`height`
/// include the `pad` margin and the title band below the diagram.
pub fn layout_scene(
    scene: &Scene,
    config: &DiagramConfig,
    measurer: &dyn TextMeasurer,
) -> Result<LayoutedScene> {
    scene.validate().map_err(Error::InvalidScene)?;
    config.validate().map_err(Error::InvalidConfig)?;

    let graph_attr = config.effective_graph_attr();
    let node_attr = config.effective_node_attr();
    let direction = config.direction;

    let mut ctx = Ctx {
        scene,
        direction,
        node_sep: config.graph_px("nodesep").unwrap_or(DEFAULT_NODE_SEP),
        rank_sep: config.graph_px("ranksep").unwrap_or(DEFAULT_RANK_SEP),
        measurer,
        cluster_attr: DiagramConfig::default_cluster_attr(),
        edge_attr: config.effective_edge_attr(),
        nodes: scene
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), node_box(measurer, n, &node_attr)))
            .collect(),
        clusters: FxHashMap::default(),
    };

    let root = ctx.layout_scope(None);
    let mut out = LayoutedScene {
        direction,
        width: 0.0,
        height: 0.0,
        clusters: Vec::new(),
        nodes: Vec::new(),
        edges: Vec::new(),
        title: None,
    };
    ctx.emit_scope(&root, (0.0, 0.0), None, 0, &mut out);
    let splines = Splines::from_attr(graph_attr.get("splines"));
    out.edges = ctx.route_edges(splines, &out.nodes, &out.clusters);

    let title_text = if scene.title.trim().is_empty() {
        config.name.as_str()
    } else {
        scene.title.as_str()
    };
    let title = (!title_text.trim().is_empty())
        .then(|| measure_label(measurer, title_text, &text_style(&graph_attr, 15.0)));

    let pad = config.graph_px("pad").unwrap_or(0.0);
    let content = content_bounds(&out);
    let (content_w, content_h) = content.map(|b| (b.width(), b.height())).unwrap_or((0.0, 0.0));
    let title_w = title.as_ref().map(|t| t.width).unwrap_or(0.0);
    let inner_w = content_w.max(title_w);

    if let Some(b) = content {
        translate(
            &mut out,
            pad + (inner_w - content_w) / 2.0 - b.min_x,
            pad - b.min_y,
        );
    }

    let mut height = pad + content_h;
    if let Some(mut t) = title {
        if content.is_some() {
            height += TITLE_GAP;
        }
        t.x = pad + inner_w / 2.0;
        t.y = height + t.height / 2.0;
        height += t.height;
        out.title = Some(t);
    }
    out.width = inner_w + 2.0 * pad;
    out.height = height + pad;

    tracing::debug!(
        nodes = out.nodes.len(),
        clusters = out.clusters.len(),
        edges = out.edges.len(),
        width = out.width,
        height = out.height,
        direction = direction.as_str(),
        "scene laid out"
    );
    Ok(out)
}
