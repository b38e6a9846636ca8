use crate::icons::icon_group;
use crate::model::{EdgeCurve, LayoutLabel, LayoutPoint, LayoutedScene};
use crate::text::label_lines;
use archdiag_core::config::CLUSTER_BG_COLORS;
use archdiag_core::{Attrs, DiagramConfig, EdgeDirection, Scene};
use std::fmt::Write as _;

/// Arrowhead length along the edge, in pixels.
const ARROW_LENGTH: f64 = 9.0;
/// Arrowhead half width, in pixels.
const ARROW_HALF_WIDTH: f64 = 4.0;
const CLUSTER_CORNER_RADIUS: f64 = 6.0;

#[derive(Debug, Clone, Default)]
pub struct SvgRenderOptions {
    /// Optional id for the root `<svg>` element.
    pub diagram_id: Option<String>,
    /// Overrides the graph `bgcolor` attribute.
    pub background: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Anchor {
    Start,
    Middle,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
        }
    }
}

/// Renders a laid-out scene to a standalone SVG document.
///
/// `scene` and `config` supply the styling attributes (colors, pen widths, fonts); geometry comes
/// only from `layout`.
pub fn render_svg(
    layout: &LayoutedScene,
    scene: &Scene,
    config: &DiagramConfig,
    options: &SvgRenderOptions,
) -> String {
    let graph_attr = config.effective_graph_attr();
    let node_attr = config.effective_node_attr();
    let edge_attr = config.effective_edge_attr();
    let cluster_attr = DiagramConfig::default_cluster_attr();
    let font_family = graph_attr.get("fontname").unwrap_or("Sans-Serif");

    let mut out = String::new();
    let id_attr = options
        .diagram_id
        .as_deref()
        .map(|id| format!(r#" id="{}""#, escape_attr(id)))
        .unwrap_or_default();
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg"{id_attr} width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">"#,
        w = fmt(layout.width),
        h = fmt(layout.height),
        font = escape_attr(&format!("{font_family}, sans-serif")),
    );

    let background = options
        .background
        .as_deref()
        .or_else(|| graph_attr.get("bgcolor"))
        .unwrap_or("white");
    if !is_transparent(background) {
        let _ = write!(
            &mut out,
            r#"<rect class="background" x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            fmt(layout.width),
            fmt(layout.height),
            escape_attr(background)
        );
    }

    out.push_str(r#"<g class="clusters">"#);
    for cluster in &layout.clusters {
        let attrs = match scene.cluster(&cluster.id) {
            Some(c) => cluster_attr.merged(&c.attrs),
            None => cluster_attr.clone(),
        };
        let fill = attrs
            .get("bgcolor")
            .unwrap_or(CLUSTER_BG_COLORS[cluster.depth % CLUSTER_BG_COLORS.len()]);
        let b = cluster.bounds();
        let _ = write!(
            &mut out,
            r#"<g class="cluster" id="{id}"><rect x="{x}" y="{y}" width="{w}" height="{h}" rx="{r}" ry="{r}" fill="{fill}" stroke="{stroke}" stroke-width="{sw}"{dash}/>"#,
            id = escape_attr(&cluster.id),
            x = fmt(b.min_x),
            y = fmt(b.min_y),
            w = fmt(cluster.width),
            h = fmt(cluster.height),
            r = fmt(CLUSTER_CORNER_RADIUS),
            fill = escape_attr(fill),
            stroke = escape_attr(attrs.get("pencolor").unwrap_or("#AEB6BE")),
            sw = fmt(attrs.get_f64("penwidth").unwrap_or(1.0)),
            dash = dash_attr(&attrs),
        );
        let color = attrs
            .get("fontcolor")
            .or_else(|| graph_attr.get("fontcolor"))
            .unwrap_or("#2D3436");
        let anchor_x = cluster.title.x - cluster.title.width / 2.0;
        write_label(&mut out, &cluster.title, anchor_x, Anchor::Start, color);
        out.push_str("</g>");
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="edges">"#);
    for edge in &layout.edges {
        let (attrs, direction) = match scene.edges.get(edge.index) {
            Some(e) => (edge_attr.merged(&e.attrs), e.direction),
            None => (edge_attr.clone(), EdgeDirection::Forward),
        };
        let color = attrs.get("color").unwrap_or("#7B8894");
        let width = attrs.get_f64("penwidth").unwrap_or(1.0);
        let _ = write!(
            &mut out,
            r#"<g class="edge" id="{id}"><path d="{d}" fill="none" stroke="{color}" stroke-width="{sw}"{dash}/>"#,
            id = escape_attr(&edge.id),
            d = path_data(edge.curve, &edge.points),
            color = escape_attr(color),
            sw = fmt(width),
            dash = dash_attr(&attrs),
        );
        if direction.has_head() {
            if let [.., before, tip] = edge.points.as_slice() {
                write_arrowhead(&mut out, before, tip, color);
            }
        }
        if direction.has_tail() {
            if let [tip, after, ..] = edge.points.as_slice() {
                write_arrowhead(&mut out, after, tip, color);
            }
        }
        if let Some(label) = &edge.label {
            let font_color = attrs
                .get("fontcolor")
                .or_else(|| graph_attr.get("fontcolor"))
                .unwrap_or("#2D3436");
            write_label(&mut out, label, label.x, Anchor::Middle, font_color);
        }
        out.push_str("</g>");
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="nodes">"#);
    for node in &layout.nodes {
        let attrs = match scene.node(&node.id) {
            Some(n) => node_attr.merged(&n.attrs),
            None => node_attr.clone(),
        };
        let (ix, iy) = node.icon_origin();
        let _ = write!(&mut out, r#"<g class="node" id="{}">"#, escape_attr(&node.id));
        out.push_str(&icon_group(node.icon, ix, iy, node.icon_size));
        let color = attrs.get("fontcolor").unwrap_or("#2D3436");
        write_label(&mut out, &node.label, node.label.x, Anchor::Middle, color);
        out.push_str("</g>");
    }
    out.push_str("</g>");

    if let Some(title) = &layout.title {
        let color = graph_attr.get("fontcolor").unwrap_or("#2D3436");
        out.push_str(r#"<g class="title">"#);
        write_label(&mut out, title, title.x, Anchor::Middle, color);
        out.push_str("</g>");
    }

    out.push_str("</svg>\n");
    out
}

fn is_transparent(color: &str) -> bool {
    matches!(
        color.trim().to_ascii_lowercase().as_str(),
        "transparent" | "none" | ""
    )
}

fn dash_attr(attrs: &Attrs) -> &'static str {
    match attrs.get("style").map(str::trim) {
        Some("dashed") => r#" stroke-dasharray="6 4""#,
        Some("dotted") => r#" stroke-dasharray="1 3""#,
        _ => "",
    }
}

fn path_data(curve: EdgeCurve, points: &[LayoutPoint]) -> String {
    let mut d = String::new();
    match (curve, points) {
        (EdgeCurve::Cubic, [p0, p1, p2, p3]) => {
            let _ = write!(
                &mut d,
                "M{},{} C{},{} {},{} {},{}",
                fmt(p0.x),
                fmt(p0.y),
                fmt(p1.x),
                fmt(p1.y),
                fmt(p2.x),
                fmt(p2.y),
                fmt(p3.x),
                fmt(p3.y)
            );
        }
        _ => {
            for (i, p) in points.iter().enumerate() {
                let cmd = if i == 0 { 'M' } else { 'L' };
                if i > 0 {
                    d.push(' ');
                }
                let _ = write!(&mut d, "{cmd}{},{}", fmt(p.x), fmt(p.y));
            }
        }
    }
    d
}

fn write_arrowhead(out: &mut String, from: &LayoutPoint, tip: &LayoutPoint, color: &str) {
    let (dx, dy) = (tip.x - from.x, tip.y - from.y);
    let len = dx.hypot(dy);
    if len <= f64::EPSILON {
        return;
    }
    let (ux, uy) = (dx / len, dy / len);
    let (bx, by) = (tip.x - ux * ARROW_LENGTH, tip.y - uy * ARROW_LENGTH);
    let (px, py) = (-uy * ARROW_HALF_WIDTH, ux * ARROW_HALF_WIDTH);
    let _ = write!(
        out,
        r#"<polygon class="arrowhead" points="{},{} {},{} {},{}" fill="{c}" stroke="{c}"/>"#,
        fmt(tip.x),
        fmt(tip.y),
        fmt(bx + px),
        fmt(by + py),
        fmt(bx - px),
        fmt(by - py),
        c = escape_attr(color),
    );
}

/// Writes a possibly multi-line label centered vertically on `label.y`.
fn write_label(out: &mut String, label: &LayoutLabel, x: f64, anchor: Anchor, color: &str) {
    if label.text.trim().is_empty() {
        return;
    }
    let lines = label_lines(&label.text);
    let line_height = label.height / lines.len().max(1) as f64;
    let top = label.y - label.height / 2.0;
    let _ = write!(
        out,
        r#"<text x="{}" font-size="{}" fill="{}" text-anchor="{}">"#,
        fmt(x),
        fmt(label.font_size),
        escape_attr(color),
        anchor.as_str(),
    );
    for (i, line) in lines.iter().enumerate() {
        // Baseline sits at ~80% of the line box.
        let y = top + line_height * (i as f64 + 0.8);
        let _ = write!(
            out,
            r#"<tspan x="{}" y="{}">{}</tspan>"#,
            fmt(x),
            fmt(y),
            escape_xml(line)
        );
    }
    out.push_str("</text>");
}

pub(crate) fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }

    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let rounded = (v * 1000.0).round() / 1000.0;
    if (v - rounded).abs() < 1e-6 {
        v = rounded;
    }
    let s = v.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    escape_xml(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_compact() {
        assert_eq!(fmt(12.0), "12");
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(0.1 + 0.2), "0.3");
        assert_eq!(fmt(f64::NAN), "0");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn ortho_paths_use_line_commands() {
        let pts = [
            LayoutPoint { x: 0.0, y: 0.0 },
            LayoutPoint { x: 5.5, y: 0.0 },
            LayoutPoint { x: 5.5, y: 3.0 },
        ];
        assert_eq!(path_data(EdgeCurve::Polyline, &pts), "M0,0 L5.5,0 L5.5,3");
    }
}
