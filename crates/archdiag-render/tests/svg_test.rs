use archdiag_core::{DiagramConfig, EdgeDirection, IconCategory, SceneBuilder};
use archdiag_render::svg::SvgRenderOptions;
use archdiag_render::{LayoutOptions, dot, render_svg};

fn scene() -> archdiag_core::Scene {
    let mut b = SceneBuilder::new("Svg <Test>");
    let a = b.node("Client", IconCategory::User);
    let h = b.cluster("Plane", |p| p.node("Pool", IconCategory::HostPool));
    b.edge(a, h).label("RDP & HTTPS").attr("color", "#FF0000");
    b.edge(h, a).direction(EdgeDirection::None).attr("style", "dashed");
    b.build().expect("valid scene")
}

#[test]
fn svg_contains_every_layer() {
    let config = DiagramConfig::new("Svg Test");
    let svg = render_svg(
        &scene(),
        &config,
        &LayoutOptions::default(),
        &SvgRenderOptions::default(),
    )
    .expect("render ok");

    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains(r#"class="background""#));
    assert!(svg.contains(r##"fill="#E5F5FD""##), "depth-0 cluster color");
    assert!(svg.contains("icon-host-pool"));
    assert!(svg.contains("icon-user"));
    assert!(svg.contains("Svg &lt;Test&gt;"));
    assert!(svg.contains("RDP &amp; HTTPS"));
    assert!(svg.contains(r##"stroke="#FF0000""##));
    assert!(svg.contains("stroke-dasharray"));
    // One arrowhead: the second edge is undirected.
    assert_eq!(svg.matches("class=\"arrowhead\"").count(), 1);
}

#[test]
fn transparent_background_omits_the_fill_rect() {
    let config = DiagramConfig::new("Svg Test");
    let options = SvgRenderOptions {
        background: Some("transparent".to_string()),
        ..Default::default()
    };
    let svg =
        render_svg(&scene(), &config, &LayoutOptions::default(), &options).expect("render ok");
    assert!(!svg.contains(r#"class="background""#));
}

#[test]
fn dot_export_nests_clusters_and_keeps_edge_attributes() {
    let config = DiagramConfig::new("Svg Test");
    let text = dot::to_dot(&scene(), &config);

    assert!(text.starts_with("digraph \"Svg <Test>\" {"));
    assert!(text.contains("rankdir=\"LR\""));
    assert!(text.contains("subgraph \"cluster_0\" {"));
    assert!(!text.contains("cluster_cluster_"));
    assert!(text.contains("bgcolor=\"#E5F5FD\""));
    assert!(text.contains("class=\"onprem.client.user\""));
    assert!(text.contains("label=\"RDP & HTTPS\""));
    assert!(text.contains("dir=\"none\""));
    assert!(text.trim_end().ends_with('}'));
}

#[test]
fn two_way_edges_draw_both_arrowheads() {
    let render = |direction: EdgeDirection| {
        let mut b = SceneBuilder::new("Arrows");
        let a = b.node("Left", IconCategory::Vm);
        let z = b.node("Right", IconCategory::Vm);
        b.edge(a, z).direction(direction);
        let scene = b.build().expect("valid scene");
        render_svg(
            &scene,
            &DiagramConfig::new("Arrows"),
            &LayoutOptions::default(),
            &SvgRenderOptions::default(),
        )
        .expect("render ok")
    };

    assert_eq!(render(EdgeDirection::Both).matches("class=\"arrowhead\"").count(), 2);
    assert_eq!(render(EdgeDirection::Back).matches("class=\"arrowhead\"").count(), 1);
    assert_eq!(render(EdgeDirection::Forward).matches("class=\"arrowhead\"").count(), 1);
}
