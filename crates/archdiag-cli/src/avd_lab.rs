//! The Azure Virtual Desktop RemoteApp lab: two client-side nodes, the AVD control plane and
//! the lab virtual network, all inside one subscription and resource group.

use archdiag::{Attrs, DiagramConfig, Direction, IconCategory, OutputFormat, Scene, SceneBuilder};

pub const TITLE: &str = "Azure Virtual Desktop - RemoteApp Lab";
pub const FILENAME: &str = "avd-architecture";

pub fn config() -> DiagramConfig {
    let mut config = DiagramConfig::new(TITLE)
        .with_filename(FILENAME)
        .with_format(OutputFormat::Png)
        .with_direction(Direction::LR);
    config.graph_attr = Attrs::from_pairs([
        ("fontsize", "20"),
        ("bgcolor", "white"),
        ("pad", "0.5"),
        ("splines", "ortho"),
    ]);
    config.node_attr = Attrs::from_pairs([("fontsize", "12")]);
    config.edge_attr = Attrs::from_pairs([("fontsize", "10")]);
    config
}

pub fn scene() -> archdiag::Result<Scene> {
    let mut b = SceneBuilder::new(TITLE);

    let (users, windows_app) = b.cluster("Client Access", |c| {
        (
            c.node("Local Users\n(avduser1-4)", IconCategory::ClientUsers),
            c.node("Windows App\n(macOS/Web)", IconCategory::User),
        )
    });

    let lab = b.cluster("Azure Subscription", |sub| {
        sub.cluster("Resource Group\nrg-avd-lab1-dev", |rg| {
            let control = rg.cluster("AVD Control Plane", |cp| {
                let host_pool = cp.node("Host Pool\nhpl-avd-lab1", IconCategory::HostPool);
                let workspace = cp.node("Workspace\nws-avd-lab1", IconCategory::Workspace);
                let (desktop_ag, remoteapp_ag) = cp.cluster("Application Groups", |ag| {
                    (
                        ag.node("Desktop\nApp Group", IconCategory::ApplicationGroup),
                        ag.node("RemoteApp\nApp Group", IconCategory::ApplicationGroup),
                    )
                });
                (host_pool, workspace, desktop_ag, remoteapp_ag)
            });

            let network = rg.cluster("Virtual Network\n192.168.100.0/22", |vnet| {
                let nsg = vnet.node("NSG", IconCategory::NetworkSecurityGroupsClassic);
                let (session_host, os_disk) = vnet.cluster("AVD Subnet\n192.168.100.0/24", |s| {
                    (
                        s.node("Session Host\nsh-dev-vm-1", IconCategory::VmWindows),
                        s.node("OS Disk\nPremium SSD", IconCategory::Disks),
                    )
                });
                vnet.cluster("Bastion Subnet\n192.168.101.0/24", |s| {
                    s.node("Reserved\nfor Bastion", IconCategory::Subnets)
                });
                (nsg, session_host, os_disk)
            });

            (control, network)
        })
    });
    let ((host_pool, workspace, desktop_ag, remoteapp_ag), (nsg, session_host, os_disk)) = lab;

    b.edge(users, windows_app).label("RDP");
    b.edge(windows_app, workspace).label("HTTPS");
    b.edge(workspace, host_pool);
    b.edge(host_pool, desktop_ag);
    b.edge(host_pool, remoteapp_ag);
    b.edge(desktop_ag, session_host);
    b.edge(remoteapp_ag, session_host);
    b.edge(session_host, os_disk);
    b.edge(nsg, session_host);

    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use archdiag::render::{LayoutOptions, LayoutedScene, layout};
    use archdiag_render::model::{Bounds, LayoutPoint};
    use std::collections::HashSet;

    fn lab_layout(scene: &Scene) -> LayoutedScene {
        layout(scene, &config(), &LayoutOptions::default()).unwrap()
    }

    /// Whether the axis-aligned segment `a`-`b` enters the interior of `bx`.
    fn enters(bx: &Bounds, a: &LayoutPoint, b: &LayoutPoint) -> bool {
        a.x.min(b.x) < bx.max_x
            && a.x.max(b.x) > bx.min_x
            && a.y.min(b.y) < bx.max_y
            && a.y.max(b.y) > bx.min_y
    }

    fn node_id<'a>(scene: &'a Scene, label: &str) -> &'a str {
        scene
            .nodes
            .iter()
            .find(|n| n.label == label)
            .map(|n| n.id.as_str())
            .unwrap()
    }

    #[test]
    fn lab_declares_every_component() {
        let scene = scene().unwrap();
        assert_eq!(scene.title, TITLE);
        assert_eq!(scene.nodes.len(), 10);
        assert_eq!(scene.clusters.len(), 8);
        assert_eq!(scene.edges.len(), 9);

        let ids: HashSet<&str> = scene.node_ids().collect();
        for e in &scene.edges {
            assert!(ids.contains(e.from.as_str()) && ids.contains(e.to.as_str()));
        }
    }

    #[test]
    fn only_client_edges_are_labeled() {
        let scene = scene().unwrap();
        let labeled: Vec<(&str, &str)> = scene
            .edges
            .iter()
            .filter_map(|e| e.label.as_deref().map(|l| (e.from.as_str(), l)))
            .collect();
        assert_eq!(
            labeled,
            [
                (node_id(&scene, "Local Users\n(avduser1-4)"), "RDP"),
                (node_id(&scene, "Windows App\n(macOS/Web)"), "HTTPS"),
            ]
        );
    }

    #[test]
    fn session_host_sits_in_the_avd_subnet() {
        let scene = scene().unwrap();
        let host = scene
            .node(node_id(&scene, "Session Host\nsh-dev-vm-1"))
            .unwrap();
        let subnet = host.cluster.as_deref().unwrap();
        assert_eq!(scene.cluster(subnet).unwrap().label, "AVD Subnet\n192.168.100.0/24");
        assert_eq!(scene.depth_of(subnet), 3);

        let chain: Vec<&str> = scene
            .ancestors(Some(subnet))
            .into_iter()
            .map(|id| scene.cluster(id).unwrap().label.as_str())
            .collect();
        assert_eq!(
            chain,
            [
                "AVD Subnet\n192.168.100.0/24",
                "Virtual Network\n192.168.100.0/22",
                "Resource Group\nrg-avd-lab1-dev",
                "Azure Subscription",
            ]
        );
    }

    #[test]
    fn bastion_subnet_is_reserved_and_unconnected() {
        let scene = scene().unwrap();
        let reserved = node_id(&scene, "Reserved\nfor Bastion");
        assert!(
            scene
                .edges
                .iter()
                .all(|e| e.from != reserved && e.to != reserved)
        );
    }

    #[test]
    fn config_names_the_png_artifact() {
        let config = config();
        assert_eq!(config.file_name(), "avd-architecture.png");
        assert_eq!(config.direction, Direction::LR);
        let graph = config.effective_graph_attr();
        assert_eq!(graph.get("fontsize"), Some("20"));
        assert_eq!(graph.get("pad"), Some("0.5"));
        assert_eq!(config.effective_node_attr().get("fontsize"), Some("12"));
        assert_eq!(config.effective_edge_attr().get("fontsize"), Some("10"));
    }

    #[test]
    fn edges_do_not_run_through_unrelated_nodes_or_clusters() {
        let scene = scene().unwrap();
        let out = lab_layout(&scene);
        assert_eq!(out.edges.len(), scene.edges.len());

        for edge in &out.edges {
            let enclosing: HashSet<&str> = [edge.from.as_str(), edge.to.as_str()]
                .into_iter()
                .filter_map(|id| scene.node(id))
                .flat_map(|n| scene.ancestors(n.cluster.as_deref()))
                .collect();
            for w in edge.points.windows(2) {
                for node in out.nodes.iter().filter(|n| n.id != edge.from && n.id != edge.to) {
                    assert!(
                        !enters(&node.bounds(), &w[0], &w[1]),
                        "{} -> {} crosses {:?}",
                        edge.from,
                        edge.to,
                        node.label.text
                    );
                }
                for cluster in out.clusters.iter().filter(|c| !enclosing.contains(c.id.as_str())) {
                    assert!(
                        !enters(&cluster.bounds(), &w[0], &w[1]),
                        "{} -> {} crosses {:?}",
                        edge.from,
                        edge.to,
                        cluster.title.text
                    );
                }
            }
        }
    }

    #[test]
    fn edge_labels_sit_clear_of_cluster_borders() {
        let scene = scene().unwrap();
        let out = lab_layout(&scene);
        let labels: Vec<_> = out.edges.iter().filter_map(|e| e.label.as_ref()).collect();
        assert_eq!(labels.len(), 2);
        for label in labels {
            let b = Bounds::from_center(label.x, label.y, label.width, label.height);
            for cluster in &out.clusters {
                let cb = cluster.bounds();
                assert!(
                    !cb.overlaps(&b) || cb.contains(&b),
                    "label {:?} straddles {:?}",
                    label.text,
                    cluster.title.text
                );
            }
        }
    }
}
