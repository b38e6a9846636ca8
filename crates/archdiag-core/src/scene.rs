//! The scene tree: clusters, nodes and edges.
//!
//! Clusters and nodes are stored flat, in declaration order, with parent references by id.
//! Declaration order is significant: layout uses it as the initial ordering within a rank.

use crate::attrs::Attrs;
use crate::icon::IconCategory;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    /// `a >> b`
    #[default]
    Forward,
    /// `a << b`
    Back,
    Both,
    /// `a - b`
    None,
}

impl EdgeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeDirection::Forward => "forward",
            EdgeDirection::Back => "back",
            EdgeDirection::Both => "both",
            EdgeDirection::None => "none",
        }
    }

    pub fn has_head(&self) -> bool {
        matches!(self, EdgeDirection::Forward | EdgeDirection::Both)
    }

    pub fn has_tail(&self) -> bool {
        matches!(self, EdgeDirection::Back | EdgeDirection::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub icon: IconCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub direction: EdgeDirection,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
            direction: EdgeDirection::Forward,
            attrs: Attrs::new(),
        }
    }

    pub fn label(&mut self, text: impl Into<String>) -> &mut Self {
        self.label = Some(text.into());
        self
    }

    pub fn direction(&mut self, direction: EdgeDirection) -> &mut Self {
        self.direction = direction;
        self
    }

    pub fn attr(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attrs.set(key, value);
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// A direct member of a cluster or of the scene root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Member<'a> {
    Node(&'a Node),
    Cluster(&'a Cluster),
}

impl<'a> Member<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            Member::Node(n) => &n.id,
            Member::Cluster(c) => &c.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegisteredKind {
    Node,
    Cluster,
}

impl RegisteredKind {
    fn as_str(self) -> &'static str {
        match self {
            RegisteredKind::Node => "node",
            RegisteredKind::Cluster => "cluster",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scene {
    pub title: String,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Scene {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Loads a scene from JSON and validates it.
    pub fn from_json(text: &str) -> Result<Self> {
        let scene: Scene = serde_json::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the structural invariants: ids are unique across nodes and clusters, every
    /// cluster reference resolves, cluster nesting is a tree, and every edge endpoint is a
    /// declared node.
    pub fn validate(&self) -> Result<()> {
        let mut registered: HashMap<&str, RegisteredKind> = HashMap::new();
        for c in &self.clusters {
            if let Some(existing) = registered.insert(&c.id, RegisteredKind::Cluster) {
                return Err(Error::DuplicateId {
                    id: c.id.clone(),
                    existing: existing.as_str(),
                });
            }
        }
        for n in &self.nodes {
            if let Some(existing) = registered.insert(&n.id, RegisteredKind::Node) {
                return Err(Error::DuplicateId {
                    id: n.id.clone(),
                    existing: existing.as_str(),
                });
            }
        }

        let is_cluster = |id: &str| registered.get(id) == Some(&RegisteredKind::Cluster);

        for c in &self.clusters {
            if let Some(parent) = &c.parent {
                if parent == &c.id {
                    return Err(Error::ClusterCycle { id: c.id.clone() });
                }
                if !is_cluster(parent) {
                    return Err(Error::UnknownCluster {
                        kind: "cluster",
                        id: c.id.clone(),
                        cluster: parent.clone(),
                    });
                }
            }
        }

        let parents: HashMap<&str, &str> = self
            .clusters
            .iter()
            .filter_map(|c| c.parent.as_deref().map(|p| (c.id.as_str(), p)))
            .collect();
        for c in &self.clusters {
            let mut cur = c.id.as_str();
            let mut steps = 0usize;
            while let Some(&p) = parents.get(cur) {
                steps += 1;
                if p == c.id || steps > self.clusters.len() {
                    return Err(Error::ClusterCycle { id: c.id.clone() });
                }
                cur = p;
            }
        }

        for n in &self.nodes {
            if let Some(cluster) = &n.cluster {
                if !is_cluster(cluster) {
                    return Err(Error::UnknownCluster {
                        kind: "node",
                        id: n.id.clone(),
                        cluster: cluster.clone(),
                    });
                }
            }
        }

        let is_node = |id: &str| registered.get(id) == Some(&RegisteredKind::Node);
        for e in &self.edges {
            for end in [&e.from, &e.to] {
                if !is_node(end) {
                    return Err(Error::DanglingEdge {
                        from: e.from.clone(),
                        to: e.to.clone(),
                        missing: end.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn cluster(&self, id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    /// Direct child clusters of `parent` (`None` is the scene root), in declaration order.
    pub fn child_clusters<'a>(
        &'a self,
        parent: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Cluster> + 'a {
        self.clusters
            .iter()
            .filter(move |c| c.parent.as_deref() == parent)
    }

    /// Nodes placed directly in `cluster` (`None` is the scene root), in declaration order.
    pub fn child_nodes<'a>(
        &'a self,
        cluster: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.cluster.as_deref() == cluster)
    }

    /// Direct members of `cluster` (`None` is the scene root): its nodes first, then its
    /// sub-clusters, each in declaration order.
    pub fn children_of<'a>(&'a self, cluster: Option<&'a str>) -> Vec<Member<'a>> {
        self.child_nodes(cluster)
            .map(Member::Node)
            .chain(self.child_clusters(cluster).map(Member::Cluster))
            .collect()
    }

    /// Cluster chain from the innermost cluster outwards, starting at `cluster` itself.
    pub fn ancestors<'a>(&'a self, cluster: Option<&'a str>) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut cur = cluster;
        while let Some(id) = cur {
            if out.contains(&id) || out.len() > self.clusters.len() {
                break;
            }
            out.push(id);
            cur = self.cluster(id).and_then(|c| c.parent.as_deref());
        }
        out
    }

    /// Nesting depth of a cluster; top-level clusters are depth 0.
    pub fn depth_of(&self, cluster: &str) -> usize {
        self.ancestors(Some(cluster)).len().saturating_sub(1)
    }
}
