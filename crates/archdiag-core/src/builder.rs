//! Declarative scene construction.
//!
//! Nesting follows closure scope: everything declared inside a `cluster(...)` closure belongs to
//! that cluster, and the closure's return value is handed back so node handles can flow out.
//!
//! ```
//! use archdiag_core::{IconCategory, SceneBuilder};
//!
//! let mut b = SceneBuilder::new("Lab");
//! let (vm, disk) = b.cluster("Subnet", |subnet| {
//!     (
//!         subnet.node("VM", IconCategory::Vm),
//!         subnet.node("Disk", IconCategory::Disks),
//!     )
//! });
//! b.edge(vm, disk).label("attach");
//! let scene = b.build().unwrap();
//! assert_eq!(scene.nodes.len(), 2);
//! ```

use crate::attrs::Attrs;
use crate::icon::IconCategory;
use crate::scene::{Cluster, Edge, Node, Scene};
use crate::Result;

/// Handle to a node declared through a [`SceneBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(usize);

#[derive(Debug)]
pub struct SceneBuilder {
    scene: Scene,
}

impl SceneBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            scene: Scene::new(title),
        }
    }

    /// Declares a node at the scene root.
    pub fn node(&mut self, label: impl Into<String>, icon: IconCategory) -> NodeRef {
        self.push_node(None, label.into(), icon)
    }

    /// Opens a top-level cluster for the duration of `f`.
    pub fn cluster<R>(
        &mut self,
        label: impl Into<String>,
        f: impl FnOnce(&mut ClusterScope<'_>) -> R,
    ) -> R {
        let idx = self.push_cluster(None, label.into());
        let mut scope = ClusterScope {
            builder: self,
            cluster: idx,
        };
        f(&mut scope)
    }

    /// Declares a directed edge. Chain [`Edge::label`] / [`Edge::direction`] on the result.
    pub fn edge(&mut self, from: NodeRef, to: NodeRef) -> &mut Edge {
        let from = self.ref_id(from);
        let to = self.ref_id(to);
        self.scene.edges.push(Edge::new(from, to));
        let last = self.scene.edges.len() - 1;
        &mut self.scene.edges[last]
    }

    pub fn node_id(&self, node: NodeRef) -> Option<&str> {
        self.scene.nodes.get(node.0).map(|n| n.id.as_str())
    }

    pub fn node_attrs(&mut self, node: NodeRef) -> Option<&mut Attrs> {
        self.scene.nodes.get_mut(node.0).map(|n| &mut n.attrs)
    }

    /// Finishes construction and checks the scene invariants.
    pub fn build(self) -> Result<Scene> {
        self.scene.validate()?;
        tracing::debug!(
            title = %self.scene.title,
            clusters = self.scene.clusters.len(),
            nodes = self.scene.nodes.len(),
            edges = self.scene.edges.len(),
            "scene built"
        );
        Ok(self.scene)
    }

    fn ref_id(&self, node: NodeRef) -> String {
        // Handles from another builder fail validation in `build()` instead of panicking here.
        match self.scene.nodes.get(node.0) {
            Some(n) => n.id.clone(),
            None => format!("#{}", node.0),
        }
    }

    fn push_node(&mut self, cluster: Option<usize>, label: String, icon: IconCategory) -> NodeRef {
        let idx = self.scene.nodes.len();
        let cluster = cluster.map(|c| self.scene.clusters[c].id.clone());
        self.scene.nodes.push(Node {
            id: format!("node_{idx}"),
            label,
            icon,
            cluster,
            attrs: Attrs::new(),
        });
        NodeRef(idx)
    }

    fn push_cluster(&mut self, parent: Option<usize>, label: String) -> usize {
        let idx = self.scene.clusters.len();
        let parent = parent.map(|p| self.scene.clusters[p].id.clone());
        self.scene.clusters.push(Cluster {
            id: format!("cluster_{idx}"),
            label,
            parent,
            attrs: Attrs::new(),
        });
        idx
    }
}

/// Declaration scope of one open cluster.
pub struct ClusterScope<'a> {
    builder: &'a mut SceneBuilder,
    cluster: usize,
}

impl ClusterScope<'_> {
    pub fn node(&mut self, label: impl Into<String>, icon: IconCategory) -> NodeRef {
        self.builder.push_node(Some(self.cluster), label.into(), icon)
    }

    /// Opens a cluster nested in this one.
    pub fn cluster<R>(
        &mut self,
        label: impl Into<String>,
        f: impl FnOnce(&mut ClusterScope<'_>) -> R,
    ) -> R {
        let idx = self.builder.push_cluster(Some(self.cluster), label.into());
        let mut scope = ClusterScope {
            builder: &mut *self.builder,
            cluster: idx,
        };
        f(&mut scope)
    }

    pub fn attr(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.builder.scene.clusters[self.cluster].attrs.set(key, value);
        self
    }

    pub fn id(&self) -> &str {
        &self.builder.scene.clusters[self.cluster].id
    }
}
