#![forbid(unsafe_code)]

//! Scene model for static architecture diagrams.
//!
//! A [`Scene`] is a tree of clusters holding icon nodes, plus labeled directed edges between
//! nodes. Scenes are built once with a [`SceneBuilder`], rendered, and dropped; nothing in this
//! crate performs I/O.

pub mod attrs;
pub mod builder;
pub mod config;
pub mod error;
pub mod icon;
pub mod scene;

pub use attrs::Attrs;
pub use builder::{ClusterScope, NodeRef, SceneBuilder};
pub use config::{DiagramConfig, Direction, OutputFormat};
pub use error::{Error, Result};
pub use icon::{IconCategory, Provider};
pub use scene::{Cluster, Edge, EdgeDirection, Member, Node, Scene};
