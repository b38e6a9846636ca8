#![forbid(unsafe_code)]

//! Headless layout and SVG/DOT rendering for `archdiag` scenes.
//!
//! The pipeline is `Scene` → [`layout()`] → [`LayoutedScene`](model::LayoutedScene) →
//! [`svg::render_svg`]. [`dot::to_dot`] exports the scene as Graphviz source instead.

pub mod dot;
pub mod icons;
pub mod layout;
pub mod model;
pub mod svg;
pub mod text;

use crate::model::LayoutedScene;
use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use archdiag_core::{DiagramConfig, Scene};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid scene: {0}")]
    InvalidScene(#[from] archdiag_core::Error),
    #[error(transparent)]
    InvalidConfig(archdiag_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

pub fn layout(
    scene: &Scene,
    config: &DiagramConfig,
    options: &LayoutOptions,
) -> Result<LayoutedScene> {
    layout::layout_scene(scene, config, options.text_measurer.as_ref())
}

/// Lays out and renders `scene` to an SVG document in one step.
pub fn render_svg(
    scene: &Scene,
    config: &DiagramConfig,
    layout_options: &LayoutOptions,
    svg_options: &svg::SvgRenderOptions,
) -> Result<String> {
    let laid_out = layout(scene, config, layout_options)?;
    Ok(svg::render_svg(&laid_out, scene, config, svg_options))
}
