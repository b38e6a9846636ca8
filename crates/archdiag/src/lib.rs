#![forbid(unsafe_code)]

//! `archdiag` renders architecture diagrams declared as code.
//!
//! A diagram is a [`Scene`] of nodes, nested clusters and labeled edges, usually assembled with
//! [`SceneBuilder`], plus a [`DiagramConfig`] naming the output. Rendering is headless and
//! pure Rust.
//!
//! # Features
//!
//! - `render`: layout + SVG/DOT output (`archdiag::render`)
//! - `raster`: PNG/JPG/PDF output and artifact files via pure-Rust SVG rasterization

pub use archdiag_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use archdiag_render::dot::to_dot;
    pub use archdiag_render::model::LayoutedScene;
    pub use archdiag_render::svg::SvgRenderOptions;
    pub use archdiag_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use archdiag_render::{LayoutOptions, layout};

    #[cfg(feature = "raster")]
    pub mod raster;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Scene(#[from] archdiag_core::Error),
        #[error(transparent)]
        Layout(#[from] archdiag_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Validates, lays out and renders `scene` to an SVG document.
    pub fn render_svg(
        scene: &crate::Scene,
        config: &crate::DiagramConfig,
        layout_options: &LayoutOptions,
        svg_options: &SvgRenderOptions,
    ) -> Result<String> {
        scene.validate()?;
        let laid_out = layout(scene, config, layout_options)?;
        let svg = archdiag_render::svg::render_svg(&laid_out, scene, config, svg_options);
        tracing::debug!(bytes = svg.len(), "svg rendered");
        Ok(svg)
    }
}
