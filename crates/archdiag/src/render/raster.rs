#![forbid(unsafe_code)]

use crate::render::{HeadlessError, LayoutOptions, SvgRenderOptions};
use archdiag_core::{DiagramConfig, OutputFormat, Scene};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Scene(#[from] archdiag_core::Error),
    #[error(transparent)]
    Layout(#[from] archdiag_render::Error),
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("invalid background color for JPG rendering")]
    JpegBackground,
    #[error("JPG rendering requires an opaque background color (e.g. white)")]
    JpegOpaqueBackgroundRequired,
    #[error("failed to encode JPG")]
    JpegEncode,
    #[error("failed to convert SVG to PDF")]
    PdfConvert,
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<HeadlessError> for RenderError {
    fn from(err: HeadlessError) -> Self {
        match err {
            HeadlessError::Scene(e) => RenderError::Scene(e),
            HeadlessError::Layout(e) => RenderError::Layout(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f32,
    /// Overrides the graph `bgcolor` attribute.
    pub background: Option<String>,
    pub jpeg_quality: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
            jpeg_quality: 90,
        }
    }
}

/// Everything that shapes the bytes of one artifact.
#[derive(Clone, Default)]
pub struct RenderOptions {
    pub layout: LayoutOptions,
    pub svg: SvgRenderOptions,
    pub raster: RasterOptions,
}

/// Renders `scene` in `config.outformat`.
pub fn render_to_bytes(
    scene: &Scene,
    config: &DiagramConfig,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    if config.outformat == OutputFormat::Dot {
        scene.validate()?;
        return Ok(crate::render::to_dot(scene, config).into_bytes());
    }

    let background = options
        .raster
        .background
        .clone()
        .or_else(|| config.effective_graph_attr().get("bgcolor").map(str::to_string));
    let mut svg_options = options.svg.clone();
    if svg_options.background.is_none() {
        svg_options.background = background.clone();
    }
    let svg = super::render_svg(scene, config, &options.layout, &svg_options)?;

    let raster = RasterOptions {
        background,
        ..options.raster.clone()
    };
    match config.outformat {
        OutputFormat::Png => svg_to_png(&svg, &raster),
        OutputFormat::Jpg => svg_to_jpeg(&svg, &raster),
        OutputFormat::Pdf => svg_to_pdf(&svg),
        OutputFormat::Svg | OutputFormat::Dot => Ok(svg.into_bytes()),
    }
}

/// Renders `scene` and writes `<dir>/<file stem>.<format extension>`, replacing any existing
/// file. `dir` must already exist.
pub fn write_artifact(
    scene: &Scene,
    config: &DiagramConfig,
    dir: &Path,
    options: &RenderOptions,
) -> Result<PathBuf> {
    let bytes = render_to_bytes(scene, config, options)?;
    let path = dir.join(config.file_name());
    std::fs::write(&path, &bytes).map_err(|source| RenderError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        format = config.outformat.extension(),
        bytes = bytes.len(),
        "artifact written"
    );
    Ok(path)
}

/// [`write_artifact`] with default options.
pub fn render_to_file(scene: &Scene, config: &DiagramConfig, dir: &Path) -> Result<PathBuf> {
    write_artifact(scene, config, dir, &RenderOptions::default())
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options.scale, options.background.as_deref())?;
    pixmap.encode_png().map_err(|_| RenderError::PngEncode)
}

pub fn svg_to_jpeg(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let bg = options.background.as_deref().unwrap_or("white");
    let color = parse_color(bg).ok_or(RenderError::JpegBackground)?;
    if color.alpha() < 1.0 {
        return Err(RenderError::JpegOpaqueBackgroundRequired);
    }

    let pixmap = svg_to_pixmap(svg, options.scale, Some(bg))?;
    // Opaque fill underneath, so dropping alpha loses nothing.
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, options.jpeg_quality)
        .encode(&rgb, pixmap.width(), pixmap.height(), image::ExtendedColorType::Rgb8)
        .map_err(|_| RenderError::JpegEncode)?;
    Ok(out)
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = FALLBACK_FONT.to_string();
    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(|_| RenderError::SvgParse)?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| RenderError::PdfConvert)
}

/// Font used for text whose `font-family` matches nothing installed.
const FALLBACK_FONT: &str = "Arial";

/// Width and height from the root `viewBox="min-x min-y width height"`.
fn viewbox_size(svg: &str) -> Option<(f32, f32)> {
    let (_, rest) = svg.split_once("viewBox=\"")?;
    let (value, _) = rest.split_once('"')?;
    let numbers: Vec<f32> = value
        .split_whitespace()
        .map(|v| v.parse().ok())
        .collect::<Option<_>>()?;
    let &[_, _, width, height] = numbers.as_slice() else {
        return None;
    };
    let usable = |v: f32| v.is_finite() && v > 0.0;
    (usable(width) && usable(height)).then_some((width, height))
}

fn svg_to_pixmap(svg: &str, scale: f32, background: Option<&str>) -> Result<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = FALLBACK_FONT.to_string();
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RenderError::SvgParse)?;

    let (width, height) = viewbox_size(svg).unwrap_or_else(|| {
        let size = tree.size();
        (size.width(), size.height())
    });
    let width_px = (width * scale).ceil().max(1.0) as u32;
    let height_px = (height * scale).ceil().max(1.0) as u32;
    tracing::debug!(width_px, height_px, scale, "rasterizing svg");

    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(RenderError::PixmapAlloc)?;
    if let Some(color) = background.and_then(parse_color) {
        pixmap.fill(color);
    }
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

/// Named colors used by diagram configs, or `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`.
fn parse_color(text: &str) -> Option<tiny_skia::Color> {
    let name = text.trim().to_ascii_lowercase();
    let [r, g, b, a] = match name.as_str() {
        "transparent" | "none" => [0, 0, 0, 0],
        "white" => [255, 255, 255, 255],
        "black" => [0, 0, 0, 255],
        "lightgray" | "lightgrey" => [211, 211, 211, 255],
        _ => hex_rgba(name.strip_prefix('#')?)?,
    };
    Some(tiny_skia::Color::from_rgba8(r, g, b, a))
}

fn hex_rgba(hex: &str) -> Option<[u8; 4]> {
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;
    // Short forms repeat each digit: `f` is `ff`.
    let (channels, wide) = match digits.len() {
        3 | 4 => (digits.len(), false),
        6 | 8 => (digits.len() / 2, true),
        _ => return None,
    };
    let mut rgba = [255u8; 4];
    for (i, c) in rgba.iter_mut().take(channels).enumerate() {
        *c = if wide {
            (digits[2 * i] << 4) | digits[2 * i + 1]
        } else {
            digits[i] * 17
        };
    }
    Some(rgba)
}
