mod avd_lab;

use archdiag::render::raster::{RenderError, RenderOptions, write_artifact};
use archdiag::render::{LayoutOptions, to_dot};
use archdiag::{DiagramConfig, Direction, OutputFormat, Scene};
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Scene(archdiag::Error),
    Layout(archdiag_render::Error),
    Render(RenderError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Scene(err) => write!(f, "{err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<archdiag::Error> for CliError {
    fn from(value: archdiag::Error) -> Self {
        Self::Scene(value)
    }
}

impl From<archdiag_render::Error> for CliError {
    fn from(value: archdiag_render::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<RenderError> for CliError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Render,
    Layout,
    Scene,
    Dot,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    format: Option<OutputFormat>,
    out: Option<String>,
    out_dir: Option<PathBuf>,
    direction: Option<Direction>,
    scale: Option<f32>,
    background: Option<String>,
    config: Option<PathBuf>,
    scene: Option<PathBuf>,
}

fn usage() -> &'static str {
    "archdiag\n\
\n\
USAGE:\n\
  archdiag [render] [--format png|jpg|svg|pdf|dot] [--out <name>] [--out-dir <dir>] [--direction LR|RL|TB|BT] [--scale <n>] [--background <color>] [--config <json>] [--scene <json>]\n\
  archdiag layout [--direction LR|RL|TB|BT] [--config <json>] [--scene <json>]\n\
  archdiag scene [--scene <json>]\n\
  archdiag dot [--direction LR|RL|TB|BT] [--config <json>] [--scene <json>]\n\
\n\
NOTES:\n\
  - With no arguments the Azure Virtual Desktop lab is rendered to ./avd-architecture.png.\n\
  - --config deep-merges a JSON document over the diagram configuration.\n\
  - --scene replaces the built-in lab with a scene loaded from JSON.\n\
  - layout, scene and dot print to stdout; render writes <out-dir>/<out>.<format>.\n\
  - Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "layout" => args.command = Command::Layout,
            "scene" => args.command = Command::Scene,
            "dot" => args.command = Command::Dot,
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.format = Some(
                    fmt.parse::<OutputFormat>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if out.trim().is_empty() {
                    return Err(CliError::Usage(usage()));
                }
                args.out = Some(out.clone());
            }
            "--out-dir" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out_dir = Some(PathBuf::from(dir));
            }
            "--direction" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.direction = Some(
                    dir.parse::<Direction>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(scale.is_finite() && scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.scale = Some(scale);
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(PathBuf::from(path));
            }
            "--scene" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.scene = Some(PathBuf::from(path));
            }
            _ => return Err(CliError::Usage(usage())),
        }
    }

    Ok(args)
}

/// Splits `--out` into an output path without extension, inferring the format from a known
/// extension. Directory components are kept.
fn split_out_name(out: &str) -> (String, Option<OutputFormat>) {
    let path = Path::new(out);
    let inferred = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse::<OutputFormat>().ok());
    match inferred {
        Some(format) => (path.with_extension("").display().to_string(), Some(format)),
        None => (out.to_string(), None),
    }
}

fn load_inputs(args: &Args) -> Result<(Scene, DiagramConfig), CliError> {
    let (scene, mut config) = match &args.scene {
        Some(path) => {
            let scene = Scene::from_json(&std::fs::read_to_string(path)?)?;
            let config = DiagramConfig::new(scene.title.clone());
            (scene, config)
        }
        None => (avd_lab::scene()?, avd_lab::config()),
    };

    if let Some(path) = &args.config {
        config.merge_json_str(&std::fs::read_to_string(path)?)?;
    }
    if let Some(direction) = args.direction {
        config.direction = direction;
    }
    if let Some(out) = &args.out {
        let (stem, inferred) = split_out_name(out);
        config.filename = Some(stem);
        if let Some(format) = inferred {
            config.outformat = format;
        }
    }
    if let Some(format) = args.format {
        config.outformat = format;
    }
    if let Some(bg) = &args.background {
        config.graph_attr.set("bgcolor", bg.as_str());
    }
    Ok((scene, config))
}

fn run(args: Args) -> Result<(), CliError> {
    let (scene, config) = load_inputs(&args)?;
    tracing::debug!(
        command = ?args.command,
        nodes = scene.nodes.len(),
        format = config.outformat.extension(),
        "inputs loaded"
    );

    match args.command {
        Command::Scene => {
            println!("{}", scene.to_json_pretty()?);
        }
        Command::Layout => {
            let layout = archdiag::render::layout(&scene, &config, &LayoutOptions::default())?;
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
        Command::Dot => {
            scene.validate()?;
            print!("{}", to_dot(&scene, &config));
        }
        Command::Render => {
            let mut options = RenderOptions::default();
            if let Some(scale) = args.scale {
                options.raster.scale = scale;
            }
            options.raster.background = args.background.clone();

            let dir = args.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            let path = write_artifact(&scene, &config, &dir, &options)?;
            let shown = if args.out_dir.is_some() {
                path.display().to_string()
            } else {
                config.file_name()
            };
            println!("Diagram generated: {shown}");
        }
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("archdiag")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn no_arguments_render_the_lab() {
        let args = parse_args(&argv(&[])).unwrap();
        assert_eq!(args.command, Command::Render);
        assert!(args.format.is_none() && args.out.is_none() && args.scene.is_none());
    }

    #[test]
    fn flags_are_parsed() {
        let args = parse_args(&argv(&[
            "render",
            "--format",
            "svg",
            "--direction",
            "tb",
            "--scale",
            "2",
            "--out",
            "lab",
        ]))
        .unwrap();
        assert_eq!(args.format, Some(OutputFormat::Svg));
        assert_eq!(args.direction, Some(Direction::TB));
        assert_eq!(args.scale, Some(2.0));
        assert_eq!(args.out.as_deref(), Some("lab"));
    }

    #[test]
    fn bad_values_are_usage_errors() {
        for bad in [
            &["--format", "gif"][..],
            &["--direction", "up"][..],
            &["--scale", "0"][..],
            &["--scale"][..],
            &["--unknown"][..],
            &["extra.png"][..],
        ] {
            assert!(matches!(parse_args(&argv(bad)), Err(CliError::Usage(_))), "{bad:?}");
        }
    }

    #[test]
    fn out_names_with_extensions_pick_the_format() {
        assert_eq!(
            split_out_name("lab.svg"),
            ("lab".to_string(), Some(OutputFormat::Svg))
        );
        assert_eq!(split_out_name("lab"), ("lab".to_string(), None));
        assert_eq!(split_out_name("lab.v2"), ("lab.v2".to_string(), None));
    }

    #[test]
    fn out_paths_keep_their_directory() {
        let dir = Path::new("out").join("diagrams");
        let with_ext = dir.join("lab.svg").display().to_string();
        let without_ext = dir.join("lab").display().to_string();
        assert_eq!(
            split_out_name(&with_ext),
            (without_ext.clone(), Some(OutputFormat::Svg))
        );

        let args = parse_args(&argv(&["--out", &with_ext])).unwrap();
        let (_, config) = load_inputs(&args).unwrap();
        assert_eq!(config.outformat, OutputFormat::Svg);
        assert_eq!(
            Path::new(".").join(config.file_name()),
            Path::new(".").join(dir.join("lab.svg"))
        );
    }

    #[test]
    fn overrides_apply_on_top_of_the_lab_config() {
        let args = parse_args(&argv(&["--out", "x.jpg", "--background", "#FFFFFF"])).unwrap();
        let (_, config) = load_inputs(&args).unwrap();
        assert_eq!(config.file_name(), "x.jpg");
        assert_eq!(config.effective_graph_attr().get("bgcolor"), Some("#FFFFFF"));
        assert_eq!(config.effective_graph_attr().get("fontsize"), Some("20"));
    }
}
