use crate::attrs::Attrs;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Cluster background colors, cycled by nesting depth.
pub const CLUSTER_BG_COLORS: [&str; 4] = ["#E5F5FD", "#EBF3E7", "#ECE8F6", "#FDF7E3"];

/// Pixels per inch for Graphviz inch-valued attributes (`pad`, `nodesep`, `ranksep`).
pub const POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    TB,
    BT,
    #[default]
    LR,
    RL,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::TB => "TB",
            Direction::BT => "BT",
            Direction::LR => "LR",
            Direction::RL => "RL",
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::LR | Direction::RL)
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TB" => Ok(Self::TB),
            "BT" => Ok(Self::BT),
            "LR" => Ok(Self::LR),
            "RL" => Ok(Self::RL),
            other => Err(Error::InvalidConfig {
                message: format!("invalid direction: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
    Svg,
    Pdf,
    Dot,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Dot => "dot",
        }
    }

    pub fn is_raster(&self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Jpg)
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            "dot" | "gv" => Ok(Self::Dot),
            other => Err(Error::InvalidConfig {
                message: format!("unsupported output format: {other}"),
            }),
        }
    }
}

/// Diagram-level configuration: naming, output format, direction and attribute overrides.
///
/// The `*_attr` maps hold only user overrides; the `effective_*` accessors overlay them on the
/// built-in defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub name: String,
    pub filename: Option<String>,
    pub outformat: OutputFormat,
    pub direction: Direction,
    pub graph_attr: Attrs,
    pub node_attr: Attrs,
    pub edge_attr: Attrs,
}

impl DiagramConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.outformat = format;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn default_graph_attr() -> Attrs {
        Attrs::from_pairs([
            ("pad", "2.0"),
            ("splines", "ortho"),
            ("nodesep", "0.60"),
            ("ranksep", "0.75"),
            ("fontname", "Sans-Serif"),
            ("fontsize", "15"),
            ("fontcolor", "#2D3436"),
            ("bgcolor", "white"),
        ])
    }

    pub fn default_node_attr() -> Attrs {
        Attrs::from_pairs([
            ("shape", "box"),
            ("style", "rounded"),
            ("fixedsize", "true"),
            ("width", "1.4"),
            ("height", "1.4"),
            ("labelloc", "b"),
            ("imagescale", "true"),
            ("fontname", "Sans-Serif"),
            ("fontsize", "13"),
            ("fontcolor", "#2D3436"),
        ])
    }

    pub fn default_edge_attr() -> Attrs {
        Attrs::from_pairs([("color", "#7B8894"), ("fontsize", "12")])
    }

    pub fn default_cluster_attr() -> Attrs {
        Attrs::from_pairs([
            ("shape", "box"),
            ("style", "rounded"),
            ("labeljust", "l"),
            ("pencolor", "#AEB6BE"),
            ("fontname", "Sans-Serif"),
            ("fontsize", "12"),
        ])
    }

    /// Graph attributes with defaults applied. `rankdir` always follows `direction`.
    pub fn effective_graph_attr(&self) -> Attrs {
        let mut out = Self::default_graph_attr().merged(&self.graph_attr);
        out.set("rankdir", self.direction.as_str());
        out
    }

    pub fn effective_node_attr(&self) -> Attrs {
        Self::default_node_attr().merged(&self.node_attr)
    }

    pub fn effective_edge_attr(&self) -> Attrs {
        Self::default_edge_attr().merged(&self.edge_attr)
    }

    /// Output file stem: the explicit filename, else the diagram name lowercased with spaces
    /// replaced by underscores.
    pub fn file_stem(&self) -> String {
        if let Some(f) = self.filename.as_deref().map(str::trim) {
            if !f.is_empty() {
                return f.to_string();
            }
        }
        let derived = self.name.trim().to_lowercase().replace(' ', "_");
        if derived.is_empty() {
            "diagram".to_string()
        } else {
            derived
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_stem(), self.outformat.extension())
    }

    /// Rejects numeric attributes that do not parse as non-negative numbers.
    pub fn validate(&self) -> Result<()> {
        const NUMERIC: [&str; 6] = [
            "fontsize", "pad", "nodesep", "ranksep", "iconsize", "penwidth",
        ];
        for (scope, attrs) in [
            ("graph_attr", &self.graph_attr),
            ("node_attr", &self.node_attr),
            ("edge_attr", &self.edge_attr),
        ] {
            for key in NUMERIC {
                let Some(raw) = attrs.get(key) else {
                    continue;
                };
                match attrs.get_f64(key) {
                    Some(v) if v >= 0.0 => {}
                    _ => {
                        return Err(Error::InvalidConfig {
                            message: format!(
                                "{scope}.{key} must be a non-negative number, got {raw:?}"
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Deep-merges a JSON override document into this config.
    ///
    /// Objects merge key by key; any other value replaces what was there. The merged result
    /// must still deserialize into a `DiagramConfig`.
    pub fn merge_json(&mut self, overrides: &Value) -> Result<()> {
        let mut base = serde_json::to_value(&*self)?;
        if !base.is_object() {
            base = Value::Object(Map::new());
        }
        deep_merge_value(&mut base, overrides);
        let merged: DiagramConfig =
            serde_json::from_value(base).map_err(|err| Error::InvalidConfig {
                message: err.to_string(),
            })?;
        merged.validate()?;
        *self = merged;
        Ok(())
    }

    pub fn merge_json_str(&mut self, text: &str) -> Result<()> {
        let overrides: Value = serde_json::from_str(text)?;
        self.merge_json(&overrides)
    }

    pub fn graph_px(&self, key: &str) -> Option<f64> {
        self.effective_graph_attr()
            .get_f64(key)
            .map(|inches| inches * POINTS_PER_INCH)
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
