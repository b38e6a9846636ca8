use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 13.0,
        }
    }
}

impl TextStyle {
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_size,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Font-free measurer: every column is `font_size * char_width_factor` wide.
///
/// Wide (CJK) characters count as two columns.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    pub fn line_height(&self, font_size: f64) -> f64 {
        let factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };
        font_size.max(1.0) * factor
    }
}

/// Splits a label into display lines. `\n` and `<br>` variants both break.
pub fn label_lines(text: &str) -> Vec<String> {
    let t = text
        .replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("<br>", "\n");
    t.split('\n').map(|s| s.trim().to_string()).collect()
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };

        let lines = label_lines(text);
        let font_size = style.font_size.max(1.0);
        let max_cols = lines.iter().map(|l| l.width()).max().unwrap_or(0);

        TextMetrics {
            width: max_cols as f64 * font_size * char_width_factor,
            height: lines.len() as f64 * self.line_height(font_size),
            line_count: lines.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_line_labels_measure_the_widest_line() {
        let m = DeterministicTextMeasurer::default();
        let metrics = m.measure("Host Pool\nhpl-avd-lab1", &TextStyle::sized(10.0));
        assert_eq!(metrics.line_count, 2);
        assert!((metrics.width - 12.0 * 10.0 * 0.6).abs() < 1e-9);
        assert!((metrics.height - 2.0 * 12.0).abs() < 1e-9);
    }

    #[test]
    fn html_breaks_split_lines() {
        assert_eq!(label_lines("a<br/>b<br>c"), ["a", "b", "c"]);
    }

    #[test]
    fn wide_characters_take_two_columns() {
        let m = DeterministicTextMeasurer::default();
        let narrow = m.measure("ab", &TextStyle::sized(10.0)).width;
        let wide = m.measure("网络", &TextStyle::sized(10.0)).width;
        assert!((wide - 2.0 * narrow).abs() < 1e-9);
    }
}
