//! Hover tool: per-row tooltips built from `@column{format}` templates.
//!
//! Template syntax:
//!
//! - `@col` prints the value with up to three decimals
//! - `@col{,}` groups thousands and rounds to an integer
//! - `@col{,.2f}` / `@col{.2f}` fixed decimals, grouped or not
//! - `@col{%Y-%m-%d}` reads the value as epoch milliseconds and formats it
//! - `$index`, `$x`, `$y` print the hovered row and pointer coordinates
//!
//! Missing values print `NaN`; unknown columns print `???`.

use std::collections::HashMap;

use crate::source::ColumnDataSource;
use crate::series::ms_to_datetime;
use super::base::{format_compact, format_number, group_thousands};

/// How a column's values should be read by `{...}` formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    Numeral,
    Datetime,
}

/// Hover tool attached to a figure
#[derive(Debug, Clone, Default)]
pub struct HoverTool {
    /// Renderer names this tool reacts to; empty means all renderers
    pub names: Vec<String>,
    /// `(label, template)` rows
    pub tooltips: Vec<(String, String)>,
    /// Per-column formatter overrides
    pub formatters: HashMap<String, Formatter>,
}

/// Context of one hover hit
#[derive(Debug, Clone, Copy)]
pub struct HoverPoint {
    pub row: usize,
    pub x: f64,
    pub y: f64,
}

impl HoverTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the tool to renderers with one of these names
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add a tooltip row
    pub fn tooltip(mut self, label: impl Into<String>, template: impl Into<String>) -> Self {
        self.tooltips.push((label.into(), template.into()));
        self
    }

    /// Read a column's values with a formatter
    pub fn formatter(mut self, column: impl Into<String>, formatter: Formatter) -> Self {
        self.formatters.insert(column.into(), formatter);
        self
    }

    /// Whether the tool applies to a renderer with this name
    pub fn matches(&self, renderer_name: Option<&str>) -> bool {
        if self.names.is_empty() {
            return true;
        }
        renderer_name.is_some_and(|name| self.names.iter().any(|n| n == name))
    }

    /// Render every tooltip row for one hovered row
    pub fn render(&self, source: &ColumnDataSource, point: HoverPoint) -> Vec<(String, String)> {
        self.tooltips
            .iter()
            .map(|(label, template)| (label.clone(), self.render_template(template, source, point)))
            .collect()
    }

    /// Expand one template
    pub fn render_template(&self, template: &str, source: &ColumnDataSource, point: HoverPoint) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(pos) = rest.find(['@', '$']) {
            out.push_str(&rest[..pos]);
            let sigil = &rest[pos..pos + 1];
            let after = &rest[pos + 1..];

            let name_len = after
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            if name_len == 0 {
                out.push_str(sigil);
                rest = after;
                continue;
            }
            let name = &after[..name_len];
            let mut tail = &after[name_len..];

            let format = match tail.strip_prefix('{').and_then(|t| t.find('}').map(|end| (t, end))) {
                Some((t, end)) => {
                    tail = &t[end + 1..];
                    Some(&t[..end])
                }
                None => None,
            };

            let text = if sigil == "$" {
                match name {
                    "index" => point.row.to_string(),
                    "x" => self.format_value(None, Some(point.x), format),
                    "y" => self.format_value(None, Some(point.y), format),
                    _ => format!("${}", name),
                }
            } else if source.contains(name) {
                self.format_value(Some(name), source.value(name, point.row), format)
            } else {
                "???".to_string()
            };

            out.push_str(&text);
            rest = tail;
        }
        out.push_str(rest);
        out
    }

    fn format_value(&self, column: Option<&str>, value: Option<f64>, format: Option<&str>) -> String {
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            return "NaN".to_string();
        };

        let formatter = column
            .and_then(|c| self.formatters.get(c).copied())
            .unwrap_or(Formatter::Numeral);

        match format {
            Some(f) if formatter == Formatter::Datetime || f.starts_with('%') => {
                let pattern = if f.starts_with('%') { f } else { "%Y-%m-%d %H:%M:%S" };
                match ms_to_datetime(value) {
                    Some(dt) => dt.format(pattern).to_string(),
                    None => "NaN".to_string(),
                }
            }
            Some(f) => format_numeral(value, f),
            None if formatter == Formatter::Datetime => match ms_to_datetime(value) {
                Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => "NaN".to_string(),
            },
            None => format_compact(value),
        }
    }
}

/// Format a number with a `,` / `.Nf` numeral pattern
fn format_numeral(value: f64, pattern: &str) -> String {
    let grouped = pattern.starts_with(',');
    let rest = pattern.trim_start_matches(',');
    let decimals = rest
        .strip_prefix('.')
        .map(|r| r.trim_end_matches('f'))
        .and_then(|d| d.parse::<usize>().ok())
        .unwrap_or(0);

    let text = format_number(value, decimals);
    if grouped {
        group_thousands(&text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Column;
    use chrono::{TimeZone, Utc};

    fn source() -> ColumnDataSource {
        let day = Utc.with_ymd_and_hms(2019, 5, 1, 0, 0, 0).unwrap().timestamp_millis() as f64;
        ColumnDataSource::from_columns([
            ("index", Column::from(vec![day])),
            ("price", Column::from(vec![1234567.891])),
            ("gap", Column::from(vec![None::<f64>])),
        ])
    }

    fn point() -> HoverPoint {
        HoverPoint { row: 0, x: 1.5, y: -2.5 }
    }

    #[test]
    fn test_numeral_formats() {
        let tool = HoverTool::new();
        let src = source();
        assert_eq!(tool.render_template("@price{,}", &src, point()), "1,234,568");
        assert_eq!(tool.render_template("@price{,.2f}", &src, point()), "1,234,567.89");
        assert_eq!(tool.render_template("@price{.1f}", &src, point()), "1234567.9");
        assert_eq!(tool.render_template("@gap{,}", &src, point()), "NaN");
        assert_eq!(tool.render_template("@nope", &src, point()), "???");
    }

    #[test]
    fn test_datetime_format() {
        let tool = HoverTool::new().formatter("index", Formatter::Datetime);
        let src = source();
        assert_eq!(tool.render_template("@index{%Y-%m-%d}", &src, point()), "2019-05-01");
        assert_eq!(tool.render_template("@index", &src, point()), "2019-05-01 00:00:00");
    }

    #[test]
    fn test_special_fields_and_literal_text() {
        let tool = HoverTool::new();
        let src = source();
        assert_eq!(
            tool.render_template("row $index at ($x, $y{.1f})", &src, point()),
            "row 0 at (1.5, -2.5)"
        );
        assert_eq!(tool.render_template("costs $ 5", &src, point()), "costs $ 5");
    }

    #[test]
    fn test_range_template() {
        let src = ColumnDataSource::from_columns([
            ("hist_x_from", vec![1.0]),
            ("hist_x_to", vec![2.5]),
        ]);
        let tool = HoverTool::new();
        assert_eq!(
            tool.render_template("@hist_x_from{,.2f} - @hist_x_to{,.2f}", &src, point()),
            "1.00 - 2.50"
        );
    }

    #[test]
    fn test_render_rows_and_name_filter() {
        let tool = HoverTool::new()
            .names(["bbands"])
            .tooltip("Price", "@price{,}");
        assert!(tool.matches(Some("bbands")));
        assert!(!tool.matches(Some("candle")));
        assert!(!tool.matches(None));
        assert!(HoverTool::new().matches(None));

        let rows = tool.render(&source(), point());
        assert_eq!(rows, vec![("Price".to_string(), "1,234,568".to_string())]);
    }
}
