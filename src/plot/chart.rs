//! Minimal SVG charts: bar charts, heatmaps, network graphs, and two-set Venn diagrams.

use crate::utils;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use petgraph::graph::UnGraph;
use std::f64::consts::PI;
use std::fmt::Debug;
use std::path::Path;
use svg::node::element::{Circle, Line, Rectangle, Text};
use svg::Document;

pub const WIDTH: f64 = 900.0;
pub const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 200.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 110.0;
const FONT: &str = "sans-serif";

/// Series colors, cycled when there are more series than colors.
pub const PALETTE: [&str; 8] =
    ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f"];

// ----------------------------------------------------------------------------
// Helpers

/// Write an SVG document to disk, creating the parent directory if needed.
pub fn save<P>(document: &Document, path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    utils::create_parent_dir(path)?;
    std::fs::write(path, document.to_string())
        .wrap_err_with(|| eyre!("Unable to write figure: {path:?}"))?;
    Ok(())
}

fn canvas(width: f64, height: f64) -> Document {
    Document::new()
        .set("viewBox", (0, 0, width, height))
        .set("width", width)
        .set("height", height)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", "#ffffff"),
        )
}

fn text(content: impl Into<String>, x: f64, y: f64, size: f64) -> Text {
    Text::new(content)
        .set("x", x)
        .set("y", y)
        .set("font-family", FONT)
        .set("font-size", size)
        .set("fill", "#111827")
}

fn title(content: &str, width: f64) -> Text {
    text(content, width / 2.0, 32.0, 18.0)
        .set("text-anchor", "middle")
        .set("font-weight", "bold")
}

/// Linear interpolation between two `#rrggbb` colors, `t` in `[0, 1]`.
///
/// ```rust
/// use strepcore::plot::chart::interpolate;
/// assert_eq!(interpolate("#000000", "#ffffff", 0.5), "#808080");
/// assert_eq!(interpolate("#000000", "#ffffff", 2.0), "#ffffff");
/// ```
pub fn interpolate(from: &str, to: &str, t: f64) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let channel = |hex: &str, i: usize| {
        u8::from_str_radix(hex.trim_start_matches('#').get(i..i + 2).unwrap_or("00"), 16)
            .unwrap_or(0) as f64
    };
    let mix = |i: usize| (channel(from, i) + (channel(to, i) - channel(from, i)) * t).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(0), mix(2), mix(4))
}

/// Upper limit of the value axis, with some headroom over the largest value.
fn axis_max(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn legend(document: Document, labels: &[(String, String)], x: f64, y: f64) -> Document {
    labels.iter().enumerate().fold(document, |document, (i, (label, color))| {
        let y = y + i as f64 * 22.0;
        document
            .add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", y)
                    .set("width", 14)
                    .set("height", 14)
                    .set("fill", color.as_str()),
            )
            .add(text(label.as_str(), x + 20.0, y + 12.0, 12.0))
    })
}

// ----------------------------------------------------------------------------
// Bar Chart

/// How multiple series share a category.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BarMode {
    /// Series are drawn on top of each other.
    #[default]
    Stacked,
    /// Series are drawn side by side.
    Grouped,
}

/// One series of a bar chart, with one value per category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
    pub color: Option<String>,
    /// Per category colors, overriding `color`.
    pub colors: Vec<String>,
    /// Per category value labels, overriding the formatted values.
    pub labels: Vec<String>,
}

impl Series {
    pub fn new(label: &str, values: Vec<f64>) -> Self {
        Series { label: label.to_string(), values, ..Default::default() }
    }
}

/// A bar chart over categories.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub mode: BarMode,
    /// Fixed upper limit of the value axis (ex. 100 for percentages).
    pub y_max: Option<f64>,
    /// Write the total above every stacked bar.
    pub show_totals: bool,
    /// Prefix for total labels (ex. `Total: `).
    pub total_prefix: String,
    /// Write the value inside every bar segment.
    pub show_values: bool,
    /// Suffix for value labels (ex. `%`).
    pub value_suffix: String,
    /// Per category total labels, overriding the prefixed totals.
    pub total_labels: Vec<String>,
    /// Legend entries as (label, color), overriding the series labels.
    pub legend: Vec<(String, String)>,
}

impl BarChart {
    fn color(&self, i: usize) -> String {
        self.series[i].color.clone().unwrap_or_else(|| PALETTE[i % PALETTE.len()].to_string())
    }

    fn segment_color(&self, series: usize, category: usize) -> String {
        self.series[series].colors.get(category).cloned().unwrap_or_else(|| self.color(series))
    }

    fn segment_label(&self, series: usize, category: usize) -> String {
        let value = self.value(series, category);
        self.series[series].labels.get(category).cloned().unwrap_or_else(|| self.label(value))
    }

    fn value(&self, series: usize, category: usize) -> f64 {
        self.series[series].values.get(category).copied().unwrap_or(0.0)
    }

    fn totals(&self) -> Vec<f64> {
        (0..self.categories.len())
            .map(|c| (0..self.series.len()).map(|s| self.value(s, c)).sum())
            .collect()
    }

    fn label(&self, value: f64) -> String {
        format!("{}{}", utils::format_general(value, 4), self.value_suffix)
    }

    /// Render the chart as an SVG document.
    pub fn to_svg(&self) -> Document {
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let bottom = MARGIN_TOP + plot_h;

        let max = match self.mode {
            BarMode::Stacked => self.totals().into_iter().fold(0.0, f64::max),
            BarMode::Grouped => {
                self.series.iter().flat_map(|s| s.values.iter().copied()).fold(0.0, f64::max)
            }
        };
        let y_max = self.y_max.unwrap_or_else(|| axis_max(max));
        let y = |v: f64| bottom - (v / y_max).clamp(0.0, 1.0) * plot_h;

        let mut document = canvas(WIDTH, HEIGHT).add(title(&self.title, WIDTH));

        // value axis with 5 ticks
        for i in 0..=5 {
            let v = y_max * i as f64 / 5.0;
            document = document
                .add(
                    Line::new()
                        .set("x1", MARGIN_LEFT)
                        .set("y1", y(v))
                        .set("x2", MARGIN_LEFT + plot_w)
                        .set("y2", y(v))
                        .set("stroke", "#e5e7eb")
                        .set("stroke-width", 1),
                )
                .add(
                    text(utils::format_general(v, 3), MARGIN_LEFT - 8.0, y(v) + 4.0, 11.0)
                        .set("text-anchor", "end"),
                );
        }
        document = document
            .add(
                Line::new()
                    .set("x1", MARGIN_LEFT)
                    .set("y1", bottom)
                    .set("x2", MARGIN_LEFT + plot_w)
                    .set("y2", bottom)
                    .set("stroke", "#111827"),
            )
            .add(
                text(self.y_label.as_str(), 20.0, MARGIN_TOP + plot_h / 2.0, 13.0)
                    .set("text-anchor", "middle")
                    .set("transform", format!("rotate(-90 20 {})", MARGIN_TOP + plot_h / 2.0)),
            )
            .add(
                text(self.x_label.as_str(), MARGIN_LEFT + plot_w / 2.0, HEIGHT - 12.0, 13.0)
                    .set("text-anchor", "middle"),
            );

        let n = self.categories.len().max(1) as f64;
        let band = plot_w / n;
        let totals = self.totals();

        for (c, category) in self.categories.iter().enumerate() {
            let x0 = MARGIN_LEFT + band * c as f64;
            let label_x = x0 + band / 2.0;
            document = document.add(
                text(category.as_str(), label_x, bottom + 18.0, 12.0)
                    .set("text-anchor", "end")
                    .set("transform", format!("rotate(-30 {label_x} {})", bottom + 18.0)),
            );

            match self.mode {
                BarMode::Stacked => {
                    let width = band * 0.6;
                    let x = x0 + band * 0.2;
                    let mut base = 0.0;
                    for s in 0..self.series.len() {
                        let v = self.value(s, c);
                        let (top, height) = (y(base + v), y(base) - y(base + v));
                        document = document.add(
                            Rectangle::new()
                                .set("x", x)
                                .set("y", top)
                                .set("width", width)
                                .set("height", height)
                                .set("fill", self.segment_color(s, c))
                                .set("stroke", "#000000")
                                .set("stroke-width", 0.5),
                        );
                        if self.show_values && height > 14.0 {
                            let label = self.segment_label(s, c);
                            document = document.add(
                                text(label, x + width / 2.0, top + height / 2.0 + 4.0, 11.0)
                                    .set("text-anchor", "middle")
                                    .set("fill", "#ffffff"),
                            );
                        }
                        base += v;
                    }
                    if self.show_totals {
                        let total = totals[c];
                        let label = self.total_labels.get(c).cloned().unwrap_or_else(|| {
                            format!("{}{}", self.total_prefix, self.label(total))
                        });
                        document = document.add(
                            text(label, x + width / 2.0, y(total) - 6.0, 11.0)
                                .set("text-anchor", "middle")
                                .set("font-weight", "bold"),
                        );
                    }
                }
                BarMode::Grouped => {
                    let width = band * 0.8 / self.series.len().max(1) as f64;
                    for s in 0..self.series.len() {
                        let v = self.value(s, c);
                        let x = x0 + band * 0.1 + width * s as f64;
                        document = document.add(
                            Rectangle::new()
                                .set("x", x)
                                .set("y", y(v))
                                .set("width", width)
                                .set("height", bottom - y(v))
                                .set("fill", self.segment_color(s, c)),
                        );
                        if self.show_values {
                            document = document.add(
                                text(self.segment_label(s, c), x + width / 2.0, y(v) - 4.0, 10.0)
                                    .set("text-anchor", "middle"),
                            );
                        }
                    }
                }
            }
        }

        let labels = match self.legend.is_empty() {
            true => (0..self.series.len())
                .map(|s| (self.series[s].label.clone(), self.color(s)))
                .collect_vec(),
            false => self.legend.clone(),
        };
        legend(document, &labels, WIDTH - MARGIN_RIGHT + 20.0, MARGIN_TOP)
    }
}

// ----------------------------------------------------------------------------
// Heatmap

const HEAT_LOW: &str = "#ffffd9";
const HEAT_HIGH: &str = "#081d58";

/// A matrix of values drawn as colored cells, light (low) to dark (high).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Heatmap {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Label of the color scale.
    pub legend: String,
    pub columns: Vec<String>,
    pub rows: Vec<String>,
    /// One inner vector per row, one value per column.
    pub values: Vec<Vec<f64>>,
}

impl Heatmap {
    /// Render the heatmap as an SVG document.
    ///
    /// Row labels are only drawn when they fit.
    pub fn to_svg(&self) -> Document {
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let cell_w = plot_w / self.columns.len().max(1) as f64;
        let cell_h = plot_h / self.rows.len().max(1) as f64;

        let flat = self.values.iter().flatten().copied().filter(|v| v.is_finite()).collect_vec();
        let min = flat.iter().copied().fold(f64::INFINITY, f64::min);
        let max = flat.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let scale = |v: f64| if max > min { (v - min) / (max - min) } else { 0.0 };

        let mut document = canvas(WIDTH, HEIGHT).add(title(&self.title, WIDTH));

        for (r, row) in self.values.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                document = document.add(
                    Rectangle::new()
                        .set("x", MARGIN_LEFT + cell_w * c as f64)
                        .set("y", MARGIN_TOP + cell_h * r as f64)
                        .set("width", cell_w)
                        .set("height", cell_h)
                        .set("fill", interpolate(HEAT_LOW, HEAT_HIGH, scale(*value))),
                );
            }
        }

        if cell_h >= 8.0 {
            for (r, label) in self.rows.iter().enumerate() {
                let y = MARGIN_TOP + cell_h * (r as f64 + 0.5) + 3.0;
                document = document.add(
                    text(label.as_str(), MARGIN_LEFT - 6.0, y, cell_h.min(12.0))
                        .set("text-anchor", "end"),
                );
            }
        }
        let bottom = MARGIN_TOP + plot_h;
        for (c, label) in self.columns.iter().enumerate() {
            let x = MARGIN_LEFT + cell_w * (c as f64 + 0.5);
            document = document.add(
                text(label.as_str(), x, bottom + 16.0, 12.0)
                    .set("text-anchor", "end")
                    .set("transform", format!("rotate(-45 {x} {})", bottom + 16.0)),
            );
        }
        document = document
            .add(
                text(self.x_label.as_str(), MARGIN_LEFT + plot_w / 2.0, HEIGHT - 12.0, 13.0)
                    .set("text-anchor", "middle"),
            )
            .add(
                text(self.y_label.as_str(), 20.0, MARGIN_TOP + plot_h / 2.0, 13.0)
                    .set("text-anchor", "middle")
                    .set("transform", format!("rotate(-90 20 {})", MARGIN_TOP + plot_h / 2.0)),
            );

        // stepped color scale
        let (min, max) = if flat.is_empty() { (0.0, 0.0) } else { (min, max) };
        let x = WIDTH - MARGIN_RIGHT + 30.0;
        document = document.add(text(self.legend.as_str(), x, MARGIN_TOP - 10.0, 12.0));
        for step in 0..5 {
            let t = step as f64 / 4.0;
            let y = MARGIN_TOP + (4 - step) as f64 * 24.0;
            document = document
                .add(
                    Rectangle::new()
                        .set("x", x)
                        .set("y", y)
                        .set("width", 20)
                        .set("height", 24)
                        .set("fill", interpolate(HEAT_LOW, HEAT_HIGH, t)),
                )
                .add(text(utils::format_general(min + (max - min) * t, 3), x + 26.0, y + 16.0, 11.0));
        }
        document
    }
}

// ----------------------------------------------------------------------------
// Network

const EDGE_LOW: &str = "#c6dbef";
const EDGE_HIGH: &str = "#08306b";

/// Draw an undirected weighted graph with nodes on a circle.
///
/// Edge color darkens with weight, and every edge is labelled with its weight.
pub fn network(title_text: &str, legend_text: &str, graph: &UnGraph<String, usize>) -> Document {
    let (cx, cy) = ((WIDTH - MARGIN_RIGHT) / 2.0 + 20.0, HEIGHT / 2.0 + 20.0);
    let radius = (HEIGHT / 2.0 - MARGIN_TOP - 20.0).max(50.0);
    let n = graph.node_count().max(1) as f64;

    let position = |i: usize| {
        let angle = 2.0 * PI * i as f64 / n - PI / 2.0;
        (cx + radius * angle.cos(), cy + radius * angle.sin())
    };

    let weights = graph.edge_indices().map(|edge| graph[edge]).collect_vec();
    let (min, max) = (
        weights.iter().copied().min().unwrap_or(0),
        weights.iter().copied().max().unwrap_or(0),
    );
    let scale = |w: usize| if max > min { (w - min) as f64 / (max - min) as f64 } else { 1.0 };

    let mut document = canvas(WIDTH, HEIGHT).add(title(title_text, WIDTH));

    for edge in graph.edge_indices() {
        let Some((a, b)) = graph.edge_endpoints(edge) else { continue };
        let weight = graph[edge];
        let ((x1, y1), (x2, y2)) = (position(a.index()), position(b.index()));
        document = document
            .add(
                Line::new()
                    .set("x1", x1)
                    .set("y1", y1)
                    .set("x2", x2)
                    .set("y2", y2)
                    .set("stroke", interpolate(EDGE_LOW, EDGE_HIGH, scale(weight)))
                    .set("stroke-width", 4),
            )
            .add(
                text(weight.to_string(), (x1 + x2) / 2.0, (y1 + y2) / 2.0 - 4.0, 11.0)
                    .set("text-anchor", "middle"),
            );
    }

    for node in graph.node_indices() {
        let (x, y) = position(node.index());
        document = document
            .add(
                Circle::new()
                    .set("cx", x)
                    .set("cy", y)
                    .set("r", 28)
                    .set("fill", "#add8e6")
                    .set("stroke", "#4b5563"),
            )
            .add(
                text(graph[node].as_str(), x, y + 4.0, 12.0)
                    .set("text-anchor", "middle")
                    .set("font-weight", "bold"),
            );
    }

    let x = WIDTH - MARGIN_RIGHT + 30.0;
    let labels = [
        (format!("{min}"), interpolate(EDGE_LOW, EDGE_HIGH, 0.0)),
        (format!("{max}"), interpolate(EDGE_LOW, EDGE_HIGH, 1.0)),
    ];
    let document = document.add(text(legend_text, x, MARGIN_TOP, 12.0));
    legend(document, &labels, x, MARGIN_TOP + 12.0)
}

// ----------------------------------------------------------------------------
// Venn Diagram

/// Draw a two-set Venn diagram with the count of each region.
///
/// `counts` are (left only, right only, both).
pub fn venn2(title_text: &str, labels: (&str, &str), counts: (usize, usize, usize)) -> Document {
    let (width, height) = (600.0, 450.0);
    let (cy, r) = (height / 2.0 + 10.0, 130.0);
    let (left_x, right_x) = (width / 2.0 - 75.0, width / 2.0 + 75.0);

    let circle = |x: f64, color: &str| {
        Circle::new()
            .set("cx", x)
            .set("cy", cy)
            .set("r", r)
            .set("fill", color)
            .set("fill-opacity", 0.5)
            .set("stroke", "#374151")
    };
    let count = |content: usize, x: f64| {
        text(content.to_string(), x, cy + 6.0, 18.0).set("text-anchor", "middle")
    };

    canvas(width, height)
        .add(title(title_text, width))
        .add(circle(left_x, PALETTE[0]))
        .add(circle(right_x, PALETTE[1]))
        .add(count(counts.0, left_x - 60.0))
        .add(count(counts.1, right_x + 60.0))
        .add(count(counts.2, width / 2.0))
        .add(text(labels.0, left_x - 60.0, cy + r + 30.0, 14.0).set("text-anchor", "middle"))
        .add(text(labels.1, right_x + 60.0, cy + r + 30.0, 14.0).set("text-anchor", "middle"))
}
