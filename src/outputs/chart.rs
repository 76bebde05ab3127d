//! Bar chart of the most used words.
//!
//! The frequency analyzer hands its ranked list to a [`ChartSink`].
//! [`SvgBarChart`] is the production sink: it writes a standalone SVG file
//! with one bar per word, tallest first, labels rotated under the x axis.

use crate::error::ChartRenderError;
use crate::models::WordFrequencyEntry;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt::Display;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 500.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 140.0;
const BAR_FILL: &str = "skyblue";

/// Accepts a ranked word list and produces a visual artifact.
pub trait ChartSink: Send + Sync {
    fn render(&self, entries: &[WordFrequencyEntry]) -> Result<(), ChartRenderError>;
}

/// Writes the chart as an SVG file.
#[derive(Debug, Clone)]
pub struct SvgBarChart {
    path: PathBuf,
    title: String,
}

impl SvgBarChart {
    pub fn new(path: impl Into<PathBuf>, top_k: usize) -> Self {
        Self {
            path: path.into(),
            title: format!("Top {top_k} Most Used Words"),
        }
    }

    fn to_svg(&self, entries: &[WordFrequencyEntry]) -> Result<Vec<u8>, ChartRenderError> {
        let mut writer = Writer::new(Vec::new());
        let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let axis_y = MARGIN_TOP + plot_height;
        let max_count = entries.iter().map(|e| e.count).max().unwrap_or(1).max(1) as f64;
        let slot = plot_width / entries.len().max(1) as f64;
        let bar_width = slot * 0.8;

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        writer
            .write_event(Event::Start(BytesStart::new("svg").with_attributes([
                ("xmlns", "http://www.w3.org/2000/svg"),
                ("width", fmt_num(WIDTH).as_str()),
                ("height", fmt_num(HEIGHT).as_str()),
                ("font-family", "sans-serif"),
            ])))
            .map_err(write_error)?;

        text_element(
            &mut writer,
            &[
                ("x", fmt_num(WIDTH / 2.0).as_str()),
                ("y", "30"),
                ("text-anchor", "middle"),
                ("font-size", "20"),
            ],
            &self.title,
        )?;

        for (i, entry) in entries.iter().enumerate() {
            let bar_height = plot_height * entry.count as f64 / max_count;
            let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_width) / 2.0;
            let y = axis_y - bar_height;
            let label_x = x + bar_width / 2.0;
            let label_y = axis_y + 15.0;

            writer
                .write_event(Event::Empty(BytesStart::new("rect").with_attributes([
                    ("x", fmt_num(x).as_str()),
                    ("y", fmt_num(y).as_str()),
                    ("width", fmt_num(bar_width).as_str()),
                    ("height", fmt_num(bar_height).as_str()),
                    ("fill", BAR_FILL),
                ])))
                .map_err(write_error)?;
            text_element(
                &mut writer,
                &[
                    ("x", fmt_num(label_x).as_str()),
                    ("y", fmt_num(y - 5.0).as_str()),
                    ("text-anchor", "middle"),
                    ("font-size", "12"),
                ],
                &entry.count.to_string(),
            )?;
            text_element(
                &mut writer,
                &[
                    ("x", fmt_num(label_x).as_str()),
                    ("y", fmt_num(label_y).as_str()),
                    ("text-anchor", "end"),
                    ("font-size", "12"),
                    (
                        "transform",
                        format!("rotate(-45 {} {})", fmt_num(label_x), fmt_num(label_y)).as_str(),
                    ),
                ],
                &entry.word,
            )?;
        }

        writer
            .write_event(Event::Empty(BytesStart::new("line").with_attributes([
                ("x1", fmt_num(MARGIN_LEFT).as_str()),
                ("y1", fmt_num(axis_y).as_str()),
                ("x2", fmt_num(WIDTH - MARGIN_RIGHT).as_str()),
                ("y2", fmt_num(axis_y).as_str()),
                ("stroke", "black"),
            ])))
            .map_err(write_error)?;
        text_element(
            &mut writer,
            &[
                ("x", fmt_num(MARGIN_LEFT + plot_width / 2.0).as_str()),
                ("y", fmt_num(HEIGHT - 10.0).as_str()),
                ("text-anchor", "middle"),
            ],
            "Words",
        )?;
        text_element(
            &mut writer,
            &[
                ("x", "20"),
                ("y", fmt_num(MARGIN_TOP + plot_height / 2.0).as_str()),
                ("text-anchor", "middle"),
                (
                    "transform",
                    format!("rotate(-90 20 {})", fmt_num(MARGIN_TOP + plot_height / 2.0)).as_str(),
                ),
            ],
            "Usage Frequency",
        )?;

        writer
            .write_event(Event::End(BytesEnd::new("svg")))
            .map_err(write_error)?;
        Ok(writer.into_inner())
    }
}

impl ChartSink for SvgBarChart {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    fn render(&self, entries: &[WordFrequencyEntry]) -> Result<(), ChartRenderError> {
        if entries.is_empty() {
            debug!("No words to chart");
            return Ok(());
        }
        let svg = self.to_svg(entries)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, svg)?;
        info!(bars = entries.len(), "Wrote bar chart");
        Ok(())
    }
}

fn text_element(
    writer: &mut Writer<Vec<u8>>,
    attributes: &[(&str, &str)],
    content: &str,
) -> Result<(), ChartRenderError> {
    writer
        .write_event(Event::Start(
            BytesStart::new("text").with_attributes(attributes.iter().copied()),
        ))
        .map_err(write_error)?;
    writer
        .write_event(Event::Text(BytesText::new(content)))
        .map_err(write_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("text")))
        .map_err(write_error)?;
    Ok(())
}

fn fmt_num(value: f64) -> String {
    format!("{value:.1}")
}

fn write_error(e: impl Display) -> ChartRenderError {
    ChartRenderError::Write(e.to_string())
}
