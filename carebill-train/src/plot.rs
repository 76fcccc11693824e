//! Horizontal bar chart of the feature importances

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::config::PlotStyle;
use crate::error::{PipelineError, Result};
use crate::reporter::FeatureImportance;

/// Bar colours, cycled from the most important feature down
const PALETTE: [RGBColor; 10] = [
    RGBColor(0x4c, 0x72, 0xb0),
    RGBColor(0xdd, 0x84, 0x52),
    RGBColor(0x55, 0xa8, 0x68),
    RGBColor(0xc4, 0x4e, 0x52),
    RGBColor(0x81, 0x72, 0xb3),
    RGBColor(0x93, 0x78, 0x60),
    RGBColor(0xda, 0x8b, 0xc3),
    RGBColor(0x8c, 0x8c, 0x8c),
    RGBColor(0xcc, 0xb9, 0x74),
    RGBColor(0x64, 0xb5, 0xcd),
];

const GRID: RGBColor = RGBColor(0xdd, 0xdd, 0xdd);

/// Tick labels use the default font size of the chart style
const TICK_PT: f64 = 11.0;

/// Renders `rows`, in order from top to bottom, and saves the chart as PNG at `path`
pub fn render_importances(path: &Path, rows: &[FeatureImportance], style: &PlotStyle) -> Result<()> {
    let (width, height) = style.pixel_size();
    let mut buffer = vec![0u8; width as usize * height as usize * 3];

    draw_chart(&mut buffer, (width, height), rows, style)
        .map_err(|err| PipelineError::Render(err.to_string()))?;

    save_png(path, &buffer, (width, height), style.pixels_per_metre())
}

fn draw_chart(
    buffer: &mut [u8],
    size: (u32, u32),
    rows: &[FeatureImportance],
    style: &PlotStyle,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
    root.fill(&WHITE)?;

    let title_px = style.pt_to_px(style.title_pt);
    let axis_px = style.pt_to_px(style.axis_pt);
    let tick_px = style.pt_to_px(TICK_PT);

    // captions are single line, so the title is stacked by hand
    let lines: Vec<&str> = style.title.lines().collect();
    let line_height = (title_px as f64 * 1.2).round() as u32;
    let (header, body) = root.split_vertically((line_height * lines.len() as u32 + 10) as i32);

    let title_style = TextStyle::from(("sans-serif", title_px as f64).into_font())
        .pos(Pos::new(HPos::Center, VPos::Top));
    for (i, line) in lines.iter().enumerate() {
        header.draw(&Text::new(
            line.to_string(),
            ((size.0 / 2) as i32, (5 + i as u32 * line_height) as i32),
            title_style.clone(),
        ))?;
    }

    let n = rows.len().max(1);
    let x_max = rows.iter().map(|r| r.importance).fold(0.0, f64::max);
    let x_max = if x_max > 0.0 { x_max * 1.05 } else { 1.0 };

    let longest = rows.iter().map(|r| r.feature.chars().count()).max().unwrap_or(0);
    let label_area = (longest as f64 * tick_px as f64 * 0.6) as i32 + axis_px as i32 * 2;

    let mut chart = ChartBuilder::on(&body)
        .margin(10)
        .x_label_area_size(axis_px as i32 * 2)
        .y_label_area_size(label_area)
        .build_cartesian_2d(0f64..x_max, (0..n).into_segmented())?;

    // the most important feature sits at the top of the chart
    let label_of = |value: &SegmentValue<usize>| match value {
        SegmentValue::CenterOf(slot) if *slot < rows.len() => {
            rows[rows.len() - 1 - slot].feature.clone()
        }
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .bold_line_style(&GRID)
        .light_line_style(&WHITE)
        .y_labels(n)
        .y_label_formatter(&label_of)
        .label_style(("sans-serif", tick_px as f64))
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .axis_desc_style(("sans-serif", axis_px as f64))
        .draw()?;

    chart.draw_series(rows.iter().enumerate().map(|(rank, row)| {
        let slot = rows.len() - 1 - rank;
        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(slot)),
                (row.importance, SegmentValue::Exact(slot + 1)),
            ],
            PALETTE[rank % PALETTE.len()].filled(),
        );
        bar.set_margin(4, 4, 0, 0);
        bar
    }))?;

    root.present()?;

    Ok(())
}

/// Encodes an RGB buffer as PNG with the chart resolution in the `pHYs` chunk
fn save_png(path: &Path, buffer: &[u8], size: (u32, u32), pixels_per_metre: u32) -> Result<()> {
    let io_error = |source: std::io::Error| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };
    let encoding_error = |err: png::EncodingError| match err {
        png::EncodingError::IoError(source) => io_error(source),
        other => PipelineError::Render(other.to_string()),
    };

    let file = File::create(path).map_err(io_error)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), size.0, size.1);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: pixels_per_metre,
        yppu: pixels_per_metre,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder.write_header().map_err(encoding_error)?;
    writer.write_image_data(buffer).map_err(encoding_error)?;
    writer.finish().map_err(encoding_error)
}
