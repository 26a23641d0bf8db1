//! Stateless chart rendering: class counts in, PNG bytes out.
//!
//! Every call owns its own [`Canvas`]; encoding consumes the canvas, so no
//! drawing state survives between charts.

use std::f64::consts::PI;
use std::io::Cursor;

use ab_glyph::{FontRef, InvalidFont, PxScale};
use image::{ImageFormat, Rgba, RgbaImage, imageops};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut, draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use thiserror::Error;

use crate::analysis::ClassCount;
use crate::color::ClassPalette;
use crate::config::ChartsConfig;

/// DejaVu Sans, see `assets/fonts/LICENSE-DejaVu.txt`.
static FONT_BYTES: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const AXIS: Rgba<u8> = Rgba([40, 40, 40, 255]);
const GRID: Rgba<u8> = Rgba([225, 225, 225, 255]);
const TEXT: Rgba<u8> = Rgba([20, 20, 20, 255]);

pub const BAR_TITLE: &str = "Class Frequency Distribution";
pub const PIE_TITLE: &str = "Class Proportion";
const X_LABEL: &str = "Class";
const Y_LABEL: &str = "Frequency";

/// Pie wedges start here (degrees, counter-clockwise from 3 o'clock).
const PIE_START_DEGREES: f64 = 140.0;
/// Fraction of each bar slot that the bar fills.
const BAR_FILL: f64 = 0.5;
const GRID_LINES: u32 = 5;

const MARGIN_LEFT: u32 = 80;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = 50;
const MARGIN_BOTTOM: u32 = 70;

const TITLE_SIZE: f32 = 20.0;
const LABEL_SIZE: f32 = 15.0;
const TICK_SIZE: f32 = 13.0;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("no class counts to draw")]
    Empty,

    #[error("chart size {width}x{height} is too small")]
    TooSmall { width: u32, height: u32 },

    #[error("chart font could not be read: {0}")]
    Font(#[from] InvalidFont),

    #[error("failed to encode chart as PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Pixel sizes and colours for both charts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub bar_width: u32,
    pub bar_height: u32,
    pub pie_size: u32,
    pub palette: Vec<String>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle::from(&ChartsConfig::default())
    }
}

impl From<&ChartsConfig> for ChartStyle {
    fn from(c: &ChartsConfig) -> Self {
        ChartStyle {
            bar_width: c.bar_width,
            bar_height: c.bar_height,
            pie_size: c.pie_size,
            palette: c.palette.clone(),
        }
    }
}

/// Both charts of one analysis, PNG-encoded.
#[derive(Debug, Clone)]
pub struct RenderedCharts {
    pub bar_chart: Vec<u8>,
    pub pie_chart: Vec<u8>,
}

pub fn render_charts(counts: &[ClassCount], style: &ChartStyle) -> Result<RenderedCharts, ChartError> {
    Ok(RenderedCharts {
        bar_chart: render_bar_chart(counts, style)?,
        pie_chart: render_pie_chart(counts, style)?,
    })
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// A drawing surface scoped to a single chart.
struct Canvas {
    image: RgbaImage,
    font: FontRef<'static>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Result<Self, ChartError> {
        Ok(Canvas {
            image: RgbaImage::from_pixel(width, height, BACKGROUND),
            font: FontRef::try_from_slice(FONT_BYTES)?,
        })
    }

    fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        text_size(PxScale::from(size), &self.font, text)
    }

    /// Text with its top-left corner at `(x, y)`.
    fn text(&mut self, text: &str, x: i32, y: i32, size: f32) {
        draw_text_mut(&mut self.image, TEXT, x, y, PxScale::from(size), &self.font, text);
    }

    /// Text centred on `(cx, cy)`.
    fn text_centered(&mut self, text: &str, cx: f64, cy: f64, size: f32) {
        let (w, h) = self.measure(text, size);
        let x = (cx - w as f64 / 2.0).round() as i32;
        let y = (cy - h as f64 / 2.0).round() as i32;
        self.text(text, x, y, size);
    }

    /// Text reading bottom to top, centred on `(cx, cy)`.
    fn text_vertical(&mut self, text: &str, cx: f64, cy: f64, size: f32) {
        let (w, h) = self.measure(text, size);
        if w == 0 || h == 0 {
            return;
        }
        let mut label = RgbaImage::new(w, h);
        draw_text_mut(&mut label, TEXT, 0, 0, PxScale::from(size), &self.font, text);
        let rotated = imageops::rotate270(&label);
        let x = (cx - h as f64 / 2.0).round() as i64;
        let y = (cy - w as f64 / 2.0).round() as i64;
        imageops::overlay(&mut self.image, &rotated, x, y);
    }

    /// `text`, shortened with an ellipsis until it is at most `max_width` wide.
    fn fit(&self, text: &str, size: f32, max_width: u32) -> String {
        if self.measure(text, size).0 <= max_width {
            return text.to_string();
        }
        let mut chars: Vec<char> = text.chars().collect();
        while !chars.is_empty() {
            chars.pop();
            let candidate: String = chars.iter().chain(['…'].iter()).collect();
            if self.measure(&candidate, size).0 <= max_width {
                return candidate;
            }
        }
        String::new()
    }

    fn encode_png(self) -> Result<Vec<u8>, ChartError> {
        let mut buf = Cursor::new(Vec::new());
        self.image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

fn check_counts(counts: &[ClassCount]) -> Result<usize, ChartError> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    if counts.is_empty() || total == 0 {
        return Err(ChartError::Empty);
    }
    Ok(total)
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

/// Frequency per class, one bar per entry of `counts` in the given order.
pub fn render_bar_chart(counts: &[ClassCount], style: &ChartStyle) -> Result<Vec<u8>, ChartError> {
    check_counts(counts)?;

    let (width, height) = (style.bar_width, style.bar_height);
    let n = counts.len() as u32;
    if width < MARGIN_LEFT + MARGIN_RIGHT + n || height < MARGIN_TOP + MARGIN_BOTTOM + GRID_LINES {
        return Err(ChartError::TooSmall { width, height });
    }

    let mut canvas = Canvas::new(width, height)?;
    let plot_w = (width - MARGIN_LEFT - MARGIN_RIGHT) as f64;
    let plot_h = (height - MARGIN_TOP - MARGIN_BOTTOM) as f64;
    let x0 = MARGIN_LEFT as f32;
    let y0 = (height - MARGIN_BOTTOM) as f32;

    let max_count = counts.iter().map(|c| c.count).max().unwrap_or(1);
    let step = tick_step(max_count);
    let ticks = max_count.div_ceil(step).max(1);
    let scale = plot_h / (step * ticks) as f64;

    for k in 0..=ticks {
        let y = y0 - (plot_h * k as f64 / ticks as f64) as f32;
        if k > 0 {
            draw_line_segment_mut(&mut canvas.image, (x0, y), (x0 + plot_w as f32, y), GRID);
        }
        let label = (k * step).to_string();
        let (w, h) = canvas.measure(&label, TICK_SIZE);
        canvas.text(
            &label,
            MARGIN_LEFT as i32 - 8 - w as i32,
            (y - h as f32 / 2.0).round() as i32,
            TICK_SIZE,
        );
    }

    let slot = plot_w / n as f64;
    let bar_w = ((slot * BAR_FILL) as u32).max(1);
    let color = ClassPalette::new(&style.palette, 1).color_for(0);

    for (i, cc) in counts.iter().enumerate() {
        let center = MARGIN_LEFT as f64 + slot * (i as f64 + 0.5);

        let name = canvas.fit(&cc.value.to_string(), TICK_SIZE, (slot as u32).saturating_sub(4));
        canvas.text_centered(&name, center, y0 as f64 + 6.0 + TICK_SIZE as f64 / 2.0, TICK_SIZE);

        let bar_h = (cc.count as f64 * scale).round() as u32;
        if bar_h == 0 {
            continue;
        }
        let left = (center - bar_w as f64 / 2.0).round() as i32;
        let top = y0 as i32 - bar_h as i32;
        draw_filled_rect_mut(
            &mut canvas.image,
            Rect::at(left, top).of_size(bar_w, bar_h),
            color,
        );
    }

    draw_line_segment_mut(&mut canvas.image, (x0, y0), (x0 + plot_w as f32, y0), AXIS);
    draw_line_segment_mut(&mut canvas.image, (x0, y0), (x0, MARGIN_TOP as f32), AXIS);

    let plot_cx = MARGIN_LEFT as f64 + plot_w / 2.0;
    canvas.text_centered(BAR_TITLE, plot_cx, MARGIN_TOP as f64 / 2.0, TITLE_SIZE);
    canvas.text_centered(X_LABEL, plot_cx, height as f64 - 18.0, LABEL_SIZE);
    canvas.text_vertical(Y_LABEL, 16.0, MARGIN_TOP as f64 + plot_h / 2.0, LABEL_SIZE);

    canvas.encode_png()
}

/// Gridline spacing of 1, 2 or 5 × 10^k so that `max` fits in at most
/// `GRID_LINES` steps.
fn tick_step(max: usize) -> usize {
    let mut magnitude: usize = 1;
    loop {
        for m in [1, 2, 5] {
            let step = magnitude.saturating_mul(m);
            if max.div_ceil(step) <= GRID_LINES as usize {
                return step;
            }
        }
        magnitude = magnitude.saturating_mul(10);
    }
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

/// Where the disc sits inside a square pie image of side `size`.
struct PieLayout {
    center: (f64, f64),
    radius: f64,
    title_band: f64,
    label_size: f32,
}

impl PieLayout {
    fn new(size: u32) -> Self {
        let size = size as f64;
        let label_size = (size / 40.0).clamp(9.0, 16.0) as f32;
        let title_band = label_size as f64 * 2.8;
        let body = size - title_band;
        PieLayout {
            center: (size / 2.0, title_band + body / 2.0),
            radius: body * 0.34,
            title_band,
            label_size,
        }
    }
}

/// Share per class as pie wedges, counter-clockwise from 140°, each named
/// outside the disc with its percentage inside.
pub fn render_pie_chart(counts: &[ClassCount], style: &ChartStyle) -> Result<Vec<u8>, ChartError> {
    let total = check_counts(counts)? as f64;

    let size = style.pie_size;
    if size < 64 {
        return Err(ChartError::TooSmall {
            width: size,
            height: size,
        });
    }

    let mut canvas = Canvas::new(size, size)?;
    let palette = ClassPalette::new(&style.palette, counts.len());
    let layout = PieLayout::new(size);
    let (center, radius) = (layout.center, layout.radius);

    let mut start = PIE_START_DEGREES.to_radians();
    let mut edges = Vec::with_capacity(counts.len());
    let mut mids = Vec::with_capacity(counts.len());

    for (i, cc) in counts.iter().enumerate() {
        let sweep = cc.count as f64 / total * 2.0 * PI;
        if let Some(wedge) = wedge_polygon(center, radius, start, sweep) {
            draw_polygon_mut(&mut canvas.image, &wedge, palette.color_for(i));
        }
        edges.push(start);
        mids.push(start + sweep / 2.0);
        start += sweep;
    }

    // Thin separators between wedges.
    if counts.len() > 1 {
        for angle in edges {
            let (x, y) = polar(center, radius, angle);
            draw_line_segment_mut(
                &mut canvas.image,
                (center.0 as f32, center.1 as f32),
                (x as f32, y as f32),
                BACKGROUND,
            );
        }
    }

    let label_size = layout.label_size;
    let name_room = (size as f64 / 2.0 - radius * 1.12).max(0.0) as u32;
    for (cc, mid) in counts.iter().zip(mids) {
        let share = format!("{:.1}%", cc.count as f64 / total * 100.0);
        let (px, py) = polar(center, radius * 0.6, mid);
        canvas.text_centered(&share, px, py, label_size);

        let name = canvas.fit(&cc.value.to_string(), label_size, name_room);
        let (w, h) = canvas.measure(&name, label_size);
        let (nx, ny) = polar(center, radius * 1.12, mid);
        // Right of the disc the label grows rightwards, left of it leftwards.
        let x = if mid.cos() >= 0.0 { nx } else { nx - w as f64 };
        canvas.text(
            &name,
            x.round() as i32,
            (ny - h as f64 / 2.0).round() as i32,
            label_size,
        );
    }

    canvas.text_centered(
        PIE_TITLE,
        size as f64 / 2.0,
        layout.title_band / 2.0,
        label_size * 1.3,
    );

    canvas.encode_png()
}

/// Image coordinates of the point at `angle` on the circle (y grows downwards).
fn polar(center: (f64, f64), radius: f64, angle: f64) -> (f64, f64) {
    (center.0 + radius * angle.cos(), center.1 - radius * angle.sin())
}

/// Polygon approximating a wedge; `None` when it is too thin to draw.
fn wedge_polygon(
    center: (f64, f64),
    radius: f64,
    start: f64,
    sweep: f64,
) -> Option<Vec<Point<i32>>> {
    if sweep <= 0.0 {
        return None;
    }
    let steps = (sweep.to_degrees().ceil() as usize).max(2);
    let mut points = vec![Point::new(center.0.round() as i32, center.1.round() as i32)];

    for k in 0..=steps {
        let angle = start + sweep * k as f64 / steps as f64;
        let (x, y) = polar(center, radius, angle);
        let p = Point::new(x.round() as i32, y.round() as i32);
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    // draw_polygon_mut rejects a closing point equal to the first one.
    while points.len() > 1 && points.last() == points.first() {
        points.pop();
    }

    (points.len() >= 3).then_some(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn counts(values: &[usize]) -> Vec<ClassCount> {
        values
            .iter()
            .enumerate()
            .map(|(i, &count)| ClassCount {
                value: CellValue::Integer(i as i64),
                count,
            })
            .collect()
    }

    fn decode(png: &[u8]) -> RgbaImage {
        image::load_from_memory_with_format(png, ImageFormat::Png)
            .expect("valid png")
            .to_rgba8()
    }

    #[test]
    fn bar_chart_is_png_of_configured_size() {
        let style = ChartStyle::default();
        let png = render_bar_chart(&counts(&[95, 5]), &style).expect("render");
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        let img = decode(&png);
        assert_eq!(img.dimensions(), (style.bar_width, style.bar_height));
    }

    #[test]
    fn tallest_bar_uses_the_primary_colour() {
        let style = ChartStyle::default();
        let img = decode(&render_bar_chart(&counts(&[80, 20]), &style).expect("render"));

        let plot_w = (style.bar_width - MARGIN_LEFT - MARGIN_RIGHT) as f64;
        let x = (MARGIN_LEFT as f64 + plot_w / 4.0) as u32;
        let y = style.bar_height - MARGIN_BOTTOM - 10;
        assert_eq!(*img.get_pixel(x, y), Rgba([0x34, 0x98, 0xdb, 255]));
    }

    /// Number of near-black pixels in the given rectangle.
    fn dark_pixels(img: &RgbaImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y).0[..3].iter().all(|&c| c < 100))
            .count()
    }

    #[test]
    fn pie_chart_paints_wedges_in_palette_order() {
        let style = ChartStyle {
            pie_size: 200,
            ..ChartStyle::default()
        };
        let img = decode(&render_pie_chart(&counts(&[50, 50]), &style).expect("render"));
        assert_eq!(img.dimensions(), (200, 200));

        // Wedges start at 140° and each covers 180°: 160° lies in the first
        // class's wedge, 340° in the second. Sample between the percentage
        // text and the rim.
        let layout = PieLayout::new(200);
        let at = |degrees: f64| {
            let (x, y) = polar(layout.center, layout.radius * 0.85, degrees.to_radians());
            *img.get_pixel(x.round() as u32, y.round() as u32)
        };
        assert_eq!(at(160.0), Rgba([0x34, 0x98, 0xdb, 255]));
        assert_eq!(at(340.0), Rgba([0x2e, 0xcc, 0x71, 255]));
        assert_eq!(*img.get_pixel(2, 199), BACKGROUND);
    }

    #[test]
    fn pie_chart_has_title_names_and_percentages() {
        let style = ChartStyle {
            pie_size: 800,
            ..ChartStyle::default()
        };
        let img = decode(&render_pie_chart(&counts(&[75, 25]), &style).expect("render"));
        let layout = PieLayout::new(800);

        let band = layout.title_band as u32;
        assert!(dark_pixels(&img, 0..800, 0..band) > 20, "title missing");

        // "75.0%" sits at 60% of the radius in the middle of the first wedge.
        let mid = (PIE_START_DEGREES + 0.75 * 180.0).to_radians();
        let (px, py) = polar(layout.center, layout.radius * 0.6, mid);
        let (px, py) = (px as u32, py as u32);
        assert!(dark_pixels(&img, px - 20..px + 20, py - 8..py + 8) > 10, "percentage missing");

        // Class name just outside the rim.
        let (nx, ny) = polar(layout.center, layout.radius * 1.12, mid);
        let (nx, ny) = (nx as u32, ny as u32);
        assert!(dark_pixels(&img, nx - 20..nx + 20, ny - 10..ny + 10) > 5, "class name missing");
    }

    #[test]
    fn bar_chart_has_title_axis_labels_and_ticks() {
        let style = ChartStyle::default();
        let img = decode(&render_bar_chart(&counts(&[80, 20]), &style).expect("render"));
        let (w, h) = img.dimensions();

        assert!(dark_pixels(&img, MARGIN_LEFT..w, 0..MARGIN_TOP - 5) > 50, "title missing");
        // Class tick labels and the x-axis label live under the axis.
        assert!(dark_pixels(&img, MARGIN_LEFT..w, h - MARGIN_BOTTOM + 2..h) > 20);
        // "Frequency" runs up the left edge; count ticks sit beside the axis.
        assert!(dark_pixels(&img, 0..30, MARGIN_TOP..h - MARGIN_BOTTOM) > 20);
        assert!(dark_pixels(&img, 30..MARGIN_LEFT - 2, MARGIN_TOP..h - MARGIN_BOTTOM) > 20);
    }

    #[test]
    fn long_class_names_are_shortened_to_fit() {
        let canvas = Canvas::new(10, 10).expect("canvas");
        let name = "a-very-long-class-label-that-cannot-fit";
        let fitted = canvas.fit(name, TICK_SIZE, 60);
        assert!(fitted.ends_with('…'));
        assert!(canvas.measure(&fitted, TICK_SIZE).0 <= 60);
        assert_eq!(canvas.fit("ok", TICK_SIZE, 60), "ok");
    }

    #[test]
    fn ticks_use_round_steps() {
        assert_eq!(tick_step(1), 1);
        assert_eq!(tick_step(5), 1);
        assert_eq!(tick_step(9), 2);
        assert_eq!(tick_step(80), 20);
        assert_eq!(tick_step(990), 200);
        assert_eq!(tick_step(1_000), 200);
    }

    #[test]
    fn tiny_slices_do_not_break_the_pie() {
        let style = ChartStyle {
            pie_size: 100,
            ..ChartStyle::default()
        };
        assert!(render_pie_chart(&counts(&[99_999, 1]), &style).is_ok());

        let style = ChartStyle {
            pie_size: 40,
            ..ChartStyle::default()
        };
        assert!(matches!(
            render_pie_chart(&counts(&[1, 1]), &style),
            Err(ChartError::TooSmall { .. })
        ));
    }

    #[test]
    fn empty_or_zero_counts_are_rejected() {
        let style = ChartStyle::default();
        assert!(matches!(render_bar_chart(&[], &style), Err(ChartError::Empty)));
        assert!(matches!(
            render_pie_chart(&counts(&[0, 0]), &style),
            Err(ChartError::Empty)
        ));
    }

    #[test]
    fn undersized_canvas_is_rejected() {
        let style = ChartStyle {
            bar_width: 10,
            ..ChartStyle::default()
        };
        assert!(matches!(
            render_bar_chart(&counts(&[1, 2]), &style),
            Err(ChartError::TooSmall { .. })
        ));
    }
}
