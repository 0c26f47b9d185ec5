//! egui painting of a [`Figure`]: axes, glyphs, legend and hover box.

use egui::{
    Align2, Color32, ColorImage, Context, FontId, Painter, Pos2, Rect, Response, Sense, Shape, Stroke,
    StrokeKind, TextureOptions, Ui, Vec2,
};

use crate::series::ms_to_datetime;
use crate::source::{read_source, ColumnDataSource};
use super::base::{
    calculate_axis_ticks, format_compact, with_alpha, PlotTransform, AXIS_X_HEIGHT, AXIS_Y_WIDTH,
    BACKGROUND_COLOR, BLACK_COLOR, GREY_COLOR, GRID_COLOR, HIT_TOLERANCE, LEGEND_ROW_HEIGHT,
    LEGEND_SWATCH_WIDTH, MARGIN, RANGE_PADDING, TITLE_HEIGHT, TOOLTIP_PADDING, WHITE_COLOR,
};
use super::figure::{AxisType, Figure};
use super::glyph::{hbar_rect, vbar_rect, Glyph, GlyphRenderer};
use super::hover::HoverPoint;
use super::image::RgbaImage;

const FONT_SIZE: f32 = 11.0;
const TICK_LENGTH: f32 = 4.0;
const DAY_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

impl Figure {
    /// Paint the figure and handle legend clicks and hovering
    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let size = Vec2::new(self.width.min(ui.available_width()), self.height);
        let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
        let rect = response.rect;
        painter.rect_filled(rect, 0.0, BACKGROUND_COLOR);

        let title_height = if self.title.is_empty() {
            0.0
        } else {
            painter.text(
                Pos2::new(rect.left() + MARGIN, rect.top() + MARGIN),
                Align2::LEFT_TOP,
                &self.title,
                FontId::proportional(14.0),
                BLACK_COLOR,
            );
            TITLE_HEIGHT
        };

        let plot_rect = Rect::from_min_max(
            Pos2::new(rect.left() + MARGIN, rect.top() + MARGIN + title_height),
            Pos2::new(rect.right() - MARGIN - AXIS_Y_WIDTH, rect.bottom() - MARGIN - AXIS_X_HEIGHT),
        );

        let bounds = match self.data_bounds() {
            Ok(bounds) if bounds.is_valid() => bounds.padded(RANGE_PADDING),
            Ok(_) => {
                painter.text(plot_rect.center(), Align2::CENTER_CENTER, "No data", FontId::proportional(20.0), GREY_COLOR);
                return response;
            }
            Err(e) => {
                tracing::warn!("figure '{}' cannot read its data: {}", self.title, e);
                painter.text(plot_rect.center(), Align2::CENTER_CENTER, e.to_string(), FontId::proportional(14.0), GREY_COLOR);
                return response;
            }
        };
        let transform = PlotTransform::new(plot_rect, bounds);

        self.draw_axes(&painter, &transform);

        let plot_painter = painter.with_clip_rect(plot_rect);
        for (index, renderer) in self.renderers.iter_mut().enumerate() {
            if renderer.is_visible() {
                draw_renderer(ui.ctx(), &plot_painter, &transform, index, renderer);
            }
        }
        painter.rect_stroke(plot_rect, 0.0, Stroke::new(1.0, GREY_COLOR), StrokeKind::Inside);

        if let Some(label) = self.draw_legend(ui, &painter, plot_rect, &response) {
            self.toggle_legend_item(&label);
        }

        if let Some(pos) = response.hover_pos().filter(|p| plot_rect.contains(*p)) {
            self.draw_hover(ui, &painter, &transform, pos);
        }

        response
    }

    /// Grid lines plus tick labels; y on the right, x along the bottom
    fn draw_axes(&self, painter: &Painter, transform: &PlotTransform) {
        let rect = transform.rect;
        let bounds = transform.bounds;
        let font = FontId::proportional(FONT_SIZE);

        for tick in calculate_axis_ticks(bounds.y_min, bounds.y_max, 5) {
            let y = transform.y_to_screen(tick);
            painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], Stroke::new(1.0, GRID_COLOR));
            painter.line_segment(
                [Pos2::new(rect.right(), y), Pos2::new(rect.right() + TICK_LENGTH, y)],
                Stroke::new(1.0, GREY_COLOR),
            );
            painter.text(
                Pos2::new(rect.right() + TICK_LENGTH + 2.0, y),
                Align2::LEFT_CENTER,
                format_compact(tick),
                font.clone(),
                BLACK_COLOR,
            );
        }

        let max_ticks = ((rect.width() / 120.0) as usize).max(2);
        let span = bounds.x_max - bounds.x_min;
        for tick in calculate_axis_ticks(bounds.x_min, bounds.x_max, max_ticks) {
            let x = transform.x_to_screen(tick);
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], Stroke::new(1.0, GRID_COLOR));
            painter.line_segment(
                [Pos2::new(x, rect.bottom()), Pos2::new(x, rect.bottom() + TICK_LENGTH)],
                Stroke::new(1.0, GREY_COLOR),
            );
            painter.text(
                Pos2::new(x, rect.bottom() + TICK_LENGTH + 2.0),
                Align2::CENTER_TOP,
                format_x_label(self.x_axis_type, tick, span),
                font.clone(),
                BLACK_COLOR,
            );
        }
    }

    /// Legend box in the top-right corner; returns the label clicked this frame
    fn draw_legend(&self, ui: &mut Ui, painter: &Painter, plot_rect: Rect, response: &Response) -> Option<String> {
        if !self.legend.visible {
            return None;
        }
        let items = self.legend_items();
        if items.is_empty() {
            return None;
        }

        let font = FontId::proportional(FONT_SIZE);
        let char_width = ui.fonts_mut(|f| f.glyph_width(&font, 'M'));
        let longest = items.iter().map(|i| i.label.chars().count()).max().unwrap_or(0);
        let width = LEGEND_SWATCH_WIDTH + TOOLTIP_PADDING * 3.0 + char_width * longest as f32;
        let legend_rect = Rect::from_min_size(
            Pos2::new(plot_rect.right() - width - MARGIN, plot_rect.top() + MARGIN),
            Vec2::new(width, LEGEND_ROW_HEIGHT * items.len() as f32 + TOOLTIP_PADDING),
        );
        painter.rect_filled(legend_rect, 2.0, with_alpha(WHITE_COLOR, 0.85));
        painter.rect_stroke(legend_rect, 2.0, Stroke::new(1.0, GRID_COLOR), StrokeKind::Inside);

        let click_pos = if response.clicked() { response.interact_pointer_pos() } else { None };
        let mut clicked = None;

        for (i, item) in items.iter().enumerate() {
            let row = Rect::from_min_size(
                Pos2::new(
                    legend_rect.left(),
                    legend_rect.top() + TOOLTIP_PADDING / 2.0 + LEGEND_ROW_HEIGHT * i as f32,
                ),
                Vec2::new(width, LEGEND_ROW_HEIGHT),
            );
            let Some(first) = item.renderers.first().map(|&r| &self.renderers[r]) else {
                continue;
            };
            let inactive = item
                .renderers
                .iter()
                .all(|&r| self.renderers[r].is_muted() || !self.renderers[r].is_visible());

            let style = first.get_style();
            let (color, alpha) = style.stroke_color(inactive);
            let swatch = Rect::from_center_size(
                Pos2::new(row.left() + TOOLTIP_PADDING + LEGEND_SWATCH_WIDTH / 2.0, row.center().y),
                Vec2::new(LEGEND_SWATCH_WIDTH, LEGEND_ROW_HEIGHT / 2.0),
            );
            match first.glyph() {
                Glyph::VBar { .. } | Glyph::HBar { .. } | Glyph::ImageRgba { .. } => {
                    let (fill, fill_alpha) = style.fill(inactive);
                    painter.rect_filled(swatch, 0.0, with_alpha(fill, fill_alpha));
                }
                Glyph::Line { .. } | Glyph::Segment { .. } => {
                    painter.line_segment(
                        [swatch.left_center(), swatch.right_center()],
                        Stroke::new(style.line_width.max(2.0), with_alpha(color, alpha)),
                    );
                }
            }
            painter.text(
                Pos2::new(swatch.right() + TOOLTIP_PADDING, row.center().y),
                Align2::LEFT_CENTER,
                &item.label,
                font.clone(),
                if inactive { GREY_COLOR } else { BLACK_COLOR },
            );

            if click_pos.is_some_and(|p| row.contains(p)) {
                clicked = Some(item.label.clone());
            }
        }
        clicked
    }

    /// Info box for the first renderer under the pointer that a hover tool accepts
    fn draw_hover(&self, ui: &mut Ui, painter: &Painter, transform: &PlotTransform, pos: Pos2) {
        let (x, y) = transform.to_data(pos);
        let x_span = transform.bounds.x_max - transform.bounds.x_min;
        let x_tolerance = (HIT_TOLERANCE / transform.rect.width()) as f64 * x_span;

        let mut lines = Vec::new();
        'tools: for tool in &self.tools {
            let candidates = self
                .renderers
                .iter()
                .filter(|r| r.is_visible() && tool.matches(r.get_name()));
            for renderer in candidates {
                let Ok(source) = read_source(&renderer.source) else {
                    continue;
                };
                if let Some(row) = renderer.glyph().hit_test(&source, x, y, x_tolerance) {
                    lines = tool.render(&source, HoverPoint { row, x, y });
                    break 'tools;
                }
            }
        }
        if lines.is_empty() {
            return;
        }

        let text = lines
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect::<Vec<_>>()
            .join("\n");
        let font = FontId::proportional(FONT_SIZE);
        let char_width = ui.fonts_mut(|f| f.glyph_width(&font, '0'));
        let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let box_size = Vec2::new(
            char_width * longest as f32 + TOOLTIP_PADDING * 2.0,
            (FONT_SIZE + 4.0) * lines.len() as f32 + TOOLTIP_PADDING * 2.0,
        );

        // Keep the box on the side of the pointer with more room
        let plot = transform.rect;
        let left = if pos.x + 12.0 + box_size.x > plot.right() {
            pos.x - 12.0 - box_size.x
        } else {
            pos.x + 12.0
        };
        let top = (pos.y + 12.0).min(plot.bottom() - box_size.y).max(plot.top());
        let info_rect = Rect::from_min_size(Pos2::new(left, top), box_size);

        painter.rect_filled(info_rect, 4.0, Color32::from_rgba_unmultiplied(0, 0, 0, 200));
        painter.rect_stroke(info_rect, 4.0, Stroke::new(1.0, GREY_COLOR), StrokeKind::Inside);
        painter.text(
            Pos2::new(info_rect.left() + TOOLTIP_PADDING, info_rect.top() + TOOLTIP_PADDING),
            Align2::LEFT_TOP,
            text,
            font,
            WHITE_COLOR,
        );
    }
}

/// Tick label for an x value
pub(crate) fn format_x_label(axis: AxisType, value: f64, span: f64) -> String {
    match axis {
        AxisType::Linear => format_compact(value),
        AxisType::Datetime => match ms_to_datetime(value) {
            Some(dt) if span >= DAY_MS * 2.0 => dt.format("%Y-%m-%d").to_string(),
            Some(dt) => dt.format("%m-%d %H:%M").to_string(),
            None => String::new(),
        },
    }
}

fn draw_renderer(ctx: &Context, painter: &Painter, transform: &PlotTransform, index: usize, renderer: &mut GlyphRenderer) {
    let source = match read_source(&renderer.source) {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!("skipping renderer {}: {}", index, e);
            return;
        }
    };

    let muted = renderer.muted;
    let style = &renderer.style;
    let (color, alpha) = style.stroke_color(muted);
    let stroke = Stroke::new(style.line_width, with_alpha(color, alpha));
    let (fill, fill_alpha) = style.fill(muted);
    let fill = with_alpha(fill, fill_alpha);
    let rows = renderer.glyph.row_count(&source);

    match &renderer.glyph {
        Glyph::Line { x, y } => {
            // Missing values split the line into runs
            let mut run: Vec<Pos2> = Vec::new();
            for row in 0..rows {
                match (x.resolve(&source, row), y.resolve(&source, row)) {
                    (Some(x), Some(y)) if x.is_finite() && y.is_finite() => run.push(transform.to_screen(x, y)),
                    _ => flush_line(painter, &mut run, stroke),
                }
            }
            flush_line(painter, &mut run, stroke);
        }
        Glyph::Segment { x0, y0, x1, y1 } => {
            for row in 0..rows {
                let ends = (
                    x0.resolve(&source, row),
                    y0.resolve(&source, row),
                    x1.resolve(&source, row),
                    y1.resolve(&source, row),
                );
                if let (Some(ax), Some(ay), Some(bx), Some(by)) = ends {
                    painter.line_segment([transform.to_screen(ax, ay), transform.to_screen(bx, by)], stroke);
                }
            }
        }
        Glyph::VBar { x, width, top, bottom } => {
            for row in 0..rows {
                if let Some((l, r, b, t)) = vbar_rect(&source, row, x, width, top, bottom) {
                    paint_bar(painter, transform, (l, r, b, t), fill, stroke);
                }
            }
        }
        Glyph::HBar { y, height, right, left } => {
            for row in 0..rows {
                if let Some((l, r, b, t)) = hbar_rect(&source, row, y, height, right, left) {
                    paint_bar(painter, transform, (l, r, b, t), fill, stroke);
                }
            }
        }
        Glyph::ImageRgba { image, cols, rows: img_rows, x, y, dw, dh } => {
            let revision = source.revision();
            let cached = renderer.texture.as_ref().is_some_and(|(rev, _)| *rev == revision);
            if !cached {
                match build_color_image(&source, image, *cols, *img_rows) {
                    Some(color_image) => {
                        let texture = ctx.load_texture(
                            format!("figkit-image-{}", index),
                            color_image,
                            TextureOptions::NEAREST,
                        );
                        renderer.texture = Some((revision, texture));
                    }
                    None => {
                        tracing::warn!("image column '{}' does not hold {}x{} pixels", image, img_rows, cols);
                        return;
                    }
                }
            }
            if let Some((_, texture)) = &renderer.texture {
                let rect = Rect::from_two_pos(transform.to_screen(*x, *y), transform.to_screen(x + dw, y + dh));
                let uv = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0));
                let tint = if muted { with_alpha(Color32::WHITE, renderer.style.muted_alpha) } else { Color32::WHITE };
                painter.image(texture.id(), rect, uv, tint);
            }
        }
    }
}

fn flush_line(painter: &Painter, run: &mut Vec<Pos2>, stroke: Stroke) {
    if run.len() > 1 {
        painter.add(Shape::line(std::mem::take(run), stroke));
    } else {
        run.clear();
    }
}

fn paint_bar(painter: &Painter, transform: &PlotTransform, (l, r, b, t): (f64, f64, f64, f64), fill: Color32, stroke: Stroke) {
    let rect = Rect::from_two_pos(transform.to_screen(l, t), transform.to_screen(r, b));
    painter.rect_filled(rect, 0.0, fill);
    painter.rect_stroke(rect, 0.0, stroke, StrokeKind::Inside);
}

/// Texture image from a packed pixel column, flipped back to top-down order
fn build_color_image(source: &ColumnDataSource, column: &str, cols: usize, rows: usize) -> Option<ColorImage> {
    let pixels = source.get(column)?.as_packed()?;
    if cols == 0 || rows == 0 || pixels.len() != cols * rows {
        return None;
    }
    let image = RgbaImage {
        rows,
        cols,
        pixels: pixels.to_vec(),
    };
    Some(ColorImage::from_rgba_unmultiplied([cols, rows], &image.to_rgba_bytes_top_down()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::bbands::BbandsOptions;
    use crate::chart::figure::ClickPolicy;
    use crate::chart::image::{GrayscaleOptions, IntensityImage};
    use crate::series::Series;
    use crate::source::{shared, Column};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_x_label() {
        let ms = Utc.with_ymd_and_hms(2019, 5, 1, 6, 30, 0).unwrap().timestamp_millis() as f64;
        assert_eq!(format_x_label(AxisType::Datetime, ms, DAY_MS * 30.0), "2019-05-01");
        assert_eq!(format_x_label(AxisType::Datetime, ms, DAY_MS / 2.0), "05-01 06:30");
        assert_eq!(format_x_label(AxisType::Linear, 2.5, 10.0), "2.5");
    }

    #[test]
    fn test_build_color_image() {
        let source = ColumnDataSource::from_columns([
            ("image", Column::from(vec![u32::from_le_bytes([0, 0, 0, 255]), u32::from_le_bytes([255, 255, 255, 255])])),
            ("numbers", Column::from(vec![1.0, 2.0])),
        ]);
        // Bottom row is black, so the top-down texture starts white
        let image = build_color_image(&source, "image", 1, 2).unwrap();
        assert_eq!(image.size, [1, 2]);
        assert_eq!(image.pixels[0], Color32::WHITE);
        assert_eq!(image.pixels[1], Color32::BLACK);

        assert!(build_color_image(&source, "image", 2, 2).is_none());
        assert!(build_color_image(&source, "numbers", 1, 2).is_none());
    }

    #[test]
    fn test_show_headless() {
        let mut fig = Figure::default();
        fig.legend.click_policy = ClickPolicy::Mute;
        let values: Vec<f64> = (0..50).map(|i| (i as f64 * 0.3).sin() * 10.0).collect();
        fig.bbands(&Series::from_values(values), BbandsOptions::default()).unwrap();
        fig.grayscale(&IntensityImage::from_rows(&[[0i64, 15], [7, 3]]).unwrap(), GrayscaleOptions::default())
            .unwrap();
        fig.line("x", "y", shared(ColumnDataSource::new()));

        let ctx = Context::default();
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    fig.show(ui);
                });
            });
        }
        let image_renderer = fig.renderers().iter().find(|r| matches!(r.glyph(), Glyph::ImageRgba { .. }));
        assert!(image_renderer.is_some_and(|r| r.texture.is_some()));
    }
}
