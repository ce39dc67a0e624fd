//! Software rendering of dials onto an RGBA framebuffer.
//!
//! Everything here is presentation: the gauge core hands over tick marks
//! and a needle angle in dial degrees (0 = top, clockwise positive) and
//! this module rasterizes them with anti-aliased primitives.

use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::gauge::Ticks;
use crate::ClusterError;

/// RGB color for dial elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);
    pub const RED: Color = Color::new(0xdc, 0x26, 0x26);
}

/// Where a dial sits on the framebuffer.
#[derive(Debug, Clone, Copy)]
pub struct DialLayout {
    pub cx: i32,
    pub cy: i32,
    pub radius: i32,
}

/// Visual knobs for one dial.
#[derive(Debug, Clone)]
pub struct DialStyle {
    pub arc_thickness: i32,
    pub major_tick_length: i32,
    pub minor_tick_length: i32,
    pub major_tick_thickness: f32,
    pub minor_tick_thickness: f32,
    pub needle_length_factor: f64,
    pub needle_back_length: f64,
    pub needle_width: f32,
    pub hub_radius: i32,
    pub label_font_size: f32,
    pub ticks_to_labels_distance: f64,
    pub band_width: i32,
}

impl Default for DialStyle {
    fn default() -> Self {
        Self {
            arc_thickness: 4,
            major_tick_length: 18,
            minor_tick_length: 10,
            major_tick_thickness: 2.0,
            minor_tick_thickness: 0.5,
            needle_length_factor: 0.85,
            needle_back_length: 24.0,
            needle_width: 4.0,
            hub_radius: 6,
            label_font_size: 22.0,
            ticks_to_labels_distance: 22.0,
            band_width: 14,
        }
    }
}

/// A borrowed RGBA frame with pixel blending.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    fn blend(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        if idx + 4 > self.frame.len() {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        for (i, c) in [color.r, color.g, color.b].into_iter().enumerate() {
            let dst = self.frame[idx + i] as f32;
            self.frame[idx + i] = (c as f32 * a + dst * (1.0 - a)).round() as u8;
        }
        self.frame[idx + 3] = 0xff;
    }
}

/// Dial degrees (0 = top, clockwise) to framebuffer radians
/// (0 = +x, y grows downward).
fn dial_radians(angle_deg: f64) -> f64 {
    (angle_deg - 90.0).to_radians()
}

/// Point on a circle around the layout center, in dial degrees.
fn on_circle(layout: DialLayout, angle_deg: f64, radius: f64) -> (f64, f64) {
    let rad = dial_radians(angle_deg);
    (
        layout.cx as f64 + rad.cos() * radius,
        layout.cy as f64 + rad.sin() * radius,
    )
}

/// Anti-aliased thick line; tapered lines thin out toward the far end,
/// which is what needles want.
pub fn draw_line(
    canvas: &mut Canvas,
    (x0, y0): (i32, i32),
    (x1, y1): (i32, i32),
    thickness: f32,
    tapered: bool,
    color: Color,
) {
    let pad = thickness.ceil() as i32 + 1;
    let dx = (x1 - x0) as f32;
    let dy = (y1 - y0) as f32;
    let len_sq = (dx * dx + dy * dy).max(1.0);
    for y in (y0.min(y1) - pad)..=(y0.max(y1) + pad) {
        for x in (x0.min(x1) - pad)..=(x0.max(x1) + pad) {
            let px = (x - x0) as f32;
            let py = (y - y0) as f32;
            let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
            let nearest_x = x0 as f32 + t * dx;
            let nearest_y = y0 as f32 + t * dy;
            let dist =
                ((nearest_x - x as f32).powi(2) + (nearest_y - y as f32).powi(2)).sqrt();
            let local_thickness = if tapered {
                // Keep 5% at the tip so the needle point stays visible.
                thickness * (1.0 - t * 0.95)
            } else {
                thickness
            };
            let alpha = (1.0 - (dist - local_thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if alpha > 0.01 {
                canvas.blend(x, y, color, alpha);
            }
        }
    }
}

pub fn draw_circle(canvas: &mut Canvas, cx: i32, cy: i32, radius: i32, color: Color) {
    for y in -radius..=radius {
        for x in -radius..=radius {
            let dist = ((x * x + y * y) as f64).sqrt();
            if dist <= radius as f64 + 1.0 {
                let alpha = if dist > radius as f64 {
                    1.0 - (dist - radius as f64).min(1.0)
                } else {
                    1.0
                };
                if alpha > 0.0 {
                    canvas.blend(cx + x, cy + y, color, alpha as f32);
                }
            }
        }
    }
}

/// Annular arc between two dial angles. `outer_radius` and `thickness` are
/// in pixels; only the bounding box of the circle is scanned.
pub fn draw_arc(
    canvas: &mut Canvas,
    layout: DialLayout,
    from_deg: f64,
    to_deg: f64,
    outer_radius: i32,
    thickness: i32,
    color: Color,
) {
    let (lo, hi) = if from_deg <= to_deg {
        (from_deg, to_deg)
    } else {
        (to_deg, from_deg)
    };
    let tau = 2.0 * std::f64::consts::PI;
    let start = dial_radians(lo).rem_euclid(tau);
    let end = dial_radians(hi).rem_euclid(tau);
    let outer = outer_radius as f64;
    let inner = (outer_radius - thickness) as f64;

    for y in (layout.cy - outer_radius - 1)..=(layout.cy + outer_radius + 1) {
        for x in (layout.cx - outer_radius - 1)..=(layout.cx + outer_radius + 1) {
            let dx = (x - layout.cx) as f64;
            let dy = (y - layout.cy) as f64;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < inner - 1.0 || dist > outer + 1.0 {
                continue;
            }
            let angle = dy.atan2(dx).rem_euclid(tau);
            let in_arc = if start <= end {
                angle >= start && angle <= end
            } else {
                angle >= start || angle <= end
            };
            if !in_arc {
                continue;
            }
            let alpha = if dist > outer {
                1.0 - (dist - outer).min(1.0)
            } else if dist < inner {
                1.0 - (inner - dist).min(1.0)
            } else {
                1.0
            };
            if alpha > 0.0 {
                canvas.blend(x, y, color, alpha as f32);
            }
        }
    }
}

/// Draw text centered on (x, y). No-op when the style has no font.
pub fn draw_text(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    text: &str,
    font: &Font,
    font_size: f32,
    color: Color,
) {
    let scale = Scale::uniform(font_size);
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> =
        font.layout(text, scale, point(0.0, v_metrics.ascent)).collect();

    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |acc, bb| {
            (
                acc.0.min(bb.min.x),
                acc.1.max(bb.max.x),
                acc.2.min(bb.min.y),
                acc.3.max(bb.max.y),
            )
        },
    );
    if min_x >= max_x {
        return;
    }
    let offset_x = x - (max_x - min_x) / 2;
    let offset_y = y - (max_y - min_y) / 2;
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                canvas.blend(px, py, color, v);
            });
        }
    }
}

/// Dial face: sweep arc, tick marks, and labels on the major ticks.
#[allow(clippy::too_many_arguments)]
pub fn draw_dial(
    canvas: &mut Canvas,
    layout: DialLayout,
    sweep: (f64, f64),
    ticks: &Ticks,
    style: &DialStyle,
    font: Option<&Font>,
    color: Color,
) {
    draw_arc(
        canvas,
        layout,
        sweep.0,
        sweep.1,
        layout.radius,
        style.arc_thickness,
        color,
    );

    for tick in &ticks.minor {
        draw_tick(
            canvas,
            layout,
            tick.angle,
            style.minor_tick_length,
            style.minor_tick_thickness,
            color,
        );
    }
    for tick in &ticks.major {
        draw_tick(
            canvas,
            layout,
            tick.angle,
            style.major_tick_length,
            style.major_tick_thickness,
            color,
        );
        if let Some(font) = font {
            let label_radius = layout.radius as f64
                - style.major_tick_length as f64
                - style.ticks_to_labels_distance;
            let (lx, ly) = on_circle(layout, tick.angle, label_radius);
            draw_text(
                canvas,
                lx as i32,
                ly as i32,
                &format!("{}", tick.value.round() as i64),
                font,
                style.label_font_size,
                color,
            );
        }
    }
}

/// Highlighted arc segment along the rim, e.g. a tachometer red line zone.
pub fn draw_band(
    canvas: &mut Canvas,
    layout: DialLayout,
    from_deg: f64,
    to_deg: f64,
    style: &DialStyle,
    color: Color,
) {
    draw_arc(
        canvas,
        layout,
        from_deg,
        to_deg,
        layout.radius - style.arc_thickness,
        style.band_width,
        color,
    );
}

/// Needle at a dial angle: tapered front, short back extension, hub dot.
pub fn draw_needle(
    canvas: &mut Canvas,
    layout: DialLayout,
    angle_deg: f64,
    style: &DialStyle,
    color: Color,
) {
    let tip = on_circle(
        layout,
        angle_deg,
        layout.radius as f64 * style.needle_length_factor,
    );
    let back = on_circle(layout, angle_deg + 180.0, style.needle_back_length);
    let center = (layout.cx, layout.cy);
    draw_line(
        canvas,
        center,
        (tip.0 as i32, tip.1 as i32),
        style.needle_width,
        true,
        color,
    );
    draw_line(
        canvas,
        center,
        (back.0 as i32, back.1 as i32),
        style.needle_width,
        false,
        color,
    );
    draw_circle(canvas, layout.cx, layout.cy, style.hub_radius, color);
}

fn draw_tick(
    canvas: &mut Canvas,
    layout: DialLayout,
    angle_deg: f64,
    length: i32,
    thickness: f32,
    color: Color,
) {
    let outer = on_circle(layout, angle_deg, layout.radius as f64 - 1.0);
    let inner = on_circle(layout, angle_deg, (layout.radius - length) as f64);
    draw_line(
        canvas,
        (inner.0.round() as i32, inner.1.round() as i32),
        (outer.0.round() as i32, outer.1.round() as i32),
        thickness,
        false,
        color,
    );
}

/// Load a label font from disk. The rusttype parser returns `None` on
/// malformed data, which surfaces as a [`ClusterError::Font`].
pub fn load_font(path: &std::path::Path) -> Result<Font<'static>, ClusterError> {
    let data = std::fs::read(path)?;
    Font::try_from_vec(data).ok_or_else(|| ClusterError::Font(path.display().to_string()))
}
