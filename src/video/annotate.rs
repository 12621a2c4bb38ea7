//! Frame annotation: detection rectangles and labels
//!
//! Two visually distinct styles: detections matching the current focus are
//! drawn in green, everything else in blue. Text uses a built-in 5x7 bitmap
//! font so no font asset is needed.

use crate::detect::Detection;
use crate::video::Frame;

/// Color for detections matching the current focus
pub const FOCUS_COLOR: u32 = 0x0000_FF00;

/// Color for all other detections
pub const OTHER_COLOR: u32 = 0x0000_60FF;

const BOX_THICKNESS: usize = 2;
const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;
const GLYPH_SPACING: usize = 1;

/// Draw one detection onto the frame
///
/// Coordinates outside the frame are clamped; a fully off-screen box draws
/// nothing. The label line reads `"<label> <confidence>"` and sits just above
/// the box, clamped so it never leaves the top of the frame.
pub fn draw_detection(frame: &mut Frame, det: &Detection, is_focus: bool) {
    let color = if is_focus { FOCUS_COLOR } else { OTHER_COLOR };

    let (w, h) = (frame.width(), frame.height());
    if w == 0 || h == 0 {
        return;
    }

    let clamp_x = |v: f32| -> usize { (v.max(0.0) as usize).min(w - 1) };
    let clamp_y = |v: f32| -> usize { (v.max(0.0) as usize).min(h - 1) };

    let x1 = clamp_x(det.bbox.x1.min(det.bbox.x2));
    let x2 = clamp_x(det.bbox.x1.max(det.bbox.x2));
    let y1 = clamp_y(det.bbox.y1.min(det.bbox.y2));
    let y2 = clamp_y(det.bbox.y1.max(det.bbox.y2));

    draw_rect(frame, x1, y1, x2, y2, color);

    let text = format!("{} {:.2}", det.label, det.confidence);
    let ty = y1.saturating_sub(GLYPH_HEIGHT + 3);
    draw_text(frame, x1, ty, &text, color);
}

fn draw_rect(frame: &mut Frame, x1: usize, y1: usize, x2: usize, y2: usize, color: u32) {
    for t in 0..BOX_THICKNESS {
        for x in x1..=x2 {
            frame.set(x, y1 + t, color);
            frame.set(x, y2.saturating_sub(t), color);
        }
        for y in y1..=y2 {
            frame.set(x1 + t, y, color);
            frame.set(x2.saturating_sub(t), y, color);
        }
    }
}

/// Render a text line at (x, y) = top-left corner
pub fn draw_text(frame: &mut Frame, x: usize, y: usize, text: &str, color: u32) {
    let mut cx = x;
    for ch in text.chars() {
        let glyph = glyph_for(ch);
        for (col, bits) in glyph.iter().enumerate() {
            for row in 0..GLYPH_HEIGHT {
                if bits >> row & 1 == 1 {
                    frame.set(cx + col, y + row, color);
                }
            }
        }
        cx += GLYPH_WIDTH + GLYPH_SPACING;
    }
}

/// 5x7 glyph, one byte per column, bit 0 = top row
///
/// Covers what detector labels and confidence scores need: lowercase ASCII,
/// digits, dot, space. Anything else renders as a filled box.
fn glyph_for(ch: char) -> [u8; 5] {
    match ch.to_ascii_lowercase() {
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x60, 0x60, 0x00, 0x00],
        '-' => [0x08, 0x08, 0x08, 0x08, 0x08],
        '0' => [0x3E, 0x51, 0x49, 0x45, 0x3E],
        '1' => [0x00, 0x42, 0x7F, 0x40, 0x00],
        '2' => [0x42, 0x61, 0x51, 0x49, 0x46],
        '3' => [0x21, 0x41, 0x45, 0x4B, 0x31],
        '4' => [0x18, 0x14, 0x12, 0x7F, 0x10],
        '5' => [0x27, 0x45, 0x45, 0x45, 0x39],
        '6' => [0x3C, 0x4A, 0x49, 0x49, 0x30],
        '7' => [0x01, 0x71, 0x09, 0x05, 0x03],
        '8' => [0x36, 0x49, 0x49, 0x49, 0x36],
        '9' => [0x06, 0x49, 0x49, 0x29, 0x1E],
        'a' => [0x20, 0x54, 0x54, 0x54, 0x78],
        'b' => [0x7F, 0x48, 0x44, 0x44, 0x38],
        'c' => [0x38, 0x44, 0x44, 0x44, 0x20],
        'd' => [0x38, 0x44, 0x44, 0x48, 0x7F],
        'e' => [0x38, 0x54, 0x54, 0x54, 0x18],
        'f' => [0x08, 0x7E, 0x09, 0x01, 0x02],
        'g' => [0x0C, 0x52, 0x52, 0x52, 0x3E],
        'h' => [0x7F, 0x08, 0x04, 0x04, 0x78],
        'i' => [0x00, 0x44, 0x7D, 0x40, 0x00],
        'j' => [0x20, 0x40, 0x44, 0x3D, 0x00],
        'k' => [0x7F, 0x10, 0x28, 0x44, 0x00],
        'l' => [0x00, 0x41, 0x7F, 0x40, 0x00],
        'm' => [0x7C, 0x04, 0x18, 0x04, 0x78],
        'n' => [0x7C, 0x08, 0x04, 0x04, 0x78],
        'o' => [0x38, 0x44, 0x44, 0x44, 0x38],
        'p' => [0x7C, 0x14, 0x14, 0x14, 0x08],
        'q' => [0x08, 0x14, 0x14, 0x18, 0x7C],
        'r' => [0x7C, 0x08, 0x04, 0x04, 0x08],
        's' => [0x48, 0x54, 0x54, 0x54, 0x20],
        't' => [0x04, 0x3F, 0x44, 0x40, 0x20],
        'u' => [0x3C, 0x40, 0x40, 0x20, 0x7C],
        'v' => [0x1C, 0x20, 0x40, 0x20, 0x1C],
        'w' => [0x3C, 0x40, 0x30, 0x40, 0x3C],
        'x' => [0x44, 0x28, 0x10, 0x28, 0x44],
        'y' => [0x0C, 0x50, 0x50, 0x50, 0x3C],
        'z' => [0x44, 0x64, 0x54, 0x4C, 0x44],
        _ => [0x7F, 0x7F, 0x7F, 0x7F, 0x7F],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{BoundingBox, Detection};

    fn detection(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection {
            bbox: BoundingBox { x1, y1, x2, y2 },
            confidence: 0.9,
            label: "dog".to_string(),
        }
    }

    #[test]
    fn focus_and_other_use_distinct_colors() {
        assert_ne!(FOCUS_COLOR, OTHER_COLOR);

        let mut a = Frame::blank(64, 64);
        let mut b = Frame::blank(64, 64);
        let det = detection(10.0, 20.0, 50.0, 60.0);

        draw_detection(&mut a, &det, true);
        draw_detection(&mut b, &det, false);

        assert_eq!(a.get(10, 20), Some(FOCUS_COLOR));
        assert_eq!(b.get(10, 20), Some(OTHER_COLOR));
    }

    #[test]
    fn box_edges_are_drawn() {
        let mut frame = Frame::blank(64, 64);
        draw_detection(&mut frame, &detection(10.0, 20.0, 50.0, 60.0), true);

        assert_eq!(frame.get(30, 20), Some(FOCUS_COLOR)); // top
        assert_eq!(frame.get(30, 60), Some(FOCUS_COLOR)); // bottom
        assert_eq!(frame.get(10, 40), Some(FOCUS_COLOR)); // left
        assert_eq!(frame.get(50, 40), Some(FOCUS_COLOR)); // right
        assert_eq!(frame.get(30, 40), Some(0)); // interior untouched
    }

    #[test]
    fn out_of_frame_coordinates_are_clamped() {
        let mut frame = Frame::blank(32, 32);
        draw_detection(&mut frame, &detection(-50.0, -50.0, 500.0, 500.0), false);
        // Clamped to the frame border, no panic
        assert_eq!(frame.get(0, 0), Some(OTHER_COLOR));
        assert_eq!(frame.get(31, 31), Some(OTHER_COLOR));
    }

    #[test]
    fn text_renders_near_the_top_without_panic() {
        let mut frame = Frame::blank(64, 64);
        // Box at the very top: label would go negative, must clamp to y=0
        draw_detection(&mut frame, &detection(0.0, 0.0, 30.0, 30.0), true);
    }

    #[test]
    fn draw_text_marks_pixels() {
        let mut frame = Frame::blank(64, 16);
        draw_text(&mut frame, 1, 1, "dog 0.87", 0xFF_FFFF);
        assert!(frame.pixels().iter().any(|&p| p == 0xFF_FFFF));
    }
}
