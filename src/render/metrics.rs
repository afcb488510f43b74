//! Text measurement for the built-in Helvetica faces
//!
//! Widths are the standard AFM advance widths in thousandths of an em,
//! which every PDF viewer guarantees for the core fonts. The layout only
//! ever measures what it is about to draw, so a small ASCII table plus a
//! typical-glyph fallback is all it needs.

use crate::render::layout::FontFace;

/// Points to millimetres
pub(crate) const PT_TO_MM: f64 = 25.4 / 72.0;

/// Advance width assumed for glyphs outside the ASCII table
const FALLBACK_WIDTH: u16 = 556;

/// Helvetica advance widths for ASCII 32..=126
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32..=47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48..=63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64..=79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80..=95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96..=111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112..=126
];

/// Helvetica-Bold advance widths for ASCII 32..=126
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32..=47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48..=63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64..=79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80..=95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96..=111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112..=126
];

fn advance(face: FontFace, ch: char) -> u16 {
    let table = match face {
        FontFace::Bold => &HELVETICA_BOLD,
        // The oblique face shares the upright metrics
        FontFace::Regular | FontFace::Italic => &HELVETICA,
    };
    match u32::from(ch) {
        code @ 32..=126 => table[(code - 32) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` in millimetres when set in `face` at `size` points
pub fn text_width(face: FontFace, size: f64, text: &str) -> f64 {
    let units: u32 = text.chars().map(|ch| u32::from(advance(face, ch))).sum();
    f64::from(units) / 1000.0 * size * PT_TO_MM
}

/// Wrap `text` to lines no wider than `max_width` millimetres
///
/// Explicit newlines are honored and one trailing newline is dropped.
/// Lines break at spaces; a single word wider than the whole line is
/// split hard so every line fits. The result has at least one line.
pub fn wrap(face: FontFace, size: f64, text: &str, max_width: f64) -> Vec<String> {
    let mut source = text.replace('\r', "");
    if source.ends_with('\n') {
        source.pop();
    }

    let mut lines = Vec::new();
    for segment in source.split('\n') {
        wrap_segment(face, size, segment, max_width, &mut lines);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_segment(face: FontFace, size: f64, segment: &str, max_width: f64, out: &mut Vec<String>) {
    let mut line = String::new();
    for word in segment.split(' ') {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if text_width(face, size, &candidate) <= max_width {
            line = candidate;
            continue;
        }
        if !line.is_empty() {
            out.push(std::mem::take(&mut line));
        }
        let mut rest = word;
        while text_width(face, size, rest) > max_width {
            let split = hard_split_index(face, size, rest, max_width);
            out.push(rest[..split].to_string());
            rest = &rest[split..];
        }
        line = rest.to_string();
    }
    out.push(line);
}

/// Byte index of the widest prefix that fits, always at least one char
fn hard_split_index(face: FontFace, size: f64, word: &str, max_width: f64) -> usize {
    let mut end = 0;
    for (idx, ch) in word.char_indices() {
        let next = idx + ch.len_utf8();
        if text_width(face, size, &word[..next]) > max_width && idx > 0 {
            return idx;
        }
        end = next;
    }
    end
}
