//! Heuristic text measurement.
//!
//! Character-count estimation with greedy word wrapping. This is the
//! fallback used when no backend supplies real font metrics; a renderer with
//! access to shaped glyph data should install its own [`ContentMeasure`]
//! implementation instead.
//!
//! [`ContentMeasure`]: crate::measure::ContentMeasure

/// Average glyph width as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f64 = 0.5;

/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Baseline offset from the top of a line, as a fraction of the font size.
const BASELINE_FACTOR: f64 = 0.8;

/// Measured text metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMetrics {
    /// Width of the widest line
    pub width: f64,
    /// Total height including line height
    pub height: f64,
    /// Baseline offset from the top
    pub baseline: f64,
    /// Number of lines
    pub lines: u32,
}

/// Measure text at the given font size, wrapping against `max_width` when
/// one is supplied.
pub fn measure_text(text: &str, font_size: f64, max_width: Option<f64>) -> TextMetrics {
    let line_height = font_size * LINE_HEIGHT_FACTOR;
    let baseline = font_size * BASELINE_FACTOR;

    if text.is_empty() {
        return TextMetrics {
            width: 0.0,
            height: line_height,
            baseline,
            lines: 1,
        };
    }

    let char_width = font_size * CHAR_WIDTH_FACTOR;

    match max_width {
        Some(max_w) if max_w > 0.0 => measure_wrapped(text, char_width, line_height, baseline, max_w),
        _ => measure_single_line(text, char_width, line_height, baseline),
    }
}

fn measure_single_line(
    text: &str,
    char_width: f64,
    line_height: f64,
    baseline: f64,
) -> TextMetrics {
    let char_count = text.chars().count();
    TextMetrics {
        width: char_count as f64 * char_width,
        height: line_height,
        baseline,
        lines: 1,
    }
}

fn measure_wrapped(
    text: &str,
    char_width: f64,
    line_height: f64,
    baseline: f64,
    max_width: f64,
) -> TextMetrics {
    let space_width = char_width;

    let mut max_line_width: f64 = 0.0;
    let mut line_count: u32 = 0;
    let mut current_line_width = 0.0;

    for word in text.split_whitespace() {
        let word_width = word.chars().count() as f64 * char_width;

        if current_line_width == 0.0 {
            current_line_width = word_width;
        } else if current_line_width + space_width + word_width <= max_width {
            current_line_width += space_width + word_width;
        } else {
            max_line_width = max_line_width.max(current_line_width);
            line_count += 1;
            current_line_width = word_width;
        }
    }

    if current_line_width > 0.0 {
        max_line_width = max_line_width.max(current_line_width);
        line_count += 1;
    }

    let line_count = line_count.max(1);

    TextMetrics {
        width: max_line_width,
        height: line_count as f64 * line_height,
        baseline,
        lines: line_count,
    }
}
