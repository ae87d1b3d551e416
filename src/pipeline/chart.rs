//! Horizontal bar chart of the top words.
//!
//! The most frequent word is drawn at the top. The x axis is raw count with
//! "nice" tick steps (1, 2 or 5 × 10ⁿ).

use crate::pipeline::font::{draw_text, CloudFont};
use crate::pipeline::report::FrequencyReport;
use image::{Rgb, RgbImage};

pub const CHART_WIDTH: u32 = 500;
pub const CHART_HEIGHT: u32 = 450;

const TITLE: &str = "Top 10 Words";
const X_LABEL: &str = "Raw Count";

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([34, 34, 34]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const SKY_BLUE: Rgb<u8> = Rgb([0x87, 0xce, 0xeb]);

const TITLE_PX: f32 = 18.0;
const LABEL_PX: f32 = 13.0;
const TICK_PX: f32 = 11.0;

const PLOT_TOP: u32 = 44;
const PLOT_RIGHT_PAD: u32 = 24;
const PLOT_BOTTOM_PAD: u32 = 58;
const MAX_LABEL_WIDTH: u32 = 160;

/// Smallest 1/2/5 × 10ⁿ step giving at most `max_ticks` intervals up to `max`.
fn tick_step(max: u32, max_ticks: u32) -> u32 {
    let mut magnitude = 1u32;
    loop {
        for mult in [1, 2, 5] {
            let step = mult * magnitude;
            if max.div_ceil(step) <= max_ticks {
                return step;
            }
        }
        magnitude = magnitude.saturating_mul(10);
    }
}

/// Shorten `word` with a trailing ellipsis until it fits `max_width`.
fn fit_label(font: &CloudFont, word: &str, max_width: u32) -> String {
    let fits = |s: &str| {
        font.measure(s, LABEL_PX)
            .map(|(w, _)| w <= max_width)
            .unwrap_or(true)
    };
    if fits(word) {
        return word.to_string();
    }
    let mut chars: Vec<char> = word.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "…";
        if fits(&candidate) {
            return candidate;
        }
    }
    "…".to_string()
}

fn hline(img: &mut RgbImage, x0: u32, x1: u32, y: u32, color: Rgb<u8>) {
    for x in x0..=x1.min(img.width() - 1) {
        img.put_pixel(x, y, color);
    }
}

fn vline(img: &mut RgbImage, x: u32, y0: u32, y1: u32, color: Rgb<u8>) {
    for y in y0..=y1.min(img.height() - 1) {
        img.put_pixel(x, y, color);
    }
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for yy in y..(y + h).min(img.height()) {
        for xx in x..(x + w).min(img.width()) {
            img.put_pixel(xx, yy, color);
        }
    }
}

/// Render the report as a 500×450 bar chart.
pub fn render_bar_chart(report: &FrequencyReport, font: &CloudFont) -> RgbImage {
    let mut img = RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, WHITE);

    if let Some((w, _)) = font.measure(TITLE, TITLE_PX) {
        let x = (CHART_WIDTH.saturating_sub(w) / 2) as i64;
        draw_text(&mut img, font, TITLE, TITLE_PX, x, 14, INK);
    }

    let labels: Vec<String> = report
        .iter()
        .map(|r| fit_label(font, &r.word, MAX_LABEL_WIDTH))
        .collect();
    let label_w = labels
        .iter()
        .filter_map(|l| font.measure(l, LABEL_PX).map(|(w, _)| w))
        .max()
        .unwrap_or(0);

    let plot_left = (label_w + 16).max(48);
    let plot_right = CHART_WIDTH - PLOT_RIGHT_PAD;
    let plot_bottom = CHART_HEIGHT - PLOT_BOTTOM_PAD;
    let plot_w = plot_right - plot_left;
    let plot_h = plot_bottom - PLOT_TOP;

    let step = tick_step(report.max_count().max(1), 6);
    let axis_max = report.max_count().max(1).div_ceil(step) * step;
    let x_for = |count: u32| plot_left + (count as u64 * plot_w as u64 / axis_max as u64) as u32;

    // Grid and tick labels.
    let mut tick = 0;
    while tick <= axis_max {
        let x = x_for(tick);
        vline(&mut img, x, PLOT_TOP, plot_bottom, GRID);
        vline(&mut img, x, plot_bottom, plot_bottom + 4, INK);
        let label = tick.to_string();
        if let Some((w, _)) = font.measure(&label, TICK_PX) {
            let lx = x as i64 - (w / 2) as i64;
            draw_text(&mut img, font, &label, TICK_PX, lx, (plot_bottom + 8) as i64, INK);
        }
        tick += step;
    }

    // Bars, most frequent at the top.
    if !report.is_empty() {
        let slot = plot_h / report.len() as u32;
        let bar_h = (slot * 4 / 5).max(1);
        for (i, (row, label)) in report.iter().zip(&labels).enumerate() {
            let slot_top = PLOT_TOP + i as u32 * slot;
            let bar_top = slot_top + (slot - bar_h) / 2;
            let bar_w = x_for(row.raw_count) - plot_left;
            fill_rect(&mut img, plot_left + 1, bar_top, bar_w, bar_h, SKY_BLUE);

            if let Some((w, h)) = font.measure(label, LABEL_PX) {
                let lx = plot_left as i64 - 8 - w as i64;
                let ly = slot_top as i64 + (slot as i64 - h as i64) / 2;
                draw_text(&mut img, font, label, LABEL_PX, lx, ly, INK);
            }
        }
    }

    // Axes.
    vline(&mut img, plot_left, PLOT_TOP, plot_bottom, INK);
    hline(&mut img, plot_left, plot_right, plot_bottom, INK);

    if let Some((w, _)) = font.measure(X_LABEL, LABEL_PX) {
        let x = plot_left as i64 + (plot_w as i64 - w as i64) / 2;
        draw_text(&mut img, font, X_LABEL, LABEL_PX, x, (CHART_HEIGHT - 24) as i64, INK);
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::report::WordFrequency;

    fn report(rows: &[(&str, u32)]) -> FrequencyReport {
        let top = rows.first().map(|r| r.1).unwrap_or(1) as f64;
        FrequencyReport {
            rows: rows
                .iter()
                .map(|(w, c)| WordFrequency {
                    word: w.to_string(),
                    raw_count: *c,
                    normalized_pct: *c as f64 / top * 100.0,
                })
                .collect(),
        }
    }

    #[test]
    fn tick_steps_are_nice() {
        assert_eq!(tick_step(2, 6), 1);
        assert_eq!(tick_step(7, 6), 2);
        assert_eq!(tick_step(23, 6), 5);
        assert_eq!(tick_step(95, 6), 20);
        assert_eq!(tick_step(1000, 6), 200);
    }

    #[test]
    fn chart_has_fixed_size_and_bars() {
        let font = CloudFont::bundled().unwrap();
        let img = render_bar_chart(&report(&[("cat", 2), ("dog", 1)]), &font);
        assert_eq!(img.dimensions(), (CHART_WIDTH, CHART_HEIGHT));
        assert!(img.pixels().any(|p| *p == SKY_BLUE));
    }

    #[test]
    fn longer_count_gets_longer_bar() {
        let font = CloudFont::bundled().unwrap();
        let img = render_bar_chart(&report(&[("cat", 4), ("dog", 1)]), &font);
        let bar_len = |y: u32| (0..CHART_WIDTH).filter(|&x| *img.get_pixel(x, y) == SKY_BLUE).count();
        // vertical centres of the two slots
        let plot_h = CHART_HEIGHT - PLOT_BOTTOM_PAD - PLOT_TOP;
        let cat = bar_len(PLOT_TOP + plot_h / 4);
        let dog = bar_len(PLOT_TOP + 3 * plot_h / 4);
        assert!(cat > 3 * dog, "cat {cat} vs dog {dog}");
        assert!(dog > 0);
    }

    #[test]
    fn empty_report_renders_axes_only() {
        let font = CloudFont::bundled().unwrap();
        let img = render_bar_chart(&FrequencyReport::default(), &font);
        assert_eq!(img.dimensions(), (CHART_WIDTH, CHART_HEIGHT));
        assert!(!img.pixels().any(|p| *p == SKY_BLUE));
    }

    #[test]
    fn very_long_words_are_shortened() {
        let font = CloudFont::bundled().unwrap();
        let long = "supercalifragilisticexpialidocious".repeat(3);
        let label = fit_label(&font, &long, MAX_LABEL_WIDTH);
        assert!(label.ends_with('…'));
        assert!(font.measure(&label, LABEL_PX).unwrap().0 <= MAX_LABEL_WIDTH);
    }
}
