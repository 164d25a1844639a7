use std::{cell::RefCell, rc::Rc};

use colored::*;
use unicode_width::UnicodeWidthStr;

use crate::{
    models::category::Category,
    palette::{self, Rgb},
    session::{Frame, Renderer, Row, view::ViewMode},
};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

fn paint(text: &str, foreground: Rgb, background: Rgb) -> ColoredString {
    text.truecolor(foreground.r, foreground.g, foreground.b)
        .on_truecolor(background.r, background.g, background.b)
}

/// Background of row `index` out of `count`: the category color, darker the
/// further down the list.
pub fn row_background(base: Rgb, index: usize, count: usize) -> Rgb {
    if count == 0 {
        return base;
    }
    base.darken(index as f64 / count as f64)
}

/// Plain text of a row: 1-based position, status glyph, title, padded out
/// to `width` so the background fills the line.
pub fn format_row(position: usize, row: &Row, width: usize) -> String {
    let glyph = if row.is_done { "✓" } else { "○" };
    let line = format!("  {position:>3}  {glyph}  {}", row.title);
    let visible = UnicodeWidthStr::width(line.as_str());
    if visible < width {
        format!("{line}{}", " ".repeat(width - visible))
    } else {
        line
    }
}

/// Per-character backgrounds for the header band, shading from the
/// category color down to half its brightness.
pub fn header_gradient(base: Rgb, len: usize) -> Vec<Rgb> {
    let last = len.saturating_sub(1).max(1) as f64;
    (0..len)
        .map(|i| base.darken(0.5 * i as f64 / last))
        .collect()
}

fn paint_header(text: &str, base: Rgb) -> String {
    let chars: Vec<char> = text.chars().collect();
    let shades = header_gradient(base, chars.len());
    chars
        .iter()
        .zip(shades)
        .map(|(c, shade)| paint(&c.to_string(), shade.contrast(), shade).bold().to_string())
        .collect()
}

pub fn format_header(frame: &Frame) -> Option<String> {
    let name = frame.category_name.as_deref()?;
    let noun = if frame.rows.len() == 1 { "item" } else { "items" };
    Some(match &frame.mode {
        ViewMode::Unfiltered => format!("{name} ({} {noun})", frame.rows.len()),
        ViewMode::Filtered { query } => {
            format!("{name} ({} {noun} matching \"{query}\")", frame.rows.len())
        }
    })
}

/// Keeps only the most recent frame so one-shot commands can print the
/// final list once instead of every intermediate redraw.
#[derive(Clone, Default)]
pub struct LatestFrame {
    slot: Rc<RefCell<Option<Frame>>>,
}

impl LatestFrame {
    pub fn take(&self) -> Option<Frame> {
        self.slot.borrow_mut().take()
    }
}

impl Renderer for LatestFrame {
    fn render(&mut self, frame: &Frame) {
        *self.slot.borrow_mut() = Some(frame.clone());
    }
}

/// Prints each frame to stdout, shading rows with the category color.
#[derive(Default)]
pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render(&mut self, frame: &Frame) {
        let Some(header) = format_header(frame) else {
            println!("No category selected");
            return;
        };

        let base = palette::resolve(frame.color.as_deref());
        println!("\n  {}\n", paint_header(&format!(" {header} "), base));

        if frame.rows.is_empty() {
            match frame.mode {
                ViewMode::Unfiltered => println!("  No items added yet!"),
                ViewMode::Filtered { .. } => println!("  No matching items"),
            }
            println!();
            return;
        }

        let width = get_terminal_width().saturating_sub(2);
        for (index, row) in frame.rows.iter().enumerate() {
            let background = row_background(base, index, frame.rows.len());
            let line = paint(
                &format_row(index + 1, row, width),
                background.contrast(),
                background,
            );
            if row.is_done {
                println!("{}", line.dimmed());
            } else {
                println!("{line}");
            }
        }
        println!();
    }
}

/// One line of the category listing: color swatch, name, pending/total.
pub fn render_category_line(category: &Category) {
    let color = palette::resolve(category.color.as_deref());
    let swatch = "■".truecolor(color.r, color.g, color.b);
    let total = category.items.len();
    let counts = format!("{}/{}", category.pending_count(), total);
    println!(
        "  {}  {} {}",
        swatch,
        format!("{:<24}", category.name).bold(),
        counts.dimmed()
    );
}
