//! Plain-text rendering of materialized views.

use idpconn::MaterializedView;

/// Cells wider than this are truncated on screen. Exports are unaffected.
const MAX_CELL_WIDTH: usize = 40;

pub const EMPTY_MESSAGE: &str = "No connections to display.";

/// Render the view as a fixed-width text table.
pub fn render(view: &MaterializedView) -> String {
    if view.is_empty() {
        return format!("{}\n", EMPTY_MESSAGE);
    }
    let mut widths = view
        .header()
        .iter()
        .map(|h| width(h))
        .collect::<Vec<usize>>();
    for row in view.rows() {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(width(cell));
        }
    }

    let mut out = String::new();
    push_line(&mut out, view.header(), &widths);
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<String>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in view.rows() {
        push_line(&mut out, row, &widths);
    }
    out
}

fn width(s: &str) -> usize {
    s.chars().count().min(MAX_CELL_WIDTH)
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<w$}", truncate(cell), w = *w))
        .collect::<Vec<String>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_CELL_WIDTH {
        s.to_string()
    } else {
        let mut t = s.chars().take(MAX_CELL_WIDTH - 1).collect::<String>();
        t.push('…');
        t
    }
}
