//! Text rendering of the binding grid

use volmix_core::domain::{Fader, Layer, Session};

const BOUND: &str = "BOUND";
const UNBOUND: &str = "-";
const ROW_LABEL_WIDTH: usize = "FADER 7".len();

/// Render `layer` as a table with one row per fader and one column per
/// visible target
pub fn grid(session: &Session, layer: Layer) -> String {
    let grid = session.grid(layer);
    let labels: Vec<String> = grid
        .columns
        .iter()
        .map(|target| session.column_label(target))
        .collect();
    let widths: Vec<usize> = labels
        .iter()
        .map(|label| label.chars().count().max(BOUND.len()))
        .collect();

    let mut out = format!("LAYER {}\n", layer);
    if labels.is_empty() {
        out.push_str("(no columns)\n");
        return out;
    }

    let mut header = " ".repeat(ROW_LABEL_WIDTH);
    for (label, width) in labels.iter().zip(&widths) {
        header.push_str(&format!(" | {:^width$}", label, width = width));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for fader in Fader::all() {
        let mut row = format!("{:<width$}", format!("FADER {}", fader), width = ROW_LABEL_WIDTH);
        for (col, width) in widths.iter().enumerate() {
            let cell = if grid.is_bound(fader, col) { BOUND } else { UNBOUND };
            row.push_str(&format!(" | {:^width$}", cell, width = width));
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}
