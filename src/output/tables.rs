use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_cells(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Green for success, red for failures, yellow while in flight.
pub fn status_cell(status: &str) -> Cell {
    match status {
        "success" => Cell::new(status).fg(TableColor::Green),
        "failed" | "canceled" | "cancelled" => Cell::new(status).fg(TableColor::Red),
        "" => Cell::new("-"),
        _ => Cell::new(status).fg(TableColor::Yellow),
    }
}

pub fn coverage_cell(coverage: Option<f64>) -> Cell {
    match coverage {
        Some(value) if value >= 80.0 => Cell::new(format!("{value:.1}%")).fg(TableColor::Green),
        Some(value) if value >= 50.0 => Cell::new(format!("{value:.1}%")).fg(TableColor::Yellow),
        Some(value) => Cell::new(format!("{value:.1}%")).fg(TableColor::Red),
        None => Cell::new("-"),
    }
}
