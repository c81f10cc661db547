//! Текстовая отрисовка карты мест для терминала.
//!
//! Обозначения: `o` свободно, `*` выбрано, `r` зарезервировано,
//! `x` продано, `?` неизвестный статус, `.` нет места.

use std::fmt::Write;

use crate::models::{EventSection, SeatStatus};
use crate::seat_map::{Cell, SeatMap, SectionGrid};
use crate::selection::SelectionController;

pub const LEGEND: &str = "o available  * selected  r reserved  x booked  . no seat";

fn glyph(cell: Cell<'_>, controller: &SelectionController) -> char {
    match cell {
        Cell::Empty => '.',
        Cell::Seat(seat) if controller.is_selected(seat.id) => '*',
        Cell::Seat(seat) => match seat.status {
            SeatStatus::Available => 'o',
            SeatStatus::Reserved => 'r',
            SeatStatus::Booked => 'x',
            SeatStatus::Unknown => '?',
        },
    }
}

pub fn render_section(
    grid: &SectionGrid,
    info: Option<&EventSection>,
    controller: &SelectionController,
) -> String {
    let mut out = String::new();
    let _ = match info {
        Some(info) => writeln!(
            out,
            "Section #{} {} ({:.2} per seat, {} free)",
            grid.section_id,
            info.section_name,
            info.price,
            grid.available_count()
        ),
        None => writeln!(out, "Section #{} ({} free)", grid.section_id, grid.available_count()),
    };

    let header: String = (1..=grid.max_column).map(|c| format!("{:>4}", format!("C{}", c))).collect();
    let _ = writeln!(out, "     {}", header);
    for (row, cells) in grid.rows() {
        let line: String = cells
            .into_iter()
            .map(|cell| format!("{:>4}", glyph(cell, controller)))
            .collect();
        let _ = writeln!(out, "{:<5}{}", format!("R{}", row), line);
    }
    out
}

pub fn render_seat_map<'s>(
    map: &SeatMap,
    sections: impl Fn(i64) -> Option<&'s EventSection>,
    controller: &SelectionController,
) -> String {
    if map.is_empty() {
        return "No seats found for this event yet.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "{}", LEGEND);
    for grid in map.sections() {
        out.push('\n');
        out.push_str(&render_section(grid, sections(grid.section_id), controller));
    }
    out
}

/// Строка статуса: сколько выбрано из скольки.
pub fn selection_status(controller: &SelectionController) -> String {
    match controller.target_count() {
        Some(target) => format!(
            "Selected {}/{} seat(s){}",
            controller.selected_seat_ids().len(),
            target,
            controller
                .locked_section_id()
                .map(|s| format!(" in section #{}", s))
                .unwrap_or_default()
        ),
        None => "No seat count chosen".to_string(),
    }
}
