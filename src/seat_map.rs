//! Построение карты мест: плоский список мест группируется по секциям,
//! каждая секция - сетка ряд × колонка.
//!
//! Сетка не обязана быть прямоугольной: размер секции - максимумы ряда и
//! колонки по её местам, пустые клетки отрисовываются как заглушки.
//! Карта строится заново на каждую загрузку мест.

use std::collections::HashMap;
use tracing::warn;

use crate::models::Seat;

/// Позиция места в секции: (ряд, колонка), обе с 1.
pub type Position = (u32, u32);

/// Клетка сетки при отрисовке.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    Seat(&'a Seat),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionGrid {
    pub section_id: i64,
    pub max_row: u32,
    pub max_column: u32,
    seats_by_position: HashMap<Position, Seat>,
}

impl SectionGrid {
    fn new(section_id: i64) -> Self {
        Self {
            section_id,
            max_row: 0,
            max_column: 0,
            seats_by_position: HashMap::new(),
        }
    }

    pub fn lookup(&self, row: u32, column: u32) -> Option<&Seat> {
        self.seats_by_position.get(&(row, column))
    }

    pub fn seat_count(&self) -> usize {
        self.seats_by_position.len()
    }

    pub fn available_count(&self) -> usize {
        self.seats_by_position.values().filter(|s| s.is_available()).count()
    }

    /// Ряды `1..=max_row`, в каждом клетки `1..=max_column`.
    pub fn rows(&self) -> impl Iterator<Item = (u32, Vec<Cell<'_>>)> + '_ {
        (1..=self.max_row).map(move |row| {
            let cells = (1..=self.max_column)
                .map(|column| match self.lookup(row, column) {
                    Some(seat) => Cell::Seat(seat),
                    None => Cell::Empty,
                })
                .collect();
            (row, cells)
        })
    }
}

/// Накопитель мест. Порядок входа сохраняется внутри секции,
/// на выходе секции отсортированы по id.
#[derive(Debug, Default)]
pub struct SeatMapBuilder {
    sections: HashMap<i64, SectionGrid>,
    skipped: usize,
}

impl SeatMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, seat: Seat) -> &mut Self {
        if seat.row_number == 0 || seat.column_number == 0 {
            warn!(
                "Skipping seat {} with invalid position row={} column={}",
                seat.id, seat.row_number, seat.column_number
            );
            self.skipped += 1;
            return self;
        }

        let section = self
            .sections
            .entry(seat.section_id)
            .or_insert_with(|| SectionGrid::new(seat.section_id));
        section.max_row = section.max_row.max(seat.row_number);
        section.max_column = section.max_column.max(seat.column_number);
        // Дубликат позиции: побеждает последнее место
        section
            .seats_by_position
            .insert((seat.row_number, seat.column_number), seat);
        self
    }

    pub fn extend<I>(&mut self, seats: I) -> &mut Self
    where
        I: IntoIterator<Item = Seat>,
    {
        for seat in seats {
            self.push(seat);
        }
        self
    }

    pub fn build(self) -> SeatMap {
        let mut sections: Vec<SectionGrid> = self.sections.into_values().collect();
        sections.sort_by_key(|s| s.section_id);

        let mut seat_index = HashMap::new();
        for (idx, section) in sections.iter().enumerate() {
            for (position, seat) in &section.seats_by_position {
                seat_index.insert(seat.id, (idx, *position));
            }
        }

        SeatMap { sections, seat_index, skipped: self.skipped }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatMap {
    sections: Vec<SectionGrid>,
    seat_index: HashMap<i64, (usize, Position)>,
    skipped: usize,
}

impl SeatMap {
    pub fn from_seats<I>(seats: I) -> Self
    where
        I: IntoIterator<Item = Seat>,
    {
        let mut builder = SeatMapBuilder::new();
        builder.extend(seats);
        builder.build()
    }

    /// Секции по возрастанию id.
    pub fn sections(&self) -> &[SectionGrid] {
        &self.sections
    }

    pub fn section(&self, section_id: i64) -> Option<&SectionGrid> {
        self.sections
            .binary_search_by_key(&section_id, |s| s.section_id)
            .ok()
            .map(|idx| &self.sections[idx])
    }

    pub fn find_seat(&self, seat_id: i64) -> Option<&Seat> {
        let (idx, (row, column)) = self.seat_index.get(&seat_id)?;
        self.sections.get(*idx)?.lookup(*row, *column)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn seat_count(&self) -> usize {
        self.seat_index.len()
    }

    /// Сколько мест отброшено из-за позиции вне сетки.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
