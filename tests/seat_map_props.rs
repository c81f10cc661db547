use myseat_client::models::{Seat, SeatStatus};
use myseat_client::seat_map::SeatMap;
use proptest::prelude::*;
use std::collections::HashMap;

fn status() -> impl Strategy<Value = SeatStatus> {
    prop_oneof![
        3 => Just(SeatStatus::Available),
        1 => Just(SeatStatus::Reserved),
        1 => Just(SeatStatus::Booked),
    ]
}

fn seats() -> impl Strategy<Value = Vec<Seat>> {
    prop::collection::vec((1i64..8, 1u32..10, 1u32..10, status()), 0..80).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (section_id, row_number, column_number, status))| Seat {
                id: i as i64 + 1,
                section_id,
                row_number,
                column_number,
                status,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn sections_sorted_with_true_maxima(seats in seats()) {
        let map = SeatMap::from_seats(seats.clone());

        let ids: Vec<i64> = map.sections().iter().map(|s| s.section_id).collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));

        let mut expected: HashMap<i64, (u32, u32)> = HashMap::new();
        for seat in &seats {
            let entry = expected.entry(seat.section_id).or_insert((0, 0));
            entry.0 = entry.0.max(seat.row_number);
            entry.1 = entry.1.max(seat.column_number);
        }
        prop_assert_eq!(map.sections().len(), expected.len());
        for grid in map.sections() {
            prop_assert_eq!(Some(&(grid.max_row, grid.max_column)), expected.get(&grid.section_id));
        }
    }

    #[test]
    fn lookup_matches_exact_position(seats in seats()) {
        let map = SeatMap::from_seats(seats.clone());

        // Последнее место на позиции побеждает
        let mut last: HashMap<(i64, u32, u32), i64> = HashMap::new();
        for seat in &seats {
            last.insert((seat.section_id, seat.row_number, seat.column_number), seat.id);
        }

        for grid in map.sections() {
            for row in 1..=grid.max_row {
                for column in 1..=grid.max_column {
                    let found = grid.lookup(row, column).map(|s| s.id);
                    prop_assert_eq!(found, last.get(&(grid.section_id, row, column)).copied());
                }
            }
        }
    }

    #[test]
    fn every_rendered_row_is_full_width(seats in seats()) {
        let map = SeatMap::from_seats(seats);
        for grid in map.sections() {
            let rows: Vec<_> = grid.rows().collect();
            prop_assert_eq!(rows.len() as u32, grid.max_row);
            for (_, cells) in rows {
                prop_assert_eq!(cells.len() as u32, grid.max_column);
            }
        }
    }
}
