use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    Reserved,
    Booked,
    // Статус, которого клиент не знает, - место не бронируется
    #[serde(other)]
    Unknown,
}

impl SeatStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SeatStatus::Available => "available",
            SeatStatus::Reserved => "reserved",
            SeatStatus::Booked => "booked",
            SeatStatus::Unknown => "unavailable",
        }
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Снимок места на момент загрузки. При повторной загрузке заменяется целиком.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: i64,
    pub section_id: i64,
    pub row_number: u32,
    pub column_number: u32,
    pub status: SeatStatus,
}

impl Seat {
    pub fn is_available(&self) -> bool {
        self.status == SeatStatus::Available
    }

    /// Короткая метка для сообщений, например `R2C5`.
    pub fn label(&self) -> String {
        format!("R{}C{}", self.row_number, self.column_number)
    }
}
