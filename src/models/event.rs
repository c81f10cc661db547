use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub event_date: NaiveDateTime,
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_address: String,
}

/// Секция площадки с ценой, `GET /venues/{id}/sections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSection {
    pub section_id: i64,
    pub section_name: String,
    pub price: f64,
    pub total_rows: u32,
    pub total_columns: u32,
}
