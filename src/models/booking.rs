use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Card,
    BankTransfer,
    Cash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Card, PaymentMethod::BankTransfer, PaymentMethod::Cash];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::Cash => "CASH",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| format!("Payment method must be one of CARD, BANK_TRANSFER, CASH (got '{}')", s.trim()))
    }
}

/// Команда бронирования. Собирается только в момент отправки и нигде не хранится.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCommand {
    pub user_id: Option<i64>,
    pub event_id: i64,
    pub venue_id: i64,
    pub section_id: i64,
    pub seat_ids: Vec<i64>,
    pub payer_name: String,
    pub payer_email: String,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Reserved,
    Confirmed,
    Expired,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Reserved => "RESERVED",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Expired => "EXPIRED",
            BookingStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub booking_id: i64,
    pub status: BookingStatus,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub booked_seat_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_serializes_with_camel_case_keys() {
        let command = BookingCommand {
            user_id: None,
            event_id: 3,
            venue_id: 1,
            section_id: 5,
            seat_ids: vec![12, 10],
            payer_name: "Ann Lee".into(),
            payer_email: "ann@example.com".into(),
            payment_method: PaymentMethod::BankTransfer,
            payment_reference: "TX-1".into(),
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["sectionId"], 5);
        assert_eq!(json["seatIds"], serde_json::json!([12, 10]));
        assert_eq!(json["paymentMethod"], "BANK_TRANSFER");
        assert!(json["userId"].is_null());
    }

    #[test]
    fn payment_method_parses_loosely() {
        assert_eq!("bank transfer".parse::<PaymentMethod>(), Ok(PaymentMethod::BankTransfer));
        assert_eq!(" cash ".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
        assert!("crypto".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn unknown_booking_status_does_not_fail_decoding() {
        let booking: Booking =
            serde_json::from_str(r#"{"bookingId": 9, "status": "PENDING_PAYMENT"}"#).unwrap();
        assert_eq!(booking.status, BookingStatus::Unknown);
        assert!(booking.booked_seat_ids.is_empty());
    }
}
