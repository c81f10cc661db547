//! Внешние операции каталога и бронирования, которыми пользуется клиент.

pub mod circuit_breaker;
pub mod client;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use client::HttpTicketingClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Booking, BookingCommand, CurrentUser, Event, EventSection, LoginRequest, Seat};

/// REST API бэкенда. Реализация по умолчанию - [`HttpTicketingClient`],
/// в тестах подставляется своя.
#[async_trait]
pub trait TicketingApi: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<Event>>;

    /// `NotFound`, если события нет.
    async fn fetch_event(&self, event_id: i64) -> Result<Event>;

    /// Полный снимок мест события, без пагинации.
    async fn fetch_seats(&self, event_id: i64) -> Result<Vec<Seat>>;

    async fn fetch_venue_sections(&self, venue_id: i64) -> Result<Vec<EventSection>>;

    /// `Validation` при неверной форме команды, `Conflict`, если место уже занято.
    async fn submit_booking(&self, command: &BookingCommand) -> Result<Booking>;

    async fn login(&self, request: &LoginRequest) -> Result<CurrentUser>;
}
