use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{CircuitBreaker, CircuitState, TicketingApi};
use crate::config::{ApiConfig, CircuitBreakerConfig};
use crate::error::{ClientError, Result};
use crate::models::{Booking, BookingCommand, CurrentUser, Event, EventSection, LoginRequest, Seat};

/// Тело ошибки, которое присылает бэкенд.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// HTTP-клиент API. Все вызовы проходят через `CircuitBreaker`.
#[derive(Clone)]
pub struct HttpTicketingClient {
    base_url: String,
    http_client: reqwest::Client,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl HttpTicketingClient {
    pub fn from_config(api: &ApiConfig, breaker: &CircuitBreakerConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::new(
                breaker.failure_threshold,
                breaker.timeout_seconds,
            )),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Отправляет запрос через Circuit Breaker и разбирает ответ.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        if !self.circuit_breaker.can_execute() {
            warn!("Circuit breaker is OPEN - blocking booking API request");
            return Err(ClientError::ServiceUnavailable);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Booking API request failed: {:?}", e);
                self.circuit_breaker.record_failure();
                return Err(e.into());
            }
        };

        let status = response.status();
        // 4xx - нормальный ответ сервиса, выключатель считает только 5xx
        if status.is_server_error() {
            self.circuit_breaker.record_failure();
        } else {
            self.circuit_breaker.record_success();
        }

        if status.is_success() {
            return response.json::<T>().await.map_err(ClientError::from);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message.or(body.error))
            .filter(|m| !m.trim().is_empty());
        debug!("Booking API returned {}: {:?}", status, message);
        Err(error_for_status(status, message))
    }
}

fn error_for_status(status: StatusCode, message: Option<String>) -> ClientError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ClientError::Validation(message.unwrap_or_else(|| "Invalid request".to_string()))
        }
        StatusCode::UNAUTHORIZED => {
            ClientError::Unauthorized(message.unwrap_or_else(|| "Invalid email or password".to_string()))
        }
        StatusCode::NOT_FOUND => {
            ClientError::NotFound(message.unwrap_or_else(|| "Not found".to_string()))
        }
        StatusCode::CONFLICT => ClientError::Conflict(
            message.unwrap_or_else(|| "One or more seats are not available".to_string()),
        ),
        other => ClientError::Server { status: other.as_u16(), message },
    }
}

#[async_trait]
impl TicketingApi for HttpTicketingClient {
    async fn fetch_events(&self) -> Result<Vec<Event>> {
        self.execute(self.http_client.get(self.url("/events"))).await
    }

    async fn fetch_event(&self, event_id: i64) -> Result<Event> {
        debug!("Fetching event {}", event_id);
        self.execute(self.http_client.get(self.url(&format!("/events/{}", event_id))))
            .await
    }

    async fn fetch_seats(&self, event_id: i64) -> Result<Vec<Seat>> {
        let seats: Vec<Seat> = self
            .execute(self.http_client.get(self.url(&format!("/events/{}/seats", event_id))))
            .await?;
        debug!("Fetched {} seats for event {}", seats.len(), event_id);
        Ok(seats)
    }

    async fn fetch_venue_sections(&self, venue_id: i64) -> Result<Vec<EventSection>> {
        self.execute(self.http_client.get(self.url(&format!("/venues/{}/sections", venue_id))))
            .await
    }

    async fn submit_booking(&self, command: &BookingCommand) -> Result<Booking> {
        info!(
            "Submitting booking: event={}, section={}, seats={:?}",
            command.event_id, command.section_id, command.seat_ids
        );
        self.execute(self.http_client.post(self.url("/bookings")).json(command))
            .await
    }

    async fn login(&self, request: &LoginRequest) -> Result<CurrentUser> {
        info!("Logging in as {}", request.email);
        self.execute(self.http_client.post(self.url("/auth/login")).json(request))
            .await
    }
}
