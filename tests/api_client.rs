use myseat_client::api::{CircuitState, HttpTicketingClient, TicketingApi};
use myseat_client::config::{ApiConfig, CircuitBreakerConfig};
use myseat_client::error::ClientError;
use myseat_client::models::{
    BookingCommand, BookingStatus, LoginRequest, PaymentMethod, Role, SeatStatus,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, failure_threshold: u32) -> HttpTicketingClient {
    HttpTicketingClient::from_config(
        &ApiConfig { base_url: server.uri(), timeout_seconds: 5 },
        &CircuitBreakerConfig { failure_threshold, timeout_seconds: 60 },
    )
    .unwrap()
}

fn command() -> BookingCommand {
    BookingCommand {
        user_id: Some(7),
        event_id: 3,
        venue_id: 2,
        section_id: 11,
        seat_ids: vec![101, 102],
        payer_name: "Ada Lovelace".into(),
        payer_email: "ada@example.com".into(),
        payment_method: PaymentMethod::BankTransfer,
        payment_reference: "INV-42".into(),
    }
}

#[tokio::test]
async fn fetches_event_and_seats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "name": "Winter Gala",
            "description": null,
            "eventDate": "2026-12-20T19:30:00",
            "venueId": 2,
            "venueName": "Grand Hall",
            "venueAddress": "1 Main St"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events/3/seats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 101, "sectionId": 11, "rowNumber": 1, "columnNumber": 1, "status": "AVAILABLE"},
            {"id": 102, "sectionId": 11, "rowNumber": 1, "columnNumber": 2, "status": "BOOKED"},
            {"id": 103, "sectionId": 11, "rowNumber": 2, "columnNumber": 1, "status": "HELD"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, 5);
    let event = api.fetch_event(3).await.unwrap();
    assert_eq!(event.name, "Winter Gala");
    assert_eq!(event.venue_id, 2);
    assert!(event.description.is_none());

    let seats = api.fetch_seats(3).await.unwrap();
    let statuses: Vec<SeatStatus> = seats.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![SeatStatus::Available, SeatStatus::Booked, SeatStatus::Unknown]
    );
}

#[tokio::test]
async fn fetches_venue_sections() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/venues/2/sections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"sectionId": 11, "sectionName": "Stalls", "price": 45.5, "totalRows": 10, "totalColumns": 20}
        ])))
        .mount(&server)
        .await;

    let sections = client(&server, 5).fetch_venue_sections(2).await.unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].section_name, "Stalls");
    assert_eq!(sections[0].price, 45.5);
}

#[tokio::test]
async fn submit_posts_camel_case_command() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .and(body_partial_json(json!({
            "userId": 7,
            "eventId": 3,
            "venueId": 2,
            "sectionId": 11,
            "seatIds": [101, 102],
            "payerName": "Ada Lovelace",
            "paymentMethod": "BANK_TRANSFER",
            "paymentReference": "INV-42"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "bookingId": 55,
            "status": "RESERVED",
            "totalAmount": 91.0,
            "bookedSeatIds": [101, 102]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let booking = client(&server, 5).submit_booking(&command()).await.unwrap();
    assert_eq!(booking.booking_id, 55);
    assert_eq!(booking.status, BookingStatus::Reserved);
    assert_eq!(booking.booked_seat_ids, vec![101, 102]);
}

#[tokio::test]
async fn conflict_carries_server_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Seat 102 is already booked"})),
        )
        .mount(&server)
        .await;

    let api = client(&server, 5);
    let err = api.submit_booking(&command()).await.unwrap_err();
    assert_eq!(err, ClientError::Conflict("Seat 102 is already booked".into()));
    assert_eq!(err.user_message("Failed to create booking"), "Seat 102 is already booked");
    // Отказ сервиса по делу не размыкает выключатель
    assert_eq!(api.circuit_state(), CircuitState::Closed);
}

#[tokio::test]
async fn missing_event_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server, 5).fetch_event(404).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn validation_error_uses_error_field_when_message_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Payer email is invalid"})))
        .mount(&server)
        .await;

    let err = client(&server, 5).submit_booking(&command()).await.unwrap_err();
    assert_eq!(err, ClientError::Validation("Payer email is invalid".into()));
}

#[tokio::test]
async fn login_returns_current_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_partial_json(json!({"email": "admin@myseat.io"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": 1,
            "name": "Admin",
            "email": "admin@myseat.io",
            "role": "ADMIN"
        })))
        .mount(&server)
        .await;

    let request = LoginRequest { email: "admin@myseat.io".into(), password: "secret".into() };
    let user = client(&server, 5).login(&request).await.unwrap();
    assert_eq!(user.user_id, 1);
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn server_errors_open_the_circuit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let api = client(&server, 2);
    for _ in 0..2 {
        let err = api.fetch_events().await.unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 503, .. }));
    }
    assert_eq!(api.circuit_state(), CircuitState::Open);

    // Третий запрос не уходит на сервер
    let err = api.fetch_events().await.unwrap_err();
    assert_eq!(err, ClientError::ServiceUnavailable);
    assert_eq!(err.user_message("Failed to load events"), "Failed to load events");
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let api = HttpTicketingClient::from_config(
        &ApiConfig { base_url: "http://127.0.0.1:9".into(), timeout_seconds: 2 },
        &CircuitBreakerConfig { failure_threshold: 5, timeout_seconds: 60 },
    )
    .unwrap();

    let err = api.fetch_events().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}
