//! Один визит на страницу события: загрузка события и мест, выбор, отправка.
//!
//! `BookingFlow` связывает `SelectionController` (синхронные правила выбора)
//! с внешним `TicketingApi`. Все методы берут `&mut self`, поэтому в полёте
//! не больше одного запроса.

use tracing::{debug, info, warn};

use crate::api::TicketingApi;
use crate::error::{ClientError, Result};
use crate::forms::PayerForm;
use crate::models::{Booking, CurrentUser, Event, EventSection, Seat};
use crate::seat_map::SeatMap;
use crate::selection::{parse_seat_count, SelectionController, SelectionState, ToggleOutcome};

pub const EVENT_LOAD_FAILED: &str = "Failed to load event details";
pub const SEATS_LOAD_FAILED: &str = "Failed to load seats";

pub struct BookingFlow<'a, A: TicketingApi + ?Sized> {
    api: &'a A,
    event: Event,
    sections: Vec<EventSection>,
    seat_map: SeatMap,
    controller: SelectionController,
    payer: PayerForm,
}

impl<'a, A: TicketingApi + ?Sized> BookingFlow<'a, A> {
    /// Загружает событие. Цены секций подгружаются без блокировки сценария:
    /// если их нет, карта показывается без цен.
    pub async fn open(api: &'a A, event_id: i64, user: Option<&CurrentUser>) -> Result<Self> {
        let event = api.fetch_event(event_id).await?;
        info!("Opened event {} '{}'", event.id, event.name);

        let sections = match api.fetch_venue_sections(event.venue_id).await {
            Ok(sections) => sections,
            Err(e) => {
                warn!("Section pricing for venue {} unavailable: {}", event.venue_id, e);
                Vec::new()
            }
        };

        let mut payer = PayerForm::new();
        if let Some(user) = user {
            payer = payer.with_field("userId", &user.user_id.to_string())?;
            payer = payer.with_field("payerName", &user.name)?;
            payer = payer.with_field("payerEmail", &user.email)?;
        }

        Ok(Self {
            api,
            controller: SelectionController::new(&event),
            event,
            sections,
            seat_map: SeatMap::default(),
            payer,
        })
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn seat_map(&self) -> &SeatMap {
        &self.seat_map
    }

    pub fn payer(&self) -> &PayerForm {
        &self.payer
    }

    pub fn section_info(&self, section_id: i64) -> Option<&EventSection> {
        self.sections.iter().find(|s| s.section_id == section_id)
    }

    /// Цена секции × количество выбранных мест, если цена известна.
    pub fn estimated_total(&self) -> Option<f64> {
        let section_id = self.controller.locked_section_id()?;
        let price = self.section_info(section_id)?.price;
        Some(price * self.controller.selected_seat_ids().len() as f64)
    }

    pub fn begin_booking(&mut self) -> Result<()> {
        self.controller.begin_booking()
    }

    /// Проверяет количество, загружает места и показывает карту.
    pub async fn choose_seat_count(&mut self, raw: &str) -> Result<()> {
        let count = match parse_seat_count(raw) {
            Ok(count) => count,
            Err(e) => {
                self.controller.set_message(e.to_string());
                return Err(e);
            }
        };
        self.controller.set_target_count(count)?;

        if let Err(e) = self.load_seats().await {
            self.controller.back_to_seat_count(e.user_message(SEATS_LOAD_FAILED));
            return Err(e);
        }
        Ok(())
    }

    /// Перечитывает места. Выбор не трогается: устаревшие места
    /// отклонит сервер при отправке.
    pub async fn refresh_seats(&mut self) -> Result<()> {
        if let Err(e) = self.load_seats().await {
            self.controller.set_message(e.user_message(SEATS_LOAD_FAILED));
            return Err(e);
        }
        Ok(())
    }

    async fn load_seats(&mut self) -> Result<()> {
        let epoch = self.controller.epoch();
        let seats = self.api.fetch_seats(self.event.id).await?;
        self.apply_seats(epoch, seats);
        Ok(())
    }

    /// Применяет снимок мест, если сессия, запросившая его, ещё жива.
    pub fn apply_seats(&mut self, epoch: u64, seats: Vec<Seat>) -> bool {
        if epoch != self.controller.epoch() {
            debug!("Discarding seat snapshot from epoch {}", epoch);
            return false;
        }
        self.seat_map = SeatMap::from_seats(seats);
        debug!(
            "Seat map rebuilt: {} sections, {} seats",
            self.seat_map.sections().len(),
            self.seat_map.seat_count()
        );
        true
    }

    pub fn toggle_seat(&mut self, seat_id: i64) -> Result<ToggleOutcome> {
        let seat = match self.seat_map.find_seat(seat_id) {
            Some(seat) => seat.clone(),
            None => {
                let err = ClientError::Validation(format!("Seat {} is not on the seat map", seat_id));
                self.controller.set_message(err.to_string());
                return Err(err);
            }
        };
        self.controller.toggle_seat(&seat)
    }

    pub fn toggle_at(&mut self, section_id: i64, row: u32, column: u32) -> Result<ToggleOutcome> {
        let seat = self
            .seat_map
            .section(section_id)
            .and_then(|grid| grid.lookup(row, column))
            .map(|seat| seat.id);
        match seat {
            Some(seat_id) => self.toggle_seat(seat_id),
            None => {
                let err = ClientError::Validation(format!(
                    "Section #{} has no seat at R{}C{}",
                    section_id, row, column
                ));
                self.controller.set_message(err.to_string());
                Err(err)
            }
        }
    }

    pub fn set_payer_field(&mut self, name: &str, value: &str) -> Result<()> {
        self.payer = self.payer.with_field(name, value)?;
        Ok(())
    }

    /// Отправляет бронирование. При успехе сессия сброшена и места перечитаны;
    /// при ошибке выбор сохранён, текст ошибки - в `controller().message()`.
    pub async fn submit(&mut self) -> Result<Booking> {
        if self.controller.state() == SelectionState::Submitting {
            return Err(ClientError::InvalidState(
                "A booking is already being submitted, please wait.".to_string(),
            ));
        }

        let details = match self.payer.to_details() {
            Ok(details) => details,
            Err(e) => {
                self.controller.set_message(e.to_string());
                return Err(e);
            }
        };
        let command = self.controller.prepare_submission(&details)?;

        let result = self.api.submit_booking(&command).await;
        let booking = self.controller.finish_submission(result)?;

        // Статусы мест изменились - перечитываем снимок
        let epoch = self.controller.epoch();
        match self.api.fetch_seats(self.event.id).await {
            Ok(seats) => {
                self.apply_seats(epoch, seats);
            }
            Err(e) => warn!("Failed to refresh seats after booking: {}", e),
        }
        Ok(booking)
    }

    /// Уход со страницы.
    pub fn teardown(&mut self) {
        self.controller.teardown();
        self.seat_map = SeatMap::default();
    }
}
