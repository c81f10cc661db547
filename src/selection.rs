//! Контроллер выбора мест.
//!
//! Машина состояний одного визита на страницу события:
//!
//! ```text
//! Idle -> AwaitingSeatCount -> Selecting <-> ReadyToSubmit -> Submitting -> Idle
//!                                  ^                              |
//!                                  +---------- (ошибка) ----------+
//! ```
//!
//! Инварианты после любой операции: выбрано не больше `target_count` мест,
//! все выбранные места из секции `locked_section_id`, место выбрано не
//! больше одного раза. Выбор очищается только после подтверждённого успеха.

use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::forms::PayerDetails;
use crate::models::{Booking, BookingCommand, Event, Seat};

pub const SEAT_COUNT_REQUIRED: &str = "Please enter how many seats you want to book.";
pub const SECTION_MISMATCH: &str = "Please select seats from only one section in a booking.";
pub const SELECT_AT_LEAST_ONE: &str = "Select at least one seat.";
pub const BOOKING_FAILED: &str = "Failed to create booking";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Количество мест ещё не запрошено.
    Idle,
    AwaitingSeatCount,
    /// Карта мест показана, количество зафиксировано.
    Selecting,
    /// Выбрано ровно `target_count` мест.
    ReadyToSubmit,
    /// Команда отправлена, ответа ещё нет.
    Submitting,
}

/// Что произошло при нажатии на место.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    /// Место не свободно, ничего не изменилось.
    Unavailable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSession {
    target_count: Option<u32>,
    selected_seat_ids: Vec<i64>,
    locked_section_id: Option<i64>,
}

impl SelectionSession {
    pub fn target_count(&self) -> Option<u32> {
        self.target_count
    }

    /// В порядке нажатий.
    pub fn selected_seat_ids(&self) -> &[i64] {
        &self.selected_seat_ids
    }

    pub fn locked_section_id(&self) -> Option<i64> {
        self.locked_section_id
    }

    pub fn contains(&self, seat_id: i64) -> bool {
        self.selected_seat_ids.contains(&seat_id)
    }

    pub fn len(&self) -> usize {
        self.selected_seat_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_seat_ids.is_empty()
    }

    fn clear_selection(&mut self) {
        self.selected_seat_ids.clear();
        self.locked_section_id = None;
    }
}

/// Разбирает количество мест из поля ввода.
pub fn parse_seat_count(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ClientError::Validation(SEAT_COUNT_REQUIRED.to_string()))
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    event_id: i64,
    venue_id: i64,
    state: SelectionState,
    session: SelectionSession,
    message: Option<String>,
    // Растёт при каждом сбросе сессии; результаты старых запросов отбрасываются
    epoch: u64,
}

impl SelectionController {
    pub fn new(event: &Event) -> Self {
        Self::for_event(event.id, event.venue_id)
    }

    pub fn for_event(event_id: i64, venue_id: i64) -> Self {
        Self {
            event_id,
            venue_id,
            state: SelectionState::Idle,
            session: SelectionSession::default(),
            message: None,
            epoch: 0,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    pub fn target_count(&self) -> Option<u32> {
        self.session.target_count
    }

    pub fn selected_seat_ids(&self) -> &[i64] {
        self.session.selected_seat_ids()
    }

    pub fn locked_section_id(&self) -> Option<i64> {
        self.session.locked_section_id
    }

    pub fn is_selected(&self, seat_id: i64) -> bool {
        self.session.contains(seat_id)
    }

    /// Сообщение для пользователя после последнего действия.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Карта мест видна пользователю.
    pub fn seat_map_visible(&self) -> bool {
        matches!(
            self.state,
            SelectionState::Selecting | SelectionState::ReadyToSubmit | SelectionState::Submitting
        )
    }

    /// Сколько мест ещё нужно выбрать.
    pub fn remaining(&self) -> u32 {
        let target = self.session.target_count.unwrap_or(0);
        target.saturating_sub(self.session.len() as u32)
    }

    fn reject(&mut self, error: ClientError) -> ClientError {
        self.message = Some(error.to_string());
        error
    }

    fn ensure_not_submitting(&mut self) -> Result<()> {
        if self.state == SelectionState::Submitting {
            return Err(self.reject(ClientError::InvalidState(
                "A booking is already being submitted, please wait.".to_string(),
            )));
        }
        Ok(())
    }

    /// Кнопка «Book»: начинает (или перезапускает) выбор, сбрасывая сессию.
    pub fn begin_booking(&mut self) -> Result<()> {
        self.ensure_not_submitting()?;
        self.session = SelectionSession::default();
        self.state = SelectionState::AwaitingSeatCount;
        self.message = None;
        self.epoch += 1;
        debug!("Event {}: booking started", self.event_id);
        Ok(())
    }

    /// Фиксирует количество мест и открывает карту.
    pub fn set_target_count(&mut self, n: i64) -> Result<()> {
        match self.state {
            SelectionState::AwaitingSeatCount => {}
            SelectionState::Idle => {
                return Err(self.reject(ClientError::InvalidState(
                    "Start a booking before choosing the seat count.".to_string(),
                )))
            }
            SelectionState::Submitting => self.ensure_not_submitting()?,
            SelectionState::Selecting | SelectionState::ReadyToSubmit => {
                return Err(self.reject(ClientError::InvalidState(
                    "Seat count is fixed once the seat map is shown; restart the booking to change it."
                        .to_string(),
                )))
            }
        }

        let target = match u32::try_from(n) {
            Ok(target) if target >= 1 => target,
            _ => return Err(self.reject(ClientError::Validation(SEAT_COUNT_REQUIRED.to_string()))),
        };

        self.session.target_count = Some(target);
        self.session.clear_selection();
        self.state = SelectionState::Selecting;
        self.message = None;
        info!("Event {}: selecting {} seat(s)", self.event_id, target);
        Ok(())
    }

    /// Возврат к вводу количества, например если карту не удалось загрузить.
    pub fn back_to_seat_count(&mut self, message: impl Into<String>) {
        self.session = SelectionSession::default();
        self.state = SelectionState::AwaitingSeatCount;
        self.message = Some(message.into());
    }

    pub fn toggle_seat(&mut self, seat: &Seat) -> Result<ToggleOutcome> {
        self.ensure_not_submitting()?;
        let target = match (self.state, self.session.target_count) {
            (SelectionState::Selecting | SelectionState::ReadyToSubmit, Some(target)) => target,
            _ => {
                return Err(self.reject(ClientError::InvalidState(
                    "Choose how many seats you want before picking seats.".to_string(),
                )))
            }
        };

        if !seat.is_available() {
            self.message = Some(format!(
                "Seat {} is {} and cannot be selected.",
                seat.label(),
                seat.status
            ));
            return Ok(ToggleOutcome::Unavailable);
        }

        if let Some(locked) = self.session.locked_section_id {
            if locked != seat.section_id {
                return Err(self.reject(ClientError::Validation(SECTION_MISMATCH.to_string())));
            }
        }

        let outcome = if let Some(pos) = self.session.selected_seat_ids.iter().position(|id| *id == seat.id) {
            self.session.selected_seat_ids.remove(pos);
            if self.session.selected_seat_ids.is_empty() {
                self.session.locked_section_id = None;
            }
            ToggleOutcome::Deselected
        } else if self.session.len() >= target as usize {
            return Err(self.reject(ClientError::Validation(format!(
                "You selected {} seats. Deselect one if you want a different seat.",
                target
            ))));
        } else {
            self.session.selected_seat_ids.push(seat.id);
            self.session.locked_section_id.get_or_insert(seat.section_id);
            ToggleOutcome::Selected
        };

        self.state = if self.session.len() == target as usize {
            SelectionState::ReadyToSubmit
        } else {
            SelectionState::Selecting
        };
        self.message = None;
        debug!(
            "Seat {} {:?}; selected={:?} locked={:?}",
            seat.id, outcome, self.session.selected_seat_ids, self.session.locked_section_id
        );
        Ok(outcome)
    }

    /// Проверяет выбор и собирает команду. Переводит в `Submitting`;
    /// пока ответ не получен, повторная отправка и выбор мест запрещены.
    pub fn prepare_submission(&mut self, payer: &PayerDetails) -> Result<BookingCommand> {
        self.ensure_not_submitting()?;
        let target = match (self.state, self.session.target_count) {
            (SelectionState::Selecting | SelectionState::ReadyToSubmit, Some(target)) => target,
            _ => {
                return Err(self.reject(ClientError::Validation(
                    "Enter seat count before booking.".to_string(),
                )))
            }
        };

        let section_id = match self.session.locked_section_id {
            Some(section_id) if !self.session.is_empty() => section_id,
            _ => return Err(self.reject(ClientError::Validation(SELECT_AT_LEAST_ONE.to_string()))),
        };

        if self.session.len() != target as usize {
            return Err(self.reject(ClientError::Validation(format!(
                "Please select exactly {} seat(s).",
                target
            ))));
        }

        let command = BookingCommand {
            user_id: payer.user_id,
            event_id: self.event_id,
            venue_id: self.venue_id,
            section_id,
            seat_ids: self.session.selected_seat_ids.clone(),
            payer_name: payer.payer_name.clone(),
            payer_email: payer.payer_email.clone(),
            payment_method: payer.payment_method,
            payment_reference: payer.payment_reference.clone(),
        };
        self.state = SelectionState::Submitting;
        self.message = None;
        Ok(command)
    }

    /// Применяет ответ на команду бронирования.
    ///
    /// Успех: сессия сбрасывается в `Idle`. Ошибка: остаёмся в `Selecting`
    /// с прежним выбором и текстом ошибки.
    pub fn finish_submission(&mut self, result: Result<Booking>) -> Result<Booking> {
        if self.state != SelectionState::Submitting {
            warn!("Ignoring booking response outside of submission");
            return result;
        }

        match &result {
            Ok(booking) => {
                info!(
                    "Booking #{} created ({}) for event {}",
                    booking.booking_id, booking.status, self.event_id
                );
                self.session = SelectionSession::default();
                self.state = SelectionState::Idle;
                self.epoch += 1;
                self.message = Some(format!(
                    "Booking created: #{} ({})",
                    booking.booking_id, booking.status
                ));
            }
            Err(e) => {
                warn!("Booking for event {} rejected: {}", self.event_id, e);
                self.state = SelectionState::Selecting;
                self.message = Some(e.user_message(BOOKING_FAILED));
            }
        }
        result
    }

    /// Уход со страницы: сессия уничтожается, незавершённые ответы отбрасываются.
    pub fn teardown(&mut self) {
        self.session = SelectionSession::default();
        self.state = SelectionState::Idle;
        self.message = None;
        self.epoch += 1;
    }
}
