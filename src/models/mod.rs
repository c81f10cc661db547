pub mod user;
pub mod event;
pub mod seat;
pub mod booking;

pub use user::{CurrentUser, LoginRequest, Role};
pub use event::{Event, EventSection};
pub use seat::{Seat, SeatStatus};
pub use booking::{Booking, BookingCommand, BookingStatus, PaymentMethod};
