//! Reservation command and query handlers.

mod cancel_reservation;
mod check_in;
mod check_out;
mod create_reservation;
mod get_reservation;
mod list_member_reservations;
mod mark_no_show;

pub use cancel_reservation::CancelReservationHandler;
pub use check_in::CheckInHandler;
pub use check_out::CheckOutHandler;
pub use create_reservation::{CreateReservationCommand, CreateReservationHandler};
pub use get_reservation::{GetReservationHandler, ReservationView};
pub use list_member_reservations::ListMemberReservationsHandler;
pub use mark_no_show::MarkNoShowHandler;
