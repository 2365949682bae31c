pub mod booking;
pub mod city;
pub mod flight;
pub mod passenger;
pub mod session;

pub use booking::{BookingRecord, NewBooking, PaymentStatus};
pub use city::City;
pub use flight::{Aircraft, Flight, SeatCapacity, TravelClass};
pub use passenger::{Gender, Passenger, PassengerType, SeatPreference, SeatType, SeatZone};
pub use session::{Role, SearchContext, Session, Turn};
