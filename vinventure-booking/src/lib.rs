pub mod admission;
pub mod booking;
pub mod repository;

pub use admission::{AdmissionConfig, AdmissionService, BookingDecision, BookingRequest};
pub use booking::{Booking, BookingStatus, NewBooking};
pub use repository::{BookingDetail, BookingRepository};
