pub mod appointment;
pub mod doctor;
pub mod enums;
pub mod user;

pub use appointment::Appointment;
pub use doctor::Doctor;
pub use enums::{AppointmentStatus, NotificationKind, UserRole};
pub use user::User;
