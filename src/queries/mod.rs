pub mod appointments;
pub mod clinic;
pub mod pets;
pub mod sessions;
pub mod users;
