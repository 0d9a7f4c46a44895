pub mod appointments;
pub mod clinic;
pub mod cookies;
pub mod email;
pub mod pets;
pub mod session_tokens;
pub mod sessions;
pub mod users;
