pub mod auth;

pub use auth::{AuthenticatedUser, SessionToken, session_auth_middleware};
