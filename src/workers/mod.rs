pub mod session_cleanup;

pub use session_cleanup::session_cleanup_worker;
