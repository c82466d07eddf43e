pub mod caret;
pub mod config;
pub mod console;
pub mod display;
pub mod kernel;
pub mod presentation;
pub mod services;
pub mod session;

// Re-export specific items for convenient access
pub use kernel::reactor::Reactor;
pub use session::{Session, SessionHandle};
