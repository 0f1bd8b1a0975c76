// Library root: re-exports the terminal front end so integration tests can
// drive it without a real terminal.

pub mod clipboard;
pub mod notify;
pub mod particles;
pub mod tui;
