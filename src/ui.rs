//! Ratatui front-end. The presentation layer owns the mapping from key
//! presses to store operations and re-renders the projection after each one.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
