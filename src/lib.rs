// Library surface for headless/integration tests and reuse.
// The binary only parses arguments and owns the terminal.
pub mod app;
pub mod app_dirs;
pub mod audio;
pub mod catalog;
pub mod celebration;
pub mod config;
pub mod events;
pub mod game;
pub mod kitchen;
pub mod leaderboard;
pub mod ledger;
pub mod logging;
pub mod recipe;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod time_series;
pub mod ui;
pub mod util;

pub use app::{App, AppState};
