//! Console frontend: argument parsing, the message loop, effect
//! execution and rendering around the pure core state machine.

mod app;
mod cli;
mod effects;
mod logging;
mod persistence;
mod ticker;
mod ui;

pub use app::run_app;
