//! NeuroStream - a themed terminal hub of data cores
//!
//! A page controller moves between a hub of clickable data cores and the
//! content pages behind them, starting and stopping the ambient effects each
//! page owns (generative audio, a storm, a flock, a particle scene, scroll
//! scaling) without leaking timers, frame loops, or voices. A chat console
//! forwards queries to a remote language model.

pub mod app;
pub mod chat;
pub mod cli;
pub mod components;
pub mod config;
pub mod effects;
pub mod engine;
pub mod geometry;
pub mod page;
pub mod stage;
pub mod styles;
pub mod tui;
pub mod utils;
pub mod widgets;

// Re-exports for convenience
pub use config::Config;
pub use page::{PageController, PageId};
pub use stage::Stage;
