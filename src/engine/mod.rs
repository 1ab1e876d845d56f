//! Tick-driven primitives the controller runs on.
//!
//! Nothing here reads the wall clock: every call takes `now_ms`, so the
//! whole engine can be driven by a fake clock in tests.

pub mod animator;
pub mod frame_loop;
pub mod timers;

pub use animator::{Animator, TweenEvent, TweenId};
pub use frame_loop::FrameLoop;
pub use timers::{TimerId, Timers};
