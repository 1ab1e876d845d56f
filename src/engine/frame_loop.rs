//! Start/stop handle for per-frame render loops.
//!
//! The controller keeps one clone and passes another to the renderer. The
//! renderer only draws while the handle is armed; canceling any clone stops
//! the loop for all of them.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    armed: Rc<Cell<bool>>,
}

impl FrameLoop {
    /// A new, disarmed loop handle.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&self) {
        self.armed.set(true);
    }

    pub fn cancel(&self) {
        self.armed.set(false);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_through_any_clone() {
        let controller_side = FrameLoop::new();
        let renderer_side = controller_side.clone();
        assert!(!renderer_side.is_armed());

        controller_side.arm();
        assert!(renderer_side.is_armed());

        controller_side.cancel();
        assert!(!renderer_side.is_armed());
    }
}
