//! Shared test utilities for controller integration tests.
//!
//! Provides `Rig` - a page controller on the voice-tracking audio backend,
//! driven by a fake clock in 10 ms steps.

#![allow(dead_code)]

use neurostream::effects::VirtualAudio;
use neurostream::page::controller::ControllerOptions;
use neurostream::page::{ControllerState, EffectTable, PageController, PageId};
use ratatui::layout::Rect;

/// Simulation step of the fake clock.
pub const STEP_MS: u64 = 10;

/// Upper bound on settle time; any transition chain finishes well before.
const SETTLE_LIMIT_MS: u64 = 60_000;

pub struct Rig {
    pub controller: PageController,
    pub now: u64,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_options(ControllerOptions {
            seed: Some(1337),
            ..ControllerOptions::default()
        })
    }

    pub fn with_options(options: ControllerOptions) -> Self {
        Self {
            controller: PageController::new(
                Rect::new(0, 0, 120, 40),
                Box::new(VirtualAudio::new()),
                options,
            ),
            now: 0,
        }
    }

    pub fn with_table(mut self, table: EffectTable) -> Self {
        self.controller = self.controller.with_table(table);
        self
    }

    /// Activate and wait until home is stable.
    pub fn activated(mut self) -> Self {
        assert!(self.controller.activate(self.now));
        self.settle();
        assert_eq!(
            self.controller.state(),
            &ControllerState::Stable(PageId::HOME)
        );
        self
    }

    /// Advance the clock by `ms`, ticking every step.
    pub fn advance(&mut self, ms: u64) {
        let until = self.now + ms;
        while self.now < until {
            self.now += STEP_MS;
            self.controller.tick(self.now);
        }
    }

    /// Tick until no transition is running (queued requests included).
    pub fn settle(&mut self) {
        let limit = self.now + SETTLE_LIMIT_MS;
        while self.controller.is_transitioning() && self.now < limit {
            self.now += STEP_MS;
            self.controller.tick(self.now);
        }
        assert!(!self.controller.is_transitioning(), "controller never settled");
    }

    /// Navigate and wait for the transition to finish.
    pub fn go(&mut self, page: PageId) {
        self.controller.navigate(page, self.now);
        self.settle();
    }
}
