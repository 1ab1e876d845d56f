//! Scroll-linked headline scaling on the scroll-text page.

use crate::stage::{ScrollSurface, Stage};
use tracing::debug;

/// Extra scale reached at the bottom of the section.
pub const SCALE_GAIN: f32 = 1.5;

/// Maps scroll progress to a value while alive.
#[derive(Debug)]
pub struct ScrollTrigger {
    alive: bool,
}

impl ScrollTrigger {
    /// Bind to a scroll surface, starting from the top.
    pub fn bind(surface: &mut ScrollSurface) -> Self {
        surface.reset();
        Self { alive: true }
    }

    /// Current progress, or `None` once killed.
    pub fn progress(&self, surface: &ScrollSurface) -> Option<f32> {
        self.alive.then(|| surface.progress())
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

/// Headline scale of `1 + progress * 1.5`.
#[derive(Debug)]
pub struct ScrollScaleBinding {
    trigger: ScrollTrigger,
}

impl ScrollScaleBinding {
    pub fn bind(stage: &mut Stage) -> Self {
        let trigger = ScrollTrigger::bind(stage.scroll_text_mut());
        debug!("Scroll scale bound");
        Self { trigger }
    }

    pub fn update(&self, stage: &mut Stage) {
        if let Some(progress) = self.trigger.progress(stage.scroll_text()) {
            stage.scroll_text_mut().scale = scale_for(progress);
        }
    }

    /// Kill the trigger and put the section back at rest.
    pub fn release(&mut self, stage: &mut Stage) {
        if self.trigger.is_alive() {
            self.trigger.kill();
            stage.scroll_text_mut().reset();
            debug!("Scroll scale released");
        }
    }

    pub fn is_bound(&self) -> bool {
        self.trigger.is_alive()
    }
}

pub fn scale_for(progress: f32) -> f32 {
    ScrollSurface::BASE_SCALE + progress.clamp(0.0, 1.0) * SCALE_GAIN
}
