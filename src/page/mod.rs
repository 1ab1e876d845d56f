//! Pages and the controller that moves between them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    PageController                         │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐  │
//! │  │ ControllerSt │   │ EffectTable  │   │ live effects │  │
//! │  │ Dormant      │   │ home -> [..] │   │ (acquisition │  │
//! │  │ Stable(page) │   │ page -> [..] │   │  order)      │  │
//! │  │ Transitioning│   └──────────────┘   └──────────────┘  │
//! │  └──────────────┘                                         │
//! │  Stage · Animator · Timers · AudioEngine                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Exactly one page is active once the system is activated. Effects are
//! owned by the active page and never outlive the transition that leaves it.

pub mod binding;
pub mod controller;

pub use binding::{EffectKind, EffectTable, FlockDensity};
pub use controller::{ControllerState, NavigateOutcome, PageController, Phase};

use std::borrow::Cow;
use std::fmt;

/// Identifier of a top-level page.
///
/// There is exactly one home page; the set of content pages is open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(Cow<'static, str>);

impl PageId {
    /// The hub of data cores.
    pub const HOME: PageId = PageId(Cow::Borrowed("home"));
    /// Central core page.
    pub const HYPER_NEXUS: PageId = PageId(Cow::Borrowed("hyper-nexus"));
    /// Emotion spectrum page.
    pub const EMOTIONS: PageId = PageId(Cow::Borrowed("emotions"));
    /// Visualizer page with a dense flock.
    pub const IMAGE_HOVER: PageId = PageId(Cow::Borrowed("image-hover"));
    /// Page whose headline scales with scroll position.
    pub const SCROLL_TEXT: PageId = PageId(Cow::Borrowed("scroll-text"));
    /// Particle scene page.
    pub const MYSTERY: PageId = PageId(Cow::Borrowed("mystery-element"));

    /// Create a page id from any string key.
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_home(&self) -> bool {
        self.as_str() == Self::HOME.as_str()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for PageId {
    fn from(id: &'static str) -> Self {
        Self::new(id)
    }
}

/// Static description of a content page reachable from a data core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Key of the data core on the hub (used by connector pairs).
    pub core_id: &'static str,
    /// Page the core navigates to.
    pub page: &'static str,
    /// Label shown on the core.
    pub label: &'static str,
    /// Title shown at the top of the page.
    pub title: &'static str,
    /// Body copy of the page.
    pub body: &'static str,
}

impl PageInfo {
    pub fn page_id(&self) -> PageId {
        PageId::new(self.page)
    }
}

/// Data cores shown on the hub, in layout order.
pub const CORES: &[PageInfo] = &[
    PageInfo {
        core_id: "hyper-nexus",
        page: "hyper-nexus",
        label: "HYPER NEXUS",
        title: "HYPER-NEXUS // CORE ROUTING",
        body: "All synaptic traffic converges here. Every data core reports its \
               pulse to the nexus, which arbitrates bandwidth between memory, \
               emotion and perception streams.",
    },
    PageInfo {
        core_id: "emotions",
        page: "emotions",
        label: "EMOTIONS",
        title: "EMOTIONAL SPECTRUM ANALYSIS",
        body: "Affective signals are sampled across seven bands. Elevated \
               curiosity, stable calm, intermittent awe. No critical \
               dissonance detected.",
    },
    PageInfo {
        core_id: "image-hover",
        page: "image-hover",
        label: "VISUALIZER",
        title: "NEURAL VISUALIZER",
        body: "Swarm cognition rendered live. Each agent follows three rules: \
               keep apart, align, and stay together.",
    },
    PageInfo {
        core_id: "scroll-text",
        page: "scroll-text",
        label: "DEEP ARCHIVE",
        title: "DEEP ARCHIVE // SCROLL TO AMPLIFY",
        body: "The further you descend, the louder the signal becomes.",
    },
    PageInfo {
        core_id: "mystery",
        page: "mystery-element",
        label: "ANOMALY",
        title: "ANOMALY // UNCHARTED SECTOR",
        body: "A planetary mass drifts through a storm of particles. Move the \
               pointer to push the stream aside.",
    },
];

/// Look up the catalog entry for a page.
pub fn page_info(page: &PageId) -> Option<&'static PageInfo> {
    CORES.iter().find(|info| info.page == page.as_str())
}
