//! Declarative mapping from pages to the effects they own.

use super::PageId;
use std::collections::BTreeMap;

/// Flock density preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlockDensity {
    /// Sparse flock behind the hub.
    Low,
    /// Dense flock on the visualizer page.
    High,
}

/// An effect a page starts on entry and releases on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Looping atmospheric chord.
    AmbientSound,
    /// Storm overlay, lightning strikes and rumble.
    Storm,
    /// Flocking visual in the page container.
    Flock(FlockDensity),
    /// 3D particle stream with its own frame loop.
    ParticleScene,
    /// Scroll-position to font-scale binding.
    ScrollScale,
}

impl EffectKind {
    /// Short name for logs and notices.
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::AmbientSound => "ambient sound",
            EffectKind::Storm => "storm",
            EffectKind::Flock(FlockDensity::Low) => "flock (low)",
            EffectKind::Flock(FlockDensity::High) => "flock (high)",
            EffectKind::ParticleScene => "particle scene",
            EffectKind::ScrollScale => "scroll scale",
        }
    }
}

/// Page id -> effects started on entry, in acquisition order.
///
/// Pages without an entry own no effects.
#[derive(Debug, Clone)]
pub struct EffectTable {
    entries: BTreeMap<PageId, Vec<EffectKind>>,
}

impl Default for EffectTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.declare(
            PageId::HOME,
            vec![
                EffectKind::AmbientSound,
                EffectKind::Storm,
                EffectKind::Flock(FlockDensity::Low),
            ],
        );
        table.declare(PageId::MYSTERY, vec![EffectKind::ParticleScene]);
        table.declare(PageId::SCROLL_TEXT, vec![EffectKind::ScrollScale]);
        table.declare(
            PageId::IMAGE_HOVER,
            vec![EffectKind::Flock(FlockDensity::High)],
        );
        table
    }
}

impl EffectTable {
    /// A table where no page owns any effect.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Declare (or replace) the effects of a page.
    ///
    /// Duplicate kinds are dropped, keeping the first occurrence.
    pub fn declare(&mut self, page: PageId, effects: Vec<EffectKind>) {
        let mut unique: Vec<EffectKind> = Vec::with_capacity(effects.len());
        for kind in effects {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        self.entries.insert(page, unique);
    }

    /// Effects of a page in acquisition order.
    pub fn effects_for(&self, page: &PageId) -> &[EffectKind] {
        self.entries.get(page).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_matches_pages() {
        let table = EffectTable::default();
        assert_eq!(
            table.effects_for(&PageId::HOME),
            &[
                EffectKind::AmbientSound,
                EffectKind::Storm,
                EffectKind::Flock(FlockDensity::Low)
            ]
        );
        assert_eq!(
            table.effects_for(&PageId::MYSTERY),
            &[EffectKind::ParticleScene]
        );
        assert!(table.effects_for(&PageId::EMOTIONS).is_empty());
    }

    #[test]
    fn test_declare_is_extensible_and_dedups() {
        let mut table = EffectTable::empty();
        table.declare(
            PageId::new("lab"),
            vec![EffectKind::ScrollScale, EffectKind::ScrollScale],
        );
        assert_eq!(
            table.effects_for(&PageId::new("lab")),
            &[EffectKind::ScrollScale]
        );
    }
}
