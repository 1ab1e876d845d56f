//! The render tree driven by the page controller.
//!
//! A `Stage` holds one container per page plus the global layers (splash,
//! storm overlay, lightning flash). Components only read it; the controller
//! and its effects are the only writers.

use crate::geometry::{connector_segments, layout_cores, Affordance, HubLayout, Segment};
use crate::page::{PageId, CORES};
use ratatui::layout::{Position, Rect};
use std::collections::BTreeMap;

/// Anything whose opacity can be animated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Surface {
    Splash,
    Page(PageId),
    StormOverlay,
    LightningFlash,
}

/// Visibility state of a page container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    pub opacity: f32,
    pub visible: bool,
    pub interactive: bool,
}

impl Container {
    fn hidden() -> Self {
        Self {
            opacity: 0.0,
            visible: false,
            interactive: false,
        }
    }
}

/// Scroll position and headline scale of the scroll-text page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSurface {
    pub offset: u16,
    pub max_offset: u16,
    pub scale: f32,
}

impl ScrollSurface {
    /// Baseline headline scale.
    pub const BASE_SCALE: f32 = 1.0;

    fn new(max_offset: u16) -> Self {
        Self {
            offset: 0,
            max_offset,
            scale: Self::BASE_SCALE,
        }
    }

    /// Scroll by `delta` rows, clamped to the content.
    pub fn scroll_by(&mut self, delta: i32) {
        let next = i32::from(self.offset)
            .saturating_add(delta)
            .clamp(0, i32::from(self.max_offset));
        self.offset = next as u16;
    }

    /// Scroll progress in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.max_offset == 0 {
            0.0
        } else {
            (f32::from(self.offset) / f32::from(self.max_offset)).clamp(0.0, 1.0)
        }
    }

    /// Back to the top at baseline scale.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.scale = Self::BASE_SCALE;
    }
}

#[derive(Debug, Clone)]
pub struct Stage {
    viewport: Rect,
    splash: Container,
    containers: BTreeMap<PageId, Container>,
    storm_overlay: f32,
    lightning_flash: f32,
    affordances: Vec<Affordance>,
    connectors: Vec<Segment>,
    scroll_text: ScrollSurface,
}

impl Stage {
    /// A stage with the home container and every catalog page registered.
    pub fn new(viewport: Rect) -> Self {
        let mut containers = BTreeMap::new();
        containers.insert(PageId::HOME, Container::hidden());
        for info in CORES {
            containers.insert(info.page_id(), Container::hidden());
        }

        Self {
            viewport,
            splash: Container {
                opacity: 1.0,
                visible: true,
                interactive: true,
            },
            containers,
            storm_overlay: 0.0,
            lightning_flash: 0.0,
            affordances: layout_cores(HubLayout::compute(viewport).cores),
            connectors: Vec::new(),
            scroll_text: ScrollSurface::new(scroll_extent(viewport)),
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Resize the stage and lay the data cores out again.
    ///
    /// Connectors are left alone; redrawing them is the controller's call.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.affordances = layout_cores(self.home_bounds());
        self.scroll_text.max_offset = scroll_extent(viewport);
        self.scroll_text.offset = self.scroll_text.offset.min(self.scroll_text.max_offset);
    }

    /// Bounding box of the home container.
    pub fn home_bounds(&self) -> Rect {
        HubLayout::compute(self.viewport).cores
    }

    /// Area an effect owned by `page` draws into.
    pub fn bounds_for(&self, page: &PageId) -> Rect {
        if page.is_home() {
            self.home_bounds()
        } else {
            let footer = 2.min(self.viewport.height);
            Rect::new(
                self.viewport.x,
                self.viewport.y,
                self.viewport.width,
                self.viewport.height - footer,
            )
        }
    }

    pub fn splash(&self) -> &Container {
        &self.splash
    }

    pub fn hide_splash(&mut self) {
        self.splash.visible = false;
        self.splash.interactive = false;
    }

    pub fn container(&self, page: &PageId) -> Option<&Container> {
        self.containers.get(page)
    }

    pub fn has_container(&self, page: &PageId) -> bool {
        self.containers.contains_key(page)
    }

    /// Register a container for a page that is not in the catalog.
    pub fn add_container(&mut self, page: PageId) {
        self.containers.entry(page).or_insert_with(Container::hidden);
    }

    /// Remove a content page container. The home container cannot be removed.
    pub fn remove_container(&mut self, page: &PageId) -> bool {
        if page.is_home() {
            return false;
        }
        self.containers.remove(page).is_some()
    }

    /// Make a page's container visible and interactive.
    pub fn show(&mut self, page: &PageId) -> bool {
        match self.containers.get_mut(page) {
            Some(container) => {
                container.visible = true;
                container.interactive = true;
                true
            }
            None => false,
        }
    }

    /// Make a page's container inert.
    pub fn hide(&mut self, page: &PageId) {
        if let Some(container) = self.containers.get_mut(page) {
            container.visible = false;
            container.interactive = false;
        }
    }

    /// Pages whose containers are currently visible.
    pub fn visible_pages(&self) -> Vec<&PageId> {
        self.containers
            .iter()
            .filter(|(_, c)| c.visible)
            .map(|(page, _)| page)
            .collect()
    }

    pub fn opacity(&self, surface: &Surface) -> Option<f32> {
        match surface {
            Surface::Splash => Some(self.splash.opacity),
            Surface::Page(page) => self.containers.get(page).map(|c| c.opacity),
            Surface::StormOverlay => Some(self.storm_overlay),
            Surface::LightningFlash => Some(self.lightning_flash),
        }
    }

    pub fn set_opacity(&mut self, surface: &Surface, opacity: f32) -> bool {
        let opacity = opacity.clamp(0.0, 1.0);
        match surface {
            Surface::Splash => self.splash.opacity = opacity,
            Surface::Page(page) => match self.containers.get_mut(page) {
                Some(container) => container.opacity = opacity,
                None => return false,
            },
            Surface::StormOverlay => self.storm_overlay = opacity,
            Surface::LightningFlash => self.lightning_flash = opacity,
        }
        true
    }

    pub fn storm_overlay(&self) -> f32 {
        self.storm_overlay
    }

    pub fn lightning_flash(&self) -> f32 {
        self.lightning_flash
    }

    pub fn affordances(&self) -> &[Affordance] {
        &self.affordances
    }

    /// Data core under a terminal cell, if any.
    pub fn affordance_at(&self, column: u16, row: u16) -> Option<&Affordance> {
        self.affordances
            .iter()
            .find(|a| a.rect.contains(Position::new(column, row)))
    }

    pub fn connectors(&self) -> &[Segment] {
        &self.connectors
    }

    /// Remove every connector and draw the declared set again.
    pub fn redraw_connectors(&mut self) -> usize {
        self.connectors.clear();
        self.connectors = connector_segments(&self.affordances, self.home_bounds());
        self.connectors.len()
    }

    pub fn clear_connectors(&mut self) {
        self.connectors.clear();
    }

    pub fn scroll_text(&self) -> &ScrollSurface {
        &self.scroll_text
    }

    pub fn scroll_text_mut(&mut self) -> &mut ScrollSurface {
        &mut self.scroll_text
    }
}

/// Rows the scroll-text section extends below the first screen.
fn scroll_extent(viewport: Rect) -> u16 {
    viewport.height.saturating_mul(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage() -> Stage {
        Stage::new(Rect::new(0, 0, 120, 40))
    }

    #[test]
    fn test_new_stage_shows_only_splash() {
        let stage = stage();
        assert!(stage.splash().visible);
        assert!(stage.visible_pages().is_empty());
        assert!(stage.has_container(&PageId::HOME));
        assert!(stage.has_container(&PageId::MYSTERY));
    }

    #[test]
    fn test_home_container_cannot_be_removed() {
        let mut stage = stage();
        assert!(!stage.remove_container(&PageId::HOME));
        assert!(stage.remove_container(&PageId::EMOTIONS));
        assert!(!stage.show(&PageId::EMOTIONS));
    }

    #[test]
    fn test_redraw_connectors_does_not_accumulate() {
        let mut stage = stage();
        let first = stage.redraw_connectors();
        for _ in 0..5 {
            stage.redraw_connectors();
        }
        assert_eq!(stage.connectors().len(), first);
    }

    #[test]
    fn test_affordance_hit_testing() {
        let stage = stage();
        let core = stage.affordances()[0].clone();
        let hit = stage.affordance_at(core.rect.x, core.rect.y).unwrap();
        assert_eq!(hit.core_id, core.core_id);
        assert!(stage.affordance_at(0, 39).is_none());
    }

    #[test]
    fn test_scroll_surface_clamps_and_reports_progress() {
        let mut surface = ScrollSurface::new(100);
        surface.scroll_by(-5);
        assert_eq!(surface.offset, 0);
        surface.scroll_by(50);
        assert!((surface.progress() - 0.5).abs() < 1e-6);
        surface.scroll_by(500);
        assert_eq!(surface.offset, 100);
        surface.scroll_by(i32::MAX);
        assert_eq!(surface.offset, 100);
        surface.scroll_by(i32::MIN);
        assert_eq!(surface.offset, 0);
        surface.scroll_by(100);
        surface.scale = 2.0;
        surface.reset();
        assert_eq!(surface.offset, 0);
        assert_eq!(surface.scale, ScrollSurface::BASE_SCALE);
    }

    #[test]
    fn test_set_opacity_clamps() {
        let mut stage = stage();
        stage.set_opacity(&Surface::StormOverlay, 3.0);
        assert_eq!(stage.storm_overlay(), 1.0);
        assert!(!stage.set_opacity(&Surface::Page(PageId::new("ghost")), 0.5));
    }
}
