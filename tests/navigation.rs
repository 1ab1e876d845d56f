//! Integration tests for page navigation and effect lifecycles.
//!
//! Drives the controller through whole transitions with a fake clock and
//! checks what is visible, what is live, and what the audio engine holds.

mod common;

use common::Rig;
use neurostream::effects::{Capabilities, EffectOptions, VoiceKind};
use neurostream::page::controller::ControllerOptions;
use neurostream::page::{ControllerState, EffectKind, EffectTable, NavigateOutcome, PageId, CORES};
use proptest::prelude::*;

fn all_pages() -> Vec<PageId> {
    std::iter::once(PageId::HOME)
        .chain(CORES.iter().map(|info| info.page_id()))
        .collect()
}

fn assert_single_active(rig: &Rig, page: &PageId) {
    let stage = rig.controller.stage();
    assert_eq!(stage.visible_pages(), vec![page]);
    let container = stage.container(page).unwrap();
    assert!(container.interactive);
    assert!((container.opacity - 1.0).abs() < 1e-6);
    assert_eq!(
        rig.controller.live_effects(),
        rig.controller.table().effects_for(page).to_vec()
    );
}

// ============================================================================
// SETTLED NAVIGATION
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn settled_navigation_keeps_one_page_and_its_effects(
        targets in prop::collection::vec(0usize..6, 1..12)
    ) {
        let pages = all_pages();
        let mut rig = Rig::new().activated();
        for index in targets {
            let page = pages[index].clone();
            rig.go(page.clone());
            prop_assert_eq!(rig.controller.active_page(), Some(&page));
            assert_single_active(&rig, &page);

            let voices = rig.controller.audio().live_voices();
            prop_assert!(voices.iter().filter(|v| **v == VoiceKind::AmbientPad).count() <= 1);
            prop_assert!(voices.iter().filter(|v| **v == VoiceKind::Rumble).count() <= 1);
        }
    }
}

#[test]
fn leaving_home_releases_audio_and_connectors() {
    let mut rig = Rig::new().activated();
    assert_eq!(rig.controller.audio().live_voices().len(), 2);

    rig.go(PageId::EMOTIONS);
    assert_single_active(&rig, &PageId::EMOTIONS);
    assert!(rig.controller.audio().live_voices().is_empty());
    assert!(!rig.controller.audio().is_transport_running());
    assert!(rig.controller.stage().connectors().is_empty());
    assert!(rig.controller.stage().storm_overlay() < 1e-6);
}

#[test]
fn home_reentry_keeps_declared_connector_count() {
    let mut rig = Rig::new().activated();
    let declared = rig.controller.stage().connectors().len();
    assert_eq!(declared, neurostream::geometry::CONNECTIONS.len());

    for _ in 0..5 {
        rig.go(PageId::HYPER_NEXUS);
        rig.go(PageId::HOME);
        assert_eq!(rig.controller.stage().connectors().len(), declared);
    }
}

#[test]
fn particle_loop_stops_after_leaving_mystery_page() {
    let mut rig = Rig::new().activated();
    rig.go(PageId::MYSTERY);

    let frame_loop = rig.controller.particle_loop().expect("particle loop running");
    assert!(frame_loop.is_armed());
    let frames = rig.controller.particles().unwrap().frames_rendered();
    rig.advance(200);
    assert!(rig.controller.particles().unwrap().frames_rendered() > frames);

    rig.go(PageId::HOME);
    assert!(!frame_loop.is_armed());
    assert!(rig.controller.particles().is_none());
    rig.advance(500);
    assert!(rig.controller.particle_loop().is_none());
}

// ============================================================================
// REQUESTS DURING TRANSITIONS
// ============================================================================

#[test]
fn requests_during_transition_keep_only_the_latest() {
    let mut rig = Rig::new().activated();
    assert_eq!(
        rig.controller.navigate(PageId::EMOTIONS, rig.now),
        NavigateOutcome::Started
    );
    rig.advance(100);
    assert_eq!(
        rig.controller.navigate(PageId::MYSTERY, rig.now),
        NavigateOutcome::Queued
    );
    assert_eq!(
        rig.controller.navigate(PageId::SCROLL_TEXT, rig.now),
        NavigateOutcome::Queued
    );
    assert_eq!(rig.controller.queued(), Some(&PageId::SCROLL_TEXT));

    rig.settle();
    assert_eq!(
        rig.controller.state(),
        &ControllerState::Stable(PageId::SCROLL_TEXT)
    );
    assert_single_active(&rig, &PageId::SCROLL_TEXT);
}

#[test]
fn navigating_to_the_active_page_does_nothing() {
    let mut rig = Rig::new().activated();
    assert_eq!(
        rig.controller.navigate(PageId::HOME, rig.now),
        NavigateOutcome::AlreadyActive
    );
    assert!(!rig.controller.is_transitioning());
}

#[test]
fn navigation_before_activation_is_ignored() {
    let mut rig = Rig::new();
    assert_eq!(
        rig.controller.navigate(PageId::EMOTIONS, rig.now),
        NavigateOutcome::NotActivated
    );
    rig.advance(2000);
    assert_eq!(rig.controller.state(), &ControllerState::Dormant);
    assert!(rig.controller.stage().splash().visible);
}

// ============================================================================
// DEGRADED ENVIRONMENTS
// ============================================================================

#[test]
fn missing_container_redirects_home_with_notice() {
    let mut rig = Rig::new().activated();
    assert!(rig.controller.stage_mut().remove_container(&PageId::EMOTIONS));
    rig.controller.take_notices();

    rig.go(PageId::EMOTIONS);
    assert_eq!(
        rig.controller.state(),
        &ControllerState::Stable(PageId::HOME)
    );
    assert_single_active(&rig, &PageId::HOME);
    let notices = rig.controller.take_notices();
    assert_eq!(notices, vec!["Page 'emotions' is unavailable".to_string()]);
}

#[test]
fn custom_page_with_custom_effects() {
    let lab = PageId::new("lab");
    let mut table = EffectTable::default();
    table.declare(lab.clone(), vec![EffectKind::Storm]);

    let mut rig = Rig::new().with_table(table);
    rig.controller.stage_mut().add_container(lab.clone());
    let mut rig = rig.activated();

    rig.go(lab.clone());
    assert_single_active(&rig, &lab);
    rig.go(PageId::HOME);
    assert_single_active(&rig, &PageId::HOME);
}

#[test]
fn disabled_flocking_skips_only_the_flock() {
    let options = ControllerOptions {
        seed: Some(3),
        effects: EffectOptions {
            capabilities: Capabilities {
                flocking: false,
                ..Capabilities::default()
            },
            ..EffectOptions::default()
        },
        ..ControllerOptions::default()
    };
    let mut rig = Rig::with_options(options).activated();
    assert_eq!(
        rig.controller.live_effects(),
        vec![EffectKind::AmbientSound, EffectKind::Storm]
    );
    let notices = rig.controller.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("flock"));

    rig.go(PageId::IMAGE_HOVER);
    assert!(rig.controller.live_effects().is_empty());
    assert!(rig.controller.stage().visible_pages() == vec![&PageId::IMAGE_HOVER]);
}

#[test]
fn disabled_audio_keeps_visual_effects_silent() {
    let options = ControllerOptions {
        seed: Some(4),
        effects: EffectOptions {
            capabilities: Capabilities {
                audio: false,
                ..Capabilities::default()
            },
            ..EffectOptions::default()
        },
        ..ControllerOptions::default()
    };
    let mut rig = Rig::with_options(options).activated();
    assert_eq!(rig.controller.live_effects(), vec![EffectKind::Storm, EffectKind::Flock(neurostream::page::FlockDensity::Low)]);
    rig.advance(8000);
    assert!(rig.controller.audio().live_voices().is_empty());
}
