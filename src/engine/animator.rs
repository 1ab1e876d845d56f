//! Opacity tweens.
//!
//! A tween reads its start value from the stage on its first tick, which is
//! also when its `Started` event fires. `Completed` fires on the tick where
//! the duration has elapsed. Each event fires at most once per tween.

use crate::stage::{Stage, Surface};

pub type TweenId = u64;

/// Lifecycle notifications produced by [`Animator::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenEvent {
    Started(TweenId),
    Completed(TweenId),
}

#[derive(Debug, Clone)]
struct Tween {
    id: TweenId,
    target: Surface,
    from: Option<f32>,
    to: f32,
    start_ms: u64,
    duration_ms: u64,
}

/// Fire-and-forget opacity animation engine.
#[derive(Debug, Default)]
pub struct Animator {
    next_id: TweenId,
    tweens: Vec<Tween>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animate `target` to `to` over `duration_ms`, starting now.
    pub fn animate_opacity(
        &mut self,
        target: Surface,
        to: f32,
        duration_ms: u64,
        now_ms: u64,
    ) -> TweenId {
        self.animate_opacity_delayed(target, to, duration_ms, 0, now_ms)
    }

    /// Animate `target` to `to` after `delay_ms`.
    ///
    /// A running tween on the same target is replaced without emitting
    /// further events.
    pub fn animate_opacity_delayed(
        &mut self,
        target: Surface,
        to: f32,
        duration_ms: u64,
        delay_ms: u64,
        now_ms: u64,
    ) -> TweenId {
        self.tweens.retain(|t| t.target != target);
        self.next_id += 1;
        let id = self.next_id;
        self.tweens.push(Tween {
            id,
            target,
            from: None,
            to: to.clamp(0.0, 1.0),
            start_ms: now_ms + delay_ms,
            duration_ms,
        });
        id
    }

    /// Drop a tween without emitting events.
    pub fn cancel(&mut self, id: TweenId) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.id != id);
        self.tweens.len() < before
    }

    pub fn is_animating(&self, target: &Surface) -> bool {
        self.tweens.iter().any(|t| &t.target == target)
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Advance every tween to `now_ms`, writing opacities into `stage`.
    pub fn tick(&mut self, now_ms: u64, stage: &mut Stage) -> Vec<TweenEvent> {
        let mut events = Vec::new();

        self.tweens.retain_mut(|tween| {
            if now_ms < tween.start_ms {
                return true;
            }

            let from = match tween.from {
                Some(from) => from,
                None => {
                    let from = stage.opacity(&tween.target).unwrap_or(tween.to);
                    tween.from = Some(from);
                    events.push(TweenEvent::Started(tween.id));
                    from
                }
            };

            let elapsed = now_ms - tween.start_ms;
            let progress = if tween.duration_ms == 0 {
                1.0
            } else {
                (elapsed as f32 / tween.duration_ms as f32).min(1.0)
            };
            stage.set_opacity(&tween.target, from + (tween.to - from) * progress);

            if progress >= 1.0 {
                events.push(TweenEvent::Completed(tween.id));
                false
            } else {
                true
            }
        });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageId;
    use ratatui::layout::Rect;

    fn stage() -> Stage {
        Stage::new(Rect::new(0, 0, 100, 40))
    }

    #[test]
    fn test_tween_emits_start_then_complete_once() {
        let mut stage = stage();
        let mut animator = Animator::new();
        let id = animator.animate_opacity(Surface::Splash, 0.0, 100, 0);

        assert_eq!(animator.tick(0, &mut stage), vec![TweenEvent::Started(id)]);
        assert!(animator.tick(50, &mut stage).is_empty());
        assert!((stage.opacity(&Surface::Splash).unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(animator.tick(100, &mut stage), vec![TweenEvent::Completed(id)]);
        assert!(animator.tick(200, &mut stage).is_empty());
        assert_eq!(stage.opacity(&Surface::Splash), Some(0.0));
    }

    #[test]
    fn test_zero_duration_starts_and_completes_in_one_tick() {
        let mut stage = stage();
        let mut animator = Animator::new();
        let id = animator.animate_opacity(Surface::StormOverlay, 0.2, 0, 10);
        assert_eq!(
            animator.tick(10, &mut stage),
            vec![TweenEvent::Started(id), TweenEvent::Completed(id)]
        );
    }

    #[test]
    fn test_delay_defers_start() {
        let mut stage = stage();
        let mut animator = Animator::new();
        let id = animator.animate_opacity_delayed(Surface::LightningFlash, 0.8, 50, 100, 0);
        assert!(animator.tick(99, &mut stage).is_empty());
        assert_eq!(animator.tick(100, &mut stage), vec![TweenEvent::Started(id)]);
    }

    #[test]
    fn test_new_tween_replaces_running_one_on_same_target() {
        let mut stage = stage();
        let mut animator = Animator::new();
        let target = Surface::Page(PageId::HOME);
        let first = animator.animate_opacity(target.clone(), 0.0, 100, 0);
        let second = animator.animate_opacity(target, 1.0, 100, 0);
        assert_eq!(animator.len(), 1);

        let events = animator.tick(100, &mut stage);
        assert!(!events.contains(&TweenEvent::Completed(first)));
        assert!(events.contains(&TweenEvent::Completed(second)));
    }
}
