//! Particle stream around a rotating globe.
//!
//! Particles live in a cube of side [`FIELD_SIZE`] centered on the origin and
//! drift toward a camera at `z = CAMERA_Z`. Projection maps them into
//! normalized device coordinates for the canvas renderer.

use super::audio::{Instrument, NoteLength};
use super::EffectContext;
use crate::engine::FrameLoop;
use rand::Rng;
use ratatui::layout::Rect;
use tracing::debug;

pub const DEFAULT_PARTICLE_COUNT: usize = 1200;
pub const FIELD_SIZE: f32 = 100.0;
pub const SPAWN_Z: f32 = -100.0;
pub const CAMERA_Z: f32 = 15.0;
pub const PARTICLE_SPEED: f32 = 0.3;
pub const POINTER_RADIUS: f32 = 70.0;
pub const POINTER_INFLUENCE: f32 = 0.3;
pub const BOOM_COOLDOWN_MS: u64 = 100;
/// Particles that must pass the camera between booms.
pub const BOOM_THRESHOLD: u32 = 5;

const GLOBE_SPIN: f32 = 0.0015;
const CLOUD_SPIN: f32 = 0.002;
/// `1 / tan(fov / 2)` for a 75 degree field of view.
const FOCAL: f32 = 1.303;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Hue in `0.0..1.0`.
    pub hue: f32,
}

impl Particle {
    fn random<R: Rng>(rng: &mut R, z: Option<f32>) -> Self {
        let half = FIELD_SIZE / 2.0;
        Self {
            x: rng.random_range(-half..half),
            y: rng.random_range(-half..half),
            z: z.unwrap_or_else(|| rng.random_range(-half..half)),
            hue: rng.random::<f32>(),
        }
    }
}

/// A particle projected onto the screen plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Horizontal position in `-1.0..=1.0`.
    pub x: f64,
    /// Vertical position in `-1.0..=1.0`, up is positive.
    pub y: f64,
    pub hue: f32,
    /// Closer particles are larger.
    pub near: bool,
}

#[derive(Debug)]
pub struct ParticleScene {
    particles: Vec<Particle>,
    frame_loop: Option<FrameLoop>,
    aspect: f32,
    pointer: (f32, f32),
    globe_rotation: f32,
    cloud_rotation: f32,
    with_audio: bool,
    passed: u32,
    last_boom_ms: Option<u64>,
    frames_rendered: u64,
}

impl ParticleScene {
    pub fn init<R: Rng>(bounds: Rect, count: usize, with_audio: bool, rng: &mut R) -> Self {
        let particles = (0..count).map(|_| Particle::random(rng, None)).collect();
        Self {
            particles,
            frame_loop: None,
            aspect: aspect(bounds),
            pointer: (0.0, 0.0),
            globe_rotation: 0.0,
            cloud_rotation: 0.0,
            with_audio,
            passed: 0,
            last_boom_ms: None,
            frames_rendered: 0,
        }
    }

    /// Arm `frame_loop` and render on every frame while it stays armed.
    pub fn start(&mut self, frame_loop: FrameLoop) {
        frame_loop.arm();
        self.frame_loop = Some(frame_loop);
        debug!(particles = self.particles.len(), "Particle loop started");
    }

    /// A handle to the loop driving this scene.
    pub fn frame_loop(&self) -> Option<FrameLoop> {
        self.frame_loop.clone()
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.as_ref().is_some_and(FrameLoop::is_armed)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn globe_rotation(&self) -> f32 {
        self.globe_rotation
    }

    pub fn cloud_rotation(&self) -> f32 {
        self.cloud_rotation
    }

    /// Pointer position in normalized coordinates (`-1.0..=1.0`, up positive).
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
    }

    pub fn resize(&mut self, bounds: Rect) {
        self.aspect = aspect(bounds);
    }

    /// Advance one frame. Returns false once the loop has been canceled.
    pub fn frame(&mut self, ctx: &mut EffectContext<'_>) -> bool {
        if !self.is_running() {
            return false;
        }

        self.globe_rotation += GLOBE_SPIN;
        self.cloud_rotation += CLOUD_SPIN;
        let target = (self.pointer.0 * 50.0, self.pointer.1 * 50.0);

        for i in 0..self.particles.len() {
            self.particles[i].z += PARTICLE_SPEED;

            if self.particles[i].z > CAMERA_Z {
                self.passed += 1;
                let cooled = self
                    .last_boom_ms
                    .is_none_or(|last| ctx.now_ms.saturating_sub(last) > BOOM_COOLDOWN_MS);
                if cooled && self.passed > BOOM_THRESHOLD {
                    if self.with_audio {
                        ctx.audio.trigger_attack_release(
                            Instrument::Boom,
                            &["A3"],
                            NoteLength::Sixteenth,
                        );
                    }
                    self.last_boom_ms = Some(ctx.now_ms);
                    self.passed = 0;
                }
                self.particles[i] = Particle::random(ctx.rng, Some(SPAWN_Z));
            }

            let particle = &mut self.particles[i];
            let dx = particle.x - target.0;
            let dy = particle.y - target.1;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance < POINTER_RADIUS {
                let force = (POINTER_RADIUS - distance) / POINTER_RADIUS;
                let angle = dy.atan2(dx);
                particle.x += angle.cos() * force * POINTER_INFLUENCE * 8.0;
                particle.y += angle.sin() * force * POINTER_INFLUENCE * 8.0;
            }
        }

        self.frames_rendered += 1;
        true
    }

    /// Perspective projection of every particle in front of the camera.
    pub fn projected(&self) -> impl Iterator<Item = Projected> + '_ {
        let aspect = self.aspect;
        self.particles.iter().filter_map(move |p| {
            let depth = CAMERA_Z - p.z;
            if depth <= 0.1 {
                return None;
            }
            let x = p.x * FOCAL / depth / aspect;
            let y = p.y * FOCAL / depth;
            ((-1.0..=1.0).contains(&x) && (-1.0..=1.0).contains(&y)).then_some(Projected {
                x: f64::from(x),
                y: f64::from(y),
                hue: p.hue,
                near: depth < 30.0,
            })
        })
    }

    /// Stop the frame loop. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(frame_loop) = &self.frame_loop {
            if frame_loop.is_armed() {
                frame_loop.cancel();
                debug!(frames = self.frames_rendered, "Particle loop stopped");
            }
        }
    }
}

/// Width over height of a cell area, treating cells as twice as tall as wide.
fn aspect(bounds: Rect) -> f32 {
    let height = f32::from(bounds.height.max(1)) * 2.0;
    f32::from(bounds.width.max(1)) / height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::Rig;

    fn scene(rig: &mut Rig, count: usize) -> ParticleScene {
        let mut scene = ParticleScene::init(Rect::new(0, 0, 100, 30), count, true, &mut rig.rng);
        scene.start(FrameLoop::new());
        scene
    }

    #[test]
    fn test_particles_start_inside_field() {
        let mut rig = Rig::new();
        let scene = scene(&mut rig, DEFAULT_PARTICLE_COUNT);
        assert_eq!(scene.particles().len(), 1200);
        for p in scene.particles() {
            assert!(p.x.abs() <= 50.0 && p.y.abs() <= 50.0 && p.z.abs() <= 50.0);
        }
    }

    #[test]
    fn test_passing_particles_respawn_far_away() {
        let mut rig = Rig::new();
        let mut scene = scene(&mut rig, 1);
        scene.particles[0] = Particle {
            x: 60.0,
            y: 60.0,
            z: CAMERA_Z - 0.1,
            hue: 0.5,
        };
        scene.frame(&mut rig.ctx(0));
        assert_eq!(scene.particles()[0].z, SPAWN_Z);
    }

    #[test]
    fn test_boom_rate_limited() {
        let mut rig = Rig::new();
        let mut scene = scene(&mut rig, 10);
        let push_all_past_camera = |scene: &mut ParticleScene| {
            for p in &mut scene.particles {
                p.z = CAMERA_Z;
                p.x = 60.0;
                p.y = 60.0;
            }
        };

        push_all_past_camera(&mut scene);
        scene.frame(&mut rig.ctx(1000));
        assert_eq!(rig.audio.one_shots(Instrument::Boom), 1);

        // within the cooldown: no boom however many pass
        push_all_past_camera(&mut scene);
        scene.frame(&mut rig.ctx(1050));
        assert_eq!(rig.audio.one_shots(Instrument::Boom), 1);

        push_all_past_camera(&mut scene);
        scene.frame(&mut rig.ctx(1200));
        assert_eq!(rig.audio.one_shots(Instrument::Boom), 2);
    }

    #[test]
    fn test_pointer_repels_nearby_particles() {
        let mut rig = Rig::new();
        let mut scene = scene(&mut rig, 1);
        scene.particles[0] = Particle {
            x: 10.0,
            y: 0.0,
            z: 0.0,
            hue: 0.0,
        };
        scene.set_pointer(0.0, 0.0);
        scene.frame(&mut rig.ctx(0));
        assert!(scene.particles()[0].x > 10.0);
    }

    #[test]
    fn test_cancelled_loop_renders_nothing() {
        let mut rig = Rig::new();
        let mut scene = scene(&mut rig, 5);
        let handle = scene.frame_loop().unwrap();
        assert!(scene.frame(&mut rig.ctx(0)));

        handle.cancel();
        let before = scene.particles().to_vec();
        assert!(!scene.frame(&mut rig.ctx(16)));
        assert_eq!(scene.particles(), before.as_slice());
        assert_eq!(scene.frames_rendered(), 1);

        scene.release();
        assert!(!scene.is_running());
    }
}
