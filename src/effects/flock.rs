//! Boids flock drawn behind a page.
//!
//! Coordinates are cells inside the owning container, with y growing
//! downward. The simulation wraps at the edges.

use rand::Rng;
use ratatui::layout::Rect;
use tracing::debug;

/// Boids spawned per unit of quantity.
pub const BOIDS_PER_QUANTITY: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockParams {
    pub quantity: u16,
    pub speed_limit: f64,
    pub separation: f64,
    pub alignment: f64,
    pub cohesion: f64,
}

impl FlockParams {
    pub fn with_quantity(quantity: u16) -> Self {
        Self {
            quantity,
            ..Self::default()
        }
    }

    pub fn boid_count(&self) -> usize {
        usize::from(self.quantity) * BOIDS_PER_QUANTITY
    }
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            quantity: 3,
            speed_limit: 0.6,
            separation: 2.5,
            alignment: 6.0,
            cohesion: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

#[derive(Debug)]
pub struct FlockVisual {
    params: FlockParams,
    width: f64,
    height: f64,
    boids: Vec<Boid>,
    destroyed: bool,
}

impl FlockVisual {
    pub fn create<R: Rng>(bounds: Rect, params: FlockParams, rng: &mut R) -> Self {
        let width = f64::from(bounds.width.max(1));
        let height = f64::from(bounds.height.max(1));
        let speed = params.speed_limit;
        let boids = (0..params.boid_count())
            .map(|_| Boid {
                x: rng.random_range(0.0..width),
                y: rng.random_range(0.0..height),
                vx: rng.random_range(-speed..speed),
                vy: rng.random_range(-speed..speed),
            })
            .collect();
        debug!(boids = params.boid_count(), "Flock created");

        Self {
            params,
            width,
            height,
            boids,
            destroyed: false,
        }
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        if self.destroyed {
            return;
        }
        let snapshot = self.boids.clone();
        let p = self.params;

        for (i, boid) in self.boids.iter_mut().enumerate() {
            let mut sep = (0.0, 0.0);
            let mut align = (0.0, 0.0);
            let mut center = (0.0, 0.0);
            let mut neighbors = 0.0;

            for (j, other) in snapshot.iter().enumerate() {
                if i == j {
                    continue;
                }
                let dx = other.x - boid.x;
                let dy = other.y - boid.y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist < p.separation && dist > 0.0 {
                    sep.0 -= dx / dist;
                    sep.1 -= dy / dist;
                }
                if dist < p.alignment {
                    align.0 += other.vx;
                    align.1 += other.vy;
                }
                if dist < p.cohesion {
                    center.0 += other.x;
                    center.1 += other.y;
                    neighbors += 1.0;
                }
            }

            boid.vx += sep.0 * 0.05;
            boid.vy += sep.1 * 0.05;
            if neighbors > 0.0 {
                boid.vx += (align.0 / neighbors - boid.vx) * 0.05;
                boid.vy += (align.1 / neighbors - boid.vy) * 0.05;
                boid.vx += (center.0 / neighbors - boid.x) * 0.005;
                boid.vy += (center.1 / neighbors - boid.y) * 0.005;
            }

            let speed = (boid.vx * boid.vx + boid.vy * boid.vy).sqrt();
            if speed > p.speed_limit {
                boid.vx = boid.vx / speed * p.speed_limit;
                boid.vy = boid.vy / speed * p.speed_limit;
            }

            boid.x = wrap(boid.x + boid.vx, self.width);
            boid.y = wrap(boid.y + boid.vy, self.height);
        }
    }

    /// Rescale the flock into new bounds.
    pub fn resize(&mut self, bounds: Rect) {
        let width = f64::from(bounds.width.max(1));
        let height = f64::from(bounds.height.max(1));
        for boid in &mut self.boids {
            boid.x = (boid.x / self.width * width).min(width - f64::EPSILON);
            boid.y = (boid.y / self.height * height).min(height - f64::EPSILON);
        }
        self.width = width;
        self.height = height;
    }

    pub fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.boids.clear();
            debug!("Flock destroyed");
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

fn wrap(value: f64, extent: f64) -> f64 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn flock(quantity: u16) -> FlockVisual {
        let mut rng = SmallRng::seed_from_u64(1);
        FlockVisual::create(
            Rect::new(0, 0, 80, 20),
            FlockParams::with_quantity(quantity),
            &mut rng,
        )
    }

    #[test]
    fn test_boid_count_is_quantity_times_six() {
        assert_eq!(flock(3).boids().len(), 18);
        assert_eq!(flock(15).boids().len(), 90);
    }

    #[test]
    fn test_boids_stay_in_bounds_and_under_speed_limit() {
        let mut flock = flock(5);
        for _ in 0..200 {
            flock.step();
        }
        let limit = FlockParams::default().speed_limit + 1e-9;
        for boid in flock.boids() {
            assert!((0.0..80.0).contains(&boid.x));
            assert!((0.0..20.0).contains(&boid.y));
            assert!((boid.vx * boid.vx + boid.vy * boid.vy).sqrt() <= limit);
        }
    }

    #[test]
    fn test_resize_rescales_positions() {
        let mut flock = flock(3);
        flock.resize(Rect::new(0, 0, 40, 10));
        assert_eq!(flock.bounds(), (40.0, 10.0));
        for boid in flock.boids() {
            assert!(boid.x < 40.0 && boid.y < 10.0);
        }
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut flock = flock(3);
        flock.destroy();
        flock.destroy();
        flock.step();
        assert!(flock.is_destroyed());
        assert!(flock.boids().is_empty());
    }
}
