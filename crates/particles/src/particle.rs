//! A single trail-leaving particle.
//!
//! Each particle carries its own constants (speed scale, trail bound,
//! smoothing step, color) drawn once at creation. It reads the shared
//! [`VectorField`] on every update and never owns a copy of it.

use std::collections::VecDeque;

use flowfield_core::color::Srgb;
use flowfield_core::field::VectorField;
use flowfield_core::palette::Palette;
use flowfield_core::prng::Xorshift64;
use flowfield_core::surface::Surface;
use glam::DVec2;

use crate::params::{FlowFieldParams, Respawn, Steering};

/// Position, heading, bounded trail and lifetime of one particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: DVec2,
    heading: f64,
    target_heading: f64,
    speed: usize,
    max_trail: usize,
    correction: f64,
    timer: i64,
    trail: VecDeque<DVec2>,
    color: Srgb,
}

impl Particle {
    /// Creates a particle at `position` with a one-point trail and a full
    /// lifetime of `2 × max_trail` updates. `speed` and `max_trail` are raised
    /// to at least 1.
    pub fn new(
        position: DVec2,
        speed: usize,
        max_trail: usize,
        correction: f64,
        color: Srgb,
    ) -> Self {
        let max_trail = max_trail.max(1);
        let mut trail = VecDeque::with_capacity(max_trail + 1);
        trail.push_back(position);
        Self {
            position,
            heading: 0.0,
            target_heading: 0.0,
            speed: speed.max(1),
            max_trail,
            correction,
            timer: lifetime(max_trail),
            trail,
            color,
        }
    }

    /// Creates a particle at a random whole-pixel position on a
    /// `width × height` surface with constants drawn from `params`.
    pub fn spawn(
        rng: &mut Xorshift64,
        params: &FlowFieldParams,
        palette: &Palette,
        width: usize,
        height: usize,
    ) -> Self {
        let x = rng.next_range(0.0, width as f64).floor();
        let y = rng.next_range(0.0, height as f64).floor();
        let speed = rng.next_int_inclusive(params.speed_range.0, params.speed_range.1);
        let max_trail = rng.next_int_inclusive(params.trail_range.0, params.trail_range.1);
        let correction = rng.next_range(params.correction_range.0, params.correction_range.1);
        let color = palette.pick(rng);
        Self::new(DVec2::new(x, y), speed, max_trail, correction, color)
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Last angle sampled from the field.
    pub fn target_heading(&self) -> f64 {
        self.target_heading
    }

    pub fn speed(&self) -> usize {
        self.speed
    }

    pub fn max_trail(&self) -> usize {
        self.max_trail
    }

    pub fn correction(&self) -> f64 {
        self.correction
    }

    /// Updates left before the trail starts shrinking. Goes negative while
    /// the trail drains.
    pub fn timer(&self) -> i64 {
        self.timer
    }

    /// Trail points, oldest first.
    pub fn trail(&self) -> &VecDeque<DVec2> {
        &self.trail
    }

    pub fn color(&self) -> Srgb {
        self.color
    }

    /// Advances one frame.
    ///
    /// While alive the particle steers toward the angle of the cell under it
    /// (positions outside the grid keep the current heading), moves
    /// `speed` pixels along its heading and records the new position. Once
    /// expired the trail drains one point per update, and a particle with a
    /// single trail point respawns.
    pub fn update(
        &mut self,
        field: &VectorField,
        rng: &mut Xorshift64,
        steering: Steering,
        respawn: Respawn,
        bounds: DVec2,
    ) {
        self.timer -= 1;
        if self.timer >= 1 {
            if let Some(cell) = field.cell_at(self.position) {
                self.target_heading = cell.angle;
                self.steer(steering);
            }
            let velocity = DVec2::new(self.heading.cos(), self.heading.sin()) * self.speed as f64;
            self.position += velocity;
            self.trail.push_back(self.position);
            if self.trail.len() > self.max_trail {
                self.trail.pop_front();
            }
            // Kept in one slice so `draw` can hand it over whole.
            self.trail.make_contiguous();
        } else if self.trail.len() > 1 {
            self.trail.pop_front();
        } else {
            self.reset(field, rng, respawn, bounds);
        }
    }

    fn steer(&mut self, steering: Steering) {
        match steering {
            Steering::Snap => self.heading = self.target_heading,
            Steering::Smoothed => {
                let diff = self.target_heading - self.heading;
                if diff.abs() <= self.correction {
                    self.heading = self.target_heading;
                } else {
                    self.heading += self.correction.copysign(diff);
                }
            }
        }
    }

    /// Relocates the particle and restarts its lifetime.
    ///
    /// With [`Respawn::BoundedRetry`] up to `attempts` random cells are tried
    /// and the first one with opacity > 0 wins. Otherwise, or when every
    /// attempt misses, the particle lands on a uniform random point of the
    /// `bounds` rectangle. Heading is kept.
    pub fn reset(
        &mut self,
        field: &VectorField,
        rng: &mut Xorshift64,
        respawn: Respawn,
        bounds: DVec2,
    ) {
        let picked = match respawn {
            Respawn::BoundedRetry { attempts } => pick_valid_cell(field, rng, attempts),
            Respawn::Unconditional => None,
        };
        let position = picked.unwrap_or_else(|| {
            if matches!(respawn, Respawn::BoundedRetry { .. }) {
                tracing::trace!("no valid cell found, falling back to a random position");
            }
            DVec2::new(rng.next_range(0.0, bounds.x), rng.next_range(0.0, bounds.y))
        });
        self.position = position;
        self.trail.clear();
        self.trail.push_back(position);
        self.timer = lifetime(self.max_trail);
    }

    /// Strokes the trail as one polyline. Trails shorter than two points
    /// draw nothing.
    pub fn draw(&self, surface: &mut dyn Surface, line_width: f64) {
        let (points, wrapped) = self.trail.as_slices();
        debug_assert!(wrapped.is_empty());
        surface.stroke_polyline(points, self.color, line_width);
    }
}

fn lifetime(max_trail: usize) -> i64 {
    i64::try_from(max_trail).map_or(i64::MAX, |n| n.saturating_mul(2))
}

/// Tries up to `attempts` random cells and returns the origin of the first
/// valid one. An empty field skips straight to `None`.
fn pick_valid_cell(field: &VectorField, rng: &mut Xorshift64, attempts: usize) -> Option<DVec2> {
    if field.is_empty() {
        return None;
    }
    (0..attempts).find_map(|_| {
        rng.next_index(field.len())
            .and_then(|i| field.get(i))
            .filter(|cell| cell.is_valid())
            .map(|cell| cell.origin())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowfield_core::raster::RasterSurface;
    use std::f64::consts::{FRAC_PI_2, PI};

    const BOUNDS: DVec2 = DVec2::new(500.0, 500.0);

    fn uniform_field(angle: f64, opacity: f64) -> VectorField {
        VectorField::from_fn(500, 500, 5, |_, _| (angle, opacity)).unwrap()
    }

    fn particle(max_trail: usize) -> Particle {
        Particle::new(DVec2::new(250.0, 250.0), 1, max_trail, 0.1, Srgb::WHITE)
    }

    fn step(p: &mut Particle, field: &VectorField, rng: &mut Xorshift64, steering: Steering) {
        p.update(field, rng, steering, Respawn::BoundedRetry { attempts: 5 }, BOUNDS);
    }

    #[test]
    fn new_particle_has_one_point_trail_and_full_lifetime() {
        let p = particle(20);
        assert_eq!(p.trail().len(), 1);
        assert_eq!(p.timer(), 40);
        assert_eq!(p.heading(), 0.0);
    }

    #[test]
    fn twenty_five_updates_with_max_trail_twenty() {
        let field = uniform_field(0.3, 1.0);
        let mut rng = Xorshift64::new(1);
        let mut p = particle(20);
        for _ in 0..25 {
            step(&mut p, &field, &mut rng, Steering::Smoothed);
        }
        assert_eq!(p.trail().len(), 20);
        assert_eq!(p.timer(), 15);
    }

    #[test]
    fn expired_trail_shrinks_one_per_update_then_resets() {
        let field = uniform_field(0.0, 1.0);
        let mut rng = Xorshift64::new(3);
        let mut p = particle(10);
        for _ in 0..19 {
            step(&mut p, &field, &mut rng, Steering::Snap);
        }
        assert_eq!(p.timer(), 1);
        assert_eq!(p.trail().len(), 10);

        step(&mut p, &field, &mut rng, Steering::Snap);
        assert_eq!(p.timer(), 0, "timer hits 0 at update 20");
        assert_eq!(p.trail().len(), 9);

        for expected in (1..9).rev() {
            step(&mut p, &field, &mut rng, Steering::Snap);
            assert_eq!(p.trail().len(), expected);
        }

        step(&mut p, &field, &mut rng, Steering::Snap);
        assert_eq!(p.timer(), 20, "reset restores the lifetime");
        assert_eq!(p.trail().len(), 1);
        assert_eq!(p.trail()[0], p.position());
    }

    #[test]
    fn bounded_retry_lands_on_a_valid_cell_origin() {
        let field = VectorField::from_fn(500, 500, 5, |col, row| {
            let opacity = if col == 7 && row == 3 { 0.0 } else { 1.0 };
            (0.0, opacity)
        })
        .unwrap();
        let mut rng = Xorshift64::new(11);
        let mut p = particle(5);
        p.reset(&field, &mut rng, Respawn::BoundedRetry { attempts: 5 }, BOUNDS);
        let cell = field.cell_at(p.position()).unwrap();
        assert!(cell.is_valid());
        assert_eq!(cell.origin(), p.position());
    }

    #[test]
    fn reset_falls_back_when_no_cell_is_valid() {
        let field = uniform_field(1.0, 0.0);
        let mut rng = Xorshift64::new(5);
        let mut p = particle(5);
        p.reset(&field, &mut rng, Respawn::BoundedRetry { attempts: 5 }, BOUNDS);
        let pos = p.position();
        assert!((0.0..500.0).contains(&pos.x) && (0.0..500.0).contains(&pos.y));
        assert_eq!(p.trail().len(), 1);
        assert_eq!(p.timer(), 10);
    }

    #[test]
    fn reset_on_empty_field_falls_back() {
        let field = VectorField::from_fn(3, 3, 5, |_, _| (0.0, 1.0)).unwrap();
        assert!(field.is_empty());
        let mut rng = Xorshift64::new(9);
        let mut p = particle(5);
        p.reset(&field, &mut rng, Respawn::BoundedRetry { attempts: 5 }, DVec2::new(3.0, 3.0));
        assert!(p.position().x < 3.0 && p.position().y < 3.0);
    }

    #[test]
    fn unconditional_respawn_ignores_validity() {
        // Only cell origins are valid spawn points; a uniform draw almost never lands on one.
        let field = uniform_field(0.0, 1.0);
        let mut rng = Xorshift64::new(21);
        let mut p = particle(5);
        p.reset(&field, &mut rng, Respawn::Unconditional, BOUNDS);
        let pos = p.position();
        assert_ne!((pos.x % 5.0, pos.y % 5.0), (0.0, 0.0));
    }

    #[test]
    fn snap_steering_takes_field_angle_at_once() {
        let field = uniform_field(2.0, 1.0);
        let mut rng = Xorshift64::new(1);
        let mut p = particle(20);
        step(&mut p, &field, &mut rng, Steering::Snap);
        assert_eq!(p.heading(), 2.0);
        assert_eq!(p.target_heading(), 2.0);
    }

    #[test]
    fn smoothed_steering_converges_monotonically() {
        let field = uniform_field(1.0, 1.0);
        let mut rng = Xorshift64::new(1);
        let mut p = Particle::new(DVec2::new(250.0, 250.0), 1, 39, 0.15, Srgb::WHITE);
        let mut gap = (p.target_heading() - 1.0).abs().max(1.0);
        for _ in 0..7 {
            step(&mut p, &field, &mut rng, Steering::Smoothed);
            let next = (1.0 - p.heading()).abs();
            assert!(next < gap || next == 0.0);
            gap = next;
        }
        assert_eq!(p.heading(), 1.0);
    }

    #[test]
    fn smoothed_steering_turns_downward_too() {
        let field = uniform_field(PI, 1.0);
        let mut rng = Xorshift64::new(1);
        let mut p = particle(39);
        step(&mut p, &field, &mut rng, Steering::Snap);
        let low = VectorField::from_fn(500, 500, 5, |_, _| (FRAC_PI_2, 1.0)).unwrap();
        step(&mut p, &low, &mut rng, Steering::Smoothed);
        assert!((p.heading() - (PI - 0.1)).abs() < 1e-12);
    }

    #[test]
    fn outside_the_grid_keeps_heading() {
        let field = uniform_field(2.0, 1.0);
        let mut rng = Xorshift64::new(1);
        let mut p = Particle::new(DVec2::new(-20.0, -20.0), 1, 20, 0.1, Srgb::WHITE);
        step(&mut p, &field, &mut rng, Steering::Snap);
        assert_eq!(p.heading(), 0.0);
        assert_eq!(p.position(), DVec2::new(-19.0, -20.0));
    }

    #[test]
    fn movement_follows_heading_times_speed() {
        let field = uniform_field(FRAC_PI_2, 1.0);
        let mut rng = Xorshift64::new(1);
        let mut p = Particle::new(DVec2::new(100.0, 100.0), 3, 20, 0.1, Srgb::WHITE);
        step(&mut p, &field, &mut rng, Steering::Snap);
        assert!((p.position() - DVec2::new(100.0, 103.0)).length() < 1e-9);
        assert_eq!(p.trail().len(), 2);
    }

    #[test]
    fn spawn_draws_constants_from_params() {
        let params = FlowFieldParams::default();
        let palette = Palette::white();
        let mut rng = Xorshift64::new(42);
        for _ in 0..200 {
            let p = Particle::spawn(&mut rng, &params, &palette, 500, 300);
            assert!((1..=4).contains(&p.speed()));
            assert!((10..=39).contains(&p.max_trail()));
            assert!((0.01..0.51).contains(&p.correction()));
            assert_eq!(p.position().x.fract(), 0.0);
            assert!(p.position().x < 500.0 && p.position().y < 300.0);
            assert_eq!(p.color(), Srgb::WHITE);
        }
    }

    #[test]
    fn draw_single_point_trail_is_a_no_op() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        particle(5).draw(&mut surface, 1.0);
        assert!(surface.snapshot().data().iter().all(|&b| b == 0));
    }

    #[test]
    fn draw_strokes_the_trail_without_mutating() {
        let field = uniform_field(0.0, 1.0);
        let mut rng = Xorshift64::new(1);
        let mut p = Particle::new(DVec2::new(2.0, 10.0), 4, 10, 0.1, Srgb::WHITE);
        for _ in 0..3 {
            step(&mut p, &field, &mut rng, Steering::Snap);
        }
        let before = p.clone();
        let mut surface = RasterSurface::new(20, 20).unwrap();
        p.draw(&mut surface, 2.0);
        assert_eq!(p, before);
        assert!(surface.snapshot().data()[(10 * 20 + 8) * 4 + 3] > 0);
    }

    #[test]
    fn draw_covers_the_whole_trail_after_it_wraps() {
        let field = uniform_field(0.0, 1.0);
        let mut rng = Xorshift64::new(1);
        let mut p = Particle::new(DVec2::new(1.0, 10.0), 1, 4, 0.1, Srgb::WHITE);
        for _ in 0..7 {
            step(&mut p, &field, &mut rng, Steering::Snap);
            assert!(p.trail().as_slices().1.is_empty());
        }
        let points: Vec<DVec2> = p.trail().iter().copied().collect();
        let mut drawn = RasterSurface::new(20, 20).unwrap();
        p.draw(&mut drawn, 2.0);
        let mut expected = RasterSurface::new(20, 20).unwrap();
        expected.stroke_polyline(&points, Srgb::WHITE, 2.0);
        assert_eq!(drawn.snapshot(), expected.snapshot());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn trail_stays_bounded_and_timer_decreases(
                seed in 1_u64..u64::MAX,
                max_trail in 1_usize..40,
                updates in 1_usize..200,
                opacity in prop_oneof![Just(0.0), Just(1.0)],
            ) {
                let field = VectorField::from_fn(100, 100, 5, |c, r| {
                    ((c * r) as f64 * 0.3, opacity)
                })
                .unwrap();
                let mut rng = Xorshift64::new(seed);
                let mut p = Particle::new(DVec2::new(50.0, 50.0), 2, max_trail, 0.2, Srgb::WHITE);
                for _ in 0..updates {
                    let before = p.timer();
                    let len_before = p.trail().len();
                    p.update(
                        &field,
                        &mut rng,
                        Steering::Smoothed,
                        Respawn::BoundedRetry { attempts: 5 },
                        DVec2::new(100.0, 100.0),
                    );
                    prop_assert!(!p.trail().is_empty());
                    prop_assert!(p.trail().len() <= p.max_trail());
                    prop_assert!(p.position().is_finite());
                    let reset = len_before == 1 && before <= 1;
                    if reset {
                        prop_assert_eq!(p.timer(), 2 * max_trail as i64);
                    } else {
                        prop_assert_eq!(p.timer(), before - 1);
                    }
                }
            }
        }
    }
}
