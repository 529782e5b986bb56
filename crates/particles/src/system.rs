//! The particle pool and the field it reads, driven one frame at a time.

use flowfield_core::color::Srgb;
use flowfield_core::error::EngineError;
use flowfield_core::field::VectorField;
use flowfield_core::field_source::FieldStrategy;
use flowfield_core::palette::Palette;
use flowfield_core::prng::Xorshift64;
use flowfield_core::reference::Reference;
use flowfield_core::surface::Surface;
use flowfield_core::Engine;
use glam::DVec2;
use serde_json::Value;

use crate::params::FlowFieldParams;
use crate::particle::Particle;

/// Stroke width of the debug grid.
const GRID_LINE_WIDTH: f64 = 0.5;

/// Owns the [`VectorField`] and every [`Particle`].
///
/// The field is rebuilt wholesale by [`init`](Self::init) (on construction
/// and on resize); between rebuilds it is read-only and particles persist,
/// respawning in place when they expire.
pub struct ParticleSystem {
    params: FlowFieldParams,
    strategy: FieldStrategy,
    reference: Reference,
    palette: Palette,
    rng: Xorshift64,
    field: VectorField,
    particles: Vec<Particle>,
    width: usize,
    height: usize,
    debug: bool,
}

impl ParticleSystem {
    /// Validates `params` and runs [`init`](Self::init) against `surface`.
    pub fn new(
        params: FlowFieldParams,
        seed: u64,
        surface: &mut dyn Surface,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        let strategy = params.field_strategy(seed)?;
        let reference = params.reference()?;
        let palette = params.palette()?;
        let mut rng = Xorshift64::new(seed);
        let (field, particles) = build(&params, &strategy, &palette, &mut rng, surface)?;
        Ok(Self {
            width: surface.width(),
            height: surface.height(),
            params,
            strategy,
            reference,
            palette,
            rng,
            field,
            particles,
            debug: false,
        })
    }

    /// Creates a system from a JSON params object, falling back to defaults
    /// for missing keys.
    pub fn from_json(
        params: &Value,
        seed: u64,
        surface: &mut dyn Surface,
    ) -> Result<Self, EngineError> {
        Self::new(FlowFieldParams::from_json(params)?, seed, surface)
    }

    /// Rebuilds the field for the surface's current size and replaces the
    /// whole particle pool.
    ///
    /// With the image strategy this draws the reference onto `surface` and
    /// samples it, so the surface holds the reference afterwards until the
    /// host clears it.
    pub fn init(&mut self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        let (field, particles) = build(
            &self.params,
            &self.strategy,
            &self.palette,
            &mut self.rng,
            surface,
        )?;
        self.field = field;
        self.particles = particles;
        self.width = surface.width();
        self.height = surface.height();
        Ok(())
    }

    pub fn field(&self) -> &VectorField {
        &self.field
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Draws the cell grid and the reference text.
    fn draw_debug(&self, surface: &mut dyn Surface) {
        let size = self.field.cell_size() as f64;
        let (w, h) = (self.width as f64, self.height as f64);
        surface.begin_path();
        for col in 0..self.field.cols() {
            let x = col as f64 * size;
            surface.move_to(DVec2::new(x, 0.0));
            surface.line_to(DVec2::new(x, h));
        }
        for row in 0..self.field.rows() {
            let y = row as f64 * size;
            surface.move_to(DVec2::new(0.0, y));
            surface.line_to(DVec2::new(w, y));
        }
        surface.stroke(Srgb::WHITE, GRID_LINE_WIDTH);
        self.reference.draw(surface);
    }
}

#[tracing::instrument(skip_all, fields(width = surface.width(), height = surface.height()))]
fn build(
    params: &FlowFieldParams,
    strategy: &FieldStrategy,
    palette: &Palette,
    rng: &mut Xorshift64,
    surface: &mut dyn Surface,
) -> Result<(VectorField, Vec<Particle>), EngineError> {
    let field = strategy.generate(surface, params.cell_size)?;
    let (width, height) = (surface.width(), surface.height());
    let particles: Vec<Particle> = (0..params.number_of_particles)
        .map(|_| Particle::spawn(rng, params, palette, width, height))
        .collect();
    tracing::debug!(
        cells = field.len(),
        particles = particles.len(),
        strategy = strategy.name(),
        "particle system initialized"
    );
    Ok((field, particles))
}

impl Engine for ParticleSystem {
    /// Optional debug overlay, then draw-then-update for every particle in
    /// pool order. The drawn trail therefore lags the simulation by one step.
    fn render(&mut self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        if self.debug {
            self.draw_debug(surface);
        }
        let bounds = DVec2::new(self.width as f64, self.height as f64);
        let (steering, respawn, line_width) = (
            self.params.steering,
            self.params.respawn,
            self.params.line_width,
        );
        for particle in &mut self.particles {
            particle.draw(surface, line_width);
            particle.update(&self.field, &mut self.rng, steering, respawn, bounds);
        }
        Ok(())
    }

    /// Resizes `surface` and rebuilds. If the rebuild fails the surface is
    /// put back to its previous size (cleared) and the system keeps its old
    /// field, particles and dimensions.
    #[tracing::instrument(skip(self, surface))]
    fn resize(
        &mut self,
        width: usize,
        height: usize,
        surface: &mut dyn Surface,
    ) -> Result<(), EngineError> {
        let previous = (surface.width(), surface.height());
        surface.resize(width, height)?;
        if let Err(e) = self.init(surface) {
            tracing::warn!(error = %e, "rebuild failed, restoring previous size");
            surface.resize(previous.0, previous.1)?;
            return Err(e);
        }
        Ok(())
    }

    fn toggle_debug(&mut self) {
        self.debug = !self.debug;
    }

    fn debug(&self) -> bool {
        self.debug
    }

    fn params(&self) -> Value {
        self.params.to_json()
    }

    fn param_schema(&self) -> Value {
        FlowFieldParams::schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{FieldKind, Respawn, Steering};
    use flowfield_core::raster::RasterSurface;
    use flowfield_core::surface::{Paint, PixelBuffer};
    use serde_json::json;

    fn small_params() -> FlowFieldParams {
        FlowFieldParams {
            number_of_particles: 50,
            ..FlowFieldParams::default()
        }
    }

    fn run(system: &mut ParticleSystem, surface: &mut RasterSurface, frames: usize) {
        for _ in 0..frames {
            surface.clear();
            system.render(surface).unwrap();
        }
    }

    #[test]
    fn new_builds_grid_and_pool() {
        let mut surface = RasterSurface::new(500, 500).unwrap();
        let system = ParticleSystem::new(FlowFieldParams::default(), 42, &mut surface).unwrap();
        assert_eq!(system.field().rows(), 100);
        assert_eq!(system.field().cols(), 100);
        assert_eq!(system.field().len(), 10_000);
        assert_eq!(system.particles().len(), 2500);
    }

    #[test]
    fn new_rejects_invalid_params() {
        let mut surface = RasterSurface::new(50, 50).unwrap();
        let params = FlowFieldParams {
            number_of_particles: 0,
            ..FlowFieldParams::default()
        };
        assert!(ParticleSystem::new(params, 1, &mut surface).is_err());
    }

    #[test]
    fn from_json_applies_overrides() {
        let mut surface = RasterSurface::new(60, 40).unwrap();
        let params = json!({"number_of_particles": 7, "cell_size": 10});
        let system = ParticleSystem::from_json(&params, 1, &mut surface).unwrap();
        assert_eq!(system.particles().len(), 7);
        assert_eq!((system.field().cols(), system.field().rows()), (6, 4));
        assert_eq!(system.params()["cell_size"], 10);
    }

    #[test]
    fn render_draws_trails_after_first_frame() {
        let mut surface = RasterSurface::new(120, 120).unwrap();
        let mut system = ParticleSystem::new(small_params(), 7, &mut surface).unwrap();
        surface.clear();
        system.render(&mut surface).unwrap();
        assert!(
            surface.snapshot().data().iter().all(|&b| b == 0),
            "first frame draws one-point trails only"
        );
        run(&mut system, &mut surface, 3);
        assert!(surface.snapshot().data().chunks(4).any(|p| p[3] > 0));
    }

    #[test]
    fn render_advances_every_particle() {
        let mut surface = RasterSurface::new(120, 120).unwrap();
        let mut system = ParticleSystem::new(small_params(), 7, &mut surface).unwrap();
        let before: Vec<i64> = system.particles().iter().map(Particle::timer).collect();
        system.render(&mut surface).unwrap();
        for (p, t) in system.particles().iter().zip(before) {
            assert_eq!(p.timer(), t - 1);
        }
    }

    #[test]
    fn same_seed_renders_identical_frames() {
        let mut a = RasterSurface::new(80, 80).unwrap();
        let mut b = RasterSurface::new(80, 80).unwrap();
        let mut sa = ParticleSystem::new(small_params(), 99, &mut a).unwrap();
        let mut sb = ParticleSystem::new(small_params(), 99, &mut b).unwrap();
        run(&mut sa, &mut a, 60);
        run(&mut sb, &mut b, 60);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn trails_stay_bounded_over_many_frames() {
        let mut surface = RasterSurface::new(100, 100).unwrap();
        let params = FlowFieldParams {
            number_of_particles: 30,
            strategy: FieldKind::Image,
            respawn: Respawn::BoundedRetry { attempts: 5 },
            ..FlowFieldParams::default()
        };
        let mut system = ParticleSystem::new(params, 5, &mut surface).unwrap();
        for _ in 0..150 {
            system.render(&mut surface).unwrap();
            for p in system.particles() {
                assert!(!p.trail().is_empty() && p.trail().len() <= p.max_trail());
                assert!(p.position().is_finite());
            }
        }
    }

    #[test]
    fn image_strategy_samples_reference_and_leaves_it_drawn() {
        let mut surface = RasterSurface::new(100, 100).unwrap();
        let params = FlowFieldParams {
            number_of_particles: 1,
            strategy: FieldKind::Image,
            ..FlowFieldParams::default()
        };
        let system = ParticleSystem::new(params, 5, &mut surface).unwrap();
        let valid = system.field().valid_count();
        assert!(valid > 0 && valid < system.field().len());
        assert!(surface.snapshot().data().chunks(4).any(|p| p[3] > 0));
    }

    #[test]
    fn resize_rebuilds_field_and_pool() {
        let mut surface = RasterSurface::new(100, 100).unwrap();
        let mut system = ParticleSystem::new(small_params(), 3, &mut surface).unwrap();
        run(&mut system, &mut surface, 5);
        system.resize(60, 30, &mut surface).unwrap();
        assert_eq!((surface.width(), surface.height()), (60, 30));
        assert_eq!((system.width(), system.height()), (60, 30));
        assert_eq!((system.field().cols(), system.field().rows()), (12, 6));
        assert_eq!(system.particles().len(), 50);
        for p in system.particles() {
            assert_eq!(p.trail().len(), 1);
            assert!(p.position().x < 60.0 && p.position().y < 30.0);
        }
    }

    #[test]
    fn resize_to_zero_is_rejected() {
        let mut surface = RasterSurface::new(100, 100).unwrap();
        let mut system = ParticleSystem::new(small_params(), 3, &mut surface).unwrap();
        assert!(matches!(
            system.resize(0, 30, &mut surface),
            Err(EngineError::InvalidDimensions)
        ));
    }

    /// A raster surface whose read-back can be switched off.
    struct FlakySurface {
        inner: RasterSurface,
        fail_reads: bool,
    }

    impl Surface for FlakySurface {
        fn width(&self) -> usize {
            self.inner.width()
        }

        fn height(&self) -> usize {
            self.inner.height()
        }

        fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
            self.inner.resize(width, height)
        }

        fn clear(&mut self) {
            self.inner.clear();
        }

        fn begin_path(&mut self) {
            self.inner.begin_path();
        }

        fn move_to(&mut self, p: DVec2) {
            self.inner.move_to(p);
        }

        fn line_to(&mut self, p: DVec2) {
            self.inner.line_to(p);
        }

        fn stroke(&mut self, color: Srgb, line_width: f64) {
            self.inner.stroke(color, line_width);
        }

        fn fill_text(
            &mut self,
            text: &str,
            center: DVec2,
            font_size: f64,
            max_width: f64,
            paint: &Paint,
        ) {
            self.inner.fill_text(text, center, font_size, max_width, paint);
        }

        fn read_pixels(
            &mut self,
            x: usize,
            y: usize,
            width: usize,
            height: usize,
        ) -> Result<PixelBuffer, EngineError> {
            if self.fail_reads {
                return Err(EngineError::Surface("read-back unavailable".into()));
            }
            self.inner.read_pixels(x, y, width, height)
        }
    }

    #[test]
    fn failed_resize_keeps_previous_state() {
        let mut surface = FlakySurface {
            inner: RasterSurface::new(100, 100).unwrap(),
            fail_reads: false,
        };
        let params = FlowFieldParams {
            number_of_particles: 10,
            strategy: FieldKind::Image,
            ..FlowFieldParams::default()
        };
        let mut system = ParticleSystem::new(params, 4, &mut surface).unwrap();
        let field = system.field().clone();
        let particles = system.particles().to_vec();

        surface.fail_reads = true;
        assert!(matches!(
            system.resize(60, 40, &mut surface),
            Err(EngineError::Surface(_))
        ));
        assert_eq!((surface.width(), surface.height()), (100, 100));
        assert_eq!((system.width(), system.height()), (100, 100));
        assert_eq!(system.field(), &field);
        assert_eq!(system.particles(), particles.as_slice());
    }

    #[test]
    fn toggle_debug_only_flips_the_flag() {
        let mut surface = RasterSurface::new(50, 50).unwrap();
        let mut system = ParticleSystem::new(small_params(), 3, &mut surface).unwrap();
        let particles = system.particles().to_vec();
        system.toggle_debug();
        assert!(system.debug());
        assert_eq!(system.particles(), particles.as_slice());
        system.toggle_debug();
        assert!(!system.debug());
    }

    #[test]
    fn debug_render_draws_grid_lines() {
        let mut surface = RasterSurface::new(50, 50).unwrap();
        let params = FlowFieldParams {
            number_of_particles: 1,
            cell_size: 10,
            text: " ".to_string(),
            ..FlowFieldParams::default()
        };
        let mut system = ParticleSystem::new(params, 3, &mut surface).unwrap();
        system.toggle_debug();
        surface.clear();
        system.render(&mut surface).unwrap();
        // Vertical line at x = 10 covers the pixel column straddling it.
        let snap = surface.snapshot();
        let alpha = |x: usize, y: usize| snap.data()[(y * 50 + x) * 4 + 3];
        assert!(alpha(10, 25) > 0 || alpha(9, 25) > 0);
        assert_eq!(alpha(15, 35), 0);
    }

    #[test]
    fn snap_and_unconditional_presets_run() {
        let mut surface = RasterSurface::new(64, 64).unwrap();
        let params = FlowFieldParams {
            number_of_particles: 20,
            steering: Steering::Snap,
            respawn: Respawn::Unconditional,
            strategy: FieldKind::Noise,
            ..FlowFieldParams::default()
        };
        let mut system = ParticleSystem::new(params, 8, &mut surface).unwrap();
        run(&mut system, &mut surface, 100);
        assert!(system.particles().iter().all(|p| p.position().is_finite()));
    }

    #[test]
    fn param_schema_lists_every_key() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        let system = ParticleSystem::new(small_params(), 1, &mut surface).unwrap();
        let schema = system.param_schema();
        for key in system.params().as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "missing {key}");
        }
    }
}
