//! Typed configuration for the particle system.
//!
//! [`FlowFieldParams::from_json`] reads a JSON object with the `params`
//! helpers, so every missing or mistyped key falls back to its default.
//! Policy names that are present but unknown are rejected, and
//! [`FlowFieldParams::validate`] rejects degenerate numeric values.

use flowfield_core::error::EngineError;
use flowfield_core::field_source::FieldStrategy;
use flowfield_core::params::{
    param_f64, param_range_f64, param_range_usize, param_string, param_string_list, param_usize,
};
use flowfield_core::palette::Palette;
use flowfield_core::reference::{Reference, ReferencePaint};
use serde_json::{json, Value};

pub const DEFAULT_NUMBER_OF_PARTICLES: usize = 2500;
pub const DEFAULT_CELL_SIZE: usize = 5;
pub const DEFAULT_CURVE: f64 = 5.0;
pub const DEFAULT_ZOOM: f64 = 0.07;
pub const DEFAULT_SPEED_RANGE: (usize, usize) = (1, 4);
pub const DEFAULT_TRAIL_RANGE: (usize, usize) = (10, 39);
pub const DEFAULT_CORRECTION_RANGE: (f64, f64) = (0.01, 0.51);
pub const DEFAULT_COLORS: &[&str] = &["#ffffff"];
pub const DEFAULT_NOISE_SCALE: f64 = 0.05;
pub const DEFAULT_RESPAWN_ATTEMPTS: usize = 5;
pub const DEFAULT_LINE_WIDTH: f64 = 1.0;
pub const DEFAULT_TEXT: &str = "JS";
pub const DEFAULT_REFERENCE_PAINT: &str = "halo";

/// Which field generator to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Procedural,
    Image,
    Noise,
}

impl FieldKind {
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "procedural" => Ok(FieldKind::Procedural),
            "image" => Ok(FieldKind::Image),
            "noise" => Ok(FieldKind::Noise),
            other => Err(EngineError::invalid_param(
                "strategy",
                format!("unknown strategy '{other}' (expected procedural, image or noise)"),
            )),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Procedural => "procedural",
            FieldKind::Image => "image",
            FieldKind::Noise => "noise",
        }
    }
}

/// How a particle's heading approaches the sampled field angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steering {
    /// Step by the particle's correction each update, snapping once within one step.
    Smoothed,
    /// Take the field angle immediately.
    Snap,
}

impl Steering {
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "smoothed" => Ok(Steering::Smoothed),
            "snap" => Ok(Steering::Snap),
            other => Err(EngineError::invalid_param(
                "steering",
                format!("unknown steering '{other}' (expected smoothed or snap)"),
            )),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Steering::Smoothed => "smoothed",
            Steering::Snap => "snap",
        }
    }
}

/// Where an expired particle reappears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Respawn {
    /// Try up to `attempts` random cells for one with opacity > 0, then fall
    /// back to a uniform random position.
    BoundedRetry { attempts: usize },
    /// Always a uniform random position.
    Unconditional,
}

impl Respawn {
    pub fn from_name(name: &str, attempts: usize) -> Result<Self, EngineError> {
        match name {
            "bounded_retry" => Ok(Respawn::BoundedRetry { attempts }),
            "unconditional" => Ok(Respawn::Unconditional),
            other => Err(EngineError::invalid_param(
                "respawn",
                format!("unknown respawn '{other}' (expected bounded_retry or unconditional)"),
            )),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Respawn::BoundedRetry { .. } => "bounded_retry",
            Respawn::Unconditional => "unconditional",
        }
    }

    fn attempts(self) -> usize {
        match self {
            Respawn::BoundedRetry { attempts } => attempts,
            Respawn::Unconditional => DEFAULT_RESPAWN_ATTEMPTS,
        }
    }
}

/// All tunables of a [`ParticleSystem`](crate::ParticleSystem).
#[derive(Debug, Clone, PartialEq)]
pub struct FlowFieldParams {
    pub number_of_particles: usize,
    pub cell_size: usize,
    pub curve: f64,
    pub zoom: f64,
    /// Inclusive range the integer speed scale is drawn from.
    pub speed_range: (usize, usize),
    /// Inclusive range the maximum trail length is drawn from.
    pub trail_range: (usize, usize),
    /// Half-open range the smoothing step is drawn from.
    pub correction_range: (f64, f64),
    pub colors: Vec<String>,
    /// Built-in palette name; takes precedence over `colors` when set.
    pub palette: Option<String>,
    pub strategy: FieldKind,
    pub noise_scale: f64,
    pub steering: Steering,
    pub respawn: Respawn,
    pub line_width: f64,
    pub text: String,
    pub reference_paint: String,
}

impl Default for FlowFieldParams {
    fn default() -> Self {
        Self {
            number_of_particles: DEFAULT_NUMBER_OF_PARTICLES,
            cell_size: DEFAULT_CELL_SIZE,
            curve: DEFAULT_CURVE,
            zoom: DEFAULT_ZOOM,
            speed_range: DEFAULT_SPEED_RANGE,
            trail_range: DEFAULT_TRAIL_RANGE,
            correction_range: DEFAULT_CORRECTION_RANGE,
            colors: DEFAULT_COLORS.iter().map(|s| s.to_string()).collect(),
            palette: None,
            strategy: FieldKind::Procedural,
            noise_scale: DEFAULT_NOISE_SCALE,
            steering: Steering::Smoothed,
            respawn: Respawn::BoundedRetry {
                attempts: DEFAULT_RESPAWN_ATTEMPTS,
            },
            line_width: DEFAULT_LINE_WIDTH,
            text: DEFAULT_TEXT.to_string(),
            reference_paint: DEFAULT_REFERENCE_PAINT.to_string(),
        }
    }
}

impl FlowFieldParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    ///
    /// Fails only when a policy name is present but unrecognized.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let d = Self::default();
        let attempts = param_usize(params, "respawn_attempts", d.respawn.attempts());
        Ok(Self {
            number_of_particles: param_usize(params, "number_of_particles", d.number_of_particles),
            cell_size: param_usize(params, "cell_size", d.cell_size),
            curve: param_f64(params, "curve", d.curve),
            zoom: param_f64(params, "zoom", d.zoom),
            speed_range: param_range_usize(params, "speed_range", d.speed_range),
            trail_range: param_range_usize(params, "trail_range", d.trail_range),
            correction_range: param_range_f64(params, "correction_range", d.correction_range),
            colors: param_string_list(params, "colors", DEFAULT_COLORS),
            palette: params
                .get("palette")
                .and_then(Value::as_str)
                .map(String::from),
            strategy: FieldKind::from_name(&param_string(params, "strategy", d.strategy.name()))?,
            noise_scale: param_f64(params, "noise_scale", d.noise_scale),
            steering: Steering::from_name(&param_string(params, "steering", d.steering.name()))?,
            respawn: Respawn::from_name(
                &param_string(params, "respawn", d.respawn.name()),
                attempts,
            )?,
            line_width: param_f64(params, "line_width", d.line_width),
            text: param_string(params, "text", &d.text),
            reference_paint: param_string(params, "reference_paint", &d.reference_paint),
        })
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.cell_size == 0 {
            return Err(EngineError::InvalidCellSize);
        }
        if self.number_of_particles == 0 {
            return Err(EngineError::invalid_param("number_of_particles", "must be at least 1"));
        }
        check_int_range("speed_range", self.speed_range)?;
        check_int_range("trail_range", self.trail_range)?;
        let (lo, hi) = self.correction_range;
        if !(lo.is_finite() && hi.is_finite()) || lo <= 0.0 || hi < lo {
            return Err(EngineError::invalid_param(
                "correction_range",
                format!("expected finite 0 < min <= max, got [{lo}, {hi}]"),
            ));
        }
        let finite = [
            ("curve", self.curve),
            ("zoom", self.zoom),
            ("noise_scale", self.noise_scale),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(EngineError::invalid_param(name, "must be finite"));
            }
        }
        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            return Err(EngineError::invalid_param("line_width", "must be a positive number"));
        }
        self.reference()?;
        self.palette()?;
        Ok(())
    }

    /// The stroke palette: the named built-in if `palette` is set, otherwise
    /// the `colors` list.
    pub fn palette(&self) -> Result<Palette, EngineError> {
        match &self.palette {
            Some(name) => Palette::from_name(name),
            None => Palette::from_hex(&self.colors),
        }
    }

    /// The reference text and its fill.
    pub fn reference(&self) -> Result<Reference, EngineError> {
        let paint = ReferencePaint::from_name(&self.reference_paint).ok_or_else(|| {
            EngineError::invalid_param(
                "reference_paint",
                format!(
                    "unknown paint '{}' (expected sunrise, prism, halo or a hex color)",
                    self.reference_paint
                ),
            )
        })?;
        Ok(Reference::new(self.text.clone(), paint))
    }

    /// The field generator for these params. `seed` feeds the noise strategy.
    pub fn field_strategy(&self, seed: u64) -> Result<FieldStrategy, EngineError> {
        Ok(match self.strategy {
            FieldKind::Procedural => FieldStrategy::Procedural {
                zoom: self.zoom,
                curve: self.curve,
            },
            FieldKind::Noise => FieldStrategy::Noise {
                scale: self.noise_scale,
                seed: (seed ^ (seed >> 32)) as u32,
            },
            FieldKind::Image => FieldStrategy::ImageLuminance(self.reference()?),
        })
    }

    /// Current values as a JSON object, in the shape `from_json` reads.
    pub fn to_json(&self) -> Value {
        let mut v = json!({
            "number_of_particles": self.number_of_particles,
            "cell_size": self.cell_size,
            "curve": self.curve,
            "zoom": self.zoom,
            "speed_range": [self.speed_range.0, self.speed_range.1],
            "trail_range": [self.trail_range.0, self.trail_range.1],
            "correction_range": [self.correction_range.0, self.correction_range.1],
            "colors": self.colors,
            "strategy": self.strategy.name(),
            "noise_scale": self.noise_scale,
            "steering": self.steering.name(),
            "respawn": self.respawn.name(),
            "respawn_attempts": self.respawn.attempts(),
            "line_width": self.line_width,
            "text": self.text,
            "reference_paint": self.reference_paint,
        });
        if let (Some(name), Some(obj)) = (&self.palette, v.as_object_mut()) {
            obj.insert("palette".to_string(), json!(name));
        }
        v
    }

    /// Schema describing every key: type, default, range, description.
    pub fn schema() -> Value {
        json!({
            "number_of_particles": {
                "type": "integer",
                "default": DEFAULT_NUMBER_OF_PARTICLES,
                "min": 1,
                "max": 50000,
                "description": "Size of the particle pool"
            },
            "cell_size": {
                "type": "integer",
                "default": DEFAULT_CELL_SIZE,
                "min": 1,
                "max": 100,
                "description": "Flow-field cell edge in pixels"
            },
            "curve": {
                "type": "number",
                "default": DEFAULT_CURVE,
                "min": -20.0,
                "max": 20.0,
                "description": "Procedural strategy: weight of the sin(row) term"
            },
            "zoom": {
                "type": "number",
                "default": DEFAULT_ZOOM,
                "min": 0.0,
                "max": 1.0,
                "description": "Procedural strategy: spatial frequency"
            },
            "speed_range": {
                "type": "integer_range",
                "default": [DEFAULT_SPEED_RANGE.0, DEFAULT_SPEED_RANGE.1],
                "min": 1,
                "description": "Inclusive range of the per-particle speed scale"
            },
            "trail_range": {
                "type": "integer_range",
                "default": [DEFAULT_TRAIL_RANGE.0, DEFAULT_TRAIL_RANGE.1],
                "min": 1,
                "description": "Inclusive range of the per-particle maximum trail length"
            },
            "correction_range": {
                "type": "number_range",
                "default": [DEFAULT_CORRECTION_RANGE.0, DEFAULT_CORRECTION_RANGE.1],
                "min": 0.0,
                "description": "Range of the per-particle smoothing step in radians"
            },
            "colors": {
                "type": "string_list",
                "default": DEFAULT_COLORS,
                "description": "Hex stroke colors; each particle picks one at creation"
            },
            "palette": {
                "type": "string",
                "enum": Palette::list_names(),
                "description": "Built-in stroke palette, overrides colors"
            },
            "strategy": {
                "type": "string",
                "default": "procedural",
                "enum": ["procedural", "image", "noise"],
                "description": "Flow-field generator"
            },
            "noise_scale": {
                "type": "number",
                "default": DEFAULT_NOISE_SCALE,
                "min": 0.0,
                "max": 1.0,
                "description": "Noise strategy: sampling step per cell"
            },
            "steering": {
                "type": "string",
                "default": "smoothed",
                "enum": ["smoothed", "snap"],
                "description": "How headings approach the field angle"
            },
            "respawn": {
                "type": "string",
                "default": "bounded_retry",
                "enum": ["bounded_retry", "unconditional"],
                "description": "Where expired particles reappear"
            },
            "respawn_attempts": {
                "type": "integer",
                "default": DEFAULT_RESPAWN_ATTEMPTS,
                "min": 0,
                "max": 100,
                "description": "Random cells tried before falling back to a uniform position"
            },
            "line_width": {
                "type": "number",
                "default": DEFAULT_LINE_WIDTH,
                "min": 0.1,
                "max": 10.0,
                "description": "Trail stroke width in pixels"
            },
            "text": {
                "type": "string",
                "default": DEFAULT_TEXT,
                "description": "Reference text for the image strategy and debug overlay"
            },
            "reference_paint": {
                "type": "string",
                "default": DEFAULT_REFERENCE_PAINT,
                "enum": ["sunrise", "prism", "halo"],
                "description": "Reference text fill; a hex color is also accepted"
            }
        })
    }
}

fn check_int_range(name: &str, (lo, hi): (usize, usize)) -> Result<(), EngineError> {
    if lo == 0 || hi < lo {
        return Err(EngineError::invalid_param(
            name,
            format!("expected 1 <= min <= max, got [{lo}, {hi}]"),
        ));
    }
    Ok(())
}
