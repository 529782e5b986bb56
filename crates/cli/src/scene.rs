//! Scene selection shared by every drawing subcommand.
//!
//! A scene comes either from flags or from a `--scene` JSON file holding a
//! [`Seed`]. Either way it resolves to one `Seed`.

use std::path::{Path, PathBuf};

use clap::Args;
use flowfield_core::{Palette, Seed};
use serde_json::Value;

use crate::error::CliError;

#[derive(Args, Debug)]
pub struct SceneArgs {
    /// Preset name (spiral, glyph, noise). Ignored with --scene.
    #[arg(default_value = "glyph")]
    pub preset: String,

    /// Scene file (JSON Seed: preset, width, height, params, seed, frames).
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Surface width in pixels.
    #[arg(short = 'W', long, default_value_t = 500)]
    pub width: usize,

    /// Surface height in pixels.
    #[arg(short = 'H', long, default_value_t = 500)]
    pub height: usize,

    /// PRNG seed for deterministic output.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Stroke palette (white, ocean, neon, earth, monochrome, vapor, fire).
    #[arg(short, long)]
    pub palette: Option<String>,

    /// Parameter overrides as a JSON object string.
    #[arg(long, default_value = "{}")]
    pub params: String,
}

impl SceneArgs {
    /// Builds the scene from the file or the flags. `--palette` applies on
    /// top of either.
    pub fn resolve(&self) -> Result<Seed, CliError> {
        let mut seed = match &self.scene {
            Some(path) => load_scene(path)?,
            None => {
                let params: Value = serde_json::from_str(&self.params)
                    .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
                let mut seed = Seed::new(&self.preset, self.width, self.height, self.seed);
                seed.params = params;
                seed
            }
        };
        seed.validate()?;
        if let Some(name) = &self.palette {
            Palette::from_name(name).map_err(|e| CliError::Input(e.to_string()))?;
            if let Some(obj) = seed.params.as_object_mut() {
                obj.insert("palette".to_string(), Value::String(name.clone()));
            }
        }
        Ok(seed)
    }
}

fn load_scene(path: &Path) -> Result<Seed, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read scene {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid scene {}: {e}", path.display())))
}
