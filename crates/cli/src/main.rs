#![deny(unsafe_code)]
//! Headless CLI for the flowfield renderer.
//!
//! Subcommands:
//! - `render <preset>`: run the animation loop N frames, write the last frame as PNG
//! - `frames <preset>`: write every k-th frame as numbered PNGs
//! - `field <preset>`: write the steering-angle grid as PNG
//! - `list`: print available presets and palettes

mod error;
mod scene;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use error::CliError;
use flowfield_core::{Engine, Palette, RasterSurface, Seed, Srgb, Surface};
use flowfield_engines::snapshot::{write_field_png, write_png};
use flowfield_engines::EngineKind;
use scene::SceneArgs;
use serde_json::json;

/// Frames run when neither `--frames` nor the scene file says otherwise.
const DEFAULT_FRAMES: usize = 200;

#[derive(Parser)]
#[command(name = "flowfield", about = "Flow-field particle renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the animation loop headless and write the final frame as PNG.
    Render {
        #[command(flatten)]
        scene: SceneArgs,

        /// Number of frames (clear + render) to run.
        #[arg(short, long)]
        frames: Option<usize>,

        /// Background the transparent surface is flattened onto.
        #[arg(long, default_value = "#000000")]
        background: String,

        /// Draw the debug overlay (grid and reference text).
        #[arg(long)]
        debug: bool,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// Run the animation loop and write every k-th frame as a numbered PNG.
    Frames {
        #[command(flatten)]
        scene: SceneArgs,

        /// Number of frames (clear + render) to run.
        #[arg(short, long)]
        frames: Option<usize>,

        /// Write one frame out of every `every`.
        #[arg(long, default_value_t = 10)]
        every: usize,

        /// Background the transparent surface is flattened onto.
        #[arg(long, default_value = "#000000")]
        background: String,

        /// Directory for frame_NNNNN.png files.
        #[arg(long, default_value = "frames")]
        out_dir: PathBuf,
    },
    /// Write the flow field as PNG, one pixel per cell, angle mapped to color.
    Field {
        #[command(flatten)]
        scene: SceneArgs,

        /// Palette the angles are mapped through.
        #[arg(long, default_value = "vapor")]
        field_palette: String,

        /// Output file path.
        #[arg(short, long, default_value = "field.png")]
        output: PathBuf,
    },
    /// List available presets and palettes.
    List,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_color(hex: &str) -> Result<Srgb, CliError> {
    Srgb::from_hex(hex).map_err(|e| CliError::Input(format!("invalid --background: {e}")))
}

fn build(seed: &Seed) -> Result<(EngineKind, RasterSurface), CliError> {
    let mut surface = RasterSurface::new(seed.width, seed.height)?;
    let engine = EngineKind::from_name(
        &seed.preset,
        seed.width,
        seed.height,
        seed.seed,
        &seed.params,
        &mut surface,
    )?;
    Ok((engine, surface))
}

fn frame_count(flag: Option<usize>, seed: &Seed) -> usize {
    match (flag, seed.frames) {
        (Some(n), _) => n,
        (None, 0) => DEFAULT_FRAMES,
        (None, n) => n,
    }
}

/// One tick of the host loop: clear, then render.
fn tick(engine: &mut EngineKind, surface: &mut RasterSurface) -> Result<(), CliError> {
    surface.clear();
    engine.render(surface)?;
    Ok(())
}

fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{index:05}.png"))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let presets = EngineKind::list_presets();
            let palettes = Palette::list_names();
            if cli.json {
                let info = json!({
                    "presets": presets,
                    "palettes": palettes,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Presets:");
                for &name in presets {
                    println!("  {name:<8} {}", EngineKind::describe(name).unwrap_or(""));
                }
                println!("Palettes:");
                println!("  {}", palettes.join(", "));
            }
        }
        Command::Render {
            scene,
            frames,
            background,
            debug,
            output,
        } => {
            let seed = scene.resolve()?;
            let background = parse_color(&background)?;
            let frames = frame_count(frames, &seed);
            let (mut engine, mut surface) = build(&seed)?;
            if debug {
                engine.toggle_debug();
            }

            (0..frames).try_for_each(|_| tick(&mut engine, &mut surface))?;
            write_png(&surface.snapshot(), &output, background)?;

            if cli.json {
                let info = json!({
                    "preset": engine.preset_name(),
                    "width": seed.width,
                    "height": seed.height,
                    "frames": frames,
                    "seed": seed.seed,
                    "params": engine.params(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({}x{}, {frames} frames, seed {}) -> {}",
                    engine.preset_name(),
                    seed.width,
                    seed.height,
                    seed.seed,
                    output.display()
                );
            }
        }
        Command::Frames {
            scene,
            frames,
            every,
            background,
            out_dir,
        } => {
            if every == 0 {
                return Err(CliError::Input("--every must be at least 1".into()));
            }
            let seed = scene.resolve()?;
            let background = parse_color(&background)?;
            let frames = frame_count(frames, &seed);
            let (mut engine, mut surface) = build(&seed)?;
            std::fs::create_dir_all(&out_dir)?;

            let mut written = Vec::new();
            for i in 1..=frames {
                tick(&mut engine, &mut surface)?;
                if i % every == 0 {
                    let path = frame_path(&out_dir, i);
                    write_png(&surface.snapshot(), &path, background)?;
                    written.push(path.display().to_string());
                }
            }
            tracing::info!(count = written.len(), dir = %out_dir.display(), "frames written");

            if cli.json {
                let info = json!({
                    "preset": engine.preset_name(),
                    "frames": frames,
                    "every": every,
                    "seed": seed.seed,
                    "files": written,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "wrote {} frames of {} to {}",
                    written.len(),
                    engine.preset_name(),
                    out_dir.display()
                );
            }
        }
        Command::Field {
            scene,
            field_palette,
            output,
        } => {
            let seed = scene.resolve()?;
            let palette =
                Palette::from_name(&field_palette).map_err(|e| CliError::Input(e.to_string()))?;
            let (engine, _surface) = build(&seed)?;
            let field = engine.system().field();
            write_field_png(field, &palette, &output)?;

            if cli.json {
                let info = json!({
                    "preset": engine.preset_name(),
                    "rows": field.rows(),
                    "cols": field.cols(),
                    "cell_size": field.cell_size(),
                    "valid_cells": field.valid_count(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "field {}x{} ({} valid cells) -> {}",
                    field.cols(),
                    field.rows(),
                    field.valid_count(),
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
