use clap::{Parser, Subcommand};
use serde::Serialize;
use stagelight_driver::{spin_angle, Bindings, ControlState, FrameDriver};
use stagelight_render::{DebugTextRenderer, RenderView};
use stagelight_scene::ScenePreset;
use stagelight_tools::SceneInspector;
use tracing_subscriber::EnvFilter;

/// Synthetic frame spacing for headless runs, roughly one vsync at 60 Hz.
const FRAME_STEP_MS: f64 = 16.0;

#[derive(Parser)]
#[command(name = "stagelight-cli", about = "CLI tool for stagelight scene operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info and the available scene presets
    Info,
    /// Drive the frame loop headlessly and sample animation state
    Run {
        /// Number of frames to drive
        #[arg(short, long, default_value = "300")]
        frames: u64,
        /// Phase accumulator step per frame
        #[arg(short, long, default_value = "0.01")]
        speed: f32,
        /// Scene preset to drive
        #[arg(short, long, default_value = "studio")]
        preset: ScenePreset,
        /// Sample every N frames
        #[arg(long, default_value = "60")]
        sample_every: u64,
        /// Emit samples as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a scene summary and its node list
    Inspect {
        /// Scene preset to inspect
        #[arg(short, long, default_value = "studio")]
        preset: ScenePreset,
    },
}

/// One sampled frame of a headless run.
#[derive(Debug, Serialize)]
struct FrameSample {
    frame: u64,
    timestamp_ms: f64,
    phase: f32,
    spin_angle: f32,
    bounce_height: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("stagelight-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("driver: {}", stagelight_driver::crate_info());
            println!("render: {}", stagelight_render::crate_info());
            println!("input: {}", stagelight_input::crate_info());
            println!("tools: {}", stagelight_tools::crate_info());
            println!("presets:");
            for preset in ScenePreset::ALL {
                let built = preset.build();
                let summary = SceneInspector::summary(&built.scene);
                println!("  {:<16} {}", preset.name(), summary);
            }
        }
        Commands::Run {
            frames,
            speed,
            preset,
            sample_every,
            json,
        } => {
            tracing::info!(%preset, frames, speed, "headless run");

            let built = preset.build();
            let bindings = Bindings::from_preset(&built)?;
            let bouncer = bindings.bouncer;
            let mut scene = built.scene;
            let mut driver = FrameDriver::new(bindings);
            let controls = ControlState {
                speed,
                ..ControlState::default()
            };
            let mut renderer = DebugTextRenderer::new();
            let view = RenderView {
                eye: built.eye,
                ..RenderView::default()
            };

            let mut samples = Vec::new();
            let mut last_render = String::new();
            for frame in 0..frames {
                let timestamp = frame as f64 * FRAME_STEP_MS;
                last_render = driver.on_frame(&mut scene, &controls, timestamp, &mut renderer, &view);

                if frame % sample_every.max(1) == 0 || frame + 1 == frames {
                    samples.push(FrameSample {
                        frame,
                        timestamp_ms: timestamp,
                        phase: driver.phase(),
                        spin_angle: spin_angle(timestamp),
                        bounce_height: bouncer
                            .and_then(|id| scene.get(id))
                            .map(|node| node.transform.position.y),
                    });
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&samples)?);
            } else {
                for s in &samples {
                    match s.bounce_height {
                        Some(y) => println!(
                            "frame {:>6}  t={:>8.1}ms  phase={:.3}  spin={:.3}  y={:.3}",
                            s.frame, s.timestamp_ms, s.phase, s.spin_angle, y
                        ),
                        None => println!(
                            "frame {:>6}  t={:>8.1}ms  phase={:.3}  spin={:.3}",
                            s.frame, s.timestamp_ms, s.phase, s.spin_angle
                        ),
                    }
                }
                println!();
                print!("{last_render}");
            }
        }
        Commands::Inspect { preset } => {
            let built = preset.build();
            println!("{}", SceneInspector::summary(&built.scene));
            for id in SceneInspector::list_nodes(&built.scene) {
                if let Some(info) = SceneInspector::inspect_node(&built.scene, id) {
                    println!("  {info}");
                }
            }
        }
    }

    Ok(())
}
