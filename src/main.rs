//! Scene Tour - first-person walkthrough of a small scene
//!
//! Click the window to capture the pointer, walk with WASD and look with the
//! mouse. Objects under the reticle are highlighted; clicking one opens the
//! inspect view, which the exit key (Escape by default) leaves again.

mod app;
mod config;
mod render;
mod scene;
mod ui;

use clap::Parser;
use config::TourConfig;
use scene::serialization::{self, SerializationError};
use scene::{SceneError, SceneState};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "First-person scene walkthrough")]
struct Args {
    /// JSON file overriding the default tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON scene to tour instead of the seeded cube scatter
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Write the scene that would be toured to this path and exit
    #[arg(long)]
    dump_scene: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("failed to read {path}: {source}")]
    Load {
        path: PathBuf,
        source: SerializationError,
    },
    #[error("failed to write {path}: {source}")]
    Save {
        path: PathBuf,
        source: SerializationError,
    },
    #[error("failed to build scene: {0}")]
    Scene(#[from] SceneError),
    #[error(transparent)]
    App(#[from] app::AppError),
}

fn load_config(args: &Args) -> Result<TourConfig, StartupError> {
    match &args.config {
        Some(path) => TourConfig::load(path).map_err(|source| StartupError::Load {
            path: path.clone(),
            source,
        }),
        None => Ok(TourConfig::default()),
    }
}

fn build_scene(args: &Args, config: &TourConfig) -> Result<SceneState, StartupError> {
    match &args.scene {
        Some(path) => {
            serialization::load_scene_from_file(path).map_err(|source| StartupError::Load {
                path: path.clone(),
                source,
            })
        }
        None => Ok(SceneState::scattered_cubes(
            config.cube_count,
            config.scatter_half_extent,
            config.scene_seed,
        )?),
    }
}

fn start(args: Args) -> Result<(), StartupError> {
    let config = load_config(&args)?;
    config
        .validate()
        .map_err(|err| StartupError::App(app::AppError::Config(err)))?;
    let scene = build_scene(&args, &config)?;

    if let Some(path) = &args.dump_scene {
        serialization::save_scene_to_file(&scene, path).map_err(|source| StartupError::Save {
            path: path.clone(),
            source,
        })?;
        log::info!("Wrote {} objects to {}", scene.objects().len(), path.display());
        return Ok(());
    }

    app::run(config, scene)?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    log::info!("Scene Tour {}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = start(args) {
        log::error!("{}", err);
        std::process::exit(1);
    }

    log::info!("Goodbye!");
}
