use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

pub mod app;

pub use app::{
    run_app, ActionInput, AppError, BlendMode, Camera2D, EngineCore, Flip, ImageDecoder,
    InputAction, Key, KeyBindings, LoopConfig, LoopMetricsSnapshot, PlatformEvent, Renderer,
    Scene, SceneError, SceneWorld, Sprite, SpriteId, SpriteStore, SpriteTexture, StressToggle,
    Texture, TextureCache, TextureError, Vec2, Viewport, WorldSettings, SLOW_FRAME_ENV_VAR,
};

pub const ROOT_ENV_VAR: &str = "KNIGHT_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error(
        "{env_var} is set but does not point to a directory: {path}\n\
Unset it to auto-detect the project root, or point it at the directory holding assets/."
    )]
    InvalidEnvRoot {
        path: PathBuf,
        env_var: &'static str,
    },
}

/// Resolves the directory asset paths are relative to.
///
/// `KNIGHT_ROOT` wins when set. Otherwise the first ancestor of the
/// executable that looks like the project root is used, and failing that
/// the current directory.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let assets_dir = root.join("assets");
    if !assets_dir.is_dir() {
        warn!(assets_dir = %assets_dir.display(), "assets_dir_missing");
    }
    Ok(AppPaths { root, assets_dir })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if normalized.is_dir() {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot {
                    path: normalized,
                    env_var: ROOT_ENV_VAR,
                })
            }
        }
        Err(env::VarError::NotPresent) => {
            let from_exe = env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().and_then(find_root_from));
            match from_exe {
                Some(root) => Ok(root),
                None => env::current_dir()
                    .map(|cwd| normalize_path(&cwd))
                    .map_err(StartupError::CurrentDir),
            }
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn find_root_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
