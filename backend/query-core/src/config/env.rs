//! `.env` discovery.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

/// Result of attempting to load a .env file.
#[derive(Debug)]
pub struct EnvLoadResult {
    /// Path to loaded .env file, if found.
    pub path: Option<PathBuf>,
    /// Whether any .env file was loaded.
    pub loaded: bool,
}

/// Loads .env from the current directory, then from the executable directory.
///
/// A missing file is not an error; variables already in the environment win.
pub fn load_dotenv() -> EnvLoadResult {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {:?}", path);
        return EnvLoadResult {
            path: Some(path),
            loaded: true,
        };
    }

    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let env_path = exe_dir.join(".env");
        if env_path.exists() {
            return load_dotenv_from(&env_path);
        }
    }

    debug!("No .env file found - using existing environment variables");
    EnvLoadResult {
        path: None,
        loaded: false,
    }
}

/// Loads an explicit .env file.
pub fn load_dotenv_from(env_path: &Path) -> EnvLoadResult {
    match dotenvy::from_path(env_path) {
        Ok(()) => {
            info!("Loaded .env from: {:?}", env_path);
            EnvLoadResult {
                path: Some(env_path.to_path_buf()),
                loaded: true,
            }
        }
        Err(e) => {
            warn!("Failed to load .env at {:?}: {}", env_path, e);
            EnvLoadResult {
                path: None,
                loaded: false,
            }
        }
    }
}
