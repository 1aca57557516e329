//! OS-dependent discovery of the local Dolphin save-state file.

use crate::common::config::SLOT_SUFFIX;
use crate::common::errors::SyncError;
use directories::BaseDirs;
use std::path::{Path, PathBuf};

pub fn artifact_file_name(game_id: &str) -> String {
    format!("{game_id}{SLOT_SUFFIX}")
}

/// Full path to the slot-1 save state for `game_id`. An explicit `save_dir`
/// from the config wins over OS discovery.
pub fn save_state_path(game_id: &str, save_dir: Option<&Path>) -> Result<PathBuf, SyncError> {
    let dir = match save_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_save_dir()?,
    };
    Ok(dir.join(artifact_file_name(game_id)))
}

fn default_save_dir() -> Result<PathBuf, SyncError> {
    let base = BaseDirs::new()
        .ok_or_else(|| SyncError::Config("cannot determine the home directory".to_string()))?;

    if cfg!(target_os = "linux") {
        // Flatpak Dolphin layout.
        Ok(base
            .home_dir()
            .join(".var/app/org.DolphinEmu.dolphin-emu/data/dolphin-emu/StateSaves"))
    } else if cfg!(target_os = "windows") {
        Ok(base
            .home_dir()
            .join("Documents")
            .join("Dolphin Emulator")
            .join("StateSaves"))
    } else {
        Err(SyncError::Config(
            "no default save-state location on this OS; set save_dir in the config".to_string(),
        ))
    }
}
