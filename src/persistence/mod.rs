//! High-score persistence
//!
//! A single-field JSON record, `{ "highscore": <int> }`, read at startup
//! and rewritten whenever the score beats it. Loading tolerates a missing
//! or corrupt file (the score degrades to 0); saving is best-effort and
//! never fails the session.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct SaveFile {
    #[serde(default)]
    highscore: u32,
}

/// Default save location: `$HOME/.block_buster_save.json`
pub fn default_save_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".block_buster_save.json")
}

/// Read the persisted high score from `path`.
///
/// Missing file, unreadable content, or malformed data all degrade to 0;
/// only a present-but-unparsable file is worth a warning.
pub fn load_high_score(path: &Path) -> u32 {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        // Missing file is the normal first-run case
        Err(_) => return 0,
    };
    match serde_json::from_str::<SaveFile>(&contents) {
        Ok(save) => {
            log::info!("loaded high score {} from {}", save.highscore, path.display());
            save.highscore
        }
        Err(err) => {
            log::warn!("corrupt save file {}: {}", path.display(), err);
            0
        }
    }
}

/// Best-effort write of the high score to `path`. Failures are logged and
/// swallowed.
pub fn save_high_score(path: &Path, high_score: u32) {
    let save = SaveFile {
        highscore: high_score,
    };
    if let Ok(json) = serde_json::to_string(&save) {
        if let Err(err) = fs::write(path, json) {
            log::warn!("could not save high score to {}: {}", path.display(), err);
        }
    }
}
