//! Best-score persistence
//!
//! A single scalar, read at startup and written only when a finished run
//! beats it. Storage failures are absorbed silently: the score keeps its
//! in-memory value and the game plays on.

use serde::{Deserialize, Serialize};

/// Persistence collaborator for the best score
pub trait ScoreStore {
    /// Previously saved best score, 0 when absent or unreadable
    fn load_best(&self) -> u32;
    /// Persist a new best score
    fn save_best(&self, score: u32);
}

/// Envelope kept in storage
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct BestScore {
    score: u32,
}

/// LocalStorage key
#[allow(dead_code)]
const STORAGE_KEY: &str = "snail_run_best_score";

/// LocalStorage-backed store (no-op off wasm)
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalScoreStore;

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalScoreStore {
    fn load_best(&self) -> u32 {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        let Some(storage) = storage else {
            log::warn!("LocalStorage unavailable, best score starts at 0");
            return 0;
        };

        match storage.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<BestScore>(&raw)
                .map(|b| b.score)
                .ok()
                // Accept a bare integer left behind by older builds
                .or_else(|| raw.trim().parse().ok())
                .unwrap_or(0),
            _ => 0,
        }
    }

    fn save_best(&self, score: u32) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        let Some(storage) = storage else {
            log::warn!("LocalStorage unavailable, best score not saved");
            return;
        };

        if let Ok(json) = serde_json::to_string(&BestScore { score }) {
            if storage.set_item(STORAGE_KEY, &json).is_err() {
                log::warn!("failed to save best score");
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ScoreStore for LocalScoreStore {
    fn load_best(&self) -> u32 {
        0
    }

    fn save_best(&self, _score: u32) {}
}

/// Stores are plain collaborators; sharing one is fine
impl<T: ScoreStore + ?Sized> ScoreStore for std::rc::Rc<T> {
    fn load_best(&self) -> u32 {
        (**self).load_best()
    }

    fn save_best(&self, score: u32) {
        (**self).save_best(score)
    }
}

/// In-memory store for native runs and tests
#[derive(Debug, Default)]
pub struct MemoryScoreStore(std::cell::Cell<u32>);

impl MemoryScoreStore {
    pub fn with_best(score: u32) -> Self {
        Self(std::cell::Cell::new(score))
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_best(&self) -> u32 {
        self.0.get()
    }

    fn save_best(&self, score: u32) {
        self.0.set(score);
    }
}
