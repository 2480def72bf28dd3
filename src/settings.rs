//! Host preferences
//!
//! Persisted in LocalStorage on the web. These are preferences only; game
//! state is never saved.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Show the JSON state readout next to the board
    pub show_debug: bool,
    /// Fixed RNG seed for reproducible sessions (time-based when unset)
    pub seed: Option<u64>,
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "bounce_shot_settings";

    /// Environment overrides for native builds
    pub const SEED_ENV: &'static str = "BOUNCE_SHOT_SEED";
    pub const DEBUG_ENV: &'static str = "BOUNCE_SHOT_DEBUG";

    /// Seed to use: the configured one, or `fallback` (usually the clock)
    pub fn seed_or(&self, fallback: u64) -> u64 {
        self.seed.unwrap_or(fallback)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match serde_json::to_string(self) {
                Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                    Ok(()) => log::info!("Settings saved"),
                    Err(e) => log::warn!("Could not save settings: {:?}", e),
                },
                Err(e) => log::warn!("Could not serialize settings: {}", e),
            }
        }
    }

    /// Native: read overrides from the environment
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::from_env_values(
            std::env::var(Self::SEED_ENV).ok().as_deref(),
            std::env::var(Self::DEBUG_ENV).ok().as_deref(),
        )
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }

    /// Build settings from raw override values
    pub fn from_env_values(seed: Option<&str>, debug: Option<&str>) -> Self {
        let seed = seed.and_then(|s| match s.trim().parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                log::warn!("Ignoring non-numeric seed {:?}", s);
                None
            }
        });
        let show_debug = debug.is_some_and(|d| matches!(d.trim(), "1" | "true" | "yes" | "on"));
        Self { show_debug, seed }
    }
}
