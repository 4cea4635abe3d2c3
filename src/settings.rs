//! Game settings and preferences
//!
//! Persisted separately from the best score in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::TRAIL_OPACITY;
use crate::platform::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Lane and impact cues (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Visual Effects ===
    /// Ghosting composite pass
    pub motion_trail: bool,
    /// Dust puffs behind the car when changing lanes
    pub dust: bool,

    // === HUD ===
    pub show_music_credit: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 1.0,
            sfx_volume: 1.0,
            motion_trail: true,
            dust: true,
            show_music_credit: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "highway_rush_settings";

    /// Effective music gain given the track's base level
    pub fn music_gain(&self, base: f32) -> f32 {
        (base * self.master_volume * self.music_volume).clamp(0.0, 1.0)
    }

    /// Effective cue gain given the cue's base level
    pub fn sfx_gain(&self, base: f32) -> f32 {
        (base * self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Opacity fed to the composite pass
    pub fn trail_opacity(&self) -> f32 {
        if self.motion_trail { TRAIL_OPACITY } else { 1.0 }
    }

    /// Load settings. A missing or malformed entry is replaced with the
    /// defaults so the stored copy always parses.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    return settings;
                }
                Err(e) => log::warn!("Discarding malformed settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => {
                log::warn!("Could not read settings: {}", e);
                return Self::default();
            }
        }

        log::info!("Using default settings");
        let settings = Self::default();
        settings.save(store);
        settings
    }

    /// Save settings (best effort)
    pub fn save(&self, store: &dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Could not save settings: {}", e),
            },
            Err(e) => log::warn!("Could not serialize settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_round_trip_through_store() {
        let store = MemoryStore::new();
        let settings = Settings {
            music_volume: 0.25,
            motion_trail: false,
            ..Default::default()
        };
        settings.save(&store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, r#"{"dust": false}"#).unwrap();
        let settings = Settings::load(&store);
        assert!(!settings.dust);
        assert!(settings.motion_trail);
        assert_eq!(settings.master_volume, 1.0);
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, "{nope").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
        // Repaired in place
        let stored = store.get(Settings::STORAGE_KEY).unwrap().unwrap();
        assert_eq!(serde_json::from_str::<Settings>(&stored).unwrap(), Settings::default());
    }

    #[test]
    fn test_first_load_persists_defaults() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
        assert!(store.get(Settings::STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_gains() {
        let settings = Settings {
            master_volume: 0.5,
            ..Default::default()
        };
        assert!((settings.music_gain(0.4) - 0.2).abs() < 1e-6);
        assert!((settings.sfx_gain(0.7) - 0.35).abs() < 1e-6);
        assert_eq!(settings.trail_opacity(), TRAIL_OPACITY);
    }
}
