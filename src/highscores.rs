//! Best score persistence
//!
//! A single non-negative integer stored as text under `"highScore"`.

use crate::platform::KeyValueStore;

/// Persisted best score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestScore(pub u64);

impl BestScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "highScore";

    /// Read the best score; absence or any failure yields 0
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(text)) => match Self::parse(&text) {
                Some(best) => {
                    log::info!("Loaded best score {}", best.0);
                    best
                }
                None => {
                    log::warn!("Ignoring unreadable best score {:?}", text);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("No best score found, starting fresh");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read best score: {}", e);
                Self::default()
            }
        }
    }

    /// Parse the stored text form
    pub fn parse(text: &str) -> Option<Self> {
        text.trim().parse::<u64>().ok().map(Self)
    }

    /// Record `score` if it beats the stored best. Returns true when the
    /// best changed; write failures are logged and otherwise ignored.
    pub fn commit(&mut self, store: &dyn KeyValueStore, score: u64) -> bool {
        if score <= self.0 {
            return false;
        }
        self.0 = score;
        match store.set(Self::STORAGE_KEY, &score.to_string()) {
            Ok(()) => log::info!("Best score saved ({})", score),
            Err(e) => log::warn!("Could not save best score: {}", e),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MemoryStore, StorageError};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Read(key.to_string()))
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write(key.to_string()))
        }
    }

    #[test]
    fn test_missing_defaults_to_zero() {
        let store = MemoryStore::new();
        assert_eq!(BestScore::load(&store), BestScore(0));
    }

    #[test]
    fn test_garbage_defaults_to_zero() {
        let store = MemoryStore::new();
        store.set(BestScore::STORAGE_KEY, "not a number").unwrap();
        assert_eq!(BestScore::load(&store), BestScore(0));
        store.set(BestScore::STORAGE_KEY, "-5").unwrap();
        assert_eq!(BestScore::load(&store), BestScore(0));
    }

    #[test]
    fn test_read_failure_defaults_to_zero() {
        assert_eq!(BestScore::load(&BrokenStore), BestScore(0));
    }

    #[test]
    fn test_stored_as_text() {
        let store = MemoryStore::new();
        let mut best = BestScore::load(&store);
        assert!(best.commit(&store, 123));
        assert_eq!(store.get("highScore").unwrap().as_deref(), Some("123"));
    }

    #[test]
    fn test_runs_ten_then_thirty() {
        let store = MemoryStore::new();
        BestScore::load(&store).commit(&store, 10);
        BestScore::load(&store).commit(&store, 30);
        assert_eq!(BestScore::load(&store), BestScore(30));
    }

    #[test]
    fn test_runs_thirty_then_ten() {
        let store = MemoryStore::new();
        BestScore::load(&store).commit(&store, 30);
        assert!(!BestScore::load(&store).commit(&store, 10));
        assert_eq!(BestScore::load(&store), BestScore(30));
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let mut best = BestScore(5);
        assert!(best.commit(&BrokenStore, 9));
        assert_eq!(best, BestScore(9));
    }
}
