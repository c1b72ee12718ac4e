use crate::data::KeyValueStore;
use crate::models::prefs::Preferences;

const PREFERENCES_KEY: &str = "preferences";

/// Soft-fail: missing or corrupt stored preferences fall back to defaults.
pub fn load(store: &dyn KeyValueStore) -> Preferences {
    let Some(raw) = store.get(PREFERENCES_KEY) else {
        return Preferences::default();
    };
    match serde_json::from_str(&raw) {
        Ok(prefs) => prefs,
        Err(e) => {
            tracing::warn!(error = %e, "corrupt stored preferences, using defaults");
            Preferences::default()
        }
    }
}

pub fn save(store: &dyn KeyValueStore, prefs: &Preferences) {
    match serde_json::to_string(prefs) {
        Ok(json) => store.set(PREFERENCES_KEY, &json),
        Err(e) => tracing::warn!(error = %e, "failed to encode preferences"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryStore;
    use crate::models::prefs::Language;

    #[test]
    fn test_load_defaults_when_absent() {
        let store = MemoryStore::new();
        let prefs = load(&store);
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.language, Language::En);
        assert!(!prefs.dark_mode);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let store = MemoryStore::new();
        let prefs = Preferences {
            language: Language::Hi,
            dark_mode: true,
        };
        save(&store, &prefs);
        assert_eq!(load(&store), prefs);
    }

    #[test]
    fn test_load_defaults_on_corrupt_value() {
        let store = MemoryStore::new();
        store.set(PREFERENCES_KEY, "{broken");
        assert_eq!(load(&store), Preferences::default());
    }
}
