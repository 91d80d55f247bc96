use std::{
    path::Path,
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::{
        FlashcardError,
        Language,
    },
    persistence::{
        load_json_or_default,
        load_json_or_default_in,
        save_json,
        save_json_in,
    },
    prefetch::EvictionPolicy,
};

const SETTINGS_FILE: &str = "settings.json";

pub const DEFAULT_CATALOG_URL: &str = "https://sb2chun.github.io/baby-flashcard/flashcards.json";
pub const DEFAULT_CACHE_KEY: &str = "flashcards_data";

/// User-facing playback switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub autoplay_enabled: bool,
    pub interval_seconds: u32,
    pub random_order: bool,
    pub word_hidden: bool,
    pub language: Language,
    pub speech_enabled: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            autoplay_enabled: true,
            interval_seconds: 4,
            random_order: false,
            word_hidden: false,
            language: Language::Kor,
            speech_enabled: false,
        }
    }
}

impl PlaybackConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_seconds.max(1)))
    }
}

/// Tuning knobs for loading, prefetching, speech and quiz timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub catalog_url: String,
    pub cache_key: String,
    pub cache_max_age_secs: i64,
    pub prefetch_radius: usize,
    pub eviction: EvictionPolicy,
    pub speech_settle_ms: u64,
    pub speech_timeout_ms: u64,
    pub quiz_feedback_ms: u64,
    pub quiz_distractors: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            cache_max_age_secs: 60 * 60,
            prefetch_radius: 5,
            eviction: EvictionPolicy::Never,
            speech_settle_ms: 50,
            speech_timeout_ms: 3000,
            quiz_feedback_ms: 1500,
            quiz_distractors: 3,
        }
    }
}

impl EngineConfig {
    pub fn cache_max_age(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_max_age_secs)
    }

    pub fn speech_settle_delay(&self) -> Duration {
        Duration::from_millis(self.speech_settle_ms)
    }

    pub fn speech_timeout(&self) -> Duration {
        Duration::from_millis(self.speech_timeout_ms)
    }

    pub fn quiz_feedback_delay(&self) -> Duration {
        Duration::from_millis(self.quiz_feedback_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackConfig,
    pub engine: EngineConfig,
}

impl Settings {
    pub fn load() -> Self {
        load_json_or_default::<Settings>(SETTINGS_FILE).sanitized()
    }

    pub fn load_from(dir: &Path) -> Self {
        load_json_or_default_in::<Settings>(dir, SETTINGS_FILE).sanitized()
    }

    pub fn save(&self) -> Result<(), FlashcardError> {
        save_json(self, SETTINGS_FILE)
    }

    pub fn save_to(&self, dir: &Path) -> Result<(), FlashcardError> {
        save_json_in(dir, self, SETTINGS_FILE)
    }

    /// Clamps values a hand-edited file could break.
    pub fn sanitized(mut self) -> Self {
        let defaults = EngineConfig::default();

        self.playback.interval_seconds = self.playback.interval_seconds.max(1);
        if self.engine.cache_max_age_secs < 0 {
            self.engine.cache_max_age_secs = 0;
        }
        if self.engine.speech_timeout_ms == 0 {
            self.engine.speech_timeout_ms = defaults.speech_timeout_ms;
        }
        if self.engine.catalog_url.trim().is_empty() {
            self.engine.catalog_url = defaults.catalog_url;
        }
        if self.engine.cache_key.trim().is_empty() {
            self.engine.cache_key = defaults.cache_key;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.playback.autoplay_enabled);
        assert_eq!(settings.playback.interval_seconds, 4);
        assert!(!settings.playback.random_order);
        assert!(!settings.playback.speech_enabled);
        assert_eq!(settings.playback.language, Language::Kor);
        assert_eq!(settings.engine.prefetch_radius, 5);
        assert_eq!(settings.engine.eviction, EvictionPolicy::Never);
        assert_eq!(settings.engine.speech_timeout(), Duration::from_secs(3));
        assert_eq!(settings.engine.cache_max_age(), chrono::Duration::hours(1));
    }

    #[test]
    fn test_partial_file_and_sanitizing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"playback":{"interval_seconds":0,"language":"eng"},
                "engine":{"speech_timeout_ms":0}}"#,
        )
        .unwrap();

        let settings = Settings::load_from(dir.path());
        assert_eq!(settings.playback.interval_seconds, 1);
        assert_eq!(settings.playback.language, Language::Eng);
        assert!(settings.playback.autoplay_enabled);
        assert_eq!(settings.engine.speech_timeout_ms, 3000);
        assert_eq!(settings.engine.catalog_url, DEFAULT_CATALOG_URL);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.playback.random_order = true;
        settings.engine.eviction = EvictionPolicy::OutsideWindow;
        settings.save_to(dir.path()).unwrap();

        assert_eq!(Settings::load_from(dir.path()), settings);
    }
}
