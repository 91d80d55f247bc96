use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::core::Language;

pub mod coordinator;

pub use coordinator::{
    SpeechCoordinator,
    SpeechPhase,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub locale: String, // BCP 47 tag as reported by the engine, e.g. "ko-KR"
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub voice: Option<Voice>, // None lets the engine pick its default voice
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Utterance {
    pub fn new(text: &str, language: Language, voice: Option<Voice>) -> Self {
        Self {
            text: text.to_string(),
            lang: language.bcp47().to_string(),
            voice,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    /// Raised by the engine when our own `cancel_all` cut the utterance short.
    #[error("Utterance interrupted")]
    Interrupted,

    #[error("Speech engine error: {0}")]
    Engine(String),
}

/// Platform text-to-speech capability.
///
/// `speak` must start the utterance before returning; the returned future only waits for
/// it to end. Voices may be empty until the platform has finished loading them.
pub trait SpeechEngine: Send + Sync {
    fn voices(&self) -> Vec<Voice>;
    fn speak(&self, utterance: Utterance) -> BoxFuture<'static, Result<(), SpeechError>>;
    fn cancel_all(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    Ended,
    Interrupted,
    Failed(String),
    TimedOut,
}

impl SpeechOutcome {
    pub fn from_result(result: Result<(), SpeechError>) -> Self {
        match result {
            Ok(()) => SpeechOutcome::Ended,
            Err(SpeechError::Interrupted) => SpeechOutcome::Interrupted,
            Err(SpeechError::Engine(reason)) => SpeechOutcome::Failed(reason),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SpeechOutcome::Failed(_) | SpeechOutcome::TimedOut)
    }
}

/// Picks a voice whose locale belongs to `language`, preferring the platform default.
pub fn select_voice(voices: &[Voice], language: Language) -> Option<Voice> {
    let prefix = language.locale_prefix();
    let mut matching = voices.iter().filter(|voice| {
        let locale = voice.locale.to_lowercase();
        match locale.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('-') || rest.starts_with('_'),
            None => false,
        }
    });

    let first = matching.next()?;
    if first.is_default {
        return Some(first.clone());
    }
    Some(matching.find(|voice| voice.is_default).unwrap_or(first).clone())
}

/// Rough speaking time for a word: one second per five characters, rounded up.
pub fn estimated_duration(text: &str) -> Duration {
    let chars = text.chars().count() as u64;
    Duration::from_secs(chars.div_ceil(5))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, locale: &str, is_default: bool) -> Voice {
        Voice { name: name.into(), locale: locale.into(), is_default }
    }

    #[test]
    fn test_select_voice_by_locale() {
        let voices = vec![
            voice("Samantha", "en-US", true),
            voice("Yuna", "ko-KR", false),
            voice("Sora", "ko_KR", false),
            voice("Kona", "kok-IN", false),
        ];

        assert_eq!(select_voice(&voices, Language::Kor).unwrap().name, "Yuna");
        assert_eq!(select_voice(&voices, Language::Eng).unwrap().name, "Samantha");

        let kok_only = vec![voice("Kona", "kok-IN", true)];
        assert_eq!(select_voice(&kok_only, Language::Kor), None);
    }

    #[test]
    fn test_select_voice_prefers_default_and_falls_back() {
        let voices = vec![voice("Daniel", "en-GB", false), voice("Alex", "en-US", true)];
        assert_eq!(select_voice(&voices, Language::Eng).unwrap().name, "Alex");

        assert_eq!(select_voice(&[], Language::Kor), None);
    }

    #[test]
    fn test_outcome_classification() {
        assert_eq!(SpeechOutcome::from_result(Ok(())), SpeechOutcome::Ended);
        assert_eq!(
            SpeechOutcome::from_result(Err(SpeechError::Interrupted)),
            SpeechOutcome::Interrupted
        );
        assert!(!SpeechOutcome::Interrupted.is_failure());
        assert!(SpeechOutcome::TimedOut.is_failure());
        assert!(SpeechOutcome::from_result(Err(SpeechError::Engine("busy".into()))).is_failure());
    }

    #[test]
    fn test_estimated_duration() {
        assert_eq!(estimated_duration(""), Duration::ZERO);
        assert_eq!(estimated_duration("Cat"), Duration::from_secs(1));
        assert_eq!(estimated_duration("Strawberry"), Duration::from_secs(2));
        assert_eq!(estimated_duration("고양이"), Duration::from_secs(1));
    }

    #[test]
    fn test_utterance_defaults() {
        let utterance = Utterance::new("사과", Language::Kor, None);
        assert_eq!(utterance.lang, "ko-KR");
        assert_eq!(utterance.rate, 1.0);
        assert_eq!(utterance.volume, 1.0);
    }
}
