use std::{
    sync::Arc,
    time::Duration,
};

use log::{
    debug,
    warn,
};

use super::{
    select_voice,
    SpeechEngine,
    SpeechOutcome,
    Utterance,
};
use crate::{
    config::EngineConfig,
    core::{
        tasks::{
            CancellableTask,
            TaskHandle,
            TaskManager,
            TaskResult,
        },
        Language,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechPhase {
    Idle,
    Settling { text: String, language: Language },
    Speaking { text: String },
}

/// Serializes utterances so that at most one is ever in flight.
///
/// Every position change bumps `generation`; settle and completion messages carrying an
/// older generation are dropped, so a late callback can never revive a cancelled utterance.
pub struct SpeechCoordinator {
    engine: Arc<dyn SpeechEngine>,
    enabled: bool,
    generation: u64,
    phase: SpeechPhase,
    pending: Option<TaskHandle>, // settle timer, then completion tracker
    settle_delay: Duration,
    timeout: Duration,
}

impl SpeechCoordinator {
    pub fn new(engine: Arc<dyn SpeechEngine>, config: &EngineConfig, enabled: bool) -> Self {
        Self {
            engine,
            enabled,
            generation: 0,
            phase: SpeechPhase::Idle,
            pending: None,
            settle_delay: config.speech_settle_delay(),
            timeout: config.speech_timeout(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn phase(&self) -> &SpeechPhase {
        &self.phase
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self.phase, SpeechPhase::Speaking { .. })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancels whatever is in flight and queues `word` behind the settle delay.
    ///
    /// Returns whether an utterance was queued.
    pub fn on_position_change(
        &mut self,
        tasks: &TaskManager,
        word: &str,
        language: Language,
    ) -> bool {
        if !self.enabled || word.trim().is_empty() {
            return false;
        }

        self.abort_pending();
        self.engine.cancel_all();
        self.generation += 1;

        self.phase = SpeechPhase::Settling { text: word.to_string(), language };
        self.pending = Some(tasks.schedule(
            CancellableTask::SpeechSettle,
            self.settle_delay,
            TaskResult::SpeechSettled { generation: self.generation },
        ));

        debug!("[Speech] Queued '{}' (generation {})", word, self.generation);
        true
    }

    /// Starts the queued utterance once its settle delay has elapsed.
    ///
    /// Returns the text handed to the engine, or `None` for a superseded message.
    pub fn on_settled(&mut self, tasks: &TaskManager, generation: u64) -> Option<String> {
        if generation != self.generation {
            debug!("[Speech] Dropping stale settle for generation {}", generation);
            return None;
        }

        let (text, language) = match &self.phase {
            SpeechPhase::Settling { text, language } => (text.clone(), *language),
            _ => return None,
        };

        let voice = select_voice(&self.engine.voices(), language);
        if voice.is_none() {
            debug!("[Speech] No {} voice available yet, using engine default", language.bcp47());
        }

        let completion = self.engine.speak(Utterance::new(&text, language, voice));
        self.pending = Some(tasks.track_speech(generation, completion, self.timeout));
        self.phase = SpeechPhase::Speaking { text: text.clone() };

        Some(text)
    }

    /// Applies a completion report. Stale reports are ignored and return `None`.
    pub fn on_finished(
        &mut self,
        generation: u64,
        outcome: SpeechOutcome,
    ) -> Option<SpeechOutcome> {
        if generation != self.generation || !self.is_speaking() {
            debug!("[Speech] Ignoring completion for generation {}", generation);
            return None;
        }

        self.pending = None;
        self.phase = SpeechPhase::Idle;

        match &outcome {
            SpeechOutcome::Ended | SpeechOutcome::Interrupted => {
                debug!("[Speech] Utterance {:?}", outcome);
            }
            SpeechOutcome::Failed(reason) => {
                warn!("[Speech] Utterance failed: {}", reason);
            }
            SpeechOutcome::TimedOut => {
                warn!("[Speech] Utterance exceeded {:?}, cancelling", self.timeout);
                self.engine.cancel_all();
            }
        }

        Some(outcome)
    }

    /// Drops any queued or active utterance.
    pub fn cancel(&mut self) {
        self.abort_pending();
        self.generation += 1;

        if self.phase != SpeechPhase::Idle {
            self.engine.cancel_all();
            self.phase = SpeechPhase::Idle;
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.cancel();
        }
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.cancel();
        }
    }
}
