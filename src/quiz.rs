use std::{
    collections::HashSet,
    sync::Arc,
    time::Duration,
};

use log::debug;
use rand::{
    rngs::StdRng,
    seq::SliceRandom,
    Rng,
    SeedableRng,
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
        CardKey,
        FlashcardItem,
        Language,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerFeedback {
    Correct,
    Incorrect,
}

/// One multiple-choice question: pick the word for the current card's picture.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizRound {
    card: CardKey,
    answer: String,
    options: Vec<String>,
    language: Language,
}

impl QuizRound {
    /// Distractors come from other cards of the same category whose word differs from the
    /// answer. Fewer than `distractors` are used when the category is small.
    pub fn build<R: Rng + ?Sized>(
        items: &[Arc<FlashcardItem>],
        position: usize,
        language: Language,
        distractors: usize,
        rng: &mut R,
    ) -> Option<Self> {
        let current = items.get(position)?;
        let answer = current.word(language).to_string();

        let mut seen = HashSet::new();
        let mut pool: Vec<String> = items
            .iter()
            .enumerate()
            .filter(|(index, item)| *index != position && item.category == current.category)
            .map(|(_, item)| item.word(language))
            .filter(|word| *word != answer && seen.insert(*word))
            .map(str::to_string)
            .collect();

        pool.shuffle(rng);
        pool.truncate(distractors);

        let mut options = pool;
        options.push(answer.clone());
        options.shuffle(rng);

        Some(Self { card: current.id.clone(), answer, options, language })
    }

    pub fn card(&self) -> &CardKey {
        &self.card
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn check(&self, choice: &str) -> AnswerFeedback {
        if choice == self.answer {
            AnswerFeedback::Correct
        } else {
            AnswerFeedback::Incorrect
        }
    }
}

/// Quiz state owned by the session: the live round and the feedback countdown.
pub struct QuizMode {
    active: bool,
    round: Option<QuizRound>,
    feedback: Option<AnswerFeedback>,
    generation: u64,
    pending: Option<TaskHandle>,
    distractors: usize,
    feedback_delay: Duration,
    rng: StdRng,
}

impl QuizMode {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    pub fn with_seed(config: &EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &EngineConfig, rng: StdRng) -> Self {
        Self {
            active: false,
            round: None,
            feedback: None,
            generation: 0,
            pending: None,
            distractors: config.quiz_distractors,
            feedback_delay: config.quiz_feedback_delay(),
            rng,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn round(&self) -> Option<&QuizRound> {
        self.round.as_ref()
    }

    pub fn feedback(&self) -> Option<AnswerFeedback> {
        self.feedback
    }

    pub fn start(&mut self, items: &[Arc<FlashcardItem>], position: usize, language: Language) {
        self.active = true;
        self.rebuild(items, position, language);
    }

    pub fn stop(&mut self) {
        self.cancel();
        self.active = false;
        self.round = None;
    }

    /// Replaces the round for a new card, view or language. Pending feedback is dropped.
    pub fn rebuild(&mut self, items: &[Arc<FlashcardItem>], position: usize, language: Language) {
        self.cancel();
        if !self.active {
            return;
        }

        self.round = QuizRound::build(items, position, language, self.distractors, &mut self.rng);
        if let Some(round) = &self.round {
            debug!("[Quiz] Round for {} with {} options", round.card, round.options.len());
        }
    }

    /// Grades `choice` and starts the feedback countdown.
    ///
    /// `None` when no round is live or feedback for a previous answer is still showing.
    pub fn submit(&mut self, tasks: &TaskManager, choice: &str) -> Option<AnswerFeedback> {
        if !self.active || self.feedback.is_some() {
            return None;
        }

        let feedback = self.round.as_ref()?.check(choice);
        self.feedback = Some(feedback);
        self.generation += 1;
        self.pending = Some(tasks.schedule(
            CancellableTask::QuizFeedback,
            self.feedback_delay,
            TaskResult::QuizFeedbackElapsed { generation: self.generation },
        ));

        Some(feedback)
    }

    /// Clears the feedback once its countdown ends, returning what was shown.
    pub fn on_feedback_elapsed(&mut self, generation: u64) -> Option<AnswerFeedback> {
        if generation != self.generation {
            return None;
        }

        self.pending = None;
        self.feedback.take()
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.cancel();
        }
        self.generation += 1;
        self.feedback = None;
    }
}
