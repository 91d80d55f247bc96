use std::sync::Arc;

use log::{
    debug,
    error,
    info,
};

use crate::{
    catalog::{
        Catalog,
        CatalogLoader,
        CategorySelection,
    },
    config::{
        EngineConfig,
        PlaybackConfig,
        Settings,
    },
    core::{
        tasks::{
            TaskManager,
            TaskResult,
        },
        CardKey,
        FlashcardError,
        FlashcardItem,
        Language,
    },
    playback::{
        AutoplayTimer,
        Sequencer,
    },
    prefetch::{
        HttpImageLoader,
        ImageLoader,
        ImageState,
        PrefetchManager,
    },
    quiz::{
        AnswerFeedback,
        QuizMode,
        QuizRound,
    },
    speech::{
        SpeechCoordinator,
        SpeechEngine,
        SpeechOutcome,
        SpeechPhase,
    },
};

pub mod input;

pub use input::{
    Key,
    Navigation,
};

/// External capabilities a session drives.
pub struct Services {
    pub catalog: Arc<CatalogLoader>,
    pub speech: Arc<dyn SpeechEngine>,
    pub images: Arc<dyn ImageLoader>,
}

impl Services {
    /// HTTP catalog with the on-disk cache and an HTTP image loader that keeps image bytes.
    /// Speech is platform supplied.
    pub fn http(
        config: &EngineConfig,
        speech: Arc<dyn SpeechEngine>,
    ) -> Result<Self, FlashcardError> {
        Ok(Self {
            catalog: Arc::new(CatalogLoader::from_config(config)?),
            speech,
            images: Arc::new(HttpImageLoader::new()?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub card: CardKey,
    pub word: Option<String>, // None while the word is hidden
    pub image_url: String,
    pub image_ready: bool,
    pub category: String,
    pub position: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Failed { message: String },
    Empty,
    Card(CardView),
}

/// One row of the category sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub path: String,
    pub label: String,
    pub count: usize,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    CatalogLoaded { cards: usize },
    CatalogFailed { message: String },
    CardChanged { position: usize, card: CardKey },
    ViewEmpty,
    SpeechStarted { text: String },
    SpeechFinished { outcome: SpeechOutcome },
    ImageReady { url: String },
    ImageFailed { url: String },
    QuizAnswered(AnswerFeedback),
    QuizFeedbackCleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading,
    Failed(String),
}

/// The flashcard engine as seen by a UI shell.
///
/// All state changes happen on the thread that calls into the session. Async work reports
/// back through the [`TaskManager`], and nothing is applied until [`Session::update`] runs.
pub struct Session {
    tasks: TaskManager,
    catalog_loader: Arc<CatalogLoader>,
    catalog: Option<Catalog>,
    load_state: LoadState,
    selection: CategorySelection,
    playback: PlaybackConfig,
    engine: EngineConfig,
    sequencer: Sequencer,
    autoplay: AutoplayTimer,
    speech: SpeechCoordinator,
    prefetch: PrefetchManager,
    quiz: QuizMode,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(settings: &Settings, services: Services, tasks: TaskManager) -> Self {
        let playback = settings.playback.clone();
        let engine = settings.engine.clone();

        Self {
            tasks,
            catalog_loader: services.catalog,
            catalog: None,
            load_state: LoadState::Idle,
            selection: CategorySelection::all(),
            autoplay: AutoplayTimer::new(playback.autoplay_enabled, playback.interval_seconds),
            speech: SpeechCoordinator::new(services.speech, &engine, playback.speech_enabled),
            prefetch: PrefetchManager::new(services.images, &engine),
            quiz: QuizMode::new(&engine),
            sequencer: Sequencer::new(),
            playback,
            engine,
            events: Vec::new(),
        }
    }

    /// Seeds shuffling and quiz option order.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.sequencer = Sequencer::with_seed(seed);
        self.quiz = QuizMode::with_seed(&self.engine, seed.wrapping_add(1));
        self
    }

    pub fn load_catalog(&mut self) {
        if self.load_state == LoadState::Loading {
            return;
        }

        info!("[Session] Loading catalog");
        self.load_state = LoadState::Loading;
        self.tasks.load_catalog(Arc::clone(&self.catalog_loader));
    }

    /// Applies every finished async result. Call once per UI frame.
    pub fn update(&mut self) {
        let task_results = self.tasks.poll_results();

        for result in task_results {
            self.handle_task_result(result);
        }
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn handle_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::CatalogLoaded(result) => match result {
                Ok(catalog) => self.install_catalog(catalog),
                Err(e) => {
                    error!("[Session] Failed to load catalog: {}", e);
                    let message = e.to_string();
                    self.load_state = LoadState::Failed(message.clone());
                    self.events.push(SessionEvent::CatalogFailed { message });
                }
            },

            TaskResult::AutoplayTick { generation } => {
                if !self.autoplay.accept_tick(generation) {
                    debug!("[Autoplay] Dropping stale tick {}", generation);
                    return;
                }
                if self.sequencer.move_by(1).is_some() {
                    self.after_position_change(false);
                }
            }

            TaskResult::SpeechSettled { generation } => {
                if let Some(text) = self.speech.on_settled(&self.tasks, generation) {
                    self.events.push(SessionEvent::SpeechStarted { text });
                }
            }

            TaskResult::SpeechFinished { generation, outcome } => {
                if let Some(outcome) = self.speech.on_finished(generation, outcome) {
                    self.events.push(SessionEvent::SpeechFinished { outcome });
                }
            }

            TaskResult::ImageLoaded { url, result } => {
                let event = match self.prefetch.on_loaded(&url, result) {
                    ImageState::Failed => SessionEvent::ImageFailed { url },
                    _ => SessionEvent::ImageReady { url },
                };
                self.events.push(event);
            }

            TaskResult::QuizFeedbackElapsed { generation } => {
                if let Some(feedback) = self.quiz.on_feedback_elapsed(generation) {
                    self.events.push(SessionEvent::QuizFeedbackCleared);
                    if feedback == AnswerFeedback::Correct {
                        self.navigate(Navigation::Next);
                    }
                }
            }
        }
    }

    fn install_catalog(&mut self, catalog: Catalog) {
        info!("[Session] Catalog ready with {} cards", catalog.len());

        let known: Vec<String> = self
            .selection
            .paths()
            .filter(|path| catalog.category(path).is_some())
            .map(str::to_string)
            .collect();
        self.selection = CategorySelection::from_paths(known);

        self.events.push(SessionEvent::CatalogLoaded { cards: catalog.len() });
        self.catalog = Some(catalog);
        self.load_state = LoadState::Idle;

        let random_order = self.playback.random_order || self.quiz.is_active();
        self.sequencer.replace_items(self.filtered_items(), random_order);
        self.after_position_change(true);
    }

    fn filtered_items(&self) -> Vec<Arc<FlashcardItem>> {
        match &self.catalog {
            Some(catalog) => catalog.filter_by(&self.selection),
            None => Vec::new(),
        }
    }

    /// Re-derives the ordered view; the position always restarts at the first card.
    ///
    /// A running quiz always walks a shuffled deck.
    fn rebuild_view(&mut self) {
        let random_order = self.playback.random_order || self.quiz.is_active();
        self.sequencer.recompute(self.filtered_items(), random_order);
        debug!("[Session] View rebuilt with {} cards", self.sequencer.len());
        self.after_position_change(true);
    }

    /// Fans a new position out to speech, prefetch, quiz and (unless the timer itself
    /// moved) the autoplay countdown.
    fn after_position_change(&mut self, rearm_autoplay: bool) {
        let Some(item) = self.sequencer.current().cloned() else {
            self.enter_empty_view();
            return;
        };

        let language = self.playback.language;
        let position = self.sequencer.position();

        self.events.push(SessionEvent::CardChanged { position, card: item.id.clone() });
        self.speech.on_position_change(&self.tasks, item.word(language), language);
        self.prefetch.refresh(&self.tasks, self.sequencer.items(), position);
        self.quiz.rebuild(self.sequencer.items(), position, language);

        if rearm_autoplay {
            self.arm_autoplay();
        }
    }

    fn enter_empty_view(&mut self) {
        self.speech.cancel();
        self.autoplay.disarm();
        self.quiz.rebuild(&[], 0, self.playback.language);
        self.events.push(SessionEvent::ViewEmpty);
    }

    fn arm_autoplay(&mut self) {
        let has_items = !self.sequencer.is_empty() && !self.quiz.is_active();
        self.autoplay.arm(&self.tasks, has_items);
    }

    pub fn current_item(&self) -> Option<&Arc<FlashcardItem>> {
        self.sequencer.current()
    }

    pub fn position(&self) -> usize {
        self.sequencer.position()
    }

    /// Number of cards in the current view.
    pub fn view_len(&self) -> usize {
        self.sequencer.len()
    }

    pub fn current_view(&self) -> ViewState {
        if self.catalog.is_none() {
            return match &self.load_state {
                LoadState::Failed(message) => ViewState::Failed { message: message.clone() },
                _ => ViewState::Loading,
            };
        }

        let Some(item) = self.sequencer.current() else {
            return ViewState::Empty;
        };

        let language = self.playback.language;
        ViewState::Card(CardView {
            card: item.id.clone(),
            word: (!self.playback.word_hidden).then(|| item.word(language).to_string()),
            image_url: item.image_url.clone(),
            image_ready: self.prefetch.is_loaded(&item.image_url),
            category: item.category.clone(),
            position: self.sequencer.position(),
            len: self.sequencer.len(),
        })
    }

    /// Returns the new position, or `None` when there is nothing to navigate.
    pub fn navigate(&mut self, navigation: Navigation) -> Option<usize> {
        let position = match navigation {
            Navigation::Next => self.sequencer.move_by(1),
            Navigation::Previous => self.sequencer.move_by(-1),
            Navigation::Absolute(index) => self.sequencer.move_to(index),
        }?;

        self.after_position_change(true);
        Some(position)
    }

    /// Keyboard navigation; ignored while autoplay is on.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if self.autoplay.is_enabled() {
            return false;
        }

        match Navigation::from_key(key) {
            Some(navigation) => self.navigate(navigation).is_some(),
            None => false,
        }
    }

    pub fn set_category_selection<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selection = CategorySelection::from_paths(paths);
        if selection != self.selection {
            self.selection = selection;
            self.rebuild_view();
        }
    }

    /// Sidebar click on `path`.
    pub fn toggle_category(&mut self, path: &str) {
        let mut selection = self.selection.clone();
        selection.toggle(path);

        if selection != self.selection {
            self.selection = selection;
            self.rebuild_view();
        }
    }

    pub fn category_entries(&self, language: Language) -> Vec<CategoryEntry> {
        let Some(catalog) = &self.catalog else {
            return Vec::new();
        };

        catalog
            .categories()
            .iter()
            .map(|descriptor| CategoryEntry {
                path: descriptor.path.clone(),
                label: descriptor.display_name(language).to_string(),
                count: catalog.count_in(&descriptor.path),
                selected: if descriptor.is_all() {
                    self.selection.is_all()
                } else {
                    self.selection.contains(&descriptor.path)
                },
            })
            .collect()
    }

    pub fn set_autoplay(&mut self, enabled: bool, interval_seconds: u32) {
        let changed =
            self.autoplay.set_enabled(enabled) | self.autoplay.set_interval(interval_seconds);
        self.playback.autoplay_enabled = self.autoplay.is_enabled();
        self.playback.interval_seconds = self.autoplay.interval_seconds();

        if changed {
            self.arm_autoplay();
        }
    }

    /// Nudges the interval by `delta` seconds. `None` while autoplay is off.
    pub fn adjust_interval(&mut self, delta: i64) -> Option<u32> {
        let before = self.autoplay.interval_seconds();
        let seconds = self.autoplay.adjust_interval(delta)?;
        self.playback.interval_seconds = seconds;

        if seconds != before {
            self.arm_autoplay();
        }
        Some(seconds)
    }

    pub fn set_random_order(&mut self, enabled: bool) {
        if self.playback.random_order == enabled {
            return;
        }
        self.playback.random_order = enabled;
        self.rebuild_view();
    }

    /// Switches the display and speech language. The card on screen is not spoken again.
    pub fn set_language(&mut self, language: Language) {
        if self.playback.language == language {
            return;
        }
        self.playback.language = language;
        self.quiz.rebuild(self.sequencer.items(), self.sequencer.position(), language);
    }

    /// Enabling speaks the current card; disabling cancels anything queued or playing.
    pub fn set_speech_enabled(&mut self, enabled: bool) {
        if self.playback.speech_enabled == enabled {
            return;
        }
        self.playback.speech_enabled = enabled;
        self.speech.set_enabled(enabled);

        if enabled {
            let language = self.playback.language;
            if let Some(item) = self.sequencer.current() {
                self.speech.on_position_change(&self.tasks, item.word(language), language);
            }
        }
    }

    pub fn set_word_hidden(&mut self, hidden: bool) {
        self.playback.word_hidden = hidden;
    }

    pub fn retry_failed_images(&mut self) -> usize {
        self.prefetch.retry_failed(&self.tasks)
    }

    /// Starts a quiz over a freshly shuffled deck of the current selection.
    pub fn start_quiz(&mut self) {
        if self.quiz.is_active() {
            return;
        }
        let language = self.playback.language;
        self.quiz.start(self.sequencer.items(), self.sequencer.position(), language);
        self.rebuild_view();
    }

    /// Ends the quiz and restores the configured card order.
    pub fn stop_quiz(&mut self) {
        if !self.quiz.is_active() {
            return;
        }
        self.quiz.stop();
        self.rebuild_view();
    }

    pub fn submit_answer(&mut self, choice: &str) -> Option<AnswerFeedback> {
        let feedback = self.quiz.submit(&self.tasks, choice)?;
        self.events.push(SessionEvent::QuizAnswered(feedback));
        Some(feedback)
    }

    pub fn quiz_round(&self) -> Option<&QuizRound> {
        self.quiz.round()
    }

    pub fn quiz_feedback(&self) -> Option<AnswerFeedback> {
        self.quiz.feedback()
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn selection(&self) -> &CategorySelection {
        &self.selection
    }

    pub fn playback(&self) -> &PlaybackConfig {
        &self.playback
    }

    /// Current settings, for the shell to persist.
    pub fn settings(&self) -> Settings {
        Settings { playback: self.playback.clone(), engine: self.engine.clone() }
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn speech_phase(&self) -> &SpeechPhase {
        self.speech.phase()
    }

    pub fn is_autoplay_armed(&self) -> bool {
        self.autoplay.is_armed()
    }

    pub fn image_state(&self, url: &str) -> Option<ImageState> {
        self.prefetch.state(url)
    }

    /// Downloaded bytes for a loaded image, if the image loader keeps them.
    pub fn image_bytes(&self, url: &str) -> Option<Arc<[u8]>> {
        self.prefetch.image_bytes(url)
    }

    /// Stops every timer and utterance. The session stays usable afterwards.
    pub fn shutdown(&mut self) {
        self.autoplay.disarm();
        self.speech.cancel();
        self.quiz.cancel();
        debug!("[Session] Shut down");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
