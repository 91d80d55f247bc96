use std::{
    sync::{
        mpsc,
        Arc,
    },
    time::Duration,
};

use chrono::Utc;
use futures::future::BoxFuture;
use tokio::{
    runtime::{
        Handle,
        Runtime,
    },
    time::{
        self,
        MissedTickBehavior,
    },
};

use super::{
    CancellableTask,
    TaskHandle,
    TaskResult,
};
use crate::{
    catalog::CatalogLoader,
    core::FlashcardError,
    prefetch::ImageLoader,
    speech::{
        SpeechError,
        SpeechOutcome,
    },
};

/// Runs every suspension point of the engine (timers, speech completion, image and
/// catalog loads) on a tokio runtime and hands the outcomes back as [`TaskResult`]s.
///
/// Nothing spawned here touches engine state directly: results are only applied when
/// the owner drains them with [`TaskManager::poll_results`].
pub struct TaskManager {
    runtime: Handle,
    _owned_runtime: Option<Arc<Runtime>>,
    receiver: mpsc::Receiver<TaskResult>,
    sender: mpsc::Sender<TaskResult>,
}

impl TaskManager {
    /// Creates a manager with its own multi-threaded runtime.
    ///
    /// Must not be called (or dropped) from inside another runtime's async context.
    pub fn new() -> Result<Self, FlashcardError> {
        let runtime = Arc::new(Runtime::new()?);
        let handle = runtime.handle().clone();
        Ok(Self::build(handle, Some(runtime)))
    }

    /// Spawns onto an existing runtime instead of owning one.
    pub fn with_handle(handle: Handle) -> Self {
        Self::build(handle, None)
    }

    /// Spawns onto the runtime the caller is currently running in.
    pub fn current() -> Result<Self, FlashcardError> {
        let handle = Handle::try_current()
            .map_err(|e| FlashcardError::Custom(format!("No tokio runtime available: {e}")))?;
        Ok(Self::with_handle(handle))
    }

    fn build(runtime: Handle, owned: Option<Arc<Runtime>>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { runtime, _owned_runtime: owned, receiver, sender }
    }

    pub fn poll_results(&mut self) -> Vec<TaskResult> {
        let mut results = Vec::new();

        while let Ok(result) = self.receiver.try_recv() {
            results.push(result);
        }

        results
    }

    fn task_context(&self) -> (mpsc::Sender<TaskResult>, Handle) {
        (self.sender.clone(), self.runtime.clone())
    }

    /// Delivers `result` once `delay` has elapsed, unless cancelled first.
    pub fn schedule(
        &self,
        kind: CancellableTask,
        delay: Duration,
        result: TaskResult,
    ) -> TaskHandle {
        let (sender, runtime) = self.task_context();

        let task = runtime.spawn(async move {
            time::sleep(delay).await;
            let _ = sender.send(result);
        });

        TaskHandle::new(kind, task.abort_handle())
    }

    /// Emits an [`TaskResult::AutoplayTick`] every `period` until cancelled.
    ///
    /// Ticks are measured from the first deadline, so slow draining never shifts later ticks.
    pub fn start_autoplay(&self, generation: u64, period: Duration) -> TaskHandle {
        let (sender, runtime) = self.task_context();

        let task = runtime.spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if sender.send(TaskResult::AutoplayTick { generation }).is_err() {
                    break;
                }
            }
        });

        TaskHandle::new(CancellableTask::AutoplayTimer, task.abort_handle())
    }

    /// Waits for an utterance that has already been handed to the speech engine.
    pub fn track_speech(
        &self,
        generation: u64,
        completion: BoxFuture<'static, Result<(), SpeechError>>,
        ceiling: Duration,
    ) -> TaskHandle {
        let (sender, runtime) = self.task_context();

        let task = runtime.spawn(async move {
            let outcome = match time::timeout(ceiling, completion).await {
                Ok(result) => SpeechOutcome::from_result(result),
                Err(_) => SpeechOutcome::TimedOut,
            };
            let _ = sender.send(TaskResult::SpeechFinished { generation, outcome });
        });

        TaskHandle::new(CancellableTask::SpeechTracker, task.abort_handle())
    }

    pub fn load_image(&self, loader: &Arc<dyn ImageLoader>, url: String) {
        let (sender, runtime) = self.task_context();
        let load = loader.load(&url);

        runtime.spawn(async move {
            let result = load.await;
            let _ = sender.send(TaskResult::ImageLoaded { url, result });
        });
    }

    pub fn load_catalog(&self, loader: Arc<CatalogLoader>) {
        let (sender, runtime) = self.task_context();

        runtime.spawn(async move {
            let result = loader.load_at(Utc::now()).await;
            let _ = sender.send(TaskResult::CatalogLoaded(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_schedule_delivers_after_delay() {
        let mut tasks = TaskManager::current().unwrap();
        let _handle = tasks.schedule(
            CancellableTask::SpeechSettle,
            Duration::from_millis(50),
            TaskResult::SpeechSettled { generation: 7 },
        );

        time::sleep(Duration::from_millis(20)).await;
        assert!(tasks.poll_results().is_empty());

        time::sleep(Duration::from_millis(40)).await;
        let results = tasks.poll_results();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], TaskResult::SpeechSettled { generation: 7 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_schedule_never_delivers() {
        let mut tasks = TaskManager::current().unwrap();
        let handle = tasks.schedule(
            CancellableTask::QuizFeedback,
            Duration::from_millis(50),
            TaskResult::QuizFeedbackElapsed { generation: 1 },
        );
        handle.cancel();

        time::sleep(Duration::from_millis(100)).await;
        assert!(tasks.poll_results().is_empty());
        assert!(handle.is_finished());
        assert_eq!(handle.kind(), CancellableTask::QuizFeedback);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_ticks_until_cancelled() {
        let mut tasks = TaskManager::current().unwrap();
        let handle = tasks.start_autoplay(3, Duration::from_secs(1));

        time::sleep(Duration::from_millis(3500)).await;
        let ticks = tasks.poll_results();
        assert_eq!(ticks.len(), 3);
        assert!(ticks.iter().all(|t| matches!(t, TaskResult::AutoplayTick { generation: 3 })));

        handle.cancel();
        time::sleep(Duration::from_secs(5)).await;
        assert!(tasks.poll_results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_track_speech_times_out() {
        let mut tasks = TaskManager::current().unwrap();
        let never: BoxFuture<'static, Result<(), SpeechError>> =
            Box::pin(futures::future::pending());
        let _handle = tasks.track_speech(2, never, Duration::from_secs(3));

        time::sleep(Duration::from_millis(3100)).await;
        let results = tasks.poll_results();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            TaskResult::SpeechFinished { generation: 2, outcome: SpeechOutcome::TimedOut }
        ));
    }
}
