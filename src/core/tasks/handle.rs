use tokio::task::AbortHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancellableTask {
    AutoplayTimer,
    SpeechSettle,
    SpeechTracker,
    QuizFeedback,
}

/// Handle to a spawned timer or tracker. Dropping it does not stop the task.
#[derive(Debug)]
pub struct TaskHandle {
    kind: CancellableTask,
    abort_handle: AbortHandle,
}

impl TaskHandle {
    pub fn new(kind: CancellableTask, abort_handle: AbortHandle) -> Self {
        Self { kind, abort_handle }
    }

    pub fn kind(&self) -> CancellableTask {
        self.kind
    }

    pub fn cancel(&self) {
        self.abort_handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort_handle.is_finished()
    }
}
