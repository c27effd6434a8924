use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a cancellable background task (reminder checker, morning brief).
///
/// `stop` cancels the task's token and awaits the task, so shutdown is
/// deterministic: after it returns the loop has observed the cancellation and
/// exited.
pub struct TaskHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub fn new(cancel: CancellationToken, handle: JoinHandle<()>) -> Self {
        Self { cancel, handle }
    }

    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}
