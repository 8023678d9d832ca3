//! Handle for background maintenance tasks (cache reset timer).

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Owns a spawned background task and its stop channel.
///
/// Dropping the handle stops the task; [`TaskHandle::stop`] does the same and
/// waits for it to finish.
#[derive(Debug)]
pub struct TaskHandle {
    inner: Option<JoinHandle<()>>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl TaskHandle {
    /// Wrap a spawned task and the sender half of its stop signal.
    #[must_use]
    pub const fn new(inner: JoinHandle<()>, stop_tx: oneshot::Sender<()>) -> Self {
        Self {
            inner: Some(inner),
            stop_tx: Some(stop_tx),
        }
    }

    /// Signal the task to stop and wait until it has exited.
    pub async fn stop(mut self) {
        self.signal_stop();
        if let Some(h) = self.inner.take() {
            let _ = h.await;
        }
    }

    /// Abort the task without waiting for a graceful exit.
    pub fn abort(mut self) {
        self.shutdown();
    }

    /// Return `true` if the task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.as_ref().is_none_or(JoinHandle::is_finished)
    }

    fn signal_stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            // receiver gone means the task already exited
            let _ = tx.send(());
        }
    }

    fn shutdown(&mut self) {
        self.signal_stop();
        if let Some(h) = self.inner.take()
            && !h.is_finished()
        {
            h.abort();
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
