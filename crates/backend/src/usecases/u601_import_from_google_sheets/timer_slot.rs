use std::future::Future;
use std::sync::{Mutex, PoisonError};
use tokio::task::JoinHandle;

/// Owner of at most one scheduled background task.
///
/// Re-arming aborts the previous task before the new one is stored, under the
/// same lock, so a slot never leaks a timer. Dropping the slot aborts its task.
#[derive(Default)]
pub struct TimerSlot {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rearm<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = handle.take() {
            previous.abort();
        }
        *handle = Some(tokio::spawn(task));
    }

    pub fn cancel(&self) {
        if let Some(previous) = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            previous.abort();
        }
    }

    /// A task is stored and has not finished
    pub fn is_armed(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        if let Some(handle) = self
            .handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
