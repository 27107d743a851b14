//! Toast notifications with scheduled auto-dismiss.
//!
//! The UI shell polls [`ToastService::current`] and renders whatever is
//! there.  Showing a toast schedules a single cancellable dismiss task;
//! showing another toast before the first expires replaces it and cancels
//! the old dismissal, so a toast never dismisses its successor.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// One toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
}

/// Shared toast state.  Cheap to clone; clones share the same slot.
#[derive(Clone)]
pub struct ToastService {
    inner: Arc<ToastInner>,
}

struct ToastInner {
    duration: Duration,
    current: Mutex<Option<Toast>>,
    dismiss: Mutex<Option<JoinHandle<()>>>,
}

impl ToastService {
    /// Creates a service whose toasts auto-dismiss after `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            inner: Arc::new(ToastInner {
                duration,
                current: Mutex::new(None),
                dismiss: Mutex::new(None),
            }),
        }
    }

    /// Shows a toast, replacing any current one and rescheduling dismissal.
    pub fn show(&self, title: impl Into<String>, description: impl Into<String>) {
        let toast = Toast {
            title: title.into(),
            description: description.into(),
        };

        if let Some(task) = self
            .inner
            .dismiss
            .lock()
            .expect("toast lock poisoned")
            .take()
        {
            task.abort();
        }

        *self.inner.current.lock().expect("toast lock poisoned") = Some(toast);

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(inner.duration).await;
            *inner.current.lock().expect("toast lock poisoned") = None;
        });
        *self.inner.dismiss.lock().expect("toast lock poisoned") = Some(task);
    }

    /// Shows one of the fixed copy pairs from `cleaner_core::content`.
    pub fn show_copy(&self, copy: (&str, &str)) {
        self.show(copy.0, copy.1);
    }

    /// The toast currently on screen, if any.
    pub fn current(&self) -> Option<Toast> {
        self.inner
            .current
            .lock()
            .expect("toast lock poisoned")
            .clone()
    }
}

impl Drop for ToastInner {
    fn drop(&mut self) {
        if let Some(task) = self.dismiss.lock().expect("toast lock poisoned").take() {
            task.abort();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(30);

    #[tokio::test]
    async fn test_show_sets_current_toast() {
        // Arrange
        let toasts = ToastService::new(SHORT);

        // Act
        toasts.show("Title", "Description");

        // Assert
        let current = toasts.current().expect("toast must be visible");
        assert_eq!(current.title, "Title");
        assert_eq!(current.description, "Description");
    }

    #[tokio::test]
    async fn test_toast_auto_dismisses_after_duration() {
        // Arrange
        let toasts = ToastService::new(SHORT);
        toasts.show("Title", "Description");

        // Act
        tokio::time::sleep(SHORT * 3).await;

        // Assert
        assert!(toasts.current().is_none());
    }

    #[tokio::test]
    async fn test_new_toast_replaces_and_outlives_the_old_dismissal() {
        // Arrange
        let toasts = ToastService::new(SHORT * 4);
        toasts.show("first", "one");
        tokio::time::sleep(SHORT * 2).await;

        // Act – replace mid-flight; the first toast's timer must not fire
        toasts.show("second", "two");
        tokio::time::sleep(SHORT * 3).await;

        // Assert – the second toast is still visible at a point where the
        // first one's dismissal would already have fired
        let current = toasts.current().expect("replacement must still show");
        assert_eq!(current.title, "second");
    }

    #[tokio::test]
    async fn test_show_copy_uses_the_pair() {
        let toasts = ToastService::new(SHORT);
        toasts.show_copy(cleaner_core::content::TOAST_DONE);
        assert_eq!(
            toasts.current().expect("visible").title,
            cleaner_core::content::TOAST_DONE.0
        );
    }
}
