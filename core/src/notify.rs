use core::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Outbound game-over signals consumed by the presentation layer.
///
/// Both hooks default to doing nothing so implementors can subscribe to a
/// single event.
pub trait GameNotifier: Send + Sync {
    fn on_won(&self) {}
    fn on_lost(&self) {}
}

/// Delay before the lost notification fires, leaving the final board a
/// moment to render before any blocking dialog.
pub const LOST_NOTIFY_DELAY: Duration = Duration::from_millis(10);

/// Engine-held handle to an optional notifier. Ignored by equality checks
/// and skipped during serialization.
#[derive(Clone, Default)]
pub(crate) struct NotifierHandle(Option<Arc<dyn GameNotifier>>);

impl NotifierHandle {
    pub(crate) fn set(&mut self, notifier: Arc<dyn GameNotifier>) {
        self.0 = Some(notifier);
    }

    pub(crate) fn notify_won(&self) {
        if let Some(notifier) = &self.0 {
            notifier.on_won();
        }
    }

    /// Fire-and-forget one-shot timer. There is no cancellation: a game
    /// reset inside the delay window may still observe the stale
    /// notification.
    pub(crate) fn notify_lost(&self) {
        if let Some(notifier) = &self.0 {
            let notifier = Arc::clone(notifier);
            thread::spawn(move || {
                thread::sleep(LOST_NOTIFY_DELAY);
                notifier.on_lost();
            });
        }
    }
}

impl fmt::Debug for NotifierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NotifierHandle")
            .field(&self.0.is_some())
            .finish()
    }
}

impl PartialEq for NotifierHandle {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}
