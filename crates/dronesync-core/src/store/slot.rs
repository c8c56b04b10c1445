// ── Publication slot ──
//
// External visibility of one peripheral model. A slot is either empty
// (unpublished) or holds the latest model snapshot. Every publish,
// update and unpublish is one notification to subscribers.

use std::sync::Arc;

use tokio::sync::watch;

/// Reactive holder for one published peripheral model.
///
/// `publish` and `unpublish` are idempotent: repeating them has no
/// observable effect and sends no notification.
pub struct PublicationSlot<T: Send + Sync + 'static> {
    current: watch::Sender<Option<Arc<T>>>,

    /// Notification counter, bumped on every observable change.
    notifications: watch::Sender<u64>,
}

impl<T: Send + Sync + 'static> Default for PublicationSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> PublicationSlot<T> {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        let (notifications, _) = watch::channel(0u64);
        Self {
            current,
            notifications,
        }
    }

    /// Make `model` visible. Returns `false` (and does nothing) if the
    /// slot is already published.
    pub fn publish(&self, model: T) -> bool {
        if self.is_published() {
            return false;
        }
        self.set(Some(Arc::new(model)));
        true
    }

    /// Replace the visible model. Returns `false` if unpublished.
    pub fn update(&self, model: T) -> bool {
        if !self.is_published() {
            return false;
        }
        self.set(Some(Arc::new(model)));
        true
    }

    /// Remove the model from visibility. Returns `false` if already
    /// unpublished.
    pub fn unpublish(&self) -> bool {
        if !self.is_published() {
            return false;
        }
        self.set(None);
        true
    }

    pub fn is_published(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Current model, if published (cheap `Arc` clone).
    pub fn current(&self) -> Option<Arc<T>> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<T>>> {
        self.current.subscribe()
    }

    /// Number of notifications sent since creation.
    pub fn notification_count(&self) -> u64 {
        *self.notifications.borrow()
    }

    fn set(&self, value: Option<Arc<T>>) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.current.send_modify(|slot| *slot = value);
        self.notifications.send_modify(|n| *n += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn publish_twice_is_one_notification() {
        let slot = PublicationSlot::new();
        assert!(slot.publish(1));
        assert!(!slot.publish(2));
        assert_eq!(slot.notification_count(), 1);
        assert_eq!(*slot.current().unwrap(), 1);
    }

    #[test]
    fn unpublish_twice_is_one_notification() {
        let slot = PublicationSlot::new();
        slot.publish("m");
        assert!(slot.unpublish());
        assert!(!slot.unpublish());
        assert_eq!(slot.notification_count(), 2);
        assert!(slot.current().is_none());
    }

    #[test]
    fn unpublish_on_fresh_slot_is_a_no_op() {
        let slot: PublicationSlot<u8> = PublicationSlot::new();
        assert!(!slot.unpublish());
        assert_eq!(slot.notification_count(), 0);
    }

    #[test]
    fn update_requires_publication() {
        let slot = PublicationSlot::new();
        assert!(!slot.update(5));
        assert!(slot.current().is_none());
        slot.publish(5);
        assert!(slot.update(7));
        assert_eq!(*slot.current().unwrap(), 7);
        assert_eq!(slot.notification_count(), 2);
    }

    #[test]
    fn subscribers_see_the_latest_value() {
        let slot = PublicationSlot::new();
        let rx = slot.subscribe();
        slot.publish(3);
        assert_eq!(rx.borrow().as_deref(), Some(&3));
    }
}
