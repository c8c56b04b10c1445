// ── Reactive peripheral streams ──
//
// Subscription type for consuming publication changes of one peripheral.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A subscription to one peripheral's publication slot.
///
/// `None` means the peripheral is not published.
pub struct PeripheralStream<T: Send + Sync + 'static> {
    current: Option<Arc<T>>,
    receiver: watch::Receiver<Option<Arc<T>>>,
}

impl<T: Send + Sync + 'static> PeripheralStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Option<Arc<T>>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation time or at the last `changed()`.
    pub fn current(&self) -> Option<&Arc<T>> {
        self.current.as_ref()
    }

    /// Latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Option<Arc<T>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next publication change.
    ///
    /// Returns `None` once the store has been dropped, `Some(None)` when
    /// the peripheral was unpublished.
    pub async fn changed(&mut self) -> Option<Option<Arc<T>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current.clone_from(&snap);
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> PeripheralWatchStream<T> {
        PeripheralWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current publication on first poll, then every change.
pub struct PeripheralWatchStream<T: Send + Sync + 'static> {
    inner: WatchStream<Option<Arc<T>>>,
}

impl<T: Send + Sync + 'static> Stream for PeripheralWatchStream<T> {
    type Item = Option<Arc<T>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
