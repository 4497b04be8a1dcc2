//! Route parameter source for the playlist view

use std::sync::{Arc, Mutex, MutexGuard};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Parameters of the active route. `playlist_id` is `None` on routes
/// that don't carry one.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RouteParams {
    pub playlist_id: Option<String>,
}

impl RouteParams {
    pub fn playlist(playlist_id: impl Into<String>) -> Self {
        Self {
            playlist_id: Some(playlist_id.into()),
        }
    }

    /// The playlist id, if present and non-empty
    pub fn playlist_id(&self) -> Option<&str> {
        self.playlist_id.as_deref().filter(|id| !id.is_empty())
    }
}

pub type RouteStream = UnboundedReceiver<RouteParams>;

#[derive(Default)]
struct RouterInner {
    current: Option<RouteParams>,
    subscribers: Vec<UnboundedSender<RouteParams>>,
}

/// Holds the current route and fans every navigation out to subscribers,
/// in order and without coalescing.
#[derive(Clone, Default)]
pub struct Router {
    inner: Arc<Mutex<RouterInner>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RouterInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn navigate(&self, params: RouteParams) {
        tracing::debug!(playlist_id = ?params.playlist_id, "Navigating");
        let mut inner = self.lock();
        inner
            .subscribers
            .retain(|tx| tx.unbounded_send(params.clone()).is_ok());
        inner.current = Some(params);
    }

    pub fn navigate_to_playlist(&self, playlist_id: &str) {
        self.navigate(RouteParams::playlist(playlist_id));
    }

    pub fn current(&self) -> Option<RouteParams> {
        self.lock().current.clone()
    }

    /// Stream of route params: the current route first (if any), then every
    /// later navigation. Ends only when the router is dropped.
    pub fn params(&self) -> RouteStream {
        let (tx, rx) = mpsc::unbounded();
        let mut inner = self.lock();
        if let Some(current) = &inner.current {
            let _ = tx.unbounded_send(current.clone());
        }
        inner.subscribers.push(tx);
        rx
    }
}
