//! Cooperative cancellation for background fetches
//!
//! Every logical request slot (the search box, each catalog section) owns a
//! [`RequestSlot`]. Starting a new request cancels the token handed out for
//! the previous one, so a slow earlier response can never overwrite a newer
//! result set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag between the UI thread and one worker
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// True if both handles point at the same request
    pub fn same_request(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

/// Owner of the in-flight request for one slot
#[derive(Debug, Default)]
pub struct RequestSlot {
    current: Option<CancelToken>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede whatever is in flight and return the token for the new request
    pub fn begin(&mut self) -> CancelToken {
        self.cancel();
        let token = CancelToken::new();
        self.current = Some(token.clone());
        token
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    /// Whether a response carrying `token` may still be applied
    pub fn accepts(&self, token: &CancelToken) -> bool {
        !token.is_cancelled()
            && self
                .current
                .as_ref()
                .is_some_and(|current| current.same_request(token))
    }

    /// Mark the request as settled once its response has been applied
    pub fn finish(&mut self, token: &CancelToken) {
        if self.current.as_ref().is_some_and(|current| current.same_request(token)) {
            self.current = None;
        }
    }

    pub fn in_flight(&self) -> bool {
        self.current.is_some()
    }
}
