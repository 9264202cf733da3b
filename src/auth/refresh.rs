//! Single-flight coordination of access-token refreshes.
//!
//! At most one refresh runs per coordinator. Callers that arrive while it is in
//! flight await the same shared outcome instead of issuing their own exchange.
//! The join-or-start decision is made under a mutex before anything is awaited,
//! so parallel worker threads cannot both start a refresh.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};

use super::error::AuthError;
use super::token::AccessToken;

/// Outcome of one refresh operation, shared by every waiter.
pub type RefreshResult = Result<AccessToken, AuthError>;

type SharedRefresh = Shared<BoxFuture<'static, RefreshResult>>;

struct InFlight {
    id: u64,
    future: SharedRefresh,
}

#[derive(Default)]
struct Slot {
    current: Option<InFlight>,
    started: u64,
}

/// Process-wide (per client) reference to at most one in-flight refresh.
#[derive(Clone, Default)]
pub struct RefreshCoordinator {
    slot: Arc<Mutex<Slot>>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("in_flight", &self.is_refreshing())
            .field("started", &self.started())
            .finish()
    }
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        lock(&self.slot).current.is_some()
    }

    /// Number of refresh operations started over the coordinator's lifetime.
    pub fn started(&self) -> u64 {
        lock(&self.slot).started
    }

    /// Join the in-flight refresh, or start one with `start` if none is running.
    ///
    /// `start` is only invoked when this call becomes the leader. The operation
    /// is spawned onto the runtime, so it runs to completion even if every
    /// waiter is dropped, and the slot is cleared as soon as it settles.
    pub async fn refresh_with<F, Fut>(&self, start: F) -> RefreshResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshResult> + Send + 'static,
    {
        let future = self.join_or_start(start);
        future.await
    }

    fn join_or_start<F, Fut>(&self, start: F) -> SharedRefresh
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshResult> + Send + 'static,
    {
        let mut slot = lock(&self.slot);
        if let Some(in_flight) = slot.current.as_ref() {
            tracing::debug!(refresh_id = in_flight.id, "joining in-flight token refresh");
            return in_flight.future.clone();
        }

        slot.started += 1;
        let id = slot.started;
        tracing::debug!(refresh_id = id, "starting token refresh");

        let operation = start();
        let settled = Arc::clone(&self.slot);
        let handle = tokio::spawn(async move {
            let result = operation.await;
            let mut slot = lock(&settled);
            if slot.current.as_ref().is_some_and(|in_flight| in_flight.id == id) {
                slot.current = None;
            }
            result
        });

        let future = async move {
            handle.await.unwrap_or_else(|err| {
                Err(AuthError::InvalidResponse(format!(
                    "refresh task did not complete: {err}"
                )))
            })
        }
        .boxed()
        .shared();

        slot.current = Some(InFlight {
            id,
            future: future.clone(),
        });
        future
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
