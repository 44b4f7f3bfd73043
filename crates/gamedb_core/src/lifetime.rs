//! Cancellation scopes for asynchronous database operations.

use core::future::Future;
use tokio_util::sync::CancellationToken;

/// A caller-supplied cancellation scope.
///
/// Every suspending operation in the database (category acquisition, category
/// initialization, provider loads) receives a `Lifetime`. When the scope is
/// terminated, in-flight work stops at its next suspension point.
///
/// Child scopes are terminated together with their parent, but terminating a
/// child leaves the parent running.
///
/// # Example
///
/// ```
/// use gamedb_core::Lifetime;
///
/// let lifetime = Lifetime::new();
/// let child = lifetime.child();
///
/// lifetime.terminate();
/// assert!(child.is_terminated());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Lifetime {
    token: CancellationToken,
}

impl Lifetime {
    /// Creates a new, live scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope that ends when this one ends.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Ends the scope and all of its children.
    pub fn terminate(&self) {
        self.token.cancel();
    }

    /// Returns whether the scope has ended.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the scope has ended.
    pub async fn terminated(&self) {
        self.token.cancelled().await;
    }

    /// Runs `future` until it completes or the scope ends.
    ///
    /// Returns `None` if the scope ended first. The future is dropped at that
    /// point, so it must not leave shared state half-written.
    pub async fn run<F: Future>(&self, future: F) -> Option<F::Output> {
        if self.is_terminated() {
            return None;
        }
        tokio::select! {
            biased;
            () = self.token.cancelled() => None,
            output = future => Some(output),
        }
    }

    /// Returns the underlying token for integration with other tokio-based code.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl From<CancellationToken> for Lifetime {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}
