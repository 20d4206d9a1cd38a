//! Ordered "try each until one works" cascades.
//!
//! Resize, clipboard access and signal delivery all degrade through a fixed
//! list of strategies. Each strategy is a lazy future, so nothing runs until
//! the cascade reaches it, and the first success stops the walk.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

/// One strategy: yields `Some(value)` on success, `None` to fall through.
pub type Attempt<'a, T> = Pin<Box<dyn Future<Output = Option<T>> + Send + 'a>>;

/// A named strategy in a cascade.
pub struct Strategy<'a, T> {
    pub name: &'static str,
    attempt: Attempt<'a, T>,
}

impl<'a, T> Strategy<'a, T> {
    pub fn new<F>(name: &'static str, attempt: F) -> Self
    where
        F: Future<Output = Option<T>> + Send + 'a,
    {
        Self {
            name,
            attempt: Box::pin(attempt),
        }
    }
}

impl<'a> Strategy<'a, ()> {
    /// Wrap a boolean-reporting operation.
    pub fn flag<F>(name: &'static str, attempt: F) -> Self
    where
        F: Future<Output = bool> + Send + 'a,
    {
        Self::new(name, async move { attempt.await.then_some(()) })
    }
}

/// Result of running a cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeOutcome<T> {
    /// The named strategy succeeded with this value.
    Succeeded { strategy: &'static str, value: T },
    /// Every strategy was tried and none succeeded.
    Exhausted,
}

impl<T> CascadeOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, CascadeOutcome::Succeeded { .. })
    }

    pub fn value(self) -> Option<T> {
        match self {
            CascadeOutcome::Succeeded { value, .. } => Some(value),
            CascadeOutcome::Exhausted => None,
        }
    }

    pub fn strategy(&self) -> Option<&'static str> {
        match self {
            CascadeOutcome::Succeeded { strategy, .. } => Some(strategy),
            CascadeOutcome::Exhausted => None,
        }
    }
}

/// Run `strategies` in order, stopping at the first success.
pub async fn first_success<T>(cascade: &str, strategies: Vec<Strategy<'_, T>>) -> CascadeOutcome<T> {
    for strategy in strategies {
        if let Some(value) = strategy.attempt.await {
            debug!(cascade, strategy = strategy.name, "strategy succeeded");
            return CascadeOutcome::Succeeded {
                strategy: strategy.name,
                value,
            };
        }
        debug!(cascade, strategy = strategy.name, "strategy failed");
    }
    debug!(cascade, "all strategies exhausted");
    CascadeOutcome::Exhausted
}
