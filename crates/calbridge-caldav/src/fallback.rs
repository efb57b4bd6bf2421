//! Bounded two-attempt strategies.
//!
//! A [`Fallback`] holds exactly one primary and one alternate value. The
//! alternate is tried at most once, so no strategy here can loop.

use std::future::Future;

use tracing::debug;

use crate::error::CalDavResult;

/// A primary value and the single alternate to use in its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallback<T> {
    pub primary: T,
    pub alternate: T,
}

impl<T: Copy + std::fmt::Debug> Fallback<T> {
    pub const fn new(primary: T, alternate: T) -> Self {
        Self { primary, alternate }
    }

    /// Tries the alternate when the primary attempt finds nothing.
    ///
    /// Errors from either attempt are returned as-is.
    pub async fn first_found<R, F, Fut>(&self, mut attempt: F) -> CalDavResult<Option<R>>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = CalDavResult<Option<R>>>,
    {
        if let Some(found) = attempt(self.primary).await? {
            return Ok(Some(found));
        }
        debug!(primary = ?self.primary, alternate = ?self.alternate, "Nothing found, trying alternate");
        attempt(self.alternate).await
    }

    /// Tries the alternate when the server rejects the primary attempt.
    ///
    /// Only upstream rejections trigger the alternate; transport failures
    /// and parse errors surface immediately. The alternate's outcome is
    /// final.
    pub async fn on_rejection<R, F, Fut>(&self, mut attempt: F) -> CalDavResult<R>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = CalDavResult<R>>,
    {
        match attempt(self.primary).await {
            Err(err) if err.is_upstream_rejection() => {
                debug!(
                    primary = ?self.primary,
                    alternate = ?self.alternate,
                    error = %err,
                    "Primary rejected, trying alternate"
                );
                attempt(self.alternate).await
            }
            other => other,
        }
    }
}
