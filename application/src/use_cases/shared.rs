//! Shared utilities for use cases.

use crate::use_cases::coordinate::CoordinationError;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(CoordinationError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(
    token: &Option<CancellationToken>,
) -> Result<(), CoordinationError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(CoordinationError::Cancelled);
    }
    Ok(())
}
