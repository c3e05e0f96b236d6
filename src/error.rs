use thiserror::Error;

use crate::catalog::{GameId, PlayerId};

/// Rejections produced by the fact mutator before anything reaches storage.
///
/// Malformed individual entries are not errors (they are dropped during
/// normalization); these variants cover the failures that abort a whole
/// request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The raw entry list exceeds the configured payload cap.
    #[error("payload has {count} entries, limit is {max}")]
    PayloadTooLarge { count: usize, max: usize },

    /// An entry references a player id missing from the roster.
    #[error("unknown player id {0}")]
    UnknownPlayer(PlayerId),

    /// An entry references a game id missing from the match catalog.
    #[error("unknown game id {0}")]
    UnknownGame(GameId),
}

/// Failures reported by a fact store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or misconfigured; the stored set is intact,
    /// so the caller may retry or fall back to a cached copy.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A replace failed at its commit point, so the on-disk state is
    /// unknown. Reported distinctly because it implies possible data
    /// loss: the caller must re-read and reconcile instead of retrying
    /// blindly.
    #[error("replace not completed, stored facts may be stale: {0}")]
    PartialReplace(String),
}
