//! Error type shared by the game interface and the search core.

use thiserror::Error;

/// Errors surfaced by games and by the search.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MctsError {
    /// An action was applied to a position where it is not legal.
    #[error("illegal move {action} in position:\n{position}")]
    IllegalMove {
        /// Debug rendering of the rejected action.
        action: String,
        /// Rendering of the position it was applied to.
        position: String,
    },

    /// A non-terminal position offered no legal actions.
    #[error("non-terminal position has no legal actions:\n{position}")]
    NoLegalActions {
        /// Rendering of the offending position.
        position: String,
    },

    /// The round-robin fallback of a fully expanded state node found every
    /// tried action already visited more than once.
    #[error("state node {node} cannot be expanded: least visited action has {min_visits} visits")]
    ExpansionInvariant {
        /// Arena index of the state node.
        node: u32,
        /// Smallest visit count among its actions.
        min_visits: u32,
    },

    /// A board or search parameter is out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// What was wrong.
        message: String,
    },
}

/// Convenience alias for results carrying [`MctsError`].
pub type Result<T> = std::result::Result<T, MctsError>;
