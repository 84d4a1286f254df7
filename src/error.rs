//! Planner errors.
//!
//! Ordinary "this strategy found nothing" outcomes are not errors; they are
//! `Option`/`bool` returns and the caller simply moves on to the next
//! strategy. The variants below are reserved for conditions that make
//! further planning meaningless.

pub type PlannerResult<T, E = PlannerError> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// The degenerate no-type-restrictions path was re-entered with the same
    /// pattern more times than the configured limit allows.
    #[error("infinite loop detected: pattern with no type restrictions replanned {0} times")]
    InfiniteLoop(u32),

    /// A defined term reappeared after it had already been expanded once.
    #[error("recursive definition of {0} cannot be expanded")]
    RecursiveDefinition(String),

    #[error("internal error: {0}")]
    Internal(String),
}
