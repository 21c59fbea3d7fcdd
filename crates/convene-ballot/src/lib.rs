//! Convene Ballot - funding-round consideration dialog
//!
//! A complete reviewer-facing flow built on the navigation core: select a
//! funding round, choose between evaluating new proposals and changing a
//! previous vote, page through the eligible proposals, and record an
//! approve/reject vote with a written reason.
//!
//! Domain data stays behind the [`domain::BallotStore`] collaborator trait;
//! [`domain::MemoryBallotStore`] backs the demo binary and the tests.

pub mod domain;
pub mod screens;

// Re-exports for convenience
pub use domain::{
    BallotStore, DomainError, MemoryBallotStore, ProposalFilter, ProposalId, ProposalRecord,
    RoundId, RoundRecord, VoteChoice, VoteRecord,
};
pub use screens::{consideration_dashboard, ConsiderationScreen, ReviewerGate};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
