//! Ballot domain records and the collaborator boundary
//!
//! Actions consume domain data through [`BallotStore`] and nothing else.
//! Lookups return plain records; mutations either succeed or fail with a
//! [`DomainError`] the calling action surfaces as a user-visible message.
//! Correctness under concurrent mutation (two reviewers racing on the same
//! proposal) is this layer's concern, not the router's.

use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

use async_trait::async_trait;
use convene_core::CallerId;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Funding round identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoundId(pub u64);

impl Display for RoundId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoundId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Proposal identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProposalId(pub u64);

impl Display for ProposalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProposalId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A funding round as the dialog sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round id
    pub id: RoundId,
    /// Display name
    pub name: String,
    /// Total budget
    pub budget: u64,
    /// Whether consideration votes are currently accepted
    pub open: bool,
}

/// A submitted proposal as the dialog sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    /// Proposal id
    pub id: ProposalId,
    /// Round the proposal was submitted to
    pub round: RoundId,
    /// Display name
    pub name: String,
    /// Requested budget
    pub budget: u64,
    /// Submitter handle
    pub proposer: String,
    /// Link to the full proposal text
    pub uri: String,
}

/// The two consideration verdicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteChoice {
    /// Move the proposal forward
    Approve,
    /// Keep the proposal back
    Reject,
}

impl VoteChoice {
    /// Short tag used inside routing tokens
    #[inline]
    #[must_use]
    pub fn as_tag(&self) -> &'static str {
        match self {
            VoteChoice::Approve => "approve",
            VoteChoice::Reject => "reject",
        }
    }

    /// Parse a token tag back into a choice
    #[inline]
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "approve" => Some(VoteChoice::Approve),
            "reject" => Some(VoteChoice::Reject),
            _ => None,
        }
    }

    /// Human-readable verdict
    #[inline]
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            VoteChoice::Approve => "Approved",
            VoteChoice::Reject => "Rejected",
        }
    }
}

/// One recorded consideration vote; later votes supersede earlier ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// The reviewer who voted
    pub caller: CallerId,
    /// Round the vote belongs to
    pub round: RoundId,
    /// Proposal voted on
    pub proposal: ProposalId,
    /// Verdict
    pub choice: VoteChoice,
    /// Reviewer's stated reason
    pub reason: String,
}

/// Which proposals a reviewer wants to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalFilter {
    /// Proposals the reviewer has not voted on yet
    Unvoted,
    /// Proposals the reviewer has already voted on
    Voted,
}

/// Domain failures surfaced to the caller as messages
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Round id does not exist
    #[error("funding round {0} was not found")]
    RoundNotFound(RoundId),

    /// Proposal id does not exist in the given round
    #[error("proposal {0} was not found")]
    ProposalNotFound(ProposalId),

    /// Round exists but is no longer accepting votes
    #[error("funding round {0} is closed for consideration")]
    RoundClosed(RoundId),

    /// Backend failure
    #[error("storage failure: {0}")]
    Storage(String),
}

/// The collaborator every consideration action talks to
///
/// `is_reviewer` is synchronous on purpose: it backs a permission predicate,
/// and the permission path performs no I/O.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BallotStore: Send + Sync {
    /// Whether the caller is on the reviewer whitelist
    fn is_reviewer(&self, caller: &CallerId) -> bool;

    /// Rounds currently open for consideration, stably ordered
    async fn open_rounds(&self) -> Result<Vec<RoundRecord>, DomainError>;

    /// Look up one round
    async fn round(&self, id: RoundId) -> Result<Option<RoundRecord>, DomainError>;

    /// Look up one proposal
    async fn proposal(&self, id: ProposalId) -> Result<Option<ProposalRecord>, DomainError>;

    /// Proposals in a round matching the caller's filter, stably ordered
    async fn eligible_proposals(
        &self,
        round: RoundId,
        caller: &CallerId,
        filter: ProposalFilter,
    ) -> Result<Vec<ProposalRecord>, DomainError>;

    /// The caller's most recent vote on a proposal, if any
    async fn latest_vote(
        &self,
        caller: &CallerId,
        proposal: ProposalId,
    ) -> Result<Option<VoteRecord>, DomainError>;

    /// Record a vote; later votes on the same proposal supersede earlier ones
    async fn submit_vote(&self, vote: VoteRecord) -> Result<(), DomainError>;
}

/// In-memory [`BallotStore`] for tests and the demo binary
///
/// Votes append under a write lock; reads see a stable id ordering.
#[derive(Debug, Default)]
pub struct MemoryBallotStore {
    rounds: DashMap<RoundId, RoundRecord>,
    proposals: DashMap<ProposalId, ProposalRecord>,
    votes: RwLock<Vec<VoteRecord>>,
    reviewers: DashMap<String, ()>,
}

impl MemoryBallotStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one round
    pub fn add_round(&self, round: RoundRecord) {
        self.rounds.insert(round.id, round);
    }

    /// Seed one proposal
    pub fn add_proposal(&self, proposal: ProposalRecord) {
        self.proposals.insert(proposal.id, proposal);
    }

    /// Whitelist a reviewer
    pub fn add_reviewer(&self, caller: &CallerId) {
        self.reviewers.insert(caller.as_str().to_string(), ());
    }

    /// Snapshot of every recorded vote, oldest first
    #[must_use]
    pub fn votes(&self) -> Vec<VoteRecord> {
        self.votes.read().clone()
    }
}

#[async_trait]
impl BallotStore for MemoryBallotStore {
    fn is_reviewer(&self, caller: &CallerId) -> bool {
        self.reviewers.contains_key(caller.as_str())
    }

    async fn open_rounds(&self) -> Result<Vec<RoundRecord>, DomainError> {
        let mut rounds: Vec<RoundRecord> = self
            .rounds
            .iter()
            .filter(|entry| entry.open)
            .map(|entry| entry.value().clone())
            .collect();
        rounds.sort_by_key(|round| round.id);
        Ok(rounds)
    }

    async fn round(&self, id: RoundId) -> Result<Option<RoundRecord>, DomainError> {
        Ok(self.rounds.get(&id).map(|entry| entry.value().clone()))
    }

    async fn proposal(&self, id: ProposalId) -> Result<Option<ProposalRecord>, DomainError> {
        Ok(self.proposals.get(&id).map(|entry| entry.value().clone()))
    }

    async fn eligible_proposals(
        &self,
        round: RoundId,
        caller: &CallerId,
        filter: ProposalFilter,
    ) -> Result<Vec<ProposalRecord>, DomainError> {
        let mut proposals: Vec<ProposalRecord> = self
            .proposals
            .iter()
            .filter(|entry| entry.round == round)
            .map(|entry| entry.value().clone())
            .collect();
        proposals.sort_by_key(|proposal| proposal.id);

        let votes = self.votes.read();
        proposals.retain(|proposal| {
            let voted = votes
                .iter()
                .any(|vote| vote.proposal == proposal.id && &vote.caller == caller);
            match filter {
                ProposalFilter::Unvoted => !voted,
                ProposalFilter::Voted => voted,
            }
        });
        Ok(proposals)
    }

    async fn latest_vote(
        &self,
        caller: &CallerId,
        proposal: ProposalId,
    ) -> Result<Option<VoteRecord>, DomainError> {
        Ok(self
            .votes
            .read()
            .iter()
            .rev()
            .find(|vote| vote.proposal == proposal && &vote.caller == caller)
            .cloned())
    }

    async fn submit_vote(&self, vote: VoteRecord) -> Result<(), DomainError> {
        let round = self
            .rounds
            .get(&vote.round)
            .map(|entry| entry.value().clone())
            .ok_or(DomainError::RoundNotFound(vote.round))?;
        if !round.open {
            return Err(DomainError::RoundClosed(vote.round));
        }
        let belongs = self
            .proposals
            .get(&vote.proposal)
            .is_some_and(|entry| entry.round == vote.round);
        if !belongs {
            return Err(DomainError::ProposalNotFound(vote.proposal));
        }

        self.votes.write().push(vote);
        Ok(())
    }
}
