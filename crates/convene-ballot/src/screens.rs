//! Consideration dialog: screens and actions
//!
//! The reviewer-facing flow for one funding round: pick a round, choose
//! between evaluating new proposals and changing a previous vote, browse the
//! eligible proposals page by page, then approve or reject with a written
//! reason. Every step is an operation routed through a token; the only
//! state between steps is what the tokens carry plus the [`BallotStore`].

use std::sync::Arc;

use async_trait::async_trait;
use convene_core::{
    Action, Block, Button, Content, Control, ControlRow, ControlStyle, Dashboard, FormField,
    FormSpec, NavError, Paginated, PermissionPredicate, RequestContext, RoutePath, RoutingToken,
    Screen, SelectMenu, SelectOption, TokenArgs, PAGE_SIZE, PAGINATE_OPERATION,
};

use crate::domain::{
    BallotStore, DomainError, ProposalFilter, ProposalId, ProposalRecord, RoundId, VoteChoice,
    VoteRecord,
};

const SCREEN_ID: &str = "home";
const REASON_FIELD: &str = "reason";
const KIND_NEW: &str = "new";
const KIND_CHANGE: &str = "change";

mod op {
    pub(super) const SHOW: &str = "show";
    pub(super) const SELECT: &str = "select";
    pub(super) const SUBMIT: &str = "submit";
    pub(super) const CONFIRM: &str = "confirm";
}

mod arg {
    pub(super) const ROUND: &str = "round";
    pub(super) const PROPOSAL: &str = "proposal";
    pub(super) const KIND: &str = "kind";
    pub(super) const UNVOTED: &str = "unvoted";
    pub(super) const CHOICE: &str = "choice";
}

fn mint(path: &RoutePath, operation: &str, args: &TokenArgs) -> Result<RoutingToken, NavError> {
    Ok(RoutingToken::encode(path, operation, args)?)
}

fn collaborator(err: DomainError) -> NavError {
    NavError::Collaborator(err.to_string())
}

fn parse_arg<T: std::str::FromStr>(args: &TokenArgs, key: &str) -> Option<T> {
    args.get(key).and_then(|raw| raw.parse().ok())
}

/// Grants access to whitelisted reviewers only
///
/// Attached to every consideration action; the whitelist lookup is an
/// in-memory check, keeping the permission path free of I/O.
pub struct ReviewerGate {
    store: Arc<dyn BallotStore>,
}

impl ReviewerGate {
    /// Gate backed by the given store's whitelist
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn BallotStore>) -> Arc<dyn PermissionPredicate> {
        Arc::new(Self { store })
    }
}

impl PermissionPredicate for ReviewerGate {
    fn allows(&self, caller: &convene_core::CallerId, _path: &RoutePath) -> bool {
        self.store.is_reviewer(caller)
    }
}

/// Home screen of the consideration dashboard
pub struct ConsiderationScreen {
    path: RoutePath,
    select_round: Arc<SelectRoundAction>,
    vote_kind: Arc<VoteKindAction>,
    proposals: Arc<BrowseProposalsAction>,
    cast_vote: Arc<CastVoteAction>,
}

impl ConsiderationScreen {
    /// Wire the screen and its action chain under `dashboard_key`
    #[must_use]
    pub fn new(dashboard_key: &str, store: Arc<dyn BallotStore>) -> Arc<Self> {
        let path = RoutePath::single(dashboard_key).child(SCREEN_ID);
        let gate = ReviewerGate::new(store.clone());

        let cast_vote = Arc::new(CastVoteAction {
            path: path.child("vote"),
            store: store.clone(),
            permissions: vec![gate.clone()],
        });
        let proposals = Arc::new(BrowseProposalsAction {
            path: path.child("proposals"),
            store: store.clone(),
            cast_vote: cast_vote.clone(),
            permissions: vec![gate.clone()],
        });
        let vote_kind = Arc::new(VoteKindAction {
            path: path.child("voteKind"),
            store: store.clone(),
            proposals: proposals.clone(),
            permissions: vec![gate.clone()],
        });
        let select_round = Arc::new(SelectRoundAction {
            path: path.child("round"),
            store,
            vote_kind: vote_kind.clone(),
            permissions: vec![gate],
        });

        Arc::new(Self {
            path,
            select_round,
            vote_kind,
            proposals,
            cast_vote,
        })
    }
}

#[async_trait]
impl Screen for ConsiderationScreen {
    fn path(&self) -> &RoutePath {
        &self.path
    }

    fn actions(&self) -> Vec<Arc<dyn Action>> {
        vec![
            self.select_round.clone(),
            self.vote_kind.clone(),
            self.proposals.clone(),
            self.cast_vote.clone(),
        ]
    }

    async fn render(&self, ctx: &mut RequestContext) -> Result<(), NavError> {
        let content = Content::new()
            .with_block(Block::titled("Proposal Consideration Phase").with_body(
                "Selected reviewers vote to approve or reject the proposals in a \
                 funding round. Start by choosing a funding round below.",
            ))
            .with_row(ControlRow::new().with(self.select_round.component()?));
        ctx.respond(content)?;
        Ok(())
    }
}

/// Step 1: choose the funding round to consider on
pub struct SelectRoundAction {
    path: RoutePath,
    store: Arc<dyn BallotStore>,
    vote_kind: Arc<VoteKindAction>,
    permissions: Vec<Arc<dyn PermissionPredicate>>,
}

impl SelectRoundAction {
    async fn show_rounds(&self, ctx: &mut RequestContext) -> Result<(), NavError> {
        let rounds = self.store.open_rounds().await.map_err(collaborator)?;
        if rounds.is_empty() {
            ctx.respond(Content::text(
                "There are no funding rounds open for consideration right now.",
            ))?;
            return Ok(());
        }

        let options = rounds
            .iter()
            .map(|round| {
                SelectOption::new(&round.name, round.id.to_string())
                    .with_description(format!("Budget: {}", round.budget))
            })
            .collect();
        let menu = SelectMenu::new(
            mint(&self.path, op::SELECT, &TokenArgs::new())?,
            "Select a funding round",
            options,
        );

        let content = Content::new()
            .with_block(Block::titled("Select a Funding Round").with_body(
                "Pick the funding round you would like to submit consideration votes for.",
            ))
            .with_row(ControlRow::new().with(menu));
        ctx.respond(content)?;
        Ok(())
    }

    async fn pick_round(
        &self,
        ctx: &mut RequestContext,
        args: &TokenArgs,
    ) -> Result<(), NavError> {
        let selected: Option<RoundId> = ctx.first_selected().and_then(|raw| raw.parse().ok());
        let Some(round) = selected else {
            ctx.respond(Content::text("Invalid round selection."))?;
            return Ok(());
        };

        let mut forwarded = args.clone();
        forwarded.set(arg::ROUND, round.to_string())?;
        self.vote_kind
            .handle_operation(ctx, op::SHOW, &forwarded)
            .await
    }
}

#[async_trait]
impl Action for SelectRoundAction {
    fn path(&self) -> &RoutePath {
        &self.path
    }

    fn operations(&self) -> &[&str] {
        &[op::SHOW, op::SELECT]
    }

    fn permissions(&self) -> &[Arc<dyn PermissionPredicate>] {
        &self.permissions
    }

    async fn handle_operation(
        &self,
        ctx: &mut RequestContext,
        operation: &str,
        args: &TokenArgs,
    ) -> Result<(), NavError> {
        match operation {
            op::SHOW => self.show_rounds(ctx).await,
            op::SELECT => self.pick_round(ctx, args).await,
            other => Err(NavError::unknown_operation(&self.path, other)),
        }
    }

    fn component(&self) -> Result<Control, NavError> {
        Ok(Button::new(
            mint(&self.path, op::SHOW, &TokenArgs::new())?,
            "Select Funding Round",
        )
        .into())
    }
}

/// Step 2: evaluate new proposals, or change a previous vote
pub struct VoteKindAction {
    path: RoutePath,
    store: Arc<dyn BallotStore>,
    proposals: Arc<BrowseProposalsAction>,
    permissions: Vec<Arc<dyn PermissionPredicate>>,
}

impl VoteKindAction {
    async fn show_kinds(&self, ctx: &mut RequestContext, args: &TokenArgs) -> Result<(), NavError> {
        let Some(round_id) = parse_arg::<RoundId>(args, arg::ROUND) else {
            ctx.respond(Content::text("The funding round id is missing from this control."))?;
            return Ok(());
        };
        let round = match self.store.round(round_id).await.map_err(collaborator)? {
            Some(round) => round,
            None => {
                ctx.respond(Content::text("Funding round not found."))?;
                return Ok(());
            }
        };

        let caller = ctx.caller().clone();
        let unvoted = self
            .store
            .eligible_proposals(round_id, &caller, ProposalFilter::Unvoted)
            .await
            .map_err(collaborator)?
            .len();
        let has_voted = !self
            .store
            .eligible_proposals(round_id, &caller, ProposalFilter::Voted)
            .await
            .map_err(collaborator)?
            .is_empty();

        let mut block = Block::titled(format!("You're Considering on {}", round.name)).with_body(
            "Submit your approval and rejection votes on the proposals in this round. \
             You can add a new vote or change an existing one.",
        );
        if unvoted > 0 {
            block = block.with_field(
                "Inbox",
                format!("{unvoted} proposals still need your vote"),
            );
        }

        let mut new_args = args.clone();
        new_args.set(arg::KIND, KIND_NEW)?;
        let evaluate = Button::new(
            mint(&self.path, op::SELECT, &new_args)?,
            format!("Evaluate New Proposals ({unvoted} left)"),
        )
        .with_style(if unvoted > 0 {
            ControlStyle::Primary
        } else {
            ControlStyle::Secondary
        })
        .disabled(unvoted == 0);

        let mut change_args = args.clone();
        change_args.set(arg::KIND, KIND_CHANGE)?;
        let change = Button::new(
            mint(&self.path, op::SELECT, &change_args)?,
            "Update a Previous Vote",
        )
        .with_style(if has_voted {
            ControlStyle::Primary
        } else {
            ControlStyle::Secondary
        })
        .disabled(!has_voted);

        let content = Content::new()
            .with_block(block)
            .with_row(ControlRow::new().with(evaluate).with(change));
        ctx.respond(content)?;
        Ok(())
    }

    async fn pick_kind(&self, ctx: &mut RequestContext, args: &TokenArgs) -> Result<(), NavError> {
        let kind = args.get(arg::KIND).map(str::to_string);
        let unvoted_flag = match kind.as_deref() {
            Some(KIND_NEW) => "1",
            Some(KIND_CHANGE) => "0",
            _ => {
                ctx.respond(Content::text("Invalid vote type selected."))?;
                return Ok(());
            }
        };

        let mut forwarded = args.clone();
        forwarded.set(arg::UNVOTED, unvoted_flag)?;
        self.proposals
            .handle_operation(ctx, op::SHOW, &forwarded)
            .await
    }
}

#[async_trait]
impl Action for VoteKindAction {
    fn path(&self) -> &RoutePath {
        &self.path
    }

    fn operations(&self) -> &[&str] {
        &[op::SHOW, op::SELECT]
    }

    fn permissions(&self) -> &[Arc<dyn PermissionPredicate>] {
        &self.permissions
    }

    async fn handle_operation(
        &self,
        ctx: &mut RequestContext,
        operation: &str,
        args: &TokenArgs,
    ) -> Result<(), NavError> {
        match operation {
            op::SHOW => self.show_kinds(ctx, args).await,
            op::SELECT => self.pick_kind(ctx, args).await,
            other => Err(NavError::unknown_operation(&self.path, other)),
        }
    }
}

/// Step 3: browse the eligible proposals, one page at a time
pub struct BrowseProposalsAction {
    path: RoutePath,
    store: Arc<dyn BallotStore>,
    cast_vote: Arc<CastVoteAction>,
    permissions: Vec<Arc<dyn PermissionPredicate>>,
}

impl BrowseProposalsAction {
    fn round_and_filter(args: &TokenArgs) -> Option<(RoundId, ProposalFilter)> {
        let round = parse_arg::<RoundId>(args, arg::ROUND)?;
        let filter = match args.get(arg::UNVOTED) {
            Some("0") => ProposalFilter::Voted,
            _ => ProposalFilter::Unvoted,
        };
        Some((round, filter))
    }

    async fn show_page(&self, ctx: &mut RequestContext, args: &TokenArgs) -> Result<(), NavError> {
        if Self::round_and_filter(args).is_none() {
            ctx.respond(Content::text("The funding round id is missing from this control."))?;
            return Ok(());
        }

        let total_pages = self.total_pages(ctx, args).await?;
        let page = self.clamp_page(self.current_page(args), total_pages);
        let items = self.items_for_page(ctx, args, page).await?;

        if items.is_empty() {
            ctx.respond(Content::text(
                "There are no eligible proposals to vote on right now.",
            ))?;
            return Ok(());
        }

        let caller = ctx.caller().clone();
        let mut options = Vec::with_capacity(items.len());
        for proposal in &items {
            let mut description = format!("Budget: {}", proposal.budget);
            if let Some(previous) = self
                .store
                .latest_vote(&caller, proposal.id)
                .await
                .map_err(collaborator)?
            {
                description.push_str(&format!(" | Current vote: {}", previous.choice.describe()));
            }
            options.push(
                SelectOption::new(&proposal.name, proposal.id.to_string())
                    .with_description(description),
            );
        }

        let menu = SelectMenu::new(
            mint(&self.path, op::SELECT, args)?,
            "Select a proposal",
            options,
        );

        let mut content = Content::new()
            .with_block(
                Block::titled("Select a Proposal")
                    .with_body(format!("Page {} of {}", page + 1, total_pages.max(1))),
            )
            .with_row(ControlRow::new().with(menu));
        if total_pages > 1 {
            content = content.with_row(self.pagination_row(args, page, total_pages)?);
        }
        ctx.respond(content)?;
        Ok(())
    }

    async fn pick_proposal(
        &self,
        ctx: &mut RequestContext,
        args: &TokenArgs,
    ) -> Result<(), NavError> {
        let selected: Option<ProposalId> = ctx.first_selected().and_then(|raw| raw.parse().ok());
        let Some(proposal) = selected else {
            ctx.respond(Content::text("Invalid proposal selection."))?;
            return Ok(());
        };

        let mut forwarded = args.clone();
        forwarded.set(arg::PROPOSAL, proposal.to_string())?;
        self.cast_vote
            .handle_operation(ctx, op::SHOW, &forwarded)
            .await
    }
}

#[async_trait]
impl Action for BrowseProposalsAction {
    fn path(&self) -> &RoutePath {
        &self.path
    }

    fn operations(&self) -> &[&str] {
        &[op::SHOW, op::SELECT, PAGINATE_OPERATION]
    }

    fn permissions(&self) -> &[Arc<dyn PermissionPredicate>] {
        &self.permissions
    }

    async fn handle_operation(
        &self,
        ctx: &mut RequestContext,
        operation: &str,
        args: &TokenArgs,
    ) -> Result<(), NavError> {
        match operation {
            op::SHOW => self.show_page(ctx, args).await,
            op::SELECT => self.pick_proposal(ctx, args).await,
            PAGINATE_OPERATION => self.handle_pagination(ctx, args).await,
            other => Err(NavError::unknown_operation(&self.path, other)),
        }
    }
}

#[async_trait]
impl Paginated for BrowseProposalsAction {
    type Item = ProposalRecord;

    fn render_operation(&self) -> &str {
        op::SHOW
    }

    async fn total_items(
        &self,
        ctx: &RequestContext,
        args: &TokenArgs,
    ) -> Result<usize, NavError> {
        let Some((round, filter)) = Self::round_and_filter(args) else {
            return Ok(0);
        };
        Ok(self
            .store
            .eligible_proposals(round, ctx.caller(), filter)
            .await
            .map_err(collaborator)?
            .len())
    }

    async fn items_for_page(
        &self,
        ctx: &RequestContext,
        args: &TokenArgs,
        page: usize,
    ) -> Result<Vec<ProposalRecord>, NavError> {
        let Some((round, filter)) = Self::round_and_filter(args) else {
            return Ok(Vec::new());
        };
        let proposals = self
            .store
            .eligible_proposals(round, ctx.caller(), filter)
            .await
            .map_err(collaborator)?;
        let start = (page * PAGE_SIZE).min(proposals.len());
        let end = ((page + 1) * PAGE_SIZE).min(proposals.len());
        Ok(proposals[start..end].to_vec())
    }
}

/// Step 4: approve or reject one proposal, with a written reason
pub struct CastVoteAction {
    path: RoutePath,
    store: Arc<dyn BallotStore>,
    permissions: Vec<Arc<dyn PermissionPredicate>>,
}

impl CastVoteAction {
    async fn show_panel(&self, ctx: &mut RequestContext, args: &TokenArgs) -> Result<(), NavError> {
        let (Some(proposal_id), Some(round_id)) = (
            parse_arg::<ProposalId>(args, arg::PROPOSAL),
            parse_arg::<RoundId>(args, arg::ROUND),
        ) else {
            ctx.respond(Content::text(
                "The proposal or funding round id is missing from this control.",
            ))?;
            return Ok(());
        };

        let proposal = self
            .store
            .proposal(proposal_id)
            .await
            .map_err(collaborator)?;
        let round = self.store.round(round_id).await.map_err(collaborator)?;
        let (Some(proposal), Some(round)) = (proposal, round) else {
            ctx.respond(Content::text("Proposal or funding round not found."))?;
            return Ok(());
        };

        let caller = ctx.caller().clone();
        let existing = self
            .store
            .latest_vote(&caller, proposal_id)
            .await
            .map_err(collaborator)?;

        let mut block = Block::titled(format!(
            "{} on {}",
            if existing.is_some() {
                "Change Your Vote"
            } else {
                "Vote"
            },
            proposal.name
        ))
        .with_field(
            "Funding Round",
            format!("{} (budget {})", round.name, round.budget),
        )
        .with_field(
            "Proposal",
            format!(
                "{} (budget {}, submitted by {})",
                proposal.name, proposal.budget, proposal.proposer
            ),
        )
        .with_field("Link", proposal.uri.clone());
        if let Some(previous) = &existing {
            block = block.with_field("Current Vote", previous.choice.describe());
        }

        let vote_args = TokenArgs::from_pairs(&[
            (arg::ROUND, round_id.to_string().as_str()),
            (arg::PROPOSAL, proposal_id.to_string().as_str()),
        ])?;
        let button_for = |choice: VoteChoice, label: &str| -> Result<Button, NavError> {
            let mut choice_args = vote_args.clone();
            choice_args.set(arg::CHOICE, choice.as_tag())?;
            Ok(
                Button::new(mint(&self.path, op::SUBMIT, &choice_args)?, label).with_style(
                    match choice {
                        VoteChoice::Approve => ControlStyle::Success,
                        VoteChoice::Reject => ControlStyle::Danger,
                    },
                ),
            )
        };

        let mut row = ControlRow::new();
        match existing.as_ref().map(|vote| vote.choice) {
            Some(VoteChoice::Approve) => {
                row = row.with(button_for(VoteChoice::Reject, "Change to Reject")?);
            }
            Some(VoteChoice::Reject) => {
                row = row.with(button_for(VoteChoice::Approve, "Change to Approve")?);
            }
            None => {
                row = row
                    .with(button_for(VoteChoice::Approve, "Approve Proposal")?)
                    .with(button_for(VoteChoice::Reject, "Reject Proposal")?);
            }
        }

        // Drill-down in place: the proposal list message becomes the panel.
        ctx.update(Content::new().with_block(block).with_row(row))?;
        Ok(())
    }

    async fn open_reason_form(
        &self,
        ctx: &mut RequestContext,
        args: &TokenArgs,
    ) -> Result<(), NavError> {
        let choice = args.get(arg::CHOICE).and_then(VoteChoice::from_tag);
        let Some(choice) = choice else {
            ctx.respond(Content::text("Invalid vote choice."))?;
            return Ok(());
        };

        let title = match choice {
            VoteChoice::Approve => "Approve Proposal",
            VoteChoice::Reject => "Reject Proposal",
        };
        let label = match choice {
            VoteChoice::Approve => "Reason for approving the proposal",
            VoteChoice::Reject => "Reason for rejecting the proposal",
        };
        let form = FormSpec::new(mint(&self.path, op::CONFIRM, args)?, title)
            .with_field(FormField::new(REASON_FIELD, label).multiline());

        ctx.respond(Content::new().with_form(form))?;
        Ok(())
    }

    async fn record_vote(&self, ctx: &mut RequestContext, args: &TokenArgs) -> Result<(), NavError> {
        let reason = ctx
            .field(REASON_FIELD)
            .map(|raw| raw.trim().to_string())
            .filter(|reason| !reason.is_empty());
        let Some(reason) = reason else {
            ctx.respond(Content::text("A reason is required to record your vote."))?;
            return Ok(());
        };

        let (Some(proposal), Some(round), Some(choice)) = (
            parse_arg::<ProposalId>(args, arg::PROPOSAL),
            parse_arg::<RoundId>(args, arg::ROUND),
            args.get(arg::CHOICE).and_then(VoteChoice::from_tag),
        ) else {
            ctx.respond(Content::text("This vote form is missing its target."))?;
            return Ok(());
        };

        let vote = VoteRecord {
            caller: ctx.caller().clone(),
            round,
            proposal,
            choice,
            reason: reason.clone(),
        };

        match self.store.submit_vote(vote).await {
            Ok(()) => {
                tracing::info!(
                    caller = %ctx.caller(),
                    %proposal,
                    %round,
                    choice = choice.as_tag(),
                    "consideration vote recorded"
                );
                let content = Content::new().with_block(
                    Block::titled("Vote Recorded")
                        .with_body(format!(
                            "Your vote on proposal {proposal} has been recorded."
                        ))
                        .with_field("Decision", choice.describe())
                        .with_field("Reason", reason),
                );
                ctx.respond(content)?;
            }
            Err(err) => {
                ctx.respond(Content::text(format!(
                    "Your vote could not be recorded: {err}"
                )))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Action for CastVoteAction {
    fn path(&self) -> &RoutePath {
        &self.path
    }

    fn operations(&self) -> &[&str] {
        &[op::SHOW, op::SUBMIT, op::CONFIRM]
    }

    fn permissions(&self) -> &[Arc<dyn PermissionPredicate>] {
        &self.permissions
    }

    async fn handle_operation(
        &self,
        ctx: &mut RequestContext,
        operation: &str,
        args: &TokenArgs,
    ) -> Result<(), NavError> {
        match operation {
            op::SHOW => self.show_panel(ctx, args).await,
            op::SUBMIT => self.open_reason_form(ctx, args).await,
            op::CONFIRM => self.record_vote(ctx, args).await,
            other => Err(NavError::unknown_operation(&self.path, other)),
        }
    }
}

/// A ready-to-register consideration dashboard over `store`
#[must_use]
pub fn consideration_dashboard(key: &str, store: Arc<dyn BallotStore>) -> Arc<Dashboard> {
    let screen = ConsiderationScreen::new(key, store);
    Arc::new(Dashboard::new(key, screen))
}
