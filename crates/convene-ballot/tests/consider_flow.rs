//! End-to-end consideration flow through the navigation registry
//!
//! Every step activates a control taken from the previous reply, exactly as
//! a host platform would echo it back.

use std::sync::Arc;

use convene_ballot::{
    consideration_dashboard, MemoryBallotStore, ProposalId, ProposalRecord, RoundId, RoundRecord,
    VoteChoice,
};
use convene_core::{
    CallerId, Control, MessageRef, NavigationRegistry, RegistryBuilder, Reply, Request,
    RoutingToken, SelectMenu,
};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;

fn seed_store(proposals: u64) -> Arc<MemoryBallotStore> {
    let store = MemoryBallotStore::new();
    store.add_reviewer(&CallerId::new("sme-1"));
    store.add_reviewer(&CallerId::new("sme-2"));
    store.add_round(RoundRecord {
        id: RoundId(1),
        name: "Spring Round".to_string(),
        budget: 250_000,
        open: true,
    });
    store.add_round(RoundRecord {
        id: RoundId(2),
        name: "Closed Round".to_string(),
        budget: 10_000,
        open: false,
    });
    for n in 1..=proposals {
        store.add_proposal(ProposalRecord {
            id: ProposalId(n),
            round: RoundId(1),
            name: format!("Proposal {n}"),
            budget: 1_000 * n,
            proposer: format!("proposer-{n}"),
            uri: format!("https://proposals.example/{n}"),
        });
    }
    Arc::new(store)
}

fn registry_over(store: Arc<MemoryBallotStore>) -> NavigationRegistry {
    let dashboard = consideration_dashboard("consider", store);
    let mut builder = RegistryBuilder::new();
    builder.register_dashboard("consider", dashboard).unwrap();
    builder.build().unwrap()
}

fn activation(token: &RoutingToken, caller: &str) -> Request {
    Request::control_activation(token.as_str(), caller).with_origin(MessageRef::new("m-test"))
}

fn selection(token: &RoutingToken, caller: &str, value: &str) -> Request {
    Request::list_selection(token.as_str(), caller, vec![value.to_string()])
        .with_origin(MessageRef::new("m-test"))
}

fn buttons(reply: &Reply) -> Vec<&convene_core::Button> {
    reply
        .content()
        .controls
        .iter()
        .flat_map(|row| row.controls.iter())
        .filter_map(|control| match control {
            Control::Button(button) => Some(button),
            Control::Select(_) => None,
        })
        .collect()
}

fn first_menu(reply: &Reply) -> &SelectMenu {
    reply
        .content()
        .controls
        .iter()
        .flat_map(|row| row.controls.iter())
        .find_map(|control| match control {
            Control::Select(menu) => Some(menu),
            Control::Button(_) => None,
        })
        .expect("expected a select menu")
}

async fn open_first_round_proposals(
    registry: &NavigationRegistry,
    caller: &str,
) -> (Reply, RoutingToken) {
    let home = registry
        .dashboard("consider")
        .unwrap()
        .home_token()
        .unwrap();
    let reply = registry
        .handle_interaction(activation(&home, caller))
        .await
        .unwrap();

    let entry = buttons(&reply)[0].token.clone();
    let reply = registry
        .handle_interaction(activation(&entry, caller))
        .await
        .unwrap();

    let round_menu = first_menu(&reply).token.clone();
    let reply = registry
        .handle_interaction(selection(&round_menu, caller, "1"))
        .await
        .unwrap();

    let evaluate = buttons(&reply)[0].token.clone();
    let reply = registry
        .handle_interaction(activation(&evaluate, caller))
        .await
        .unwrap();
    let menu_token = first_menu(&reply).token.clone();
    (reply, menu_token)
}

#[tokio::test]
async fn round_menu_lists_only_open_rounds() {
    let registry = registry_over(seed_store(3));

    let home = registry
        .dashboard("consider")
        .unwrap()
        .home_token()
        .unwrap();
    let reply = registry
        .handle_interaction(activation(&home, "sme-1"))
        .await
        .unwrap();
    let entry = buttons(&reply)[0].token.clone();
    let reply = registry
        .handle_interaction(activation(&entry, "sme-1"))
        .await
        .unwrap();

    let menu = first_menu(&reply);
    assert_eq!(menu.options.len(), 1);
    assert_eq!(menu.options[0].label, "Spring Round");
    assert_eq!(menu.options[0].value, "1");
}

#[tokio::test]
async fn proposals_paginate_across_pages() {
    let registry = registry_over(seed_store(30));

    let (reply, _menu_token) = open_first_round_proposals(&registry, "sme-1").await;

    // Page 1 of 2: a full page of options plus a pagination row.
    let menu = first_menu(&reply);
    assert_eq!(menu.options.len(), 25);
    let page_buttons = buttons(&reply);
    assert_eq!(page_buttons.len(), 2);
    assert!(page_buttons[0].disabled, "prev must be disabled on page 0");
    assert!(!page_buttons[1].disabled, "next must be enabled on page 0");

    let next = page_buttons[1].token.clone();
    let reply = registry
        .handle_interaction(activation(&next, "sme-1"))
        .await
        .unwrap();

    let menu = first_menu(&reply);
    assert_eq!(menu.options.len(), 5);
    assert_eq!(menu.options[0].value, "26");
    let page_buttons = buttons(&reply);
    assert!(!page_buttons[0].disabled, "prev must be enabled on page 1");
    assert!(page_buttons[1].disabled, "next must be disabled on page 1");
}

#[tokio::test]
async fn full_flow_records_vote() {
    let store = seed_store(30);
    let registry = registry_over(store.clone());

    let (_list, menu_token) = open_first_round_proposals(&registry, "sme-1").await;

    let reply = registry
        .handle_interaction(selection(&menu_token, "sme-1", "7"))
        .await
        .unwrap();

    // The proposal list message is replaced in place by the vote panel.
    assert!(reply.is_update());
    let panel_buttons = buttons(&reply);
    assert_eq!(panel_buttons.len(), 2);
    let approve = panel_buttons[0].token.clone();

    let reply = registry
        .handle_interaction(activation(&approve, "sme-1"))
        .await
        .unwrap();
    let form = reply.content().form.as_ref().expect("expected reason form");

    let mut fields = IndexMap::new();
    fields.insert("reason".to_string(), "Clear milestones.".to_string());
    let reply = registry
        .handle_interaction(
            Request::form_submission(form.token.as_str(), "sme-1", fields)
                .with_origin(MessageRef::new("m-form")),
        )
        .await
        .unwrap();

    assert_eq!(
        reply.content().blocks[0].title.as_deref(),
        Some("Vote Recorded")
    );

    let votes = store.votes();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].proposal, ProposalId(7));
    assert_eq!(votes[0].round, RoundId(1));
    assert_eq!(votes[0].choice, VoteChoice::Approve);
    assert_eq!(votes[0].reason, "Clear milestones.");
    assert_eq!(votes[0].caller, CallerId::new("sme-1"));
}

#[tokio::test]
async fn revoting_shows_current_vote_and_flips_choice() {
    let store = seed_store(5);
    let registry = registry_over(store.clone());

    // First vote: approve proposal 2.
    let (_list, menu_token) = open_first_round_proposals(&registry, "sme-1").await;
    let reply = registry
        .handle_interaction(selection(&menu_token, "sme-1", "2"))
        .await
        .unwrap();
    let approve = buttons(&reply)[0].token.clone();
    let reply = registry
        .handle_interaction(activation(&approve, "sme-1"))
        .await
        .unwrap();
    let form = reply.content().form.clone().expect("expected reason form");
    let mut fields = IndexMap::new();
    fields.insert("reason".to_string(), "Looks solid.".to_string());
    registry
        .handle_interaction(
            Request::form_submission(form.token.as_str(), "sme-1", fields)
                .with_origin(MessageRef::new("m-form")),
        )
        .await
        .unwrap();

    // Re-open the panel through the "change a previous vote" path.
    let home = registry
        .dashboard("consider")
        .unwrap()
        .home_token()
        .unwrap();
    let reply = registry
        .handle_interaction(activation(&home, "sme-1"))
        .await
        .unwrap();
    let entry = buttons(&reply)[0].token.clone();
    let reply = registry
        .handle_interaction(activation(&entry, "sme-1"))
        .await
        .unwrap();
    let menu = first_menu(&reply).token.clone();
    let reply = registry
        .handle_interaction(selection(&menu, "sme-1", "1"))
        .await
        .unwrap();

    // Second button is "Update a Previous Vote", now enabled.
    let change = buttons(&reply)[1].clone();
    assert!(!change.disabled);
    let reply = registry
        .handle_interaction(activation(&change.token, "sme-1"))
        .await
        .unwrap();

    // Only the already-voted proposal is listed, with its current vote.
    let menu = first_menu(&reply);
    assert_eq!(menu.options.len(), 1);
    assert_eq!(menu.options[0].value, "2");
    assert!(menu.options[0]
        .description
        .as_deref()
        .unwrap()
        .contains("Current vote: Approved"));

    let menu_token = menu.token.clone();
    let reply = registry
        .handle_interaction(selection(&menu_token, "sme-1", "2"))
        .await
        .unwrap();

    // Having approved already, the panel offers only the flip to reject.
    let panel_buttons = buttons(&reply);
    assert_eq!(panel_buttons.len(), 1);
    assert_eq!(panel_buttons[0].label, "Change to Reject");
}

#[tokio::test]
async fn non_reviewer_is_not_authorized() {
    let store = seed_store(3);
    let registry = registry_over(store.clone());

    let reply = registry
        .handle_interaction(Request::control_activation(
            "consider:home:round:show",
            "rando",
        ))
        .await
        .unwrap();

    assert!(reply
        .content()
        .text
        .as_deref()
        .unwrap()
        .contains("not authorized"));
    assert!(store.votes().is_empty());
}

#[tokio::test]
async fn concurrent_reviewers_both_record_votes() {
    let store = seed_store(5);
    let registry = Arc::new(registry_over(store.clone()));

    let vote_as = |caller: &'static str| {
        let registry = registry.clone();
        async move {
            let (_list, menu_token) = open_first_round_proposals(&registry, caller).await;
            let reply = registry
                .handle_interaction(selection(&menu_token, caller, "3"))
                .await
                .unwrap();
            let approve = buttons(&reply)[0].token.clone();
            let reply = registry
                .handle_interaction(activation(&approve, caller))
                .await
                .unwrap();
            let form = reply.content().form.clone().expect("expected reason form");
            let mut fields = IndexMap::new();
            fields.insert("reason".to_string(), format!("{caller} concurs"));
            registry
                .handle_interaction(
                    Request::form_submission(form.token.as_str(), caller, fields)
                        .with_origin(MessageRef::new("m-form")),
                )
                .await
                .unwrap();
        }
    };

    futures::join!(vote_as("sme-1"), vote_as("sme-2"));

    let votes = store.votes();
    assert_eq!(votes.len(), 2);
    assert!(votes.iter().all(|vote| vote.proposal == ProposalId(3)));
}
