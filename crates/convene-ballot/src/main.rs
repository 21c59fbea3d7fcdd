//! Demo driver for the consideration dialog
//!
//! `simulate` seeds an in-memory store, registers the dashboard, and walks a
//! scripted reviewer through the whole flow by activating the very controls
//! each reply carries, the same round trip a host platform would perform.
//! `inspect` decodes a routing token for debugging.

use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, Command};
use convene_ballot::{
    consideration_dashboard, MemoryBallotStore, ProposalId, ProposalRecord, RoundId, RoundRecord,
};
use convene_core::{
    CallerId, Control, MessageRef, NavigationRegistry, RegistryBuilder, Reply, Request,
    RoutingToken, SelectMenu,
};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Command::new("convene-demo")
        .version(convene_ballot::VERSION)
        .about("Convene consideration dialog demo")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("simulate")
                .about("Drive a scripted reviewer through the consideration flow")
                .arg(
                    Arg::new("rounds")
                        .long("rounds")
                        .default_value("2")
                        .value_parser(value_parser!(u64))
                        .help("Number of open funding rounds to seed"),
                )
                .arg(
                    Arg::new("proposals")
                        .long("proposals")
                        .default_value("30")
                        .value_parser(value_parser!(u64))
                        .help("Number of proposals to seed into the first round"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Decode a routing token and print its parts")
                .arg(Arg::new("token").required(true).help("The raw token string")),
        );

    match cli.get_matches().subcommand() {
        Some(("simulate", args)) => {
            let rounds = *args.get_one::<u64>("rounds").unwrap_or(&2);
            let proposals = *args.get_one::<u64>("proposals").unwrap_or(&30);
            simulate(rounds, proposals).await
        }
        Some(("inspect", args)) => {
            let raw = args
                .get_one::<String>("token")
                .ok_or_else(|| anyhow!("token argument missing"))?;
            inspect(raw)
        }
        _ => Ok(()),
    }
}

fn inspect(raw: &str) -> Result<()> {
    let route = RoutingToken::decode(raw).with_context(|| format!("cannot decode '{raw}'"))?;
    println!("path:      {}", route.path);
    println!("operation: {}", route.operation);
    for (key, value) in route.args.iter() {
        println!("arg:       {key} = {value}");
    }
    Ok(())
}

async fn simulate(rounds: u64, proposals: u64) -> Result<()> {
    let reviewer = CallerId::new("reviewer-1");
    let store = Arc::new(seed_store(&reviewer, rounds, proposals));

    let dashboard = consideration_dashboard("consider", store.clone());
    let home_token = dashboard.home_token()?;

    let mut builder = RegistryBuilder::new();
    builder.register_dashboard("consider", dashboard)?;
    let registry = builder.build()?;
    println!("registry ready: {} nodes\n", registry.node_count());

    // 1. Open the dashboard's home view.
    let reply = drive(
        &registry,
        Request::control_activation(home_token.as_str(), reviewer.clone()),
    )
    .await?;

    // 2. Press "Select Funding Round".
    let reply = drive(
        &registry,
        activation(&first_enabled_button(&reply)?, &reviewer),
    )
    .await?;

    // 3. Choose the first round from the menu.
    let menu = first_menu(&reply)?;
    let reply = drive(
        &registry,
        selection(&menu.token, &reviewer, &menu.options[0].value),
    )
    .await?;

    // 4. Press "Evaluate New Proposals".
    let reply = drive(
        &registry,
        activation(&first_enabled_button(&reply)?, &reviewer),
    )
    .await?;

    // 5. Page forward once, if the list spans pages.
    let reply = match next_page_button(&reply) {
        Some(token) => drive(&registry, activation(&token, &reviewer)).await?,
        None => reply,
    };

    // 6. Choose the first proposal on the page.
    let menu = first_menu(&reply)?;
    let reply = drive(
        &registry,
        selection(&menu.token, &reviewer, &menu.options[0].value),
    )
    .await?;

    // 7. Approve it.
    let reply = drive(
        &registry,
        activation(&first_enabled_button(&reply)?, &reviewer),
    )
    .await?;

    // 8. Submit the reason form.
    let form_token = reply
        .content()
        .form
        .as_ref()
        .map(|form| form.token.clone())
        .ok_or_else(|| anyhow!("expected a reason form"))?;
    let mut fields = IndexMap::new();
    fields.insert(
        "reason".to_string(),
        "Scope and budget are both credible.".to_string(),
    );
    drive(
        &registry,
        Request::form_submission(form_token.as_str(), reviewer.clone(), fields)
            .with_origin(MessageRef::new("m-form")),
    )
    .await?;

    println!("recorded votes:");
    for vote in store.votes() {
        println!(
            "  {} voted {} on proposal {} ({})",
            vote.caller,
            vote.choice.describe(),
            vote.proposal,
            vote.reason
        );
    }
    Ok(())
}

fn seed_store(reviewer: &CallerId, rounds: u64, proposals: u64) -> MemoryBallotStore {
    let store = MemoryBallotStore::new();
    store.add_reviewer(reviewer);
    for n in 1..=rounds.max(1) {
        store.add_round(RoundRecord {
            id: RoundId(n),
            name: format!("Funding Round {n}"),
            budget: 100_000 * n,
            open: true,
        });
    }
    for n in 1..=proposals {
        store.add_proposal(ProposalRecord {
            id: ProposalId(n),
            round: RoundId(1),
            name: format!("Proposal {n}"),
            budget: 500 * n,
            proposer: format!("proposer-{n}"),
            uri: format!("https://proposals.example/{n}"),
        });
    }
    store
}

async fn drive(registry: &NavigationRegistry, request: Request) -> Result<Reply> {
    println!("-> {}", request.token());
    let reply = registry
        .handle_interaction(request)
        .await
        .ok_or_else(|| anyhow!("handler produced no reply"))?;
    print_reply(&reply);
    Ok(reply)
}

fn activation(token: &RoutingToken, caller: &CallerId) -> Request {
    Request::control_activation(token.as_str(), caller.clone())
        .with_origin(MessageRef::new("m-demo"))
}

fn selection(token: &RoutingToken, caller: &CallerId, value: &str) -> Request {
    Request::list_selection(token.as_str(), caller.clone(), vec![value.to_string()])
        .with_origin(MessageRef::new("m-demo"))
}

fn first_enabled_button(reply: &Reply) -> Result<RoutingToken> {
    reply
        .content()
        .controls
        .iter()
        .flat_map(|row| row.controls.iter())
        .find_map(|control| match control {
            Control::Button(button) if !button.disabled => Some(button.token.clone()),
            _ => None,
        })
        .ok_or_else(|| anyhow!("expected an enabled button"))
}

fn next_page_button(reply: &Reply) -> Option<RoutingToken> {
    reply
        .content()
        .controls
        .iter()
        .flat_map(|row| row.controls.iter())
        .find_map(|control| match control {
            Control::Button(button) if button.label == "Next" && !button.disabled => {
                Some(button.token.clone())
            }
            _ => None,
        })
}

fn first_menu(reply: &Reply) -> Result<SelectMenu> {
    reply
        .content()
        .controls
        .iter()
        .flat_map(|row| row.controls.iter())
        .find_map(|control| match control {
            Control::Select(menu) => Some(menu.clone()),
            _ => None,
        })
        .ok_or_else(|| anyhow!("expected a select menu"))
}

fn print_reply(reply: &Reply) {
    let verb = if reply.is_update() { "update" } else { "respond" };
    let content = reply.content();
    if let Some(text) = &content.text {
        println!("<- {verb}: {text}");
    }
    for block in &content.blocks {
        if let Some(title) = &block.title {
            println!("<- {verb} block: {title}");
        }
    }
    for row in &content.controls {
        for control in &row.controls {
            match control {
                Control::Button(button) => {
                    println!(
                        "   [{}{}] {}",
                        button.label,
                        if button.disabled { " (disabled)" } else { "" },
                        button.token
                    );
                }
                Control::Select(menu) => {
                    println!("   <{}> {} options", menu.placeholder, menu.options.len());
                }
            }
        }
    }
    if let Some(form) = &content.form {
        println!("   form: {} -> {}", form.title, form.token);
    }
    println!();
}
