use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use groupcast_core::services::{DeletionOutcome, WriteOutcome};
use groupcast_core::{DispatchStatus, Group, GroupKey, GroupSession};
use groupcast_infrastructure::{HttpWebhookSender, PostgrestGroupRepository, TelegramWebApp};

use crate::cli::Commands;

pub type Session = GroupSession<PostgrestGroupRepository, HttpWebhookSender>;

pub struct CommandContext {
    pub session: Session,
    pub host: Option<Arc<TelegramWebApp>>,
    pub close_delay: Duration,
    pub json: bool,
}

/// Fetch the group list. A failed fetch leaves the list empty and the session usable.
pub async fn load_groups(session: &Session) -> bool {
    let loaded = session.selection().load().await;
    if !loaded {
        warn!("Groups could not be loaded, continuing with an empty list");
    }
    loaded
}

pub async fn run(ctx: &CommandContext, command: Commands) -> Result<()> {
    match command {
        Commands::List { search, selected } => list(ctx, search, selected),
        Commands::Toggle { id, off } => toggle(ctx, id, !off).await,
        Commands::SelectAll => select_all(ctx).await,
        Commands::Clear => clear(ctx).await,
        Commands::Send => send(ctx).await,
        Commands::Delete { ids, yes } => delete(ctx, ids, yes).await,
    }
}

fn list(ctx: &CommandContext, search: Option<String>, only_selected: bool) -> Result<()> {
    let selection = ctx.session.selection();
    if let Some(search) = search {
        selection.set_search_text(search);
    }

    if ctx.json {
        return print_json(ctx);
    }

    let snapshot = selection.snapshot();
    let rows: Vec<&Group> = snapshot
        .visible
        .iter()
        .filter(|g| !only_selected || g.selected)
        .collect();

    if rows.is_empty() {
        println!("No groups found");
    }
    for group in rows {
        println!(
            "[{}] {:>6}  {:>16}  {}",
            if group.selected { "x" } else { " " },
            group.id,
            group.group_id,
            group.name
        );
    }
    println!(
        "{} of {} selected{}",
        snapshot.selected_count,
        snapshot.groups.len(),
        if snapshot.select_all { " (all)" } else { "" }
    );
    Ok(())
}

async fn toggle(ctx: &CommandContext, id: GroupKey, selected: bool) -> Result<()> {
    let outcome = ctx.session.selection().toggle_selection(id, selected).await?;
    report_write(outcome, &format!("group {}", id))?;
    print_summary(ctx)
}

async fn select_all(ctx: &CommandContext) -> Result<()> {
    let outcome = ctx.session.selection().toggle_select_all().await;
    report_write(outcome, "all groups")?;
    print_summary(ctx)
}

async fn clear(ctx: &CommandContext) -> Result<()> {
    let selection = ctx.session.selection();
    selection.enter_edit_mode();
    let outcome = selection.exit_edit_mode().await;
    report_write(outcome, "all groups")?;
    print_summary(ctx)
}

async fn send(ctx: &CommandContext) -> Result<()> {
    let status = ctx.session.dispatch().send().await?;
    if status == DispatchStatus::Failed {
        bail!("Error sending message");
    }

    let count = ctx.session.selection().selected_group_ids().len();
    println!("Sent {} groups", count);

    if let Some(host) = &ctx.host {
        // The close is scheduled by the dispatch service; give it some slack.
        let wait = ctx.close_delay + Duration::from_secs(1);
        if tokio::time::timeout(wait, host.closed()).await.is_err() {
            warn!("Host view was not closed within {:?}", wait);
        }
    }
    Ok(())
}

async fn delete(ctx: &CommandContext, ids: Vec<GroupKey>, yes: bool) -> Result<()> {
    let deletion = ctx.session.deletion();
    let staged = if ids.is_empty() {
        deletion.stage_selected()?
    } else {
        deletion.stage_for_deletion(ids)?
    };

    let pending = deletion.pending().unwrap_or_default();
    let confirmed = yes || prompt(&format!(
        "Delete {} groups ({})? [y/N] ",
        staged,
        pending
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    ))?;

    if !confirmed {
        deletion.cancel();
        println!("Deletion cancelled");
        return Ok(());
    }

    match deletion.confirm().await? {
        DeletionOutcome::Deleted { removed } => {
            info!("Deleted {} groups", removed);
            println!("Deleted {} groups", removed);
            print_summary(ctx)
        }
        DeletionOutcome::Failed => bail!("Failed to delete groups"),
    }
}

fn report_write(outcome: WriteOutcome, target: &str) -> Result<()> {
    match outcome {
        WriteOutcome::Synced => Ok(()),
        WriteOutcome::Superseded => {
            info!("Update for {} superseded", target);
            Ok(())
        }
        WriteOutcome::Failed => bail!("Store did not accept the update for {}", target),
    }
}

fn print_summary(ctx: &CommandContext) -> Result<()> {
    if ctx.json {
        return print_json(ctx);
    }
    let snapshot = ctx.session.selection().snapshot();
    println!(
        "{} of {} selected{}",
        snapshot.selected_count,
        snapshot.groups.len(),
        if snapshot.select_all { " (all)" } else { "" }
    );
    Ok(())
}

fn print_json(ctx: &CommandContext) -> Result<()> {
    let snapshot = serde_json::to_string_pretty(&ctx.session.snapshot())
        .context("Failed to serialize snapshot")?;
    println!("{}", snapshot);
    Ok(())
}

fn prompt(question: &str) -> Result<bool> {
    let mut stdout = io::stdout();
    stdout.write_all(question.as_bytes())?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
