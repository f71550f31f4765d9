//! `slate replay`: apply snapshot files to a fresh board and print it.
//!
//! The feed kind is detected per file from the envelope, so a replay can mix
//! event and status snapshots in one session. Files apply in argument order,
//! which is the poll order.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use slate_core::model::{Event, Repository};
use slate_core::{ApplyStats, Limits, Reconciler, Store};
use tracing::debug;

use crate::output::{self, OutputMode};

/// Arguments for `slate replay`.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Snapshot files to apply, oldest first.
    #[arg(required = true, value_name = "SNAPSHOT")]
    pub files: Vec<PathBuf>,

    /// Retention limit override for the event feed.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Limits file (TOML).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print per-snapshot apply statistics to stderr.
    #[arg(long)]
    pub stats: bool,
}

/// The whole board as one stable JSON object.
#[derive(Serialize)]
struct BoardView<'a> {
    events: Vec<&'a Event>,
    repositories: Vec<&'a Repository>,
}

/// Replay the given snapshot files and print the resulting board.
///
/// # Errors
///
/// Returns an error if a file cannot be read, is not JSON, carries no
/// recognizable envelope, or is structurally invalid for its feed.
pub fn run_replay(args: &ReplayArgs, mode: OutputMode) -> Result<()> {
    let mut limits = if let Some(path) = &args.config {
        Limits::load(path)?
    } else {
        Limits::default()
    };
    if let Some(limit) = args.limit {
        limits.event_limit = limit;
    }

    let mut store = Store::new();
    for path in &args.files {
        debug!(path = %path.display(), "applying snapshot");
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot from {}", path.display()))?;
        let payload: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Snapshot {} is not valid JSON", path.display()))?;
        let stats = apply_snapshot(&mut store, limits, payload)
            .with_context(|| format!("Failed to apply snapshot {}", path.display()))?;
        if args.stats {
            eprintln!(
                "{}: merged {} skipped {} removed {} evicted {}",
                path.display(),
                stats.merged,
                stats.skipped,
                stats.removed,
                stats.evicted
            );
        }
    }

    render_board(&store, mode)
}

/// Route a payload to the right feed by its envelope fields.
fn apply_snapshot(store: &mut Store, limits: Limits, payload: Value) -> Result<ApplyStats> {
    let mut reconciler = Reconciler::new(store, limits);
    if payload.get("events").is_some() {
        Ok(reconciler.apply_event_snapshot(payload)?)
    } else if payload.get("repo_status").is_some() || payload.get("closed").is_some() {
        Ok(reconciler.apply_status_snapshot(payload)?)
    } else {
        bail!("snapshot has neither an event nor a status envelope");
    }
}

fn render_board(store: &Store, mode: OutputMode) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if mode.is_json() {
        let view = BoardView {
            events: store.ordered_events().collect(),
            repositories: store.ordered_repositories(),
        };
        serde_json::to_writer_pretty(&mut out, &view)?;
        writeln!(out)?;
    } else {
        render_human(store, &mut out)?;
    }
    Ok(())
}

fn render_human(store: &Store, w: &mut dyn Write) -> io::Result<()> {
    output::pretty_section(w, "Events")?;
    if store.event_count() == 0 {
        writeln!(w, "  (none)")?;
    }
    for event in store.ordered_events() {
        writeln!(
            w,
            "{:>6}  {:<12} {}",
            event.id,
            event.status.as_str(),
            event.description
        )?;
        for group in &event.job_groups {
            for job in &group.jobs {
                writeln!(
                    w,
                    "        job {:<6} {:<12} {}",
                    job.id,
                    job.status.as_str(),
                    job.info
                )?;
            }
        }
    }

    writeln!(w)?;
    output::pretty_section(w, "Repositories")?;
    let repos = store.ordered_repositories();
    if repos.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for repo in repos {
        writeln!(w, "{}  {}", repo.name, repo.url)?;
        for branch in &repo.branches {
            writeln!(
                w,
                "  branch {:<14} {}",
                branch.name,
                branch.status.as_str()
            )?;
        }
        for pr in &repo.prs {
            writeln!(
                w,
                "  #{:<5} {:<12} {}  ({})",
                pr.number,
                pr.status.as_str(),
                pr.title,
                pr.author
            )?;
        }
        for badge in &repo.badges {
            writeln!(w, "  badge {:<7} {}", badge.id, badge.status.as_str())?;
        }
    }

    let active = store
        .ordered_events()
        .filter(|event| event.status.is_active())
        .count();
    output::pretty_rule(w)?;
    writeln!(
        w,
        "{active} active of {} events  (as of {})",
        store.event_count(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}
