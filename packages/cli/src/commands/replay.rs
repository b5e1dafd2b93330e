use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Deserialize;
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;
use vectra_common::{Clock, SystemClock};
use vectra_editor::model::Document;
use vectra_editor::{
    ClientMessage, Dispatcher, EditorConfig, MemoryStore, NackOutcome, OpKind, Operation,
    OperationAck, OperationBroadcast, OperationNack,
};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Document JSON file
    pub document: PathBuf,

    /// Edit script: a JSON array of steps
    pub script: PathBuf,

    /// Write the final document to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Attach a send function before the first step
    #[arg(long)]
    pub online: bool,
}

/// One line of an edit script.
///
/// ```json
/// [
///   { "step": "connect" },
///   { "step": "dispatch", "op": { "kind": "project.rename", "name": "Final" } },
///   { "step": "nack", "reason": "read only" },
///   { "step": "undo" }
/// ]
/// ```
///
/// `ack`/`nack` without an `operationId` answer the oldest submitted
/// operation still pending, the way a server answers in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Step {
    Dispatch {
        op: OpKind,
    },
    Undo,
    Redo,
    #[serde(rename_all = "camelCase")]
    Ack {
        #[serde(default)]
        operation_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Nack {
        #[serde(default)]
        operation_id: Option<String>,
        #[serde(default = "default_reason")]
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    Remote {
        operation: Operation,
        #[serde(default = "default_user")]
        user_id: String,
    },
    Connect,
    Disconnect,
    Clear,
}

fn default_reason() -> String {
    "rejected".to_string()
}

fn default_user() -> String {
    "remote".to_string()
}

/// Counters reported after a replay
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub dispatched: usize,
    pub undone: usize,
    pub redone: usize,
    pub acked: usize,
    pub rolled_back: usize,
    pub diverged: usize,
    pub remote_applied: usize,
    /// Steps that had no effect (empty history, unknown ids, ...)
    pub ignored: usize,
}

/// A dispatcher driven by script steps, standing in for both the UI and
/// the server
pub struct Replay {
    dispatcher: Dispatcher<MemoryStore>,
    sent: Rc<RefCell<Vec<ClientMessage>>>,
    server_seq: u64,
    clock: SystemClock,
    summary: ReplaySummary,
}

impl Replay {
    pub fn new(store: MemoryStore, config: EditorConfig) -> Self {
        Self {
            dispatcher: Dispatcher::with_config(store, config),
            sent: Rc::new(RefCell::new(Vec::new())),
            server_seq: 0,
            clock: SystemClock,
            summary: ReplaySummary::default(),
        }
    }

    pub fn run(&mut self, steps: &[Step]) {
        for step in steps {
            self.step(step);
        }
    }

    pub fn step(&mut self, step: &Step) {
        self.summary.steps += 1;
        let applied = match step {
            Step::Dispatch { op } => {
                let dispatched = self.dispatcher.dispatch(op.clone()).is_some();
                self.summary.dispatched += dispatched as usize;
                dispatched
            }
            Step::Undo => {
                let undone = self.dispatcher.undo();
                self.summary.undone += undone as usize;
                undone
            }
            Step::Redo => {
                let redone = self.dispatcher.redo();
                self.summary.redone += redone as usize;
                redone
            }
            Step::Ack { operation_id } => match self.target(operation_id) {
                Some(id) => {
                    self.server_seq += 1;
                    let acked = self.dispatcher.handle_ack(&OperationAck {
                        operation_id: id,
                        server_seq: self.server_seq,
                        server_timestamp: self.clock.now_millis(),
                    });
                    self.summary.acked += acked as usize;
                    acked
                }
                None => false,
            },
            Step::Nack {
                operation_id,
                reason,
            } => match self.target(operation_id) {
                Some(id) => {
                    let outcome = self.dispatcher.handle_nack(&OperationNack {
                        operation_id: id,
                        reason: reason.clone(),
                        conflicting_op: None,
                    });
                    match outcome {
                        NackOutcome::RolledBack => self.summary.rolled_back += 1,
                        NackOutcome::Diverged => self.summary.diverged += 1,
                        NackOutcome::Unknown => {}
                    }
                    outcome != NackOutcome::Unknown
                }
                None => false,
            },
            Step::Remote { operation, user_id } => {
                self.server_seq += 1;
                let applied = self.dispatcher.handle_remote_op(&OperationBroadcast {
                    operation: operation.clone(),
                    user_id: user_id.clone(),
                    server_seq: self.server_seq,
                });
                self.summary.remote_applied += applied as usize;
                applied
            }
            Step::Connect => {
                self.connect();
                true
            }
            Step::Disconnect => {
                self.dispatcher.set_send_function(None);
                true
            }
            Step::Clear => {
                self.dispatcher.clear_history();
                true
            }
        };

        if !applied {
            debug!(step = ?step, "Step had no effect");
            self.summary.ignored += 1;
        }
    }

    /// Attach a send function that records every submitted message
    pub fn connect(&mut self) {
        let sink = Rc::clone(&self.sent);
        self.dispatcher
            .set_send_function(Some(Box::new(move |message| sink.borrow_mut().push(message))));
    }

    /// Explicit id, or the oldest submitted operation still pending
    fn target(&self, explicit: &Option<String>) -> Option<String> {
        if let Some(id) = explicit {
            return Some(id.clone());
        }
        self.sent
            .borrow()
            .iter()
            .map(|message| &message.operation().id)
            .find(|id| self.dispatcher.is_pending(id))
            .cloned()
    }

    pub fn document(&self) -> Option<&Document> {
        self.dispatcher.document()
    }

    pub fn dispatcher(&self) -> &Dispatcher<MemoryStore> {
        &self.dispatcher
    }

    pub fn sent(&self) -> Vec<ClientMessage> {
        self.sent.borrow().clone()
    }

    pub fn summary(&self) -> &ReplaySummary {
        &self.summary
    }
}

pub fn replay(args: ReplayArgs, config: &Config) -> Result<()> {
    let store = MemoryStore::from_file(&args.document)
        .with_context(|| format!("Failed to read document {}", args.document.display()))?;
    let steps: Vec<Step> = vectra_common::read_json(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;

    eprintln!("▶️  {} {}", "Replaying".green().bold(), args.script.display());
    eprintln!("   Document: {}", args.document.display());
    eprintln!("   Steps:    {}", steps.len());
    eprintln!();

    let mut replay = Replay::new(store, config.editor.clone());
    if args.online {
        replay.connect();
    }
    replay.run(&steps);

    print_summary(&replay);

    let document = replay
        .document()
        .context("No document loaded after replay")?;
    let json = serde_json::to_string_pretty(document)?;

    match &args.out {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("   {} Wrote {}", "✓".green(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn print_summary(replay: &Replay) {
    let summary = replay.summary();
    let dispatcher = replay.dispatcher();

    eprintln!("   Dispatched:  {}", summary.dispatched);
    eprintln!("   Undone:      {}", summary.undone);
    eprintln!("   Redone:      {}", summary.redone);
    eprintln!("   Acked:       {}", summary.acked);
    eprintln!("   Remote:      {}", summary.remote_applied);
    eprintln!("   Submitted:   {}", replay.sent().len());
    eprintln!("   Pending:     {}", dispatcher.pending_count());

    if summary.rolled_back > 0 {
        eprintln!("   {} {}", "Rolled back:".yellow(), summary.rolled_back);
    }
    if summary.diverged > 0 {
        eprintln!("   {} {}", "Diverged:".red(), summary.diverged);
    }
    if summary.ignored > 0 {
        eprintln!("   {} {}", "No effect:".dimmed(), summary.ignored);
    }
    if dispatcher.needs_resync() {
        eprintln!(
            "   {} local document diverged from the server",
            "⚠️".yellow()
        );
    }

    let undo = dispatcher
        .history()
        .undo_description()
        .unwrap_or_else(|| "-".to_string());
    let redo = dispatcher
        .history()
        .redo_description()
        .unwrap_or_else(|| "-".to_string());
    eprintln!("   Next undo:   {}", undo);
    eprintln!("   Next redo:   {}", redo);
    eprintln!();
}
