//! Executes a task script against an in-process registry.

use nomvote_nullables::NullClock;
use nomvote_types::{Address, Clock, Network, SystemClock, Timestamp};
use nomvote_utils::{format_duration, StatsCounter};
use nomvote_voting::{VoteEvent, VoteInstance, VoteRegistry};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::script::{Script, Task, TaskKind};
use crate::CliError;

const EXECUTED: &str = "executed";
const FAILED: &str = "failed";

/// How task results are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per task.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    pub format: OutputFormat,
    /// Report failed tasks and continue instead of stopping.
    pub keep_going: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: u64,
    pub failed: u64,
}

/// Result of one successful task.
#[derive(Debug)]
enum Outcome {
    Event(VoteEvent),
    Participants(Vec<Address>),
    Winner(Address),
    IsActive(bool),
    TimeRemaining(u64),
    Status(Box<VoteInstance>),
    Advanced(Timestamp),
}

pub struct Runner {
    registry: VoteRegistry,
    owner: Address,
    network: Network,
    /// Present only on networks that allow time travel.
    manual_clock: Option<Arc<NullClock>>,
    options: RunOptions,
    stats: StatsCounter,
}

impl Runner {
    /// Build a runner with a fresh registry.
    ///
    /// Local networks get a hand-advanced clock starting at the current time;
    /// every other network reads the system clock.
    pub fn new(config: &CliConfig, options: RunOptions) -> Result<Self, CliError> {
        if config.network.allows_time_travel() {
            Self::with_clock(config, options, Arc::new(NullClock::starting_now()))
        } else {
            Self::build(config, options, Arc::new(SystemClock), None)
        }
    }

    /// Build a runner around a caller-controlled clock.
    pub fn with_clock(
        config: &CliConfig,
        options: RunOptions,
        clock: Arc<NullClock>,
    ) -> Result<Self, CliError> {
        Self::build(config, options, clock.clone(), Some(clock))
    }

    fn build(
        config: &CliConfig,
        options: RunOptions,
        clock: Arc<dyn Clock>,
        manual_clock: Option<Arc<NullClock>>,
    ) -> Result<Self, CliError> {
        let registry = VoteRegistry::new(config.registry_config(), clock)?;
        Ok(Self {
            registry,
            owner: config.owner,
            network: config.network,
            manual_clock,
            options,
            stats: StatsCounter::new(&[EXECUTED, FAILED]),
        })
    }

    pub fn registry(&self) -> &VoteRegistry {
        &self.registry
    }

    /// Run every task in order, writing one line of output per task.
    ///
    /// The summary counts every task this runner has executed so far.
    pub fn run<W: Write>(&self, script: &Script, out: &mut W) -> Result<RunSummary, CliError> {
        if script.advances_time() && self.manual_clock.is_none() {
            return Err(self.time_travel_refused());
        }
        info!(
            network = %self.network,
            owner = %self.owner,
            tasks = script.tasks.len(),
            "running script"
        );

        for (index, task) in script.tasks.iter().enumerate() {
            match self.execute(index, task) {
                Ok(outcome) => {
                    self.stats.increment(EXECUTED);
                    writeln!(out, "{}", self.render(&task.kind, &outcome)?)?;
                }
                Err(err) if self.options.keep_going => {
                    self.stats.increment(FAILED);
                    let message = match &err {
                        CliError::Task { source, .. } => source.to_string(),
                        other => other.to_string(),
                    };
                    warn!(index, task = task.kind.name(), "task failed: {message}");
                    match self.options.format {
                        OutputFormat::Text => writeln!(out, "error: {message}")?,
                        OutputFormat::Json => writeln!(
                            out,
                            "{}",
                            json!({ "task": task.kind.name(), "error": message })
                        )?,
                    }
                }
                Err(err) => {
                    self.stats.increment(FAILED);
                    return Err(err);
                }
            }
        }

        let summary = RunSummary {
            executed: self.stats.get(EXECUTED),
            failed: self.stats.get(FAILED),
        };
        info!(
            executed = summary.executed,
            failed = summary.failed,
            "script finished"
        );
        Ok(summary)
    }

    fn execute(&self, index: usize, task: &Task) -> Result<Outcome, CliError> {
        let caller = task.from.unwrap_or(self.owner);
        let registry = &self.registry;
        let result = match &task.kind {
            TaskKind::Advance { secs } => return self.advance(*secs),
            TaskKind::AddVoting => registry.create(&caller).map(Outcome::Event),
            TaskKind::Vote {
                voteid,
                nominee,
                fee,
            } => registry
                .cast_vote(&caller, *voteid, nominee, *fee)
                .map(Outcome::Event),
            TaskKind::Finish { voteid } => registry.conclude(&caller, *voteid).map(Outcome::Event),
            TaskKind::Withdraw { voteid } => registry.withdraw(&caller, *voteid).map(Outcome::Event),
            TaskKind::GetParticipants { voteid } => {
                registry.participants(*voteid).map(Outcome::Participants)
            }
            TaskKind::GetWinner { voteid } => registry.winner(*voteid).map(Outcome::Winner),
            TaskKind::GetIsActive { voteid } => registry.is_active(*voteid).map(Outcome::IsActive),
            TaskKind::GetTimeRemaining { voteid } => {
                registry.time_remaining(*voteid).map(Outcome::TimeRemaining)
            }
            TaskKind::Status { voteid } => registry
                .snapshot(*voteid)
                .map(|vote| Outcome::Status(Box::new(vote))),
        };
        result.map_err(|source| CliError::Task {
            index,
            task: task.kind.name(),
            source,
        })
    }

    fn advance(&self, secs: u64) -> Result<Outcome, CliError> {
        let clock = self
            .manual_clock
            .as_ref()
            .ok_or_else(|| self.time_travel_refused())?;
        clock.advance(secs);
        info!("clock advanced by {}", format_duration(secs));
        Ok(Outcome::Advanced(clock.now()))
    }

    fn time_travel_refused(&self) -> CliError {
        CliError::Script(format!(
            "advance tasks are only allowed on the local network, not {}",
            self.network
        ))
    }

    fn render(&self, kind: &TaskKind, outcome: &Outcome) -> Result<String, CliError> {
        match self.options.format {
            OutputFormat::Text => Ok(render_text(outcome)?),
            OutputFormat::Json => render_json(kind, outcome),
        }
    }
}

fn render_text(outcome: &Outcome) -> Result<String, serde_json::Error> {
    let line = match outcome {
        Outcome::Event(VoteEvent::VoteIsCreated { vote_id }) => format!("voteId is {vote_id}"),
        Outcome::Event(VoteEvent::VoterHasVoted {
            vote_id,
            voter,
            nominee,
        }) => format!("voteId is {vote_id}, voter is {voter}, nominee is {nominee}"),
        Outcome::Event(VoteEvent::VoteHasEnded {
            vote_id,
            winner,
            prize,
        }) => format!(
            "voteId is {vote_id}, winner is {winner}, prize is {}",
            prize.raw()
        ),
        Outcome::Event(VoteEvent::Withdrawal {
            vote_id,
            owner,
            commission,
        }) => format!(
            "voteId is {vote_id}, owner is {owner}, commission is {}",
            commission.raw()
        ),
        Outcome::Participants(participants) => {
            let joined: Vec<String> = participants.iter().map(ToString::to_string).collect();
            format!("participants are: {}", joined.join(","))
        }
        Outcome::Winner(winner) => format!("winner is: {winner}"),
        Outcome::IsActive(active) => format!("is active: {active}"),
        Outcome::TimeRemaining(secs) => format!("time remaining: {secs}"),
        Outcome::Status(vote) => serde_json::to_string_pretty(vote)?,
        Outcome::Advanced(now) => format!("time is now {}", now.as_secs()),
    };
    Ok(line)
}

fn render_json(kind: &TaskKind, outcome: &Outcome) -> Result<String, CliError> {
    let value = match outcome {
        Outcome::Event(event) => serde_json::to_value(event)?,
        Outcome::Participants(participants) => query(kind, json!(participants)),
        Outcome::Winner(winner) => query(kind, json!(winner)),
        Outcome::IsActive(active) => query(kind, json!(active)),
        Outcome::TimeRemaining(secs) => query(kind, json!(secs)),
        Outcome::Status(vote) => query(kind, serde_json::to_value(vote)?),
        Outcome::Advanced(now) => query(kind, json!(now.as_secs())),
    };
    Ok(value.to_string())
}

fn query(kind: &TaskKind, result: serde_json::Value) -> serde_json::Value {
    json!({ "query": kind.name(), "result": result })
}
