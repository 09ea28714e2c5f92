//! `pollsys`: operator CLI for a polling ledger kept in a snapshot file.
//!
//! Each invocation locks the data file, loads the snapshot, runs one command
//! as a single transaction and, if the command changed anything, writes the
//! snapshot back before releasing the lock.

mod config;
mod lock;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use pollsys_ledger::{LedgerSnapshot, PollLedger};
use pollsys_store::UserSlot;
use pollsys_store_memory::MemoryStore;
use pollsys_types::{Clock, Identity, PollDraft, PollId, SystemClock, Timestamp};
use pollsys_utils::{format_remaining, init_logging, LogFormat};
use serde_json::json;

use crate::config::DaemonConfig;
use crate::lock::DataLock;

#[derive(Parser)]
#[command(name = "pollsys", about = "Permissioned polling ledger")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "POLLSYS_CONFIG")]
    config: Option<PathBuf>,

    /// Snapshot file holding the ledger state.
    #[arg(long, env = "POLLSYS_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "POLLSYS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "POLLSYS_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Create an empty ledger owned by `admin`.
    Init {
        #[arg(long)]
        admin: Identity,
    },
    /// Activate a user.
    AddUser {
        #[arg(long)]
        caller: Identity,
        #[arg(long)]
        identity: Identity,
    },
    /// Deactivate a user.
    RemoveUser {
        #[arg(long)]
        caller: Identity,
        #[arg(long)]
        identity: Identity,
    },
    /// Create a poll.
    CreatePoll {
        #[arg(long)]
        caller: Identity,
        #[arg(long)]
        consensus_rate: u32,
        #[arg(long)]
        quorum_rate: u32,
        /// Deadline as Unix seconds.
        #[arg(long, conflicts_with = "duration_secs", required_unless_present = "duration_secs")]
        available_until: Option<u64>,
        /// Deadline relative to now.
        #[arg(long)]
        duration_secs: Option<u64>,
        #[arg(long)]
        question: String,
        /// One choice; repeat for each.
        #[arg(long = "choice")]
        choices: Vec<String>,
    },
    /// Cast a vote.
    Vote {
        #[arg(long)]
        caller: Identity,
        #[arg(long)]
        poll: u64,
        #[arg(long)]
        choice: usize,
    },
    /// Print a poll with its tally.
    ShowPoll {
        #[arg(long)]
        poll: u64,
        /// Also report whether this identity has voted.
        #[arg(long)]
        voter: Option<Identity>,
    },
    /// List the user collection, tombstones included.
    Users,
    /// Print a summary of the ledger.
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    let config = DaemonConfig {
        data_file: cli.data_file.unwrap_or(file_config.data_file),
        log_level: cli.log_level.unwrap_or(file_config.log_level),
        log_format: cli.log_format.unwrap_or(file_config.log_format),
    };
    init_logging(config.log_format, &config.log_level);

    let output = invoke(&config.data_file, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Run one command against `data_file` while holding its lock, so that
/// concurrent invocations apply one after another.
fn invoke(data_file: &Path, command: Command) -> anyhow::Result<serde_json::Value> {
    let _lock = DataLock::acquire(data_file)?;

    if let Command::Init { admin } = command {
        return init(data_file, admin);
    }

    let snapshot = LedgerSnapshot::read_from(data_file).with_context(|| {
        format!(
            "loading {} (run `pollsys init` first?)",
            data_file.display()
        )
    })?;
    let ledger = PollLedger::restore(snapshot, SystemClock)?;

    let (output, mutated) = run(&ledger, command)?;
    if mutated {
        save(&ledger, data_file)?;
    }
    Ok(output)
}

/// Caller must hold the [`DataLock`] for `path`.
fn init(path: &Path, admin: Identity) -> anyhow::Result<serde_json::Value> {
    if path.exists() {
        bail!("{} already exists; refusing to overwrite", path.display());
    }
    let ledger = PollLedger::new(admin, MemoryStore::new(), SystemClock)?;
    save(&ledger, path)?;
    tracing::info!("initialised ledger at {} for {admin}", path.display());
    Ok(json!({ "administrator": admin, "data_file": path }))
}

/// Write the snapshot next to the target and rename it into place.
fn save<C: Clock>(ledger: &PollLedger<MemoryStore, C>, path: &Path) -> anyhow::Result<()> {
    let snapshot = ledger.snapshot()?;
    let staging = path.with_extension("tmp");
    snapshot.write_to(&staging)?;
    std::fs::rename(&staging, path)
        .with_context(|| format!("replacing {}", path.display()))?;
    tracing::debug!("saved snapshot {}", snapshot.hash_hex());
    Ok(())
}

/// Run one command; returns its JSON output and whether state changed.
fn run<C: Clock>(
    ledger: &PollLedger<MemoryStore, C>,
    command: Command,
) -> anyhow::Result<(serde_json::Value, bool)> {
    let result = match command {
        Command::Init { .. } => bail!("ledger already initialised"),
        Command::AddUser { caller, identity } => {
            ledger.add_user(&caller, &identity)?;
            (json!({ "identity": identity, "active": true }), true)
        }
        Command::RemoveUser { caller, identity } => {
            ledger.remove_user(&caller, &identity)?;
            (json!({ "identity": identity, "active": false }), true)
        }
        Command::CreatePoll {
            caller,
            consensus_rate,
            quorum_rate,
            available_until,
            duration_secs,
            question,
            choices,
        } => {
            let now = ledger.clock().now();
            let available_until = match (available_until, duration_secs) {
                (Some(at), _) => Timestamp::new(at),
                (None, Some(secs)) => now.plus_secs(secs),
                (None, None) => bail!("either --available-until or --duration-secs is required"),
            };
            let draft = PollDraft::new(consensus_rate, quorum_rate, available_until, question, choices);
            let id = ledger.create_poll(&caller, draft)?;
            (json!({ "poll": id.as_u64() }), true)
        }
        Command::Vote {
            caller,
            poll,
            choice,
        } => {
            let poll = PollId::new(poll);
            ledger.vote(&caller, poll, choice)?;
            let counts = ledger.get_votes_count(poll)?;
            (json!({ "poll": poll.as_u64(), "choice": choice, "counts": counts }), true)
        }
        Command::ShowPoll { poll, voter } => {
            let id = PollId::new(poll);
            let record = ledger.get_poll(id)?;
            let now = ledger.clock().now();
            let mut output = json!({
                "poll": id.as_u64(),
                "question": record.question,
                "choices": record.choices,
                "counts": ledger.get_votes_count(id)?,
                "consensus_rate": record.consensus_rate,
                "quorum_rate": record.quorum_rate,
                "created_at": record.created_at.as_secs(),
                "available_until": record.available_until.as_secs(),
                "status": record.status(now).as_str(),
                "closes_in": format_remaining(record.available_until.secs_until(now)),
            });
            if let Some(voter) = voter {
                output["voted"] = json!(ledger.is_user_voted(id, &voter)?);
            }
            (output, false)
        }
        Command::Users => {
            let mut slots = Vec::new();
            for index in 0..ledger.slot_count()? {
                let entry = match ledger.user_slot(index)? {
                    Some(UserSlot::Live(identity)) => json!({ "slot": index, "identity": identity }),
                    Some(UserSlot::Tombstone) => json!({ "slot": index, "removed": true }),
                    None => break,
                };
                slots.push(entry);
            }
            (json!({ "active": ledger.active_count()?, "slots": slots }), false)
        }
        Command::Status => (
            json!({
                "administrator": ledger.administrator(),
                "active_users": ledger.active_count()?,
                "user_slots": ledger.slot_count()?,
                "polls": ledger.poll_count()?,
            }),
            false,
        ),
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollsys_nullables::{NullClock, NullIdentities};

    fn ledger() -> PollLedger<MemoryStore, NullClock> {
        PollLedger::new(NullIdentities::admin(), MemoryStore::new(), NullClock::new(1_000)).unwrap()
    }

    #[test]
    fn test_cli_parses_create_poll() {
        let admin = NullIdentities::admin().to_string();
        let cli = Cli::try_parse_from([
            "pollsys",
            "create-poll",
            "--caller",
            admin.as_str(),
            "--consensus-rate",
            "10000",
            "--quorum-rate",
            "5000",
            "--duration-secs",
            "3600",
            "--question",
            "Season 19/20 formation?",
            "--choice",
            "4-4-2",
            "--choice",
            "4-3-3",
        ])
        .unwrap();
        match cli.command {
            Command::CreatePoll { choices, duration_secs, .. } => {
                assert_eq!(choices, vec!["4-4-2", "4-3-3"]);
                assert_eq!(duration_secs, Some(3600));
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_identity() {
        assert!(Cli::try_parse_from(["pollsys", "init", "--admin", "0x12"]).is_err());
    }

    #[test]
    fn test_run_command_sequence() {
        let ledger = ledger();
        let admin = NullIdentities::admin();
        let user = NullIdentities::nth(1);

        let (_, mutated) = run(&ledger, Command::AddUser { caller: admin, identity: user }).unwrap();
        assert!(mutated);
        let (out, _) = run(
            &ledger,
            Command::CreatePoll {
                caller: admin,
                consensus_rate: 1,
                quorum_rate: 1,
                available_until: None,
                duration_secs: Some(60),
                question: "question".into(),
                choices: vec!["a".into(), "b".into()],
            },
        )
        .unwrap();
        assert_eq!(out["poll"], 0);

        let (out, _) = run(&ledger, Command::Vote { caller: user, poll: 0, choice: 1 }).unwrap();
        assert_eq!(out["counts"], json!([0, 1]));

        let (out, mutated) = run(&ledger, Command::ShowPoll { poll: 0, voter: Some(user) }).unwrap();
        assert!(!mutated);
        assert_eq!(out["status"], "open");
        assert_eq!(out["closes_in"], "1m 0s");
        assert_eq!(out["voted"], true);
    }

    #[test]
    fn test_run_surfaces_ledger_errors() {
        let ledger = ledger();
        let user = NullIdentities::nth(1);
        assert!(run(&ledger, Command::Vote { caller: user, poll: 0, choice: 0 }).is_err());
        assert!(run(&ledger, Command::ShowPoll { poll: 3, voter: None }).is_err());
    }

    #[test]
    fn test_init_and_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.snapshot");
        let admin = NullIdentities::admin();
        invoke(&path, Command::Init { admin }).unwrap();
        assert!(invoke(&path, Command::Init { admin }).is_err());

        let snapshot = LedgerSnapshot::read_from(&path).unwrap();
        let ledger = PollLedger::restore(snapshot, NullClock::new(1_000)).unwrap();
        run(
            &ledger,
            Command::AddUser {
                caller: NullIdentities::admin(),
                identity: NullIdentities::nth(4),
            },
        )
        .unwrap();
        save(&ledger, &path).unwrap();

        let reloaded =
            PollLedger::restore(LedgerSnapshot::read_from(&path).unwrap(), NullClock::new(1_000)).unwrap();
        assert!(reloaded.is_active(&NullIdentities::nth(4)).unwrap());
    }

    #[test]
    fn test_concurrent_invocations_keep_every_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.snapshot");
        let admin = NullIdentities::admin();
        invoke(&path, Command::Init { admin }).unwrap();

        let handles: Vec<_> = NullIdentities::take(8)
            .into_iter()
            .map(|identity| {
                let path = path.clone();
                std::thread::spawn(move || {
                    invoke(&path, Command::AddUser { caller: admin, identity })
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let reloaded =
            PollLedger::restore(LedgerSnapshot::read_from(&path).unwrap(), NullClock::new(1_000)).unwrap();
        assert_eq!(reloaded.active_users().unwrap().len(), 8);
    }

    #[test]
    fn test_concurrent_init_succeeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.snapshot");

        let handles: Vec<_> = (0..4)
            .map(|n| {
                let path = path.clone();
                std::thread::spawn(move || {
                    invoke(&path, Command::Init { admin: NullIdentities::nth(n) }).is_ok()
                })
            })
            .collect();
        let created = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(created, 1);
    }
}
