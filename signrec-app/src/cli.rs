//! Command line over the signer repository and recording store.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use signrec_protocol::recording::Meta;
use signrec_protocol::signer::{Signer, SignerId};
use signrec_store::{RecordingStore, SignerRepository};

use crate::settings::Settings;

/// Manage signers and their gesture recordings.
#[derive(Debug, Parser)]
#[command(name = "signrec", about = "Sign-language gesture recording store")]
pub struct Cli {
    /// Override the signer base directory from settings.
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write settings and create the base directory.
    Init {
        /// Capturing device/user identifier.
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Signer management.
    #[command(subcommand)]
    Signers(SignersCommand),

    /// List the sessions recorded for a signer.
    Sessions { signer_id: String },

    /// List gesture groups for a signer.
    Gestures {
        signer_id: String,
        /// Restrict to one session.
        #[arg(long)]
        session: Option<String>,
    },

    /// Store a CSV capture in a signer's directory.
    Save {
        signer_id: String,
        /// CSV payload to store.
        source: PathBuf,
        /// Build the recording name from these fields instead of using the
        /// source file name.
        #[arg(long, requires_all = ["rep", "session"])]
        gesture: Option<String>,
        #[arg(long)]
        rep: Option<String>,
        #[arg(long)]
        session: Option<String>,
    },

    /// Delete every recording of one session.
    DeleteSession { signer_id: String, session: String },

    /// Delete a gesture's recordings, in one session or all of them.
    DeleteGesture {
        signer_id: String,
        gesture: String,
        #[arg(long)]
        session: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SignersCommand {
    /// List signers.
    List,
    /// Create a signer.
    Create { name: String },
    /// Delete a signer and all its recordings.
    Delete { signer_id: String },
}

/// Execute a parsed command line against the configured store.
pub fn run(cli: Cli, mut settings: Settings) -> Result<()> {
    if let Some(base_dir) = cli.base_dir {
        settings.base_dir = base_dir;
    }
    let signers = SignerRepository::new(&settings.base_dir);
    let recordings = RecordingStore::new(&settings.base_dir);

    match cli.command {
        Command::Init { user_id } => {
            if let Some(user_id) = user_id {
                settings.user_id = user_id;
            }
            signers.ensure_base_dir()?;
            let path = settings.save()?;
            println!("settings written to {}", path.display());
            println!("signers stored under {}", settings.base_dir.display());
        }
        Command::Signers(SignersCommand::List) => {
            for signer in signers.list() {
                println!("{}\t{}", signer.id, signer.name);
            }
        }
        Command::Signers(SignersCommand::Create { name }) => {
            let signer = signers.create(&name)?;
            println!("{}", signer.id);
        }
        Command::Signers(SignersCommand::Delete { signer_id }) => {
            let signer = find_signer(&signers, &signer_id)?;
            signers.delete(&signer)?;
            println!("deleted {}", signer.name);
        }
        Command::Sessions { signer_id } => {
            let signer = find_signer(&signers, &signer_id)?;
            for session in recordings.list_sessions(&signer)? {
                println!("{session}");
            }
        }
        Command::Gestures { signer_id, session } => {
            let signer = find_signer(&signers, &signer_id)?;
            for group in recordings.list_gesture_groups(&signer, session.as_deref())? {
                println!("{}\t{}", group.gesture, group.count());
            }
        }
        Command::Save {
            signer_id,
            source,
            gesture,
            rep,
            session,
        } => {
            let signer = find_signer(&signers, &signer_id)?;
            let file_name = match (gesture, rep, session) {
                (Some(gesture), Some(rep), Some(session)) => Meta {
                    user: settings.user_id.clone(),
                    gesture,
                    rep,
                    session,
                    timestamp: capture_timestamp(),
                }
                .file_name(),
                _ => source_file_name(&source)?,
            };
            if Meta::decode(&file_name).is_none() {
                tracing::warn!(file_name = %file_name, "saved name will not appear in listings");
            }
            let bytes = std::fs::read(&source)
                .with_context(|| format!("failed to read {}", source.display()))?;
            let path = recordings.save(&bytes, &file_name, &signer)?;
            println!("{}", path.display());
        }
        Command::DeleteSession { signer_id, session } => {
            let signer = find_signer(&signers, &signer_id)?;
            let removed = recordings.delete_session(&signer, &session)?;
            println!("removed {removed} recordings");
        }
        Command::DeleteGesture {
            signer_id,
            gesture,
            session,
        } => {
            let signer = find_signer(&signers, &signer_id)?;
            let removed = match session {
                Some(session) => recordings.delete_gesture_in_session(&signer, &gesture, &session)?,
                None => recordings.delete_gesture_all_sessions(&signer, &gesture)?,
            };
            println!("removed {removed} recordings");
        }
    }
    Ok(())
}

fn find_signer(signers: &SignerRepository, signer_id: &str) -> Result<Signer> {
    match signers.find(&SignerId(signer_id.to_string())) {
        Some(signer) => Ok(signer),
        None => bail!(
            "no signer with id {signer_id} under {}",
            signers.base_dir().display()
        ),
    }
}

fn source_file_name(source: &Path) -> Result<String> {
    source
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("no usable file name in {}", source.display()))
}

/// Seconds since the epoch, used as the free-form timestamp token.
fn capture_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        .to_string()
}
