use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use voxkeep::config::Config;
use voxkeep::identity::{IdentityService, MergeTarget};
use voxkeep::manifest::JobManifestStore;
use voxkeep::orchestrator::Orchestrator;
use voxkeep::watch_folder::WatchFolderIngester;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file (defaults to $VOXKEEP_CONFIG, then built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the Orchestrator and Watch-Folder Ingester as cooperative loops
    Run,
    /// Rebuild the job manifest from current filesystem state and exit
    Rebuild,
    /// Run a single Orchestrator scan cycle and exit
    Scan,
    /// Print the job manifest as JSON
    Status,
    /// Watch-folder pause/resume controls
    Watch {
        #[command(subcommand)]
        action: WatchAction,
    },
    /// Speaker identity operations
    Speaker {
        #[command(subcommand)]
        action: SpeakerAction,
    },
}

#[derive(Subcommand, Debug)]
enum WatchAction {
    Pause,
    Resume,
}

#[derive(Subcommand, Debug)]
enum SpeakerAction {
    /// Label a speaker within one transcript
    Label {
        stem: String,
        speaker_id: String,
        name: String,
    },
    /// Approve a pending candidate as a named profile
    Approve { speaker_id: String, name: String },
    /// Reject a pending candidate
    Reject { speaker_id: String },
    /// Merge two or more pending candidates into a speaker profile
    Merge {
        /// Candidate speaker ids to merge (at least two)
        #[arg(required = true, num_args = 2..)]
        candidate_ids: Vec<String>,
        /// Create a new profile with this name
        #[arg(long)]
        new_profile: Option<String>,
        /// Append to this existing profile instead
        #[arg(long)]
        existing_profile: Option<String>,
    },
    /// Rename a speaker profile
    Rename { old_name: String, new_name: String },
    /// Delete a speaker profile
    Delete { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voxkeep=info".into()),
        )
        .init();

    let args = Args::parse();
    let cfg = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Run => {
            info!("voxkeep starting: orchestrator + watch-folder ingester");
            let orchestrator = Orchestrator::new(cfg.clone());
            let ingester = WatchFolderIngester::new(cfg);
            tokio::join!(orchestrator.run_forever(), ingester.run_forever());
        }
        Command::Rebuild => {
            let store = JobManifestStore::rebuild(&cfg);
            store.save()?;
            println!("rebuilt manifest with {} entries", store.get_all().len());
        }
        Command::Scan => {
            let mut orchestrator = Orchestrator::new(cfg);
            let mutated = orchestrator.scan_once()?;
            println!("scan complete (mutated={mutated})");
        }
        Command::Status => {
            let store = JobManifestStore::load(cfg.jobs_manifest_path());
            println!("{}", serde_json::to_string_pretty(store.get_all())?);
        }
        Command::Watch { action } => {
            let ingester = WatchFolderIngester::new(cfg);
            match action {
                WatchAction::Pause => {
                    ingester.set_active(false)?;
                    println!("watch-folder ingestion paused");
                }
                WatchAction::Resume => {
                    ingester.set_active(true)?;
                    println!("watch-folder ingestion resumed");
                }
            }
        }
        Command::Speaker { action } => {
            let identity = IdentityService::new(cfg);
            match action {
                SpeakerAction::Label { stem, speaker_id, name } => {
                    identity.label_speaker(&stem, &speaker_id, &name).await?;
                    println!("labeled {speaker_id} as {name} in {stem}");
                }
                SpeakerAction::Approve { speaker_id, name } => {
                    identity.approve_candidate(&speaker_id, &name).await?;
                    println!("approved {speaker_id} as profile {name}");
                }
                SpeakerAction::Reject { speaker_id } => {
                    identity.reject_candidate(&speaker_id)?;
                    println!("rejected candidate {speaker_id}");
                }
                SpeakerAction::Merge { candidate_ids, new_profile, existing_profile } => {
                    let target = match (new_profile, existing_profile) {
                        (Some(name), None) => MergeTarget::New { name },
                        (None, Some(profile_name)) => MergeTarget::Existing { profile_name },
                        _ => anyhow::bail!("specify exactly one of --new-profile or --existing-profile"),
                    };
                    let ids: Vec<&str> = candidate_ids.iter().map(String::as_str).collect();
                    identity.merge_candidates(&ids, target)?;
                    println!("merged {} candidates", candidate_ids.len());
                }
                SpeakerAction::Rename { old_name, new_name } => {
                    identity.rename_profile(&old_name, &new_name)?;
                    println!("renamed profile {old_name} -> {new_name}");
                }
                SpeakerAction::Delete { name } => {
                    identity.delete_profile(&name)?;
                    println!("deleted profile {name}");
                }
            }
        }
    }

    Ok(())
}
