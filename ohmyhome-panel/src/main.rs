use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ohmyhome::{
    Authority, CommitOutcome, SyncConfig, SyncController,
    authority::{HttpAuthority, HttpConfig, MockAuthority},
    common::Setting,
    store::FileStore,
};

#[derive(Parser)]
#[command(about = "Inspect and change OhMyHome settings")]
struct Args {
    /// Base URL of the device-control service
    #[arg(long, env = "OHMYHOME_AUTHORITY", default_value = "http://127.0.0.1:8000")]
    authority: String,

    /// Settings file, created on first change
    #[arg(long, env = "OHMYHOME_STORE", default_value = "ohmyhome-settings.json")]
    store: PathBuf,

    /// Simulate the device-control service
    #[arg(long, env = "OHMYHOME_MOCK")]
    mock: bool,

    /// Roll back changes the service has not confirmed within this many milliseconds
    #[arg(long, env = "OHMYHOME_COMMIT_TIMEOUT_MS")]
    commit_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Print every setting
    List,
    /// Print one setting
    Get { setting: Setting },
    /// Change a setting, e.g. `set mode manual_only`
    Set { setting: Setting, value: String },
    /// Flip a two-valued setting
    Toggle { setting: Setting },
    /// Restore a setting's default
    Reset { setting: Setting },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ohmyhome::log::init();

    let args = Args::parse();

    let store = open_store(&args.store);
    let config = SyncConfig {
        commit_timeout: args.commit_timeout_ms.map(Duration::from_millis),
    };

    if args.mock {
        run(SyncController::new(store, MockAuthority::default(), config), args.command).await
    } else {
        let authority = HttpAuthority::new(HttpConfig {
            base_url: args.authority,
            ..Default::default()
        })
        .context("failed to set up http client")?;

        run(SyncController::new(store, authority, config), args.command).await
    }
}

fn open_store(path: &Path) -> FileStore {
    match FileStore::open(path) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!("Cannot read {}, starting from defaults: {e}", path.display());
            FileStore::empty(path)
        }
    }
}

async fn run<A: Authority>(
    controller: SyncController<FileStore, A>,
    command: Command,
) -> anyhow::Result<()> {
    controller.on_sync_error(|failure| eprintln!("{failure}"));

    let (setting, commit) = match command {
        Command::List => {
            for (setting, value) in controller.snapshot() {
                println!("{setting} = {value}");
            }
            return Ok(());
        }
        Command::Get { setting } => {
            println!("{}", controller.get(setting));
            return Ok(());
        }
        Command::Set { setting, value } => {
            let value = setting.parse_value(&value)?;
            (setting, controller.apply(setting, value)?)
        }
        Command::Toggle { setting } => (setting, controller.toggle(setting)?),
        Command::Reset { setting } => (setting, controller.reset(setting)?),
    };

    if !controller.store_available() {
        eprintln!("warning: settings file is not writable, the change will be lost on exit");
    }

    match commit.outcome().await {
        CommitOutcome::LocalOnly | CommitOutcome::Confirmed => {
            println!("{setting} = {}", controller.get(setting));
            Ok(())
        }
        CommitOutcome::RolledBack { .. } => {
            anyhow::bail!("{setting} rolled back to {}", controller.get(setting))
        }
        outcome @ (CommitOutcome::Superseded | CommitOutcome::Abandoned) => {
            anyhow::bail!("commit of {setting} did not finish: {outcome:?}")
        }
    }
}
