use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use savepass::common::config::{self, AppConfig, ConfigOverrides};
use savepass::output::{self, SpinnerStatus};
use savepass::paths;
use savepass::remote::ftp::FtpConnector;
use savepass::sync::engine::{self, ConnectionProfile, SyncOutcome, SyncRequest};
use savepass::sync::policy::SyncAction;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "savepass")]
#[command(about = "Pass the controller: sync a Dolphin save state with the group's server", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload the local save state if it is newer than the server copy
    Push {
        #[arg(long, help = "Channel to file the save state under")]
        channel: Option<u32>,
        #[arg(long, help = "Game title or game id")]
        game: Option<String>,
    },
    /// Download the server save state if it is newer than the local copy
    Pull {
        #[arg(long, help = "Channel to file the save state under")]
        channel: Option<u32>,
        #[arg(long, help = "Game title or game id")]
        game: Option<String>,
    },
    /// List the channels that exist on the server
    Channels,
    /// Create a channel on the server and select it
    AddChannel {
        #[arg(help = "Channel number, e.g. 6")]
        number: u32,
    },
    /// Show or update stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings (password redacted)
    Show,
    /// Print the config file location
    Path,
    /// Update settings and write them back to the config file
    Set {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, help = "Game title or game id")]
        game: Option<String>,
        #[arg(long)]
        channel: Option<u32>,
        #[arg(long, help = "Override the save-state directory")]
        save_dir: Option<PathBuf>,
        #[arg(long = "host", help = "Server host (repeat to set the failover order)")]
        hosts: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Push { channel, game } => {
            let config = overridden_config(channel, game)?;
            run_push(config).await
        }
        Commands::Pull { channel, game } => {
            let config = overridden_config(channel, game)?;
            run_pull(config).await
        }
        Commands::Channels => run_channels(config::load_config()?).await,
        Commands::AddChannel { number } => run_add_channel(config::load_config()?, number).await,
        Commands::Config { action } => run_config(action),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("savepass=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn overridden_config(channel: Option<u32>, game: Option<String>) -> Result<AppConfig> {
    let config = config::load_config()?;
    Ok(config::apply_overrides(config, &ConfigOverrides { channel, game }))
}

fn connection_profile(config: &AppConfig) -> Result<ConnectionProfile> {
    Ok(ConnectionProfile {
        endpoints: config.endpoints()?,
        credentials: config.credentials(),
        base_dir: config.remote.base_dir.clone(),
        dial_timeout: config.dial_timeout(),
    })
}

fn sync_request(config: &AppConfig) -> Result<SyncRequest> {
    let local_path = paths::save_state_path(&config.game_id, config.save_dir.as_deref())?;
    Ok(SyncRequest {
        profile: connection_profile(config)?,
        channel: config.channel,
        file_name: paths::artifact_file_name(&config.game_id),
        local_path,
    })
}

async fn run_push(config: AppConfig) -> Result<()> {
    let request = sync_request(&config)?;
    let outcome = tokio::task::spawn_blocking(move || {
        let status = SpinnerStatus::new();
        engine::push_artifact(&FtpConnector, &request, &status)
    })
    .await??;

    report_push(&outcome);
    Ok(())
}

async fn run_pull(config: AppConfig) -> Result<()> {
    let request = sync_request(&config)?;
    let outcome = tokio::task::spawn_blocking(move || {
        let status = SpinnerStatus::new();
        engine::pull_artifact(&FtpConnector, &request, &status)
    })
    .await??;

    report_pull(&outcome);
    Ok(())
}

async fn run_channels(config: AppConfig) -> Result<()> {
    let profile = connection_profile(&config)?;
    let channels = tokio::task::spawn_blocking(move || {
        let status = SpinnerStatus::new();
        engine::list_channels(&FtpConnector, &profile, &status)
    })
    .await??;

    println!("Channels on the server:");
    for channel in channels {
        if channel == config.channel {
            println!("  {} Channel {} (selected)", style("*").cyan().bold(), channel);
        } else {
            println!("    Channel {channel}");
        }
    }
    Ok(())
}

async fn run_add_channel(config: AppConfig, number: u32) -> Result<()> {
    let profile = connection_profile(&config)?;
    tokio::task::spawn_blocking(move || {
        let status = SpinnerStatus::new();
        engine::create_channel(&FtpConnector, &profile, number, &status)
    })
    .await??;

    let mut updated = config;
    updated.channel = number;
    config::save_config(&updated)?;
    output::success(&format!("Channel {number} created and selected"));
    Ok(())
}

fn run_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = config::load_config()?;
            println!("username:  {}", config.username);
            println!(
                "password:  {}",
                if config.password.is_empty() {
                    "(not set)"
                } else {
                    "(set)"
                }
            );
            println!("game_id:   {}", config.game_id);
            println!("channel:   {}", config.channel);
            if let Some(dir) = &config.save_dir {
                println!("save_dir:  {}", dir.display());
            }
            println!("hosts:     {}", config.remote.hosts.join(", "));
            println!("base_dir:  {}", config.remote.base_dir);
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
        ConfigAction::Set {
            username,
            password,
            game,
            channel,
            save_dir,
            hosts,
        } => {
            let mut config = config::load_config()?;
            if let Some(username) = username {
                config.username = username;
            }
            if let Some(password) = password {
                config.password = password;
            }
            if let Some(game) = game {
                config.game_id = config::resolve_game_id(&game);
            }
            if let Some(channel) = channel {
                config.channel = channel;
            }
            if let Some(save_dir) = save_dir {
                config.save_dir = Some(save_dir);
            }
            if !hosts.is_empty() {
                config.remote.hosts = hosts;
            }
            config.validate()?;
            config::save_config(&config)?;
            output::success("Settings saved");
            Ok(())
        }
    }
}

fn report_push(outcome: &SyncOutcome) {
    match outcome.decision.action {
        SyncAction::Push => {
            output::success(&format!("Save state uploaded to {}", outcome.endpoint));
        }
        SyncAction::SkipLocalNotNewer => {
            output::skipped("Upload skipped: the local save state is not newer than the server copy.");
        }
        _ => {}
    }
}

fn report_pull(outcome: &SyncOutcome) {
    match outcome.decision.action {
        SyncAction::Pull => {
            output::success(&format!("Save state downloaded from {}", outcome.endpoint));
        }
        SyncAction::SkipRemoteNotNewer => {
            output::skipped("Download skipped: the server save state is not newer than the local copy.");
        }
        SyncAction::SkipNoRemote => {
            output::skipped("Download skipped: no save state on the server for this channel.");
        }
        _ => {}
    }
}
