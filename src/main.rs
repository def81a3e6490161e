use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use skysweep::bluesky::client::AtpClient;
use skysweep::config::{Config, ScanAction, ScanSettings};
use skysweep::output::export::{write_export, ExportFormat};
use skysweep::output::terminal;
use skysweep::pipeline::batch::DEFAULT_CONCURRENCY;
use skysweep::pipeline::filter::{ContentFilter, MediaSelection};
use skysweep::pipeline::media::{self, MediaSettings};
use skysweep::pipeline::nuke::{self, NukeOutcome, NukeTarget};
use skysweep::pipeline::scan;
use skysweep::scoring::bot::BOT_SCORE_THRESHOLD;
use skysweep::scoring::marketer::MARKETER_SCORE_THRESHOLD;
use skysweep::scoring::verdict::{ClassifierMode, Thresholds};

/// SkySweep: clean up a Bluesky account.
///
/// Finds bot and marketer followers, backs up posted media, and bulk
/// deletes posts or likes.
#[derive(Parser)]
#[command(name = "skysweep", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan followers for bots and marketers
    Scan {
        /// Log what would be blocked without blocking
        #[arg(long)]
        simulate: bool,

        /// Block matched followers (capped by --max-blocks)
        #[arg(long)]
        auto_block: bool,

        /// Also flag marketer accounts
        #[arg(long, conflicts_with = "marketer_only")]
        include_marketers: bool,

        /// Flag marketer accounts only
        #[arg(long)]
        marketer_only: bool,

        /// Minimum bot score for a match
        #[arg(long, default_value_t = BOT_SCORE_THRESHOLD, value_parser = clap::value_parser!(u32).range(1..))]
        bot_threshold: u32,

        /// Minimum marketer score for a match
        #[arg(long, default_value_t = MARKETER_SCORE_THRESHOLD, value_parser = clap::value_parser!(u32).range(1..))]
        marketer_threshold: u32,

        /// Scan this account's followers instead of your own
        #[arg(long)]
        target: Option<String>,

        /// Follower pages to scan, 100 per page (0 = all)
        #[arg(long, default_value = "0")]
        pages: usize,

        /// Milliseconds to wait after each block
        #[arg(long, default_value = "400")]
        delay: u64,

        /// Milliseconds to wait after each profile lookup
        #[arg(long, default_value = "100")]
        profile_delay: u64,

        /// Maximum blocks per run
        #[arg(long, default_value = "25")]
        max_blocks: usize,

        /// Export matches as csv or json
        #[arg(long)]
        export: Option<ExportFormat>,

        /// Export file path (default: skysweep-suspects-<timestamp>.<ext>)
        #[arg(long)]
        export_path: Option<PathBuf>,

        /// Print metrics for every scanned profile
        #[arg(short, long)]
        verbose: bool,
    },

    /// Download every photo and video you have posted
    BackupMedia {
        /// Destination directory (default: ~/Documents/SkySweep_Backups)
        #[arg(long)]
        dest: Option<PathBuf>,

        /// all, photos or videos
        #[arg(long, default_value = "all")]
        media_type: MediaSelection,

        /// Back up this account instead of your own
        #[arg(long)]
        target: Option<String>,

        /// Parallel downloads
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Permanently delete posts or likes
    Nuke {
        /// all-posts, media-posts, text-posts or likes
        target: NukeTarget,

        /// Milliseconds to wait after each deletion
        #[arg(long, default_value = "200")]
        delay: u64,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Only posts carrying one of these labels (comma-separated)
    #[arg(long)]
    filter_tags: Option<String>,

    /// Only posts without any labels
    #[arg(long)]
    untagged_only: bool,
}

impl FilterArgs {
    fn to_filter(&self) -> ContentFilter {
        ContentFilter::new(self.filter_tags.as_deref(), self.untagged_only)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("skysweep=info")),
        )
        .init();

    let cli = Cli::parse();
    let token = cancel_on_ctrl_c();

    match cli.command {
        Commands::Scan {
            simulate,
            auto_block,
            include_marketers,
            marketer_only,
            bot_threshold,
            marketer_threshold,
            target,
            pages,
            delay,
            profile_delay,
            max_blocks,
            export,
            export_path,
            verbose,
        } => {
            // Simulation wins over auto-block.
            let action = if simulate {
                ScanAction::Simulate
            } else if auto_block {
                ScanAction::AutoBlock
            } else {
                ScanAction::Review
            };
            let mode = if marketer_only {
                ClassifierMode::MarketerOnly
            } else if include_marketers {
                ClassifierMode::IncludeMarketers
            } else {
                ClassifierMode::BotOnly
            };
            let settings = ScanSettings {
                action,
                mode,
                thresholds: Thresholds {
                    bot: bot_threshold,
                    marketer: marketer_threshold,
                },
                target,
                pages,
                profile_delay: Duration::from_millis(profile_delay),
                block_delay: Duration::from_millis(delay),
                max_blocks,
                export,
                export_path,
                verbose,
            };

            let client = connect().await?;
            let report = scan::run(&client, &settings, &token)
                .await
                .context("Could not list followers; nothing was scanned")?;

            terminal::display_scan_summary(&report, settings.action);

            if let Some(format) = settings.export {
                if report.rows.is_empty() {
                    println!("No matches to export.");
                } else {
                    let path = write_export(settings.export_path.as_deref(), format, &report.rows)
                        .await?;
                    println!(
                        "Exported {} match(es) to {}",
                        report.rows.len(),
                        path.display()
                    );
                }
            }
        }

        Commands::BackupMedia {
            dest,
            media_type,
            target,
            concurrency,
            filter,
        } => {
            let mut settings = MediaSettings::new(dest.unwrap_or_else(media::default_destination));
            settings.selection = media_type;
            settings.filter = filter.to_filter();
            settings.target = target;
            settings.concurrency = concurrency;

            let client = connect().await?;
            let report = media::backup(&client, &settings, &token).await?;
            terminal::display_media_summary(&report, &settings.destination);
        }

        Commands::Nuke {
            target,
            delay,
            filter,
        } => {
            let client = connect().await?;
            let outcome = nuke::run(
                &client,
                target,
                &filter.to_filter(),
                Duration::from_millis(delay),
                &token,
                |phrase| {
                    terminal::display_nuke_warning(target);
                    print!("{} ", format!("Type '{phrase}':").bold());
                    io::stdout().flush()?;
                    let mut answer = String::new();
                    io::stdin()
                        .read_line(&mut answer)
                        .context("Failed to read confirmation")?;
                    Ok(answer)
                },
            )
            .await?;

            match outcome {
                NukeOutcome::Declined => println!("Cancelled. Nothing was deleted."),
                NukeOutcome::Completed(report) => terminal::display_delete_summary(&report),
            }
        }
    }

    Ok(())
}

/// Log in with the configured credentials.
async fn connect() -> Result<AtpClient> {
    let config = Config::load()?;
    config.require_auth()?;
    let client = AtpClient::authenticate(
        &config.service_url,
        &config.bluesky_handle,
        &config.bluesky_app_password,
    )
    .await
    .with_context(|| format!("Login failed for {}", config.bluesky_handle))?;
    info!(handle = client.session().handle, "Logged in");
    Ok(client)
}

/// A token that fires on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                println!("\n{}", "Interrupt received, finishing current item...".yellow());
                trigger.cancel();
            }
            Err(e) => warn!(error = %e, "Could not listen for Ctrl-C"),
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_thresholds_are_rejected() {
        assert!(Cli::try_parse_from(["skysweep", "scan", "--bot-threshold", "0"]).is_err());
        assert!(Cli::try_parse_from(["skysweep", "scan", "--marketer-threshold", "0"]).is_err());
        assert!(Cli::try_parse_from(["skysweep", "scan", "--bot-threshold", "1"]).is_ok());
    }
}
