use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use configuration::{Config, load_config};
use core_types::{AlertLevel, DailyReport, MonitoredChannel, NewChannel, NewTrigger, ReportDate};
use database::{DbRepository, close, connect, run_migrations};

/// The main entry point for the Telemonitor admin tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config().context("failed to load configuration")?;
    let _log_guard = configuration::init_tracing(&config.logging)?;
    tracing::debug!(database = ?config.database, "Configuration loaded");

    // Initialize the database connection and run migrations
    let pool = connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    let repo = DbRepository::new(pool.clone());
    let result = execute(cli.command, &repo, &config).await;

    close(&pool).await;
    result
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Administrative access to the message-monitoring store.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the embedded schema scripts and exit.
    Migrate,
    /// Manage monitored channels.
    #[command(subcommand)]
    Channels(ChannelCommands),
    /// Manage keyword alert triggers.
    #[command(subcommand)]
    Triggers(TriggerCommands),
    /// Delete ingested messages older than the retention window.
    Purge(PurgeArgs),
    /// Show message counts.
    Stats(StatsArgs),
    /// Browse generated daily reports.
    #[command(subcommand)]
    Reports(ReportCommands),
}

#[derive(Subcommand)]
enum ChannelCommands {
    /// List channels, most recently added first.
    List {
        /// Only show channels that are currently being ingested.
        #[arg(long)]
        active: bool,
    },
    /// Start monitoring a channel. Does nothing if it is already registered.
    Add(AddChannelArgs),
    /// Stop ingesting a channel but keep its cursor.
    Pause { channel_id: i64 },
    /// Resume ingesting a paused channel.
    Resume { channel_id: i64 },
    /// Stop monitoring a channel. Its messages and reports are kept.
    Remove { channel_id: i64 },
}

#[derive(Args)]
struct AddChannelArgs {
    channel_id: i64,
    #[arg(long)]
    title: Option<String>,
    /// Public handle, e.g. "@newsroom".
    #[arg(long)]
    handle: Option<String>,
    /// Register the channel without ingesting it yet.
    #[arg(long)]
    paused: bool,
}

#[derive(Subcommand)]
enum TriggerCommands {
    List,
    /// Add a phrase (or pattern with --regex) that raises an alert.
    Add {
        phrase: String,
        #[arg(long)]
        regex: bool,
        /// One of info, warning, critical.
        #[arg(long, default_value = "warning")]
        level: String,
    },
    Remove { id: i64 },
}

#[derive(Args)]
struct PurgeArgs {
    /// Retention window in days. Defaults to `retention.raw_messages_days`.
    #[arg(long)]
    days: Option<u32>,
}

#[derive(Args)]
struct StatsArgs {
    /// Restrict the count to one channel.
    #[arg(long)]
    channel: Option<i64>,
}

#[derive(Subcommand)]
enum ReportCommands {
    /// The most recent reports across all channels.
    Latest {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Reports whose summary contains the given text.
    Search { text: String },
    /// Print the full payload of one report.
    Show {
        channel_id: i64,
        /// Calendar day in UTC (format: YYYY-MM-DD).
        date: String,
    },
}

// ==============================================================================
// Command Dispatch
// ==============================================================================

async fn execute(command: Commands, repo: &DbRepository, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Migrate => {
            println!("Schema is up to date.");
        }
        Commands::Channels(cmd) => handle_channels(cmd, repo).await?,
        Commands::Triggers(cmd) => handle_triggers(cmd, repo).await?,
        Commands::Purge(args) => {
            let days = args.days.unwrap_or(config.retention.raw_messages_days);
            if days == 0 {
                bail!("retention window must be at least one day");
            }
            let deleted = repo.messages.purge_older_than_days(days).await?;
            println!("Deleted {deleted} message(s) older than {days} day(s).");
        }
        Commands::Stats(args) => match args.channel {
            Some(channel_id) => {
                let count = repo.messages.count_by_channel(channel_id).await?;
                println!("Channel {channel_id}: {count} message(s).");
            }
            None => {
                let total = repo.messages.count_total().await?;
                let channels = repo.channels.get_all().await?;
                let mut table = Table::new();
                table.set_header(vec!["Channel", "Title", "Messages"]);
                for channel in &channels {
                    let count = repo.messages.count_by_channel(channel.channel_id).await?;
                    table.add_row(vec![
                        channel.channel_id.to_string(),
                        channel.title.clone().unwrap_or_default(),
                        count.to_string(),
                    ]);
                }
                println!("{table}");
                println!("Total: {total} message(s).");
            }
        },
        Commands::Reports(cmd) => handle_reports(cmd, repo).await?,
    }
    Ok(())
}

async fn handle_channels(cmd: ChannelCommands, repo: &DbRepository) -> anyhow::Result<()> {
    match cmd {
        ChannelCommands::List { active } => {
            let channels = if active {
                repo.channels.get_active().await?
            } else {
                repo.channels.get_all().await?
            };
            println!("{}", channels_table(&channels));
        }
        ChannelCommands::Add(args) => {
            let channel = NewChannel {
                channel_id: args.channel_id,
                title: args.title,
                handle: args.handle,
                is_active: !args.paused,
                added_at: None,
            };
            if repo.channels.create(&channel).await? {
                println!("Now monitoring channel {}.", channel.channel_id);
            } else {
                println!("Channel {} is already monitored; nothing changed.", channel.channel_id);
            }
        }
        ChannelCommands::Pause { channel_id } => {
            require_channel(repo, channel_id).await?;
            repo.channels.set_active(channel_id, false).await?;
            println!("Paused channel {channel_id}.");
        }
        ChannelCommands::Resume { channel_id } => {
            require_channel(repo, channel_id).await?;
            repo.channels.set_active(channel_id, true).await?;
            println!("Resumed channel {channel_id}.");
        }
        ChannelCommands::Remove { channel_id } => {
            require_channel(repo, channel_id).await?;
            repo.channels.delete(channel_id).await?;
            println!("Removed channel {channel_id}.");
        }
    }
    Ok(())
}

/// The store treats writes to unknown channels as no-ops; the CLI reports them.
async fn require_channel(repo: &DbRepository, channel_id: i64) -> anyhow::Result<MonitoredChannel> {
    repo.channels
        .get_by_channel_id(channel_id)
        .await?
        .with_context(|| format!("channel {channel_id} is not monitored"))
}

async fn handle_triggers(cmd: TriggerCommands, repo: &DbRepository) -> anyhow::Result<()> {
    match cmd {
        TriggerCommands::List => {
            let mut table = Table::new();
            table.set_header(vec!["ID", "Phrase", "Regex", "Level"]);
            for trigger in repo.triggers.get_all().await? {
                table.add_row(vec![
                    trigger.id.to_string(),
                    trigger.phrase,
                    trigger.is_regex.to_string(),
                    trigger.alert_level,
                ]);
            }
            println!("{table}");
        }
        TriggerCommands::Add { phrase, regex, level } => {
            let level: AlertLevel = level.parse()?;
            if phrase.trim().is_empty() {
                bail!("trigger phrase must not be empty");
            }
            let created = repo
                .triggers
                .create(&NewTrigger {
                    phrase,
                    is_regex: regex,
                    alert_level: level.to_string(),
                })
                .await?;
            println!("Created trigger {} ({}).", created.id, created.alert_level);
        }
        TriggerCommands::Remove { id } => {
            if repo.triggers.get_by_id(id).await?.is_none() {
                bail!("trigger {id} does not exist");
            }
            repo.triggers.delete(id).await?;
            println!("Removed trigger {id}.");
        }
    }
    Ok(())
}

async fn handle_reports(cmd: ReportCommands, repo: &DbRepository) -> anyhow::Result<()> {
    match cmd {
        ReportCommands::Latest { limit } => {
            println!("{}", reports_table(&repo.reports.get_latest(limit).await?));
        }
        ReportCommands::Search { text } => {
            println!("{}", reports_table(&repo.reports.text_search(&text).await?));
        }
        ReportCommands::Show { channel_id, date } => {
            let date: ReportDate = date.parse()?;
            match repo.reports.get_by_channel_and_date(channel_id, date).await? {
                Some(report) => {
                    println!("{}", serde_json::to_string_pretty(&report.payload)?);
                }
                None => println!("No report for channel {channel_id} on {date}."),
            }
        }
    }
    Ok(())
}

// ==============================================================================
// Output Helpers
// ==============================================================================

fn channels_table(channels: &[MonitoredChannel]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Channel", "Title", "Handle", "Last message", "Sync cursor", "Active", "Added",
    ]);
    for channel in channels {
        table.add_row(vec![
            channel.channel_id.to_string(),
            channel.title.clone().unwrap_or_default(),
            channel.handle.clone().unwrap_or_default(),
            channel.last_processed_message_id.to_string(),
            channel.last_sync_cursor.to_string(),
            channel.is_active.to_string(),
            format_timestamp(channel.added_at),
        ]);
    }
    table
}

fn reports_table(reports: &[DailyReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Channel", "Date", "Summary", "Updated"]);
    for report in reports {
        table.add_row(vec![
            report.id.to_string(),
            report.channel_id.to_string(),
            report.report_date.to_string(),
            preview(report.summary.as_deref().unwrap_or_default(), 80),
            format_timestamp(report.created_at),
        ]);
    }
    table
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Truncates on a character boundary and marks the cut.
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
