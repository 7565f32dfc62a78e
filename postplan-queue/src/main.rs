//! postplan-queue - Manage the scheduled post queue
//!
//! List, cancel, and inspect scheduled posts, and render the month
//! calendar for a quick look at what goes out when.

use clap::{Parser, Subcommand};
use libpostplan::calendar::MonthGrid;
use libpostplan::service::PostplanService;
use libpostplan::{Config, Post, PostStatus, PostplanError, Result};

#[derive(Parser, Debug)]
#[command(name = "postplan-queue")]
#[command(version)]
#[command(about = "Manage the scheduled post queue")]
#[command(long_about = "\
postplan-queue - Manage the scheduled post queue

DESCRIPTION:
    Inspect and manage the posts waiting to publish. Use it to list the
    queue, cancel or revert posts, view statistics, or render the month
    calendar.

COMMANDS:
    list        List queued posts
    cancel      Cancel a draft or scheduled post
    revert      Return a failed post to draft for another attempt
    stats       Show per-status post counts
    calendar    Render the month calendar

USAGE EXAMPLES:
    # List everything still waiting to publish
    postplan-queue list

    # List as JSON, drafts included
    postplan-queue list --format json --all

    # Cancel a specific post
    postplan-queue cancel <POST_ID>

    # Retry a failed post
    postplan-queue revert <POST_ID>

    # Show June 2026
    postplan-queue calendar 2026 6

CONFIGURATION:
    Configuration file: ~/.config/postplan/config.toml
    Database location: ~/.local/share/postplan/posts.db

    Override with environment variables:
        POSTPLAN_CONFIG - Path to config file

EXIT CODES:
    0 - Success
    1 - Operation failed
    2 - Store or configuration error
    3 - Invalid input (bad post ID, bad month, etc.)
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Owner id to operate on (defaults to the configured default)
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List queued posts
    List {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Filter by platform
        #[arg(short, long)]
        platform: Option<String>,

        /// Include drafts and settled posts, not just the scheduled queue
        #[arg(short, long)]
        all: bool,
    },
    /// Cancel a draft or scheduled post
    Cancel {
        /// ID of the post to cancel
        post_id: String,
    },
    /// Return a failed post to draft
    Revert {
        /// ID of the post to revert
        post_id: String,
    },
    /// Show per-status post counts
    Stats {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Render the month calendar
    Calendar {
        /// Year, e.g. 2026
        year: i32,

        /// Month 1-12
        month: u32,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("error")
            .with_writer(std::io::stderr)
            .init();
    }

    // Run the main logic and handle errors
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default()?;
    let owner = cli
        .owner
        .clone()
        .unwrap_or_else(|| config.defaults.owner.clone());

    let service = PostplanService::from_config(config).await?;

    match cli.command {
        Commands::List {
            format,
            platform,
            all,
        } => {
            cmd_list(&service, &owner, &format, platform.as_deref(), all).await?;
        }
        Commands::Cancel { post_id } => {
            cmd_cancel(&service, &owner, &post_id).await?;
        }
        Commands::Revert { post_id } => {
            cmd_revert(&service, &owner, &post_id).await?;
        }
        Commands::Stats { format } => {
            cmd_stats(&service, &owner, &format).await?;
        }
        Commands::Calendar {
            year,
            month,
            format,
        } => {
            cmd_calendar(&service, &owner, year, month, &format).await?;
        }
    }

    Ok(())
}

fn validate_format(format: &str) -> Result<()> {
    if format != "text" && format != "json" {
        return Err(PostplanError::InvalidInput(format!(
            "Invalid format '{}'. Must be 'text' or 'json'",
            format
        )));
    }
    Ok(())
}

/// List queued posts
async fn cmd_list(
    service: &PostplanService,
    owner: &str,
    format: &str,
    platform: Option<&str>,
    all: bool,
) -> Result<()> {
    validate_format(format)?;

    let mut posts = service.posts().list_posts_by_owner(owner).await?;

    if !all {
        posts.retain(|p| p.status == PostStatus::Scheduled);
    }
    if let Some(platform) = platform {
        posts.retain(|p| p.platform == platform);
    }

    if format == "json" {
        output_list_json(&posts);
    } else {
        output_list_text(&posts);
    }

    Ok(())
}

/// Output posts as JSON
fn output_list_json(posts: &[Post]) {
    let json: Vec<serde_json::Value> = posts
        .iter()
        .map(|p| {
            serde_json::json!({
                "id": p.id,
                "platform": p.platform,
                "content": p.content,
                "media_urls": p.media_urls,
                "scheduled_at": p.scheduled_at,
                "created_at": p.created_at,
                "status": p.status.as_str(),
            })
        })
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&json).unwrap_or_default()
    );
}

/// Output posts as human-readable text
fn output_list_text(posts: &[Post]) {
    use chrono::Utc;

    if posts.is_empty() {
        return;
    }

    let now = Utc::now().timestamp();

    for post in posts {
        let content_preview = truncate_content(&post.content, 50);
        let time_until = post
            .scheduled_at
            .map(|ts| format_time_until(now, ts))
            .unwrap_or_else(|| post.status.as_str().to_string());

        println!(
            "{} | {} | {} | {}",
            post.id, post.platform, content_preview, time_until
        );
    }
}

/// Truncate content to max length with ellipsis
fn truncate_content(content: &str, max_len: usize) -> String {
    if content.chars().count() <= max_len {
        content.to_string()
    } else {
        let truncated: String = content.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}

/// Format time until scheduled time in human-readable form
fn format_time_until(now: i64, scheduled_at: i64) -> String {
    let diff = scheduled_at - now;

    if diff < 0 {
        return "overdue".to_string();
    }

    let minutes = diff / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("in {} day{}", days, if days == 1 { "" } else { "s" })
    } else if hours > 0 {
        format!("in {} hour{}", hours, if hours == 1 { "" } else { "s" })
    } else if minutes > 0 {
        format!("in {} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    } else {
        "in <1 minute".to_string()
    }
}

/// Cancel a draft or scheduled post
async fn cmd_cancel(service: &PostplanService, owner: &str, post_id: &str) -> Result<()> {
    let post = service.posts().cancel_post(owner, post_id).await?;
    println!("Cancelled {}", post.id);
    Ok(())
}

/// Return a failed post to draft
async fn cmd_revert(service: &PostplanService, owner: &str, post_id: &str) -> Result<()> {
    let post = service.posts().revert_to_draft(owner, post_id).await?;
    println!("Reverted {} to draft", post.id);
    Ok(())
}

/// Show per-status post counts
async fn cmd_stats(service: &PostplanService, owner: &str, format: &str) -> Result<()> {
    validate_format(format)?;

    let counts = service.database().status_counts(owner).await?;

    if format == "json" {
        let json: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(status, count)| (status.clone(), serde_json::json!(count)))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_default()
        );
    } else {
        for (status, count) in counts {
            println!("{:<10} {}", status, count);
        }
    }

    Ok(())
}

/// Render the month calendar
async fn cmd_calendar(
    service: &PostplanService,
    owner: &str,
    year: i32,
    month: u32,
    format: &str,
) -> Result<()> {
    validate_format(format)?;

    let grid = service.calendar().get_calendar_month(owner, year, month).await?;

    if format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&grid).unwrap_or_default()
        );
    } else {
        output_calendar_text(&grid);
    }

    Ok(())
}

/// Render the grid one week per row: day number plus post count
fn output_calendar_text(grid: &MonthGrid) {
    println!("{:04}-{:02}", grid.year, grid.month);
    println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");

    for week in grid.cells.chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|cell| match cell {
                Some(cell) if !cell.posts.is_empty() => {
                    format!("{:>2}*{}", cell.day, cell.posts.len())
                }
                Some(cell) => format!("{:>2}  ", cell.day),
                None => "    ".to_string(),
            })
            .collect();
        println!(" {}", row.join(" "));
    }
}
