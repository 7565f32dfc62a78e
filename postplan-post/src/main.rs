//! postplan-post - Save a draft or schedule a post
//!
//! Reads content from the argument or stdin, validates it against the
//! target platform, and stores it as a draft or as a scheduled post.

use std::io::Read;

use clap::Parser;
use libpostplan::service::posts::CreatePostRequest;
use libpostplan::service::PostplanService;
use libpostplan::{scheduling, Clock, Config, Post, PostplanError, Result, SystemClock};

#[derive(Parser, Debug)]
#[command(name = "postplan-post")]
#[command(version)]
#[command(about = "Save a draft or schedule a post")]
#[command(long_about = "\
postplan-post - Save a draft or schedule a post

DESCRIPTION:
    Validates content against the target platform's rules (character
    ceiling, media count) and stores it. Without --at the post is saved as
    a draft; with --at it is scheduled, which requires an active platform
    connection (see postplan-connect).

USAGE EXAMPLES:
    # Save a LinkedIn draft
    postplan-post \"Drafting some thoughts\"

    # Schedule a tweet for tomorrow afternoon
    postplan-post --platform twitter --at \"tomorrow 3pm\" \"Launch day!\"

    # Schedule in two hours, with media
    postplan-post --at 2h --media https://cdn.example.com/shot.png \"Sneak peek\"

    # Read content from stdin
    echo \"Hello from a pipe\" | postplan-post

CONFIGURATION:
    Configuration file: ~/.config/postplan/config.toml
    Database location: ~/.local/share/postplan/posts.db

    Override with environment variables:
        POSTPLAN_CONFIG - Path to config file

EXIT CODES:
    0 - Success
    1 - Operation failed
    2 - Store/config error or missing platform connection
    3 - Invalid input (validation failure, bad time format)
")]
struct Cli {
    /// Content to post (reads from stdin if not provided)
    content: Option<String>,

    /// Target platform (defaults to the configured default)
    #[arg(short, long)]
    platform: Option<String>,

    /// Owner id the post belongs to (defaults to the configured default)
    #[arg(long)]
    owner: Option<String>,

    /// Media URL to attach (repeatable, up to 4)
    #[arg(short, long = "media")]
    media: Vec<String>,

    /// Schedule time: "2h", "tomorrow 3pm", "2026-09-01 12:00"
    #[arg(long)]
    at: Option<String>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
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
    if cli.format != "text" && cli.format != "json" {
        return Err(PostplanError::InvalidInput(format!(
            "Invalid format '{}'. Must be 'text' or 'json'",
            cli.format
        )));
    }

    let config = Config::load_or_default()?;
    let owner = cli
        .owner
        .unwrap_or_else(|| config.defaults.owner.clone());
    let platform = cli
        .platform
        .unwrap_or_else(|| config.defaults.platform.clone());

    let content = match cli.content {
        Some(content) => content,
        None => read_stdin()?,
    };

    let scheduled_at = match &cli.at {
        Some(spec) => Some(scheduling::parse_schedule(spec, SystemClock.now())?.timestamp()),
        None => None,
    };

    let service = PostplanService::from_config(config).await?;
    let post = service
        .posts()
        .create_post(CreatePostRequest {
            owner_id: owner,
            platform,
            content,
            media_urls: cli.media,
            scheduled_at,
        })
        .await?;

    if cli.format == "json" {
        output_json(&post);
    } else {
        output_text(&post);
    }

    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .map_err(|e| PostplanError::InvalidInput(format!("Failed to read stdin: {}", e)))?;

    let content = content.trim_end_matches('\n').to_string();
    if content.is_empty() {
        return Err(PostplanError::InvalidInput(
            "No content provided (argument or stdin)".to_string(),
        ));
    }
    Ok(content)
}

fn output_json(post: &Post) {
    let json = serde_json::json!({
        "id": post.id,
        "platform": post.platform,
        "status": post.status.as_str(),
        "scheduled_at": post.scheduled_at,
        "media_urls": post.media_urls,
    });
    println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
}

fn output_text(post: &Post) {
    match post.scheduled_at {
        Some(at) => {
            let when = chrono::DateTime::from_timestamp(at, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| at.to_string());
            println!("Scheduled {} for {} ({})", post.id, when, post.platform);
        }
        None => println!("Saved draft {} ({})", post.id, post.platform),
    }
}
