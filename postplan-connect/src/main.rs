//! postplan-connect - Manage the mirrored platform connections
//!
//! The OAuth handshake itself happens with the external provider; this
//! tool maintains the local mirror of which connections are active, which
//! is what the scheduling gate consults. No credential material is stored.

use clap::{Parser, Subcommand};
use libpostplan::{Config, Connection, Database, PostplanError, Result};

#[derive(Parser, Debug)]
#[command(name = "postplan-connect")]
#[command(version)]
#[command(about = "Manage the mirrored platform connections")]
#[command(long_about = "\
postplan-connect - Manage the mirrored platform connections

DESCRIPTION:
    Maintains the local mirror of active platform connections that gates
    scheduling. Connections are capability records (platform, username,
    avatar); the underlying OAuth credential stays with the external
    provider and never touches this store.

COMMANDS:
    list    List an owner's connections
    add     Record an active connection
    remove  Drop a connection

USAGE EXAMPLES:
    # Record a LinkedIn connection
    postplan-connect add linkedin jane-doe

    # With an avatar URL
    postplan-connect add twitter janedoe --avatar https://cdn.example.com/me.png

    # List connections as JSON
    postplan-connect list --format json

    # Disconnect
    postplan-connect remove twitter

EXIT CODES:
    0 - Success
    1 - Operation failed
    2 - Store or configuration error
    3 - Invalid input
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
    /// List an owner's connections
    List {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Record an active connection
    Add {
        /// Platform name, e.g. twitter or linkedin
        platform: String,

        /// Username on the platform
        username: String,

        /// Profile picture URL
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Drop a connection
    Remove {
        /// Platform name
        platform: String,
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
    let registry = config.platform_registry();

    let db = Database::new(&config.database.path).await?;

    match cli.command {
        Commands::List { format } => {
            cmd_list(&db, &owner, &format).await?;
        }
        Commands::Add {
            platform,
            username,
            avatar,
        } => {
            let platform = platform.to_lowercase();
            // Only known platforms can gate a schedule; refuse the rest early
            registry.spec(&platform)?;
            cmd_add(&db, &owner, &platform, &username, avatar).await?;
        }
        Commands::Remove { platform } => {
            cmd_remove(&db, &owner, &platform.to_lowercase()).await?;
        }
    }

    Ok(())
}

/// List an owner's connections
async fn cmd_list(db: &Database, owner: &str, format: &str) -> Result<()> {
    if format != "text" && format != "json" {
        return Err(PostplanError::InvalidInput(format!(
            "Invalid format '{}'. Must be 'text' or 'json'",
            format
        )));
    }

    let connections = db.get_connections(owner).await?;

    if format == "json" {
        let json: Vec<serde_json::Value> = connections
            .iter()
            .map(|c| {
                serde_json::json!({
                    "platform": c.platform,
                    "platform_username": c.platform_username,
                    "profile_picture_url": c.profile_picture_url,
                    "updated_at": c.updated_at,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_default()
        );
    } else {
        for connection in connections {
            println!(
                "{:<10} @{}",
                connection.platform, connection.platform_username
            );
        }
    }

    Ok(())
}

/// Record an active connection
async fn cmd_add(
    db: &Database,
    owner: &str,
    platform: &str,
    username: &str,
    avatar: Option<String>,
) -> Result<()> {
    let connection = Connection {
        owner_id: owner.to_string(),
        platform: platform.to_string(),
        platform_username: username.to_string(),
        profile_picture_url: avatar,
        updated_at: chrono::Utc::now().timestamp(),
    };

    db.upsert_connection(&connection).await?;
    println!("Connected {} as @{}", platform, username);
    Ok(())
}

/// Drop a connection
async fn cmd_remove(db: &Database, owner: &str, platform: &str) -> Result<()> {
    db.remove_connection(owner, platform).await?;
    println!("Disconnected {}", platform);
    Ok(())
}
