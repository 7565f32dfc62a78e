//! Service layer for Postplan
//!
//! A clean, testable API over the post lifecycle that any interface (CLI,
//! HTTP handlers, a TUI) can consume without duplicating the rules.
//!
//! # Architecture
//!
//! `PostplanService` is the facade: it owns the shared resources (store,
//! config-derived platform registry, clock, connection gate, event bus) and
//! hands out the sub-services:
//!
//! - `PostService`: create/update/schedule/cancel plus publisher callbacks
//! - `CalendarService`: month grids, day listings, default click instant
//! - `EventBus`: lifecycle event distribution
//!
//! # Example
//!
//! ```no_run
//! use libpostplan::service::PostplanService;
//! use libpostplan::service::posts::CreatePostRequest;
//!
//! # async fn example() -> libpostplan::Result<()> {
//! let service = PostplanService::new().await?;
//!
//! let post = service
//!     .posts()
//!     .create_post(CreatePostRequest {
//!         owner_id: "owner-1".to_string(),
//!         platform: "linkedin".to_string(),
//!         content: "Shipping day!".to_string(),
//!         media_urls: vec![],
//!         scheduled_at: None,
//!     })
//!     .await?;
//! println!("saved draft {}", post.id);
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod events;
pub mod posts;

pub use events::{Event, EventReceiver};

use self::calendar::CalendarService;
use self::events::EventBus;
use self::posts::PostService;
use crate::clock::{Clock, SystemClock};
use crate::connections::{ConnectionGate, ConnectionsProvider};
use crate::{Config, Database, Result};
use std::sync::Arc;

/// Main service facade coordinating all sub-services.
pub struct PostplanService {
    db: Arc<Database>,
    posts: PostService,
    calendar: CalendarService,
    event_bus: EventBus,
}

impl PostplanService {
    /// Create a service from the default configuration location.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration cannot be loaded or the
    /// database cannot be opened/migrated.
    pub async fn new() -> Result<Self> {
        let config = Config::load_or_default()?;
        Self::from_config(config).await
    }

    /// Create a service from a prepared configuration, with the system
    /// clock and the store's own connections mirror as the provider.
    pub async fn from_config(config: Config) -> Result<Self> {
        Self::build(config, Arc::new(SystemClock), None).await
    }

    /// Fully parameterized constructor: callers may substitute the clock
    /// (deterministic tests) and the connections provider (an external
    /// collaborator instead of the local mirror).
    pub async fn build(
        config: Config,
        clock: Arc<dyn Clock>,
        connections: Option<Arc<dyn ConnectionsProvider>>,
    ) -> Result<Self> {
        let db = Arc::new(Database::new(&config.database.path).await?);
        let registry = config.platform_registry();
        let offset = config.utc_offset();

        let provider: Arc<dyn ConnectionsProvider> = match connections {
            Some(provider) => provider,
            None => Arc::clone(&db) as Arc<dyn ConnectionsProvider>,
        };
        let gate = ConnectionGate::new(provider);
        let event_bus = EventBus::new(100);

        let posts = PostService::new(
            Arc::clone(&db),
            registry,
            gate,
            Arc::clone(&clock),
            event_bus.clone(),
        );
        let calendar = CalendarService::new(Arc::clone(&db), clock, offset);

        Ok(Self {
            db,
            posts,
            calendar,
            event_bus,
        })
    }

    /// Direct store access, for integrations that need raw queries.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Post lifecycle operations.
    pub fn posts(&self) -> &PostService {
        &self.posts
    }

    /// Calendar projections and day queries.
    pub fn calendar(&self) -> &CalendarService {
        &self.calendar
    }

    /// Subscribe to lifecycle events emitted from now on.
    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }
}
