//! Post operations
//!
//! The authoritative surface for every post mutation: validate, transition,
//! persist, in that order, so a failed operation never leaves a partial
//! write behind. Per-post serialization comes from the store's optimistic
//! versioning; a conflicting writer re-reads and re-validates once before
//! giving up.

use std::sync::Arc;
use tracing::{info, warn};

use super::events::{Event, EventBus};
use crate::clock::Clock;
use crate::connections::ConnectionGate;
use crate::error::{PostplanError, Result, StoreError};
use crate::platform::PlatformRegistry;
use crate::types::Post;
use crate::validation;
use crate::Database;

/// One re-read after a version conflict; two losses in a row mean the
/// caller should see the conflict.
const CONFLICT_ATTEMPTS: u32 = 2;

/// Post service
///
/// Owns the create/update/schedule/cancel operations plus the publisher
/// callbacks that settle scheduled posts.
#[derive(Clone)]
pub struct PostService {
    db: Arc<Database>,
    registry: PlatformRegistry,
    gate: ConnectionGate,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
}

/// Request to create a post
#[derive(Debug, Clone)]
pub struct CreatePostRequest {
    pub owner_id: String,
    pub platform: String,
    pub content: String,
    pub media_urls: Vec<String>,
    /// When set, the post goes straight to scheduled (one atomic
    /// create-and-schedule); when absent it is saved as a draft.
    pub scheduled_at: Option<i64>,
}

impl PostService {
    pub fn new(
        db: Arc<Database>,
        registry: PlatformRegistry,
        gate: ConnectionGate,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            db,
            registry,
            gate,
            clock,
            event_bus,
        }
    }

    /// Create a post as a draft, or directly scheduled when the request
    /// carries a schedule intent.
    ///
    /// # Errors
    ///
    /// Any validation or gate failure aborts the whole operation before the
    /// insert; nothing is persisted on error.
    pub async fn create_post(&self, request: CreatePostRequest) -> Result<Post> {
        let now = self.clock.now().timestamp();

        validation::validate_post_body(
            &self.registry,
            &request.platform,
            &request.content,
            &request.media_urls,
        )?;

        let mut post = Post::new(
            request.owner_id,
            request.platform,
            request.content,
            request.media_urls,
            now,
        );

        if let Some(scheduled_at) = request.scheduled_at {
            validation::validate_schedule(Some(scheduled_at), now)?;
            self.gate.require(&post.owner_id, &post.platform).await?;
            post.schedule(scheduled_at, now)?;
        }

        self.db.insert_post(&post).await?;

        info!(
            post_id = %post.id,
            platform = %post.platform,
            status = %post.status,
            "post created"
        );
        self.event_bus.emit(Event::PostCreated {
            post_id: post.id.clone(),
            owner_id: post.owner_id.clone(),
            status: post.status,
        });
        if let Some(scheduled_at) = post.scheduled_at {
            self.event_bus.emit(Event::PostScheduled {
                post_id: post.id.clone(),
                scheduled_at,
            });
        }

        Ok(post)
    }

    /// Replace a draft's content and media. Draft only; the body rules run
    /// against the staged values on every call.
    pub async fn update_post(
        &self,
        owner_id: &str,
        post_id: &str,
        content: String,
        media_urls: Vec<String>,
    ) -> Result<Post> {
        let saved = self
            .mutate_with_retry(owner_id, post_id, |post, now| {
                // State gate first, then body rules on the staged values
                post.set_body(content.clone(), media_urls.clone(), now)?;
                validation::validate_post_body(
                    &self.registry,
                    &post.platform,
                    &post.content,
                    &post.media_urls,
                )?;
                Ok(())
            })
            .await?;

        info!(post_id = %saved.id, "post body updated");
        Ok(saved)
    }

    /// Commit a draft to publish at `scheduled_at`.
    ///
    /// The connection gate is consulted at every attempt: a connection
    /// removed since the last call fails the schedule, regardless of any
    /// earlier success.
    pub async fn schedule_post(
        &self,
        owner_id: &str,
        post_id: &str,
        scheduled_at: i64,
    ) -> Result<Post> {
        // Platform is immutable, so it is safe to read it ahead of the
        // versioned mutation.
        let platform = self.require_post(owner_id, post_id).await?.platform;
        self.gate.require(owner_id, &platform).await?;

        let saved = self
            .mutate_with_retry(owner_id, post_id, |post, now| {
                validation::validate_schedule(Some(scheduled_at), now)?;
                post.schedule(scheduled_at, now)
            })
            .await?;

        info!(post_id = %saved.id, scheduled_at, "post scheduled");
        self.event_bus.emit(Event::PostScheduled {
            post_id: saved.id.clone(),
            scheduled_at,
        });
        Ok(saved)
    }

    /// Withdraw a draft or scheduled post from future publishing.
    pub async fn cancel_post(&self, owner_id: &str, post_id: &str) -> Result<Post> {
        let saved = self
            .mutate_with_retry(owner_id, post_id, |post, now| post.cancel(now))
            .await?;

        info!(post_id = %saved.id, "post cancelled");
        self.event_bus.emit(Event::PostCancelled {
            post_id: saved.id.clone(),
        });
        Ok(saved)
    }

    /// Return a failed post to draft for an explicit retry.
    pub async fn revert_to_draft(&self, owner_id: &str, post_id: &str) -> Result<Post> {
        let saved = self
            .mutate_with_retry(owner_id, post_id, |post, now| post.revert_to_draft(now))
            .await?;

        info!(post_id = %saved.id, "post reverted to draft");
        self.event_bus.emit(Event::PostRevertedToDraft {
            post_id: saved.id.clone(),
        });
        Ok(saved)
    }

    /// Publisher callback: delivery confirmed.
    pub async fn mark_published(&self, owner_id: &str, post_id: &str) -> Result<Post> {
        let saved = self
            .mutate_with_retry(owner_id, post_id, |post, now| post.mark_published(now))
            .await?;

        info!(post_id = %saved.id, "post published");
        self.event_bus.emit(Event::PostPublished {
            post_id: saved.id.clone(),
        });
        Ok(saved)
    }

    /// Publisher callback: delivery failed; `reason` is stored verbatim.
    pub async fn mark_failed(&self, owner_id: &str, post_id: &str, reason: String) -> Result<Post> {
        let saved = self
            .mutate_with_retry(owner_id, post_id, |post, now| {
                post.mark_failed(reason.clone(), now)
            })
            .await?;

        warn!(post_id = %saved.id, reason = %reason, "post delivery failed");
        self.event_bus.emit(Event::PostFailed {
            post_id: saved.id.clone(),
            reason,
        });
        Ok(saved)
    }

    /// Fetch a single post.
    pub async fn get_post(&self, owner_id: &str, post_id: &str) -> Result<Post> {
        self.require_post(owner_id, post_id).await
    }

    /// An owner's posts in queue/calendar order.
    pub async fn list_posts_by_owner(&self, owner_id: &str) -> Result<Vec<Post>> {
        self.db.list_posts_by_owner(owner_id).await
    }

    /// Hard-delete a post.
    pub async fn remove_post(&self, owner_id: &str, post_id: &str) -> Result<()> {
        self.db.remove_post(owner_id, post_id).await
    }

    async fn require_post(&self, owner_id: &str, post_id: &str) -> Result<Post> {
        self.db
            .get_post(owner_id, post_id)
            .await?
            .ok_or_else(|| PostplanError::NotFound(post_id.to_string()))
    }

    /// Read, transition, write. A version conflict means another mutation
    /// committed in between; re-read and re-apply so the transition is
    /// judged against the winner's state.
    async fn mutate_with_retry<F>(&self, owner_id: &str, post_id: &str, mut apply: F) -> Result<Post>
    where
        F: FnMut(&mut Post, i64) -> Result<()>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let now = self.clock.now().timestamp();
            let mut post = self.require_post(owner_id, post_id).await?;
            apply(&mut post, now)?;

            match self.db.update_post(&post).await {
                Ok(saved) => return Ok(saved),
                Err(PostplanError::Store(StoreError::VersionConflict(_)))
                    if attempt < CONFLICT_ATTEMPTS =>
                {
                    warn!(post_id = %post_id, attempt, "concurrent update, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
