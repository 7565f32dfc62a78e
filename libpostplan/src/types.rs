//! Core types for Postplan
//!
//! `Post` carries its own lifecycle: every transition is a method that
//! checks the current status and refuses anything the state machine does
//! not allow. Time and connection checks live in `validation` and the
//! service layer; this module only guards state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PostplanError, Result};

/// A social-media post owned by a single user.
///
/// `scheduled_at` is `None` while the post is a draft and set from the
/// moment it is scheduled; published and failed posts keep the instant they
/// were scheduled for. `version` is bumped by the store on every committed
/// update and backs optimistic concurrency control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: String,
    pub owner_id: String,
    pub platform: String,
    pub content: String,
    pub media_urls: Vec<String>,
    pub scheduled_at: Option<i64>,
    pub status: PostStatus,
    pub failure_reason: Option<String>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Post {
    /// Create a new draft with a fresh id and caller-supplied timestamps.
    pub fn new(
        owner_id: String,
        platform: String,
        content: String,
        media_urls: Vec<String>,
        now: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            platform,
            content,
            media_urls,
            scheduled_at: None,
            status: PostStatus::Draft,
            failure_reason: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// The instant this post sorts and buckets by: the scheduled time when
    /// set, otherwise the creation time (drafts).
    pub fn effective_at(&self) -> i64 {
        self.scheduled_at.unwrap_or(self.created_at)
    }

    /// Replace content and media. Draft only; body rules are re-checked by
    /// the caller against the staged values.
    pub fn set_body(&mut self, content: String, media_urls: Vec<String>, now: i64) -> Result<()> {
        self.ensure_status(PostStatus::Draft, "update")?;
        self.content = content;
        self.media_urls = media_urls;
        self.updated_at = now;
        Ok(())
    }

    /// Commit the post to publish at `scheduled_at`. Draft only.
    pub fn schedule(&mut self, scheduled_at: i64, now: i64) -> Result<()> {
        self.ensure_status(PostStatus::Draft, "schedule")?;
        self.scheduled_at = Some(scheduled_at);
        self.status = PostStatus::Scheduled;
        self.updated_at = now;
        Ok(())
    }

    /// Publisher callback: confirmed delivery. Scheduled only; published is
    /// terminal.
    pub fn mark_published(&mut self, now: i64) -> Result<()> {
        self.ensure_status(PostStatus::Scheduled, "publish")?;
        self.status = PostStatus::Published;
        self.updated_at = now;
        Ok(())
    }

    /// Publisher callback: delivery failed. Scheduled only. The reason is an
    /// opaque diagnostic, stored verbatim and never parsed.
    pub fn mark_failed(&mut self, reason: String, now: i64) -> Result<()> {
        self.ensure_status(PostStatus::Scheduled, "fail")?;
        self.status = PostStatus::Failed;
        self.failure_reason = Some(reason);
        self.updated_at = now;
        Ok(())
    }

    /// Withdraw the post from future publishing. Draft or scheduled only.
    pub fn cancel(&mut self, now: i64) -> Result<()> {
        match self.status {
            PostStatus::Draft | PostStatus::Scheduled => {
                self.status = PostStatus::Cancelled;
                self.updated_at = now;
                Ok(())
            }
            other => Err(PostplanError::InvalidState {
                from: other.as_str(),
                action: "cancel",
            }),
        }
    }

    /// Explicit retry path: a failed post returns to draft, dropping its
    /// schedule and failure diagnostic. Failed only.
    pub fn revert_to_draft(&mut self, now: i64) -> Result<()> {
        self.ensure_status(PostStatus::Failed, "revert")?;
        self.status = PostStatus::Draft;
        self.scheduled_at = None;
        self.failure_reason = None;
        self.updated_at = now;
        Ok(())
    }

    fn ensure_status(&self, expected: PostStatus, action: &'static str) -> Result<()> {
        if self.status != expected {
            return Err(PostplanError::InvalidState {
                from: self.status.as_str(),
                action,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Failed,
    Cancelled,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "scheduled" => Some(Self::Scheduled),
            "published" => Some(Self::Published),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Terminal states accept no further transitions (failed still allows
    /// the explicit revert-to-draft retry path).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Published | Self::Cancelled)
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authorized publishing credential held by the external connections
/// provider. The core reads these as capability records only; the
/// underlying secret never passes through it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub owner_id: String,
    pub platform: String,
    pub platform_username: String,
    pub profile_picture_url: Option<String>,
    pub updated_at: i64,
}
