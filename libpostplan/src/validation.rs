//! Validation rules
//!
//! Pure checks gating every post mutation. Each function is total over
//! well-formed inputs and reports the first violated rule. The service
//! layer runs these server-side as the authoritative gate; any UI-side
//! mirror is advisory only.

use crate::error::ValidationError;
use crate::platform::PlatformRegistry;

/// Upper bound on media attachments per post, across all platforms.
pub const MAX_MEDIA_URLS: usize = 4;

/// Character ceiling for a platform. Unknown platforms are rejected rather
/// than defaulted.
pub fn max_content_length(
    registry: &PlatformRegistry,
    platform: &str,
) -> Result<usize, ValidationError> {
    registry.max_content_length(platform)
}

/// Content rules: within the platform ceiling (boundary inclusive), and a
/// post with no content must carry at least one media attachment.
pub fn validate_content(
    registry: &PlatformRegistry,
    platform: &str,
    content: &str,
    media_count: usize,
) -> Result<(), ValidationError> {
    let limit = registry.max_content_length(platform)?;
    let length = content.chars().count();

    if length > limit {
        return Err(ValidationError::ContentTooLong { limit, length });
    }
    if length == 0 && media_count == 0 {
        return Err(ValidationError::EmptyPost);
    }
    Ok(())
}

pub fn validate_media_count(count: usize) -> Result<(), ValidationError> {
    if count > MAX_MEDIA_URLS {
        return Err(ValidationError::TooManyMedia { count });
    }
    Ok(())
}

/// Media rules: count bound plus well-formedness. URLs come from the
/// external media store already uploaded; the core only requires non-empty
/// strings and never checks reachability.
pub fn validate_media_urls(urls: &[String]) -> Result<(), ValidationError> {
    validate_media_count(urls.len())?;
    if urls.iter().any(|url| url.trim().is_empty()) {
        return Err(ValidationError::EmptyMediaUrl);
    }
    Ok(())
}

/// Schedule rule: required when scheduling, and strictly in the future
/// relative to the supplied instant. Equal-to-now is rejected.
pub fn validate_schedule(scheduled_at: Option<i64>, now: i64) -> Result<(), ValidationError> {
    match scheduled_at {
        None => Err(ValidationError::MissingSchedule),
        Some(at) if at <= now => Err(ValidationError::ScheduleInPast),
        Some(_) => Ok(()),
    }
}

/// Combined body check. Content and media validate together so the
/// emptiness rule always sees both sides; run on every body mutation, not
/// only at submit time.
pub fn validate_post_body(
    registry: &PlatformRegistry,
    platform: &str,
    content: &str,
    media_urls: &[String],
) -> Result<(), ValidationError> {
    validate_media_urls(media_urls)?;
    validate_content(registry, platform, content, media_urls.len())
}
