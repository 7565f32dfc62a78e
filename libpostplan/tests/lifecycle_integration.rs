//! End-to-end lifecycle tests: create, update, schedule, publisher
//! callbacks, cancellation, and the connection gate, on a real (temporary)
//! database with a pinned clock.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use libpostplan::service::posts::CreatePostRequest;
use libpostplan::service::{Event, PostplanService};
use libpostplan::{
    Config, Connection, FixedClock, PostStatus, PostplanError, StaticConnections, ValidationError,
};

/// The pinned "now" for every test: 2026-06-03 09:00:00 UTC.
fn now_ts() -> i64 {
    Utc.with_ymd_and_hms(2026, 6, 3, 9, 0, 0).unwrap().timestamp()
}

fn tomorrow_noon() -> i64 {
    Utc.with_ymd_and_hms(2026, 6, 4, 12, 0, 0).unwrap().timestamp()
}

async fn setup() -> (PostplanService, Arc<StaticConnections>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("posts.db");

    let mut config = Config::default_config();
    config.database.path = db_path.to_str().unwrap().to_string();

    let connections = Arc::new(StaticConnections::new());
    let clock = Arc::new(FixedClock::from_timestamp(now_ts()));

    let service = PostplanService::build(config, clock, Some(connections.clone() as _))
        .await
        .unwrap();

    (service, connections, temp_dir)
}

fn connect(connections: &StaticConnections, owner: &str, platform: &str) {
    connections.connect(Connection {
        owner_id: owner.to_string(),
        platform: platform.to_string(),
        platform_username: format!("{}-handle", owner),
        profile_picture_url: None,
        updated_at: now_ts(),
    });
}

fn draft_request(owner: &str, platform: &str, content: &str) -> CreatePostRequest {
    CreatePostRequest {
        owner_id: owner.to_string(),
        platform: platform.to_string(),
        content: content.to_string(),
        media_urls: vec![],
        scheduled_at: None,
    }
}

#[tokio::test]
async fn test_create_draft_and_read_back() {
    let (service, _connections, _tmp) = setup().await;

    let post = service
        .posts()
        .create_post(draft_request("owner-1", "twitter", "First draft"))
        .await
        .unwrap();

    assert_eq!(post.status, PostStatus::Draft);
    assert_eq!(post.scheduled_at, None);

    let stored = service.posts().get_post("owner-1", &post.id).await.unwrap();
    assert_eq!(stored, post);
}

#[tokio::test]
async fn test_twitter_281_characters_rejected_280_accepted() {
    let (service, _connections, _tmp) = setup().await;

    let long = "a".repeat(281);
    let result = service
        .posts()
        .create_post(draft_request("owner-1", "twitter", &long))
        .await;
    match result {
        Err(PostplanError::Validation(ValidationError::ContentTooLong { limit, length })) => {
            assert_eq!(limit, 280);
            assert_eq!(length, 281);
        }
        other => panic!("Expected ContentTooLong, got {:?}", other.err()),
    }

    // Nothing was persisted by the failed create
    assert!(service
        .posts()
        .list_posts_by_owner("owner-1")
        .await
        .unwrap()
        .is_empty());

    // Trimmed to exactly the ceiling it goes through as a draft
    let trimmed = "a".repeat(280);
    let post = service
        .posts()
        .create_post(draft_request("owner-1", "twitter", &trimmed))
        .await
        .unwrap();
    assert_eq!(post.status, PostStatus::Draft);
}

#[tokio::test]
async fn test_empty_post_needs_media() {
    let (service, _connections, _tmp) = setup().await;

    let result = service
        .posts()
        .create_post(draft_request("owner-1", "twitter", ""))
        .await;
    assert!(matches!(
        result,
        Err(PostplanError::Validation(ValidationError::EmptyPost))
    ));

    // One media URL is enough to carry an empty-content post
    let mut request = draft_request("owner-1", "twitter", "");
    request.media_urls = vec!["https://cdn/pic.png".to_string()];
    let post = service.posts().create_post(request).await.unwrap();
    assert_eq!(post.media_urls.len(), 1);
}

#[tokio::test]
async fn test_media_count_limit() {
    let (service, _connections, _tmp) = setup().await;

    let mut request = draft_request("owner-1", "twitter", "gallery");
    request.media_urls = (0..5).map(|i| format!("https://cdn/{}.png", i)).collect();

    let result = service.posts().create_post(request).await;
    assert!(matches!(
        result,
        Err(PostplanError::Validation(ValidationError::TooManyMedia { count: 5 }))
    ));
}

#[tokio::test]
async fn test_direct_scheduled_create_requires_connection() {
    let (service, connections, _tmp) = setup().await;

    let mut request = draft_request("owner-1", "linkedin", "Launch post");
    request.scheduled_at = Some(tomorrow_noon());

    // No connection yet: the create fails whole, nothing persisted
    let result = service.posts().create_post(request.clone()).await;
    match result {
        Err(PostplanError::PlatformNotConnected { platform }) => {
            assert_eq!(platform, "linkedin");
        }
        other => panic!("Expected PlatformNotConnected, got {:?}", other.err()),
    }
    assert!(service
        .posts()
        .list_posts_by_owner("owner-1")
        .await
        .unwrap()
        .is_empty());

    // After connecting, the identical call succeeds as scheduled
    connect(&connections, "owner-1", "linkedin");
    let post = service.posts().create_post(request).await.unwrap();
    assert_eq!(post.status, PostStatus::Scheduled);
    assert_eq!(post.scheduled_at, Some(tomorrow_noon()));
}

#[tokio::test]
async fn test_schedule_must_be_strictly_future() {
    let (service, connections, _tmp) = setup().await;
    connect(&connections, "owner-1", "twitter");

    let post = service
        .posts()
        .create_post(draft_request("owner-1", "twitter", "Soon"))
        .await
        .unwrap();

    // Exactly now is rejected
    let result = service
        .posts()
        .schedule_post("owner-1", &post.id, now_ts())
        .await;
    assert!(matches!(
        result,
        Err(PostplanError::Validation(ValidationError::ScheduleInPast))
    ));

    // In the past is rejected
    let result = service
        .posts()
        .schedule_post("owner-1", &post.id, now_ts() - 60)
        .await;
    assert!(matches!(
        result,
        Err(PostplanError::Validation(ValidationError::ScheduleInPast))
    ));

    // One second ahead is enough
    let scheduled = service
        .posts()
        .schedule_post("owner-1", &post.id, now_ts() + 1)
        .await
        .unwrap();
    assert_eq!(scheduled.status, PostStatus::Scheduled);
}

#[tokio::test]
async fn test_gate_checked_at_every_schedule_attempt() {
    let (service, connections, _tmp) = setup().await;

    let post = service
        .posts()
        .create_post(draft_request("owner-1", "twitter", "On again, off again"))
        .await
        .unwrap();

    // connect -> disconnect -> schedule: the gate sees the final state
    connect(&connections, "owner-1", "twitter");
    connections.disconnect("owner-1", "twitter");
    let result = service
        .posts()
        .schedule_post("owner-1", &post.id, tomorrow_noon())
        .await;
    assert!(matches!(
        result,
        Err(PostplanError::PlatformNotConnected { .. })
    ));
    let stored = service.posts().get_post("owner-1", &post.id).await.unwrap();
    assert_eq!(stored.status, PostStatus::Draft);

    // disconnect -> connect -> schedule succeeds
    connect(&connections, "owner-1", "twitter");
    let scheduled = service
        .posts()
        .schedule_post("owner-1", &post.id, tomorrow_noon())
        .await
        .unwrap();
    assert_eq!(scheduled.status, PostStatus::Scheduled);
}

#[tokio::test]
async fn test_update_allowed_only_for_drafts() {
    let (service, connections, _tmp) = setup().await;
    connect(&connections, "owner-1", "twitter");

    let post = service
        .posts()
        .create_post(draft_request("owner-1", "twitter", "Original"))
        .await
        .unwrap();

    // Draft updates re-validate the body
    let updated = service
        .posts()
        .update_post("owner-1", &post.id, "Edited".to_string(), vec![])
        .await
        .unwrap();
    assert_eq!(updated.content, "Edited");

    let result = service
        .posts()
        .update_post("owner-1", &post.id, "a".repeat(281), vec![])
        .await;
    assert!(matches!(
        result,
        Err(PostplanError::Validation(ValidationError::ContentTooLong { .. }))
    ));

    // Scheduled posts refuse updates and stay untouched
    service
        .posts()
        .schedule_post("owner-1", &post.id, tomorrow_noon())
        .await
        .unwrap();
    let result = service
        .posts()
        .update_post("owner-1", &post.id, "Too late".to_string(), vec![])
        .await;
    assert!(matches!(result, Err(PostplanError::InvalidState { .. })));

    let stored = service.posts().get_post("owner-1", &post.id).await.unwrap();
    assert_eq!(stored.content, "Edited");

    // Published posts refuse updates too
    service
        .posts()
        .mark_published("owner-1", &post.id)
        .await
        .unwrap();
    let result = service
        .posts()
        .update_post("owner-1", &post.id, "Still too late".to_string(), vec![])
        .await;
    assert!(matches!(result, Err(PostplanError::InvalidState { .. })));
}

#[tokio::test]
async fn test_publisher_callbacks() {
    let (service, connections, _tmp) = setup().await;
    connect(&connections, "owner-1", "linkedin");

    let mut request = draft_request("owner-1", "linkedin", "Will fail then retry");
    request.scheduled_at = Some(tomorrow_noon());
    let post = service.posts().create_post(request).await.unwrap();

    // Publisher reports failure with an opaque reason
    let failed = service
        .posts()
        .mark_failed("owner-1", &post.id, "HTTP 503 from platform".to_string())
        .await
        .unwrap();
    assert_eq!(failed.status, PostStatus::Failed);
    assert_eq!(failed.failure_reason.as_deref(), Some("HTTP 503 from platform"));

    // Failed cannot be published; the only way out is an explicit revert
    let result = service.posts().mark_published("owner-1", &post.id).await;
    assert!(matches!(result, Err(PostplanError::InvalidState { .. })));

    let reverted = service
        .posts()
        .revert_to_draft("owner-1", &post.id)
        .await
        .unwrap();
    assert_eq!(reverted.status, PostStatus::Draft);
    assert_eq!(reverted.scheduled_at, None);
    assert_eq!(reverted.failure_reason, None);

    // Round two: schedule again and publish
    service
        .posts()
        .schedule_post("owner-1", &post.id, tomorrow_noon())
        .await
        .unwrap();
    let published = service
        .posts()
        .mark_published("owner-1", &post.id)
        .await
        .unwrap();
    assert_eq!(published.status, PostStatus::Published);

    // Published is terminal
    let result = service.posts().cancel_post("owner-1", &post.id).await;
    assert!(matches!(result, Err(PostplanError::InvalidState { .. })));
}

#[tokio::test]
async fn test_cancel_draft_and_scheduled() {
    let (service, connections, _tmp) = setup().await;
    connect(&connections, "owner-1", "twitter");

    let draft = service
        .posts()
        .create_post(draft_request("owner-1", "twitter", "Never mind"))
        .await
        .unwrap();
    let cancelled = service
        .posts()
        .cancel_post("owner-1", &draft.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, PostStatus::Cancelled);

    let mut request = draft_request("owner-1", "twitter", "Also never mind");
    request.scheduled_at = Some(tomorrow_noon());
    let scheduled = service.posts().create_post(request).await.unwrap();
    let cancelled = service
        .posts()
        .cancel_post("owner-1", &scheduled.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, PostStatus::Cancelled);

    // Cancelled is terminal
    let result = service
        .posts()
        .schedule_post("owner-1", &scheduled.id, tomorrow_noon())
        .await;
    assert!(matches!(result, Err(PostplanError::InvalidState { .. })));
}

#[tokio::test]
async fn test_operations_are_owner_scoped() {
    let (service, _connections, _tmp) = setup().await;

    let post = service
        .posts()
        .create_post(draft_request("owner-1", "twitter", "Mine"))
        .await
        .unwrap();

    let result = service.posts().get_post("owner-2", &post.id).await;
    assert!(matches!(result, Err(PostplanError::NotFound(_))));

    let result = service
        .posts()
        .update_post("owner-2", &post.id, "Theirs".to_string(), vec![])
        .await;
    assert!(matches!(result, Err(PostplanError::NotFound(_))));
}

#[tokio::test]
async fn test_lifecycle_events_are_emitted() {
    let (service, connections, _tmp) = setup().await;
    connect(&connections, "owner-1", "twitter");
    let mut events = service.subscribe();

    let post = service
        .posts()
        .create_post(draft_request("owner-1", "twitter", "Watch me"))
        .await
        .unwrap();
    service
        .posts()
        .schedule_post("owner-1", &post.id, tomorrow_noon())
        .await
        .unwrap();
    service
        .posts()
        .mark_published("owner-1", &post.id)
        .await
        .unwrap();

    assert!(matches!(
        events.recv().await.unwrap(),
        Event::PostCreated { status: PostStatus::Draft, .. }
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        Event::PostScheduled { .. }
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        Event::PostPublished { .. }
    ));
}

#[tokio::test]
async fn test_unknown_platform_rejected_at_create() {
    let (service, _connections, _tmp) = setup().await;

    let result = service
        .posts()
        .create_post(draft_request("owner-1", "friendster", "hello"))
        .await;
    assert!(matches!(
        result,
        Err(PostplanError::Validation(ValidationError::UnsupportedPlatform(_)))
    ));
}
