//! Calendar projection against a real store: grid shape, month membership,
//! day queries, and the suggested scheduling instant.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use libpostplan::service::posts::CreatePostRequest;
use libpostplan::service::PostplanService;
use libpostplan::{Config, Connection, FixedClock, StaticConnections};

/// Pinned "now": 2026-06-03 09:00:00 UTC.
fn now_ts() -> i64 {
    Utc.with_ymd_and_hms(2026, 6, 3, 9, 0, 0).unwrap().timestamp()
}

fn ts(year: i32, month: u32, day: u32, hour: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .unwrap()
        .timestamp()
}

async fn setup() -> (PostplanService, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("posts.db");

    let mut config = Config::default_config();
    config.database.path = db_path.to_str().unwrap().to_string();

    let connections = Arc::new(StaticConnections::new());
    connections.connect(Connection {
        owner_id: "owner-1".to_string(),
        platform: "twitter".to_string(),
        platform_username: "owner-1-handle".to_string(),
        profile_picture_url: None,
        updated_at: now_ts(),
    });

    let clock = Arc::new(FixedClock::from_timestamp(now_ts()));
    let service = PostplanService::build(config, clock, Some(connections as _))
        .await
        .unwrap();

    (service, temp_dir)
}

async fn seed_post(service: &PostplanService, content: &str, scheduled_at: Option<i64>) -> String {
    service
        .posts()
        .create_post(CreatePostRequest {
            owner_id: "owner-1".to_string(),
            platform: "twitter".to_string(),
            content: content.to_string(),
            media_urls: vec![],
            scheduled_at,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_month_grid_shape_and_membership() {
    let (service, _tmp) = setup().await;

    let june_4 = seed_post(&service, "june 4th", Some(ts(2026, 6, 4, 10))).await;
    let june_4_later = seed_post(&service, "june 4th later", Some(ts(2026, 6, 4, 18))).await;
    let june_20 = seed_post(&service, "june 20th", Some(ts(2026, 6, 20, 12))).await;
    // A draft lands on its creation day (the pinned now: June 3rd)
    let draft = seed_post(&service, "draft", None).await;
    // Next month: visible in July's grid, absent from June's
    let july_1 = seed_post(&service, "july 1st", Some(ts(2026, 7, 1, 9))).await;

    let grid = service
        .calendar()
        .get_calendar_month("owner-1", 2026, 6)
        .await
        .unwrap();

    assert_eq!(grid.days_in_month, 30);
    assert_eq!(grid.cells.len() % 7, 0);

    // Every in-month post appears exactly once, sorted within its day
    let day4: Vec<&str> = grid
        .day(4)
        .unwrap()
        .posts
        .iter()
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(day4, vec![&june_4[..], &june_4_later[..]]);
    assert_eq!(grid.day(3).unwrap().posts[0].id, draft);
    assert_eq!(grid.day(20).unwrap().posts[0].id, june_20);

    let all_ids: Vec<&str> = grid
        .cells
        .iter()
        .flatten()
        .flat_map(|cell| cell.posts.iter().map(|p| p.id.as_str()))
        .collect();
    assert_eq!(all_ids.len(), 4);
    assert!(!all_ids.contains(&&july_1[..]));

    let july = service
        .calendar()
        .get_calendar_month("owner-1", 2026, 7)
        .await
        .unwrap();
    assert_eq!(july.day(1).unwrap().posts[0].id, july_1);
}

#[tokio::test]
async fn test_leap_february_grid() {
    let (service, _tmp) = setup().await;

    let grid = service
        .calendar()
        .get_calendar_month("owner-1", 2024, 2)
        .await
        .unwrap();

    assert_eq!(grid.days_in_month, 29);
    // 2024-02-01 was a Thursday: 4 leading blanks, padded to 35 cells
    assert_eq!(grid.first_weekday, 4);
    assert_eq!(grid.cells.len(), 35);
}

#[tokio::test]
async fn test_day_listing_matches_grid_cell() {
    let (service, _tmp) = setup().await;

    seed_post(&service, "morning", Some(ts(2026, 6, 10, 8))).await;
    seed_post(&service, "evening", Some(ts(2026, 6, 10, 21))).await;
    seed_post(&service, "next day", Some(ts(2026, 6, 11, 8))).await;

    let grid = service
        .calendar()
        .get_calendar_month("owner-1", 2026, 6)
        .await
        .unwrap();
    let listed = service
        .calendar()
        .list_day("owner-1", 2026, 6, 10)
        .await
        .unwrap();

    assert_eq!(grid.day(10).unwrap().posts, listed);
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn test_projection_is_stable_across_runs() {
    let (service, _tmp) = setup().await;
    seed_post(&service, "fixture", Some(ts(2026, 6, 15, 12))).await;

    let first = service
        .calendar()
        .get_calendar_month("owner-1", 2026, 6)
        .await
        .unwrap();
    let second = service
        .calendar()
        .get_calendar_month("owner-1", 2026, 6)
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_suggested_instant_for_clicked_days() {
    let (service, _tmp) = setup().await;

    // Today before noon: noon today
    let suggested = service
        .calendar()
        .suggest_schedule_instant(2026, 6, 3)
        .unwrap();
    assert_eq!(suggested, Utc.with_ymd_and_hms(2026, 6, 3, 12, 0, 0).unwrap());

    // A future day: noon that day
    let suggested = service
        .calendar()
        .suggest_schedule_instant(2026, 6, 25)
        .unwrap();
    assert_eq!(
        suggested,
        Utc.with_ymd_and_hms(2026, 6, 25, 12, 0, 0).unwrap()
    );

    // A past day: one hour from the pinned now
    let suggested = service
        .calendar()
        .suggest_schedule_instant(2026, 6, 1)
        .unwrap();
    assert_eq!(suggested, Utc.with_ymd_and_hms(2026, 6, 3, 10, 0, 0).unwrap());
}
