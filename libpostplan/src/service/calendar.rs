//! Calendar queries
//!
//! Read side of the engine: month grids and day listings built from the
//! store, plus the default scheduling instant for a clicked day. All the
//! math lives in `crate::calendar`; this service only wires in the store,
//! clock, and owner offset.

use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;

use crate::calendar::{self, MonthGrid};
use crate::clock::Clock;
use crate::error::Result;
use crate::types::Post;
use crate::Database;

#[derive(Clone)]
pub struct CalendarService {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl CalendarService {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self { db, clock, offset }
    }

    /// Project an owner's posts onto the month grid. A read-only snapshot;
    /// the same store contents always produce the same grid.
    pub async fn get_calendar_month(
        &self,
        owner_id: &str,
        year: i32,
        month: u32,
    ) -> Result<MonthGrid> {
        let posts = self.db.list_posts_by_owner(owner_id).await?;
        calendar::project(year, month, &posts, self.offset)
    }

    /// Posts landing on one calendar day, for day-detail views.
    pub async fn list_day(
        &self,
        owner_id: &str,
        year: i32,
        month: u32,
        day: u32,
    ) -> Result<Vec<Post>> {
        self.db
            .list_posts_by_day(owner_id, year, month, day, self.offset)
            .await
    }

    /// Default scheduling instant for a clicked day, pre-filling the
    /// create form.
    pub fn suggest_schedule_instant(
        &self,
        year: i32,
        month: u32,
        day: u32,
    ) -> Result<DateTime<Utc>> {
        calendar::default_schedule_instant(year, month, day, self.clock.now(), self.offset)
    }
}
