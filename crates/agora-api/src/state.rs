use std::sync::Arc;

use chrono_tz::Tz;

use agora_activity::ActivityLog;
use agora_db::Database;

use crate::activity::MAX_FEED_LIMIT;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// Holds the newest `MAX_FEED_LIMIT` records, enough for any listing
    pub activity: ActivityLog,
    /// Zone every feed line is rendered in
    pub zone: Tz,
}

impl AppStateInner {
    pub fn new(db: Database, zone: Tz) -> AppState {
        Arc::new(Self {
            db,
            activity: ActivityLog::with_capacity(MAX_FEED_LIMIT as usize),
            zone,
        })
    }
}
