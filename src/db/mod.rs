//! Database layer (Firestore, with an in-memory store for development).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::InMemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::Activity;

/// Collection names as constants.
pub mod collections {
    pub const ACTIVITIES: &str = "activities";
    /// Emission factor tables (keyed by version)
    pub const EMISSION_FACTORS: &str = "emission_factors";
}

/// Position of the last activity on a history page.
///
/// Listings are ordered by `(date, id)` descending, so the pair identifies a
/// unique position even when several activities share a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCursor {
    pub date: DateTime<Utc>,
    pub id: String,
}

impl ActivityCursor {
    /// Cursor pointing at a stored activity, if it has an ID.
    pub fn from_activity(activity: &Activity) -> Option<Self> {
        activity.id.as_ref().map(|id| Self {
            date: activity.date,
            id: id.clone(),
        })
    }

    /// Whether `activity` sorts strictly after this position.
    pub fn precedes(&self, activity: &Activity) -> bool {
        let id = activity.id.as_deref().unwrap_or("");
        (activity.date, id) < (self.date, self.id.as_str())
    }
}

/// Filters for listing a user's activities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityQuery {
    /// Only activities at or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Only activities strictly before this instant
    pub before: Option<DateTime<Utc>>,
    /// Only activities after this page position
    pub after: Option<ActivityCursor>,
    /// Maximum number of results
    pub limit: Option<u32>,
}

impl ActivityQuery {
    pub fn matches(&self, activity: &Activity) -> bool {
        self.since.map_or(true, |since| activity.date >= since)
            && self.before.map_or(true, |before| activity.date < before)
            && self
                .after
                .as_ref()
                .map_or(true, |cursor| cursor.precedes(activity))
    }
}

/// Persistence collaborator for activity records.
///
/// Records are append-only; failures are reported to the caller and never
/// retried here.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Store a fully computed activity, returning its assigned ID.
    async fn add_activity(&self, activity: &Activity) -> Result<String, AppError>;

    /// List a user's activities, newest first (ties broken by ID, descending).
    async fn list_activities(
        &self,
        user_id: &str,
        query: ActivityQuery,
    ) -> Result<Vec<Activity>, AppError>;
}
