// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local activity store for development and tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::db::{ActivityQuery, ActivityStore};
use crate::error::AppError;
use crate::models::Activity;

/// In-memory activity store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryStore {
    activities: RwLock<Vec<Activity>>,
    next_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored activities across all users.
    pub async fn len(&self) -> usize {
        self.activities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.activities.read().await.is_empty()
    }
}

#[async_trait]
impl ActivityStore for InMemoryStore {
    async fn add_activity(&self, activity: &Activity) -> Result<String, AppError> {
        // Zero-padded so string order follows insertion order
        let id = format!("mem-{:010}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);

        let mut stored = activity.clone();
        stored.id = Some(id.clone());
        self.activities.write().await.push(stored);

        Ok(id)
    }

    async fn list_activities(
        &self,
        user_id: &str,
        query: ActivityQuery,
    ) -> Result<Vec<Activity>, AppError> {
        let mut matching: Vec<Activity> = self
            .activities
            .read()
            .await
            .iter()
            .filter(|a| a.user_id == user_id && query.matches(a))
            .cloned()
            .collect();

        matching.sort_by(|a, b| (b.date, &b.id).cmp(&(a.date, &a.id)));

        if let Some(limit) = query.limit {
            matching.truncate(limit as usize);
        }

        Ok(matching)
    }
}
