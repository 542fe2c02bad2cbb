// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Activities (append-only emission records)
//! - Emission factor tables (read-only)

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::{collections, ActivityQuery, ActivityStore};
use crate::error::AppError;
use crate::models::{Activity, EmissionFactors};
use crate::services::FactorProvider;
use crate::time_utils::format_utc_rfc3339;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator takes an unauthenticated connection.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Emission Factor Operations ──────────────────────────────

    /// Get a stored emission factor table by version.
    pub async fn get_emission_factors(
        &self,
        version: &str,
    ) -> Result<Option<EmissionFactors>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EMISSION_FACTORS)
            .obj()
            .one(version)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

// ─── Activity Operations ─────────────────────────────────────

#[async_trait]
impl ActivityStore for FirestoreDb {
    async fn add_activity(&self, activity: &Activity) -> Result<String, AppError> {
        let stored: Activity = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::ACTIVITIES)
            .generate_document_id()
            .object(activity)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        stored
            .id
            .ok_or_else(|| AppError::Database("Insert returned no document ID".to_string()))
    }

    async fn list_activities(
        &self,
        user_id: &str,
        query: ActivityQuery,
    ) -> Result<Vec<Activity>, AppError> {
        let client = self.get_client()?;
        let user_id = user_id.to_string();
        let since = query.since.map(format_utc_rfc3339);
        let before = query.before.map(format_utc_rfc3339);

        let mut select = client
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| {
                q.for_all([
                    q.field("userId").eq(user_id.clone()),
                    since
                        .clone()
                        .and_then(|date| q.field("date").greater_than_or_equal(date)),
                    before
                        .clone()
                        .and_then(|date| q.field("date").less_than(date)),
                ])
            })
            .order_by([
                ("date", firestore::FirestoreQueryDirection::Descending),
                ("__name__", firestore::FirestoreQueryDirection::Descending),
            ]);

        if let Some(cursor) = query.after {
            let doc_path = format!(
                "{}/{}/{}",
                client.get_documents_path(),
                collections::ACTIVITIES,
                cursor.id
            );
            select = select.start_at(firestore::FirestoreQueryCursor::AfterValue(vec![
                format_utc_rfc3339(cursor.date).into(),
                firestore::FirestoreReference(doc_path).into(),
            ]));
        }

        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        select
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

// ─── Factor Provider ─────────────────────────────────────────

#[async_trait]
impl FactorProvider for FirestoreDb {
    /// Read `emission_factors/{version}`, serving the built-in table when the
    /// document does not exist.
    async fn get_factors(&self, version: &str) -> Result<Arc<EmissionFactors>, AppError> {
        match self.get_emission_factors(version).await? {
            Some(factors) => Ok(Arc::new(factors)),
            None => {
                tracing::warn!(version, "Emission factors not found, using built-in table");
                Ok(Arc::new(EmissionFactors::v1()))
            }
        }
    }
}
