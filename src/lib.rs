// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Carbon-Tracker: log everyday activities and follow their footprint
//!
//! This crate provides the backend API for converting transport, energy and
//! diet activities into kg CO2e, summarizing them per week and suggesting
//! reduction tips.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::ActivityStore;
use services::{ActivityLogger, FactorProvider, TipsService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ActivityStore>,
    pub factors: Arc<dyn FactorProvider>,
    pub activity_logger: ActivityLogger,
    pub tips_service: TipsService,
}

impl AppState {
    /// Wire the services over a store and factor provider.
    pub fn new(
        config: Config,
        store: Arc<dyn ActivityStore>,
        factors: Arc<dyn FactorProvider>,
        tips_service: TipsService,
    ) -> Self {
        let activity_logger =
            ActivityLogger::new(store.clone(), factors.clone(), config.factors_version.clone());

        Self {
            config,
            store,
            factors,
            activity_logger,
            tips_service,
        }
    }
}
