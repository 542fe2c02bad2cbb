// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emission factor provider.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::models::EmissionFactors;

/// Supplies the active emission factor snapshot for a version tag.
#[async_trait]
pub trait FactorProvider: Send + Sync {
    async fn get_factors(&self, version: &str) -> Result<Arc<EmissionFactors>>;
}

/// Serves one fixed snapshot regardless of the requested version.
#[derive(Clone)]
pub struct StaticFactorProvider {
    factors: Arc<EmissionFactors>,
}

impl StaticFactorProvider {
    pub fn new(factors: EmissionFactors) -> Self {
        Self {
            factors: Arc::new(factors),
        }
    }
}

impl Default for StaticFactorProvider {
    fn default() -> Self {
        Self::new(EmissionFactors::v1())
    }
}

#[async_trait]
impl FactorProvider for StaticFactorProvider {
    async fn get_factors(&self, version: &str) -> Result<Arc<EmissionFactors>> {
        if version != self.factors.version {
            tracing::debug!(
                requested = version,
                serving = %self.factors.version,
                "Static factor table serves a single version"
            );
        }
        Ok(self.factors.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_shares_snapshot() {
        let provider = StaticFactorProvider::default();
        let a = provider.get_factors("v1").await.unwrap();
        let b = provider.get_factors("v2").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.version, "v1");
    }
}
