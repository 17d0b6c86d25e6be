//! Turning category criteria into concrete recommendations

use crate::category::{AssetClass, InvestmentCategory};
use crate::error::Result;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Produces the recommendation for one category of a draft plan
#[async_trait]
pub trait CategoryProcessor: Send + Sync {
    async fn process(&self, category: &InvestmentCategory) -> Result<String>;
}

/// Fixed recommendations per asset class
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

impl StaticCatalog {
    pub fn recommendation(class: AssetClass) -> &'static str {
        match class {
            AssetClass::Stocks => "Recommended stocks are: GOOG, AMAZN, INTU and DAL",
            AssetClass::Etfs => "The good ETF candidates are: AIA.US, BOTZ.US",
            AssetClass::StockIndices => "The good Stock Indices candidates are: SPA, QQQ",
            AssetClass::UsBonds => "Recommended bonds are: Treasury Bond 3 month",
            AssetClass::Crypto => "",
        }
    }
}

#[async_trait]
impl CategoryProcessor for StaticCatalog {
    #[instrument(skip_all, fields(category = %category.asset_class()))]
    async fn process(&self, category: &InvestmentCategory) -> Result<String> {
        debug!("Criteria: {}", category.criteria().screening());
        Ok(Self::recommendation(category.asset_class()).to_string())
    }
}
