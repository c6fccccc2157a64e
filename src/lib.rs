//! Stock Sync - wholesaler feed to storefront inventory reconciliation
//!
//! Downloads the wholesaler's `;`-delimited stock feed, validates each
//! `(ean, stock)` row and pushes the quantity to one Shopify inventory
//! location, one item at a time.

pub mod application;
pub mod domain;
pub mod infrastructure;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::{Pacing, RetryPolicy, StockReconciler, SyncService};
use crate::domain::LocationId;
use crate::infrastructure::{AppConfig, HttpClient, ShopifyClient, feed_source_from_config};

/// Wire the production feed source and Shopify client from configuration.
pub fn build_service(config: &AppConfig) -> Result<SyncService<ShopifyClient>> {
    let http = HttpClient::new(config.http.clone())?;

    let feed = feed_source_from_config(&config.feed, &http).context("Invalid feed configuration")?;
    let catalog = ShopifyClient::new(http, &config.shopify).context("Invalid Shopify API base URL")?;

    let reconciler = StockReconciler::new(Arc::new(catalog), LocationId::new(config.shopify.location_id.trim()))
        .with_pacing(Pacing::from_config(&config.sync))
        .with_retry_policy(RetryPolicy::from_config(&config.sync));

    Ok(SyncService::new(feed, reconciler))
}
