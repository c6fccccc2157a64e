//! Shopify Admin REST client
//!
//! Implements [`CatalogClient`] with two calls: the paginated product listing
//! searched by variant barcode, and `inventory_levels/set`. Non-success
//! responses keep their body so the platform's own error message reaches the
//! logs.

use async_trait::async_trait;
use reqwest::Response;
use reqwest::header::{HeaderMap, LINK};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::domain::catalog::{CatalogItem, InventoryAssignment};
use crate::domain::constants::shopify::{ACCESS_TOKEN_HEADER, PRODUCT_PAGE_LIMIT};
use crate::domain::errors::{CatalogError, ErrorPayload};
use crate::domain::repositories::CatalogClient;
use crate::infrastructure::config::{Secret, ShopifyConfig};
use crate::infrastructure::http_client::HttpClient;

const FIND_ITEMS: &str = "find items by barcode";
const SET_LEVEL: &str = "set inventory level";

#[derive(Debug, Deserialize)]
struct ProductList {
    #[serde(default)]
    products: Vec<CatalogItem>,
}

pub struct ShopifyClient {
    http: HttpClient,
    api_base: Url,
    access_token: Secret,
}

/// `https://{shop}.myshopify.com/admin/api/{version}/`, or the configured
/// override with the same path appended.
pub fn admin_api_base(config: &ShopifyConfig) -> Result<Url, url::ParseError> {
    let root = config
        .base_url
        .clone()
        .unwrap_or_else(|| format!("https://{}.myshopify.com", config.shop_name));
    Url::parse(&format!(
        "{}/admin/api/{}/",
        root.trim_end_matches('/'),
        config.api_version
    ))
}

/// Keep only items with a variant carrying `barcode`. The REST listing has
/// no barcode filter, so every page is searched here.
pub fn decode_product_list(body: &str, barcode: &str) -> Result<Vec<CatalogItem>, CatalogError> {
    let list: ProductList = serde_json::from_str(body).map_err(|e| CatalogError::Decode {
        operation: FIND_ITEMS,
        message: e.to_string(),
    })?;
    Ok(list
        .products
        .into_iter()
        .filter(|item| item.has_variant_with_barcode(barcode))
        .collect())
}

/// Target of the `rel="next"` entry of a `Link` header, if any.
///
/// Shopify paginates with cursors: the next page is only reachable through
/// the URL it hands back.
pub fn next_page_url(headers: &HeaderMap) -> Option<Url> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|link| {
            let mut parts = link.split(';');
            let target = parts.next()?.trim().strip_prefix('<')?.strip_suffix('>')?;
            let is_next = parts.any(|param| {
                param
                    .trim()
                    .strip_prefix("rel=")
                    .is_some_and(|rel| rel.trim_matches('"').eq_ignore_ascii_case("next"))
            });
            if is_next { Url::parse(target).ok() } else { None }
        })
}

impl ShopifyClient {
    pub fn new(http: HttpClient, config: &ShopifyConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            http,
            api_base: admin_api_base(config)?,
            access_token: config.access_token.clone(),
        })
    }

    fn endpoint(&self, operation: &'static str, path: &str) -> Result<Url, CatalogError> {
        self.api_base.join(path).map_err(|e| CatalogError::Decode {
            operation,
            message: format!("invalid endpoint '{path}': {e}"),
        })
    }

    /// Body of a successful response, or the platform's error payload.
    async fn read_body(operation: &'static str, response: Response) -> Result<String, CatalogError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::transport(operation, e.without_url()))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(CatalogError::Api {
                operation,
                status: status.as_u16(),
                payload: ErrorPayload::from_body(&body),
            })
        }
    }
}

#[async_trait]
impl CatalogClient for ShopifyClient {
    /// Walk the product listing page by page and stop at the first page that
    /// holds a variant with `barcode`.
    async fn find_items_by_barcode(&self, barcode: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        let mut first_page = self.endpoint(FIND_ITEMS, "products.json")?;
        first_page
            .query_pairs_mut()
            .append_pair("barcode", barcode)
            .append_pair("limit", &PRODUCT_PAGE_LIMIT.to_string());

        let mut next = Some(first_page);
        let mut pages = 0_u32;
        while let Some(url) = next.take() {
            pages += 1;
            let response = self
                .http
                .ready()
                .await
                .get(url.clone())
                .header(ACCESS_TOKEN_HEADER, self.access_token.expose())
                .send()
                .await
                .map_err(|e| CatalogError::transport(FIND_ITEMS, e))?;

            next = next_page_url(response.headers()).filter(|candidate| *candidate != url);
            let body = Self::read_body(FIND_ITEMS, response).await?;
            let items = decode_product_list(&body, barcode)?;
            if !items.is_empty() {
                debug!("Barcode {} matched {} catalog items on page {}", barcode, items.len(), pages);
                return Ok(items);
            }
        }

        debug!("Barcode {} matched no catalog items in {} page(s)", barcode, pages);
        Ok(Vec::new())
    }

    async fn set_inventory_level(&self, assignment: &InventoryAssignment) -> Result<(), CatalogError> {
        let url = self.endpoint(SET_LEVEL, "inventory_levels/set.json")?;

        let response = self
            .http
            .ready()
            .await
            .post(url)
            .header(ACCESS_TOKEN_HEADER, self.access_token.expose())
            .json(assignment)
            .send()
            .await
            .map_err(|e| CatalogError::transport(SET_LEVEL, e))?;

        Self::read_body(SET_LEVEL, response).await.map(|_| ())
    }
}
