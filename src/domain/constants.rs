//! Feed layout and reconciliation defaults
//!
//! Values the wholesaler feed and the storefront platform impose on us.
//! Everything here can be overridden through configuration except the
//! feed column names, which are part of the feed contract.

/// Wholesaler feed layout
pub mod feed {
    /// Field delimiter used by the wholesaler CSV export
    pub const DELIMITER: u8 = b';';

    /// Column holding the EAN barcode
    pub const EAN_COLUMN: &str = "ean";

    /// Column holding the stock quantity
    pub const STOCK_COLUMN: &str = "stock";

    /// Value of the `format` query parameter
    pub const DEFAULT_FORMAT: &str = "csv";

    /// Value of the `language_code` query parameter
    pub const DEFAULT_LANGUAGE_CODE: &str = "en-gb";

    /// Wholesaler feed endpoint (credentials are appended as query parameters)
    pub const DEFAULT_BASE_URL: &str = "https://www.btswholesaler.com/generatefeedbts";
}

/// Reconciliation loop pacing and retry limits
pub mod sync {
    /// Fixed part of the pause between two items (milliseconds)
    pub const DEFAULT_PACING_BASE_MS: u64 = 500;

    /// Upper bound (exclusive) of the random part of the pause (milliseconds)
    pub const DEFAULT_PACING_JITTER_MS: u64 = 200;

    /// Fixed wait before retrying a write after a connection reset (milliseconds)
    pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 3000;

    /// Total write attempts for one item, initial attempt included
    pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 3;
}

/// Storefront platform defaults
pub mod shopify {
    /// Admin REST API version
    pub const DEFAULT_API_VERSION: &str = "2024-01";

    /// Header carrying the Admin API access token
    pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

    /// Page size requested from the product listing (the platform maximum)
    pub const PRODUCT_PAGE_LIMIT: u32 = 250;

    /// Ceiling on platform requests per second, on top of the item pacing
    pub const DEFAULT_MAX_REQUESTS_PER_SECOND: u32 = 4;
}
