use std::time::Duration;

pub const DEFAULT_EXCHANGE_SUFFIX: &str = ".NS";
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_NSE_BASE_URL: &str = "https://www.nseindia.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the provider adapters and the acquisition facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionConfig {
    /// Appended to the uppercase symbol for the history provider.
    pub exchange_suffix: String,
    /// Applied per HTTP request and again around every facade call.
    pub request_timeout: Duration,
    pub yahoo_base_url: String,
    pub nse_base_url: String,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            exchange_suffix: String::from(DEFAULT_EXCHANGE_SUFFIX),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            yahoo_base_url: String::from(DEFAULT_YAHOO_BASE_URL),
            nse_base_url: String::from(DEFAULT_NSE_BASE_URL),
        }
    }
}

impl AcquisitionConfig {
    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}
