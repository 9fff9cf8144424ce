//! Credentials and upload endpoint, baked in at build time from `.env`.
//! See `.env.example`.

use aqua_core::config::{DEFAULT_ENDPOINT, InternetConfig};

pub const WIFI_SSID: &str = env!("WIFI_SSID");
pub const WIFI_PASSWORD: &str = env!("WIFI_PASSWORD");

const UPLINK_ENDPOINT: &str = env!("UPLINK_ENDPOINT");

/// Upload URL, falling back to the stock endpoint when none was configured
pub const ENDPOINT: &str = if UPLINK_ENDPOINT.is_empty() {
    DEFAULT_ENDPOINT
} else {
    UPLINK_ENDPOINT
};

pub const INTERNET: InternetConfig<'static> = InternetConfig {
    ssid: WIFI_SSID,
    password: WIFI_PASSWORD,
};
