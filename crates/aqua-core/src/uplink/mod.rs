//! Reading transmission
//!
//! One POST per tick, fire-and-forget. A reading that cannot be delivered is
//! logged and dropped; nothing is queued or retried.

pub mod http;

pub use http::{Endpoint, HttpResponse};

use alloc::string::String;

use log::{error, info, warn};

pub use crate::error::UplinkError;
use crate::sensors::Reading;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Port for the Wi-Fi association state. Polled before every send.
pub trait NetworkLink {
    fn is_connected(&self) -> bool;
}

impl<T: NetworkLink + ?Sized> NetworkLink for &T {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

/// Port for a single blocking HTTP POST.
///
/// Implementations own name resolution and the socket; the request framing is
/// available in [`http::exchange`].
pub trait HttpTransport {
    fn post(
        &mut self,
        endpoint: &Endpoint<'_>,
        content_type: &str,
        body: &[u8],
    ) -> impl Future<Output = Result<HttpResponse, UplinkError>>;
}

/// What happened to one reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Link was down; nothing was sent
    Disconnected,
    /// Server answered with this status
    Delivered { status: u16 },
    /// The request could not be completed
    Failed(UplinkError),
}

/// Serialize a reading as `{"ph":..,"turbidity":..,"temperature":..}`.
pub fn to_json(reading: &Reading) -> Result<String, UplinkError> {
    serde_json::to_string(reading).map_err(|_| UplinkError::Serialize)
}

pub struct Uplink<'c, L, T> {
    link: L,
    transport: T,
    endpoint: Endpoint<'c>,
}

impl<'c, L: NetworkLink, T: HttpTransport> Uplink<'c, L, T> {
    /// Fails only if `url` is not a usable `http://` URL.
    pub fn new(link: L, transport: T, url: &'c str) -> Result<Self, UplinkError> {
        Ok(Self {
            link,
            transport,
            endpoint: Endpoint::parse(url)?,
        })
    }

    pub async fn send(&mut self, reading: &Reading) -> SendOutcome {
        if !self.link.is_connected() {
            warn!("WiFi Disconnected");
            return SendOutcome::Disconnected;
        }

        let body = match to_json(reading) {
            Ok(body) => body,
            Err(e) => {
                error!("Error on sending POST: {}", e);
                return SendOutcome::Failed(e);
            }
        };

        match self
            .transport
            .post(&self.endpoint, CONTENT_TYPE_JSON, body.as_bytes())
            .await
        {
            Ok(response) => {
                if response.is_success() {
                    info!("{}", response.status);
                } else {
                    warn!("Server answered {}", response.status);
                }
                info!("{}", response.body);
                SendOutcome::Delivered {
                    status: response.status,
                }
            }
            Err(e) => {
                error!("Error on sending POST: {}", e);
                SendOutcome::Failed(e)
            }
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
