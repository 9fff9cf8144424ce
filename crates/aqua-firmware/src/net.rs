//! Network adapters over the embassy-net stack

use aqua_core::uplink::http;
use aqua_core::{Endpoint, HttpResponse, HttpTransport, NetworkLink, UplinkError};
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::{self, TcpSocket};
use embassy_net::{IpAddress, Stack};
use embassy_time::Duration;
use log::{debug, error};

const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);
const SOCKET_BUFFER_SIZE: usize = 1024;
const RESPONSE_BUFFER_SIZE: usize = 1024;

/// Connected once the interface is up and DHCP has handed out an address.
pub struct StackLink<'a> {
    stack: Stack<'a>,
}

impl<'a> StackLink<'a> {
    pub fn new(stack: Stack<'a>) -> Self {
        Self { stack }
    }
}

impl NetworkLink for StackLink<'_> {
    fn is_connected(&self) -> bool {
        self.stack.is_link_up() && self.stack.config_v4().is_some()
    }
}

/// One TCP connection per POST.
pub struct TcpTransport<'a> {
    stack: Stack<'a>,
    rx_buffer: [u8; SOCKET_BUFFER_SIZE],
    tx_buffer: [u8; SOCKET_BUFFER_SIZE],
    response: [u8; RESPONSE_BUFFER_SIZE],
}

impl<'a> TcpTransport<'a> {
    pub fn new(stack: Stack<'a>) -> Self {
        Self {
            stack,
            rx_buffer: [0; SOCKET_BUFFER_SIZE],
            tx_buffer: [0; SOCKET_BUFFER_SIZE],
            response: [0; RESPONSE_BUFFER_SIZE],
        }
    }

    async fn resolve(&self, host: &str) -> Result<IpAddress, UplinkError> {
        if let Ok(ip) = host.parse::<core::net::Ipv4Addr>() {
            return Ok(IpAddress::Ipv4(ip));
        }
        let addresses = self
            .stack
            .dns_query(host, DnsQueryType::A)
            .await
            .map_err(|e| {
                error!("DNS lookup for {} failed: {:?}", host, e);
                UplinkError::Dns
            })?;
        addresses.first().copied().ok_or(UplinkError::Dns)
    }
}

impl HttpTransport for TcpTransport<'_> {
    async fn post(
        &mut self,
        endpoint: &Endpoint<'_>,
        content_type: &str,
        body: &[u8],
    ) -> Result<HttpResponse, UplinkError> {
        let address = self.resolve(endpoint.host).await?;
        debug!("POST to {:?}:{}", address, endpoint.port);

        let mut socket = TcpSocket::new(self.stack, &mut self.rx_buffer, &mut self.tx_buffer);
        socket.set_timeout(Some(SOCKET_TIMEOUT));
        socket
            .connect((address, endpoint.port))
            .await
            .map_err(|e| {
                error!("TCP connect to {}:{} failed: {:?}", endpoint.host, endpoint.port, e);
                UplinkError::Connect
            })?;

        let mut stream = SocketStream(socket);
        let result = http::exchange(&mut stream, endpoint, content_type, body, &mut self.response).await;
        stream.0.close();
        result
    }
}

/// Bridges the socket onto the `embedded-io-async` version `aqua-core` speaks.
struct SocketStream<'s>(TcpSocket<'s>);

#[derive(Debug)]
struct SocketError(tcp::Error);

impl embedded_io::Error for SocketError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0 {
            tcp::Error::ConnectionReset => embedded_io::ErrorKind::ConnectionReset,
        }
    }
}

impl embedded_io_async::ErrorType for SocketStream<'_> {
    type Error = SocketError;
}

impl embedded_io_async::Read for SocketStream<'_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SocketError> {
        self.0.read(buf).await.map_err(SocketError)
    }
}

impl embedded_io_async::Write for SocketStream<'_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, SocketError> {
        self.0.write(buf).await.map_err(SocketError)
    }

    async fn flush(&mut self) -> Result<(), SocketError> {
        self.0.flush().await.map_err(SocketError)
    }
}
