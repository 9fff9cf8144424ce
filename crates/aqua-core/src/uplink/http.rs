//! Minimal HTTP/1.1 client framing over an async byte stream
//!
//! Only what a single `Connection: close` POST needs: write the request,
//! read until the response is complete, pick out the status code and body.

use alloc::string::String;
use core::fmt::Write as _;

use embedded_io_async::{Error as _, Read, Write};
use log::debug;

use crate::error::UplinkError;

pub const DEFAULT_HTTP_PORT: u16 = 80;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// A parsed `http://host[:port]/path` URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
}

impl<'a> Endpoint<'a> {
    pub fn parse(url: &'a str) -> Result<Self, UplinkError> {
        let rest = url
            .strip_prefix("http://")
            .ok_or(UplinkError::InvalidEndpoint("only http:// URLs are supported"))?;

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| UplinkError::InvalidEndpoint("port is not a number"))?;
                (host, port)
            }
            None => (authority, DEFAULT_HTTP_PORT),
        };

        if host.is_empty() {
            return Err(UplinkError::InvalidEndpoint("missing host"));
        }

        Ok(Self { host, port, path })
    }
}

/// Status code and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn io_error<E: embedded_io_async::Error>(e: E) -> UplinkError {
    UplinkError::Io(e.kind())
}

/// Write a complete POST request, headers and body, then flush.
pub async fn write_request<W: Write>(
    stream: &mut W,
    endpoint: &Endpoint<'_>,
    content_type: &str,
    body: &[u8],
) -> Result<(), UplinkError> {
    let mut head = String::with_capacity(128 + endpoint.path.len());
    // Writing into a String cannot fail.
    let _ = write!(head, "POST {} HTTP/1.1\r\nHost: {}", endpoint.path, endpoint.host);
    if endpoint.port != DEFAULT_HTTP_PORT {
        let _ = write!(head, ":{}", endpoint.port);
    }
    let _ = write!(
        head,
        "\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        content_type,
        body.len()
    );

    stream.write_all(head.as_bytes()).await.map_err(io_error)?;
    stream.write_all(body).await.map_err(io_error)?;
    stream.flush().await.map_err(io_error)
}

/// Read until the response is complete, the peer closes the connection, or
/// `buffer` is full, then parse.
///
/// A response is complete once its headers and `Content-Length` bytes of body
/// have arrived. A read error after the header block counts as a close. A
/// response larger than `buffer` is parsed from what fits.
pub async fn read_response<R: Read>(
    stream: &mut R,
    buffer: &mut [u8],
) -> Result<HttpResponse, UplinkError> {
    let mut filled = 0;
    while filled < buffer.len() {
        match stream.read(&mut buffer[filled..]).await {
            Ok(0) => break,
            Ok(n) => {
                filled += n;
                if is_complete(&buffer[..filled]) {
                    break;
                }
            }
            Err(e) if header_end(&buffer[..filled]).is_some() => {
                debug!("Connection ended after headers ({:?}); using received bytes", e.kind());
                break;
            }
            Err(e) => return Err(io_error(e)),
        }
    }
    parse_response(&buffer[..filled])
}

/// Send one POST and wait for the reply on an already-connected stream.
pub async fn exchange<S: Read + Write>(
    stream: &mut S,
    endpoint: &Endpoint<'_>,
    content_type: &str,
    body: &[u8],
    buffer: &mut [u8],
) -> Result<HttpResponse, UplinkError> {
    write_request(stream, endpoint, content_type, body).await?;
    read_response(stream, buffer).await
}

fn header_end(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

/// `Content-Length` from a header block, skipping the status line
fn content_length(head: &str) -> Option<usize> {
    head.split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
}

fn is_complete(bytes: &[u8]) -> bool {
    let Some(end) = header_end(bytes) else {
        return false;
    };
    let Ok(head) = core::str::from_utf8(&bytes[..end]) else {
        return false;
    };
    content_length(head).is_some_and(|len| bytes.len() >= end + HEADER_TERMINATOR.len() + len)
}

pub fn parse_response(bytes: &[u8]) -> Result<HttpResponse, UplinkError> {
    let end = header_end(bytes).ok_or(UplinkError::MalformedResponse("missing end of headers"))?;

    let head = core::str::from_utf8(&bytes[..end])
        .map_err(|_| UplinkError::MalformedResponse("headers are not UTF-8"))?;

    let status_line = head.split("\r\n").next().unwrap_or_default();
    let mut parts = status_line.split_whitespace();
    if !parts.next().is_some_and(|v| v.starts_with("HTTP/1.")) {
        return Err(UplinkError::MalformedResponse("bad status line"));
    }
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .filter(|code| (100..600).contains(code))
        .ok_or(UplinkError::MalformedResponse("bad status code"))?;

    let mut body = &bytes[end + HEADER_TERMINATOR.len()..];
    if let Some(len) = content_length(head) {
        body = &body[..len.min(body.len())];
    }

    Ok(HttpResponse {
        status,
        body: String::from_utf8_lossy(body).into_owned(),
    })
}
