//! The transport seam between the CalDAV layer and HTTP.
//!
//! [`CalDavClient`](crate::CalDavClient) only ever talks to a [`Transport`].
//! Production uses [`HttpTransport`](crate::HttpTransport); tests plug in a
//! [`ScriptedTransport`] that replays canned responses and records what was
//! sent.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use crate::error::{CalDavError, CalDavResult};

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Content type of every XML request body.
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// HTTP methods used by the CalDAV layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DavMethod {
    Propfind,
    Report,
    Put,
    Delete,
}

impl DavMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Propfind => "PROPFIND",
            Self::Report => "REPORT",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for DavMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound request. Authentication is added by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavRequest {
    pub method: DavMethod,
    /// Absolute request URL.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl DavRequest {
    pub fn new(method: DavMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the `Depth` header.
    pub fn with_depth(self, depth: u8) -> Self {
        self.with_header("Depth", depth.to_string())
    }

    /// Sets an XML body and its content type.
    pub fn with_xml_body(self, body: impl Into<String>) -> Self {
        self.with_body(XML_CONTENT_TYPE, body)
    }

    /// Sets a body with the given content type.
    pub fn with_body(mut self, content_type: &str, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.with_header("Content-Type", content_type)
    }

    /// Returns the first header with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What came back from the server, after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavResponse {
    pub status: u16,
    pub body: String,
}

impl DavResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Performs authenticated HTTP requests against the CalDAV server.
///
/// Implementations must follow redirects and apply their own per-request
/// timeout. A non-success status is not an error at this level; only a
/// request that could not complete is, reported as
/// [`CalDavError::Transport`].
pub trait Transport: Send + Sync {
    fn send(&self, request: DavRequest) -> BoxFuture<'_, CalDavResult<DavResponse>>;
}

/// A canned reply for [`ScriptedTransport`].
#[derive(Debug, Clone)]
enum ScriptedReply {
    Response(DavResponse),
    Failure(String),
}

/// A [`Transport`] that replays scripted replies in order.
///
/// Every request is recorded. Running out of replies is a transport error,
/// which makes an unexpected extra request show up as a test failure.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<DavRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.push(ScriptedReply::Response(DavResponse::new(status, body)))
    }

    /// Queues a transport failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(ScriptedReply::Failure(message.into()))
    }

    fn push(self, reply: ScriptedReply) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    /// Requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<DavRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of replies not consumed yet.
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or_default()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: DavRequest) -> BoxFuture<'_, CalDavResult<DavResponse>> {
        Box::pin(async move {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }
            let reply = self
                .replies
                .lock()
                .map_err(|_| CalDavError::internal("scripted transport lock poisoned"))?
                .pop_front();

            match reply {
                Some(ScriptedReply::Response(response)) => Ok(response),
                Some(ScriptedReply::Failure(message)) => Err(CalDavError::transport(message)),
                None => Err(CalDavError::transport(format!(
                    "no scripted reply left for {} {}",
                    request.method, request.url
                ))),
            }
        })
    }
}
