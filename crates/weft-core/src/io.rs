//! Request and response boundary types.
//!
//! [`Input`] and [`Output`] are the narrow surface the dispatch core needs
//! from a host (an HTTP server, a CLI runner, a test). Header, cookie and body
//! parsing belong to the host; the core only reads the path and method, fills
//! route parameters, and writes status, headers and body.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::emitter::EventEmitter;
use crate::error::UnknownMethod;
use crate::injector::Injector;

// =============================================================================
// Method
// =============================================================================

/// Request verb discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    /// Command-line invocation.
    Cli,
}

impl Method {
    /// Returns the canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Cli => "CLI",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "CLI" => Self::Cli,
            _ => return Err(UnknownMethod(s.to_string())),
        })
    }
}

// =============================================================================
// Services
// =============================================================================

/// Process-lifetime collaborators made available to handlers.
///
/// The application attaches its container and event bus to every [`Input`]
/// it dispatches, so handlers reach them through the request instead of a
/// global.
#[derive(Debug, Clone, Default)]
pub struct Services {
    injector: Arc<Injector>,
    events: Arc<EventEmitter>,
}

impl Services {
    /// Bundles a container and an event bus.
    pub fn new(injector: Arc<Injector>, events: Arc<EventEmitter>) -> Self {
        Self { injector, events }
    }

    /// Returns the injector container.
    pub fn injector(&self) -> &Arc<Injector> {
        &self.injector
    }

    /// Returns the event bus.
    pub fn events(&self) -> &Arc<EventEmitter> {
        &self.events
    }
}

// =============================================================================
// Input
// =============================================================================

/// The incoming side of one dispatch.
#[derive(Debug, Clone, Default)]
pub struct Input {
    path: String,
    method: Method,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    services: Services,
}

impl Input {
    /// Creates an input for `method` on `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            ..Default::default()
        }
    }

    /// Creates a command-line input. The arguments are joined with `/` and
    /// prefixed with `/`, so `["user", "list"]` dispatches `/user/list`.
    pub fn cli<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        Self::new(Method::Cli, format!("/{}", joined.join("/")))
    }

    /// Adds a query-string value (builder style).
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns `true` if the request uses `method`.
    pub fn is(&self, method: Method) -> bool {
        self.method == method
    }

    /// Returns a route parameter by name (or positional index).
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns every route parameter.
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Merges `params` into the current parameter set. Existing keys are
    /// overwritten, other keys are kept.
    pub fn merge_params<I, K, V>(&mut self, params: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Returns a query-string value.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Returns the collaborators attached by the application.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Returns the application's injector container.
    pub fn injector(&self) -> &Arc<Injector> {
        self.services.injector()
    }

    /// Returns the application's event bus.
    pub fn events(&self) -> &Arc<EventEmitter> {
        self.services.events()
    }

    /// Attaches the application's collaborators.
    pub fn attach(&mut self, services: Services) {
        self.services = services;
    }
}

// =============================================================================
// Output
// =============================================================================

/// The outgoing side of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: String::new(),
        }
    }
}

impl Output {
    /// Creates an empty `200` output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    /// Returns the body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Replaces the body.
    pub fn set_body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = body.into();
        self
    }

    /// Appends to the body.
    pub fn write(&mut self, chunk: impl AsRef<str>) -> &mut Self {
        self.body.push_str(chunk.as_ref());
        self
    }

    /// Clears the body, keeping status and headers.
    pub fn clear(&mut self) -> &mut Self {
        self.body.clear();
        self
    }

    /// Returns the first value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets header `name`, replacing existing values.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Returns every header in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns `true` for a 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns `true` for a 404 status.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}
