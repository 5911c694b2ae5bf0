//! Handler abstractions.
//!
//! A handler is anything that can be called with the request, the response and
//! a [`Next`] continuation:
//!
//! ```rust,ignore
//! use weft_framework::{HandlerResult, Next, handler_fn};
//!
//! let wrap = handler_fn(|input, output, next: Next<'_>| -> HandlerResult {
//!     output.write("<");
//!     next.call(input, output)?;
//!     output.write(">");
//!     Ok(())
//! });
//! ```
//!
//! Closures get a blanket [`Handler`] impl. Types that want the three-phase
//! `before` / `run` / `after` shape implement [`Route`] and are wrapped in a
//! [`RouteHandler`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use weft_core::{Input, Output};

use crate::chain::Next;
use crate::signal::HandlerResult;

// =============================================================================
// Handler
// =============================================================================

/// A request handler or middleware.
pub trait Handler: Send + Sync {
    /// Handles one request. Call `next` to run the remainder of the current
    /// chain; return [`Interrupt::Pass`](crate::Interrupt::Pass) to decline.
    fn call(&self, input: &mut Input, output: &mut Output, next: Next<'_>) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&mut Input, &mut Output, Next<'_>) -> HandlerResult + Send + Sync,
{
    fn call(&self, input: &mut Input, output: &mut Output, next: Next<'_>) -> HandlerResult {
        self(input, output, next)
    }
}

/// A shared, type-erased handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// Boxes a closure as a handler.
///
/// Prefer this over `Arc::new(|..| ..)`: the explicit bound lets the closure's
/// argument lifetimes be inferred.
pub fn handler_fn<F>(f: F) -> BoxedHandler
where
    F: Fn(&mut Input, &mut Output, Next<'_>) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

// =============================================================================
// Route
// =============================================================================

/// A handler split into three phases.
///
/// [`RouteHandler`] runs `before`, then `run`, then `after`. An interrupt from
/// any phase skips the remaining ones.
pub trait Route: Send + Sync {
    /// Runs before the main phase.
    fn before(&self, _input: &mut Input, _output: &mut Output) -> HandlerResult {
        Ok(())
    }

    /// The main phase.
    fn run(&self, input: &mut Input, output: &mut Output, next: Next<'_>) -> HandlerResult;

    /// Runs after the main phase.
    fn after(&self, _input: &mut Input, _output: &mut Output) -> HandlerResult {
        Ok(())
    }
}

/// Adapts a [`Route`] to [`Handler`].
pub struct RouteHandler<R>(pub R);

impl<R: Route> Handler for RouteHandler<R> {
    fn call(&self, input: &mut Input, output: &mut Output, next: Next<'_>) -> HandlerResult {
        self.0.before(input, output)?;
        self.0.run(input, output, next)?;
        self.0.after(input, output)
    }
}

/// Boxes a [`Route`] as a handler.
pub fn route<R: Route + 'static>(route: R) -> BoxedHandler {
    Arc::new(RouteHandler(route))
}

// =============================================================================
// Target
// =============================================================================

/// What a route or middleware entry points at.
#[derive(Clone)]
pub enum Target {
    /// A handler ready to call.
    Handler(BoxedHandler),
    /// A handler built on demand from the registry.
    Named {
        /// Registry identifier, such as `"Blog::Post"`.
        identifier: String,
        /// Construction options, merged over the registered defaults.
        options: Value,
    },
}

impl Target {
    /// Creates a named target without options.
    pub fn named(identifier: impl Into<String>) -> Self {
        Self::Named {
            identifier: identifier.into(),
            options: Value::Null,
        }
    }

    /// Creates a named target with construction options.
    pub fn named_with(identifier: impl Into<String>, options: Value) -> Self {
        Self::Named {
            identifier: identifier.into(),
            options,
        }
    }
}

impl From<BoxedHandler> for Target {
    fn from(handler: BoxedHandler) -> Self {
        Self::Handler(handler)
    }
}

impl From<&str> for Target {
    fn from(identifier: &str) -> Self {
        Self::named(identifier)
    }
}

impl From<String> for Target {
    fn from(identifier: String) -> Self {
        Self::named(identifier)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => f.write_str("Target::Handler(..)"),
            Self::Named {
                identifier,
                options,
            } => f
                .debug_struct("Target::Named")
                .field("identifier", identifier)
                .field("options", options)
                .finish(),
        }
    }
}
