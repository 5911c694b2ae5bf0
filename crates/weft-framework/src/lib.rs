//! # Weft Framework
//!
//! The dispatch core of Weft, built on the container, event bus and boundary
//! types from `weft-core`.
//!
//! This layer provides:
//! - Control signals: handlers return [`HandlerResult`], whose error side
//!   carries [`Interrupt::Pass`], [`Interrupt::Stop`] or a failure
//! - The [`Handler`] trait, with a blanket impl for closures and the
//!   three-phase [`Route`] shape
//! - Path patterns ([`PathPattern`]) with named tokens, segment globs and raw
//!   regexes
//! - Continuation dispatch ([`Chain`], [`Next`]) that lets a candidate decline
//!   without re-running earlier ones
//! - The [`Router`] and the named [`HandlerRegistry`] it builds from

pub mod chain;
pub mod error;
pub mod handler;
pub mod pattern;
pub mod registry;
pub mod router;
pub mod signal;

pub use chain::{Chain, Continuation, Invokable, Next, dispatch, invokable};
pub use error::{BoxError, FrameworkError, FrameworkResult, PatternError, PatternResult};
pub use handler::{BoxedHandler, Handler, Route, RouteHandler, Target, handler_fn, route};
pub use pattern::{Capture, Captures, PathPattern};
pub use registry::{Constructor, HandlerRegistry};
pub use router::{Resolver, Routed, Router};
pub use signal::{HandlerResult, Interrupt, OutputExt, pass, stop};
