//! # Weft Core
//!
//! The leaf layer of the Weft framework: the pieces every other layer
//! depends on but that know nothing about routing or dispatch.
//!
//! - **Injector**: a string-keyed container of values, per-call factories,
//!   memoized (shared) factories and protected callables ([`Injector`])
//! - **Event bus**: exact and glob subscriptions with count-limited
//!   listeners ([`EventEmitter`])
//! - **Boundary types**: the request/response surface consumed by the
//!   dispatch core ([`Input`], [`Output`], [`Method`])
//!
//! ```rust,ignore
//! use weft_core::{EventEmitter, Injector};
//!
//! let injector = Injector::new();
//! injector.set("engine", Injector::share(|_| TemplateEngine::default()));
//!
//! let events = EventEmitter::new();
//! events.on("user.*", |args| println!("{args:?}"));
//! events.emit("user.created", &[]);
//! ```

pub mod emitter;
pub mod error;
pub mod injector;
pub mod io;

pub use emitter::{EventEmitter, Firing, Listener, glob_match, glob_to_regex, listener};
pub use error::{InjectorError, InjectorResult, UnknownMethod};
pub use injector::{Definition, EntryKind, Factory, Injector, Resolved};
pub use io::{Input, Method, Output, Services};

/// Prelude for common imports.
pub mod prelude {
    pub use super::emitter::{EventEmitter, Listener};
    pub use super::error::{InjectorError, InjectorResult};
    pub use super::injector::{Definition, Injector};
    pub use super::io::{Input, Method, Output};
}
