//! Named handler registry.
//!
//! Routes and middleware can refer to handlers by identifier instead of by
//! value. The registry maps each identifier to a constructor and builds a
//! fresh handler every time a chain reaches the entry, merging per-use
//! options over the defaults given at registration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{FrameworkError, FrameworkResult};
use crate::handler::{BoxedHandler, Target};

/// Builds a handler from its merged options.
pub type Constructor = Arc<dyn Fn(&Value) -> FrameworkResult<BoxedHandler> + Send + Sync>;

struct Registration {
    constructor: Constructor,
    defaults: Value,
}

/// Identifier to constructor map.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: RwLock<HashMap<String, Registration>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under `identifier`, replacing any previous one.
    pub fn register<F>(&self, identifier: impl Into<String>, constructor: F)
    where
        F: Fn(&Value) -> FrameworkResult<BoxedHandler> + Send + Sync + 'static,
    {
        self.register_with_defaults(identifier, Value::Null, constructor);
    }

    /// Registers a constructor with default options.
    pub fn register_with_defaults<F>(&self, identifier: impl Into<String>, defaults: Value, constructor: F)
    where
        F: Fn(&Value) -> FrameworkResult<BoxedHandler> + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        debug!(identifier = %identifier, "Registering handler");
        self.entries.write().insert(
            identifier,
            Registration {
                constructor: Arc::new(constructor),
                defaults,
            },
        );
    }

    /// Registers one shared handler instance under `identifier`.
    pub fn register_handler(&self, identifier: impl Into<String>, handler: BoxedHandler) {
        self.register(identifier, move |_| Ok(handler.clone()));
    }

    /// Returns `true` if `identifier` is registered.
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.read().contains_key(identifier)
    }

    /// Removes `identifier`, returning whether it was registered.
    pub fn remove(&self, identifier: &str) -> bool {
        self.entries.write().remove(identifier).is_some()
    }

    /// Returns every registered identifier, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self.entries.read().keys().cloned().collect();
        identifiers.sort();
        identifiers
    }

    /// Returns the number of registered identifiers.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Builds the handler registered under `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameworkError::InvalidHandler`] for an unknown identifier,
    /// or whatever the constructor fails with.
    pub fn build(&self, identifier: &str, options: &Value) -> FrameworkResult<BoxedHandler> {
        // The constructor runs outside the lock so it may use the registry.
        let (constructor, merged) = {
            let entries = self.entries.read();
            let registration = entries
                .get(identifier)
                .ok_or_else(|| FrameworkError::invalid_handler(identifier))?;
            (
                registration.constructor.clone(),
                merge_options(&registration.defaults, options),
            )
        };
        trace!(identifier, "Building handler");
        constructor(&merged)
    }

    /// Resolves a [`Target`] to a handler.
    pub fn resolve(&self, target: &Target) -> FrameworkResult<BoxedHandler> {
        match target {
            Target::Handler(handler) => Ok(handler.clone()),
            Target::Named {
                identifier,
                options,
            } => self.build(identifier, options),
        }
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

/// Overlays `options` on `defaults`. Object keys from `options` win; any
/// other non-null `options` value replaces the defaults outright.
fn merge_options(defaults: &Value, options: &Value) -> Value {
    match (defaults, options) {
        (_, Value::Null) => defaults.clone(),
        (Value::Object(base), Value::Object(overlay)) => {
            let mut merged = base.clone();
            for (key, value) in overlay {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => options.clone(),
    }
}
