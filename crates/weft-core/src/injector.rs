//! Lazy dependency-injection container.
//!
//! An [`Injector`] maps string keys to [`Definition`]s. A definition is one of:
//!
//! - a **value**, returned as-is on every lookup;
//! - a **factory**, invoked on every lookup;
//! - a **shared** factory, invoked on first lookup and memoized for the
//!   lifetime of the container;
//! - a **protected** callable, returned as the callable itself so the caller
//!   can invoke it explicitly (see [`Injector::invoke`]).
//!
//! Factories receive the container so they can resolve their own
//! dependencies:
//!
//! ```rust,ignore
//! use weft_core::{Definition, Injector};
//!
//! let injector = Injector::new();
//! injector.set("dsn", Definition::value(String::from("sqlite::memory:")));
//! injector.set("pool", Injector::share(|inj| {
//!     Pool::connect(&inj.get::<String>("dsn").unwrap())
//! }));
//!
//! let pool = injector.get::<Pool>("pool")?; // constructed here, once
//! ```
//!
//! # Retained state
//!
//! Shared entries keep their instance for as long as the container lives. A
//! host that serves several requests from one container observes the same
//! instance in every request.

use std::any::{Any, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};
use tracing::trace;

use crate::error::{InjectorError, InjectorResult};

/// A type-erased resolved value.
pub type Resolved = Arc<dyn Any + Send + Sync>;

/// A type-erased factory. Receives the container it is resolved from.
pub type Factory = Arc<dyn Fn(&Injector) -> InjectorResult<Resolved> + Send + Sync>;

/// Classification of a container entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A raw value.
    Value,
    /// A factory invoked on every lookup.
    Factory,
    /// A factory memoized after its first lookup.
    Shared,
    /// A callable returned unresolved.
    Protected,
}

impl EntryKind {
    /// Returns `true` for entries that produce their value by invoking a factory.
    pub fn is_factory(self) -> bool {
        matches!(self, Self::Factory | Self::Shared)
    }
}

#[derive(Clone)]
enum Slot {
    Value(Resolved),
    Factory(Factory),
}

/// A declaration stored under a key in the [`Injector`].
#[derive(Clone)]
pub struct Definition {
    kind: EntryKind,
    slot: Slot,
}

impl Definition {
    /// Declares a raw value.
    pub fn value<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            kind: EntryKind::Value,
            slot: Slot::Value(Arc::new(value)),
        }
    }

    /// Declares a factory that is invoked on every lookup.
    pub fn factory<T, F>(f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Injector) -> T + Send + Sync + 'static,
    {
        Self::from_factory(
            EntryKind::Factory,
            Arc::new(move |inj| Ok(Arc::new(f(inj)) as Resolved)),
        )
    }

    /// Declares a fallible factory that is invoked on every lookup.
    pub fn try_factory<T, F>(f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Injector) -> InjectorResult<T> + Send + Sync + 'static,
    {
        Self::from_factory(
            EntryKind::Factory,
            Arc::new(move |inj| f(inj).map(|v| Arc::new(v) as Resolved)),
        )
    }

    /// Declares a factory whose first result is reused for every later lookup.
    ///
    /// The slot stays locked while `f` runs. A factory that resolves its own
    /// entry gets [`InjectorError::SharedReentry`] from the inner lookup.
    pub fn shared<T, F>(f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Injector) -> T + Send + Sync + 'static,
    {
        let instance: ReentrantMutex<RefCell<Option<Resolved>>> =
            ReentrantMutex::new(RefCell::new(None));
        Self::from_factory(
            EntryKind::Shared,
            Arc::new(move |inj| {
                let guard = instance.lock();
                let Ok(mut slot) = guard.try_borrow_mut() else {
                    return Err(InjectorError::SharedReentry);
                };
                if let Some(existing) = slot.as_ref() {
                    return Ok(Arc::clone(existing));
                }
                let created: Resolved = Arc::new(f(inj));
                *slot = Some(Arc::clone(&created));
                Ok(created)
            }),
        )
    }

    /// Declares a callable that lookups return without invoking.
    ///
    /// [`Injector::get`] yields the callable as a [`Factory`];
    /// [`Injector::invoke`] calls it.
    pub fn protected<T, F>(f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Injector) -> T + Send + Sync + 'static,
    {
        let callable: Factory = Arc::new(move |inj| Ok(Arc::new(f(inj)) as Resolved));
        Self {
            kind: EntryKind::Protected,
            slot: Slot::Value(Arc::new(callable)),
        }
    }

    fn from_factory(kind: EntryKind, factory: Factory) -> Self {
        Self {
            kind,
            slot: Slot::Factory(factory),
        }
    }

    /// Returns the kind of this definition.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    fn resolve(&self, injector: &Injector) -> InjectorResult<Resolved> {
        match &self.slot {
            Slot::Value(value) => Ok(Arc::clone(value)),
            Slot::Factory(factory) => factory(injector),
        }
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// String-keyed container of lazily resolved values.
///
/// Interior mutability lets handlers declare and resolve entries through a
/// shared reference. The table lock is never held while a factory runs, so
/// factories may resolve or declare other keys.
#[derive(Default)]
pub struct Injector {
    entries: RwLock<HashMap<String, Definition>>,
}

impl Injector {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a container pre-populated with `entries`.
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Definition)>,
        K: Into<String>,
    {
        Self {
            entries: RwLock::new(entries.into_iter().map(|(k, d)| (k.into(), d)).collect()),
        }
    }

    /// Wraps `f` so that its first result is memoized. Alias of [`Definition::shared`].
    pub fn share<T, F>(f: F) -> Definition
    where
        T: Any + Send + Sync,
        F: Fn(&Injector) -> T + Send + Sync + 'static,
    {
        Definition::shared(f)
    }

    /// Wraps `f` so that lookups return it uninvoked. Alias of [`Definition::protected`].
    pub fn protect<T, F>(f: F) -> Definition
    where
        T: Any + Send + Sync,
        F: Fn(&Injector) -> T + Send + Sync + 'static,
    {
        Definition::protected(f)
    }

    /// Stores `definition` under `key`, discarding any previous entry and its
    /// memoized instance.
    pub fn set(&self, key: impl Into<String>, definition: Definition) {
        let key = key.into();
        trace!(key = %key, kind = ?definition.kind, "Injector entry declared");
        self.entries.write().insert(key, definition);
    }

    /// Shorthand for `set(key, Definition::value(value))`.
    pub fn set_value<T>(&self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.set(key, Definition::value(value));
    }

    /// Resolves `key` to its type-erased value.
    pub fn resolve(&self, key: &str) -> InjectorResult<Resolved> {
        let definition = self.raw(key).ok_or_else(|| InjectorError::unknown(key))?;
        definition.resolve(self)
    }

    /// Resolves `key` and downcasts the result to `T`.
    ///
    /// # Errors
    ///
    /// [`InjectorError::UnknownKey`] if `key` was never declared, or
    /// [`InjectorError::TypeMismatch`] if the value is not a `T`.
    pub fn get<T>(&self, key: &str) -> InjectorResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.resolve(key)?
            .downcast::<T>()
            .map_err(|_| InjectorError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Invokes the protected callable stored under `key`.
    pub fn invoke(&self, key: &str) -> InjectorResult<Resolved> {
        let definition = self.raw(key).ok_or_else(|| InjectorError::unknown(key))?;
        if definition.kind != EntryKind::Protected {
            return Err(InjectorError::NotCallable {
                key: key.to_string(),
            });
        }
        let callable = definition
            .resolve(self)?
            .downcast::<Factory>()
            .map_err(|_| InjectorError::NotCallable {
                key: key.to_string(),
            })?;
        callable(self)
    }

    /// Invokes the protected callable under `key` and downcasts its result.
    pub fn invoke_as<T>(&self, key: &str) -> InjectorResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.invoke(key)?
            .downcast::<T>()
            .map_err(|_| InjectorError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Decorates the factory under `key`.
    ///
    /// The new entry calls the original factory, then passes the result and
    /// the container to `decorator`. A shared factory keeps its memoization:
    /// the decorator runs on every lookup, the original only once.
    ///
    /// # Errors
    ///
    /// [`InjectorError::InvalidState`] if `key` is absent or does not hold a
    /// factory.
    pub fn extend<T, U, F>(&self, key: &str, decorator: F) -> InjectorResult<()>
    where
        T: Any + Send + Sync,
        U: Any + Send + Sync,
        F: Fn(Arc<T>, &Injector) -> U + Send + Sync + 'static,
    {
        let mut entries = self.entries.write();
        let original = entries
            .get(key)
            .ok_or_else(|| InjectorError::invalid_state(key, "is not defined"))?;

        if !original.kind.is_factory() {
            return Err(InjectorError::invalid_state(
                key,
                "does not contain a factory definition",
            ));
        }

        let original = original.clone();
        let owned_key = key.to_string();
        let extended: Factory = Arc::new(move |inj| {
            let inner = original
                .resolve(inj)?
                .downcast::<T>()
                .map_err(|_| InjectorError::TypeMismatch {
                    key: owned_key.clone(),
                    expected: type_name::<T>(),
                })?;
            Ok(Arc::new(decorator(inner, inj)) as Resolved)
        });

        entries.insert(
            key.to_string(),
            Definition::from_factory(EntryKind::Factory, extended),
        );
        trace!(key = %key, "Injector entry extended");
        Ok(())
    }

    /// Returns a copy of the definition under `key` without resolving it.
    pub fn raw(&self, key: &str) -> Option<Definition> {
        self.entries.read().get(key).cloned()
    }

    /// Returns the kind of the entry under `key`.
    pub fn kind(&self, key: &str) -> Option<EntryKind> {
        self.entries.read().get(key).map(Definition::kind)
    }

    /// Returns `true` if `key` is declared.
    pub fn has(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Removes the entry under `key`, returning its definition.
    pub fn remove(&self, key: &str) -> Option<Definition> {
        self.entries.write().remove(key)
    }

    /// Returns every declared key, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Merges `entries` into the container. Keys already declared keep their
    /// current definition.
    pub fn append<I, K>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, Definition)>,
        K: Into<String>,
    {
        let mut table = self.entries.write();
        for (key, definition) in entries {
            table.entry(key.into()).or_insert(definition);
        }
    }

    /// Returns the number of declared keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no key is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("entries", &self.entries.read().len())
            .finish()
    }
}
