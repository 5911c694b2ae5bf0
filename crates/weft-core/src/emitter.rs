//! Pattern-based publish/subscribe.
//!
//! Listeners are registered under a pattern, either a literal event name
//! (`"user.created"`) or a glob (`"user.*"`). Emitting an event fires every
//! live listener whose pattern equals or glob-matches the event name.
//!
//! ```text
//! emit("user.created", [id])
//!     ├─▶ "user.*"        listeners(["user.created", id])   ← wildcard: name prepended
//!     └─▶ "user.created"  listeners([id])
//! ```
//!
//! A pattern is a glob only if it contains `*`. Inside a glob `?` matches
//! one character, but a pattern such as `"ready?"` without a `*` is an exact
//! name. Names and patterns are case-insensitive. Listener arguments are
//! [`serde_json::Value`]s.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use regex::Regex;
use serde_json::Value;
use tracing::{trace, warn};

/// A type-erased event listener.
///
/// The `Arc` doubles as the listener's identity for [`EventEmitter::off`].
pub type Listener = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Wraps a closure into a [`Listener`].
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&[Value]) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Remaining invocations of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Firing {
    /// Fires on every matching emit.
    Unlimited,
    /// Fires on the next `n` matching emits, then never again.
    Remaining(usize),
}

struct Registration {
    listener: Listener,
    firing: Firing,
}

impl Registration {
    fn is_live(&self) -> bool {
        !matches!(self.firing, Firing::Remaining(0))
    }
}

struct Subscription {
    glob: Option<Regex>,
    registrations: Vec<Registration>,
}

/// Translates a glob into an anchored, case-insensitive regular expression.
///
/// `*` matches any run of characters and `?` matches exactly one; every other
/// character is literal.
pub fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?i)^");
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}

/// Returns `true` if `name` matches the glob `pattern`.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    Regex::new(&glob_to_regex(pattern))
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

/// Only `*` turns a pattern into a glob; `?` is then a one-character
/// wildcard inside it.
fn is_wildcard(pattern: &str) -> bool {
    pattern.contains('*')
}

/// The event bus.
#[derive(Default)]
pub struct EventEmitter {
    subscriptions: RwLock<HashMap<String, Subscription>>,
}

impl EventEmitter {
    /// Creates an emitter with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `f` under `pattern`, firing on every match.
    ///
    /// Returns the registered [`Listener`] so it can later be passed to
    /// [`off`](Self::off).
    pub fn on<F>(&self, pattern: &str, f: F) -> Listener
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        let listener = listener(f);
        self.register(pattern, Arc::clone(&listener), Firing::Unlimited);
        listener
    }

    /// Registers `f` under `pattern`, firing on the first match only.
    pub fn once<F>(&self, pattern: &str, f: F) -> Listener
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.many(pattern, 1, f)
    }

    /// Registers `f` under `pattern`, firing on the first `times` matches.
    pub fn many<F>(&self, pattern: &str, times: usize, f: F) -> Listener
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        let listener = listener(f);
        self.register(pattern, Arc::clone(&listener), Firing::Remaining(times));
        listener
    }

    /// Registers one listener under several patterns.
    pub fn on_many<'p, I, F>(&self, patterns: I, f: F) -> Listener
    where
        I: IntoIterator<Item = &'p str>,
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        let listener = listener(f);
        for pattern in patterns {
            self.register(pattern, Arc::clone(&listener), Firing::Unlimited);
        }
        listener
    }

    /// Registers an existing listener handle with an explicit firing budget.
    pub fn register(&self, pattern: &str, listener: Listener, firing: Firing) {
        let pattern = pattern.to_lowercase();
        let mut subscriptions = self.subscriptions.write();
        let subscription = subscriptions.entry(pattern.clone()).or_insert_with(|| {
            let glob = if is_wildcard(&pattern) {
                match Regex::new(&glob_to_regex(&pattern)) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(pattern = %pattern, error = %e, "Invalid event pattern, matching literally");
                        None
                    }
                }
            } else {
                None
            };
            Subscription {
                glob,
                registrations: Vec::new(),
            }
        });
        subscription
            .registrations
            .push(Registration { listener, firing });
        trace!(pattern = %pattern, firing = ?firing, "Listener registered");
    }

    /// Removes the first registration of `listener` under exactly `pattern`.
    ///
    /// Returns `true` if a registration was removed.
    pub fn off(&self, pattern: &str, listener: &Listener) -> bool {
        let pattern = pattern.to_lowercase();
        let mut subscriptions = self.subscriptions.write();
        let Some(subscription) = subscriptions.get_mut(&pattern) else {
            return false;
        };
        match subscription
            .registrations
            .iter()
            .position(|r| Arc::ptr_eq(&r.listener, listener))
        {
            Some(index) => {
                subscription.registrations.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every listener under `pattern`, or every listener at all.
    pub fn remove_all(&self, pattern: Option<&str>) {
        let mut subscriptions = self.subscriptions.write();
        match pattern {
            Some(p) => {
                subscriptions.remove(&p.to_lowercase());
            }
            None => subscriptions.clear(),
        }
    }

    /// Returns the number of live listeners registered under exactly `pattern`.
    pub fn listeners(&self, pattern: &str) -> usize {
        self.subscriptions
            .read()
            .get(&pattern.to_lowercase())
            .map(|s| s.registrations.iter().filter(|r| r.is_live()).count())
            .unwrap_or(0)
    }

    /// Emits `event` with `args`.
    ///
    /// Wildcard-pattern listeners run first and receive the event name as
    /// their first argument; exact-name listeners follow. Emitting an event
    /// nobody listens to is a no-op.
    pub fn emit(&self, event: &str, args: &[Value]) {
        let event = event.to_lowercase();
        let (wildcard, exact) = self.collect(&event);

        if wildcard.is_empty() && exact.is_empty() {
            return;
        }

        trace!(
            event = %event,
            wildcard = wildcard.len(),
            exact = exact.len(),
            "Emitting event"
        );

        if !wildcard.is_empty() {
            let mut prefixed = Vec::with_capacity(args.len() + 1);
            prefixed.push(Value::String(event.clone()));
            prefixed.extend_from_slice(args);
            for listener in wildcard {
                listener(&prefixed);
            }
        }

        for listener in exact {
            listener(args);
        }
    }

    /// Collects the listeners to fire and charges their firing budgets.
    ///
    /// The lock is released before any listener runs so listeners may
    /// register, remove or emit.
    fn collect(&self, event: &str) -> (Vec<Listener>, Vec<Listener>) {
        let mut subscriptions = self.subscriptions.write();
        let mut wildcard = Vec::new();
        let mut exact = Vec::new();

        for (pattern, subscription) in subscriptions.iter_mut() {
            let target = match &subscription.glob {
                Some(glob) if glob.is_match(event) => &mut wildcard,
                None if pattern == event => &mut exact,
                _ => continue,
            };
            for registration in subscription.registrations.iter_mut() {
                match registration.firing {
                    Firing::Unlimited => {}
                    Firing::Remaining(0) => continue,
                    Firing::Remaining(n) => registration.firing = Firing::Remaining(n - 1),
                }
                target.push(Arc::clone(&registration.listener));
            }
        }

        (wildcard, exact)
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("patterns", &self.subscriptions.read().len())
            .finish()
    }
}
