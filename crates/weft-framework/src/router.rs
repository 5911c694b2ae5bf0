//! Path routing.
//!
//! The [`Router`] keeps routes in registration order and tries them in that
//! order. A matching route's targets run as one chain; if that chain passes,
//! routing continues with the next matching route. When no route accepts the
//! request, an optional automatic resolver can map the path to a registered
//! handler identifier as a last resort.
//!
//! ```rust,ignore
//! use weft_framework::{Router, handler_fn};
//!
//! let mut router = Router::new();
//! router
//!     .route("/user/:id", |input, output, _| {
//!         output.write(format!("user {}", input.param("id").unwrap_or("?")));
//!         Ok(())
//!     })?
//!     .name("user", None);
//!
//! assert_eq!(router.path("user"), Some("/user/:id"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};
use weft_core::{Input, Output};

use crate::chain::{self, Next, invokable};
use crate::error::PatternResult;
use crate::handler::{Target, handler_fn};
use crate::pattern::PathPattern;
use crate::registry::HandlerRegistry;
use crate::signal::{HandlerResult, Interrupt};

/// Maps a request path to a handler identifier.
pub type Resolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// The outcome of routing one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// A route accepted the request.
    Handled,
    /// Every matching route passed, or none matched.
    NoRoute,
}

struct RouteEntry {
    pattern: PathPattern,
    targets: Vec<Target>,
}

/// Ordered pattern-to-handler table.
pub struct Router {
    routes: Vec<RouteEntry>,
    names: HashMap<String, String>,
    last_pattern: Option<String>,
    automatic: Option<Resolver>,
    registry: Arc<HandlerRegistry>,
}

impl Default for Router {
    fn default() -> Self {
        Self::with_registry(Arc::new(HandlerRegistry::new()))
    }
}

impl Router {
    /// Creates an empty router with its own registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty router that resolves named targets in `registry`.
    pub fn with_registry(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            routes: Vec::new(),
            names: HashMap::new(),
            last_pattern: None,
            automatic: None,
            registry,
        }
    }

    /// Returns the registry used for named targets.
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Associates `pattern` with one target.
    ///
    /// Re-registering a pattern replaces its targets but keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`](crate::PatternError) if `pattern` does not
    /// compile.
    pub fn set(&mut self, pattern: &str, target: impl Into<Target>) -> PatternResult<&mut Self> {
        self.set_many(pattern, vec![target.into()])
    }

    /// Associates `pattern` with a list of targets that run as one chain.
    pub fn set_many(&mut self, pattern: &str, targets: Vec<Target>) -> PatternResult<&mut Self> {
        match self.routes.iter_mut().find(|r| r.pattern.source() == pattern) {
            Some(entry) => {
                debug!(pattern, targets = targets.len(), "Replacing route");
                entry.targets = targets;
            }
            None => {
                let compiled = PathPattern::compile(pattern)?;
                debug!(pattern, targets = targets.len(), "Adding route");
                self.routes.push(RouteEntry {
                    pattern: compiled,
                    targets,
                });
            }
        }
        self.last_pattern = Some(pattern.to_string());
        Ok(self)
    }

    /// Associates `pattern` with a closure.
    pub fn route<F>(&mut self, pattern: &str, f: F) -> PatternResult<&mut Self>
    where
        F: Fn(&mut Input, &mut Output, Next<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.set(pattern, handler_fn(f))
    }

    /// Returns the targets registered for exactly `pattern`.
    pub fn get(&self, pattern: &str) -> Option<&[Target]> {
        self.routes
            .iter()
            .find(|r| r.pattern.source() == pattern)
            .map(|r| r.targets.as_slice())
    }

    /// Names a pattern. With `pattern` as `None`, names the pattern most
    /// recently passed to [`set`](Self::set).
    pub fn name(&mut self, name: impl Into<String>, pattern: Option<&str>) -> &mut Self {
        let pattern = pattern.map(str::to_string).or_else(|| self.last_pattern.clone());
        match pattern {
            Some(pattern) => {
                self.names.insert(name.into(), pattern);
            }
            None => debug!("No route to name"),
        }
        self
    }

    /// Returns the pattern registered under `name`.
    pub fn path(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    /// Installs the fallback resolver used when no route accepts a request.
    pub fn automatic<F>(&mut self, resolver: F) -> &mut Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.automatic = Some(Arc::new(resolver));
        self
    }

    /// Returns the number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no route is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates registered patterns in match order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.pattern.source())
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Runs `targets` as one chain, resolving named entries in the registry.
    pub fn run(&self, targets: &[Target], input: &mut Input, output: &mut Output) -> HandlerResult {
        chain::dispatch(
            "route",
            targets,
            |target: &Target| self.registry.resolve(target).map(invokable),
            input,
            output,
        )
    }

    /// Routes one request.
    ///
    /// Matching routes are tried in registration order. A route's captures
    /// are merged into the input parameters before its chain runs. Stop and
    /// failure interrupts propagate to the caller.
    pub fn dispatch(&self, input: &mut Input, output: &mut Output) -> Result<Routed, Interrupt> {
        let path = input.path().to_string();

        for entry in &self.routes {
            let Some(captures) = entry.pattern.matches(&path) else {
                continue;
            };
            debug!(pattern = entry.pattern.source(), path = %path, "Route matched");
            if !captures.is_empty() {
                input.merge_params(captures.into_params());
            }

            match self.run(&entry.targets, input, output) {
                Ok(()) => return Ok(Routed::Handled),
                Err(Interrupt::Pass) => {
                    trace!(pattern = entry.pattern.source(), "Route passed");
                }
                Err(interrupt) => return Err(interrupt),
            }
        }

        self.dispatch_automatic(&path, input, output)
    }

    fn dispatch_automatic(&self, path: &str, input: &mut Input, output: &mut Output) -> Result<Routed, Interrupt> {
        let Some(resolver) = &self.automatic else {
            return Ok(Routed::NoRoute);
        };
        let Some(identifier) = resolver(path) else {
            return Ok(Routed::NoRoute);
        };
        if !self.registry.contains(&identifier) {
            debug!(path, identifier = %identifier, "Automatic route has no handler");
            return Ok(Routed::NoRoute);
        }

        debug!(path, identifier = %identifier, "Automatic route");
        match self.run(&[Target::named(identifier)], input, output) {
            Ok(()) => Ok(Routed::Handled),
            Err(Interrupt::Pass) => Ok(Routed::NoRoute),
            Err(interrupt) => Err(interrupt),
        }
    }

    /// Runs the route registered for exactly `pattern`, bypassing matching,
    /// with `params` merged into the input.
    ///
    /// Returns [`Routed::NoRoute`] when the pattern is unknown or its chain
    /// passes.
    pub fn handle<I, K, V>(
        &self,
        pattern: &str,
        params: I,
        input: &mut Input,
        output: &mut Output,
    ) -> Result<Routed, Interrupt>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let Some(targets) = self.get(pattern) else {
            debug!(pattern, "No route to handle");
            return Ok(Routed::NoRoute);
        };
        input.merge_params(params);

        match self.run(targets, input, output) {
            Ok(()) => Ok(Routed::Handled),
            Err(Interrupt::Pass) => Ok(Routed::NoRoute),
            Err(interrupt) => Err(interrupt),
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("patterns", &self.patterns().collect::<Vec<_>>())
            .field("names", &self.names)
            .field("automatic", &self.automatic.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use weft_core::Method;

    use super::*;
    use crate::error::FrameworkError;
    use crate::handler::BoxedHandler;
    use crate::signal::pass;

    fn writer(text: &'static str) -> BoxedHandler {
        handler_fn(move |_, output, _| {
            output.write(text);
            Ok(())
        })
    }

    fn dispatch(router: &Router, path: &str) -> (Result<Routed, Interrupt>, Input, Output) {
        let mut input = Input::new(Method::Get, path);
        let mut output = Output::new();
        let routed = router.dispatch(&mut input, &mut output);
        (routed, input, output)
    }

    #[test]
    fn test_first_match_wins() {
        let mut router = Router::new();
        router.set("/a", writer("first")).unwrap();
        router.set("/:any", writer("second")).unwrap();

        let (routed, _, output) = dispatch(&router, "/a");
        assert_eq!(routed.unwrap(), Routed::Handled);
        assert_eq!(output.body(), "first");
    }

    #[test]
    fn test_reregistering_replaces_in_place() {
        let mut router = Router::new();
        router.set("/r", writer("old")).unwrap();
        router.set("/:x", writer("fallback")).unwrap();
        router.set("/r", writer("new")).unwrap();

        let (routed, _, output) = dispatch(&router, "/r");
        assert_eq!(routed.unwrap(), Routed::Handled);
        assert_eq!(output.body(), "new");
        assert_eq!(router.patterns().collect::<Vec<_>>(), vec!["/r", "/:x"]);
    }

    #[test]
    fn test_whole_chain_pass_tries_next_route() {
        let mut router = Router::new();
        router
            .set_many(
                "/r",
                vec![
                    handler_fn(|input, output, next| {
                        output.write("a;");
                        next.call(input, output)
                    })
                    .into(),
                    handler_fn(|_, _, _| pass()).into(),
                ],
            )
            .unwrap();
        router.set("/:x", writer("b")).unwrap();

        let (routed, input, output) = dispatch(&router, "/r");
        assert_eq!(routed.unwrap(), Routed::Handled);
        assert_eq!(output.body(), "a;b");
        assert_eq!(input.param("x"), Some("r"));
    }

    #[test]
    fn test_no_route() {
        let mut router = Router::new();
        router.route("/a", |_, _, _| pass()).unwrap();

        let (routed, _, _) = dispatch(&router, "/a");
        assert_eq!(routed.unwrap(), Routed::NoRoute);
        let (routed, _, _) = dispatch(&router, "/missing");
        assert_eq!(routed.unwrap(), Routed::NoRoute);
    }

    #[test]
    fn test_params_are_merged() {
        let mut router = Router::new();
        router
            .route("/user/:id/(:tab)", |input, output, _| {
                output.write(format!(
                    "{}:{}",
                    input.param("id").unwrap_or_default(),
                    input.param("tab").unwrap_or_default()
                ));
                Ok(())
            })
            .unwrap();

        let (_, input, output) = dispatch(&router, "/user/7/posts/");
        assert_eq!(output.body(), "7:posts");
        assert_eq!(input.params().len(), 2);
    }

    #[test]
    fn test_named_routes() {
        let mut router = Router::new();
        router.set("/home", writer("home")).unwrap().name("home", None);
        router.set("/about", writer("about")).unwrap();
        router.name("landing", Some("/home"));

        assert_eq!(router.path("home"), Some("/home"));
        assert_eq!(router.path("landing"), Some("/home"));
        assert_eq!(router.path("missing"), None);
    }

    #[test]
    fn test_named_target_resolution() {
        let mut router = Router::new();
        router.registry().register_handler("Blog::Index", writer("blog"));
        router.set("/blog", "Blog::Index").unwrap();
        router.set("/broken", "Blog::Missing").unwrap();

        let (_, _, output) = dispatch(&router, "/blog");
        assert_eq!(output.body(), "blog");

        let (routed, _, _) = dispatch(&router, "/broken");
        assert!(matches!(
            routed,
            Err(Interrupt::Failed(FrameworkError::InvalidHandler { .. }))
        ));
    }

    #[test]
    fn test_automatic_resolution() {
        let mut router = Router::new();
        router.registry().register_handler("Docs", writer("docs"));
        router.automatic(|path| Some(path.trim_start_matches('/').to_string()));

        let (routed, _, output) = dispatch(&router, "/Docs");
        assert_eq!(routed.unwrap(), Routed::Handled);
        assert_eq!(output.body(), "docs");

        let (routed, _, _) = dispatch(&router, "/Unknown");
        assert_eq!(routed.unwrap(), Routed::NoRoute);
    }

    #[test]
    fn test_handle_by_pattern() {
        let mut router = Router::new();
        router
            .route("/greet/:name", |input, output, _| {
                output.write(format!("hi {}", input.param("name").unwrap_or_default()));
                Ok(())
            })
            .unwrap();

        let mut input = Input::default();
        let mut output = Output::new();
        let routed = router
            .handle("/greet/:name", [("name", "ada")], &mut input, &mut output)
            .unwrap();
        assert_eq!(routed, Routed::Handled);
        assert_eq!(output.body(), "hi ada");

        let routed = router
            .handle("/nope", Vec::<(String, String)>::new(), &mut input, &mut output)
            .unwrap();
        assert_eq!(routed, Routed::NoRoute);
    }

    #[test]
    fn test_invalid_pattern_rejected_at_registration() {
        let mut router = Router::new();
        assert!(router.set("^/(", writer("x")).is_err());
        assert!(router.is_empty());
    }
}
