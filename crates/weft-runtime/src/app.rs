//! The application orchestrator.
//!
//! An [`App`] owns the container, the event bus, the router and the
//! middleware stack. Each [`App::run`] call:
//!
//! 1. keeps only the middleware whose path prefix matches the request,
//! 2. appends the router as the final stage,
//! 3. runs the stages as one continuation chain,
//! 4. turns failures and panics into error pages, unless in debug mode.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use weft_runtime::App;
//! use weft_core::{Input, Method};
//!
//! let mut app = App::builder().without_env().build()?;
//! app.add(handler_fn(|input, output, next| {
//!     output.set_header("X-Powered-By", "weft");
//!     next.call(input, output)
//! }));
//! app.route("/hello/:name", |input, output, _| {
//!     output.write(format!("Hello, {}!", input.param("name").unwrap_or("stranger")));
//!     Ok(())
//! })?;
//!
//! let output = app.run(Input::new(Method::Get, "/hello/ada"))?;
//! assert_eq!(output.body(), "Hello, ada!");
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Value, json};
use tracing::{debug, debug_span, error, info, warn};
use weft_core::{EventEmitter, Injector, Input, Output, Services};
use weft_framework::{
    FrameworkResult, Handler, HandlerRegistry, HandlerResult, Interrupt, Invokable, Next, PatternResult,
    Routed, Router, Target, chain, handler_fn, invokable,
};

use crate::config::{AppConfig, ConfigLoader, ErrorPage, validate_config};
use crate::error::{AppError, AppResult, ErrorKind};
use crate::logging;
use crate::resolve::AutoRoute;

/// Mode name that matches every mode in [`App::configure`].
pub const ALL_MODES: &str = "all";

/// A middleware stack entry.
struct StackEntry {
    prefix: String,
    target: Target,
}

/// One stage of the top-level chain.
enum Stage<'a> {
    Middleware(&'a StackEntry),
    Router,
}

/// The router as the last stage of the stack.
struct RouterStage<'a> {
    app: &'a App,
}

impl Handler for RouterStage<'_> {
    fn call(&self, input: &mut Input, output: &mut Output, _next: Next<'_>) -> HandlerResult {
        match self.app.router.dispatch(input, output)? {
            Routed::Handled => Ok(()),
            Routed::NoRoute => {
                debug!(path = input.path(), "No route accepted the request");
                self.app.handle_error(ErrorKind::NotFound, input, output, None)
            }
        }
    }
}

/// Resets the running flag when a run ends, including by unwinding.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// App
// =============================================================================

/// A Weft application.
pub struct App {
    config: AppConfig,
    injector: Arc<Injector>,
    events: Arc<EventEmitter>,
    router: Router,
    stack: Vec<StackEntry>,
    error_handlers: HashMap<ErrorKind, Target>,
    running: AtomicBool,
}

impl App {
    /// Creates an application from an already loaded configuration.
    ///
    /// Unlike [`App::builder`] and [`App::from_loader`], this neither
    /// validates the configuration nor initializes logging.
    pub fn new(config: AppConfig) -> Self {
        let registry = Arc::new(HandlerRegistry::new());
        let injector = Arc::new(Injector::new());
        injector.set_value("mode", config.mode.clone());

        Self {
            config,
            injector,
            events: Arc::new(EventEmitter::new()),
            router: Router::with_registry(registry),
            stack: Vec::new(),
            error_handlers: HashMap::new(),
            running: AtomicBool::new(false),
        }
    }

    /// Creates a builder that loads configuration through figment.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Loads, validates and applies the configuration from `loader`, then
    /// initializes logging from it.
    pub fn from_loader(loader: ConfigLoader) -> AppResult<Self> {
        let config = loader.load()?;
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        info!(
            mode = %config.mode,
            debug = config.debug,
            log_level = %config.logging.level,
            "Application initialized from configuration"
        );
        Ok(Self::new(config))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the application mode.
    pub fn mode(&self) -> &str {
        &self.config.mode
    }

    /// Returns `true` in debug mode.
    pub fn is_debug(&self) -> bool {
        self.config.debug
    }

    /// Returns `true` while a run is in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Returns the injector container.
    pub fn injector(&self) -> &Arc<Injector> {
        &self.injector
    }

    /// Returns the event bus.
    pub fn events(&self) -> &Arc<EventEmitter> {
        &self.events
    }

    /// Returns the router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the router for registration.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Returns the named handler registry shared with the router.
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        self.router.registry()
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Runs `f` if `mode` is the current mode or [`ALL_MODES`].
    pub fn configure<F>(&mut self, mode: &str, f: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        if mode == ALL_MODES || mode == self.config.mode {
            debug!(mode, "Applying mode configuration");
            f(self);
        }
        self
    }

    /// Adds middleware that runs for every request.
    pub fn add(&mut self, target: impl Into<Target>) -> &mut Self {
        self.add_at("", target)
    }

    /// Adds middleware that runs only for paths starting with `prefix`.
    pub fn add_at(&mut self, prefix: impl Into<String>, target: impl Into<Target>) -> &mut Self {
        let prefix = prefix.into();
        let target = target.into();
        debug!(prefix = %prefix, target = ?target, "Adding middleware");
        self.stack.push(StackEntry { prefix, target });
        self
    }

    /// Adds registry-built middleware with construction options.
    pub fn add_named(&mut self, prefix: impl Into<String>, identifier: impl Into<String>, options: Value) -> &mut Self {
        self.add_at(prefix, Target::named_with(identifier, options))
    }

    /// Routes `pattern` to `target`. Returns the router so the route can be
    /// named.
    pub fn set(&mut self, pattern: &str, target: impl Into<Target>) -> PatternResult<&mut Router> {
        self.router.set(pattern, target)
    }

    /// Routes `pattern` to a closure.
    pub fn route<F>(&mut self, pattern: &str, f: F) -> PatternResult<&mut Router>
    where
        F: Fn(&mut Input, &mut Output, Next<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.router.set(pattern, handler_fn(f))
    }

    /// Installs the automatic resolution strategy.
    pub fn auto_route(&mut self, strategy: AutoRoute) -> &mut Self {
        debug!(strategy = ?strategy, "Enabling automatic routes");
        self.router.automatic(move |path| strategy.resolve(path));
        self
    }

    /// Registers the handler rendering the `kind` error page.
    pub fn on_error(&mut self, kind: ErrorKind, target: impl Into<Target>) -> &mut Self {
        self.error_handlers.insert(kind, target.into());
        self
    }

    /// Returns the status and default message of the `kind` error page.
    pub fn error_page(&self, kind: ErrorKind) -> &ErrorPage {
        let pages = &self.config.errors;
        match kind {
            ErrorKind::NotFound => &pages.not_found,
            ErrorKind::Exception => &pages.exception,
            ErrorKind::Crash => &pages.crash,
        }
    }

    // =========================================================================
    // Run
    // =========================================================================

    /// Runs one request through the stack and returns the response.
    ///
    /// # Errors
    ///
    /// - [`AppError::AlreadyRunning`] if called while another run is in flight
    /// - [`AppError::Handler`] / [`AppError::Panicked`] in debug mode, instead
    ///   of rendering the error page
    pub fn run(&self, mut input: Input) -> AppResult<Output> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(path = input.path(), "Application is already running");
            return Err(AppError::AlreadyRunning);
        }
        let _guard = RunGuard(&self.running);

        let span = debug_span!("dispatch", path = %input.path(), method = %input.method());
        let _enter = span.enter();

        self.events.emit("run", &[json!(input.path())]);
        input.attach(Services::new(self.injector.clone(), self.events.clone()));
        let mut output = Output::new();

        match self.dispatch_guarded(&mut input, &mut output) {
            Ok(Ok(())) | Ok(Err(Interrupt::Pass)) | Ok(Err(Interrupt::Stop)) => {}
            Ok(Err(Interrupt::Failed(e))) => {
                if self.config.debug {
                    return Err(AppError::Handler(e));
                }
                error!(error = %e, "Handler failed");
                let detail = e.to_string();
                let _ = self.handle_error(ErrorKind::Exception, &mut input, &mut output, Some(&detail));
                self.events.emit("error", &[json!(detail)]);
            }
            Err(message) => {
                if self.config.debug {
                    return Err(AppError::Panicked(message));
                }
                error!(panic = %message, "Handler panicked");
                let _ = self.handle_error(ErrorKind::Crash, &mut input, &mut output, Some(&message));
                self.events.emit("crash", &[json!(message)]);
            }
        }

        self.events.emit("flush", &[]);
        self.apply_charset(&mut output);
        debug!(status = output.status(), bytes = output.body().len(), "Request finished");
        self.events.emit("end", &[json!(output.status())]);

        Ok(output)
    }

    /// Runs the stack, catching panics when configured to.
    fn dispatch_guarded(&self, input: &mut Input, output: &mut Output) -> Result<HandlerResult, String> {
        self.run_guarded(|| self.dispatch_stack(input, output))
    }

    /// Runs `f`, turning a panic into its message when panics are caught.
    fn run_guarded<F>(&self, f: F) -> Result<HandlerResult, String>
    where
        F: FnOnce() -> HandlerResult,
    {
        if !(self.config.catch_panics || self.config.debug) {
            return Ok(f());
        }
        panic::catch_unwind(AssertUnwindSafe(f)).map_err(panic_message)
    }

    fn dispatch_stack(&self, input: &mut Input, output: &mut Output) -> HandlerResult {
        self.events.emit("middleware", &[]);

        let path = input.path().to_string();
        let mut stages: Vec<Stage<'_>> = self
            .stack
            .iter()
            .filter(|entry| path.starts_with(&entry.prefix))
            .map(Stage::Middleware)
            .collect();
        stages.push(Stage::Router);
        debug!(stages = stages.len(), "Dispatching stack");

        chain::dispatch(
            "stack",
            &stages,
            |stage| match stage {
                Stage::Middleware(entry) => self.registry().resolve(&entry.target).map(invokable),
                Stage::Router => Ok(self.router_stage()),
            },
            input,
            output,
        )
    }

    fn router_stage(&self) -> Invokable<'_> {
        Arc::new(RouterStage { app: self })
    }

    /// Renders the `kind` error page and finalizes the response.
    ///
    /// The registered error handler runs first, with `detail` available as
    /// the `error` parameter. If there is none, or it passes, fails or
    /// panics, the configured message becomes the body. The status always
    /// comes from the configured page. Always returns [`Interrupt::Stop`].
    pub fn handle_error(
        &self,
        kind: ErrorKind,
        input: &mut Input,
        output: &mut Output,
        detail: Option<&str>,
    ) -> HandlerResult {
        let page = self.error_page(kind);
        output.clear();

        let handled = match self.error_handlers.get(&kind) {
            Some(target) => {
                if let Some(detail) = detail {
                    input.merge_params([("error", detail)]);
                }
                match self.run_guarded(|| self.router.run(std::slice::from_ref(target), input, output)) {
                    Ok(Ok(())) | Ok(Err(Interrupt::Stop)) => true,
                    Ok(Err(Interrupt::Pass)) => false,
                    Ok(Err(Interrupt::Failed(e))) => {
                        warn!(kind = %kind, error = %e, "Error page handler failed");
                        output.clear();
                        false
                    }
                    Err(message) => {
                        warn!(kind = %kind, panic = %message, "Error page handler panicked");
                        output.clear();
                        false
                    }
                }
            }
            None => false,
        };

        if !handled {
            output.set_body(page.message.clone());
        }
        output.set_status(page.status);
        debug!(kind = %kind, status = page.status, "Rendered error page");
        Err(Interrupt::Stop)
    }

    fn apply_charset(&self, output: &mut Output) {
        let content_type = output.header("Content-Type").unwrap_or("text/html").to_string();
        if !content_type.to_ascii_lowercase().contains("charset=") {
            output.set_header(
                "Content-Type",
                format!("{content_type}; charset={}", self.config.charset),
            );
        }
    }

    /// Builds the handler for `target` from the registry.
    pub fn resolve(&self, target: &Target) -> FrameworkResult<Invokable<'_>> {
        self.registry().resolve(target).map(invokable)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("mode", &self.config.mode)
            .field("debug", &self.config.debug)
            .field("stack", &self.stack.len())
            .field("router", &self.router)
            .field("running", &self.is_running())
            .finish()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// =============================================================================
// AppBuilder
// =============================================================================

/// Builder for an [`App`] whose configuration is loaded through figment.
///
/// ```rust,ignore
/// let app = App::builder()
///     .config_file("config/weft.toml")
///     .mode("production")
///     .build()?;
/// ```
pub struct AppBuilder {
    config_loader: ConfigLoader,
}

impl AppBuilder {
    /// Creates a builder searching the default locations.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the application mode.
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.mode(mode);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Enables or disables debug mode.
    pub fn debug(mut self, debug: bool) -> Self {
        self.config_loader = self.config_loader.set("debug", debug);
        self
    }

    /// Enables or disables panic catching.
    pub fn catch_panics(mut self, catch_panics: bool) -> Self {
        self.config_loader = self.config_loader.set("catch_panics", catch_panics);
        self
    }

    /// Merges a whole configuration over the loaded one.
    pub fn merge(mut self, config: AppConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads the configuration and builds the application.
    pub fn build(self) -> AppResult<App> {
        App::from_loader(self.config_loader)
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use parking_lot::Mutex;
    use weft_core::Method;
    use weft_framework::{FrameworkError, OutputExt, pass};

    use super::*;

    fn get(path: &str) -> Input {
        Input::new(Method::Get, path)
    }

    #[test]
    fn test_route_and_middleware() {
        let mut app = App::new(AppConfig::default());
        app.add(handler_fn(|input, output, next| {
            output.write("<");
            next.call(input, output)?;
            output.write(">");
            Ok(())
        }));
        app.route("/hi/:name", |input, output, _| {
            output.write(input.param("name").unwrap_or_default());
            Ok(())
        })
        .unwrap();

        let output = app.run(get("/hi/ada")).unwrap();
        assert_eq!(output.body(), "<ada>");
        assert_eq!(output.status(), 200);
    }

    #[test]
    fn test_prefix_filtering() {
        let mut app = App::new(AppConfig::default());
        app.add_at("/admin", handler_fn(|_, output, _| output.halt(403, "denied")));
        app.route("/admin/panel", |_, output, _| {
            output.write("panel");
            Ok(())
        })
        .unwrap();
        app.route("/public", |_, output, _| {
            output.write("public");
            Ok(())
        })
        .unwrap();

        let output = app.run(get("/admin/panel")).unwrap();
        assert_eq!((output.status(), output.body()), (403, "denied"));

        let output = app.run(get("/public")).unwrap();
        assert_eq!(output.body(), "public");
    }

    #[test]
    fn test_not_found_page() {
        let app = App::new(AppConfig::default());
        let output = app.run(get("/missing")).unwrap();
        assert_eq!(output.status(), 404);
        assert_eq!(output.body(), "Location not found");
    }

    #[test]
    fn test_custom_not_found_handler() {
        let mut app = App::new(AppConfig::default());
        app.on_error(
            ErrorKind::NotFound,
            handler_fn(|input, output, _| {
                output.write(format!("nothing at {}", input.path()));
                Ok(())
            }),
        );

        let output = app.run(get("/void")).unwrap();
        assert_eq!(output.status(), 404);
        assert_eq!(output.body(), "nothing at /void");
    }

    #[test]
    fn test_failure_renders_exception_page() {
        let mut app = App::new(AppConfig::default());
        app.route("/boom", |_, output, _| {
            output.write("partial");
            Err(FrameworkError::handler("boom").into())
        })
        .unwrap();
        app.on_error(
            ErrorKind::Exception,
            handler_fn(|input, output, _| {
                output.write(format!("failed: {}", input.param("error").unwrap_or_default()));
                Ok(())
            }),
        );

        let output = app.run(get("/boom")).unwrap();
        assert_eq!(output.status(), 500);
        assert_eq!(output.body(), "failed: boom");
    }

    #[test]
    fn test_debug_propagates_failure() {
        let mut app = App::new(AppConfig {
            debug: true,
            ..Default::default()
        });
        app.route("/boom", |_, _, _| Err(FrameworkError::handler("boom").into()))
            .unwrap();

        let err = app.run(get("/boom")).unwrap_err();
        assert!(matches!(err, AppError::Handler(FrameworkError::Handler(ref m)) if m == "boom"));
        assert!(!app.is_running());
    }

    #[test]
    fn test_panic_renders_crash_page() {
        let mut app = App::new(AppConfig::default());
        app.route("/panic", |_, _, _| panic!("handler exploded")).unwrap();

        let crashes = Arc::new(AtomicUsize::new(0));
        let counter = crashes.clone();
        app.events().on("crash", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let output = app.run(get("/panic")).unwrap();
        assert_eq!(output.status(), 500);
        assert_eq!(output.body(), "Application crash");
        assert_eq!(crashes.load(Ordering::SeqCst), 1);
        assert!(!app.is_running());
    }

    #[test]
    fn test_debug_propagates_panic() {
        let mut app = App::new(AppConfig {
            debug: true,
            ..Default::default()
        });
        app.route("/panic", |_, _, _| panic!("handler exploded")).unwrap();

        let err = app.run(get("/panic")).unwrap_err();
        assert!(matches!(err, AppError::Panicked(ref m) if m == "handler exploded"));
    }

    #[test]
    fn test_panicking_error_page_falls_back_to_configured_page() {
        let mut app = App::new(AppConfig::default());
        app.route("/boom", |_, _, _| Err(FrameworkError::handler("boom").into()))
            .unwrap();
        app.on_error(ErrorKind::Exception, handler_fn(|_, _, _| panic!("page exploded")));

        let result = panic::catch_unwind(AssertUnwindSafe(|| app.run(get("/boom"))));
        let output = result.expect("panic stays inside run").unwrap();
        assert_eq!(output.status(), 500);
        assert_eq!(output.body(), "Error occurred");
        assert!(!app.is_running());
    }

    #[test]
    fn test_panicking_crash_page_falls_back_to_configured_page() {
        let mut app = App::new(AppConfig::default());
        app.route("/panic", |_, _, _| panic!("handler exploded")).unwrap();
        app.on_error(ErrorKind::Crash, handler_fn(|_, _, _| panic!("page exploded")));

        let output = app.run(get("/panic")).unwrap();
        assert_eq!(output.status(), 500);
        assert_eq!(output.body(), "Application crash");
    }

    #[test]
    fn test_passing_error_page_uses_configured_message() {
        let mut app = App::new(AppConfig::default());
        app.on_error(
            ErrorKind::NotFound,
            handler_fn(|_, output, _| {
                output.write("discarded");
                pass()
            }),
        );

        let output = app.run(get("/missing")).unwrap();
        assert_eq!(output.status(), 404);
        assert_eq!(output.body(), "Location not found");
    }

    #[test]
    fn test_failing_error_page_uses_configured_message() {
        let mut app = App::new(AppConfig::default());
        app.on_error(
            ErrorKind::NotFound,
            handler_fn(|_, output, _| {
                output.write("half written");
                Err(FrameworkError::handler("page failed").into())
            }),
        );

        let output = app.run(get("/missing")).unwrap();
        assert_eq!(output.status(), 404);
        assert_eq!(output.body(), "Location not found");
    }

    #[test]
    fn test_lifecycle_events_in_order() {
        let mut app = App::new(AppConfig::default());
        app.route("/", |_, _, _| Ok(())).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        app.events().on("*", move |args| {
            if let Some(name) = args.first().and_then(Value::as_str) {
                log.lock().push(name.to_string());
            }
        });

        app.run(get("/")).unwrap();
        assert_eq!(*seen.lock(), vec!["run", "middleware", "flush", "end"]);
    }

    #[test]
    fn test_route_pass_reaches_not_found() {
        let mut app = App::new(AppConfig::default());
        app.route("/maybe", |_, _, _| pass()).unwrap();

        let output = app.run(get("/maybe")).unwrap();
        assert!(output.is_not_found());
    }

    #[test]
    fn test_charset_applied() {
        let mut app = App::new(AppConfig::default());
        app.route("/json", |_, output, _| {
            output.set_header("Content-Type", "application/json");
            Ok(())
        })
        .unwrap();
        app.route("/plain", |_, output, _| {
            output.set_header("Content-Type", "text/plain; charset=ascii");
            Ok(())
        })
        .unwrap();

        let output = app.run(get("/json")).unwrap();
        assert_eq!(output.header("content-type"), Some("application/json; charset=UTF-8"));
        let output = app.run(get("/plain")).unwrap();
        assert_eq!(output.header("content-type"), Some("text/plain; charset=ascii"));
        let output = app.run(get("/missing")).unwrap();
        assert_eq!(output.header("content-type"), Some("text/html; charset=UTF-8"));
    }

    #[test]
    fn test_configure_by_mode() {
        let mut app = App::new(AppConfig {
            mode: "production".to_string(),
            ..Default::default()
        });
        let mut applied = Vec::new();
        app.configure("develop", |_| applied.push("develop"));
        app.configure("production", |_| applied.push("production"));
        app.configure(ALL_MODES, |_| applied.push("all"));

        assert_eq!(applied, vec!["production", "all"]);
        assert_eq!(app.mode(), "production");
        assert_eq!(*app.injector().get::<String>("mode").unwrap(), "production");
    }

    #[test]
    fn test_named_middleware() {
        let mut app = App::new(AppConfig::default());
        app.registry().register_with_defaults("Tag", json!({ "tag": "x" }), |options| {
            let tag = options["tag"].as_str().unwrap_or_default().to_string();
            Ok(handler_fn(move |input, output, next| {
                output.write(format!("[{tag}]"));
                next.call(input, output)
            }))
        });
        app.add_named("", "Tag", json!({ "tag": "y" }));
        app.route("/", |_, output, _| {
            output.write("home");
            Ok(())
        })
        .unwrap();

        let output = app.run(get("/")).unwrap();
        assert_eq!(output.body(), "[y]home");
    }

    #[test]
    fn test_auto_route() {
        let mut app = App::new(AppConfig::default());
        app.registry().register_handler(
            "Pages::About",
            handler_fn(|_, output, _| {
                output.write("about");
                Ok(())
            }),
        );
        app.auto_route(AutoRoute::Namespace("Pages".to_string()));

        assert_eq!(app.run(get("/about")).unwrap().body(), "about");
        assert!(app.run(get("/contact")).unwrap().is_not_found());
    }
}
