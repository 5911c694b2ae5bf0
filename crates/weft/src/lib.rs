//! # Weft
//!
//! The dispatch core of a micro web framework: continuation-passing
//! middleware chains, pattern routing, a lazy injector container and a
//! wildcard event bus. HTTP parsing and response emission are left to the
//! host; Weft takes an [`Input`](core::Input) and hands back an
//! [`Output`](core::Output).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────────────────────────────────────┐
//! │     App     │────▶│ middleware ─▶ middleware ─▶ ... ─▶ router        │
//! │  (runtime)  │     │      each one calls next() or stops the chain    │
//! └─────────────┘     └────────────────────────────────────┬─────────────┘
//!        │                                                 ▼
//!        │                               routes matching the path, tried
//!        │                               in order; pass() moves to the next
//!        ▼
//!   Injector + EventEmitter, shared with every handler through the Input
//! ```
//!
//! - **Core**: injector, event bus, request/response types
//! - **Framework**: handlers, path patterns, chains and the router
//! - **Runtime**: the application, configuration, error pages and logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use weft::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut app = App::builder().build()?;
//!
//!     app.add(handler_fn(|input, output, next| {
//!         output.write("<main>");
//!         next.call(input, output)?;
//!         output.write("</main>");
//!         Ok(())
//!     }));
//!     app.route("/hello/:name", |input, output, _| {
//!         output.write(format!("Hello, {}", input.param("name").unwrap_or("you")));
//!         Ok(())
//!     })?
//!     .name("hello", None);
//!
//!     let output = app.run(Input::new(Method::Get, "/hello/ada"))?;
//!     println!("{} {}", output.status(), output.body());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use weft_core as core;
pub use weft_framework as framework;
pub use weft_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use weft::prelude::*;
/// ```
pub mod prelude {
    // Application - main entry point
    pub use weft_runtime::{App, AppConfig, AppError, AppResult, AutoRoute, ErrorKind};

    // Request and response
    pub use weft_core::{Input, Method, Output};

    // Shared collaborators
    pub use weft_core::{Definition, EventEmitter, Injector};

    // Handlers and control flow
    pub use weft_framework::{
        FrameworkError, Handler, HandlerResult, Interrupt, Next, OutputExt, Route, Target, handler_fn,
        pass, route, stop,
    };
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, OnceLock, Weak};

    use parking_lot::Mutex;
    use serde_json::{Value, json};

    use crate::prelude::*;

    fn get(path: &str) -> Input {
        Input::new(Method::Get, path)
    }

    fn app() -> App {
        App::new(AppConfig::default())
    }

    #[test]
    fn test_middleware_wraps_route() {
        let mut app = app();
        app.add(handler_fn(|input, output, next| {
            output.write("X");
            next.call(input, output)?;
            output.write("Y");
            Ok(())
        }));
        app.route("/", |_, output, _| {
            output.write("body");
            Ok(())
        })
        .unwrap();

        assert_eq!(app.run(get("/")).unwrap().body(), "XbodyY");
    }

    #[test]
    fn test_pass_skips_to_next_handler() {
        let mut app = app();
        app.router_mut()
            .set_many(
                "/a",
                vec![
                    handler_fn(|_, _, _| pass()).into(),
                    handler_fn(|input, output, next| {
                        output.write("second ");
                        next.call(input, output)
                    })
                    .into(),
                    handler_fn(|_, output, _| {
                        output.write("third");
                        Ok(())
                    })
                    .into(),
                ],
            )
            .unwrap();

        assert_eq!(app.run(get("/a")).unwrap().body(), "second third");
    }

    #[test]
    fn test_middleware_wraps_route_after_candidate_passes() {
        let mut app = app();
        app.add(handler_fn(|input, output, next| {
            output.write("[");
            next.call(input, output)?;
            output.write("]");
            Ok(())
        }));
        app.router_mut()
            .set_many(
                "/page",
                vec![
                    handler_fn(|_, _, _| pass()).into(),
                    handler_fn(|_, output, _| {
                        output.write("fallback");
                        Ok(())
                    })
                    .into(),
                ],
            )
            .unwrap();

        let output = app.run(get("/page")).unwrap();
        assert_eq!(output.body(), "[fallback]");
        assert!(output.is_ok());
    }

    #[test]
    fn test_pass_moves_to_next_route() {
        let mut app = app();
        app.route("/user/:id", |input, _, _| {
            if input.param("id") == Some("admin") {
                return pass();
            }
            Ok(())
        })
        .unwrap();
        app.route("/user/admin", |_, output, _| {
            output.write("admin page");
            Ok(())
        })
        .unwrap();

        let output = app.run(get("/user/admin")).unwrap();
        assert_eq!(output.body(), "admin page");
        assert!(output.is_ok());
    }

    #[test]
    fn test_named_route() {
        let mut app = app();
        app.route("/posts/:slug", |_, _, _| Ok(()))
            .unwrap()
            .name("post", None);

        assert_eq!(app.router().path("post"), Some("/posts/:slug"));
        assert_eq!(app.router().path("missing"), None);
    }

    #[test]
    fn test_handler_reaches_services() {
        let mut app = app();
        app.injector()
            .set("greeting", Injector::share(|_| "hello".to_string()));
        app.injector()
            .extend::<String, String, _>("greeting", |inner, _| format!("{inner}!"))
            .unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        app.events().once("greeted", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        app.route("/", |input, output, _| {
            let greeting = input.injector().get::<String>("greeting")?;
            output.write(greeting.as_str());
            input.events().emit("greeted", &[]);
            Ok(())
        })
        .unwrap();

        assert_eq!(app.run(get("/")).unwrap().body(), "hello!");
        assert_eq!(app.run(get("/")).unwrap().body(), "hello!");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_many_listener_with_wildcard() {
        let app = app();
        let seen = Arc::new(Mutex::new(Vec::<Value>::new()));
        let log = seen.clone();
        app.events().many("order.*", 2, move |args| {
            log.lock().push(json!(args));
        });

        app.events().emit("order.placed", &[json!(1)]);
        app.events().emit("order.paid", &[json!(2)]);
        app.events().emit("order.shipped", &[json!(3)]);

        assert_eq!(
            *seen.lock(),
            vec![json!(["order.placed", 1]), json!(["order.paid", 2])]
        );
    }

    #[test]
    fn test_stop_keeps_output() {
        let mut app = app();
        app.add(handler_fn(|input, output, next| {
            next.call(input, output)?;
            output.write(" never");
            Ok(())
        }));
        app.route("/", |_, output, _| output.halt(201, "created")).unwrap();

        let output = app.run(get("/")).unwrap();
        assert_eq!(output.status(), 201);
        assert_eq!(output.body(), "created");
    }

    #[test]
    fn test_unmatched_path_is_not_found() {
        let app = app();
        let output = app.run(get("/nowhere")).unwrap();
        assert!(output.is_not_found());
        assert_eq!(output.body(), "Location not found");
    }

    #[test]
    fn test_debug_mode_surfaces_failures() {
        let mut app = App::new(AppConfig {
            debug: true,
            ..Default::default()
        });
        app.route("/", |input, _, _| {
            input.injector().get::<String>("undeclared")?;
            Ok(())
        })
        .unwrap();

        let err = app.run(get("/")).unwrap_err();
        assert!(matches!(err, AppError::Handler(FrameworkError::Injector(_))));
    }

    #[test]
    fn test_nested_run_is_rejected() {
        let slot: Arc<OnceLock<Weak<App>>> = Arc::new(OnceLock::new());
        let mut app = app();

        let handle = slot.clone();
        app.route("/outer", move |_, output, _| {
            let app = handle.get().and_then(Weak::upgrade);
            if let Some(app) = app {
                match app.run(Input::new(Method::Get, "/outer")) {
                    Err(AppError::AlreadyRunning) => output.write("busy"),
                    _ => output.write("reentered"),
                };
            }
            Ok(())
        })
        .unwrap();

        let app = Arc::new(app);
        slot.set(Arc::downgrade(&app)).unwrap();

        assert_eq!(app.run(get("/outer")).unwrap().body(), "busy");
        assert!(!app.is_running());
    }
}
