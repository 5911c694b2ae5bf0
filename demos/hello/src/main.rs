//! Hello Demo
//!
//! Dispatches a single request through a small Weft application and prints
//! the response.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package weft-hello -- /hello/ada
//! cargo run --package weft-hello -- --method post /users/42
//! cargo run --package weft-hello -- users list      # CLI-style input
//! cargo run --package weft-hello -- --debug /boom
//! ```

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;
use weft::prelude::*;

#[derive(Parser)]
#[command(name = "weft-hello", about = "Dispatch one request through a Weft application")]
struct Cli {
    /// Request path (`/hello/ada`) or CLI segments (`users list`)
    #[arg(required = true)]
    path: Vec<String>,

    /// Request method, ignored for CLI segments
    #[arg(long, default_value = "get")]
    method: String,

    /// Propagate handler failures instead of rendering error pages
    #[arg(long)]
    debug: bool,

    /// Path to a configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Greets by name, with a before phase that rejects empty names.
struct Greeter;

impl Route for Greeter {
    fn before(&self, input: &mut Input, output: &mut Output) -> HandlerResult {
        match input.param("name") {
            Some(name) if !name.trim().is_empty() => Ok(()),
            _ => output.halt(400, "a name is required"),
        }
    }

    fn run(&self, input: &mut Input, output: &mut Output, _next: Next<'_>) -> HandlerResult {
        let greeting = input.injector().get::<String>("greeting")?;
        output.write(format!("{greeting}, {}!", input.param("name").unwrap_or_default()));
        Ok(())
    }
}

/// Only accepts numeric ids; anything else falls through to later routes.
fn user_by_id(input: &mut Input, output: &mut Output, _next: Next<'_>) -> HandlerResult {
    let Some(id) = input.param("id").and_then(|id| id.parse::<u64>().ok()) else {
        return pass();
    };
    output.set_header("Content-Type", "application/json");
    output.write(json!({ "id": id, "method": input.method().as_str() }).to_string());
    Ok(())
}

// ============================================================================
// Application
// ============================================================================

fn build_app(cli: &Cli) -> Result<App> {
    let mut builder = App::builder().debug(cli.debug);
    if let Some(config) = &cli.config {
        builder = builder.config_file(config);
    }
    let mut app = builder.build()?;

    app.injector()
        .set("greeting", Definition::shared(|_| "Hello".to_string()));

    // Timing header around everything
    app.add(handler_fn(|input, output, next| {
        let started = std::time::Instant::now();
        let result = next.call(input, output);
        output.set_header("X-Elapsed-Us", started.elapsed().as_micros().to_string());
        result
    }));

    // Admin area, wired through the registry
    app.registry()
        .register_with_defaults("Guard", json!({ "token": "secret" }), |options| {
            let token = options["token"].as_str().unwrap_or_default().to_string();
            Ok(handler_fn(move |input, output, next| {
                if input.query("token") == Some(token.as_str()) {
                    next.call(input, output)
                } else {
                    output.halt(403, "forbidden")
                }
            }))
        });
    app.add_named("/admin", "Guard", serde_json::Value::Null);

    app.route("/", |_, output, _| {
        output.write("index");
        Ok(())
    })?
    .name("index", None);
    app.set("/hello/:name", route(Greeter))?.name("hello", None);
    app.route("/users/:id", user_by_id)?;
    app.route("/users/list", |_, output, _| {
        output.write("ada, grace, barbara");
        Ok(())
    })?;
    app.route("/admin", |_, output, _| {
        output.write("admin dashboard");
        Ok(())
    })?;
    app.route("/boom", |_, _, _| Err(FrameworkError::handler("the demo route failed").into()))?;

    // `/about` resolves to `Pages::About` when no explicit route matches
    app.registry().register_handler(
        "Pages::About",
        handler_fn(|_, output, _| {
            output.write("a micro framework demo");
            Ok(())
        }),
    );
    app.auto_route(AutoRoute::Namespace("Pages".to_string()));

    app.on_error(
        ErrorKind::NotFound,
        handler_fn(|input, output, _| {
            output.write(format!("no route for {}", input.path()));
            Ok(())
        }),
    );

    app.configure("develop", |app| {
        app.events().on("end", |args| info!(status = ?args.first(), "Request finished"));
    });

    Ok(app)
}

fn build_input(cli: &Cli) -> Result<Input> {
    let first = cli.path.first().map(String::as_str).unwrap_or("/");
    if cli.path.len() == 1 && first.starts_with('/') {
        let method = cli.method.parse::<Method>()?;
        let (path, query) = first.split_once('?').unwrap_or((first, ""));
        let mut input = Input::new(method, path);
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            input = input.with_query(key, value);
        }
        Ok(input)
    } else {
        Ok(Input::cli(&cli.path))
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    let app = build_app(&cli)?;
    let input = build_input(&cli)?;
    let output = app.run(input)?;

    println!("{}", output.status());
    for (name, value) in output.headers() {
        println!("{name}: {value}");
    }
    println!();
    println!("{}", output.body());

    Ok(())
}
