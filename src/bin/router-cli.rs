use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use mvc_router::config::PathsConfig;
use mvc_router::http::request::{decode_captures, RouteRequest};
use mvc_router::Router;

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Inspect a routes file without starting the server", long_about = None)]
struct Cli {
    /// Application directory containing the routes file.
    #[arg(short, long, default_value = "app")]
    entry_path: PathBuf,

    /// Routes file name, relative to the entry path.
    #[arg(short, long, default_value = "routes.toml")]
    routes_file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the route table in match order
    Routes,
    /// Show which route a path resolves to, with its sanitized params
    Match {
        /// Request path, e.g. /users/42
        path: String,

        /// Raw query string, e.g. "page=2&sort=name"
        #[arg(short, long)]
        query: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let paths = PathsConfig {
        entry_path: cli.entry_path,
        routes_file: cli.routes_file,
    };
    let mut router = Router::new(paths);
    router.build_routes()?;

    let output = match cli.command {
        Commands::Routes => Value::Array(
            router
                .routes()
                .into_iter()
                .map(|route| json!({ "pattern": route.pattern, "meta": route.meta }))
                .collect(),
        ),
        Commands::Match { path, query } => match router.resolve(&path) {
            Some(found) => {
                let request = RouteRequest::new(path.as_str())
                    .with_query_string(query.as_deref().unwrap_or(""))
                    .with_route_keys(found.pattern.keys())
                    .with_params(decode_captures(found.captures.clone())?);
                json!({
                    "pattern": found.route.pattern,
                    "meta": found.route.meta,
                    "params": router.get_params(&request),
                })
            }
            None => {
                eprintln!("No route matches {}", path);
                std::process::exit(1);
            }
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
