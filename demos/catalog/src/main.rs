//! # Catalog demo
//!
//! A small product catalog served by waymark. The product detail route is
//! registered twice: once at the root as `product` and once under the `/v1`
//! route list as `v1:product`, both bound to the same handler.
//!
//! ## Running
//!
//! ```bash
//! cargo run --package catalog-demo
//! cargo run --package catalog-demo -- --config catalog.toml --bind 0.0.0.0:3000
//! cargo run --package catalog-demo -- --print-routes
//! ```
//!
//! Then visit:
//! - `http://127.0.0.1:8080/cs/products/42`
//! - `http://127.0.0.1:8080/v1/en/products/7/details`
//! - `http://127.0.0.1:8080/routes`

mod catalog;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use waymark_core::logging::setup_logging;
use waymark_core::settings::Settings;
use waymark_core::settings_loader;

/// Serve the catalog demo.
#[derive(Debug, Parser)]
#[command(name = "catalog", version, about)]
struct Args {
    /// TOML settings file. Environment overrides are applied on top.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to bind, overriding `bind_address` from the settings.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Print the route table and exit.
    #[arg(long)]
    print_routes: bool,
}

fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => settings_loader::from_toml_file_with_env(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => settings_loader::from_env(),
    };
    if let Some(bind) = &args.bind {
        settings.bind_address.clone_from(bind);
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = load_settings(&args)?;
    setup_logging(&settings);

    let addr = settings.bind_address.clone();
    let router = catalog::router(settings);

    if args.print_routes {
        for name in router.routes().names() {
            if let Some(route) = router.route(name) {
                println!("{:<8} {:<40} {name}", route.method().as_str(), route.pattern());
            }
        }
        return Ok(());
    }

    let frozen = router.build().context("building the route table")?;
    tracing::info!(routes = frozen.routes().len(), "Route table built");
    frozen.run(&addr).await?;
    Ok(())
}
