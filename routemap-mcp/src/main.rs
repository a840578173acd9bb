//! `routemap-mcp`: serves `render_route_map` over stdin/stdout.
//!
//! Responses are written to stdout, one JSON message per line. Logs go to
//! stderr and are filtered with `RUST_LOG` (default `info`). Set
//! `ROUTEMAP_FONT` to a TrueType/OpenType file to use it for marker labels
//! instead of a system font.

mod server;

use anyhow::Context;
use env_logger::{Env, Target};
use routemap::{LabelFont, RouteMapRenderer};

use crate::server::McpServer;

const FONT_ENV: &str = "ROUTEMAP_FONT";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .init();

    let mut builder = RouteMapRenderer::builder();
    if let Some(path) = std::env::var_os(FONT_ENV) {
        let font = LabelFont::from_file(&path)
            .with_context(|| format!("failed to load {FONT_ENV} font"))?;
        log::info!("Using label font {font}");
        builder = builder.with_font(font);
    }

    let renderer = builder.build().context("failed to create the HTTP client")?;
    log::info!("routemap-mcp {} ready", env!("CARGO_PKG_VERSION"));

    McpServer::new(renderer)
        .run(tokio::io::stdin(), tokio::io::stdout())
        .await
}
