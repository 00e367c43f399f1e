use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use rfsvg::service::render_markup;
use rfsvg::{ComposeConfig, Mode, RenderRequest, RenderResponse, RenderService};

#[derive(Parser)]
#[command(name = "rfsvg", version, about = "Export laid-out chart markup as a static SVG")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose one HTML snapshot into an SVG document
    Compose {
        /// HTML file holding the rendered chart
        input: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// `id` of the panel root or grid container (default: first element in body)
        #[arg(long)]
        root: Option<String>,
        /// Treat the root's DIV children as grid panels
        #[arg(long)]
        grid: bool,
        #[arg(long, default_value_t = 1)]
        columns: usize,
        /// Panel title override, once per panel in order
        #[arg(long = "title")]
        titles: Vec<String>,
        /// URL the snapshot was rendered from
        #[arg(long)]
        document_url: Option<String>,
        #[arg(long)]
        pretty: bool,
    },
    /// Read one JSON render request per line, answer one JSON response per line
    ServeStdin,
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Compose {
            input,
            output,
            root,
            grid,
            columns,
            titles,
            document_url,
            pretty,
        } => {
            let markup = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let request = RenderRequest {
                markup,
                root_id: root,
                config: ComposeConfig {
                    mode: if grid { Mode::Grid } else { Mode::Single },
                    columns,
                    titles: titles.into_iter().map(Some).collect(),
                    document_url,
                    pretty,
                    ..Default::default()
                },
            };
            let svg = render_markup(&request)
                .with_context(|| format!("composing {}", input.display()))?;
            match output {
                Some(path) => std::fs::write(&path, svg)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => io::stdout().write_all(svg.as_bytes())?,
            }
            Ok(())
        }
        Command::ServeStdin => serve_stdin(),
    }
}

#[derive(Deserialize)]
struct Job {
    id: u64,
    #[serde(flatten)]
    request: RenderRequest,
}

/// Line protocol: `{"id": 1, "markup": "...", "root_id": null, "config": {...}}`
/// in, `{"id": 1, "value": "<svg ...>", "is_error": false}` out. Malformed
/// lines are logged and skipped.
fn serve_stdin() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting render runtime")?;
    let service = RenderService::default();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let job: Job = match serde_json::from_str(&line) {
            Ok(job) => job,
            Err(e) => {
                log::warn!("ignoring malformed request: {}", e);
                continue;
            }
        };
        let result = runtime.block_on(service.render(job.request));
        let reply = serde_json::to_string(&RenderResponse::from_result(job.id, result))?;
        writeln!(out, "{}", reply)?;
        out.flush()?;
    }
    Ok(())
}
