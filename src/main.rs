use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod allocate;
mod cli;
mod discover;
mod ext;
mod gitio;
mod model;
mod parser;
mod pipeline;
mod render;
mod report;
mod tracker;
mod util;

use crate::cli::{normalize, Cli};

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  init_tracing(cli.verbose);

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;
  debug!(root = %cfg.root, author = %cfg.author, days = cfg.days, "effective config");

  // Phase 2: tracker backend (env double, HTTP)
  let tracker = tracker::build_tracker(&cfg.tracker)?;

  // Phase 3: run and emit
  let report = pipeline::run(&cfg, tracker.as_ref())?;
  let rendered = render::render(&report, cfg.format)?;
  util::write_output(&cfg.out, &rendered)
}
