// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod app;
mod loader;

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
	disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use gantry_schedules_client::ScheduleClient;
use gantry_workspace_state::FileStateStore;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use app::App;

const TICK_RATE: Duration = Duration::from_millis(100);

/// Terminal operations dashboard for Gantry schedules.
#[derive(Debug, Parser)]
#[command(name = "gantry-tui", version)]
struct Cli {
	/// Base URL of the workspace server.
	#[arg(long, env = "GANTRY_BASE_URL")]
	base_url: String,

	/// Bearer token for the workspace server.
	#[arg(long, env = "GANTRY_AUTH_TOKEN", hide_env_values = true)]
	auth_token: String,

	/// Settle delay before a visible row fetches, in milliseconds.
	#[arg(long, default_value_t = 250)]
	fetch_delay_ms: u64,

	/// Append logs to this file (the terminal itself is in raw mode).
	#[arg(long, env = "GANTRY_LOG_FILE")]
	log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.log_file.as_ref())?;

	let client = ScheduleClient::builder()
		.base_url(&cli.base_url)
		.auth_token(&cli.auth_token)
		.build()?;

	let groups = client
		.repositories()
		.await
		.context("failed to fetch workspace repositories")?;

	let store = Arc::new(FileStateStore::open_default()?);
	let app = App::new(
		client,
		groups,
		store,
		Duration::from_millis(cli.fetch_delay_ms),
	);

	run(app, TICK_RATE)
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
	let Some(path) = log_file else {
		return Ok(());
	};

	let file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(path)
		.with_context(|| format!("failed to open log file {}", path.display()))?;

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(Arc::new(file))
		.with_ansi(false)
		.init();

	Ok(())
}

fn run(mut app: App, tick_rate: Duration) -> Result<()> {
	enable_raw_mode()?;
	io::stdout().execute(EnterAlternateScreen)?;

	let backend = CrosstermBackend::new(io::stdout());
	let mut terminal = Terminal::new(backend)?;

	let result = (|| -> Result<()> {
		loop {
			terminal.draw(|frame| app.render(frame))?;

			if event::poll(tick_rate)? {
				if let Event::Key(key) = event::read()? {
					if key.kind == KeyEventKind::Press {
						app.handle_key_event(key);
					}
				}
			}

			app.tick();

			if app.should_quit() {
				break;
			}
		}
		Ok(())
	})();

	disable_raw_mode()?;
	io::stdout().execute(LeaveAlternateScreen)?;

	result
}
