// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use hivekeeper::config::parse_config;
use hivekeeper::discord::{DiscordAlertSink, run_bot, set_up_client};
use hivekeeper::watchdog::{MonitorSettings, RconProbe, supervise};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.kdl";

#[tokio::main]
async fn main() -> miette::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config_path = std::env::args().nth(1).unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH));
	let config = Arc::new(parse_config(&config_path).await?);
	tracing::info!(config = %config_path, rcon = %config.rcon, "Loaded configuration");

	let http_client = set_up_client(&config);

	let (ready_sender, ready_receiver) = watch::channel(false);
	let monitor_settings = MonitorSettings::default();
	let probe = Arc::new(RconProbe::new(config.rcon.clone()));
	let alerts = Arc::new(DiscordAlertSink::new(
		Arc::clone(&http_client),
		&config.guild,
		monitor_settings.interval,
	));
	tokio::spawn(supervise(probe, alerts, monitor_settings, ready_receiver));

	run_bot(config, http_client, ready_sender).await
}
