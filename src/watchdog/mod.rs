// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic health checks of the game server with debounced staff alerts.

use crate::rcon::{RconEndpoint, RconError, run_command};
use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;
use tokio::time::Duration;

mod monitor;
mod state;

pub use monitor::{HealthMonitor, MonitorSettings, TickOutcome, supervise};
pub use state::HealthState;

/// Command sent to check that the server responds; it has no side effects
const PROBE_COMMAND: &str = "list";

/// Every way a health check can fail. The monitor counts them all the same way.
#[derive(Debug, Diagnostic, Error)]
pub enum ConnectivityError {
	#[error("health check timed out after {0:?}")]
	Timeout(Duration),
	#[error(transparent)]
	Rcon(#[from] RconError),
}

#[async_trait]
pub trait Probe: Send + Sync {
	/// Performs one full round trip to the server
	async fn probe(&self) -> Result<(), RconError>;
}

#[async_trait]
pub trait AlertSink: Send + Sync {
	/// Notifies staff that the server has failed the given number of checks in a row
	async fn send_alert(&self, consecutive_failures: u32) -> miette::Result<()>;
}

/// Probes the game server by running a no-op command over a fresh remote console connection
pub struct RconProbe {
	endpoint: RconEndpoint,
}

impl RconProbe {
	pub fn new(endpoint: RconEndpoint) -> Self {
		Self { endpoint }
	}
}

#[async_trait]
impl Probe for RconProbe {
	async fn probe(&self) -> Result<(), RconError> {
		run_command(&self.endpoint, PROBE_COMMAND).await?;
		Ok(())
	}
}
