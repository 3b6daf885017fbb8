// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::state::HealthState;
use super::{AlertSink, ConnectivityError, Probe};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior, interval, sleep, timeout};

#[derive(Clone, Debug)]
pub struct MonitorSettings {
	/// Time between the start of each probe
	pub interval: Duration,
	/// How long a single connect-and-probe round trip may take
	pub probe_timeout: Duration,
	/// Number of consecutive failures after which staff are alerted
	pub alert_threshold: u32,
}

impl Default for MonitorSettings {
	fn default() -> Self {
		Self {
			interval: Duration::from_secs(60),
			probe_timeout: Duration::from_secs(5),
			alert_threshold: 5,
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickOutcome {
	Healthy,
	Failing { consecutive_failures: u32 },
	Alerted { consecutive_failures: u32 },
}

pub struct HealthMonitor<P, A> {
	probe: Arc<P>,
	alerts: Arc<A>,
	settings: MonitorSettings,
	state: HealthState,
}

impl<P: Probe, A: AlertSink> HealthMonitor<P, A> {
	pub fn new(probe: Arc<P>, alerts: Arc<A>, settings: MonitorSettings) -> Self {
		Self {
			probe,
			alerts,
			settings,
			state: HealthState::default(),
		}
	}

	pub fn state(&self) -> HealthState {
		self.state
	}

	/// Runs one health check and updates the failure tracking
	pub async fn tick(&mut self) -> TickOutcome {
		let probe_result = match timeout(self.settings.probe_timeout, self.probe.probe()).await {
			Ok(Ok(())) => Ok(()),
			Ok(Err(error)) => Err(ConnectivityError::Rcon(error)),
			Err(_) => Err(ConnectivityError::Timeout(self.settings.probe_timeout)),
		};

		let error = match probe_result {
			Ok(()) => {
				if self.state.consecutive_failures > 0 {
					tracing::info!(
						failures = self.state.consecutive_failures,
						"Game server is reachable again"
					);
				}
				self.state.record_success();
				return TickOutcome::Healthy;
			}
			Err(error) => error,
		};

		let alert_due = self.state.record_failure(self.settings.alert_threshold);
		let consecutive_failures = self.state.consecutive_failures;
		tracing::warn!(source = ?error, consecutive_failures, "Game server health check failed");
		if !alert_due {
			return TickOutcome::Failing { consecutive_failures };
		}

		match self.alerts.send_alert(consecutive_failures).await {
			Ok(()) => {
				self.state.mark_alert_sent();
				TickOutcome::Alerted { consecutive_failures }
			}
			Err(error) => {
				tracing::error!(source = ?error, "Failed to send the server outage alert; retrying next check");
				TickOutcome::Failing { consecutive_failures }
			}
		}
	}

	/// Waits for the bot to be ready, then checks the server on a fixed interval forever.
	///
	/// Returns only if the readiness signal is dropped before the bot becomes ready.
	pub async fn run(mut self, mut ready: watch::Receiver<bool>) {
		if ready.wait_for(|ready| *ready).await.is_err() {
			tracing::warn!("Bot shut down before becoming ready; server watchdog not started");
			return;
		}
		tracing::info!(interval = ?self.settings.interval, "Server watchdog started");

		let mut ticker = interval(self.settings.interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
		loop {
			ticker.tick().await;
			self.tick().await;
		}
	}
}

/// Runs the health monitor, restarting it with fresh state if it panics
pub async fn supervise<P, A>(probe: Arc<P>, alerts: Arc<A>, settings: MonitorSettings, ready: watch::Receiver<bool>)
where
	P: Probe + 'static,
	A: AlertSink + 'static,
{
	loop {
		let monitor = HealthMonitor::new(Arc::clone(&probe), Arc::clone(&alerts), settings.clone());
		let task = tokio::spawn(monitor.run(ready.clone()));
		match task.await {
			Ok(()) => return,
			Err(error) if error.is_panic() => {
				tracing::error!(source = ?error, "Server watchdog panicked; restarting it");
				sleep(settings.interval).await;
			}
			Err(error) => {
				tracing::error!(source = ?error, "Server watchdog was cancelled");
				return;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rcon::RconError;
	use async_trait::async_trait;
	use std::sync::Mutex;
	use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
	use tokio::time::Instant;

	/// Replays a fixed sequence of probe results, succeeding once the script runs out
	struct ScriptedProbe {
		results: Vec<bool>,
		calls: AtomicUsize,
	}

	impl ScriptedProbe {
		fn new(results: Vec<bool>) -> Arc<Self> {
			Arc::new(Self {
				results,
				calls: AtomicUsize::new(0),
			})
		}
	}

	#[async_trait]
	impl Probe for ScriptedProbe {
		async fn probe(&self) -> Result<(), RconError> {
			let call = self.calls.fetch_add(1, Ordering::SeqCst);
			if self.results.get(call).copied().unwrap_or(true) {
				Ok(())
			} else {
				Err(RconError::Io(std::io::ErrorKind::ConnectionRefused.into()))
			}
		}
	}

	struct HangingProbe;

	#[async_trait]
	impl Probe for HangingProbe {
		async fn probe(&self) -> Result<(), RconError> {
			std::future::pending().await
		}
	}

	#[derive(Default)]
	struct RecordingAlerts {
		sent: Mutex<Vec<(Instant, u32)>>,
		failures_before_delivery: AtomicU32,
	}

	#[async_trait]
	impl AlertSink for RecordingAlerts {
		async fn send_alert(&self, consecutive_failures: u32) -> miette::Result<()> {
			if self.failures_before_delivery.load(Ordering::SeqCst) > 0 {
				self.failures_before_delivery.fetch_sub(1, Ordering::SeqCst);
				miette::bail!("alert channel unavailable");
			}
			self.sent.lock().unwrap().push((Instant::now(), consecutive_failures));
			Ok(())
		}
	}

	#[tokio::test]
	async fn alert_fires_once_per_failure_streak() {
		let probe = ScriptedProbe::new(vec![false; 9]);
		let alerts = Arc::new(RecordingAlerts::default());
		let mut monitor = HealthMonitor::new(probe, Arc::clone(&alerts), MonitorSettings::default());

		let mut outcomes = Vec::new();
		for _ in 0..9 {
			outcomes.push(monitor.tick().await);
		}

		assert_eq!(outcomes[3], TickOutcome::Failing { consecutive_failures: 4 });
		assert_eq!(outcomes[4], TickOutcome::Alerted { consecutive_failures: 5 });
		assert_eq!(outcomes[8], TickOutcome::Failing { consecutive_failures: 9 });
		assert_eq!(alerts.sent.lock().unwrap().len(), 1);
		assert!(monitor.state().alert_sent);
	}

	#[tokio::test]
	async fn success_after_failures_resets_state() {
		let probe = ScriptedProbe::new(vec![false, false, false, false, true]);
		let alerts = Arc::new(RecordingAlerts::default());
		let mut monitor = HealthMonitor::new(probe, Arc::clone(&alerts), MonitorSettings::default());

		for _ in 0..4 {
			monitor.tick().await;
		}
		assert_eq!(monitor.state().consecutive_failures, 4);
		assert_eq!(monitor.tick().await, TickOutcome::Healthy);
		assert_eq!(monitor.state(), HealthState::default());
		assert!(alerts.sent.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn undelivered_alert_is_retried_on_next_failure() {
		let probe = ScriptedProbe::new(vec![false; 7]);
		let alerts = Arc::new(RecordingAlerts::default());
		alerts.failures_before_delivery.store(1, Ordering::SeqCst);
		let mut monitor = HealthMonitor::new(probe, Arc::clone(&alerts), MonitorSettings::default());

		for _ in 0..5 {
			monitor.tick().await;
		}
		assert!(!monitor.state().alert_sent);
		assert_eq!(monitor.tick().await, TickOutcome::Alerted { consecutive_failures: 6 });
		assert_eq!(monitor.tick().await, TickOutcome::Failing { consecutive_failures: 7 });
		assert_eq!(alerts.sent.lock().unwrap().len(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn hanging_probe_counts_as_failure() {
		let alerts = Arc::new(RecordingAlerts::default());
		let mut monitor = HealthMonitor::new(Arc::new(HangingProbe), alerts, MonitorSettings::default());
		let started = Instant::now();
		assert_eq!(monitor.tick().await, TickOutcome::Failing { consecutive_failures: 1 });
		let elapsed = started.elapsed();
		assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6));
	}

	#[tokio::test(start_paused = true)]
	async fn outage_scenario_alerts_at_fifth_and_eleventh_minute() {
		// Checks at minutes 1-5 fail, minute 6 succeeds, minutes 7-11 fail again.
		let mut script = vec![false; 5];
		script.push(true);
		script.extend([false; 5]);
		let probe = ScriptedProbe::new(script);
		let alerts = Arc::new(RecordingAlerts::default());
		let (ready_sender, ready) = watch::channel(false);

		let monitor = HealthMonitor::new(Arc::clone(&probe), Arc::clone(&alerts), MonitorSettings::default());
		let task = tokio::spawn(monitor.run(ready));
		sleep(Duration::from_secs(30)).await;
		assert_eq!(probe.calls.load(Ordering::SeqCst), 0);

		let start = Instant::now();
		ready_sender.send(true).unwrap();
		sleep(Duration::from_secs(60 * 11)).await;
		task.abort();

		let sent = alerts.sent.lock().unwrap();
		let alert_minutes: Vec<u64> = sent
			.iter()
			.map(|(at, _)| (at.duration_since(start).as_secs() / 60) + 1)
			.collect();
		assert_eq!(alert_minutes, vec![5, 11]);
		assert_eq!(sent[0].1, 5);
		assert_eq!(sent[1].1, 5);
	}

	struct PanicOnceProbe {
		calls: AtomicUsize,
	}

	#[async_trait]
	impl Probe for PanicOnceProbe {
		async fn probe(&self) -> Result<(), RconError> {
			if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
				panic!("probe blew up");
			}
			Ok(())
		}
	}

	#[tokio::test(start_paused = true)]
	async fn supervisor_restarts_panicked_monitor() {
		let probe = Arc::new(PanicOnceProbe {
			calls: AtomicUsize::new(0),
		});
		let alerts = Arc::new(RecordingAlerts::default());
		let (_ready_sender, ready) = watch::channel(true);

		let supervisor = tokio::spawn(supervise(
			Arc::clone(&probe),
			alerts,
			MonitorSettings::default(),
			ready,
		));
		sleep(Duration::from_secs(60 * 3 + 30)).await;
		supervisor.abort();

		assert!(probe.calls.load(Ordering::SeqCst) >= 3);
	}

	#[tokio::test]
	async fn monitor_stops_when_readiness_is_dropped() {
		let alerts = Arc::new(RecordingAlerts::default());
		let monitor = HealthMonitor::new(ScriptedProbe::new(Vec::new()), alerts, MonitorSettings::default());
		let (ready_sender, ready) = watch::channel(false);
		drop(ready_sender);
		monitor.run(ready).await;
	}
}
