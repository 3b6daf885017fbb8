// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Failure tracking for the game server health checks
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HealthState {
	pub consecutive_failures: u32,
	pub alert_sent: bool,
}

impl HealthState {
	pub fn record_success(&mut self) {
		self.consecutive_failures = 0;
		self.alert_sent = false;
	}

	/// Counts a failed probe. Returns whether staff should be alerted now.
	///
	/// The alert is only due while it hasn't been sent for the current failure streak; call [Self::mark_alert_sent]
	/// once it's been delivered.
	pub fn record_failure(&mut self, alert_threshold: u32) -> bool {
		self.consecutive_failures = self.consecutive_failures.saturating_add(1);
		self.consecutive_failures >= alert_threshold && !self.alert_sent
	}

	pub fn mark_alert_sent(&mut self) {
		self.alert_sent = true;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn alert_is_due_once_per_streak() {
		let mut state = HealthState::default();
		let mut alerts = 0;
		for _ in 0..12 {
			if state.record_failure(5) {
				alerts += 1;
				state.mark_alert_sent();
			}
		}
		assert_eq!(alerts, 1);
		assert_eq!(state.consecutive_failures, 12);
	}

	#[test]
	fn alert_stays_due_until_delivered() {
		let mut state = HealthState::default();
		for _ in 0..4 {
			assert!(!state.record_failure(5));
		}
		assert!(state.record_failure(5));
		assert!(state.record_failure(5));
		state.mark_alert_sent();
		assert!(!state.record_failure(5));
	}

	#[test]
	fn success_resets_any_streak() {
		for failures in [1, 4, 5, 6, 40] {
			let mut state = HealthState::default();
			for _ in 0..failures {
				if state.record_failure(5) {
					state.mark_alert_sent();
				}
			}
			state.record_success();
			assert_eq!(state, HealthState::default());
		}
	}
}
