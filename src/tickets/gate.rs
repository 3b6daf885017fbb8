// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::TicketCategory;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

type InFlightKey = (Id<UserMarker>, TicketCategory);

/// Tracks ticket requests that are currently being provisioned so that a user can't create the same ticket twice by
/// submitting again before the first request finishes.
#[derive(Debug, Default)]
pub struct InFlightGate {
	in_flight: Mutex<HashSet<InFlightKey>>,
}

impl InFlightGate {
	/// Claims the request slot for the user and category. Returns `None` if a request is already in flight; otherwise,
	/// the slot is held until the returned guard is dropped.
	pub fn try_acquire(&self, user: Id<UserMarker>, category: TicketCategory) -> Option<InFlightGuard<'_>> {
		let key = (user, category);
		let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
		if !in_flight.insert(key) {
			return None;
		}
		Some(InFlightGuard { gate: self, key })
	}

	fn release(&self, key: &InFlightKey) {
		let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
		in_flight.remove(key);
	}
}

#[derive(Debug)]
pub struct InFlightGuard<'a> {
	gate: &'a InFlightGate,
	key: InFlightKey,
}

impl Drop for InFlightGuard<'_> {
	fn drop(&mut self) {
		self.gate.release(&self.key);
	}
}
