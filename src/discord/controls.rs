// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Buttons that stay usable across restarts. Their custom IDs are fixed, so any button the bot ever posted resolves
//! to an action through the registry built here at startup.

use crate::tickets::TicketCategory;
use std::collections::HashMap;
use twilight_model::channel::message::EmojiReactionType;
use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle, Component};

/// What pressing a persistent button does
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlAction {
	/// Shows the request form for a kind of ticket
	OpenForm(TicketCategory),
	CloseTicket,
}

#[derive(Debug)]
pub struct Control {
	pub custom_id: &'static str,
	pub label: &'static str,
	pub emoji: &'static str,
	pub style: ButtonStyle,
	pub action: ControlAction,
}

pub const SUPPORT_BUTTON: Control = Control {
	custom_id: "req_support",
	label: "General Support",
	emoji: "🛠️",
	style: ButtonStyle::Primary,
	action: ControlAction::OpenForm(TicketCategory::Support),
};

pub const WHITELIST_BUTTON: Control = Control {
	custom_id: "req_whitelist",
	label: "Whitelist Request",
	emoji: "📝",
	style: ButtonStyle::Success,
	action: ControlAction::OpenForm(TicketCategory::Whitelist),
};

pub const WARP_BUTTON: Control = Control {
	custom_id: "req_warp",
	label: "Player Warp Request",
	emoji: "📍",
	style: ButtonStyle::Secondary,
	action: ControlAction::OpenForm(TicketCategory::Warp),
};

pub const STAFF_APPLY_BUTTON: Control = Control {
	custom_id: "staff_apply_btn",
	label: "Apply for Staff",
	emoji: "🐝",
	style: ButtonStyle::Danger,
	action: ControlAction::OpenForm(TicketCategory::StaffApp),
};

pub const CLOSE_TICKET_BUTTON: Control = Control {
	custom_id: "close_ticket",
	label: "Close Ticket",
	emoji: "🔒",
	style: ButtonStyle::Danger,
	action: ControlAction::CloseTicket,
};

const CONTROLS: [&Control; 5] = [
	&SUPPORT_BUTTON,
	&WHITELIST_BUTTON,
	&WARP_BUTTON,
	&STAFF_APPLY_BUTTON,
	&CLOSE_TICKET_BUTTON,
];

/// Maps the custom ID of every persistent button to its action
#[derive(Debug)]
pub struct ControlRegistry {
	actions: HashMap<&'static str, ControlAction>,
}

impl ControlRegistry {
	pub fn new() -> Self {
		let actions: HashMap<&'static str, ControlAction> =
			CONTROLS.iter().map(|control| (control.custom_id, control.action)).collect();
		tracing::debug!(count = actions.len(), "Registered persistent controls");
		Self { actions }
	}

	pub fn action(&self, custom_id: &str) -> Option<ControlAction> {
		self.actions.get(custom_id).copied()
	}
}

impl Default for ControlRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl Control {
	pub fn button(&self) -> Component {
		Component::Button(Button {
			custom_id: Some(String::from(self.custom_id)),
			disabled: false,
			emoji: Some(EmojiReactionType::Unicode {
				name: String::from(self.emoji),
			}),
			label: Some(String::from(self.label)),
			style: self.style,
			url: None,
			sku_id: None,
		})
	}
}

/// An action row holding the buttons for the given controls
pub fn button_row(controls: &[&Control]) -> Component {
	Component::ActionRow(ActionRow {
		components: controls.iter().map(|control| control.button()).collect(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn every_control_resolves_to_its_action() {
		let registry = ControlRegistry::new();
		for control in CONTROLS {
			assert_eq!(registry.action(control.custom_id), Some(control.action));
		}
		assert_eq!(registry.action("create_ticket/123"), None);
	}

	#[test]
	fn custom_ids_are_unique() {
		let ids: HashSet<&str> = CONTROLS.iter().map(|control| control.custom_id).collect();
		assert_eq!(ids.len(), CONTROLS.len());
	}

	#[test]
	fn every_ticket_category_has_a_form_button() {
		let registry = ControlRegistry::new();
		for category in TicketCategory::all() {
			assert!(
				CONTROLS
					.iter()
					.any(|control| registry.action(control.custom_id) == Some(ControlAction::OpenForm(category)))
			);
		}
	}

	#[test]
	fn buttons_carry_their_custom_id() {
		let Component::ActionRow(row) = button_row(&[&SUPPORT_BUTTON, &CLOSE_TICKET_BUTTON]) else {
			panic!("expected an action row");
		};
		let ids: Vec<Option<String>> = row
			.components
			.into_iter()
			.map(|component| match component {
				Component::Button(button) => button.custom_id,
				_ => None,
			})
			.collect();
		assert_eq!(ids, vec![Some(String::from("req_support")), Some(String::from("close_ticket"))]);
	}
}
