// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

/// A question on a ticket request form
#[derive(Clone, Copy, Debug)]
pub struct FormField {
	pub id: &'static str,
	/// Label shown on the form input
	pub label: &'static str,
	/// Label used when the answer is repeated in the ticket channel
	pub summary_label: &'static str,
	pub placeholder: Option<&'static str>,
	pub long_answer: bool,
}

impl FormField {
	const fn short(id: &'static str, label: &'static str, summary_label: &'static str, placeholder: &'static str) -> Self {
		Self {
			id,
			label,
			summary_label,
			placeholder: Some(placeholder),
			long_answer: false,
		}
	}

	const fn long(
		id: &'static str,
		label: &'static str,
		summary_label: &'static str,
		placeholder: Option<&'static str>,
	) -> Self {
		Self {
			id,
			label,
			summary_label,
			placeholder,
			long_answer: true,
		}
	}
}

const SUPPORT_FIELDS: &[FormField] = &[
	FormField::short("subject", "Subject", "Subject", "Briefly describe the issue"),
	FormField::long("details", "Details", "Details", Some("What do you need help with?")),
];

const WHITELIST_FIELDS: &[FormField] = &[
	FormField::short(
		"username",
		"Minecraft Username",
		"MC Username",
		"Exactly as it appears in-game",
	),
	FormField::short("platform", "Platform", "Platform", "Java or Bedrock?"),
];

const WARP_FIELDS: &[FormField] = &[
	FormField::short("warp_name", "Warp Name", "Warp Name", "e.g. Grinder, Library"),
	FormField::short(
		"location",
		"Location (Coordinates)",
		"Location",
		"X: 100, Y: 64, Z: -200",
	),
	FormField::long(
		"purpose",
		"Purpose of Warp",
		"Purpose",
		Some("Explain what this warp is for..."),
	),
];

const STAFF_APP_FIELDS: &[FormField] = &[
	FormField::short(
		"role",
		"Role Applying For",
		"Role Applied For",
		"Honey Lotus, Adminbeestrator, or Hive Overseer",
	),
	FormField::long("reason", "Why do you want this role?", "Reasoning", None),
	FormField::long(
		"experience",
		"Experience",
		"Experience",
		Some("Tell us about your history as staff..."),
	),
];

/// The kinds of ticket users can open
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TicketCategory {
	Support,
	Whitelist,
	Warp,
	StaffApp,
}

impl TicketCategory {
	pub fn all() -> [Self; 4] {
		[Self::Support, Self::Whitelist, Self::Warp, Self::StaffApp]
	}

	/// The prefix of ticket channel names for this category
	pub fn channel_prefix(&self) -> &'static str {
		match self {
			Self::Support => "support",
			Self::Whitelist => "whitelist",
			Self::Warp => "warp",
			Self::StaffApp => "staff-app",
		}
	}

	pub fn from_channel_prefix(prefix: &str) -> Option<Self> {
		Self::all()
			.into_iter()
			.find(|category| category.channel_prefix() == prefix)
	}

	pub fn form_title(&self) -> &'static str {
		match self {
			Self::Support => "General Support Request",
			Self::Whitelist => "Whitelist Application",
			Self::Warp => "Player Warp Request",
			Self::StaffApp => "Staff Application",
		}
	}

	pub fn form_fields(&self) -> &'static [FormField] {
		match self {
			Self::Support => SUPPORT_FIELDS,
			Self::Whitelist => WHITELIST_FIELDS,
			Self::Warp => WARP_FIELDS,
			Self::StaffApp => STAFF_APP_FIELDS,
		}
	}

	/// Title of the welcome message posted in a new ticket channel
	pub fn request_title(&self) -> String {
		format!("{} Request", self.channel_prefix().to_uppercase())
	}
}

impl fmt::Display for TicketCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.channel_prefix())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prefixes_round_trip() {
		for category in TicketCategory::all() {
			assert_eq!(TicketCategory::from_channel_prefix(category.channel_prefix()), Some(category));
		}
		assert_eq!(TicketCategory::from_channel_prefix("appeal"), None);
	}

	#[test]
	fn staff_app_title_keeps_its_hyphen() {
		assert_eq!(TicketCategory::StaffApp.request_title(), "STAFF-APP Request");
		assert_eq!(TicketCategory::Support.request_title(), "SUPPORT Request");
	}

	#[test]
	fn forms_fit_in_a_modal() {
		// Discord modals hold at most five inputs, and each label at most 45 characters.
		for category in TicketCategory::all() {
			let fields = category.form_fields();
			assert!(!fields.is_empty() && fields.len() <= 5);
			for field in fields {
				assert!(field.label.chars().count() <= 45, "{} is too long", field.label);
			}
		}
	}
}
