// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ticket lifecycle: provisioning private ticket channels and archiving them when they're closed.
//!
//! The workflows here talk to Discord only through the [TicketPlatform] and [ArchivePlatform] traits.

use miette::Diagnostic;
use std::error::Error as StdError;
use thiserror::Error;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

mod archive;
mod category;
mod close;
mod gate;
mod provision;

pub use archive::{ARCHIVE_MESSAGE_LIMIT, ArchiveRecord, ArchivedMessage};
pub use category::{FormField, TicketCategory};
pub use close::{ArchivePlatform, CloseSettings, close_ticket};
pub use gate::{InFlightGate, InFlightGuard};
pub use provision::{TicketPlatform, TicketRequest, TicketWelcome, create_ticket, ticket_access_list};

/// A channel created for a ticket
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChannelRef {
	pub id: Id<ChannelMarker>,
	pub name: String,
}

/// Discord refused or failed to carry out a request
#[derive(Debug, Diagnostic, Error)]
#[error("Discord request failed: {0}")]
#[diagnostic(code(hivekeeper::platform))]
pub struct PlatformError(#[source] Box<dyn StdError + Send + Sync>);

impl PlatformError {
	pub fn new(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
		Self(error.into())
	}
}

impl From<twilight_http::error::Error> for PlatformError {
	fn from(error: twilight_http::error::Error) -> Self {
		Self::new(error)
	}
}

impl From<twilight_http::response::DeserializeBodyError> for PlatformError {
	fn from(error: twilight_http::response::DeserializeBodyError) -> Self {
		Self::new(error)
	}
}

impl From<twilight_validate::embed::EmbedValidationError> for PlatformError {
	fn from(error: twilight_validate::embed::EmbedValidationError) -> Self {
		Self::new(error)
	}
}

#[derive(Debug, Diagnostic, Error)]
pub enum TicketError {
	#[error("a ticket of this kind is already being created for this user")]
	#[diagnostic(code(hivekeeper::ticket::in_progress))]
	AlreadyInProgress,
	#[error("the configured ticket category could not be found")]
	#[diagnostic(code(hivekeeper::ticket::category_not_found), help("check `ticket_category` in the configuration"))]
	CategoryNotFound,
	#[error("the configured staff role could not be found")]
	#[diagnostic(code(hivekeeper::ticket::staff_role_not_found), help("check `staff_role` in the configuration"))]
	StaffRoleNotFound,
	#[error("failed to write the ticket archive")]
	#[diagnostic(code(hivekeeper::ticket::archive))]
	Archive(#[source] std::io::Error),
	#[error(transparent)]
	#[diagnostic(transparent)]
	Platform(#[from] PlatformError),
}

impl TicketError {
	/// The short message shown to the user whose request failed
	pub fn user_message(&self) -> &'static str {
		match self {
			Self::AlreadyInProgress => "Your request is already being processed.",
			Self::CategoryNotFound => "Category not found!",
			Self::StaffRoleNotFound => "Staff role not found!",
			Self::Archive(_) | Self::Platform(_) => "❌ Something went wrong. Please try again later.",
		}
	}
}
