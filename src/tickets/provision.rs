// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{ChannelRef, InFlightGate, PlatformError, TicketCategory, TicketError};
use async_trait::async_trait;
use twilight_mention::fmt::Mention;
use twilight_model::guild::Permissions;
use twilight_model::channel::permission_overwrite::{PermissionOverwrite, PermissionOverwriteType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, RoleMarker, UserMarker};

/// A submitted ticket request form
#[derive(Clone, Debug)]
pub struct TicketRequest {
	pub guild_id: Id<GuildMarker>,
	pub requester_id: Id<UserMarker>,
	pub requester_name: String,
	pub category: TicketCategory,
	/// Answers to the form, as (summary label, answer) pairs in form order
	pub fields: Vec<(String, String)>,
}

impl TicketRequest {
	pub fn channel_name(&self) -> String {
		format!("{}-{}", self.category.channel_prefix(), self.requester_name)
	}
}

/// The message posted in a newly created ticket channel
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TicketWelcome {
	pub staff_role: Id<RoleMarker>,
	pub requester_id: Id<UserMarker>,
	pub title: String,
	pub description: String,
}

impl TicketWelcome {
	pub fn for_request(request: &TicketRequest, staff_role: Id<RoleMarker>) -> Self {
		let answers: Vec<String> = request
			.fields
			.iter()
			.map(|(label, answer)| format!("**{}:** {}", label, answer))
			.collect();
		let description = format!("Hello {}!\n\n{}", request.requester_id.mention(), answers.join("\n"));
		Self {
			staff_role,
			requester_id: request.requester_id,
			title: request.category.request_title(),
			description,
		}
	}
}

/// The Discord operations ticket provisioning needs, scoped to the interaction that requested the ticket
#[async_trait]
pub trait TicketPlatform: Send + Sync {
	/// Acknowledges the triggering interaction so the user can see it's being handled
	async fn acknowledge(&self) -> Result<(), PlatformError>;

	async fn resolve_category(&self) -> Result<Option<Id<ChannelMarker>>, PlatformError>;

	async fn resolve_staff_role(&self) -> Result<Option<Id<RoleMarker>>, PlatformError>;

	fn bot_user(&self) -> Id<UserMarker>;

	async fn create_channel(
		&self,
		name: &str,
		parent: Id<ChannelMarker>,
		access: &[PermissionOverwrite],
	) -> Result<ChannelRef, PlatformError>;

	/// Sends a message only the requesting user can see
	async fn reply_privately(&self, content: &str) -> Result<(), PlatformError>;

	/// Posts the welcome message, with its close button, into the ticket channel
	async fn post_welcome(&self, channel: &ChannelRef, welcome: &TicketWelcome) -> Result<(), PlatformError>;
}

/// Builds the permission overwrites for a ticket channel: hidden from everyone except the requester, staff, and the
/// bot itself.
pub fn ticket_access_list(
	guild_id: Id<GuildMarker>,
	requester: Id<UserMarker>,
	staff_role: Id<RoleMarker>,
	bot_user: Id<UserMarker>,
) -> Vec<PermissionOverwrite> {
	let participant = Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES;
	vec![
		PermissionOverwrite {
			allow: Permissions::empty(),
			deny: Permissions::VIEW_CHANNEL,
			id: guild_id.cast(),
			kind: PermissionOverwriteType::Role,
		},
		PermissionOverwrite {
			allow: participant,
			deny: Permissions::empty(),
			id: requester.cast(),
			kind: PermissionOverwriteType::Member,
		},
		PermissionOverwrite {
			allow: participant | Permissions::MANAGE_CHANNELS,
			deny: Permissions::empty(),
			id: staff_role.cast(),
			kind: PermissionOverwriteType::Role,
		},
		PermissionOverwrite {
			allow: participant,
			deny: Permissions::empty(),
			id: bot_user.cast(),
			kind: PermissionOverwriteType::Member,
		},
	]
}

/// Creates a ticket channel for the request. Failures before the channel exists are reported privately to the
/// requester; failures after it exists are only logged.
pub async fn create_ticket<P: TicketPlatform + ?Sized>(
	platform: &P,
	gate: &InFlightGate,
	request: TicketRequest,
) -> Result<ChannelRef, TicketError> {
	let result = provision_channel(platform, gate, &request).await;
	if let Err(error) = &result {
		tracing::info!(
			source = ?error,
			requester = %request.requester_id,
			category = %request.category,
			"Ticket was not created"
		);
		if let Err(reply_error) = platform.reply_privately(error.user_message()).await {
			tracing::warn!(source = ?reply_error, "Failed to tell the requester their ticket wasn't created");
		}
	}
	result
}

async fn provision_channel<P: TicketPlatform + ?Sized>(
	platform: &P,
	gate: &InFlightGate,
	request: &TicketRequest,
) -> Result<ChannelRef, TicketError> {
	let Some(in_flight_guard) = gate.try_acquire(request.requester_id, request.category) else {
		return Err(TicketError::AlreadyInProgress);
	};

	platform.acknowledge().await?;

	let Some(category_channel) = platform.resolve_category().await? else {
		return Err(TicketError::CategoryNotFound);
	};
	let Some(staff_role) = platform.resolve_staff_role().await? else {
		return Err(TicketError::StaffRoleNotFound);
	};

	let access = ticket_access_list(request.guild_id, request.requester_id, staff_role, platform.bot_user());
	let channel = platform
		.create_channel(&request.channel_name(), category_channel, &access)
		.await?;
	drop(in_flight_guard);

	tracing::info!(
		channel = %channel.id,
		requester = %request.requester_id,
		category = %request.category,
		"Created ticket channel"
	);

	let confirmation = format!("✅ Created! {}", channel.id.mention());
	if let Err(error) = platform.reply_privately(&confirmation).await {
		tracing::warn!(source = ?error, channel = %channel.id, "Ticket created, but the requester couldn't be told");
	}

	let welcome = TicketWelcome::for_request(request, staff_role);
	if let Err(error) = platform.post_welcome(&channel, &welcome).await {
		tracing::warn!(source = ?error, channel = %channel.id, "Ticket created, but its welcome message failed to post");
	}

	Ok(channel)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use tokio::time::{Duration, sleep};

	const GUILD: u64 = 1000;
	const CATEGORY: u64 = 2000;
	const STAFF_ROLE: u64 = 3000;
	const BOT: u64 = 4000;
	const ADA: u64 = 5000;

	struct FakePlatform {
		category: Option<Id<ChannelMarker>>,
		staff_role: Option<Id<RoleMarker>>,
		acknowledge_delay: Duration,
		fail_welcome: bool,
		acknowledgements: AtomicUsize,
		channels: Mutex<Vec<(String, Id<ChannelMarker>, Vec<PermissionOverwrite>)>>,
		private_replies: Mutex<Vec<String>>,
		welcomes: Mutex<Vec<(ChannelRef, TicketWelcome)>>,
	}

	impl FakePlatform {
		fn new() -> Self {
			Self {
				category: Some(Id::new(CATEGORY)),
				staff_role: Some(Id::new(STAFF_ROLE)),
				acknowledge_delay: Duration::ZERO,
				fail_welcome: false,
				acknowledgements: AtomicUsize::new(0),
				channels: Mutex::new(Vec::new()),
				private_replies: Mutex::new(Vec::new()),
				welcomes: Mutex::new(Vec::new()),
			}
		}

		fn channel_count(&self) -> usize {
			self.channels.lock().unwrap().len()
		}
	}

	#[async_trait]
	impl TicketPlatform for FakePlatform {
		async fn acknowledge(&self) -> Result<(), PlatformError> {
			self.acknowledgements.fetch_add(1, Ordering::SeqCst);
			sleep(self.acknowledge_delay).await;
			Ok(())
		}

		async fn resolve_category(&self) -> Result<Option<Id<ChannelMarker>>, PlatformError> {
			Ok(self.category)
		}

		async fn resolve_staff_role(&self) -> Result<Option<Id<RoleMarker>>, PlatformError> {
			Ok(self.staff_role)
		}

		fn bot_user(&self) -> Id<UserMarker> {
			Id::new(BOT)
		}

		async fn create_channel(
			&self,
			name: &str,
			parent: Id<ChannelMarker>,
			access: &[PermissionOverwrite],
		) -> Result<ChannelRef, PlatformError> {
			let mut channels = self.channels.lock().unwrap();
			channels.push((name.to_string(), parent, access.to_vec()));
			Ok(ChannelRef {
				id: Id::new(9000 + channels.len() as u64),
				name: name.to_string(),
			})
		}

		async fn reply_privately(&self, content: &str) -> Result<(), PlatformError> {
			self.private_replies.lock().unwrap().push(content.to_string());
			Ok(())
		}

		async fn post_welcome(&self, channel: &ChannelRef, welcome: &TicketWelcome) -> Result<(), PlatformError> {
			if self.fail_welcome {
				return Err(PlatformError::new("Missing Permissions"));
			}
			self.welcomes.lock().unwrap().push((channel.clone(), welcome.clone()));
			Ok(())
		}
	}

	fn support_request() -> TicketRequest {
		TicketRequest {
			guild_id: Id::new(GUILD),
			requester_id: Id::new(ADA),
			requester_name: String::from("Ada"),
			category: TicketCategory::Support,
			fields: vec![
				(String::from("Subject"), String::from("Lost my *items*")),
				(String::from("Details"), String::from("Died in lava at X: 10, Z: -4\nPlease help")),
			],
		}
	}

	#[tokio::test]
	async fn support_ticket_for_ada() {
		let platform = FakePlatform::new();
		let gate = InFlightGate::default();

		let channel = create_ticket(&platform, &gate, support_request()).await.unwrap();
		assert_eq!(channel.name, "support-Ada");

		let channels = platform.channels.lock().unwrap();
		assert_eq!(channels.len(), 1);
		let (name, parent, access) = &channels[0];
		assert_eq!(name, "support-Ada");
		assert_eq!(*parent, Id::new(CATEGORY));
		assert_eq!(access.len(), 4);

		let welcomes = platform.welcomes.lock().unwrap();
		assert_eq!(welcomes.len(), 1);
		let (welcome_channel, welcome) = &welcomes[0];
		assert_eq!(welcome_channel, &channel);
		assert_eq!(welcome.title, "SUPPORT Request");
		assert_eq!(welcome.staff_role, Id::new(STAFF_ROLE));
		assert!(welcome.description.starts_with("Hello <@5000>!"));
		assert!(welcome.description.contains("**Subject:** Lost my *items*"));
		assert!(welcome.description.contains("**Details:** Died in lava at X: 10, Z: -4\nPlease help"));

		let replies = platform.private_replies.lock().unwrap();
		assert_eq!(*replies, vec![format!("✅ Created! <#{}>", channel.id)]);
	}

	#[test]
	fn access_list_hides_channel_from_everyone_else() {
		let access = ticket_access_list(Id::new(GUILD), Id::new(ADA), Id::new(STAFF_ROLE), Id::new(BOT));
		let participant = Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES;

		assert_eq!(access.len(), 4);
		assert_eq!(access[0].id, Id::new(GUILD));
		assert_eq!(access[0].kind, PermissionOverwriteType::Role);
		assert_eq!(access[0].deny, Permissions::VIEW_CHANNEL);
		assert_eq!(access[0].allow, Permissions::empty());
		assert_eq!(access[1].id, Id::new(ADA));
		assert_eq!(access[1].kind, PermissionOverwriteType::Member);
		assert_eq!(access[1].allow, participant);
		assert_eq!(access[1].deny, Permissions::empty());
		assert_eq!(access[2].id, Id::new(STAFF_ROLE));
		assert_eq!(access[2].kind, PermissionOverwriteType::Role);
		assert_eq!(access[2].allow, participant | Permissions::MANAGE_CHANNELS);
		assert_eq!(access[3].id, Id::new(BOT));
		assert_eq!(access[3].kind, PermissionOverwriteType::Member);
		assert_eq!(access[3].allow, participant);
	}

	#[tokio::test]
	async fn missing_category_creates_nothing() {
		let mut platform = FakePlatform::new();
		platform.category = None;
		let gate = InFlightGate::default();

		let result = create_ticket(&platform, &gate, support_request()).await;
		assert!(matches!(result, Err(TicketError::CategoryNotFound)));
		assert_eq!(platform.channel_count(), 0);
		assert!(platform.welcomes.lock().unwrap().is_empty());
		assert_eq!(*platform.private_replies.lock().unwrap(), vec![String::from("Category not found!")]);
	}

	#[tokio::test]
	async fn missing_staff_role_creates_nothing() {
		let mut platform = FakePlatform::new();
		platform.staff_role = None;
		let gate = InFlightGate::default();

		let result = create_ticket(&platform, &gate, support_request()).await;
		assert!(matches!(result, Err(TicketError::StaffRoleNotFound)));
		assert_eq!(platform.channel_count(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn concurrent_duplicate_submissions_create_one_channel() {
		let mut platform = FakePlatform::new();
		platform.acknowledge_delay = Duration::from_secs(2);
		let gate = InFlightGate::default();

		let (first, second) = tokio::join!(
			create_ticket(&platform, &gate, support_request()),
			create_ticket(&platform, &gate, support_request()),
		);

		assert!(first.is_ok());
		assert!(matches!(second, Err(TicketError::AlreadyInProgress)));
		assert_eq!(platform.channel_count(), 1);
		assert_eq!(platform.acknowledgements.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn gate_is_released_after_each_request() {
		let mut platform = FakePlatform::new();
		platform.category = None;
		let gate = InFlightGate::default();

		assert!(create_ticket(&platform, &gate, support_request()).await.is_err());
		platform.category = Some(Id::new(CATEGORY));
		assert!(create_ticket(&platform, &gate, support_request()).await.is_ok());
		assert!(create_ticket(&platform, &gate, support_request()).await.is_ok());
		assert_eq!(platform.channel_count(), 2);
	}

	#[tokio::test]
	async fn failed_welcome_keeps_the_channel() {
		let mut platform = FakePlatform::new();
		platform.fail_welcome = true;
		let gate = InFlightGate::default();

		let channel = create_ticket(&platform, &gate, support_request()).await.unwrap();
		assert_eq!(channel.name, "support-Ada");
		assert_eq!(platform.channel_count(), 1);
		assert_eq!(platform.private_replies.lock().unwrap().len(), 1);
	}

	#[test]
	fn staff_app_channels_use_hyphenated_prefix() {
		let mut request = support_request();
		request.category = TicketCategory::StaffApp;
		assert_eq!(request.channel_name(), "staff-app-Ada");
	}
}
