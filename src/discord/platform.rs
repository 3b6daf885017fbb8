// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ticket workflows' view of Discord, backed by the HTTP client and the gateway cache.

use super::connection::BotContext;
use super::controls::{CLOSE_TICKET_BUTTON, button_row};
use crate::tickets::{ArchivePlatform, ArchivedMessage, ChannelRef, PlatformError, TicketPlatform, TicketWelcome};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use twilight_http::error::{Error as HttpError, ErrorType};
use twilight_http::request::AuditLogReason;
use twilight_http::response::StatusCode;
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::component::Component;
use twilight_model::channel::message::embed::Embed;
use twilight_model::channel::message::{AllowedMentions, Message, MessageFlags};
use twilight_model::channel::permission_overwrite::PermissionOverwrite;
use twilight_model::channel::{Channel, ChannelType};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::attachment::Attachment;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, RoleMarker, UserMarker};
use twilight_util::builder::InteractionResponseDataBuilder;
use twilight_util::builder::embed::EmbedBuilder;

/// Discord returns at most this many messages per history request
const HISTORY_PAGE_SIZE: usize = 100;

const REQUEST_EMBED_COLOR: u32 = 0x3498db;
const ARCHIVE_EMBED_COLOR: u32 = 0xe74c3c;

fn is_not_found(error: &HttpError) -> bool {
	matches!(error.kind(), ErrorType::Response { status, .. } if *status == StatusCode::NOT_FOUND)
}

fn is_ticket_category(channel: &Channel, guild_id: Id<GuildMarker>) -> bool {
	channel.kind == ChannelType::GuildCategory && channel.guild_id == Some(guild_id)
}

/// Provisions tickets in response to a submitted request form
pub struct DiscordTicketPlatform<'a> {
	context: &'a BotContext,
	interaction: &'a InteractionCreate,
	guild_id: Id<GuildMarker>,
	acknowledged: AtomicBool,
}

impl<'a> DiscordTicketPlatform<'a> {
	pub fn new(context: &'a BotContext, interaction: &'a InteractionCreate, guild_id: Id<GuildMarker>) -> Self {
		Self {
			context,
			interaction,
			guild_id,
			acknowledged: AtomicBool::new(false),
		}
	}
}

#[async_trait]
impl TicketPlatform for DiscordTicketPlatform<'_> {
	async fn acknowledge(&self) -> Result<(), PlatformError> {
		let response = InteractionResponseDataBuilder::new()
			.flags(MessageFlags::EPHEMERAL)
			.build();
		let response = InteractionResponse {
			kind: InteractionResponseType::DeferredChannelMessageWithSource,
			data: Some(response),
		};
		self.context
			.http_client
			.interaction(self.context.application_id)
			.create_response(self.interaction.id, &self.interaction.token, &response)
			.await?;
		self.acknowledged.store(true, Ordering::Release);
		Ok(())
	}

	async fn resolve_category(&self) -> Result<Option<Id<ChannelMarker>>, PlatformError> {
		let category_id = self.context.config.guild.ticket_category;
		if let Some(channel) = self.context.cache.channel(category_id) {
			return Ok(is_ticket_category(&channel, self.guild_id).then_some(category_id));
		}

		match self.context.http_client.channel(category_id).await {
			Ok(response) => {
				let channel = response.model().await?;
				Ok(is_ticket_category(&channel, self.guild_id).then_some(category_id))
			}
			Err(error) if is_not_found(&error) => Ok(None),
			Err(error) => Err(error.into()),
		}
	}

	async fn resolve_staff_role(&self) -> Result<Option<Id<RoleMarker>>, PlatformError> {
		let staff_role = self.context.config.guild.staff_role;
		if let Some(role) = self.context.cache.role(staff_role) {
			return Ok((role.guild_id() == self.guild_id).then_some(staff_role));
		}

		let roles = self.context.http_client.roles(self.guild_id).await?.models().await?;
		Ok(roles.iter().any(|role| role.id == staff_role).then_some(staff_role))
	}

	fn bot_user(&self) -> Id<UserMarker> {
		self.context.bot_user_id
	}

	async fn create_channel(
		&self,
		name: &str,
		parent: Id<ChannelMarker>,
		access: &[PermissionOverwrite],
	) -> Result<ChannelRef, PlatformError> {
		let channel = self
			.context
			.http_client
			.create_guild_channel(self.guild_id, name)
			.kind(ChannelType::GuildText)
			.parent_id(parent)
			.permission_overwrites(access)
			.reason("Ticket requested")
			.await?
			.model()
			.await?;
		Ok(ChannelRef {
			id: channel.id,
			name: channel.name.unwrap_or_else(|| name.to_string()),
		})
	}

	async fn reply_privately(&self, content: &str) -> Result<(), PlatformError> {
		let interaction_client = self.context.http_client.interaction(self.context.application_id);
		if self.acknowledged.load(Ordering::Acquire) {
			interaction_client
				.create_followup(&self.interaction.token)
				.content(content)
				.flags(MessageFlags::EPHEMERAL)
				.await?;
		} else {
			let response = InteractionResponseDataBuilder::new()
				.content(content)
				.flags(MessageFlags::EPHEMERAL)
				.build();
			let response = InteractionResponse {
				kind: InteractionResponseType::ChannelMessageWithSource,
				data: Some(response),
			};
			interaction_client
				.create_response(self.interaction.id, &self.interaction.token, &response)
				.await?;
		}
		Ok(())
	}

	async fn post_welcome(&self, channel: &ChannelRef, welcome: &TicketWelcome) -> Result<(), PlatformError> {
		let message = WelcomeMessage::new(welcome)?;
		self.context
			.http_client
			.create_message(channel.id)
			.content(&message.content)
			.embeds(&[message.embed])
			.components(&message.components)
			.allowed_mentions(Some(&message.allowed_mentions))
			.await?;
		Ok(())
	}
}

/// The first message in a ticket channel: pings staff and carries the ticket's close button
struct WelcomeMessage {
	content: String,
	embed: Embed,
	components: Vec<Component>,
	allowed_mentions: AllowedMentions,
}

impl WelcomeMessage {
	fn new(welcome: &TicketWelcome) -> Result<Self, PlatformError> {
		let embed = EmbedBuilder::new()
			.title(&welcome.title)
			.description(&welcome.description)
			.color(REQUEST_EMBED_COLOR)
			.validate()?
			.build();
		let mut allowed_mentions = AllowedMentions::default();
		allowed_mentions.roles.push(welcome.staff_role);

		Ok(Self {
			content: welcome.staff_role.mention().to_string(),
			embed,
			components: vec![button_row(&[&CLOSE_TICKET_BUTTON])],
			allowed_mentions,
		})
	}
}

/// Archives and deletes a ticket channel in response to its close button
pub struct DiscordArchivePlatform<'a> {
	context: &'a BotContext,
	interaction: &'a InteractionCreate,
}

impl<'a> DiscordArchivePlatform<'a> {
	pub fn new(context: &'a BotContext, interaction: &'a InteractionCreate) -> Self {
		Self { context, interaction }
	}
}

fn archived_message(message: Message) -> Option<ArchivedMessage> {
	let timestamp = Utc.timestamp_micros(message.timestamp.as_micros()).single()?;
	Some(ArchivedMessage {
		timestamp,
		author: message.author.name,
		text: message.content,
	})
}

#[async_trait]
impl ArchivePlatform for DiscordArchivePlatform<'_> {
	async fn acknowledge_close(&self) -> Result<(), PlatformError> {
		let response = InteractionResponseDataBuilder::new()
			.content("💾 Archiving and closing...")
			.build();
		let response = InteractionResponse {
			kind: InteractionResponseType::ChannelMessageWithSource,
			data: Some(response),
		};
		self.context
			.http_client
			.interaction(self.context.application_id)
			.create_response(self.interaction.id, &self.interaction.token, &response)
			.await?;
		Ok(())
	}

	async fn recent_messages(
		&self,
		channel: Id<ChannelMarker>,
		limit: usize,
	) -> Result<Vec<ArchivedMessage>, PlatformError> {
		let mut messages = Vec::new();
		let mut before: Option<Id<MessageMarker>> = None;

		while messages.len() < limit {
			let page_size = (limit - messages.len()).min(HISTORY_PAGE_SIZE);
			let request = self.context.http_client.channel_messages(channel);
			let response = match before {
				Some(before) => request.before(before).limit(page_size as u16).await?,
				None => request.limit(page_size as u16).await?,
			};
			// Pages come newest first
			let page = response.models().await?;
			let page_len = page.len();
			before = page.last().map(|message| message.id);
			messages.extend(page.into_iter().filter_map(archived_message));

			if page_len < page_size {
				break;
			}
		}

		Ok(messages)
	}

	async fn upload_archive(
		&self,
		log_channel: Id<ChannelMarker>,
		ticket_channel: &ChannelRef,
		file_name: &str,
		contents: Vec<u8>,
	) -> Result<(), PlatformError> {
		let embed = EmbedBuilder::new()
			.title("Channel Archived")
			.description(format!("**Name:** {}", ticket_channel.name))
			.color(ARCHIVE_EMBED_COLOR)
			.validate()?
			.build();
		let attachment = Attachment::from_bytes(file_name.to_string(), contents, 1);

		self.context
			.http_client
			.create_message(log_channel)
			.embeds(&[embed])
			.attachments(&[attachment])
			.await?;
		Ok(())
	}

	async fn delete_channel(&self, channel: Id<ChannelMarker>) -> Result<(), PlatformError> {
		self.context
			.http_client
			.delete_channel(channel)
			.reason("Ticket closed")
			.await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn welcome_message_pings_staff_and_offers_close_button() {
		let welcome = TicketWelcome {
			staff_role: Id::new(3000),
			requester_id: Id::new(5000),
			title: String::from("SUPPORT Request"),
			description: String::from("Hello <@5000>!\n\n**Subject:** Lost my items"),
		};
		let message = WelcomeMessage::new(&welcome).unwrap();

		assert_eq!(message.content, "<@&3000>");
		assert_eq!(message.embed.title.as_deref(), Some("SUPPORT Request"));
		assert_eq!(message.embed.description.as_deref(), Some(welcome.description.as_str()));
		assert_eq!(message.allowed_mentions.roles, vec![Id::new(3000)]);
		assert!(message.allowed_mentions.users.is_empty());

		let [Component::ActionRow(row)] = message.components.as_slice() else {
			panic!("expected a single action row");
		};
		let [Component::Button(button)] = row.components.as_slice() else {
			panic!("expected a single button");
		};
		assert_eq!(button.custom_id.as_deref(), Some(CLOSE_TICKET_BUTTON.custom_id));
		assert_eq!(button.label.as_deref(), Some("Close Ticket"));
	}
}
