// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::GuildConfig;
use crate::discord::connection::BotContext;
use crate::discord::utils::users::{avatar_url, display_name};
use miette::IntoDiagnostic;
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::channel::message::embed::Embed;
use twilight_model::gateway::payload::incoming::MemberAdd;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder, ImageSource};

const WELCOME_COLOR: u32 = 0xf1c40f;

/// Greets a new member in the welcome channel. Failures are only logged.
pub async fn welcome_member(member_add: &MemberAdd, context: &BotContext) {
	let user_id = member_add.member.user.id;
	if let Err(error) = send_welcome(member_add, context).await {
		tracing::warn!(source = ?error, user = %user_id, "Failed to send welcome message");
	}
}

async fn send_welcome(member_add: &MemberAdd, context: &BotContext) -> miette::Result<()> {
	let member = &member_add.member;
	let name = display_name(member.nick.as_deref(), &member.user);
	let embed = welcome_embed(
		&context.config.discord.community_name,
		&name,
		member.user.id,
		&avatar_url(&member.user),
		&context.config.guild,
	)?;

	let content = format!("Welcome {}!", member.user.id.mention());
	let mut allowed_mentions = AllowedMentions::default();
	allowed_mentions.users.push(member.user.id);
	context
		.http_client
		.create_message(context.config.guild.welcome_channel)
		.content(&content)
		.embeds(&[embed])
		.allowed_mentions(Some(&allowed_mentions))
		.await
		.into_diagnostic()?;

	tracing::info!(user = %member.user.id, guild = %member_add.guild_id, "Welcomed new member");
	Ok(())
}

fn welcome_embed(
	community_name: &str,
	display_name: &str,
	user_id: Id<UserMarker>,
	avatar_url: &str,
	guild: &GuildConfig,
) -> miette::Result<Embed> {
	let description = format!(
		"Hi {}! To get started on the SMP, please follow these steps:\n\n\
		✅ **Verify Age:** Refer to {} to confirm you are 18+.\n\
		✅ **Read Rules:** Please check {} and react with a ✅.\n\
		✅ **Join:** Go to {} and click **Whitelist Request**.\n\n\
		*Make sure to mention if you are on Bedrock or Java in your ticket!*",
		user_id.mention(),
		guild.verification_channel.mention(),
		guild.rules_channel.mention(),
		guild.support_request_channel.mention(),
	);
	let thumbnail = ImageSource::url(avatar_url).into_diagnostic()?;
	let embed = EmbedBuilder::new()
		.title(format!("🌸 Welcome to {}, {}!", community_name, display_name))
		.description(description)
		.color(WELCOME_COLOR)
		.thumbnail(thumbnail)
		.footer(EmbedFooterBuilder::new(community_name))
		.validate()
		.into_diagnostic()?
		.build();
	Ok(embed)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn guild() -> GuildConfig {
		GuildConfig {
			staff_role: Id::new(1),
			ticket_category: Id::new(2),
			log_channel: None,
			welcome_channel: Id::new(3),
			rules_channel: Id::new(4),
			support_request_channel: Id::new(5),
			verification_channel: Id::new(6),
			admin_alert_channel: Id::new(7),
		}
	}

	#[test]
	fn welcome_embed_links_the_onboarding_channels() {
		let embed = welcome_embed(
			"Honey Blossom SMP",
			"Ada",
			Id::new(5000),
			"https://cdn.discordapp.com/embed/avatars/0.png",
			&guild(),
		)
		.unwrap();

		assert_eq!(embed.title.as_deref(), Some("🌸 Welcome to Honey Blossom SMP, Ada!"));
		let description = embed.description.unwrap();
		assert!(description.starts_with("Hi <@5000>!"));
		assert!(description.contains("Refer to <#6> to confirm"));
		assert!(description.contains("Please check <#4> and react"));
		assert!(description.contains("Go to <#5> and click"));
		assert_eq!(
			embed.thumbnail.map(|thumbnail| thumbnail.url),
			Some(String::from("https://cdn.discordapp.com/embed/avatars/0.png"))
		);
		assert_eq!(embed.footer.map(|footer| footer.text), Some(String::from("Honey Blossom SMP")));
	}
}
