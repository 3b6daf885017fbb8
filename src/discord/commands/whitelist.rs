// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::string_option;
use crate::discord::connection::BotContext;
use crate::discord::utils::responses::{STAFF_ONLY, defer, follow_up, respond_ephemeral};
use crate::discord::utils::users::has_role;
use crate::game_text::{is_valid_player_name, scrub};
use crate::rcon::run_command;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::{CommandBuilder, StringBuilder};

pub fn command_definition() -> Command {
	let username = StringBuilder::new("username", "The player's Minecraft username")
		.required(true)
		.build();
	let platform = StringBuilder::new("platform", "Java or Bedrock")
		.required(true)
		.choices([("Java", "java"), ("Bedrock", "bedrock")])
		.build();
	CommandBuilder::new("whitelist", "Add a player to the server", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.option(username)
		.option(platform)
		.build()
}

/// The console command that whitelists a player. Bedrock players go through Floodgate's whitelist.
fn whitelist_command(username: &str, platform: &str) -> String {
	if platform.eq_ignore_ascii_case("bedrock") {
		format!("fwhitelist add {}", username)
	} else {
		format!("whitelist add {}", username)
	}
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	context: &BotContext,
) -> miette::Result<()> {
	let http_client = &context.http_client;
	let application_id = context.application_id;
	if !has_role(interaction, context.config.guild.staff_role) {
		return respond_ephemeral(interaction, http_client, application_id, STAFF_ONLY).await;
	}

	let username = string_option(command_data, "username")?.trim();
	let platform = string_option(command_data, "platform")?;
	if !is_valid_player_name(username) {
		let message = format!("❌ `{}` isn't a valid Minecraft username.", username);
		return respond_ephemeral(interaction, http_client, application_id, &message).await;
	}

	let command = whitelist_command(username, platform);
	defer(interaction, http_client, application_id, false).await?;

	let message = match run_command(&context.config.rcon, &command).await {
		Ok(response) => {
			tracing::info!(command, "Whitelisted player");
			let response = scrub(&response);
			format!("**Sent:** `{}`\n**Response:** `{}`", command, response)
		}
		Err(error) => {
			tracing::warn!(source = ?error, command, "Failed to whitelist player");
			format!("❌ Error: {}", error)
		}
	};
	follow_up(interaction, http_client, application_id, &message, false).await
}
