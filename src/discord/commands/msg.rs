// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::string_option;
use crate::discord::connection::BotContext;
use crate::discord::utils::responses::{defer, follow_up, respond_ephemeral};
use crate::discord::utils::users::interaction_display_name;
use crate::game_text::{is_valid_player_name, tellraw_command};
use crate::rcon::run_command;
use miette::{IntoDiagnostic, bail};
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::{CommandBuilder, StringBuilder};

const MAX_MESSAGE_LENGTH: u16 = 256;

pub fn command_definition() -> Command {
	let player = StringBuilder::new("mc_username", "The player to message")
		.required(true)
		.build();
	let message = StringBuilder::new("message", "What to tell them")
		.required(true)
		.max_length(MAX_MESSAGE_LENGTH)
		.build();
	CommandBuilder::new("msg", "Send a private message to a player in-game", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.option(player)
		.option(message)
		.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	context: &BotContext,
) -> miette::Result<()> {
	let http_client = &context.http_client;
	let application_id = context.application_id;

	let player = string_option(command_data, "mc_username")?.trim();
	let message = string_option(command_data, "message")?;
	if !is_valid_player_name(player) {
		let response = format!("❌ `{}` isn't a valid Minecraft username.", player);
		return respond_ephemeral(interaction, http_client, application_id, &response).await;
	}
	let Some(sender) = interaction_display_name(interaction) else {
		bail!("Message command was used without a user");
	};

	let command = tellraw_command(player, &sender, message).into_diagnostic()?;
	defer(interaction, http_client, application_id, true).await?;

	let response = match run_command(&context.config.rcon, &command).await {
		Ok(_) => format!("📬 Message sent to **{}**!", player),
		Err(error) => {
			tracing::warn!(source = ?error, player, "Failed to message player");
			format!("❌ Error: {}", error)
		}
	};
	follow_up(interaction, http_client, application_id, &response, true).await
}
