// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::connection::BotContext;
use crate::discord::utils::responses::{defer, follow_up};
use crate::game_text::status_header;
use crate::rcon::run_command;
use miette::IntoDiagnostic;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::CommandBuilder;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

const EMBED_COLOR: u32 = 0xf1c40f;

pub fn command_definition() -> Command {
	CommandBuilder::new("players", "Shows the online players", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.build()
}

pub async fn handle_command(interaction: &InteractionCreate, context: &BotContext) -> miette::Result<()> {
	let http_client = &context.http_client;
	let application_id = context.application_id;
	defer(interaction, http_client, application_id, false).await?;

	let list_output = match run_command(&context.config.rcon, "list").await {
		Ok(output) => output,
		Err(error) => {
			tracing::warn!(source = ?error, "Failed to get the player list");
			let message = format!("❌ Connection Error: {}", error);
			return follow_up(interaction, http_client, application_id, &message, true).await;
		}
	};

	let embed = EmbedBuilder::new()
		.title(format!("🏰 {} Status", context.config.discord.community_name))
		.description(format!("**{}**", status_header(&list_output)))
		.color(EMBED_COLOR)
		.footer(EmbedFooterBuilder::new(format!("IP: {}", context.config.rcon.host)))
		.validate()
		.into_diagnostic()?
		.build();
	http_client
		.interaction(application_id)
		.create_followup(&interaction.token)
		.embeds(&[embed])
		.await
		.into_diagnostic()?;

	Ok(())
}
