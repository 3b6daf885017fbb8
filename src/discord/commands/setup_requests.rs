// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::connection::BotContext;
use crate::discord::controls::{SUPPORT_BUTTON, WARP_BUTTON, WHITELIST_BUTTON, button_row};
use crate::discord::utils::responses::{STAFF_ONLY, respond_ephemeral};
use crate::discord::utils::users::has_role;
use miette::{IntoDiagnostic, bail};
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::CommandBuilder;
use twilight_util::builder::embed::EmbedBuilder;

const EMBED_COLOR: u32 = 0x3498db;

pub fn command_definition() -> Command {
	CommandBuilder::new(
		"setup-requests",
		"Deploys the request system (Staff Only)",
		CommandType::ChatInput,
	)
	.contexts([InteractionContextType::Guild])
	.build()
}

pub async fn handle_command(interaction: &InteractionCreate, context: &BotContext) -> miette::Result<()> {
	let http_client = &context.http_client;
	if !has_role(interaction, context.config.guild.staff_role) {
		return respond_ephemeral(interaction, http_client, context.application_id, STAFF_ONLY).await;
	}
	let Some(channel) = &interaction.channel else {
		bail!("Setup requests command was used without a channel");
	};

	let embed = EmbedBuilder::new()
		.title("Server Request Center")
		.description("Select a button below to open a ticket.")
		.color(EMBED_COLOR)
		.validate()
		.into_diagnostic()?
		.build();
	let buttons = button_row(&[&SUPPORT_BUTTON, &WHITELIST_BUTTON, &WARP_BUTTON]);
	http_client
		.create_message(channel.id)
		.embeds(&[embed])
		.components(&[buttons])
		.await
		.into_diagnostic()?;

	respond_ephemeral(interaction, http_client, context.application_id, "Deployed!").await
}
