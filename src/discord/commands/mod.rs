// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::connection::BotContext;
use miette::bail;
use twilight_model::application::command::Command;
use twilight_model::application::interaction::application_command::{CommandData, CommandOptionValue};
use twilight_model::gateway::payload::incoming::InteractionCreate;

mod msg;
mod players;
mod setup_requests;
mod setup_staff_apps;
mod whitelist;

pub fn command_definitions() -> Vec<Command> {
	vec![
		msg::command_definition(),
		players::command_definition(),
		setup_requests::command_definition(),
		setup_staff_apps::command_definition(),
		whitelist::command_definition(),
	]
}

pub async fn route_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	context: &BotContext,
) -> miette::Result<()> {
	match command_data.name.as_str() {
		"msg" => msg::handle_command(interaction, command_data, context).await,
		"players" => players::handle_command(interaction, context).await,
		"setup-requests" => setup_requests::handle_command(interaction, context).await,
		"setup-staff-apps" => setup_staff_apps::handle_command(interaction, context).await,
		"whitelist" => whitelist::handle_command(interaction, command_data, context).await,
		_ => bail!("Unknown command encountered: {}\n{:?}", command_data.name, command_data),
	}
}

/// Gets the value of a required string option
fn string_option<'a>(command_data: &'a CommandData, name: &str) -> miette::Result<&'a str> {
	let Some(option) = command_data.options.iter().find(|option| option.name == name) else {
		bail!("{} command received without required option {}", command_data.name, name);
	};
	let CommandOptionValue::String(value) = &option.value else {
		bail!("{} command argument {} wasn't a string", command_data.name, name);
	};
	Ok(value)
}
