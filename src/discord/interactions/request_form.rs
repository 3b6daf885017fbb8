// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::connection::BotContext;
use crate::discord::platform::DiscordTicketPlatform;
use crate::discord::utils::responses::{NOT_IN_GUILD, respond_ephemeral};
use crate::discord::utils::users::interaction_user;
use crate::tickets::{TicketCategory, TicketError, TicketRequest, create_ticket};
use miette::{IntoDiagnostic, bail};
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::channel::message::component::{ActionRow, Component, TextInput, TextInputStyle};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_util::builder::InteractionResponseDataBuilder;

pub const FORM_ID_PREFIX: &str = "ticket_form";

fn form_components(category: TicketCategory) -> Vec<Component> {
	category
		.form_fields()
		.iter()
		.map(|field| {
			let style = if field.long_answer {
				TextInputStyle::Paragraph
			} else {
				TextInputStyle::Short
			};
			let input = Component::TextInput(TextInput {
				custom_id: String::from(field.id),
				label: String::from(field.label),
				max_length: None,
				min_length: None,
				placeholder: field.placeholder.map(String::from),
				required: Some(true),
				style,
				value: None,
			});
			Component::ActionRow(ActionRow {
				components: vec![input],
			})
		})
		.collect()
}

/// Pairs each of the category's form fields with the answer submitted for it, in form order
fn form_answers<'a>(
	category: TicketCategory,
	submitted: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> Vec<(String, String)> {
	let submitted: Vec<(&str, Option<&str>)> = submitted.into_iter().collect();
	category
		.form_fields()
		.iter()
		.map(|field| {
			let answer = submitted
				.iter()
				.find(|(custom_id, _)| *custom_id == field.id)
				.and_then(|(_, value)| *value)
				.unwrap_or_default();
			(String::from(field.summary_label), answer.to_string())
		})
		.collect()
}

pub async fn show_form(
	interaction: &InteractionCreate,
	category: TicketCategory,
	context: &BotContext,
) -> miette::Result<()> {
	let modal_id = format!("{}/{}", FORM_ID_PREFIX, category.channel_prefix());
	let response = InteractionResponseDataBuilder::new()
		.custom_id(modal_id)
		.title(category.form_title())
		.components(form_components(category))
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::Modal,
		data: Some(response),
	};
	context
		.http_client
		.interaction(context.application_id)
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;

	Ok(())
}

pub async fn handle_submission(
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	custom_id_path: &[&str],
	context: &BotContext,
) -> miette::Result<()> {
	let Some(category) = custom_id_path
		.get(1)
		.and_then(|prefix| TicketCategory::from_channel_prefix(prefix))
	else {
		bail!("Invalid custom ID for a ticket request form (parts: {:?})", custom_id_path);
	};
	let Some(guild_id) = interaction.guild_id else {
		return respond_ephemeral(interaction, &context.http_client, context.application_id, NOT_IN_GUILD).await;
	};
	let Some(user) = interaction_user(interaction) else {
		bail!("Ticket request form submitted without a user");
	};

	let submitted = modal_data
		.components
		.iter()
		.flat_map(|row| row.components.iter())
		.map(|component| (component.custom_id.as_str(), component.value.as_deref()));
	let request = TicketRequest {
		guild_id,
		requester_id: user.id,
		requester_name: user.name.clone(),
		category,
		fields: form_answers(category, submitted),
	};

	let platform = DiscordTicketPlatform::new(context, interaction, guild_id);
	match create_ticket(&platform, &context.ticket_gate, request).await {
		Ok(_) | Err(TicketError::AlreadyInProgress) => Ok(()),
		Err(error) => Err(error.into()),
	}
}
