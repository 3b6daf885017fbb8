// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::connection::BotContext;
use super::controls::ControlAction;
use miette::bail;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::application::interaction::modal::ModalInteractionData;
use twilight_model::gateway::payload::incoming::InteractionCreate;

mod close_ticket;
mod request_form;

pub async fn route_interaction(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	context: &BotContext,
) -> miette::Result<()> {
	match context.controls.action(&interaction_data.custom_id) {
		Some(ControlAction::OpenForm(category)) => request_form::show_form(interaction, category, context).await,
		Some(ControlAction::CloseTicket) => close_ticket::close(interaction, context).await,
		None => bail!("Unknown component interaction: {}", interaction_data.custom_id),
	}
}

pub async fn route_modal_submit(
	interaction: &InteractionCreate,
	modal_data: &ModalInteractionData,
	context: &BotContext,
) -> miette::Result<()> {
	let custom_id_path: Vec<&str> = modal_data.custom_id.split('/').collect();

	match custom_id_path.first().copied() {
		Some(request_form::FORM_ID_PREFIX) => {
			request_form::handle_submission(interaction, modal_data, &custom_id_path, context).await
		}
		_ => bail!("Unknown modal submitted: {}", modal_data.custom_id),
	}
}
