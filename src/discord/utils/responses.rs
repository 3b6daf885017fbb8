// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::IntoDiagnostic;
use twilight_http::client::Client;
use twilight_model::channel::message::MessageFlags;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::InteractionResponseDataBuilder;

pub const STAFF_ONLY: &str = "❌ This command is only available to staff.";
pub const NOT_IN_GUILD: &str = "This can only be used in a server.";

/// Responds to the interaction with a message only the user who triggered it can see
pub async fn respond_ephemeral(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	content: &str,
) -> miette::Result<()> {
	let response = InteractionResponseDataBuilder::new()
		.content(content)
		.flags(MessageFlags::EPHEMERAL)
		.build();
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(response),
	};
	http_client
		.interaction(application_id)
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Acknowledges the interaction so that the reply can be sent later as a followup
pub async fn defer(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	ephemeral: bool,
) -> miette::Result<()> {
	let mut response = InteractionResponseDataBuilder::new();
	if ephemeral {
		response = response.flags(MessageFlags::EPHEMERAL);
	}
	let response = InteractionResponse {
		kind: InteractionResponseType::DeferredChannelMessageWithSource,
		data: Some(response.build()),
	};
	http_client
		.interaction(application_id)
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Sends a text followup to a deferred interaction
pub async fn follow_up(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	content: &str,
	ephemeral: bool,
) -> miette::Result<()> {
	let interaction_client = http_client.interaction(application_id);
	let mut followup = interaction_client.create_followup(&interaction.token).content(content);
	if ephemeral {
		followup = followup.flags(MessageFlags::EPHEMERAL);
	}
	followup.await.into_diagnostic()?;
	Ok(())
}
