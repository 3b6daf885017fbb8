// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::commands::{command_definitions, route_command};
use super::controls::ControlRegistry;
use super::events::member_join::welcome_member;
use super::interactions::{route_interaction, route_modal_submit};
use crate::config::ConfigData;
use crate::tickets::InFlightGate;
use miette::IntoDiagnostic;
use std::sync::Arc;
use tokio::sync::watch;
use twilight_cache_inmemory::{DefaultInMemoryCache, ResourceType};
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt};
use twilight_http::client::Client;
use twilight_model::application::interaction::InteractionData;
use twilight_model::gateway::event::Event;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, UserMarker};

/// Everything event handlers share for the lifetime of the bot
pub struct BotContext {
	pub http_client: Arc<Client>,
	pub cache: DefaultInMemoryCache,
	pub config: Arc<ConfigData>,
	pub application_id: Id<ApplicationMarker>,
	pub bot_user_id: Id<UserMarker>,
	pub controls: ControlRegistry,
	/// Ticket requests currently being provisioned
	pub ticket_gate: InFlightGate,
}

pub fn set_up_client(config: &ConfigData) -> Arc<Client> {
	Arc::new(Client::new(config.discord.bot_token.clone()))
}

/// Connects to the gateway and handles events until the connection ends. `ready` is set once the gateway reports the
/// bot is ready.
pub async fn run_bot(
	config: Arc<ConfigData>,
	http_client: Arc<Client>,
	ready: watch::Sender<bool>,
) -> miette::Result<()> {
	let intents = Intents::GUILDS | Intents::GUILD_MEMBERS | Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT;

	let mut shard = Shard::new(ShardId::ONE, config.discord.bot_token.clone(), intents);

	let cache = DefaultInMemoryCache::builder()
		.resource_types(ResourceType::CHANNEL | ResourceType::ROLE | ResourceType::GUILD)
		.build();

	let application_id = {
		let application_response = http_client.current_user_application().await.into_diagnostic()?;
		application_response.model().await.into_diagnostic()?.id
	};
	let bot_user_id = {
		let user_response = http_client.current_user().await.into_diagnostic()?;
		user_response.model().await.into_diagnostic()?.id
	};

	{
		let interaction_client = http_client.interaction(application_id);
		let commands = command_definitions();
		interaction_client
			.set_global_commands(&commands)
			.await
			.into_diagnostic()?;
		tracing::info!(count = commands.len(), "Registered slash commands");
	}

	let context = Arc::new(BotContext {
		http_client,
		cache,
		config,
		application_id,
		bot_user_id,
		controls: ControlRegistry::new(),
		ticket_gate: InFlightGate::default(),
	});
	let ready = Arc::new(ready);

	while let Some(event) = shard.next_event(EventTypeFlags::all()).await {
		let event = match event {
			Ok(event) => event,
			Err(error) => {
				tracing::warn!(source = ?error, "error receiving event");
				continue;
			}
		};
		context.cache.update(&event);

		tokio::spawn(handle_event(event, Arc::clone(&context), Arc::clone(&ready)));
	}

	Ok(())
}

async fn handle_event(event: Event, context: Arc<BotContext>, ready: Arc<watch::Sender<bool>>) {
	let event_result = handle_event_route(event, &context, &ready).await;
	if let Err(error) = event_result {
		tracing::error!(source = ?error, "An error occurred handling a gateway event");
	}
}

async fn handle_event_route(event: Event, context: &Arc<BotContext>, ready: &watch::Sender<bool>) -> miette::Result<()> {
	tracing::debug!("Incoming gateway message: {:?}", event.kind());
	match event {
		Event::InteractionCreate(interaction) => match &interaction.data {
			Some(InteractionData::ApplicationCommand(command_data)) => {
				route_command(&interaction, command_data, context).await?;
			}
			Some(InteractionData::MessageComponent(interaction_data)) => {
				route_interaction(&interaction, interaction_data, context).await?;
			}
			Some(InteractionData::ModalSubmit(modal_data)) => route_modal_submit(&interaction, modal_data, context).await?,
			_ => (),
		},
		Event::MemberAdd(member_add) => welcome_member(&member_add, context).await,
		Event::Ready(_) => {
			tracing::info!("Discord gateway is ready");
			ready.send_replace(true);
		}
		_ => (),
	}
	Ok(())
}
