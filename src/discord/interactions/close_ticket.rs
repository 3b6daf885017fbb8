// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::connection::BotContext;
use crate::discord::platform::DiscordArchivePlatform;
use crate::discord::utils::responses::follow_up;
use crate::discord::utils::users::interaction_user;
use crate::tickets::{ChannelRef, CloseSettings, TicketError, close_ticket};
use miette::{IntoDiagnostic, bail};
use tokio::time::Duration;
use twilight_model::gateway::payload::incoming::InteractionCreate;

/// How long a closed ticket stays up so its members can see it's being closed
const CLOSE_GRACE_PERIOD: Duration = Duration::from_secs(5);

pub async fn close(interaction: &InteractionCreate, context: &BotContext) -> miette::Result<()> {
	let Some(channel) = &interaction.channel else {
		bail!("Close ticket button used outside of a channel");
	};
	let Some(user) = interaction_user(interaction) else {
		bail!("Close ticket button used without a user");
	};

	let channel_name = match &channel.name {
		Some(name) => name.clone(),
		None => {
			let channel = context
				.http_client
				.channel(channel.id)
				.await
				.into_diagnostic()?
				.model()
				.await
				.into_diagnostic()?;
			channel.name.unwrap_or_else(|| channel.id.to_string())
		}
	};
	let ticket_channel = ChannelRef {
		id: channel.id,
		name: channel_name,
	};
	let settings = CloseSettings {
		log_channel: context.config.guild.log_channel,
		archive_dir: context.config.archive_dir.clone(),
		grace_period: CLOSE_GRACE_PERIOD,
	};

	let platform = DiscordArchivePlatform::new(context, interaction);
	if let Err(error) = close_ticket(&platform, &ticket_channel, &user.name, &settings).await {
		if matches!(error, TicketError::Archive(_)) {
			let notice = follow_up(
				interaction,
				&context.http_client,
				context.application_id,
				error.user_message(),
				false,
			)
			.await;
			if let Err(notice_error) = notice {
				tracing::warn!(source = ?notice_error, "Failed to report a failed ticket close");
			}
		}
		return Err(error.into());
	}

	Ok(())
}
