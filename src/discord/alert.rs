// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::GuildConfig;
use crate::watchdog::AlertSink;
use async_trait::async_trait;
use miette::IntoDiagnostic;
use std::sync::Arc;
use tokio::time::Duration;
use twilight_http::client::Client;
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, RoleMarker};

/// Pings staff in the admin alert channel when the game server stops responding
pub struct DiscordAlertSink {
	http_client: Arc<Client>,
	channel: Id<ChannelMarker>,
	staff_role: Id<RoleMarker>,
	check_interval: Duration,
}

impl DiscordAlertSink {
	pub fn new(http_client: Arc<Client>, guild: &GuildConfig, check_interval: Duration) -> Self {
		Self {
			http_client,
			channel: guild.admin_alert_channel,
			staff_role: guild.staff_role,
			check_interval,
		}
	}
}

fn alert_message(staff_role: Id<RoleMarker>, unreachable_for: Duration) -> String {
	let minutes = unreachable_for.as_secs() / 60;
	let unit = if minutes == 1 { "minute" } else { "minutes" };
	format!(
		"🚨 **EMERGENCY:** {} The server has been unreachable for {} {}!",
		staff_role.mention(),
		minutes,
		unit
	)
}

#[async_trait]
impl AlertSink for DiscordAlertSink {
	async fn send_alert(&self, consecutive_failures: u32) -> miette::Result<()> {
		let content = alert_message(self.staff_role, self.check_interval * consecutive_failures);
		let mut allowed_mentions = AllowedMentions::default();
		allowed_mentions.roles.push(self.staff_role);
		self.http_client
			.create_message(self.channel)
			.content(&content)
			.allowed_mentions(Some(&allowed_mentions))
			.await
			.into_diagnostic()?;
		Ok(())
	}
}
