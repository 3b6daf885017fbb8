// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::RoleMarker;
use twilight_model::user::User;

const CDN_BASE: &str = "https://cdn.discordapp.com";

/// The name a user is shown with in a guild: their nickname, falling back to their global display name and then their
/// username.
pub fn display_name(nick: Option<&str>, user: &User) -> String {
	nick.or(user.global_name.as_deref())
		.unwrap_or(&user.name)
		.to_string()
}

/// URL of the user's avatar, or of the default avatar Discord shows if they haven't set one
pub fn avatar_url(user: &User) -> String {
	match &user.avatar {
		Some(hash) => {
			let extension = if hash.is_animated() { "gif" } else { "png" };
			format!("{}/avatars/{}/{}.{}", CDN_BASE, user.id, hash, extension)
		}
		None => {
			let index = (user.id.get() >> 22) % 6;
			format!("{}/embed/avatars/{}.png", CDN_BASE, index)
		}
	}
}

/// Gets the user who triggered an interaction, whether it happened in a guild or not
pub fn interaction_user(interaction: &InteractionCreate) -> Option<&User> {
	interaction
		.member
		.as_ref()
		.and_then(|member| member.user.as_ref())
		.or(interaction.user.as_ref())
}

/// The display name of the user who triggered an interaction
pub fn interaction_display_name(interaction: &InteractionCreate) -> Option<String> {
	let user = interaction_user(interaction)?;
	let nick = interaction.member.as_ref().and_then(|member| member.nick.as_deref());
	Some(display_name(nick, user))
}

/// Whether the member who triggered an interaction holds the given role
pub fn has_role(interaction: &InteractionCreate, role: Id<RoleMarker>) -> bool {
	interaction
		.member
		.as_ref()
		.is_some_and(|member| member.roles.contains(&role))
}
