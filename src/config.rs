// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::rcon::RconEndpoint;
use kdl::{KdlDocument, KdlEntry, KdlError, KdlNode, KdlValue};
use miette::Diagnostic;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs::read_to_string;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, RoleMarker};

const DEFAULT_RCON_PORT: u16 = 27487;
const DEFAULT_COMMUNITY_NAME: &str = "Honey Blossom SMP";

#[derive(Debug, Diagnostic, Error)]
pub enum ConfigError {
	#[error("failed to read the configuration file {path}")]
	#[diagnostic(code(hivekeeper::config::read))]
	Read {
		path: String,
		#[source]
		source: std::io::Error,
	},
	#[error(transparent)]
	#[diagnostic(transparent)]
	Parse(#[from] KdlError),
	#[error("missing required configuration value `{0}`")]
	#[diagnostic(code(hivekeeper::config::missing))]
	Missing(String),
	#[error("invalid configuration value `{key}`: {reason}")]
	#[diagnostic(code(hivekeeper::config::invalid))]
	Invalid { key: String, reason: String },
}

pub async fn parse_config(config_path: &str) -> Result<ConfigData, ConfigError> {
	let config_file_contents = read_to_string(config_path).await.map_err(|source| ConfigError::Read {
		path: config_path.to_string(),
		source,
	})?;
	ConfigData::from_kdl(&config_file_contents, |name| std::env::var(name).ok())
}

#[derive(Debug)]
pub struct ConfigData {
	pub discord: DiscordConfig,
	pub rcon: RconEndpoint,
	pub guild: GuildConfig,
	/// Directory in which ticket archives are written before they're uploaded
	pub archive_dir: PathBuf,
}

pub struct DiscordConfig {
	pub bot_token: String,
	/// Name of the community shown in welcome and status messages
	pub community_name: String,
}

impl fmt::Debug for DiscordConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DiscordConfig")
			.field("community_name", &self.community_name)
			.finish_non_exhaustive()
	}
}

/// The roles and channels of the server the bot runs in
#[derive(Clone, Debug)]
pub struct GuildConfig {
	pub staff_role: Id<RoleMarker>,
	/// Category under which ticket channels are created
	pub ticket_category: Id<ChannelMarker>,
	/// Channel to which closed ticket archives are uploaded
	pub log_channel: Option<Id<ChannelMarker>>,
	pub welcome_channel: Id<ChannelMarker>,
	pub rules_channel: Id<ChannelMarker>,
	pub support_request_channel: Id<ChannelMarker>,
	pub verification_channel: Id<ChannelMarker>,
	/// Channel in which staff are alerted when the game server is down
	pub admin_alert_channel: Id<ChannelMarker>,
}

impl ConfigData {
	/// Reads the configuration from a KDL document. Secrets may instead be provided by the environment through `env`,
	/// which takes precedence over the document.
	pub fn from_kdl(contents: &str, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let document: KdlDocument = contents.parse()?;
		let values = ConfigValues {
			document: &document,
			env: &env,
		};

		let discord = DiscordConfig {
			bot_token: values.string("discord", "token", &["DISCORD_TOKEN"])?,
			community_name: values
				.optional_string("discord", "community_name", &[])?
				.unwrap_or_else(|| String::from(DEFAULT_COMMUNITY_NAME)),
		};

		let rcon = RconEndpoint {
			host: values.string("rcon", "host", &["RCON_HOST", "MC_IP"])?,
			port: values.port("rcon", "port", "RCON_PORT")?,
			password: values.string("rcon", "password", &["RCON_PASS"])?,
		};

		let guild = GuildConfig {
			staff_role: values.id("guild", "staff_role")?,
			ticket_category: values.id("guild", "ticket_category")?,
			log_channel: values.optional_id("guild", "log_channel")?,
			welcome_channel: values.id("guild", "welcome_channel")?,
			rules_channel: values.id("guild", "rules_channel")?,
			support_request_channel: values.id("guild", "support_request_channel")?,
			verification_channel: values.id("guild", "verification_channel")?,
			admin_alert_channel: values.id("guild", "admin_alert_channel")?,
		};

		let archive_dir = document
			.get("archive_dir")
			.and_then(first_argument)
			.map(|value| match value.as_string() {
				Some(path) => Ok(PathBuf::from(path)),
				None => Err(invalid("archive_dir", "expected a path string")),
			})
			.transpose()?
			.unwrap_or_else(|| PathBuf::from("."));

		Ok(Self {
			discord,
			rcon,
			guild,
			archive_dir,
		})
	}
}

fn first_argument(node: &KdlNode) -> Option<&KdlValue> {
	node.entries()
		.iter()
		.find(|entry| entry.name().is_none())
		.map(KdlEntry::value)
}

fn invalid(key: &str, reason: &str) -> ConfigError {
	ConfigError::Invalid {
		key: key.to_string(),
		reason: reason.to_string(),
	}
}

struct ConfigValues<'a, E> {
	document: &'a KdlDocument,
	env: &'a E,
}

impl<E: Fn(&str) -> Option<String>> ConfigValues<'_, E> {
	fn value(&self, section: &str, key: &str) -> Option<&KdlValue> {
		self.document
			.get(section)
			.and_then(KdlNode::children)
			.and_then(|children| children.get(key))
			.and_then(first_argument)
	}

	/// The first of `env_vars` that is set. Later names are older aliases.
	fn env_value(&self, env_vars: &[&str]) -> Option<String> {
		env_vars.iter().find_map(|name| (self.env)(name))
	}

	fn optional_string(&self, section: &str, key: &str, env_vars: &[&str]) -> Result<Option<String>, ConfigError> {
		if let Some(value) = self.env_value(env_vars) {
			return Ok(Some(value));
		}
		match self.value(section, key) {
			Some(value) => match value.as_string() {
				Some(value) => Ok(Some(value.to_string())),
				None => Err(invalid(&format!("{}.{}", section, key), "expected a string")),
			},
			None => Ok(None),
		}
	}

	fn string(&self, section: &str, key: &str, env_vars: &[&str]) -> Result<String, ConfigError> {
		self.optional_string(section, key, env_vars)?
			.ok_or_else(|| ConfigError::Missing(format!("{}.{}", section, key)))
	}

	fn port(&self, section: &str, key: &str, env_var: &str) -> Result<u16, ConfigError> {
		let full_key = format!("{}.{}", section, key);
		if let Some(port) = (self.env)(env_var) {
			return port
				.trim()
				.parse()
				.map_err(|_| invalid(env_var, "expected a port number"));
		}
		match self.value(section, key) {
			Some(value) => value
				.as_integer()
				.and_then(|port| u16::try_from(port).ok())
				.ok_or_else(|| invalid(&full_key, "expected a port number")),
			None => Ok(DEFAULT_RCON_PORT),
		}
	}

	fn optional_id<T>(&self, section: &str, key: &str) -> Result<Option<Id<T>>, ConfigError> {
		let Some(value) = self.value(section, key) else {
			return Ok(None);
		};
		let id = value
			.as_integer()
			.and_then(|id| u64::try_from(id).ok())
			.and_then(Id::new_checked)
			.ok_or_else(|| invalid(&format!("{}.{}", section, key), "expected a Discord ID"))?;
		Ok(Some(id))
	}

	fn id<T>(&self, section: &str, key: &str) -> Result<Id<T>, ConfigError> {
		self.optional_id(section, key)?
			.ok_or_else(|| ConfigError::Missing(format!("{}.{}", section, key)))
	}
}
