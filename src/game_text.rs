// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cleanup of text coming from and going to the game server.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static ANSI_ESCAPE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("valid ANSI escape pattern"));
static FORMATTING_CODE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)§[0-9a-fk-orx]").expect("valid formatting code pattern"));
static PLUGIN_PLAYER_COUNT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(\d+) out of maximum (\d+)").expect("valid player count pattern"));
static VANILLA_PLAYER_COUNT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"There are (\d+) of a max(?:imum)? of (\d+) players online").expect("valid player count pattern"));

/// Strips terminal escapes and Minecraft formatting codes, and joins the lines of a response into one line
pub fn scrub(raw: &str) -> String {
	let without_escapes = ANSI_ESCAPE.replace_all(raw, "");
	let without_formatting = FORMATTING_CODE.replace_all(&without_escapes, "");
	without_formatting
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.collect::<Vec<_>>()
		.join(" ")
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlayerCount {
	pub online: u32,
	pub max: u32,
}

/// Finds the online player count in scrubbed `list` output
pub fn player_count(scrubbed: &str) -> Option<PlayerCount> {
	let captures = PLUGIN_PLAYER_COUNT
		.captures(scrubbed)
		.or_else(|| VANILLA_PLAYER_COUNT.captures(scrubbed))?;
	let online = captures.get(1)?.as_str().parse().ok()?;
	let max = captures.get(2)?.as_str().parse().ok()?;
	Some(PlayerCount { online, max })
}

/// The status header for the `/players` command
pub fn status_header(raw_list_output: &str) -> String {
	match player_count(&scrub(raw_list_output)) {
		Some(count) => format!("{} out of maximum {} players online.", count.online, count.max),
		None => String::from("Server Status"),
	}
}

#[derive(Serialize)]
struct TellrawComponent<'a> {
	text: &'a str,
	color: &'a str,
}

/// Builds a `tellraw` command that shows a Discord message to one player.
///
/// The JSON text components are serialized rather than formatted so that quotes and backslashes in names or messages
/// can't break out of the command.
pub fn tellraw_command(player: &str, sender: &str, message: &str) -> Result<String, serde_json::Error> {
	let components = (
		"",
		TellrawComponent {
			text: "[Discord] ",
			color: "gray",
		},
		TellrawComponent {
			text: sender,
			color: "gold",
		},
		TellrawComponent {
			text: ": ",
			color: "white",
		},
		TellrawComponent {
			text: message,
			color: "white",
		},
	);
	let json = serde_json::to_string(&components)?;
	Ok(format!("tellraw {} {}", player, json))
}

/// Whether a string is a plausible Minecraft player name to put in a command.
///
/// Bedrock players added through Floodgate carry a `.` prefix.
pub fn is_valid_player_name(name: &str) -> bool {
	let length = name.chars().count();
	(1..=32).contains(&length)
		&& name
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
