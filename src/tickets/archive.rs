// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};

/// The most messages kept in a ticket archive; older history is dropped
pub const ARCHIVE_MESSAGE_LIMIT: usize = 200;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArchivedMessage {
	pub timestamp: DateTime<Utc>,
	pub author: String,
	pub text: String,
}

impl ArchivedMessage {
	/// Renders the message as a single archive line
	pub fn render(&self) -> String {
		let text = self.text.replace("\r\n", "\\n").replace('\n', "\\n");
		format!("[{}] {}: {}", self.timestamp.format("%Y-%m-%d %H:%M"), self.author, text)
	}
}

/// The history of a closed ticket channel
#[derive(Debug)]
pub struct ArchiveRecord {
	channel_name: String,
	closed_by: String,
	messages: Vec<ArchivedMessage>,
}

impl ArchiveRecord {
	/// Builds an archive from messages in any order, keeping only the most recent [ARCHIVE_MESSAGE_LIMIT] of them.
	pub fn new(channel_name: &str, closed_by: &str, mut messages: Vec<ArchivedMessage>) -> Self {
		messages.sort_by_key(|message| message.timestamp);
		if messages.len() > ARCHIVE_MESSAGE_LIMIT {
			messages.drain(..messages.len() - ARCHIVE_MESSAGE_LIMIT);
		}
		Self {
			channel_name: channel_name.to_string(),
			closed_by: closed_by.to_string(),
			messages,
		}
	}

	pub fn message_lines(&self) -> impl Iterator<Item = String> + '_ {
		self.messages.iter().map(ArchivedMessage::render)
	}

	pub fn render(&self) -> String {
		let mut log = format!("--- Log: {} ---\nClosed by: {}\n\n", self.channel_name, self.closed_by);
		for line in self.message_lines() {
			log.push_str(&line);
			log.push('\n');
		}
		log
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Duration, TimeZone};
	use regex::Regex;

	fn message_at(minute: i64, author: &str, text: &str) -> ArchivedMessage {
		let start = Utc.with_ymd_and_hms(2025, 3, 9, 14, 0, 0).unwrap();
		ArchivedMessage {
			timestamp: start + Duration::minutes(minute),
			author: author.to_string(),
			text: text.to_string(),
		}
	}

	#[test]
	fn renders_header_and_lines() {
		let messages = vec![message_at(5, "grace", "thanks!"), message_at(0, "ada", "hello")];
		let record = ArchiveRecord::new("support-ada", "grace", messages);
		assert_eq!(
			record.render(),
			"--- Log: support-ada ---\nClosed by: grace\n\n[2025-03-09 14:00] ada: hello\n[2025-03-09 14:05] grace: thanks!\n"
		);
	}

	#[test]
	fn keeps_only_the_most_recent_messages_oldest_first() {
		let messages: Vec<ArchivedMessage> = (0..250)
			.rev()
			.map(|minute| message_at(minute, "ada", &format!("message {}", minute)))
			.collect();
		let record = ArchiveRecord::new("support-ada", "ada", messages);
		let lines: Vec<String> = record.message_lines().collect();

		assert_eq!(lines.len(), ARCHIVE_MESSAGE_LIMIT);
		assert!(lines[0].ends_with("ada: message 50"));
		assert!(lines[199].ends_with("ada: message 249"));

		let line_format = Regex::new(r"^\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}\] [^:]+: .*$").unwrap();
		for line in &lines {
			assert!(line_format.is_match(line), "{line:?} doesn't match the archive format");
		}
	}

	#[test]
	fn multiline_messages_stay_on_one_line() {
		let record = ArchiveRecord::new("warp-ada", "ada", vec![message_at(0, "ada", "first\nsecond\r\nthird")]);
		let lines: Vec<String> = record.message_lines().collect();
		assert_eq!(lines, vec![String::from("[2025-03-09 14:00] ada: first\\nsecond\\nthird")]);
		assert_eq!(record.render().lines().count(), 4);
	}
}
