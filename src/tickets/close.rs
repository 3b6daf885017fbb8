// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{ARCHIVE_MESSAGE_LIMIT, ArchiveRecord, ArchivedMessage, ChannelRef, PlatformError, TicketError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::time::{Duration, sleep};
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

/// The Discord operations closing a ticket needs, scoped to the interaction that closed it
#[async_trait]
pub trait ArchivePlatform: Send + Sync {
	/// Tells the channel the ticket is being closed
	async fn acknowledge_close(&self) -> Result<(), PlatformError>;

	/// Gets up to `limit` of the channel's most recent messages
	async fn recent_messages(
		&self,
		channel: Id<ChannelMarker>,
		limit: usize,
	) -> Result<Vec<ArchivedMessage>, PlatformError>;

	async fn upload_archive(
		&self,
		log_channel: Id<ChannelMarker>,
		ticket_channel: &ChannelRef,
		file_name: &str,
		contents: Vec<u8>,
	) -> Result<(), PlatformError>;

	async fn delete_channel(&self, channel: Id<ChannelMarker>) -> Result<(), PlatformError>;
}

#[derive(Clone, Debug)]
pub struct CloseSettings {
	/// Where archives are uploaded; archives aren't kept anywhere if this isn't set
	pub log_channel: Option<Id<ChannelMarker>>,
	/// Directory for the archive file while it's uploaded
	pub archive_dir: PathBuf,
	/// How long to leave the channel up after acknowledging the close
	pub grace_period: Duration,
}

/// A local archive file. It's removed by [TempArchive::remove], or when dropped if the close stops before that.
struct TempArchive {
	path: PathBuf,
	removed: bool,
}

impl TempArchive {
	fn for_channel(archive_dir: &Path, channel_id: Id<ChannelMarker>) -> Self {
		let path = archive_dir.join(format!("log_{}.txt", channel_id));
		Self { path, removed: false }
	}

	async fn write(&self, contents: &str) -> std::io::Result<()> {
		tokio::fs::write(&self.path, contents).await
	}

	async fn remove(mut self) {
		match tokio::fs::remove_file(&self.path).await {
			Ok(()) => (),
			Err(error) if error.kind() == ErrorKind::NotFound => (),
			Err(error) => {
				tracing::warn!(source = ?error, path = %self.path.display(), "Failed to remove ticket archive file")
			}
		}
		self.removed = true;
	}
}

impl Drop for TempArchive {
	fn drop(&mut self) {
		if self.removed {
			return;
		}
		// Blocks the runtime thread, but only on early returns and cancellation
		match std::fs::remove_file(&self.path) {
			Ok(()) => (),
			Err(error) if error.kind() == ErrorKind::NotFound => (),
			Err(error) => {
				tracing::warn!(source = ?error, path = %self.path.display(), "Failed to remove ticket archive file")
			}
		}
	}
}

/// Archives a ticket channel's history to the log channel and deletes the ticket channel
pub async fn close_ticket<P: ArchivePlatform + ?Sized>(
	platform: &P,
	channel: &ChannelRef,
	closed_by: &str,
	settings: &CloseSettings,
) -> Result<(), TicketError> {
	platform.acknowledge_close().await?;

	let messages = platform.recent_messages(channel.id, ARCHIVE_MESSAGE_LIMIT).await?;
	let record = ArchiveRecord::new(&channel.name, closed_by, messages);

	let archive = TempArchive::for_channel(&settings.archive_dir, channel.id);
	archive.write(&record.render()).await.map_err(TicketError::Archive)?;

	match settings.log_channel {
		Some(log_channel) => upload(platform, log_channel, channel, &archive).await,
		None => tracing::debug!(channel = %channel.id, "No log channel configured; ticket archive discarded"),
	}
	archive.remove().await;

	sleep(settings.grace_period).await;

	if let Err(error) = platform.delete_channel(channel.id).await {
		tracing::warn!(source = ?error, channel = %channel.id, "Failed to delete closed ticket channel");
	} else {
		tracing::info!(channel = %channel.id, closed_by, "Closed ticket");
	}

	Ok(())
}

async fn upload<P: ArchivePlatform + ?Sized>(
	platform: &P,
	log_channel: Id<ChannelMarker>,
	channel: &ChannelRef,
	archive: &TempArchive,
) {
	let contents = match tokio::fs::read(&archive.path).await {
		Ok(contents) => contents,
		Err(error) => {
			tracing::warn!(source = ?error, channel = %channel.id, "Failed to read back ticket archive");
			return;
		}
	};
	let file_name = format!("{}.txt", channel.name);
	if let Err(error) = platform.upload_archive(log_channel, channel, &file_name, contents).await {
		tracing::warn!(source = ?error, channel = %channel.id, "Failed to upload ticket archive");
	}
}
