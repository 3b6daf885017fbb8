// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::RconError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the request ID and packet type fields plus the two trailing NUL bytes
const PACKET_OVERHEAD: usize = 10;

/// Largest packet (excluding the length prefix) a server may send us
pub const MAX_PACKET_LENGTH: usize = 4110;

/// Largest command body Minecraft servers will accept from a client
pub const MAX_COMMAND_LENGTH: usize = 1446;

/// The packet types used by the Source RCON protocol.
///
/// The protocol reuses the value 2 for both the command request and the authentication response; the direction of the
/// packet disambiguates them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PacketType {
	Auth,
	AuthResponse,
	ExecCommand,
	ResponseValue,
}

impl PacketType {
	fn to_wire(self) -> i32 {
		match self {
			Self::Auth => 3,
			Self::AuthResponse | Self::ExecCommand => 2,
			Self::ResponseValue => 0,
		}
	}

	/// Interprets a packet type received from the server
	fn from_server_wire(value: i32) -> Option<Self> {
		match value {
			2 => Some(Self::AuthResponse),
			0 => Some(Self::ResponseValue),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Packet {
	pub request_id: i32,
	pub kind: PacketType,
	pub body: String,
}

impl Packet {
	pub fn new(request_id: i32, kind: PacketType, body: impl Into<String>) -> Self {
		Self {
			request_id,
			kind,
			body: body.into(),
		}
	}

	/// Serializes the packet, including its length prefix
	pub fn encode(&self) -> Vec<u8> {
		let body = self.body.as_bytes();
		let length = (body.len() + PACKET_OVERHEAD) as i32;
		let mut buffer = Vec::with_capacity(body.len() + PACKET_OVERHEAD + 4);
		buffer.extend_from_slice(&length.to_le_bytes());
		buffer.extend_from_slice(&self.request_id.to_le_bytes());
		buffer.extend_from_slice(&self.kind.to_wire().to_le_bytes());
		buffer.extend_from_slice(body);
		buffer.extend_from_slice(&[0, 0]);
		buffer
	}

	/// Parses a packet body (everything after the length prefix) sent by the server
	pub fn decode(payload: &[u8]) -> Result<Self, RconError> {
		if payload.len() < PACKET_OVERHEAD {
			return Err(RconError::Malformed(format!(
				"packet of {} bytes is shorter than the {} byte minimum",
				payload.len(),
				PACKET_OVERHEAD
			)));
		}
		let request_id = i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
		let raw_kind = i32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);
		let Some(kind) = PacketType::from_server_wire(raw_kind) else {
			return Err(RconError::Malformed(format!("unknown packet type {}", raw_kind)));
		};

		let body = &payload[8..];
		let Some(body) = body.strip_suffix(&[0u8, 0]) else {
			return Err(RconError::Malformed(String::from("packet is missing its NUL terminators")));
		};
		let body = String::from_utf8_lossy(body).into_owned();

		Ok(Self { request_id, kind, body })
	}

	pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> Result<(), RconError> {
		writer.write_all(&self.encode()).await?;
		writer.flush().await?;
		Ok(())
	}

	pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Self, RconError> {
		let length = reader.read_i32_le().await?;
		let length = match usize::try_from(length) {
			Ok(length) if (PACKET_OVERHEAD..=MAX_PACKET_LENGTH).contains(&length) => length,
			_ => return Err(RconError::Malformed(format!("invalid packet length {}", length))),
		};
		let mut payload = vec![0; length];
		reader.read_exact(&mut payload).await?;
		Self::decode(&payload)
	}
}
