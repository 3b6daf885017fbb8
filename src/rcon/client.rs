// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::RconError;
use super::packet::{MAX_COMMAND_LENGTH, Packet, PacketType};
use std::fmt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Request ID the server uses in its authentication response when the password was wrong
const AUTH_FAILED_REQUEST_ID: i32 = -1;

/// Where to reach a game server's remote console
#[derive(Clone)]
pub struct RconEndpoint {
	pub host: String,
	pub port: u16,
	pub password: String,
}

impl fmt::Debug for RconEndpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RconEndpoint")
			.field("host", &self.host)
			.field("port", &self.port)
			.finish_non_exhaustive()
	}
}

impl fmt::Display for RconEndpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.host, self.port)
	}
}

/// An authenticated remote console session
pub struct RconClient {
	stream: TcpStream,
	next_request_id: i32,
}

impl RconClient {
	/// Opens a connection to the endpoint and authenticates with its password
	pub async fn connect(endpoint: &RconEndpoint) -> Result<Self, RconError> {
		let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port)).await?;
		let mut client = Self {
			stream,
			next_request_id: 1,
		};
		client.authenticate(&endpoint.password).await?;
		Ok(client)
	}

	fn take_request_id(&mut self) -> i32 {
		let id = self.next_request_id;
		self.next_request_id = self.next_request_id.wrapping_add(1).max(1);
		id
	}

	async fn authenticate(&mut self, password: &str) -> Result<(), RconError> {
		let request_id = self.take_request_id();
		Packet::new(request_id, PacketType::Auth, password)
			.write_to(&mut self.stream)
			.await?;

		// Some servers send an empty response value ahead of the actual authentication response.
		for _ in 0..2 {
			let response = Packet::read_from(&mut self.stream).await?;
			if response.kind != PacketType::AuthResponse {
				continue;
			}
			if response.request_id == AUTH_FAILED_REQUEST_ID {
				return Err(RconError::AuthenticationFailed);
			}
			if response.request_id != request_id {
				return Err(RconError::Malformed(format!(
					"authentication response for request {} while waiting on {}",
					response.request_id, request_id
				)));
			}
			return Ok(());
		}

		Err(RconError::Malformed(String::from(
			"server never sent an authentication response",
		)))
	}

	/// Runs a command on the server and returns its response text
	pub async fn send_command(&mut self, command: &str) -> Result<String, RconError> {
		if command.len() > MAX_COMMAND_LENGTH {
			return Err(RconError::CommandTooLong(command.len()));
		}

		let request_id = self.take_request_id();
		Packet::new(request_id, PacketType::ExecCommand, command)
			.write_to(&mut self.stream)
			.await?;

		let response = Packet::read_from(&mut self.stream).await?;
		if response.kind != PacketType::ResponseValue || response.request_id != request_id {
			return Err(RconError::Malformed(format!(
				"unexpected {:?} packet for request {} while waiting on {}",
				response.kind, response.request_id, request_id
			)));
		}
		Ok(response.body)
	}

	pub async fn close(mut self) -> Result<(), RconError> {
		self.stream.shutdown().await?;
		Ok(())
	}
}

/// Connects, runs a single command, and disconnects
pub async fn run_command(endpoint: &RconEndpoint, command: &str) -> Result<String, RconError> {
	let mut client = RconClient::connect(endpoint).await?;
	let response = client.send_command(command).await?;
	if let Err(error) = client.close().await {
		tracing::debug!(source = ?error, "Failed to cleanly close remote console connection");
	}
	Ok(response)
}

#[cfg(test)]
mod tests {
	use super::*;
	use tokio::net::TcpListener;

	/// Serves one connection the way a Minecraft server does, answering `list` with a fixed player count
	async fn fake_server(password: &'static str) -> (RconEndpoint, tokio::task::JoinHandle<Vec<String>>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let port = listener.local_addr().unwrap().port();
		let handle = tokio::spawn(async move {
			let (mut stream, _) = listener.accept().await.unwrap();
			let mut received = Vec::new();

			let auth = read_client_packet(&mut stream).await;
			let auth_id = if auth.2 == password { auth.0 } else { AUTH_FAILED_REQUEST_ID };
			stream
				.write_all(&Packet::new(auth_id, PacketType::AuthResponse, "").encode())
				.await
				.unwrap();
			if auth_id == AUTH_FAILED_REQUEST_ID {
				return received;
			}

			let (command_id, kind, body) = read_client_packet(&mut stream).await;
			assert_eq!(kind, 2);
			received.push(body.clone());
			let reply = if body == "list" {
				"There are 2 of a max of 20 players online: Ada, Grace"
			} else {
				""
			};
			stream
				.write_all(&Packet::new(command_id, PacketType::ResponseValue, reply).encode())
				.await
				.unwrap();
			received
		});

		let endpoint = RconEndpoint {
			host: String::from("127.0.0.1"),
			port,
			password: String::from("hunter2"),
		};
		(endpoint, handle)
	}

	async fn read_client_packet(stream: &mut TcpStream) -> (i32, i32, String) {
		use tokio::io::AsyncReadExt;
		let length = stream.read_i32_le().await.unwrap() as usize;
		let mut payload = vec![0; length];
		stream.read_exact(&mut payload).await.unwrap();
		let id = i32::from_le_bytes(payload[0..4].try_into().unwrap());
		let kind = i32::from_le_bytes(payload[4..8].try_into().unwrap());
		let body = String::from_utf8(payload[8..length - 2].to_vec()).unwrap();
		(id, kind, body)
	}

	#[tokio::test]
	async fn runs_a_command_after_authenticating() {
		let (endpoint, server) = fake_server("hunter2").await;
		let response = run_command(&endpoint, "list").await.unwrap();
		assert_eq!(response, "There are 2 of a max of 20 players online: Ada, Grace");
		assert_eq!(server.await.unwrap(), vec![String::from("list")]);
	}

	#[tokio::test]
	async fn wrong_password_is_rejected() {
		let (endpoint, server) = fake_server("correct horse").await;
		let result = run_command(&endpoint, "list").await;
		assert!(matches!(result, Err(RconError::AuthenticationFailed)));
		assert!(server.await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn refuses_overlong_commands_before_sending() {
		let (endpoint, _server) = fake_server("hunter2").await;
		let mut client = RconClient::connect(&endpoint).await.unwrap();
		let command = "a".repeat(MAX_COMMAND_LENGTH + 1);
		let result = client.send_command(&command).await;
		assert!(matches!(result, Err(RconError::CommandTooLong(_))));
	}

	#[tokio::test]
	async fn connection_refused_is_an_io_error() {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let port = listener.local_addr().unwrap().port();
		drop(listener);
		let endpoint = RconEndpoint {
			host: String::from("127.0.0.1"),
			port,
			password: String::new(),
		};
		assert!(matches!(run_command(&endpoint, "list").await, Err(RconError::Io(_))));
	}

	#[test]
	fn debug_output_hides_password() {
		let endpoint = RconEndpoint {
			host: String::from("mc.example.org"),
			port: 27487,
			password: String::from("hunter2"),
		};
		assert!(!format!("{:?}", endpoint).contains("hunter2"));
		assert_eq!(endpoint.to_string(), "mc.example.org:27487");
	}
}
