// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client for the Source RCON remote console protocol spoken by Minecraft servers.

use miette::Diagnostic;
use thiserror::Error;

mod client;
mod packet;

pub use client::{RconClient, RconEndpoint, run_command};
pub use packet::MAX_COMMAND_LENGTH;

#[derive(Debug, Diagnostic, Error)]
pub enum RconError {
	#[error("remote console connection failed: {0}")]
	#[diagnostic(code(hivekeeper::rcon::io))]
	Io(#[from] std::io::Error),
	#[error("the remote console rejected the configured password")]
	#[diagnostic(code(hivekeeper::rcon::auth), help("check the RCON password in the configuration"))]
	AuthenticationFailed,
	#[error("the remote console sent a malformed response: {0}")]
	#[diagnostic(code(hivekeeper::rcon::protocol))]
	Malformed(String),
	#[error("command is {0} bytes long, which is more than the server accepts")]
	#[diagnostic(code(hivekeeper::rcon::command_too_long))]
	CommandTooLong(usize),
}
