// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Garmin MCP Server
//!
//! A Model Context Protocol (MCP) server that exposes Garmin Connect running
//! data to AI assistants and lets them author structured running workouts.
//!
//! ## Features
//!
//! - **Workout compiler**: nested warmup/interval/repeat step trees become the
//!   flat step list Garmin's workout service accepts, with validation errors
//!   that point at the offending step
//! - **Response normalizer**: personal data is stripped from every response,
//!   speeds are shown as `m:ss` paces and list/detail activity shapes are
//!   reconciled to one field set
//! - **MCP over stdio**: JSON-RPC 2.0, one message per line
//!
//! ## Quick Start
//!
//! 1. Log in to Garmin Connect once so `~/.garminconnect/oauth2_token.json`
//!    exists (or set `GARMIN_ACCESS_TOKEN`)
//! 2. Register `garmin-mcp-server` as a stdio MCP server in your client
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use garmin_mcp_server::config::Config;
//! use garmin_mcp_server::mcp::McpServer;
//! use garmin_mcp_server::providers::GarminConnectClient;
//! use garmin_mcp_server::tools::ToolContext;
//! use garmin_mcp_server::workout::WorkoutCompiler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let client = GarminConnectClient::from_config(&config.garmin)?;
//!     let compiler = WorkoutCompiler::new(config.workout.compiler_options()?);
//!
//!     McpServer::new(ToolContext::new(Arc::new(client), compiler))
//!         .run_stdio()
//!         .await
//! }
//! ```

/// Pace and speed units
pub mod units;

/// Workout step trees and their compilation to Garmin payloads
pub mod workout;

/// Sanitization, unit conversion and schema reconciliation of Garmin responses
pub mod normalize;

/// Garmin Connect API client and credentials
pub mod providers;

/// MCP tool implementations
pub mod tools;

/// Model Context Protocol server implementation
pub mod mcp;

/// Configuration management and persistence
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Structured logging to stderr
pub mod logging;
