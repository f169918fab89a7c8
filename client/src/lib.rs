//! # Connect-Four Client Library
//!
//! Client-side protocol implementation for the online Connect-Four server.
//! It covers the connection to the server, the session state machine that
//! tracks a player from lobby to finished game, and the projection of that
//! state into the one screen a front end should show.
//!
//! ## Architecture Overview
//!
//! The server owns the game. This client never applies a rule of its own:
//! it sends what the player wants to do, and it replaces its picture of the
//! world with whatever the server reports. That keeps the client a pure
//! protocol endpoint with three layers:
//!
//! ### Transport
//! One WebSocket per logged-in name, carried in the connect URL. Frames are
//! JSON envelopes of `{type, payload, timestamp}`. A malformed frame is
//! dropped with a log line and the stream keeps going; a dead socket stays
//! dead until the player logs in again.
//!
//! ### Session state machine
//! A closed set of states (idle, resume prompt, queued, active, finished)
//! with every server frame and user intent funneled through one reducer.
//! All timing lives in data (the error auto-clear is a stored deadline), so
//! the reducer is deterministic and fully testable without a server.
//!
//! ### View projection
//! A pure function from session to screen. Since the session is an enum,
//! exactly one screen can exist per state and no precedence rules are
//! needed.
//!
//! ## Module Organization
//!
//! - [`network`]: the WebSocket connection, frame decode, liveness signal
//! - [`session`]: the state machine and transient-error lifecycle
//! - [`view`]: the session-to-screen projection
//! - [`input`]: terminal command parsing for the bundled driver
//!
//! ## Usage Example
//!
//! ```no_run
//! use client::network::Connection;
//! use client::session::{ClientSession, Intent};
//! use client::view;
//! use std::time::Instant;
//!
//! # async fn run() {
//! let mut connection = Connection::new("ws://127.0.0.1:8080/ws");
//! let mut session = ClientSession::new();
//!
//! connection.connect("alice").await.unwrap();
//! session.assign_identity("alice");
//!
//! if let Some(frame) = session.handle_intent(Intent::JoinQueue) {
//!     connection.send(frame).await;
//! }
//!
//! while let Some(envelope) = connection.next_frame().await {
//!     session.handle_frame(envelope.frame, Instant::now());
//!     println!("{:?}", view::project(&session));
//! }
//! # }
//! ```

pub mod input;
pub mod network;
pub mod session;
pub mod view;
