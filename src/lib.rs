//! Terminal client for a travel planning backend.
//!
//! The core is [`stream::StreamEventReader`], which turns the backend's
//! chunked event streams into ordered events. Around it sit the HTTP clients
//! for the travel chat ([`client`]) and the admin panel ([`admin`]), and the
//! page-session model ([`session`]).

pub mod client;
pub mod config;
pub mod error;
pub mod paths;
pub mod render;
pub mod session;
pub mod stream;
pub mod trip;

#[cfg(feature = "admin")]
pub mod admin;

pub use client::{AgentType, Endpoint, EventStream, GuideRequest, TravelClient};
pub use error::StreamError;
pub use session::{ChatMessage, TravelSession};
pub use stream::{FinalResult, Framing, StreamEvent, StreamEventReader};
