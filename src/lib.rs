//! Typed Rust client for the Clockwork SMS XML API.
//!
//! The crate is split into a domain layer of strong types, a transport layer for the
//! XML wire format and its quirks, and a small client layer orchestrating requests.
//!
//! ```rust,no_run
//! use clockwork_sms::{ApiKey, ClockworkClient, Message, MessageText, Msisdn, SendBatch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), clockwork_sms::ClockworkError> {
//!     let client = ClockworkClient::new(ApiKey::new("...")?);
//!     let message = Message::new(Msisdn::new("447777111222")?, MessageText::new("hello")?);
//!     let result = client.send(SendBatch::one(message)).await?;
//!     for entry in &result {
//!         println!("{}: {:?}", entry.message.to().raw(), entry.message_id);
//!     }
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    ClockworkClient, ClockworkClientBuilder, ClockworkError, TracingXmlLogger, XmlLogger,
};
pub use domain::{
    ApiError, ApiKey, Balance, BatchResult, ClientId, InvalidCharAction, Message, MessageText,
    Msisdn, PhoneNumber, SendBatch, SendOptions, SendResult, SenderId, ValidationError,
};
