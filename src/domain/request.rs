use std::str::FromStr;

use crate::domain::validation::ValidationError;
use crate::domain::value::{ClientId, MessageText, Msisdn, SenderId};

/// What Clockwork should do when the message text contains characters outside the
/// GSM character set (`InvalidCharAction`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvalidCharAction {
    /// Leave the decision to the account default; nothing is sent on the wire.
    #[default]
    Unspecified,
    /// Reject the message.
    Error,
    /// Strip the invalid characters.
    Remove,
    /// Replace invalid characters where possible, remove the others.
    Replace,
}

impl InvalidCharAction {
    /// XML element name used by Clockwork (`InvalidCharAction`).
    pub const FIELD: &'static str = "InvalidCharAction";

    /// Numeric wire code, or `None` for [`InvalidCharAction::Unspecified`].
    pub fn code(self) -> Option<u8> {
        match self {
            Self::Unspecified => None,
            Self::Error => Some(1),
            Self::Remove => Some(2),
            Self::Replace => Some(3),
        }
    }
}

impl FromStr for InvalidCharAction {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "remove" => Ok(Self::Remove),
            "replace" => Ok(Self::Replace),
            _ => Err(ValidationError::UnknownInvalidCharAction {
                input: value.to_owned(),
            }),
        }
    }
}

/// Per-message delivery options. Can be shared across messages by cloning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub from: Option<SenderId>,
    pub client_id: Option<ClientId>,
    /// Allow messages longer than one SMS part (billed per part).
    pub long: bool,
    /// Truncate text that does not fit instead of rejecting it.
    pub truncate: bool,
    pub invalid_char_action: InvalidCharAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    to: Msisdn,
    content: MessageText,
    options: SendOptions,
}

impl Message {
    pub fn new(to: Msisdn, content: MessageText) -> Self {
        Self {
            to,
            content,
            options: SendOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SendOptions) -> Self {
        self.options = options;
        self
    }

    pub fn to(&self) -> &Msisdn {
        &self.to
    }

    pub fn content(&self) -> &MessageText {
        &self.content
    }

    pub fn options(&self) -> &SendOptions {
        &self.options
    }
}

/// Ordered, non-empty set of messages submitted in one `sms` call.
///
/// The position of each message is its correlation id on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendBatch {
    messages: Vec<Message>,
}

impl SendBatch {
    pub const FIELD: &'static str = "SMS";

    pub fn new(messages: Vec<Message>) -> Result<Self, ValidationError> {
        if messages.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self { messages })
    }

    pub fn one(message: Message) -> Self {
        Self {
            messages: vec![message],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl From<Message> for SendBatch {
    fn from(message: Message) -> Self {
        Self::one(message)
    }
}
