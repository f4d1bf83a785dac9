use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidPhoneNumber { input: String },
    UnknownInvalidCharAction { input: String },
    InvalidCharacter { field: &'static str, character: char },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::UnknownInvalidCharAction { input } => write!(
                f,
                "unknown invalid character action: {input} (expected error, remove or replace)"
            ),
            Self::InvalidCharacter { field, character } => write!(
                f,
                "{field} contains U+{:04X}, which XML documents cannot carry",
                u32::from(*character)
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
