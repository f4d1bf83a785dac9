use crate::domain::validation::ValidationError;

use phonenumber::country;

/// Rejects characters outside the XML 1.0 `Char` production: C0 controls other than
/// tab, line feed and carriage return, plus U+FFFE and U+FFFF.
fn ensure_xml_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let forbidden = |c: &char| {
        matches!(
            *c,
            '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
        )
    };
    match value.chars().find(forbidden) {
        Some(character) => Err(ValidationError::InvalidCharacter { field, character }),
        None => Ok(()),
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// Clockwork API key.
///
/// Invariant: non-empty after trimming. `Debug` output is redacted.
pub struct ApiKey(String);

impl ApiKey {
    /// XML element name used by Clockwork (`Key`).
    pub const FIELD: &'static str = "Key";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        ensure_xml_text(Self::FIELD, trimmed)?;
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Recipient phone number as sent to Clockwork (`To`).
///
/// Invariant: non-empty after trimming. This type does not normalize; if you want
/// normalization, parse into [`PhoneNumber`] and convert it into [`Msisdn`].
pub struct Msisdn(String);

impl Msisdn {
    /// XML element name used by Clockwork (`To`).
    pub const FIELD: &'static str = "To";

    /// Create a validated (non-empty) recipient number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        ensure_xml_text(Self::FIELD, trimmed)?;
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw (trimmed) value as sent to Clockwork.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Whether the value has the international format Clockwork expects: digits only,
    /// no leading zero or `+`, 8 to 13 digits long.
    ///
    /// This is advisory; [`Msisdn::new`] accepts any non-empty value.
    pub fn is_well_formed(&self) -> bool {
        let bytes = self.0.as_bytes();
        matches!(bytes.first(), Some(b'1'..=b'9'))
            && (8..=13).contains(&bytes.len())
            && bytes.iter().all(u8::is_ascii_digit)
    }
}

impl From<PhoneNumber> for Msisdn {
    /// Convert an already-parsed phone number to its E.164 digits without the `+`.
    fn from(value: PhoneNumber) -> Self {
        let digits = value.e164.trim_start_matches('+').to_owned();
        Self(digits)
    }
}

#[derive(Debug, Clone)]
/// Parsed phone number with an E.164 representation.
///
/// Equality, ordering, and hashing are based on the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
    parsed: phonenumber::PhoneNumber,
}

impl PhoneNumber {
    /// XML element name used by Clockwork (`To`).
    pub const FIELD: &'static str = "To";

    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164, parsed })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation.
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// The parsed phone number from the `phonenumber` crate.
    pub fn parsed(&self) -> &phonenumber::PhoneNumber {
        &self.parsed
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

impl std::cmp::PartialOrd for PhoneNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for PhoneNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.e164.cmp(&other.e164)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text (`Content`).
///
/// Invariant: non-empty after trimming. The original value (including whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// XML element name used by Clockwork (`Content`).
    pub const FIELD: &'static str = "Content";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        ensure_xml_text(Self::FIELD, &value)?;
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sender id shown on the handset (`From`).
///
/// Invariant: non-empty after trimming. Clockwork allows up to 11 characters or 12 digits.
pub struct SenderId(String);

impl SenderId {
    /// XML element name used by Clockwork (`From`).
    pub const FIELD: &'static str = "From";

    /// Create a validated [`SenderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        ensure_xml_text(Self::FIELD, trimmed)?;
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated sender id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Caller-chosen reference attached to a message (`ClientID`).
///
/// Invariant: non-empty after trimming.
pub struct ClientId(String);

impl ClientId {
    /// XML element name used by Clockwork (`ClientID`).
    pub const FIELD: &'static str = "ClientID";

    /// Create a validated [`ClientId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        ensure_xml_text(Self::FIELD, trimmed)?;
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated client reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
