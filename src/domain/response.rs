use std::fmt;

use crate::domain::request::Message;

/// Request-level failure reported by Clockwork (top-level `ErrNo`/`ErrDesc`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: i32,
    pub description: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.description, self.code)
    }
}

impl std::error::Error for ApiError {}

/// Outcome for one message of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResult {
    pub message: Message,
    pub message_id: Option<String>,
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
}

impl SendResult {
    /// `true` iff Clockwork reported no error code for this message.
    pub fn is_success(&self) -> bool {
        self.error_code.is_none()
    }
}

/// Per-message results in the same order as the submitted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    results: Vec<SendResult>,
}

impl BatchResult {
    pub(crate) fn new(results: Vec<SendResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SendResult> {
        self.results.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SendResult> {
        self.results.iter()
    }

    pub fn successes(&self) -> impl Iterator<Item = &SendResult> {
        self.results.iter().filter(|result| result.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SendResult> {
        self.results.iter().filter(|result| !result.is_success())
    }

    pub fn into_results(self) -> Vec<SendResult> {
        self.results
    }
}

impl IntoIterator for BatchResult {
    type Item = SendResult;
    type IntoIter = std::vec::IntoIter<SendResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a SendResult;
    type IntoIter = std::slice::Iter<'a, SendResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Account balance as reported by the `balance` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub symbol: String,
    /// Decimal amount with exactly two fraction digits, e.g. `"12.50"`.
    pub amount: String,
    pub code: String,
    pub account_type: Option<String>,
}
