//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{InvalidCharAction, Message, SendBatch, SendOptions};
pub use response::{ApiError, Balance, BatchResult, SendResult};
pub use validation::ValidationError;
pub use value::{ApiKey, ClientId, MessageText, Msisdn, PhoneNumber, SenderId};

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str, text: &str) -> Message {
        Message::new(Msisdn::new(to).unwrap(), MessageText::new(text).unwrap())
    }

    #[test]
    fn api_key_rejects_empty() {
        assert!(matches!(
            ApiKey::new("   "),
            Err(ValidationError::Empty {
                field: ApiKey::FIELD
            })
        ));
    }

    #[test]
    fn send_batch_requires_non_empty() {
        let err = SendBatch::new(Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Empty {
                field: SendBatch::FIELD
            }
        ));
    }

    #[test]
    fn send_batch_keeps_input_order() {
        let batch = SendBatch::new(vec![message("441", "a"), message("442", "b")]).unwrap();
        assert_eq!(batch.len(), 2);
        let recipients = batch
            .messages()
            .iter()
            .map(|m| m.to().raw())
            .collect::<Vec<_>>();
        assert_eq!(recipients, ["441", "442"]);
    }

    #[test]
    fn message_defaults_to_empty_options() {
        let msg = message("447777111222", "hello");
        assert_eq!(msg.options(), &SendOptions::default());
        assert_eq!(msg.options().from, None);
        assert!(!msg.options().long);
        assert!(!msg.options().truncate);
        assert_eq!(
            msg.options().invalid_char_action,
            InvalidCharAction::Unspecified
        );
    }

    #[test]
    fn options_can_be_reused_across_messages() {
        let options = SendOptions {
            from: Some(SenderId::new("TEST").unwrap()),
            long: true,
            ..Default::default()
        };
        let a = message("441", "a").with_options(options.clone());
        let b = message("442", "b").with_options(options);
        assert_eq!(a.options(), b.options());
    }

    #[test]
    fn invalid_char_action_codes_and_parsing() {
        assert_eq!(InvalidCharAction::Unspecified.code(), None);
        assert_eq!(InvalidCharAction::Error.code(), Some(1));
        assert_eq!(InvalidCharAction::Remove.code(), Some(2));
        assert_eq!(InvalidCharAction::Replace.code(), Some(3));

        assert_eq!(
            "Replace".parse::<InvalidCharAction>(),
            Ok(InvalidCharAction::Replace)
        );
        assert_eq!(
            " ERROR ".parse::<InvalidCharAction>(),
            Ok(InvalidCharAction::Error)
        );
        assert!(matches!(
            "ignore".parse::<InvalidCharAction>(),
            Err(ValidationError::UnknownInvalidCharAction { .. })
        ));
    }

    #[test]
    fn send_result_success_follows_error_code() {
        let ok = SendResult {
            message: message("441", "a"),
            message_id: Some("VE_1".to_owned()),
            error_code: None,
            error_message: None,
        };
        let failed = SendResult {
            message: message("442", "b"),
            message_id: None,
            error_code: Some(10),
            error_message: Some("Invalid 'To' Parameter".to_owned()),
        };
        assert!(ok.is_success());
        assert!(!failed.is_success());

        let batch = BatchResult::new(vec![ok, failed]);
        assert_eq!(batch.successes().count(), 1);
        assert_eq!(batch.failures().count(), 1);
        assert_eq!(batch.get(1).and_then(|r| r.error_code), Some(10));
    }

    #[test]
    fn api_error_display_includes_code() {
        let err = ApiError {
            code: 2,
            description: "Invalid Login".to_owned(),
        };
        assert_eq!(err.to_string(), "Invalid Login (code 2)");
    }
}
