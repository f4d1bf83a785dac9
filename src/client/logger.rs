//! Pluggable sink for the raw XML exchanged with Clockwork.

use std::error::Error as StdError;

/// Receives every request and response document, labelled
/// `"API {method} Request XML"` / `"API {method} Response XML"`.
///
/// Errors and panics raised by the logger are reported through `tracing` and otherwise
/// ignored; a failing logger never fails the API call.
pub trait XmlLogger: Send + Sync {
    fn log(&self, label: &str, xml: &str) -> Result<(), Box<dyn StdError + Send + Sync>>;
}

impl<F> XmlLogger for F
where
    F: Fn(&str, &str) -> Result<(), Box<dyn StdError + Send + Sync>> + Send + Sync,
{
    fn log(&self, label: &str, xml: &str) -> Result<(), Box<dyn StdError + Send + Sync>> {
        self(label, xml)
    }
}

/// Emits the XML as `DEBUG` events on the `clockwork_sms::xml` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingXmlLogger;

impl XmlLogger for TracingXmlLogger {
    fn log(&self, label: &str, xml: &str) -> Result<(), Box<dyn StdError + Send + Sync>> {
        tracing::debug!(target: "clockwork_sms::xml", label, "\n{xml}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn closures_are_loggers() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |label: &str, xml: &str| -> Result<(), Box<dyn StdError + Send + Sync>> {
                seen.lock().unwrap().push(format!("{label}: {xml}"));
                Ok(())
            }
        };

        sink.log("API sms Request XML", "<Message/>").unwrap();
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["API sms Request XML: <Message/>"]
        );
    }

    #[test]
    fn tracing_logger_never_fails() {
        assert!(TracingXmlLogger.log("label", "<a/>").is_ok());
        assert!(TracingXmlLogger.log("label", "not xml").is_ok());
    }
}
