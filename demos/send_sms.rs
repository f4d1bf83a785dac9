use std::io;

use clockwork_sms::{
    ApiKey, ClockworkClient, InvalidCharAction, Message, MessageText, Msisdn, SendBatch,
    SendOptions, SenderId, TracingXmlLogger,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let api_key = std::env::var("CLOCKWORK_API_KEY").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "CLOCKWORK_API_KEY environment variable is required",
        )
    })?;
    let phone_raw = std::env::var("CLOCKWORK_PHONE").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "CLOCKWORK_PHONE environment variable is required",
        )
    })?;
    let message = std::env::var("CLOCKWORK_MESSAGE")
        .unwrap_or_else(|_| "Hello from the clockwork-sms demo.".to_owned());

    let client = ClockworkClient::builder(ApiKey::new(api_key)?)
        .logger(TracingXmlLogger)
        .pretty_log(true)
        .build()?;

    let options = SendOptions {
        from: std::env::var("CLOCKWORK_FROM")
            .ok()
            .map(SenderId::new)
            .transpose()?,
        long: true,
        invalid_char_action: InvalidCharAction::Replace,
        ..Default::default()
    };
    let message =
        Message::new(Msisdn::new(phone_raw)?, MessageText::new(message)?).with_options(options);

    let result = client.send(SendBatch::one(message)).await?;
    for entry in &result {
        if entry.is_success() {
            println!(
                "sent to {}: message id {:?}",
                entry.message.to().raw(),
                entry.message_id
            );
        } else {
            println!(
                "failed for {}: {:?} {:?}",
                entry.message.to().raw(),
                entry.error_code,
                entry.error_message
            );
        }
    }

    Ok(())
}
