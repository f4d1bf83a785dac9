use std::io;

use clockwork_sms::{ApiKey, ClockworkClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("CLOCKWORK_API_KEY").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "CLOCKWORK_API_KEY environment variable is required",
        )
    })?;

    let client = ClockworkClient::new(ApiKey::new(api_key)?);
    println!("key valid: {}", client.check_key().await?);

    Ok(())
}
