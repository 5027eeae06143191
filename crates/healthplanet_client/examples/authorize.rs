use healthplanet_client::{Config, OAuthClient};
use secrecy::ExposeSecret;

/// Prints the consent URL, or exchanges a code when one is passed as the
/// first argument.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_env()?;
    let auth = OAuthClient::new(&cfg)?;

    match std::env::args().nth(1) {
        None => println!("{}", auth.auth_uri()?),
        Some(code) => {
            let token = auth.exchange_token(&code).await?;
            println!("access_token={}", token.access_token.expose_secret());
            println!("expires_in={}", token.expires_in);
        }
    }
    Ok(())
}
