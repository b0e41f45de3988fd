//! Interactive login that prints a `TELEGRAM_SESSION` value for the bot's `.env`.
use anyhow::{bail, Context};
use crypto_digest_bot::config::{ENV_API_HASH, ENV_API_ID, ENV_SESSION};
use crypto_digest_bot::telegram::channels::encode_session;
use grammers_client::{Client, Config, InitParams, SignInError};
use grammers_session::Session;
use std::io::{stdin, stdout, BufRead, Write};

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    stdout().flush()?;
    let mut line = String::new();
    stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    println!("Telegram Session Setup");
    println!("----------------------");

    let api_id: i32 = std::env::var(ENV_API_ID)
        .with_context(|| format!("{} must be set", ENV_API_ID))?
        .trim()
        .parse()
        .with_context(|| format!("{} must be an integer", ENV_API_ID))?;
    let api_hash = std::env::var(ENV_API_HASH).with_context(|| format!("{} must be set", ENV_API_HASH))?;

    let client = Client::connect(Config {
        session: Session::new(),
        api_id,
        api_hash: api_hash.clone(),
        params: InitParams::default(),
    })
    .await
    .context("failed to connect to Telegram")?;

    if !client.is_authorized().await? {
        let phone = prompt("Phone number (international format): ")?;
        if phone.is_empty() {
            bail!("Phone number cannot be empty.");
        }
        let token = client.request_login_code(&phone).await?;
        let code = prompt("Login code: ")?;

        match client.sign_in(&token, &code).await {
            Ok(_) => {}
            Err(SignInError::PasswordRequired(password_token)) => {
                let hint = password_token.hint().unwrap_or("none").to_string();
                let password = prompt(&format!("Two-step password (hint: {}): ", hint))?;
                client
                    .check_password(password_token, password.trim())
                    .await
                    .context("password check failed")?;
            }
            Err(e) => bail!("Sign in failed: {}", e),
        }
    }

    println!("\nSigned in. Add this line to your .env:\n");
    println!("{}={}", ENV_SESSION, encode_session(client.session()));
    Ok(())
}
