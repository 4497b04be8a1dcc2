use std::fs;
use std::path::Path;
use chrono::Utc;
use anyhow::Result;
use std::collections::HashSet;

use rspotify::Token;

const SPOTIFY_CLIENT_ID: &str = "492e1e45ea814fa3ac555fe1576aaf5b";
const SPOTIFY_REDIRECT_URI: &str = "http://127.0.0.1:8898/login";
pub const SCOPES: &str =
    "user-read-playback-state user-modify-playback-state user-read-currently-playing playlist-read-private playlist-read-collaborative";

const RESPONSE: &str = r#"
<!doctype html>
<html>
<head><title>Success</title></head>
<body><h1>Authentication Successful!</h1><script>window.close();</script></body>
</html>
"#;
const CACHE: &str = ".cache";
const REFRESH_TOKEN_FILE: &str = ".cache/refresh_token";
const TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Clone)]
pub struct AuthResult {
    pub token: Token,
    pub refresh_token: String,
}

fn oauth_builder() -> librespot_oauth::OAuthClientBuilder {
    librespot_oauth::OAuthClientBuilder::new(
        SPOTIFY_CLIENT_ID,
        SPOTIFY_REDIRECT_URI,
        SCOPES.split_whitespace().collect(),
    )
}

fn rspotify_token(access_token: String) -> Token {
    let lifetime = chrono::Duration::seconds(TOKEN_LIFETIME_SECS);
    Token {
        access_token,
        expires_in: lifetime,
        expires_at: Some(Utc::now() + lifetime),
        scopes: SCOPES
            .split_whitespace()
            .map(|s| s.to_string())
            .collect::<HashSet<String>>(),
        refresh_token: None,
    }
}

fn save_refresh_token(refresh_token: &str) {
    if let Err(e) = fs::create_dir_all(CACHE).and_then(|_| fs::write(REFRESH_TOKEN_FILE, refresh_token)) {
        tracing::warn!(error = %e, "Could not persist refresh token");
    } else {
        tracing::debug!("Saved refresh token to disk");
    }
}

async fn perform_browser_auth() -> Result<AuthResult> {
    tracing::info!("Starting browser-based OAuth flow");
    let client = oauth_builder()
        .open_in_browser()
        .with_custom_message(RESPONSE)
        .build()?;

    let token = client.get_access_token_async().await?;
    save_refresh_token(&token.refresh_token);

    tracing::info!("Browser authentication completed successfully");
    Ok(AuthResult {
        token: rspotify_token(token.access_token),
        refresh_token: token.refresh_token,
    })
}

/// Exchange a refresh token for a fresh access token
pub async fn refresh_access_token(refresh_token: &str) -> Result<AuthResult> {
    let client = oauth_builder().build()?;
    let token = client.refresh_token_async(refresh_token).await?;
    save_refresh_token(&token.refresh_token);

    Ok(AuthResult {
        token: rspotify_token(token.access_token),
        refresh_token: token.refresh_token,
    })
}

pub async fn perform_oauth_flow() -> Result<AuthResult> {
    let stored_refresh_token = if Path::new(REFRESH_TOKEN_FILE).exists() {
        fs::read_to_string(REFRESH_TOKEN_FILE).ok()
    } else {
        None
    };

    match stored_refresh_token {
        Some(refresh_token) => {
            tracing::info!("Found cached refresh token");
            match refresh_access_token(refresh_token.trim()).await {
                Ok(result) => {
                    tracing::debug!("Token refreshed successfully");
                    Ok(result)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Cached refresh token failed, re-authenticating");
                    perform_browser_auth().await
                }
            }
        }
        None => {
            tracing::info!("No cached credentials found, starting browser authentication");
            perform_browser_auth().await
        }
    }
}
