use chrono::Utc;
use jarvis_calendar::calendar::token::{StoredToken, TokenManager, TokenResponse, TOKEN_URL};
use jarvis_calendar::config::Config;
use jarvis_calendar::error::{auth_error, other_error, AppResult, Error};
use url::Url;

const REDIRECT_PORT: u16 = 8080;
const SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Load configuration
    let config = Config::load(None)?;

    let token_manager = TokenManager::new(
        config.token_path.clone(),
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );
    let redirect_uri = format!("http://localhost:{}", REDIRECT_PORT);

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();

    // Construct authorization URL
    let auth_url = authorization_url(&config.google_client_id, &redirect_uri, &state)?;

    // Open browser for authorization
    println!("Opening browser for Google Calendar authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("Could not open a browser, visit this URL instead:\n{}", auth_url);
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http(("127.0.0.1", REDIRECT_PORT))
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    println!("Waiting for authorization callback...");

    // Handle the callback
    let request = server.recv().map_err(Error::from)?;
    let code = match authorization_code(request.url(), &state) {
        Ok(code) => code,
        Err(e) => {
            let response =
                tiny_http::Response::from_string("Authorization failed.").with_status_code(400);
            let _ = request.respond(response);
            return Err(e.into());
        }
    };

    // Exchange code for tokens
    let client = reqwest::Client::new();
    let response = client
        .post(TOKEN_URL)
        .form(&[
            ("client_id", config.google_client_id.as_str()),
            ("client_secret", config.google_client_secret.as_str()),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| auth_error(&format!("Failed to request token: {}", e)))?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(auth_error(&format!("Failed to get token: {}", error_text)).into());
    }

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;
    if body.refresh_token.is_none() {
        println!("Warning: no refresh token returned; the token will need renewing in an hour.");
    }

    // Save token using TokenManager
    let token = StoredToken::from_response(body, None, Utc::now().timestamp());
    token_manager.save(&token)?;

    // Send success response to browser
    let response =
        tiny_http::Response::from_string("Authorization successful! You can close this window.");
    request.respond(response).map_err(Error::from)?;

    println!("Token saved to {}", token_manager.path().display());

    Ok(())
}

fn authorization_url(client_id: &str, redirect_uri: &str, state: &str) -> AppResult<Url> {
    Url::parse_with_params(
        "https://accounts.google.com/o/oauth2/v2/auth",
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("scope", SCOPE),
            ("state", state),
        ],
    )
    .map_err(|e| other_error(&format!("Failed to build authorization URL: {}", e)))
}

/// Pull the authorization code out of the redirect, checking `state`
fn authorization_code(request_url: &str, expected_state: &str) -> AppResult<String> {
    let url = Url::parse(&format!("http://localhost{}", request_url))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    if let Some(error) = param("error") {
        return Err(auth_error(&format!("Authorization denied: {}", error)));
    }
    if param("state").as_deref() != Some(expected_state) {
        return Err(auth_error("State mismatch in authorization callback"));
    }
    param("code").ok_or_else(|| auth_error("No authorization code found in callback"))
}
