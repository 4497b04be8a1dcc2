mod auth;
mod controller;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::{anyhow, bail, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rspotify::{clients::OAuthClient, AuthCodeSpotify, Config, Token};

use view::AppView;
use controller::{spawn_playback_sync, AppController, PlaylistTracksEffect, PlaylistViewStore};
use model::{AppStore, PlaybackStore, Router, SpotifyClient, UiState};

const TOKEN_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let playlist_ids = parse_args(std::env::args().skip(1))?;

    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!(playlists = playlist_ids.len(), "=== Playlist view starting ===");

    let auth_result = auth::perform_oauth_flow().await?;
    let rspotify_client = setup_rspotify(auth_result.token.clone()).await?;

    match rspotify_client.me().await {
        Ok(user) => tracing::info!(user_id = %user.id, "rspotify authorized successfully"),
        Err(e) => {
            tracing::error!(error = %e, "rspotify authentication failed");
            return Err(anyhow!("rspotify init failed"));
        }
    }

    let spotify = SpotifyClient::new(
        rspotify_client,
        auth_result.refresh_token.clone(),
        auth_result.token.expires_at,
    );

    let store = AppStore::new();
    let router = Router::new();
    let playback = PlaybackStore::new();

    let effect = PlaylistTracksEffect::spawn(store.clone(), Arc::new(spotify.clone()));
    let playback_sync = spawn_playback_sync(spotify.clone(), playback.clone());

    let view_store = PlaylistViewStore::new(
        router.params(),
        Arc::new(spotify.clone()),
        Arc::new(spotify.clone()),
        store,
        playback,
    );

    let controller = AppController::new(view_store, router, UiState::new(playlist_ids));
    controller.open_selected_playlist().await;

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, controller, spotify).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    effect.abort();
    playback_sync.abort();

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Playlist view shutting down");
    Ok(())
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Vec<String>> {
    let ids: Vec<String> = args.filter_map(|arg| parse_playlist_id(&arg)).collect();
    if ids.is_empty() {
        bail!("usage: spotify-playlist-view <playlist-id|uri|url>...");
    }
    Ok(ids)
}

/// Accepts a bare id, a `spotify:playlist:` URI or an open.spotify.com link
fn parse_playlist_id(arg: &str) -> Option<String> {
    let arg = arg.trim();
    let id = if let Some(id) = arg.strip_prefix("spotify:playlist:") {
        id
    } else if let Some((_, rest)) = arg.split_once("/playlist/") {
        rest.split(['?', '/']).next().unwrap_or_default()
    } else {
        arg
    };

    (!id.is_empty()).then(|| id.to_string())
}

async fn setup_rspotify(access_token: Token) -> Result<AuthCodeSpotify> {
    let spotify = AuthCodeSpotify::with_config(
        Default::default(),
        Default::default(),
        Config {
            token_cached: false,
            token_refreshing: false,
            ..Default::default()
        },
    );

    tracing::debug!("rspotify client initialized");

    *spotify
        .token
        .lock()
        .await
        .map_err(|_| anyhow!("rspotify token lock poisoned"))? = Some(access_token);
    tracing::debug!("rspotify token set");
    Ok(spotify)
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: AppController,
    spotify: SpotifyClient,
) -> io::Result<()> {
    let mut last_token_check = Instant::now();

    loop {
        if last_token_check.elapsed() >= TOKEN_CHECK_INTERVAL {
            last_token_check = Instant::now();
            let spotify = spotify.clone();
            tokio::spawn(async move {
                if let Err(e) = spotify.refresh_token_if_needed().await {
                    tracing::warn!(error = %e, "Token refresh check failed");
                }
            });
        }

        let view_model = controller.view_model();
        let ui_state = controller.get_ui_state().await;

        terminal.draw(|f| {
            AppView::render(f, &view_model, &ui_state);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                controller.handle_key_event(key).await;
            }
        }

        if controller.should_quit().await {
            break;
        }
    }

    Ok(())
}
