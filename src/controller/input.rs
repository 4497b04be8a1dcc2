//! Key event handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.ui_state.lock().await.should_quit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.ui_state.lock().await.should_quit = true;
            }
            KeyCode::Right | KeyCode::Tab => {
                self.ui_state.lock().await.next_playlist();
                self.open_selected_playlist().await;
            }
            KeyCode::Left | KeyCode::BackTab => {
                self.ui_state.lock().await.prev_playlist();
                self.open_selected_playlist().await;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.ui_state.lock().await.move_track_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let track_count = self
                    .view
                    .tracks()
                    .borrow()
                    .as_ref()
                    .map(|page| page.items.len())
                    .unwrap_or(0);
                self.ui_state.lock().await.move_track_down(track_count);
            }
            KeyCode::Enter => {
                let row = self.ui_state.lock().await.track_selected;
                let position = self
                    .view
                    .tracks()
                    .borrow()
                    .as_ref()
                    .and_then(|page| page.items.get(row))
                    .map(|track| track.position);
                match position {
                    // Fire and forget, failures are logged by the view store
                    Some(position) => {
                        let _ = self.view.play_track_at_position(position);
                    }
                    None => tracing::debug!(row, "No track at selected row"),
                }
            }
            KeyCode::Char(' ') => {
                let is_playing = *self.view.is_playing().borrow();
                let _ = self.view.toggle_playback(is_playing);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use crossterm::event::KeyEventState;

    use crate::controller::PlaylistViewStore;
    use crate::model::api::fakes::{track_page, FakePlayerApi, FakePlaylistApi, PlayerCall};
    use crate::model::{AppStore, PlayRequest, PlaybackStore, RootState, Router, UiState};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn controller() -> AppController {
        controller_with(AppStore::new(), Arc::new(FakePlayerApi::new()))
    }

    fn controller_with(store: AppStore, player: Arc<FakePlayerApi>) -> AppController {
        let router = Router::new();
        let view = PlaylistViewStore::new(
            router.params(),
            Arc::new(FakePlaylistApi::new()),
            player,
            store,
            PlaybackStore::new(),
        );
        AppController::new(view, router, UiState::new(vec!["a".into(), "b".into()]))
    }


    #[tokio::test]
    async fn arrows_switch_playlist_route() {
        let controller = controller();
        let mut state = controller.view.state();

        controller.handle_key_event(press(KeyCode::Right)).await;
        tokio::time::timeout(Duration::from_secs(5), state.wait_for(|s| s.playlist_id == "b"))
            .await
            .unwrap()
            .unwrap();

        controller.handle_key_event(press(KeyCode::Left)).await;
        tokio::time::timeout(Duration::from_secs(5), state.wait_for(|s| s.playlist_id == "a"))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn q_requests_quit() {
        let controller = controller();
        assert!(!controller.should_quit().await);
        controller.handle_key_event(press(KeyCode::Char('q'))).await;
        assert!(controller.should_quit().await);
    }

    #[tokio::test]
    async fn release_events_are_ignored() {
        let controller = controller();
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        controller.handle_key_event(key).await;
        assert!(!controller.should_quit().await);
    }

    #[tokio::test]
    async fn enter_plays_the_selected_tracks_playlist_index() {
        // Playlist is [episode, A, B]; only A and B are listed
        let mut page = track_page("a");
        let track_at = |position: u32, name: &str| {
            let mut track = page.items[0].clone();
            track.position = position;
            track.name = name.to_string();
            track
        };
        let listed = vec![track_at(1, "A"), track_at(2, "B")];
        page.items = listed;
        page.fetched = 3;
        page.total = 3;
        let mut state = RootState::default();
        state.playlist_tracks.insert("a".into(), page);

        let player = Arc::new(FakePlayerApi::new());
        let controller = controller_with(AppStore::with_state(state), player.clone());
        controller.open_selected_playlist().await;

        let mut tracks = controller.view.tracks();
        tokio::time::timeout(Duration::from_secs(5), tracks.wait_for(Option::is_some))
            .await
            .unwrap()
            .unwrap();

        controller.handle_key_event(press(KeyCode::Enter)).await;

        let mut calls = player.watch_calls();
        let calls = tokio::time::timeout(Duration::from_secs(5), calls.wait_for(|calls| !calls.is_empty()))
            .await
            .unwrap()
            .unwrap()
            .clone();
        assert_eq!(
            calls,
            vec![PlayerCall::Play(PlayRequest {
                context_uri: "spotify:playlist:a".into(),
                position: 1,
            })]
        );
    }

    #[tokio::test]
    async fn enter_without_tracks_plays_nothing() {
        let player = Arc::new(FakePlayerApi::new());
        let controller = controller_with(AppStore::new(), player.clone());

        controller.handle_key_event(press(KeyCode::Enter)).await;
        tokio::task::yield_now().await;

        assert!(player.calls().is_empty());
    }
}
