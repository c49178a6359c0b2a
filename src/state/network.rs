use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, error, warn};
use tokio::sync::mpsc;
use unrivaled_api::client::{ApiError, UnrivaledApi};
use unrivaled_api::Game;

use crate::state::messages::{NetworkRequest, NetworkResponse};
use crate::state::widget::WidgetStore;
use crate::state::{app_state, widget};

pub struct NetworkWorker {
    client: Arc<UnrivaledApi>,
    widgets: WidgetStore,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
}

impl NetworkWorker {
    pub fn new(
        client: Arc<UnrivaledApi>,
        widgets: WidgetStore,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            widgets,
            requests,
            responses,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            let result = match request {
                NetworkRequest::LoadGames => self.handle_load_games().await,
                NetworkRequest::RefreshGames => self.handle_refresh_games().await,
                NetworkRequest::PollLive => self.handle_poll_live().await,
            };

            debug!("network request complete");

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_games(&self) -> Result<NetworkResponse, ApiError> {
        debug!("loading games");
        let (season, upcoming, recent, live) = tokio::join!(
            self.client.fetch_season_games(),
            self.client.fetch_upcoming_games(),
            self.client.fetch_recent_results(),
            self.client.fetch_live_games_with_fallback(),
        );
        let (season, upcoming, recent, live) = (season?, upcoming?, recent?, live?);

        let games = merge_games(season, upcoming, recent, live.clone());
        self.publish_widget_snapshot(&games);
        Ok(NetworkResponse::GamesLoaded { games, live })
    }

    async fn handle_refresh_games(&self) -> Result<NetworkResponse, ApiError> {
        debug!("refreshing games, cache cleared");
        self.client.clear_cache().await;
        self.handle_load_games().await
    }

    /// Live polling deliberately skips the scrape fallback; a quiet
    /// feed between quarters should not hammer the website every 30 s.
    async fn handle_poll_live(&self) -> Result<NetworkResponse, ApiError> {
        debug!("polling live scores");
        let live = self.client.fetch_live_games().await?;
        Ok(NetworkResponse::LiveUpdated { live })
    }

    fn publish_widget_snapshot(&self, games: &[Game]) {
        let upcoming: Vec<Game> = app_state::upcoming_games(games)
            .into_iter()
            .cloned()
            .collect();
        let recent: Vec<Game> = app_state::completed_games(games)
            .into_iter()
            .take(widget::RECENT_LIMIT)
            .cloned()
            .collect();

        if let Err(e) = self.widgets.save_upcoming(&upcoming) {
            warn!("failed to save upcoming snapshot: {e}");
        }
        if let Err(e) = self.widgets.save_recent(&recent) {
            warn!("failed to save results snapshot: {e}");
        }
    }
}

/// Merge the schedule slices into one id-keyed collection. Later slices
/// overwrite earlier ones, so live data always wins over the season
/// schedule's stale copy of the same game.
pub fn merge_games(
    season: Vec<Game>,
    upcoming: Vec<Game>,
    recent: Vec<Game>,
    live: Vec<Game>,
) -> Vec<Game> {
    let mut by_id: HashMap<String, Game> = HashMap::new();
    for game in season
        .into_iter()
        .chain(upcoming)
        .chain(recent)
        .chain(live)
    {
        by_id.insert(game.id.clone(), game);
    }
    let mut games: Vec<Game> = by_id.into_values().collect();
    games.sort_by_key(|g| g.date);
    games
}
