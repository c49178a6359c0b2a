use unrivaled_api::Game;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadGames,
    /// Full reload with the cache cleared first.
    RefreshGames,
    PollLive,
}

#[derive(Debug)]
pub enum NetworkResponse {
    GamesLoaded { games: Vec<Game>, live: Vec<Game> },
    /// Partial update: live games patch matching ids in the loaded
    /// collection; the live subset itself is replaced wholesale.
    LiveUpdated { live: Vec<Game> },
    Error { message: String },
}
