use chrono::Utc;
use unrivaled_api::Game;

/// The single authoritative game collection. Only the coordinating
/// select loop mutates it; everything else reads derived views.
#[derive(Debug, Default)]
pub struct GamesState {
    pub all_games: Vec<Game>,
    pub live_games: Vec<Game>,
    pub error: Option<String>,
    pub is_loading: bool,
    pub favorite_team_id: Option<String>,
}

impl GamesState {
    pub fn on_games_loaded(&mut self, games: Vec<Game>, live: Vec<Game>) {
        self.all_games = games;
        self.live_games = live;
        self.error = None;
        self.is_loading = false;
    }

    /// Patch live scores into the loaded collection by id, then replace
    /// the live subset wholesale. Games that just ended simply drop out
    /// of the subset while keeping their final score in the collection.
    pub fn on_live_updated(&mut self, live: Vec<Game>) {
        for update in &live {
            if let Some(game) = self.all_games.iter_mut().find(|g| g.id == update.id) {
                *game = update.clone();
            }
        }
        self.live_games = live;
    }

    pub fn on_error(&mut self, message: String) {
        self.error = Some(message);
        self.is_loading = false;
    }

    pub fn upcoming_games(&self) -> Vec<&Game> {
        upcoming_games(&self.all_games)
    }

    pub fn completed_games(&self) -> Vec<&Game> {
        completed_games(&self.all_games)
    }

    /// Upcoming games for the favorite team, or all upcoming games when
    /// no favorite is set.
    pub fn favorite_upcoming(&self) -> Vec<&Game> {
        let upcoming = self.upcoming_games();
        match &self.favorite_team_id {
            Some(id) => upcoming.into_iter().filter(|g| involves(g, id)).collect(),
            None => upcoming,
        }
    }

    pub fn favorite_results(&self) -> Vec<&Game> {
        let completed = self.completed_games();
        match &self.favorite_team_id {
            Some(id) => completed.into_iter().filter(|g| involves(g, id)).collect(),
            None => completed,
        }
    }

    pub fn next_game(&self) -> Option<&Game> {
        self.favorite_upcoming().into_iter().next()
    }

    pub fn last_result(&self) -> Option<&Game> {
        self.favorite_results().into_iter().next()
    }
}

fn involves(game: &Game, team_id: &str) -> bool {
    game.home_team.id == team_id || game.away_team.id == team_id
}

/// Games still to be played: not completed, not live, dated today or
/// later (UTC), soonest first.
pub fn upcoming_games(games: &[Game]) -> Vec<&Game> {
    let today = Utc::now().date_naive();
    let mut upcoming: Vec<&Game> = games
        .iter()
        .filter(|g| !g.is_completed() && !g.is_live() && g.date.date_naive() >= today)
        .collect();
    upcoming.sort_by_key(|g| g.date);
    upcoming
}

/// Finished games, most recent first.
pub fn completed_games(games: &[Game]) -> Vec<&Game> {
    let mut completed: Vec<&Game> = games.iter().filter(|g| g.is_completed()).collect();
    completed.sort_by_key(|g| std::cmp::Reverse(g.date));
    completed
}
