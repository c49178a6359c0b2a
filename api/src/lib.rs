pub mod cache;
pub mod client;
pub mod keys;
pub mod scrape;
pub mod sportsdb;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of TheSportsDB wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String, // "Rose BC"
    pub badge_url: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
}

impl Team {
    /// Club name without the trailing " BC" suffix ("Rose BC" -> "Rose").
    pub fn short_name(&self) -> &str {
        self.name.strip_suffix(" BC").unwrap_or(&self.name)
    }

    /// The fixed eight-club league table, used when the roster endpoint
    /// returns nothing and to resolve scraped team names.
    pub fn league() -> &'static [Team] {
        &LEAGUE
    }

    pub fn find_by_id(id: &str) -> Option<&'static Team> {
        Self::league().iter().find(|t| t.id == id)
    }

    /// Match either the full club name or the short name, exactly.
    pub fn find_by_name(name: &str) -> Option<&'static Team> {
        Self::league()
            .iter()
            .find(|t| t.name == name || t.short_name() == name)
    }
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Team {}

impl std::hash::Hash for Team {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

static LEAGUE: LazyLock<Vec<Team>> = LazyLock::new(|| {
    vec![
        league_team("154048", "Breeze BC", "breeze-bc"),
        league_team("154049", "Hive BC", "hive-bc"),
        league_team("151477", "Laces BC", "laces-bc"),
        league_team("150651", "Lunar Owls BC", "lunar-owls-bc"),
        league_team("151962", "Mist BC", "mist-bc"),
        league_team("151478", "Phantom BC", "phantom-bc"),
        league_team("151481", "Rose BC", "rose-bc"),
        league_team("150736", "Vinyl BC", "vinyl-bc"),
    ]
});

fn league_team(id: &str, name: &str, badge_slug: &str) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
        badge_url: Some(format!(
            "https://r2.thesportsdb.com/images/media/team/badge/{badge_slug}.png"
        )),
        logo_url: None,
        description: None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub home_team: Team,
    pub away_team: Team,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub date: DateTime<Utc>,
    /// False when the source only gave a calendar date, so the time of day
    /// in `date` is a midnight placeholder and should not be shown.
    pub has_valid_time: bool,
    pub status: GameStatus,
    pub thumbnail_url: Option<String>,
    /// Free-form progress text from the live feed ("Q3", "HT", ...).
    pub progress: Option<String>,
}

impl Game {
    pub fn is_completed(&self) -> bool {
        self.status == GameStatus::Completed
    }

    pub fn is_live(&self) -> bool {
        self.status == GameStatus::Live
    }

    /// "84 - 79" once both scores exist, "vs" before then.
    pub fn score_display(&self) -> String {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => format!("{home} - {away}"),
            _ => "vs".to_string(),
        }
    }

    /// The winning team of a completed game. Ties and unfinished games
    /// have no winner.
    pub fn winner(&self) -> Option<&Team> {
        if !self.is_completed() {
            return None;
        }
        let (home, away) = (self.home_score?, self.away_score?);
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => Some(&self.home_team),
            std::cmp::Ordering::Less => Some(&self.away_team),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn time_display(&self) -> String {
        if self.has_valid_time {
            self.date.format("%H:%M").to_string()
        } else {
            "TBD".to_string()
        }
    }

    pub fn date_display(&self) -> String {
        self.date.format("%a, %b %e").to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Standing {
    pub team_name: String,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
    pub badge_url: Option<String>,
}
