//! Live-score fallback that scrapes the league website when the API
//! live feed has nothing. Parsing is kept in free-standing helpers over
//! `&str` so the whole pipeline is testable without a network.

use std::collections::HashSet;

use log::{debug, warn};
use scraper::{Html, Selector};

use crate::{Game, GameStatus, Team};

const UNRIVALED_URL: &str = "https://www.unrivaled.basketball";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Short club names as they appear in game-card text on the site.
const TEAM_NAMES: [&str; 8] = [
    "Breeze",
    "Hive",
    "Laces",
    "Lunar Owls",
    "Mist",
    "Phantom",
    "Rose",
    "Vinyl",
];

/// One game card lifted off the schedule page. Sides are in appearance
/// order: the first team named in the card is the home side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedGame {
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub is_live: bool,
    pub is_final: bool,
    pub game_url: String,
}

#[derive(Debug)]
pub struct LiveScoreScraper {
    client: reqwest::Client,
}

impl Default for LiveScoreScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveScoreScraper {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    pub async fn fetch_live_games(&self) -> Result<Vec<ScrapedGame>, reqwest::Error> {
        let html = self
            .client
            .get(UNRIVALED_URL)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let games = parse_games(&html);
        debug!("scraped {} game fragments from {}", games.len(), UNRIVALED_URL);
        Ok(games)
    }
}

/// Pull every game-card anchor out of the page, deduplicated by href.
pub fn parse_games(html: &str) -> Vec<ScrapedGame> {
    let Ok(selector) = Selector::parse(r#"a[href^="/game/"]"#) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut games = Vec::new();
    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !seen.insert(href.to_string()) {
            continue;
        }
        let text: String = anchor.text().collect::<Vec<_>>().join(" ");
        if let Some(game) = parse_game_text(&text, href) {
            games.push(game);
        }
    }
    games
}

/// Parse one card's flattened text. A card must name exactly two
/// distinct clubs; each club's score is the first digit run after its
/// name, defaulting to 0 when no digits follow (pre-game cards).
pub fn parse_game_text(text: &str, href: &str) -> Option<ScrapedGame> {
    let lower = text.to_lowercase();
    let is_live = lower.contains("live");
    let is_final = lower.contains("final");

    let mut matches: Vec<(usize, &str, u32)> = Vec::new();
    for name in TEAM_NAMES {
        let needle = name.to_lowercase();
        if let Some(pos) = lower.find(&needle) {
            let after = &lower[pos + needle.len()..];
            let score = first_digit_run(after).unwrap_or(0);
            matches.push((pos, name, score));
        }
    }

    if matches.len() != 2 {
        if !matches.is_empty() {
            warn!("discarding game fragment with {} team names", matches.len());
        }
        return None;
    }

    // Appearance order decides the sides: first named club is home.
    matches.sort_by_key(|(pos, _, _)| *pos);
    let (_, home, home_score) = matches[0];
    let (_, away, away_score) = matches[1];

    Some(ScrapedGame {
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_score,
        away_score,
        is_live,
        is_final,
        game_url: href.to_string(),
    })
}

/// First run of ASCII digits in `text`, skipping leading whitespace and
/// separators.
fn first_digit_run(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Resolve scraped cards against the league table. Cards naming a club
/// the table does not know are dropped.
pub fn convert_to_games(scraped: &[ScrapedGame]) -> Vec<Game> {
    scraped
        .iter()
        .filter_map(|s| {
            let home = Team::find_by_name(&s.home_team)?;
            let away = Team::find_by_name(&s.away_team)?;
            let status = if s.is_live {
                GameStatus::Live
            } else if s.is_final {
                GameStatus::Completed
            } else {
                GameStatus::Scheduled
            };
            Some(Game {
                // Stable per team pair, so later live updates can patch
                // the same game across polling cycles.
                id: format!("scraped_{}_{}", home.id, away.id),
                home_team: home.clone(),
                away_team: away.clone(),
                home_score: Some(s.home_score),
                away_score: Some(s.away_score),
                date: chrono::Utc::now(),
                has_valid_time: false,
                status,
                thumbnail_url: None,
                progress: s.is_live.then(|| "Live".to_string()),
            })
        })
        .collect()
}
