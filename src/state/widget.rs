//! JSON snapshot files consumed by out-of-process widget surfaces.
//! The store only ever writes the current encoding, but keeps reading
//! the older one where a team was a bare name string.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use unrivaled_api::{Game, Team};

pub const RECENT_LIMIT: usize = 5;

const UPCOMING_FILE: &str = "upcoming_games.json";
const RECENT_FILE: &str = "recent_results.json";
const FAVORITE_FILE: &str = "favorite_team.json";
const LAST_UPDATE_FILE: &str = "last_update.json";

/// A team reference in a snapshot: either the structured object or the
/// bare club name older snapshots carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeamRef {
    Full(Team),
    Name(String),
}

impl TeamRef {
    pub fn name(&self) -> &str {
        match self {
            TeamRef::Full(team) => &team.name,
            TeamRef::Name(name) => name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotGame {
    pub id: String,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WidgetStore {
    dir: PathBuf,
}

impl WidgetStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn save_upcoming(&self, games: &[Game]) -> io::Result<()> {
        self.write_json(UPCOMING_FILE, &snapshot_of(games))?;
        self.write_json(LAST_UPDATE_FILE, &Utc::now())
    }

    pub fn load_upcoming(&self) -> Vec<SnapshotGame> {
        self.read_json(UPCOMING_FILE).unwrap_or_default()
    }

    pub fn save_recent(&self, games: &[Game]) -> io::Result<()> {
        self.write_json(RECENT_FILE, &snapshot_of(games))
    }

    pub fn load_recent(&self) -> Vec<SnapshotGame> {
        self.read_json(RECENT_FILE).unwrap_or_default()
    }

    pub fn favorite_team_id(&self) -> Option<String> {
        self.read_json::<Option<String>>(FAVORITE_FILE).flatten()
    }

    pub fn set_favorite_team_id(&self, team_id: Option<&str>) -> io::Result<()> {
        self.write_json(FAVORITE_FILE, &team_id)
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.read_json(LAST_UPDATE_FILE)
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let body = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
        fs::write(self.dir.join(file), body)
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.dir.join(file);
        let body = fs::read(&path).ok()?;
        match serde_json::from_slice(&body) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("ignoring unreadable snapshot {}: {e}", path.display());
                None
            }
        }
    }
}

fn snapshot_of(games: &[Game]) -> Vec<SnapshotGame> {
    games
        .iter()
        .map(|g| SnapshotGame {
            id: g.id.clone(),
            home_team: TeamRef::Full(g.home_team.clone()),
            away_team: TeamRef::Full(g.away_team.clone()),
            home_score: g.home_score,
            away_score: g.away_score,
            date: g.date,
        })
        .collect()
}
