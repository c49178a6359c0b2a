//! Raw TheSportsDB wire types. Every payload list is optional: the API
//! returns `null` instead of an empty array, and that must decode as
//! "no data", not an error.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsResponse {
    pub events: Option<Vec<ApiEvent>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LivescoreResponse {
    pub livescores: Option<Vec<ApiEvent>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamsResponse {
    pub teams: Option<Vec<ApiTeam>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableResponse {
    pub table: Option<Vec<ApiStanding>>,
}

/// One event record. Scores and dates are strings on the wire, and any
/// field can be missing, so everything is optional and parsing happens
/// in the mapping layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEvent {
    #[serde(rename = "idEvent")]
    pub id_event: Option<String>,
    #[serde(rename = "strEvent")]
    pub str_event: Option<String>,
    #[serde(rename = "strHomeTeam")]
    pub str_home_team: Option<String>,
    #[serde(rename = "strAwayTeam")]
    pub str_away_team: Option<String>,
    #[serde(rename = "idHomeTeam")]
    pub id_home_team: Option<String>,
    #[serde(rename = "idAwayTeam")]
    pub id_away_team: Option<String>,
    #[serde(rename = "intHomeScore")]
    pub int_home_score: Option<String>,
    #[serde(rename = "intAwayScore")]
    pub int_away_score: Option<String>,
    #[serde(rename = "dateEvent")]
    pub date_event: Option<String>,
    #[serde(rename = "strTime")]
    pub str_time: Option<String>,
    #[serde(rename = "strTimestamp")]
    pub str_timestamp: Option<String>,
    #[serde(rename = "strThumb")]
    pub str_thumb: Option<String>,
    #[serde(rename = "strStatus")]
    pub str_status: Option<String>,
    #[serde(rename = "strProgress")]
    pub str_progress: Option<String>,
    #[serde(rename = "strHomeTeamBadge")]
    pub str_home_team_badge: Option<String>,
    #[serde(rename = "strAwayTeamBadge")]
    pub str_away_team_badge: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiTeam {
    #[serde(rename = "idTeam")]
    pub id_team: Option<String>,
    #[serde(rename = "strTeam")]
    pub str_team: Option<String>,
    #[serde(rename = "strTeamBadge")]
    pub str_team_badge: Option<String>,
    #[serde(rename = "strTeamLogo")]
    pub str_team_logo: Option<String>,
    #[serde(rename = "strDescriptionEN")]
    pub str_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiStanding {
    #[serde(rename = "idStanding")]
    pub id_standing: Option<String>,
    #[serde(rename = "strTeam")]
    pub str_team: Option<String>,
    #[serde(rename = "intPlayed")]
    pub int_played: Option<String>,
    #[serde(rename = "intWin")]
    pub int_win: Option<String>,
    #[serde(rename = "intLoss")]
    pub int_loss: Option<String>,
    #[serde(rename = "intPoints")]
    pub int_points: Option<String>,
    #[serde(rename = "strTeamBadge")]
    pub str_team_badge: Option<String>,
}

/// Standings counters default to zero when absent or malformed.
pub fn parse_or_zero(field: Option<&str>) -> u32 {
    field.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_event_list_decodes_as_empty() {
        let body = r#"{"events": null}"#;
        let parsed: EventsResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.events.is_none());
    }

    #[test]
    fn event_fields_tolerate_absence() {
        let body = r#"{"events": [{"idEvent": "2070034"}]}"#;
        let parsed: EventsResponse = serde_json::from_str(body).unwrap();
        let events = parsed.events.unwrap();
        assert_eq!(events[0].id_event.as_deref(), Some("2070034"));
        assert!(events[0].str_home_team.is_none());
    }

    #[test]
    fn parse_or_zero_collapses_bad_input() {
        assert_eq!(parse_or_zero(Some("12")), 12);
        assert_eq!(parse_or_zero(Some(" 7 ")), 7);
        assert_eq!(parse_or_zero(Some("n/a")), 0);
        assert_eq!(parse_or_zero(None), 0);
    }
}
