mod state;

use std::sync::Arc;

use env_logger::Env;
use log::error;
use tokio::sync::mpsc;
use unrivaled_api::client::UnrivaledApi;
use unrivaled_api::keys::ApiKeyStore;
use unrivaled_api::{Game, Standing, Team};

use crate::state::app_settings::AppSettings;
use crate::state::app_state::GamesState;
use crate::state::messages::{NetworkRequest, NetworkResponse};
use crate::state::network::NetworkWorker;
use crate::state::refresher::{LivePoller, LivePollerHandle};
use crate::state::widget::WidgetStore;

#[derive(Debug, Default)]
struct CliOptions {
    watch: bool,
    refresh: bool,
    standings: bool,
    favorite: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(options) = parse_cli_args() else {
        return Ok(());
    };

    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let settings = AppSettings::load();
    let keys = ApiKeyStore::new(&settings.api_key);
    let widgets = WidgetStore::new(settings.data_dir.clone());

    if let Some(name) = &options.favorite {
        let Some(team) = Team::find_by_name(name) else {
            eprintln!("Unknown team: {name}");
            std::process::exit(2);
        };
        widgets.set_favorite_team_id(Some(&team.id))?;
        println!("Favorite team set to {}.", team.name);
        return Ok(());
    }

    let api = Arc::new(UnrivaledApi::new(keys));

    if options.standings {
        let table = api
            .fetch_standings()
            .await
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        print_standings(&table);
        return Ok(());
    }

    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, mut network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    let worker = NetworkWorker::new(api, widgets.clone(), network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(worker.run());

    let mut games = GamesState {
        favorite_team_id: widgets.favorite_team_id(),
        is_loading: true,
        ..GamesState::default()
    };

    let initial = if options.refresh {
        NetworkRequest::RefreshGames
    } else {
        NetworkRequest::LoadGames
    };
    network_req_tx.send(initial).await?;

    let mut poller: Option<LivePollerHandle> = None;

    while let Some(response) = network_resp_rx.recv().await {
        match response {
            NetworkResponse::GamesLoaded { games: all, live } => {
                games.on_games_loaded(all, live);
                print_schedule(&games);

                if !options.watch {
                    break;
                }
                if games.live_games.is_empty() {
                    println!("No live games right now.");
                    break;
                }
                if let Some(old) = poller.take() {
                    old.stop().await;
                }
                poller = Some(LivePoller::spawn(network_req_tx.clone()));
            }
            NetworkResponse::LiveUpdated { live } => {
                games.on_live_updated(live);
                print_live(&games);

                if games.live_games.is_empty() {
                    println!("No more live games.");
                    break;
                }
            }
            NetworkResponse::Error { message } => {
                error!("Network error: {message}");
                games.on_error(message.clone());
                eprintln!("Error: {message}");
                // Poll-cycle failures keep the poller alive; without
                // one there is nothing left to wait for.
                if poller.is_none() {
                    break;
                }
            }
        }
    }

    if let Some(poller) = poller.take() {
        poller.stop().await;
    }
    network_task.abort();

    Ok(())
}

fn parse_cli_args() -> Option<CliOptions> {
    let mut options = CliOptions::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage_text());
                return None;
            }
            "-V" | "--version" => {
                println!("unrivaled {}", env!("CARGO_PKG_VERSION"));
                return None;
            }
            "-w" | "--watch" => options.watch = true,
            "--refresh" => options.refresh = true,
            "--standings" => options.standings = true,
            "--favorite" => {
                let Some(team) = args.next() else {
                    eprintln!("--favorite needs a team name\n\n{}", usage_text());
                    std::process::exit(2);
                };
                options.favorite = Some(team);
            }
            _ => {
                eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
                std::process::exit(2);
            }
        }
    }

    Some(options)
}

fn usage_text() -> &'static str {
    "unrivaled - Unrivaled basketball schedule, results and live scores

Usage:
  unrivaled
  unrivaled --watch
  unrivaled --standings
  unrivaled --favorite <team>

Options:
  -w, --watch        Keep polling live scores every 30 seconds
      --refresh      Clear cached data and reload everything
      --standings    Print the league table and exit
      --favorite     Remember a favorite team (full or short name)
  -h, --help         Show this help
  -V, --version      Show the version

Environment:
  UNRIVALED_API_KEY   TheSportsDB API key (premium keys unlock live scores)
  UNRIVALED_DATA_DIR  Directory for widget snapshot files (default .unrivaled)
  RUST_LOG            Log filter (default warn)"
}

fn format_game(game: &Game) -> String {
    let matchup = format!(
        "{} {} {}",
        game.home_team.short_name(),
        game.score_display(),
        game.away_team.short_name()
    );
    if game.is_live() {
        let progress = game.progress.as_deref().unwrap_or("Live");
        format!("  {matchup}  [{progress}]")
    } else if game.is_completed() {
        format!("  {matchup}  ({})", game.date_display())
    } else {
        format!("  {matchup}  {} {}", game.date_display(), game.time_display())
    }
}

fn print_section(title: &str, games: &[&Game]) {
    println!("{title}");
    if games.is_empty() {
        println!("  (none)");
    }
    for game in games {
        println!("{}", format_game(game));
    }
}

fn print_schedule(games: &GamesState) {
    if !games.live_games.is_empty() {
        let live: Vec<&Game> = games.live_games.iter().collect();
        print_section("Live now:", &live);
        println!();
    }

    let upcoming = games.favorite_upcoming();
    print_section("Upcoming:", &upcoming[..upcoming.len().min(10)]);
    println!();

    let results = games.favorite_results();
    print_section("Recent results:", &results[..results.len().min(10)]);
}

fn print_live(games: &GamesState) {
    let live: Vec<&Game> = games.live_games.iter().collect();
    if !live.is_empty() {
        print_section("Live now:", &live);
    }
}

fn print_standings(table: &[Standing]) {
    if table.is_empty() {
        println!("No standings available.");
        return;
    }
    println!("{:<18} {:>3} {:>3} {:>3} {:>4}", "Team", "P", "W", "L", "Pts");
    for row in table {
        println!(
            "{:<18} {:>3} {:>3} {:>3} {:>4}",
            row.team_name, row.played, row.wins, row.losses, row.points
        );
    }
}
