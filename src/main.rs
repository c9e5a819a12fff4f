use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mlb_daily_stats::cli_style::{
    format_rate, get_styles, print_empty_list, print_error, print_key_value,
    print_key_value_highlight, print_list_item, print_section_footer, print_section_header,
    print_success, print_warning, TableBuilder,
};
use mlb_daily_stats::config::{AppConfig, CliConfig, FileConfig};
use mlb_daily_stats::ingest::{DayStatus, FetchDriver, RangeReport};
use mlb_daily_stats::maintenance::{
    backfill_range, regenerate, remove_duplicate_pitch_events, RetentionSweeper, SweepReport,
};
use mlb_daily_stats::players::PlayerDirectory;
use mlb_daily_stats::provider::StatsApiClient;
use mlb_daily_stats::query::{PlayerListing, PlayerRole, QueryFacade, DEFAULT_LOOKBACK_DAYS};
use mlb_daily_stats::report::{daily_report, social_post, PlayerReport, StatLine};
use mlb_daily_stats::store::{
    format_date, parse_date, DateRange, SqliteStatsStore, StatsStore, StoreSummary,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

fn parse_date_arg(s: &str) -> Result<NaiveDate> {
    parse_date(s).with_context(|| format!("Invalid date {:?}, expected YYYY-MM-DD", s))
}

/// Keeps a rolling window of MLB pitch and player stats in SQLite.
#[derive(Parser, Debug)]
#[command(styles = get_styles(), version, about)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite stats database file.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Directory where reports are written.
    #[clap(long, value_parser = parse_path)]
    pub output_dir: Option<PathBuf>,

    /// Number of days of data to keep.
    #[clap(long)]
    pub retention_days: Option<u32>,

    /// Number of days fetched by `init` and `regenerate`.
    #[clap(long)]
    pub backfill_days: Option<u32>,

    /// Base URL of the MLB Stats API.
    #[clap(long)]
    pub stats_api_base_url: Option<String>,

    /// Timeout in seconds for Stats API requests.
    #[clap(long)]
    pub http_timeout_sec: Option<u64>,

    /// User agent sent to the Stats API.
    #[clap(long)]
    pub user_agent: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            output_dir: self.output_dir.clone(),
            retention_days: self.retention_days,
            backfill_days: self.backfill_days,
            stats_api_base_url: self.stats_api_base_url.clone(),
            http_timeout_sec: self.http_timeout_sec,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Backfills the window ending yesterday, then prunes older data.
    Init,

    /// Fetches yesterday's games, prunes old data and prints a summary.
    /// Meant to run once a day.
    Update,

    /// Fetches every day in an inclusive date range.
    Fetch {
        #[clap(long, value_parser = parse_date_arg)]
        from: NaiveDate,
        #[clap(long, value_parser = parse_date_arg)]
        to: NaiveDate,
    },

    /// Removes data older than the retention window.
    Prune,

    /// Removes duplicate pitch events, keeping the first stored row.
    Dedup,

    /// Wipes the database and refetches the backfill window.
    Regenerate {
        /// Required, since every stored row is deleted.
        #[clap(long)]
        yes: bool,
    },

    /// Shows what the database holds and the latest ledger entries.
    Summary {
        /// Number of ledger entries to show.
        #[clap(long, default_value_t = 10)]
        ledger: usize,
    },

    /// Lists players present in the pitch data.
    FindPlayers { term: Option<String> },

    /// Writes a JSON report for one player, e.g. "Judge, Aaron".
    PlayerReport {
        name: String,

        /// Days to look back from today.
        #[clap(long, default_value_t = DEFAULT_LOOKBACK_DAYS)]
        days: u32,
    },

    /// Identifies season leaders and writes the highlights post.
    DailyReport {
        /// Day the report is for. Defaults to yesterday.
        #[clap(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },
}

struct App {
    config: AppConfig,
    store: Arc<SqliteStatsStore>,
    client: Arc<StatsApiClient>,
    today: NaiveDate,
}

impl App {
    fn yesterday(&self) -> NaiveDate {
        self.today - Duration::days(1)
    }

    fn driver(&self) -> FetchDriver {
        FetchDriver::new(self.store.clone(), self.client.clone())
    }

    fn sweeper(&self) -> RetentionSweeper {
        RetentionSweeper::new(self.store.clone(), self.config.retention_days)
    }

    fn facade(&self) -> QueryFacade {
        QueryFacade::new(
            self.store.clone(),
            PlayerDirectory::new(self.client.clone()),
        )
    }
}

fn print_range_report(report: &RangeReport) {
    print_section_header("Fetch");
    for outcome in &report.outcomes {
        let date = format_date(outcome.date);
        match &outcome.status {
            DayStatus::Success { records } => {
                print_key_value(&date, &format!("{} pitches", records))
            }
            DayStatus::NoData => print_key_value(&date, "no games"),
            DayStatus::Failed { message } => print_error(&format!("{}: {}", date, message)),
        }
    }
    print_section_footer();

    let failed = report.failed().count();
    if failed > 0 {
        print_warning(&format!(
            "{} of {} days failed, rerun them with `fetch`",
            failed,
            report.outcomes.len()
        ));
    } else {
        print_success(&format!(
            "Stored {} pitch events over {} days",
            report.total_records(),
            report.outcomes.len()
        ));
    }
}

fn print_sweep_report(report: &SweepReport) {
    print_success(&format!(
        "Removed {} rows dated before {} ({} pitch events)",
        report.deleted.total(),
        format_date(report.cutoff),
        report.deleted.pitch_events
    ));
}

fn print_store_summary(summary: &StoreSummary) {
    print_section_header("Database");
    match (summary.oldest_date, summary.newest_date) {
        (Some(oldest), Some(newest)) => {
            print_key_value(
                "Date range",
                &format!("{} to {}", format_date(oldest), format_date(newest)),
            );
        }
        _ => print_empty_list("No pitch events stored"),
    }
    print_key_value("Days covered", &summary.days_covered.to_string());
    print_key_value_highlight("Total records", &summary.total_records.to_string());
    print_section_footer();
}

fn stat_line_cells(line: &StatLine) -> Vec<String> {
    match line {
        StatLine::Hitter {
            label,
            at_bats,
            hits,
            home_runs,
            avg,
            slg,
        } => vec![
            label.clone(),
            at_bats.to_string(),
            hits.to_string(),
            home_runs.to_string(),
            format!("{:.3}", avg),
            format!("{:.3}", slg),
        ],
        StatLine::Pitcher {
            label,
            innings,
            strikeouts,
            pitches,
        } => vec![
            label.clone(),
            format!("{:.1}", innings),
            strikeouts.to_string(),
            pitches.to_string(),
        ],
    }
}

fn print_player_report(report: &PlayerReport) {
    print_section_header(&report.info.name);
    print_key_value("Position", &format!("{:?}", report.info.position));
    print_key_value("Team", report.info.team.as_deref().unwrap_or("-"));
    print_key_value(
        "Bats/Throws",
        &format!(
            "{}/{}",
            report.info.bats.as_deref().unwrap_or("-"),
            report.info.throws.as_deref().unwrap_or("-")
        ),
    );
    print_section_footer();

    let headers: &[&str] = match report.window_total {
        StatLine::Hitter { .. } => &["Games", "AB", "H", "HR", "AVG", "SLG"],
        StatLine::Pitcher { .. } => &["Games", "IP", "K", "Pitches"],
    };
    let mut table = TableBuilder::new(headers);
    for line in report.recent_games.iter().chain([&report.window_total]) {
        table.add_row(stat_line_cells(line));
    }
    table.print();

    let metrics = &report.metrics;
    print_section_header("Key metrics");
    print_key_value("Avg exit velocity", &format_rate(metrics.avg_exit_velocity, 1));
    print_key_value("Barrel rate %", &format_rate(metrics.barrel_rate, 1));
    print_key_value("Avg velocity", &format_rate(metrics.avg_velocity, 1));
    print_key_value("Avg spin rate", &format_rate(metrics.avg_spin_rate, 0));
    for (pitch, rate) in &metrics.whiff_rate_by_pitch {
        print_list_item(&format!("{} whiff rate: {:.1}%", pitch, rate), 1);
    }
    print_section_footer();
}

fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Init => {
            let range = backfill_range(app.today, app.config.backfill_days);
            info!(
                "Initializing database with {} days from {} to {}",
                range.len(),
                format_date(range.start),
                format_date(range.end)
            );
            let report = app.driver().fetch_range(range);
            print_range_report(&report);
            print_sweep_report(&app.sweeper().sweep(app.today)?);
            print_store_summary(&app.store.summary()?);
        }
        Command::Update => {
            let yesterday = app.yesterday();
            info!("Daily update for {}", format_date(yesterday));
            let outcome = app.driver().fetch_day(yesterday);
            print_range_report(&RangeReport {
                outcomes: vec![outcome],
            });
            print_sweep_report(&app.sweeper().sweep(app.today)?);
            print_store_summary(&app.store.summary()?);
        }
        Command::Fetch { from, to } => {
            if from > to {
                bail!(
                    "--from {} is after --to {}",
                    format_date(from),
                    format_date(to)
                );
            }
            let report = app.driver().fetch_range(DateRange::new(from, to));
            print_range_report(&report);
        }
        Command::Prune => {
            print_sweep_report(&app.sweeper().sweep(app.today)?);
        }
        Command::Dedup => {
            let removed = remove_duplicate_pitch_events(app.store.as_ref())?;
            print_success(&format!("Removed {} duplicate pitch events", removed));
        }
        Command::Regenerate { yes } => {
            if !yes {
                print_warning("Regeneration deletes every stored row. Pass --yes to proceed.");
                return Ok(());
            }
            let report = regenerate(
                app.store.clone(),
                &app.driver(),
                app.today,
                app.config.backfill_days,
            )?;
            print_range_report(&report.fetch);
            print_store_summary(&report.summary);
        }
        Command::Summary { ledger } => {
            print_store_summary(&app.store.summary()?);
            let updates = app.facade().latest_updates(ledger)?;
            let mut table = TableBuilder::new(&["Data date", "Updated", "Records", "Status"]);
            // Oldest first on screen
            for entry in updates.iter().rev() {
                table.add_row(vec![
                    format_date(entry.data_date),
                    format_date(entry.update_date),
                    entry.records_added.to_string(),
                    entry.status.to_string(),
                ]);
            }
            if table.is_empty() {
                print_empty_list("No updates recorded");
            } else {
                table.print();
            }
        }
        Command::FindPlayers { term } => {
            let listing = app.facade().available_players(term.as_deref())?;
            match &listing {
                PlayerListing::Classified(players) => {
                    let mut table = TableBuilder::new(&["Player Name", "Type", "ID"]);
                    for p in players {
                        table.add_row(vec![p.name.clone(), p.role.to_string(), p.id.to_string()]);
                    }
                    table.print();
                    let count = |role: PlayerRole| players.iter().filter(|p| p.role == role).count();
                    print_key_value_highlight("Total", &players.len().to_string());
                    print_key_value("Hitters", &count(PlayerRole::Hitter).to_string());
                    print_key_value("Pitchers", &count(PlayerRole::Pitcher).to_string());
                    print_key_value("Two-way", &count(PlayerRole::TwoWay).to_string());
                }
                PlayerListing::PitchersOnly(pitchers) => {
                    print_warning("Player directory unavailable, showing pitchers only");
                    let mut table = TableBuilder::new(&["Player Name", "Pitches"]);
                    for (name, count) in pitchers {
                        table.add_row(vec![name.clone(), count.to_string()]);
                    }
                    table.print();
                    print_key_value_highlight("Total", &pitchers.len().to_string());
                }
            }
            if listing.is_empty() {
                print_empty_list("No players found");
            }
        }
        Command::PlayerReport { name, days } => {
            let facade = app.facade();
            let player = facade.resolve(&name);
            let range = DateRange::window_ending(app.today, days);
            let data = facade.player_data(&player, Some(range), app.today)?;
            match PlayerReport::build(&data) {
                Some(report) => {
                    print_player_report(&report);
                    let path = report.write_json(&app.config.output_dir)?;
                    print_success(&format!("Report written to {:?}", path));
                }
                None => {
                    print_warning(&format!("No pitch data found for {}", player));
                    print_list_item("Try `find-players` to list available names", 1);
                }
            }
        }
        Command::DailyReport { date } => {
            let date = date.unwrap_or_else(|| app.yesterday());
            let report = daily_report(app.client.as_ref(), date, &app.config.output_dir)?;
            if report.top.is_empty() {
                print_warning("No season stats available, the post has no highlights");
            }
            println!("{}", social_post(report.date, &report.top));
            print_success(&format!("Post written to {:?}", report.post_path));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening SQLite stats database at {:?}...", config.db_path);
    let store = Arc::new(SqliteStatsStore::new(&config.db_path)?);
    let client = Arc::new(StatsApiClient::new(
        &config.stats_api_base_url,
        &config.user_agent,
        config.http_timeout(),
    )?);

    let app = App {
        config,
        store,
        client,
        today: Local::now().date_naive(),
    };
    run(&app, cli_args.command)
}
