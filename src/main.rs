use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};

use coaster_book::aggregate::{
    group_coasters, highlights, last_change, leaderboards, ranked_rows, unranked, GroupBy,
    GroupOptions, SortDirection, SortKey,
};
use coaster_book::catalog::{
    add_coaster, add_manufacturer, add_park, resolve_coaster, resolve_manufacturer, resolve_park,
    update_coaster, update_manufacturer, update_park, Change, CoasterDraft, ParkDraft,
};
use coaster_book::config::{settings, Config};
use coaster_book::error::ValidationError;
use coaster_book::model::{DataFile, MAIN_LIST};
use coaster_book::output;
use coaster_book::ranking::{self, Direction};
use coaster_book::scoring::{breakdown, points_table, validate_scoring, ScoringConfig};
use coaster_book::session::{Session, SessionError};
use coaster_book::store::{Gateway, StoreError};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the ranked list with points (default if no subcommand)
    Rankings {
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
        /// Also list coasters that are not ranked yet
        #[arg(long)]
        unranked: bool,
    },
    /// Podiums and quick stats
    Home,
    /// Coasters grouped by park or manufacturer
    Coasters {
        #[arg(long, default_value = "park")]
        by: GroupBy,
        /// Leave out coasters whose park or manufacturer is missing
        #[arg(long)]
        hide_unassigned: bool,
    },
    /// Park and manufacturer leaderboards
    Stats {
        /// total, avg, count or top3
        #[arg(long, default_value = "total")]
        sort: SortKey,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
        /// Leave unranked coasters out of counts and averages
        #[arg(long)]
        ranked_only: bool,
    },
    /// Interactive ranking editor
    Edit,
    /// Change the ranked list
    #[command(subcommand)]
    Rank(RankCommand),
    /// Manage parks
    #[command(subcommand)]
    Park(ParkCommand),
    /// Manage manufacturers
    #[command(subcommand)]
    Manufacturer(ManufacturerCommand),
    /// Manage coasters
    #[command(subcommand)]
    Coaster(CoasterCommand),
    /// Show or change config values
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Create a config file interactively
    Init,
    /// Forget the GitHub token stored in the system keyring
    Logout,
    /// Open the data file on GitHub
    Open,
    /// Show the points each position earns in a list of the given size
    Points {
        total: usize,
        /// Explain how this position's points are computed
        #[arg(long)]
        position: Option<i64>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Tsv,
}

#[derive(Subcommand, Debug)]
enum RankCommand {
    /// Append a coaster to the bottom of the list
    Add { coaster: String },
    /// Take a coaster off the list
    Remove { coaster: String },
    /// Move a coaster to a 1-based position
    Move { coaster: String, position: usize },
    /// Move a coaster up one slot
    Up { coaster: String },
    /// Move a coaster down one slot
    Down { coaster: String },
}

#[derive(Subcommand, Debug)]
enum ParkCommand {
    Add {
        name: String,
        #[arg(long)]
        country: Option<String>,
    },
    /// Edit a park by id or name
    Edit {
        park: String,
        #[arg(long)]
        name: Option<String>,
        /// New country; "none" clears it
        #[arg(long)]
        country: Option<String>,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum ManufacturerCommand {
    Add {
        name: String,
    },
    /// Rename a manufacturer by id or name
    Edit {
        manufacturer: String,
        #[arg(long)]
        name: String,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum CoasterCommand {
    Add {
        name: String,
        /// Park id or name
        #[arg(long)]
        park: String,
        /// Manufacturer id or name
        #[arg(long)]
        manufacturer: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit a coaster by id or name
    Edit {
        coaster: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        park: Option<String>,
        /// Manufacturer id or name; "none" clears it
        #[arg(long)]
        manufacturer: Option<String>,
        /// "none" clears the notes
        #[arg(long)]
        notes: Option<String>,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    /// Set one value, e.g. `settings set store.owner alice`
    Set { key: String, value: String },
}

#[derive(Parser, Debug)]
#[command(name = "coasterbook")]
#[command(about = "Roller coaster rankings backed by a JSON file on GitHub", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/coasterbook/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // rustls 0.23+ needs a process-wide crypto provider
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        log::debug!("rustls crypto provider already installed");
    }

    let cli = Cli::parse();
    coaster_book::stderr_buffer::init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Rankings {
        format: Format::Table,
        unranked: false,
    });
    let config_path = cli.config.map(PathBuf::from);
    let start_time = Instant::now();

    // Commands that work without a config file
    match command {
        Commands::Init => {
            if let Err(e) = coaster_book::config::init::run_init_wizard(config_path) {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Logout => {
            match coaster_book::credentials::delete_token().await {
                Ok(()) => println!("Token removed from the system keyring."),
                Err(e) => {
                    eprintln!("Credential error: {}", e);
                    std::process::exit(EXIT_AUTH);
                }
            }
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Settings(cmd) => {
            run_settings(cmd, config_path);
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Points { total, position } => {
            let config = match coaster_book::config::load_config_or_default(config_path) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Config error: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            };
            let scoring = checked_scoring(&config);
            run_points(total, position, &scoring);
            std::process::exit(EXIT_SUCCESS);
        }
        _ => {}
    }

    let config = match coaster_book::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    let scoring = checked_scoring(&config);

    if let Commands::Open = command {
        run_open(&config);
        std::process::exit(EXIT_SUCCESS);
    }

    let mut session = open_session(&config).await;
    log::info!(
        "loaded {} coasters at revision {} in {:?}",
        session.document().coasters.len(),
        session.revision(),
        start_time.elapsed()
    );

    let use_colors = output::should_use_colors();

    match command {
        Commands::Rankings { format, unranked: show_unranked } => {
            let doc = session.document();
            let rows = ranked_rows(doc, MAIN_LIST, &scoring);
            match format {
                Format::Table => println!("{}", output::format_rankings_table(&rows, use_colors)),
                Format::Tsv => println!("{}", output::format_rankings_tsv(&rows)),
            }
            if show_unranked {
                let rest = unranked(doc, MAIN_LIST);
                println!();
                println!("{}", output::format_unranked(doc, &rest, use_colors));
            }
        }
        Commands::Home => {
            let doc = session.document();
            let view = highlights(doc, MAIN_LIST, &scoring, 3);
            println!("{}", output::format_highlights(&view, use_colors));
            if let Some(latest) = last_change(doc, MAIN_LIST) {
                println!("Last ranking change {}", output::format_age(Utc::now() - latest));
            }
        }
        Commands::Coasters { by, hide_unassigned } => {
            let doc = session.document();
            let points = coaster_book::aggregate::coaster_points(doc, Some(MAIN_LIST), &scoring);
            let options = GroupOptions {
                include_unassigned: !hide_unassigned,
                ..GroupOptions::browse()
            };
            let mut groups = group_coasters(doc, &points, by, options);
            groups.sort_by(coaster_book::aggregate::groups::default_order);
            println!("{}", output::format_groups(&groups, use_colors));
        }
        Commands::Stats {
            sort,
            asc,
            ranked_only,
        } => {
            let direction = if asc {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            };
            let options = GroupOptions {
                include_unranked: !ranked_only,
                include_unassigned: false,
            };
            let boards = leaderboards(
                session.document(),
                MAIN_LIST,
                &scoring,
                options,
                sort,
                direction,
            );
            println!(
                "{}",
                output::format_group_table("Parks", &boards.parks, use_colors)
            );
            println!();
            println!(
                "{}",
                output::format_group_table("Manufacturers", &boards.manufacturers, use_colors)
            );
            println!();
            println!("{} ranked coasters", boards.ranked);
        }
        Commands::Edit => {
            let colors = coaster_book::tui::resolve_theme(config.theme).colors();
            let app = coaster_book::tui::App::new(session, scoring, MAIN_LIST, colors);
            if let Err(e) = coaster_book::tui::run_tui(app).await {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_NETWORK);
            }
        }
        Commands::Rank(cmd) => run_rank(&mut session, cmd).await,
        Commands::Park(cmd) => run_park(&mut session, cmd, use_colors).await,
        Commands::Manufacturer(cmd) => run_manufacturer(&mut session, cmd, use_colors).await,
        Commands::Coaster(cmd) => run_coaster(&mut session, cmd, use_colors).await,
        Commands::Init
        | Commands::Logout
        | Commands::Settings(_)
        | Commands::Points { .. }
        | Commands::Open => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Scoring settings with defaults, exiting on invalid values.
fn checked_scoring(config: &Config) -> ScoringConfig {
    let scoring = config.scoring();
    if let Err(errors) = validate_scoring(&scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    scoring
}

fn store_exit_code(err: &StoreError) -> i32 {
    match err {
        StoreError::Config(_) => EXIT_CONFIG,
        StoreError::Transport {
            status: Some(401 | 403),
            ..
        } => EXIT_AUTH,
        _ => EXIT_NETWORK,
    }
}

fn exit_with(err: &SessionError) -> ! {
    eprintln!("Error: {}", err);
    match err {
        SessionError::Validation(_) => std::process::exit(EXIT_CONFIG),
        SessionError::Store(e) => {
            if let Some(hint) = e.hint() {
                eprintln!("  {}", hint);
            }
            std::process::exit(store_exit_code(e));
        }
    }
}

fn build_gateway(config: &Config, token: Option<String>) -> Gateway {
    match Gateway::from_config(&config.store, token) {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("Store error: {}", e);
            std::process::exit(store_exit_code(&e));
        }
    }
}

/// Load the data file. Direct GitHub access needs a token; a rejected
/// token is re-prompted once.
async fn open_session(config: &Config) -> Session<Gateway> {
    let direct = match Gateway::requires_token(&config.store) {
        Ok(direct) => direct,
        Err(e) => {
            eprintln!("Store error: {}", e);
            std::process::exit(store_exit_code(&e));
        }
    };

    let token = if direct {
        match coaster_book::credentials::resolve_token().await {
            Ok(t) => Some(t),
            Err(e) => {
                eprintln!("Credential error: {:#}", e);
                std::process::exit(EXIT_AUTH);
            }
        }
    } else {
        None
    };

    match Session::open(build_gateway(config, token)).await {
        Ok(session) => session,
        Err(SessionError::Store(StoreError::Transport {
            status: Some(401), ..
        })) if direct => {
            let token = match coaster_book::credentials::reprompt_for_token().await {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("Re-auth cancelled: {:#}", e);
                    std::process::exit(EXIT_AUTH);
                }
            };
            Session::open(build_gateway(config, Some(token)))
                .await
                .unwrap_or_else(|e| exit_with(&e))
        }
        Err(e) => exit_with(&e),
    }
}

/// Save a mutation and report it.
async fn commit<F>(session: &mut Session<Gateway>, mutator: F)
where
    F: FnOnce(&mut DataFile) -> Result<Change, ValidationError>,
{
    match session.commit(mutator).await {
        Ok(Some(change)) => println!("Saved: {} ({})", change.message, session.revision()),
        Ok(None) => println!("Nothing to change."),
        Err(e) => exit_with(&e),
    }
}

/// Id of the coaster named by `key`, looked up by id or name.
fn coaster_id(doc: &DataFile, key: &str) -> Result<String, ValidationError> {
    resolve_coaster(doc, key).map(|c| c.id.clone())
}

/// "none" (any case) or blank means clear the value.
fn clearable(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_string())
    }
}

async fn run_rank(session: &mut Session<Gateway>, cmd: RankCommand) {
    let now = Utc::now();
    match cmd {
        RankCommand::Add { coaster } => {
            commit(session, |d| {
                let id = coaster_id(d, &coaster)?;
                ranking::rank_coaster(d, MAIN_LIST, &id, now)
            })
            .await
        }
        RankCommand::Remove { coaster } => {
            commit(session, |d| {
                let id = coaster_id(d, &coaster)?;
                ranking::unrank_coaster(d, MAIN_LIST, &id)
            })
            .await
        }
        RankCommand::Move { coaster, position } => {
            commit(session, |d| {
                let id = coaster_id(d, &coaster)?;
                let from = ranking::position_of(d, MAIN_LIST, &id)
                    .ok_or_else(|| ValidationError::NotRanked(coaster.clone()))?;
                let len = ranking::ordered_list(d, MAIN_LIST).len();
                if position == 0 || position > len {
                    return Err(ValidationError::IndexOutOfRange {
                        index: position,
                        len,
                    });
                }
                ranking::reorder(d, MAIN_LIST, from, position - 1, now)
            })
            .await
        }
        RankCommand::Up { coaster } => {
            commit(session, |d| {
                let id = coaster_id(d, &coaster)?;
                ranking::step(d, MAIN_LIST, &id, Direction::Up, now)
            })
            .await
        }
        RankCommand::Down { coaster } => {
            commit(session, |d| {
                let id = coaster_id(d, &coaster)?;
                ranking::step(d, MAIN_LIST, &id, Direction::Down, now)
            })
            .await
        }
    }
}

async fn run_park(session: &mut Session<Gateway>, cmd: ParkCommand, use_colors: bool) {
    match cmd {
        ParkCommand::Add { name, country } => {
            commit(session, |d| add_park(d, &ParkDraft { name, country })).await
        }
        ParkCommand::Edit {
            park,
            name,
            country,
        } => {
            commit(session, |d| {
                let current = resolve_park(d, &park)?.clone();
                let draft = ParkDraft {
                    name: name.unwrap_or(current.name),
                    country: match country {
                        Some(value) => clearable(&value),
                        None => current.country,
                    },
                };
                update_park(d, &current.id, &draft)
            })
            .await
        }
        ParkCommand::List => {
            let doc = session.document();
            let records = doc.parks.iter().map(|p| {
                let count = doc.coasters.iter().filter(|c| c.park_id == p.id).count();
                let detail = match &p.country {
                    Some(country) => format!("{} · {} coasters", country, count),
                    None => format!("{} coasters", count),
                };
                (p.name.as_str(), p.id.as_str(), detail)
            });
            println!("{}", output::format_catalog(records, use_colors));
        }
    }
}

async fn run_manufacturer(
    session: &mut Session<Gateway>,
    cmd: ManufacturerCommand,
    use_colors: bool,
) {
    match cmd {
        ManufacturerCommand::Add { name } => commit(session, |d| add_manufacturer(d, &name)).await,
        ManufacturerCommand::Edit { manufacturer, name } => {
            commit(session, |d| {
                let id = resolve_manufacturer(d, &manufacturer)?.id.clone();
                update_manufacturer(d, &id, &name)
            })
            .await
        }
        ManufacturerCommand::List => {
            let doc = session.document();
            let records = doc.manufacturers.iter().map(|m| {
                let count = doc
                    .coasters
                    .iter()
                    .filter(|c| c.manufacturer_id.as_deref() == Some(m.id.as_str()))
                    .count();
                (m.name.as_str(), m.id.as_str(), format!("{} coasters", count))
            });
            println!("{}", output::format_catalog(records, use_colors));
        }
    }
}

async fn run_coaster(session: &mut Session<Gateway>, cmd: CoasterCommand, use_colors: bool) {
    match cmd {
        CoasterCommand::Add {
            name,
            park,
            manufacturer,
            notes,
        } => {
            commit(session, |d| {
                let park_id = resolve_park(d, &park)?.id.clone();
                let manufacturer_id = match manufacturer.as_deref() {
                    Some(key) => Some(resolve_manufacturer(d, key)?.id.clone()),
                    None => None,
                };
                add_coaster(
                    d,
                    &CoasterDraft {
                        name,
                        park_id,
                        manufacturer_id,
                        notes,
                    },
                )
            })
            .await
        }
        CoasterCommand::Edit {
            coaster,
            name,
            park,
            manufacturer,
            notes,
        } => {
            commit(session, |d| {
                let current = resolve_coaster(d, &coaster)?.clone();
                let park_id = match park.as_deref() {
                    Some(key) => resolve_park(d, key)?.id.clone(),
                    None => current.park_id,
                };
                let manufacturer_id = match manufacturer.as_deref().map(clearable) {
                    Some(Some(key)) => Some(resolve_manufacturer(d, &key)?.id.clone()),
                    Some(None) => None,
                    None => current.manufacturer_id,
                };
                let draft = CoasterDraft {
                    name: name.unwrap_or(current.name),
                    park_id,
                    manufacturer_id,
                    notes: match notes {
                        Some(value) => clearable(&value),
                        None => current.notes,
                    },
                };
                update_coaster(d, &current.id, &draft)
            })
            .await
        }
        CoasterCommand::List => {
            let doc = session.document();
            let records = doc.coasters.iter().map(|c| {
                let park = doc.park_of(c).map_or("No Park", |p| p.name.as_str());
                let manufacturer = doc
                    .manufacturer_of(c)
                    .map_or("No Manufacturer", |m| m.name.as_str());
                let ranked = match ranking::position_of(doc, MAIN_LIST, &c.id) {
                    Some(i) => format!(" · #{}", i + 1),
                    None => String::new(),
                };
                (
                    c.name.as_str(),
                    c.id.as_str(),
                    format!("{} · {}{}", park, manufacturer, ranked),
                )
            });
            println!("{}", output::format_catalog(records, use_colors));
        }
    }
}

fn run_settings(cmd: SettingsCommand, config_path: Option<PathBuf>) {
    let path = config_path.unwrap_or_else(coaster_book::config::get_config_path);
    let mut config = match coaster_book::config::load_config_or_default(Some(path.clone())) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    match cmd {
        SettingsCommand::Show => {
            println!("# {}", path.display());
            for (key, value) in settings::describe(&config) {
                println!("{} = {}", key, value);
            }
        }
        SettingsCommand::Set { key, value } => {
            if let Err(e) = settings::set_value(&mut config, &key, &value) {
                eprintln!("{}", e);
                std::process::exit(EXIT_CONFIG);
            }
            if let Err(e) = coaster_book::config::save_config(&path, &config) {
                eprintln!("Failed to save config: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            println!("Set {} in {}", key, path.display());
        }
    }
}

fn run_points(total: usize, position: Option<i64>, scoring: &ScoringConfig) {
    match position {
        Some(position) => match breakdown(position, total as i64, scoring) {
            Some(b) => {
                println!("Position {} of {}", b.position, b.total);
                println!("  index {} (1 = last place), pivot {}", b.index, b.pivot);
                println!("  segment {:?}, raw {}", b.segment, output::format_number(b.raw));
                println!("  points {}", b.points);
            }
            None => println!("An empty list scores nothing."),
        },
        None => println!("{}", output::format_points_table(&points_table(total, scoring))),
    }
}

fn run_open(config: &Config) {
    let location = match config.store.location() {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Store error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    let url = coaster_book::browser::data_file_url(&location);
    if let Err(e) = coaster_book::browser::open_url(&url) {
        eprintln!("Failed to open browser: {}", e);
        std::process::exit(EXIT_NETWORK);
    }
    println!("Opening {} in browser: {}", location, url);
}
