use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use watchcraft_models::{MediaType, WatchStatus};

use commands::{add, config, context::AppContext, edit, list, recommend, search};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "watchcraft")]
#[command(about = "WatchCraft - A shared movie and TV watchlist")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to a daily-rotated file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search OMDb and show which results are already on the watchlist
    Search {
        query: String,

        /// Classify results for this person (hides the co-watch offer once they are a co-viewer)
        #[arg(long = "as", value_name = "NAME")]
        actor: Option<String>,

        /// Fetch full details for every result
        #[arg(long, action = ArgAction::SetTrue)]
        details: bool,
    },
    /// Add an entry from OMDb by IMDb id, or by hand
    #[command(long_about = "Add an entry. With --imdb the details are fetched from OMDb; otherwise --title is required and the remaining flags describe the entry.")]
    Add {
        /// IMDb id of the title (e.g. tt0113277)
        #[arg(long, value_name = "ID", conflicts_with = "title")]
        imdb: Option<String>,

        #[arg(long, required_unless_present = "imdb")]
        title: Option<String>,

        /// movie or tv
        #[arg(long = "type", value_name = "TYPE", default_value = "movie")]
        media_type: MediaType,

        #[arg(long = "genre", value_name = "GENRE")]
        genres: Vec<String>,

        #[arg(long = "mood", value_name = "MOOD")]
        moods: Vec<String>,

        #[arg(long)]
        year: Option<i32>,

        /// Movie runtime in minutes
        #[arg(long, value_name = "MINUTES")]
        runtime: Option<u32>,

        /// Episode length in minutes
        #[arg(long, value_name = "MINUTES")]
        episode_length: Option<u32>,

        #[arg(long, value_name = "N")]
        total_episodes: Option<u32>,

        #[arg(long)]
        status: Option<WatchStatus>,

        /// Who recommended it (repeatable)
        #[arg(long = "recommended-by", value_name = "NAME")]
        recommended_by: Vec<String>,
    },
    /// List the watchlist, optionally filtered
    List(list::ListArgs),
    /// Show every field of one entry
    Show { id: String },
    /// Delete an entry permanently
    Remove { id: String },
    /// Change an entry's status (not-started, watching, rewatching, on-hold, completed, to-rewatch)
    Status { id: String, status: WatchStatus },
    /// Add or remove moods
    Moods {
        id: String,

        #[arg(long = "add", value_name = "MOOD")]
        add: Vec<String>,

        #[arg(long = "remove", value_name = "MOOD")]
        remove: Vec<String>,
    },
    /// Edit the genres, recommenders or co-viewers of an entry
    Tags {
        id: String,

        list: edit::TagList,

        #[arg(long = "add", value_name = "VALUE")]
        add: Vec<String>,

        #[arg(long = "remove", value_name = "VALUE")]
        remove: Vec<String>,
    },
    /// Set your own season/episode on a show
    Progress {
        id: String,
        #[arg(allow_negative_numbers = true)]
        season: i64,
        #[arg(allow_negative_numbers = true)]
        episode: i64,
    },
    /// Record that you watched an entry now
    Watched { id: String },
    /// Track viewing partners on a show
    Partner {
        #[command(subcommand)]
        cmd: PartnerCommands,
    },
    /// Recommend an OMDb title on someone's behalf
    #[command(long_about = "Recommend a title by IMDb id. A title not on the list is added; a title on the list but not started gets the recommender (and, with --together, the co-viewer) appended; a started title is left alone.")]
    Recommend {
        imdb: String,

        #[arg(long = "as", value_name = "NAME")]
        actor: String,

        /// Also offer to watch it together
        #[arg(long, action = ArgAction::SetTrue)]
        together: bool,
    },
    /// Create or inspect the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum PartnerCommands {
    /// Start tracking a partner at S1E1
    Add { id: String, name: String },
    /// Set a partner's position
    Set {
        id: String,
        name: String,
        #[arg(allow_negative_numbers = true)]
        season: i64,
        #[arg(allow_negative_numbers = true)]
        episode: i64,
    },
    /// Stop tracking a partner
    Remove { id: String, name: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a config file with defaults
    Init {
        #[arg(long)]
        api_key: Option<String>,

        /// Display name of the list owner
        #[arg(long)]
        owner: Option<String>,

        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Show the effective configuration (masks the API key)
    Show {
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Config { cmd } => config::run_config(cmd, cli.config, &output).await,
        command => {
            let ctx = AppContext::load(cli.config)?;
            run_command(&ctx, command, &output).await
        }
    }
}

async fn run_command(ctx: &AppContext, command: Commands, output: &output::Output) -> color_eyre::Result<()> {
    match command {
        Commands::Search { query, actor, details } => {
            search::run_search(ctx, &query, actor, details, output).await
        }
        Commands::Add {
            imdb,
            title,
            media_type,
            genres,
            moods,
            year,
            runtime,
            episode_length,
            total_episodes,
            status,
            recommended_by,
        } => match imdb {
            Some(imdb) => add::run_add_from_provider(ctx, &imdb, output).await,
            None => {
                let manual = add::ManualEntry {
                    title: title.unwrap_or_default(),
                    media_type,
                    genres,
                    moods,
                    year,
                    runtime,
                    episode_length,
                    total_episodes,
                    status,
                    recommended_by,
                };
                add::run_add_manual(ctx, manual, output).await
            }
        },
        Commands::List(args) => list::run_list(ctx, args, output).await,
        Commands::Show { id } => list::run_show(ctx, &id, output).await,
        Commands::Remove { id } => edit::run_remove(ctx, &id, output).await,
        Commands::Status { id, status } => edit::run_status(ctx, &id, status, output).await,
        Commands::Moods { id, add, remove } => edit::run_moods(ctx, &id, add, remove, output).await,
        Commands::Tags { id, list, add, remove } => edit::run_tags(ctx, &id, list, add, remove, output).await,
        Commands::Progress { id, season, episode } => {
            edit::run_progress(ctx, &id, season, episode, output).await
        }
        Commands::Watched { id } => edit::run_watched(ctx, &id, output).await,
        Commands::Partner { cmd } => edit::run_partner(ctx, cmd, output).await,
        Commands::Recommend { imdb, actor, together } => {
            recommend::run_recommend(ctx, &imdb, &actor, together, output).await
        }
        Commands::Config { .. } => Ok(()),
    }
}
