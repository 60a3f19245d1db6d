//! Binary entry point. Resolve paths, start logging, open the SQLite-backed
//! store, then either run the TUI or a one-shot subcommand.
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use songmarks::backup::{export_to_path, import_from_path, BACKUP_FILE_NAME};
use songmarks::config::Settings;
use songmarks::db::{ensure_schema, open_in_memory, SqliteStorage};
use songmarks::{logging, run_app, App, FilterMode, SortOrder, Store, ViewState};

#[derive(Parser)]
#[command(name = "songmarks", about = "Bookmark songs with their YouTube or tab links")]
struct Args {
    /// SQLite database file (use `:memory:` for a throwaway session)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory for log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Directory the TUI writes `songs_backup.json` into
    #[arg(long)]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Add a song without opening the TUI
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        artist: String,
        #[arg(long)]
        link: String,
    },
    /// Print the song list
    List {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,
    },
    /// Write a backup file; `-` prints to stdout
    Export {
        #[arg(default_value = BACKUP_FILE_NAME)]
        path: PathBuf,
    },
    /// Replace every song with the contents of a backup file
    Import { path: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Youtube,
    Tabs,
}

impl From<FilterArg> for FilterMode {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => FilterMode::All,
            FilterArg::Youtube => FilterMode::YouTube,
            FilterArg::Tabs => FilterMode::Tabs,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Recent,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortOrder::Name,
            SortArg::Recent => SortOrder::LastOpened,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::resolve(args.db, args.log_dir, args.export_dir)?;
    settings.ensure_dirs()?;
    let _guard = logging::init(&settings.log_dir)?;
    info!("songmarks starting with database {}", settings.db_path.display());

    let store = open_store(&settings)?;

    match args.command {
        None => {
            let mut app = App::new(store, settings.export_dir.clone());
            run_app(&mut app)
        }
        Some(command) => run_command(store, command),
    }
}

fn open_store(settings: &Settings) -> Result<Store<SqliteStorage>> {
    let conn = if settings.in_memory() {
        open_in_memory()?
    } else {
        ensure_schema(&settings.db_path)?
    };
    let store = Store::load(SqliteStorage::new(conn)).context("failed to load songs")?;
    Ok(store)
}

fn run_command(mut store: Store<SqliteStorage>, command: Command) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match command {
        Command::Add {
            title,
            artist,
            link,
        } => {
            let song = store.add_song(&title, &artist, &link)?;
            writeln!(stdout, "Added {} [{}] (id {})", song.display_title(), song.link_kind, song.id)?;
        }
        Command::List { filter, sort } => {
            let view = ViewState {
                filter: filter.into(),
                sort: sort.into(),
            };
            for song in view.project(store.songs()) {
                writeln!(
                    stdout,
                    "{}\t{}\t{}\t{}",
                    song.id,
                    song.link_kind,
                    song.display_title(),
                    song.link
                )?;
            }
        }
        Command::Export { path } => {
            if path.as_os_str() == "-" {
                writeln!(stdout, "{}", store.export_snapshot())?;
            } else {
                let written = export_to_path(&store, &path)?;
                writeln!(stdout, "Exported {} songs to {}", store.len(), written.display())?;
            }
        }
        Command::Import { path } => {
            let count = import_from_path(&mut store, &path)?;
            writeln!(stdout, "Import successful: {count} songs.")?;
        }
    }
    Ok(())
}
