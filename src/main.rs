use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    rc::Rc,
};

use clap::{Parser, Subcommand};
use colored::*;
use uuid::Uuid;

use crate::{
    services::categories::{CreateCategoryParameters, create_category, resolve_category},
    session::{ItemListSession, Renderer},
    storage::{Storage, database::Database, json::JsonFileStorage, memory::MemoryStorage},
    ui::{LatestFrame, TerminalRenderer},
};

mod config;
mod models;
mod palette;
mod services;
mod session;
mod storage;
mod ui;

#[derive(Parser)]
#[command(name = "todoey", about = "To-do lists grouped by colored categories")]
struct Cli {
    /// Path of the store file
    #[arg(long, global = true, env = config::STORE_ENV)]
    store: Option<PathBuf>,

    /// Keep everything in memory; nothing is written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List categories
    Categories,

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Show the items of a category, sorted by title
    List {
        /// Category name or slug
        category: String,
    },

    /// Add an item to a category
    Add {
        /// Category name or slug
        category: String,

        /// Item title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Check or uncheck the item at a position
    Toggle {
        /// Category name or slug
        category: String,

        /// Position as shown by `list` (or by `search` when --search is given)
        position: usize,

        /// Resolve the position against this search instead of the full list
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Delete the item at a position
    Delete {
        /// Category name or slug
        category: String,

        /// Position as shown by `list` (or by `search` when --search is given)
        position: usize,

        /// Resolve the position against this search instead of the full list
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show items whose title contains the query, oldest first
    Search {
        /// Category name or slug
        category: String,

        /// Text to look for (case and accent insensitive)
        query: String,
    },

    /// Work on a category interactively
    Open {
        /// Category name or slug
        category: String,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// Create a new category
    Add {
        /// Category name
        name: String,

        /// Color token (red, orange, yellow, green, mint, teal, blue, purple, pink, gray)
        #[arg(short, long)]
        color: Option<String>,
    },
    /// List all categories
    List,
}

const OPEN_HELP: &str = "\
  add <title>      add an item
  toggle <n>       check or uncheck item n
  delete <n>       delete item n
  search [query]   filter by title, or clear the filter
  type <text>      edit the search text (empty clears the filter)
  list             show the full list again
  help             show this help
  quit             leave";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.ephemeral {
        let db = open_database(MemoryStorage::default());
        run(db, cli.command);
        return;
    }

    let storage_path = config::resolve_store_path(cli.store.as_deref());

    // Create parent directory if it doesn't exist
    if let Some(parent) = storage_path.parent() {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| {
            eprintln!("Error: Failed to create data directory: {}", e);
            std::process::exit(1);
        });
    }

    tracing::debug!(path = %storage_path.display(), "opening store");
    let db = open_database(JsonFileStorage::new(storage_path));
    run(db, cli.command);
}

fn open_database<S: Storage>(storage: S) -> Rc<Database<S>> {
    match Database::open(storage) {
        Ok(db) => Rc::new(db),
        Err(e) => {
            eprintln!("Error: Failed to load store: {}", e);
            std::process::exit(1);
        }
    }
}

fn run<S: Storage>(db: Rc<Database<S>>, command: Option<Commands>) {
    match command {
        Some(Commands::Categories) | Some(Commands::Category(CategoryCommands::List)) | None => {
            list_categories(&db);
        }
        Some(Commands::Category(CategoryCommands::Add { name, color })) => {
            match create_category(&db, CreateCategoryParameters { name, color }) {
                Ok(category) => println!(
                    "{} Created category {}",
                    "✓".green(),
                    category.name.bold()
                ),
                Err(e) => fail(&e),
            }
        }
        Some(Commands::List { category }) => {
            let category_id = find_category(&db, &category);
            let latest = LatestFrame::default();
            let mut session = ItemListSession::new(Rc::clone(&db), Box::new(latest.clone()));
            session.select_category(Some(category_id));
            print_latest(&latest);
        }
        Some(Commands::Add { category, title }) => {
            let category_id = find_category(&db, &category);
            let latest = LatestFrame::default();
            let mut session = ItemListSession::new(Rc::clone(&db), Box::new(latest.clone()));
            session.select_category(Some(category_id));
            if !session.add_item(&title.join(" ")) {
                println!("{}", "No item added".dimmed());
            }
            print_latest(&latest);
        }
        Some(Commands::Toggle {
            category,
            position,
            search,
        }) => {
            let category_id = find_category(&db, &category);
            let latest = LatestFrame::default();
            let mut session = ItemListSession::new(Rc::clone(&db), Box::new(latest.clone()));
            session.select_category(Some(category_id));
            session.search(search.as_deref().unwrap_or_default());
            if !session.toggle_done(view_index(position)) {
                println!("{}", format!("Nothing changed at position {position}").dimmed());
            }
            print_latest(&latest);
        }
        Some(Commands::Delete {
            category,
            position,
            search,
        }) => {
            let category_id = find_category(&db, &category);
            let latest = LatestFrame::default();
            let mut session = ItemListSession::new(Rc::clone(&db), Box::new(latest.clone()));
            session.select_category(Some(category_id));
            session.search(search.as_deref().unwrap_or_default());
            if !session.delete_item(view_index(position)) {
                println!("{}", format!("Nothing deleted at position {position}").dimmed());
            }
            print_latest(&latest);
        }
        Some(Commands::Search { category, query }) => {
            let category_id = find_category(&db, &category);
            let latest = LatestFrame::default();
            let mut session = ItemListSession::new(Rc::clone(&db), Box::new(latest.clone()));
            session.select_category(Some(category_id));
            session.search(&query);
            print_latest(&latest);
        }
        Some(Commands::Open { category }) => {
            let category_id = find_category(&db, &category);
            let mut session = ItemListSession::new(Rc::clone(&db), Box::new(TerminalRenderer));
            session.select_category(Some(category_id));
            if let Err(e) = interactive(&mut session) {
                eprintln!("Error: Failed to read input: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn list_categories<S: Storage>(db: &Database<S>) {
    let store = db.snapshot();
    if store.categories.is_empty() {
        println!("No categories yet. Create one with `todoey category add <name>`");
        return;
    }
    println!("\n  {} ({})\n", "Categories".cyan().bold(), store.categories.len());
    for category in &store.categories {
        ui::render_category_line(category);
    }
    println!();
}

fn find_category<S: Storage>(db: &Database<S>, query: &str) -> Uuid {
    match resolve_category(&db.snapshot(), query) {
        Ok(category) => category.id,
        Err(e) => fail(&e),
    }
}

fn fail(error: &dyn std::error::Error) -> ! {
    eprintln!("Error: {}", error);
    std::process::exit(1);
}

/// Positions on the command line are 1-based; 0 maps to an index no view has.
fn view_index(position: usize) -> usize {
    position.checked_sub(1).unwrap_or(usize::MAX)
}

fn print_latest(latest: &LatestFrame) {
    if let Some(frame) = latest.take() {
        TerminalRenderer.render(&frame);
    }
}

/// One line of input in `open` mode. Positions are already mapped to view
/// indices.
#[derive(Debug, PartialEq)]
enum OpenCommand {
    Refresh,
    Add(String),
    Toggle(usize),
    Delete(usize),
    Search(String),
    Type(String),
    List,
    Help,
    Quit,
    Usage(&'static str),
    Unknown(String),
}

fn parse_command(line: &str) -> OpenCommand {
    let line = line.trim();
    let (command, argument) = line
        .split_once(char::is_whitespace)
        .map(|(command, rest)| (command, rest.trim()))
        .unwrap_or((line, ""));

    match command {
        "" => OpenCommand::Refresh,
        "add" => OpenCommand::Add(argument.to_string()),
        "toggle" => match argument.parse::<usize>() {
            Ok(position) => OpenCommand::Toggle(view_index(position)),
            Err(_) => OpenCommand::Usage("toggle"),
        },
        "delete" => match argument.parse::<usize>() {
            Ok(position) => OpenCommand::Delete(view_index(position)),
            Err(_) => OpenCommand::Usage("delete"),
        },
        "search" => OpenCommand::Search(argument.to_string()),
        "type" => OpenCommand::Type(argument.to_string()),
        "list" => OpenCommand::List,
        "help" => OpenCommand::Help,
        "quit" | "exit" => OpenCommand::Quit,
        other => OpenCommand::Unknown(other.to_string()),
    }
}

fn interactive<S: Storage>(session: &mut ItemListSession<S>) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("{}", "Type `help` for commands".dimmed());

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        match parse_command(&line) {
            OpenCommand::Refresh => session.sync(),
            OpenCommand::Add(title) => {
                session.add_item(&title);
            }
            OpenCommand::Toggle(index) => {
                session.toggle_done(index);
            }
            OpenCommand::Delete(index) => {
                session.delete_item(index);
            }
            OpenCommand::Search(query) => session.search(&query),
            OpenCommand::Type(text) => session.search_text_changed(&text),
            OpenCommand::List => session.load_items(),
            OpenCommand::Help => println!("{OPEN_HELP}"),
            OpenCommand::Quit => return Ok(()),
            OpenCommand::Usage(command) => {
                println!("{}", format!("Usage: {command} <n>").dimmed())
            }
            OpenCommand::Unknown(other) => {
                println!("{}", format!("Unknown command '{other}', try `help`").dimmed())
            }
        }
    }
}
