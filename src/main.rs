//! Flora Lens - command-line entry point
//!
//! Every subcommand prints the JSON `CommandResponse` on stdout. Logs go to
//! stderr.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use flora_lens::commands;
use flora_lens::models::response::CommandResponse;
use flora_lens::models::settings::SettingsUpdate;
use flora_lens::state::AppState;
use flora_lens::utils::paths::resolve_data_dir;

#[derive(Parser)]
#[command(name = "flora-lens")]
#[command(about = "Identify plants from photos or names, keep a discovery log and care reminders", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory (defaults to ~/.flora-lens)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify a plant from a photo
    Identify {
        /// Path to a JPEG, PNG, WebP, GIF or HEIC image
        image: PathBuf,
    },

    /// Look a plant up by name
    Lookup {
        /// Common or scientific name
        name: String,

        /// Record the result in history
        #[arg(long)]
        save: bool,
    },

    /// Browse past discoveries
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Manage care reminders
    Remind {
        #[command(subcommand)]
        action: RemindAction,
    },

    /// Show or change settings
    Settings {
        /// Model for identification
        #[arg(long)]
        primary_model: Option<String>,

        /// Model for native-range grounding
        #[arg(long)]
        grounding_model: Option<String>,

        /// Hours until a new reminder is due
        #[arg(long)]
        reminder_due_hours: Option<u32>,

        /// Enable or disable debug logging
        #[arg(long)]
        debug: Option<bool>,

        /// Restore every setting to its default
        #[arg(long, conflicts_with_all = ["primary_model", "grounding_model", "reminder_due_hours", "debug"])]
        reset: bool,
    },

    /// Check storage, configuration and API key
    Health {
        /// Also contact the inference provider
        #[arg(long)]
        probe: bool,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List discoveries, newest first
    List,
    /// Show one discovery
    Show { id: i64 },
    /// Permanently remove a discovery
    Remove {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RemindAction {
    /// List reminders
    List,
    /// Add a reminder
    Add { plant: String, task: String },
    /// Accept a suggested reminder from a discovery
    Accept { history_id: i64, index: usize },
    /// Toggle a reminder between done and pending
    Done { id: String },
    /// Remove a reminder
    Remove { id: String },
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Directive used when `RUST_LOG` is unset
fn default_directive(debug_mode: bool) -> &'static str {
    if debug_mode {
        "debug"
    } else {
        "info"
    }
}

/// Install the stderr subscriber before anything logs.
///
/// Returns a handle so the level can follow `debug_mode` once the config is
/// loaded, or `None` when `RUST_LOG` decides the filter.
fn init_tracing() -> Option<FilterHandle> {
    let (filter, handle) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (reload::Layer::new(filter).0, None),
        Err(_) => {
            let (layer, handle) = reload::Layer::new(EnvFilter::new(default_directive(false)));
            (layer, Some(handle))
        }
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    handle
}

fn print_response<T: Serialize>(response: &CommandResponse<T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{} [y/N] ", prompt);
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter_handle = init_tracing();
    let data_dir = resolve_data_dir(cli.data_dir)?;

    let state = AppState::new();
    state.initialize(&data_dir).await?;

    if let Some(handle) = filter_handle {
        if state.get_config().await?.debug_mode {
            handle.reload(EnvFilter::new(default_directive(true)))?;
        }
    }

    match cli.command {
        Commands::Identify { image } => {
            print_response(&commands::identify_image(&state, &image).await)
        }
        Commands::Lookup { name, save } => {
            print_response(&commands::lookup_plant(&state, &name, save).await)
        }
        Commands::History { action } => match action {
            HistoryAction::List => print_response(&commands::list_history(&state).await),
            HistoryAction::Show { id } => {
                print_response(&commands::get_history_record(&state, id).await)
            }
            HistoryAction::Remove { id, yes } => {
                if !yes && !confirm("Permanently remove this discovery?")? {
                    return print_response(&CommandResponse::ok(false));
                }
                print_response(&commands::remove_history_record(&state, id).await)
            }
        },
        Commands::Remind { action } => match action {
            RemindAction::List => print_response(&commands::list_reminders(&state).await),
            RemindAction::Add { plant, task } => {
                print_response(&commands::add_reminder(&state, &plant, &task).await)
            }
            RemindAction::Accept { history_id, index } => print_response(
                &commands::accept_suggested_reminder(&state, history_id, index).await,
            ),
            RemindAction::Done { id } => {
                print_response(&commands::toggle_reminder(&state, &id).await)
            }
            RemindAction::Remove { id } => {
                print_response(&commands::remove_reminder(&state, &id).await)
            }
        },
        Commands::Settings {
            primary_model,
            grounding_model,
            reminder_due_hours,
            debug,
            reset,
        } => {
            if reset {
                return print_response(&commands::reset_settings(&state).await);
            }
            let update = SettingsUpdate {
                primary_model,
                grounding_model,
                reminder_due_hours,
                debug_mode: debug,
                ..Default::default()
            };
            let is_empty = update.primary_model.is_none()
                && update.grounding_model.is_none()
                && update.reminder_due_hours.is_none()
                && update.debug_mode.is_none();
            if is_empty {
                print_response(&commands::get_settings(&state).await)
            } else {
                print_response(&commands::update_settings(&state, update).await)
            }
        }
        Commands::Health { probe } => print_response(&commands::get_health(&state, probe).await),
    }
}
