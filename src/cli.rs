// CLI module - command-line argument parsing and handlers
//
// With no subcommand polis starts the TUI. Subcommands cover config
// management and headless access to the same operations the TUI offers:
// - config --show/--path/--reset/--edit
// - list / show / delete <kind>
// - assign-teacher / unassign-teacher / enroll / unenroll

use crate::api::dto::{CourseDto, StudentDto, TeacherDto};
use crate::api::{RemoteFilter, SchoolClient};
use crate::config::{Config, VERSION};
use crate::detail::{self, Association};
use crate::entity::{AnyEntity, Entity, EntityKind};
use crate::paging::{drive, FilterPort, PagedSearchController};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::process::Command;
use std::sync::Arc;

/// polis - terminal client for the school administration backend
#[derive(Parser)]
#[command(name = "polis")]
#[command(version = VERSION)]
#[command(about = "Browse and manage teachers, courses and students", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// List entities matching an optional filter
    List {
        kind: EntityKind,

        /// Free-text filter (blank means everything)
        #[arg(short, long)]
        query: Option<String>,

        /// Keep loading pages until the backend reports the end
        #[arg(long)]
        all: bool,

        /// Rows per page (defaults to the configured page_size)
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Show one entity with its relations
    Show { kind: EntityKind, id: i64 },

    /// Delete an entity
    Delete {
        kind: EntityKind,
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Make a teacher responsible for a course
    AssignTeacher { course_id: i64, teacher_id: i64 },

    /// Remove a teacher from a course
    UnassignTeacher { course_id: i64, teacher_id: i64 },

    /// Enroll a student in a course
    Enroll { student_id: i64, course_id: i64 },

    /// Remove a student from a course
    Unenroll { student_id: i64, course_id: i64 },
}

impl Commands {
    /// Commands that talk to the backend (and therefore want logging set up)
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Config { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config subcommand
// ─────────────────────────────────────────────────────────────────────────────

/// Handle `config`. Returns true if it was handled (exit after).
pub fn handle_config_command(command: Option<&Commands>) -> bool {
    let Some(Commands::Config {
        show,
        reset,
        edit,
        path,
    }) = command
    else {
        return false;
    };

    if *path {
        handle_config_path();
    } else if *show {
        handle_config_show();
    } else if *reset {
        handle_config_reset();
    } else if *edit {
        handle_config_edit();
    } else {
        println!("Usage: polis config [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
        println!("  --path    Show config file path");
    }
    true
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("api_url = {:?}", config.api_url);
    println!("request_timeout_secs = {}", config.request_timeout_secs);
    println!("page_size = {}", config.page_size);
    println!("picker_page_size = {}", config.picker_page_size);
    println!("# enable_tui = {} (POLIS_NO_TUI)", config.enable_tui);
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);
    println!("file_dir = {:?}", config.logging.file_dir.display().to_string());
    println!("file_rotation = {:?}", config.logging.file_rotation.as_str());
    println!("file_prefix = {:?}", config.logging.file_prefix);

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

/// Ask a yes/no question on stderr; anything but "y" is no
fn confirm(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    let _ = std::io::stderr().flush();

    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("y")
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if path.exists()
        && !confirm(&format!(
            "Config file exists at {}. Overwrite?",
            path.display()
        ))
    {
        println!("Aborted.");
        return;
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

fn handle_config_edit() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    match Command::new(&editor).arg(&path).status() {
        Ok(s) if s.success() => {}
        Ok(s) => {
            eprintln!("Editor exited with status: {}", s);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to launch editor '{}': {}", editor, e);
            eprintln!("Set $EDITOR environment variable to your preferred editor");
            std::process::exit(1);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend subcommands
// ─────────────────────────────────────────────────────────────────────────────

/// Run a backend subcommand to completion
pub async fn run_command(command: Commands, client: Arc<SchoolClient>, config: &Config) -> Result<()> {
    match command {
        Commands::Config { .. } => Ok(()),
        Commands::List {
            kind,
            query,
            all,
            page_size,
        } => {
            let page_size = page_size.unwrap_or(config.page_size);
            let query = query.unwrap_or_default();
            match kind {
                EntityKind::Teacher => list::<TeacherDto>(client, &query, all, page_size).await,
                EntityKind::Course => list::<CourseDto>(client, &query, all, page_size).await,
                EntityKind::Student => list::<StudentDto>(client, &query, all, page_size).await,
            }
        }
        Commands::Show { kind, id } => {
            let entity = detail::load_any(&client, kind, id)
                .await
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Failed to load {} {}", kind, id))?;
            print_detail(&entity);
            Ok(())
        }
        Commands::Delete { kind, id, yes } => {
            if !yes && !confirm(&format!("Delete {} {}?", kind, id)) {
                println!("Aborted.");
                return Ok(());
            }
            let outcome = detail::delete(&client, kind, id).await;
            if outcome.is_deleted() {
                println!("{}", outcome.message(kind));
                Ok(())
            } else {
                bail!("{}", outcome.message(kind))
            }
        }
        Commands::AssignTeacher {
            course_id,
            teacher_id,
        } => {
            associate(
                &client,
                Association::AssignTeacher {
                    course_id,
                    teacher_id,
                },
            )
            .await
        }
        Commands::UnassignTeacher {
            course_id,
            teacher_id,
        } => {
            associate(
                &client,
                Association::UnassignTeacher {
                    course_id,
                    teacher_id,
                },
            )
            .await
        }
        Commands::Enroll {
            student_id,
            course_id,
        } => {
            associate(
                &client,
                Association::Enroll {
                    student_id,
                    course_id,
                },
            )
            .await
        }
        Commands::Unenroll {
            student_id,
            course_id,
        } => {
            associate(
                &client,
                Association::Unenroll {
                    student_id,
                    course_id,
                },
            )
            .await
        }
    }
}

/// Drive a controller headlessly and print what it accumulated
async fn list<E: Entity>(
    client: Arc<SchoolClient>,
    query: &str,
    all: bool,
    page_size: u32,
) -> Result<()> {
    let port = RemoteFilter::<E>::new(client);
    let mut controller = PagedSearchController::<E>::new(E::KIND.plural(), page_size);

    let ticket = controller.set_query_forced(query);
    drive(&mut controller, &port, ticket).await;
    if all {
        load_remaining(&mut controller, &port).await;
    }

    let error = controller.consume_error();
    let state = controller.state();
    for item in &state.items {
        println!("{}", format_row(item.id(), &item.row_label()));
    }

    if let Some(error) = error {
        bail!(error);
    }
    if state.shows_no_results() {
        println!("No results");
    } else if state.can_load_more {
        eprintln!(
            "({} shown, more available; pass --all to fetch everything)",
            state.items.len()
        );
    }
    Ok(())
}

/// Follow `load_more` to the end; an empty page ends it even if the
/// backend still claims more
async fn load_remaining<E, P>(controller: &mut PagedSearchController<E>, port: &P)
where
    E: Clone,
    P: FilterPort<E> + ?Sized,
{
    while let Some(ticket) = controller.load_more() {
        let before = controller.state().items.len();
        drive(controller, port, ticket).await;
        if controller.state().items.len() == before && controller.state().last_error.is_none() {
            tracing::warn!(
                "Empty page {} while more were reported, stopping",
                controller.state().next_page_index.saturating_sub(1)
            );
            break;
        }
    }
}

async fn associate(client: &SchoolClient, association: Association) -> Result<()> {
    let notice = association.apply(client).await.map_err(anyhow::Error::msg)?;
    println!("{}", notice);
    Ok(())
}

fn format_row(id: Option<i64>, label: &str) -> String {
    match id {
        Some(id) => format!("{:>6}  {}", id, label),
        None => format!("{:>6}  {}", "-", label),
    }
}

fn print_detail(entity: &AnyEntity) {
    println!("{}", entity.kind().label());
    for (label, value) in entity.detail_lines() {
        let mut lines = value.lines();
        println!("  {:<14} {}", label, lines.next().unwrap_or(""));
        for line in lines {
            println!("  {:<14} {}", "", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::{FetchError, Page, PageRequest};
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves one item on page 0, then empty pages that still claim more
    struct EndlessEmpty {
        calls: AtomicUsize,
    }

    impl FilterPort<String> for EndlessEmpty {
        fn fetch_page(&self, request: PageRequest) -> BoxFuture<'_, Result<Page<String>, FetchError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let items = if request.page_index == 0 {
                vec!["only".to_string()]
            } else {
                Vec::new()
            };
            async move { Ok(Page::new(items, true)) }.boxed()
        }
    }

    #[test]
    fn test_parse_list_with_alias_and_flags() {
        let cli = Cli::try_parse_from(["polis", "list", "teachers", "-q", "ada", "--all"]).unwrap();
        match cli.command {
            Some(Commands::List {
                kind, query, all, ..
            }) => {
                assert_eq!(kind, EntityKind::Teacher);
                assert_eq!(query.as_deref(), Some("ada"));
                assert!(all);
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn test_parse_association_argument_order() {
        let cli = Cli::try_parse_from(["polis", "enroll", "7", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Enroll {
                student_id: 7,
                course_id: 3
            })
        ));
    }

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["polis"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!handle_config_command(cli.command.as_ref()));
    }

    #[test]
    fn test_config_is_not_remote() {
        let cli = Cli::try_parse_from(["polis", "config", "--path"]).unwrap();
        assert!(!cli.command.unwrap().is_remote());
    }

    #[test]
    fn test_format_row_aligns_ids() {
        assert_eq!(format_row(Some(42), "Ada"), "    42  Ada");
        assert_eq!(format_row(None, "Ada"), "     -  Ada");
    }

    #[tokio::test]
    async fn test_load_remaining_stops_on_empty_page() {
        let port = EndlessEmpty {
            calls: AtomicUsize::new(0),
        };
        let mut controller = PagedSearchController::new("test", 20);
        let ticket = controller.set_query_forced("");
        drive(&mut controller, &port, ticket).await;

        load_remaining(&mut controller, &port).await;

        assert_eq!(port.calls.load(Ordering::SeqCst), 2);
        assert_eq!(controller.state().items, vec!["only".to_string()]);
    }
}
