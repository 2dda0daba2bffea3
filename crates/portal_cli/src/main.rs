//! Admin command-line front end for the school portal.
//!
//! # Responsibility
//! - Open the portal store described by `PortalConfig` plus flags.
//! - Expose backup, restore, reset and reporting operations to operators.
//! - Print JSON to stdout so output can be piped into other tools.
//!
//! # Invariants
//! - Reports never print account passwords; only `export` writes them,
//!   because a backup must restore logins.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use portal_core::db::open_db;
use portal_core::{
    init_logging, Clock, DataManager, KeyValueStore, PortalConfig, Role, SettingsPatch,
    SqliteKeyValueStore, SystemClock, UserId,
};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Administration tools for the school portal store")]
struct Cli {
    /// SQLite file holding the portal store (overrides PORTAL_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Absolute directory for rotated log files (overrides PORTAL_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error (overrides PORTAL_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Key the portal document is stored under.
    #[arg(long, global = true)]
    storage_key: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the core library links and report its version.
    Ping,
    /// Write a JSON backup of the whole portal.
    Export(ExportArgs),
    /// Replace the whole portal with a JSON backup.
    Import(ImportArgs),
    /// Erase every record. The default admin returns on next open.
    Clear(ClearArgs),
    /// Recompute and print the analytics snapshot.
    Analytics,
    /// Search accounts by username or profile name.
    Users(UsersArgs),
    /// Show every teacher's current load and capacity.
    Teachers,
    /// Show settings, applying any provided changes first.
    Settings(SettingsArgs),
    /// Print one student's progress history.
    ReportCard(ReportCardArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Output file; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct ImportArgs {
    /// JSON backup produced by `export`.
    #[arg(long)]
    input: PathBuf,
}

#[derive(Args)]
struct ClearArgs {
    /// Required confirmation.
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
struct UsersArgs {
    #[arg(long, default_value = "")]
    query: String,
    /// student|teacher|admin
    #[arg(long)]
    role: Option<Role>,
}

#[derive(Args)]
struct SettingsArgs {
    #[arg(long)]
    school_name: Option<String>,
    #[arg(long)]
    academic_year: Option<i32>,
    #[arg(long)]
    grading_scale: Option<String>,
    #[arg(long)]
    max_students_per_teacher: Option<u32>,
}

#[derive(Args)]
struct ReportCardArgs {
    /// Student user id.
    #[arg(long)]
    student: UserId,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(&config.log_level, log_dir).context("failed to initialize logging")?;
    }

    match cli.command {
        Commands::Ping => {
            println!("portal_core ping={}", portal_core::ping());
            println!("portal_core version={}", portal_core::core_version());
            Ok(())
        }
        command => run_against_store(&config, command),
    }
}

fn run_against_store(config: &PortalConfig, command: Commands) -> Result<()> {
    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open portal store {}", config.db_path.display()))?;
    let store = SqliteKeyValueStore::try_new(&conn).context("portal store is not usable")?;
    let mut manager = DataManager::open_with(store, SystemClock, config.storage_key.as_str())
        .context("failed to load portal document")?;

    match command {
        Commands::Ping => Ok(()),
        Commands::Export(args) => execute_export(&manager, args),
        Commands::Import(args) => execute_import(&mut manager, args),
        Commands::Clear(args) => execute_clear(&mut manager, args),
        Commands::Analytics => print_json(&analytics_view(&mut manager)?),
        Commands::Users(args) => {
            let users: Vec<_> = manager
                .search_users(&args.query, args.role)
                .into_iter()
                .map(|user| {
                    json!({
                        "id": user.id,
                        "username": user.username,
                        "role": user.role,
                        "name": user.profile.name,
                    })
                })
                .collect();
            print_json(&json!(users))
        }
        Commands::Teachers => print_json(&serde_json::to_value(manager.teacher_loads())?),
        Commands::Settings(args) => execute_settings(&mut manager, args),
        Commands::ReportCard(args) => print_json(&report_card_view(&manager, args.student)?),
    }
}

fn resolve_config(cli: &Cli) -> PortalConfig {
    let mut config = PortalConfig::from_env();
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    if let Some(log_dir) = cli.log_dir.clone() {
        config.log_dir = Some(log_dir);
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }
    if let Some(key) = cli.storage_key.clone() {
        config.storage_key = key;
    }
    config
}

fn execute_export(manager: &DataManager<SqliteKeyValueStore<'_>>, args: ExportArgs) -> Result<()> {
    let document = manager.export_data()?;
    match args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&path, document)
                .with_context(|| format!("failed to write backup {}", path.display()))?;
            info!("event=cli_export module=cli status=ok");
            eprintln!("exported portal to {}", path.display());
        }
        None => println!("{document}"),
    }
    Ok(())
}

fn execute_import(
    manager: &mut DataManager<SqliteKeyValueStore<'_>>,
    args: ImportArgs,
) -> Result<()> {
    let document = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read backup {}", args.input.display()))?;
    manager
        .import_data(&document)
        .with_context(|| format!("{} is not a valid portal backup", args.input.display()))?;
    let data = manager.data();
    eprintln!(
        "imported {} users ({} students, {} teachers)",
        data.users.len(),
        data.students.len(),
        data.teachers.len()
    );
    Ok(())
}

fn execute_clear(manager: &mut DataManager<SqliteKeyValueStore<'_>>, args: ClearArgs) -> Result<()> {
    if !args.yes {
        bail!("refusing to clear the portal without --yes");
    }
    manager.clear_data()?;
    eprintln!("portal data cleared");
    Ok(())
}

fn execute_settings(
    manager: &mut DataManager<SqliteKeyValueStore<'_>>,
    args: SettingsArgs,
) -> Result<()> {
    let patch = SettingsPatch {
        school_name: args.school_name,
        academic_year: args.academic_year,
        grading_scale: args.grading_scale,
        max_students_per_teacher: args.max_students_per_teacher,
    };
    let settings = if patch == SettingsPatch::default() {
        manager.get_settings().clone()
    } else {
        manager.update_settings(patch)?
    };
    print_json(&serde_json::to_value(settings)?)
}

/// Recomputes analytics and renders them without passwords.
fn analytics_view<S: KeyValueStore, C: Clock>(manager: &mut DataManager<S, C>) -> Result<Value> {
    let analytics = manager
        .update_analytics()
        .context("failed to recompute analytics")?;
    let mut value = serde_json::to_value(&analytics)?;
    strip_passwords(&mut value);
    Ok(value)
}

fn report_card_view<S: KeyValueStore, C: Clock>(
    manager: &DataManager<S, C>,
    student: UserId,
) -> Result<Value> {
    let card = manager.student_report_card(student)?;
    let mut value = serde_json::to_value(&card)?;
    strip_passwords(&mut value);
    Ok(value)
}

/// Removes every `password` field, at any depth.
fn strip_passwords(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("password");
            map.values_mut().for_each(strip_passwords);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_passwords),
        _ => {}
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{analytics_view, report_card_view, strip_passwords};
    use portal_core::{DataManager, MemoryKeyValueStore, Profile, Role};
    use serde_json::{json, Value};

    fn has_password_key(value: &Value) -> bool {
        match value {
            Value::Object(map) => {
                map.contains_key("password") || map.values().any(has_password_key)
            }
            Value::Array(items) => items.iter().any(has_password_key),
            _ => false,
        }
    }

    #[test]
    fn analytics_output_hides_student_passwords() {
        let mut manager = DataManager::open(MemoryKeyValueStore::new()).unwrap();
        manager
            .add_user("alice", "s3cret", Role::Student, Profile::named("Alice"))
            .unwrap();

        let value = analytics_view(&mut manager).unwrap();

        assert_eq!(value["topPerformingStudents"][0]["username"], "alice");
        assert!(!has_password_key(&value));
        assert!(!value.to_string().contains("s3cret"));
    }

    #[test]
    fn report_card_output_hides_student_password() {
        let mut manager = DataManager::open(MemoryKeyValueStore::new()).unwrap();
        let student = manager
            .add_user("alice", "s3cret", Role::Student, Profile::default())
            .unwrap();

        let value = report_card_view(&manager, student.id).unwrap();

        assert_eq!(value["student"]["username"], "alice");
        assert!(!has_password_key(&value));
    }

    #[test]
    fn strip_passwords_reaches_nested_arrays() {
        let mut value = json!({
            "password": "a",
            "users": [{"username": "x", "password": "b"}],
            "nested": {"inner": [{"password": "c", "keep": 1}]}
        });

        strip_passwords(&mut value);

        assert!(!has_password_key(&value));
        assert_eq!(value["nested"]["inner"][0]["keep"], 1);
    }
}
