//! # Logi Console Library
//!
//! Core library for the `logi` command-line shell. `main.rs` only sets up
//! logging and calls [`run`].
//!
//! ## Module Organization
//! ```text
//! logi_console/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── Argument parsing into `Command`
//! ├── config.rs       ◄─── Environment configuration
//! ├── commands/
//! │   ├── operation.rs ◄─── new / show / history / edit / delete / pdf
//! │   ├── dashboard.rs ◄─── aggregated reporting
//! │   └── rates.rs     ◄─── rate administration
//! ├── render.rs       ◄─── Text and JSON output
//! └── error.rs        ◄─── AppError for every command
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Command, DeleteTarget, RatesCommand};
use commands::{dashboard, operation, rates};
use config::AppConfig;
use error::{AppError, AppResult};
use logi_core::{Attachment, ValidationError, MAX_ATTACHMENT_BYTES};
use logi_db::{Database, DbConfig};

/// Runs one command line and returns what should be printed on stdout.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Parse arguments ─────────── --help stops here, no database needed  │
/// │  2. Load AppConfig from env ─── --db overrides LOGI_DB_PATH            │
/// │  3. Open database ───────────── creates the file, runs migrations      │
/// │  4. Execute the command                                                 │
/// │  5. Close the pool                                                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(args: &[String]) -> AppResult<String> {
    let cli = cli::parse(args)?;
    if cli.command == Command::Help {
        return Ok(cli::USAGE.to_string());
    }

    let mut config = AppConfig::from_env()?;
    if let Some(path) = cli.db_path {
        config.database_path = path;
    }

    let db = open_database(&config).await?;
    let result = execute(&db, &config, cli.command, cli.json).await;
    db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout only carries command output.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=logi=trace` - Show trace for logi crates only
/// - Default: `info,logi=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,logi=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_database(config: &AppConfig) -> AppResult<Database> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!(path = %config.database_path.display(), "Opening database");
    let db_config =
        DbConfig::new(config.database_path.clone()).max_connections(config.max_connections);
    Ok(Database::new(db_config).await?)
}

/// Executes a parsed command against an open database.
pub async fn execute(
    db: &Database,
    config: &AppConfig,
    command: Command,
    json: bool,
) -> AppResult<String> {
    debug!(?command, "Executing command");

    match command {
        Command::Help => Ok(cli::USAGE.to_string()),

        Command::New { input, pdf } => {
            let attachment = pdf.as_deref().map(load_attachment).transpose()?;
            let created = operation::create_operation(db, input, attachment).await?;
            output(json, &created, render::operation)
        }

        Command::Show { id } => {
            let found = operation::get_operation(db, id).await?;
            output(json, &found, render::operation)
        }

        Command::History { filter } => {
            let rows = operation::list_history(db, &filter).await?;
            output(json, &rows, |rows| render::history(rows))
        }

        Command::Edit { id, mut patch, pdf } => {
            if let Some(path) = pdf {
                patch.attachment = Some(load_attachment(&path)?);
            }
            let edited = operation::edit_operation(db, id, patch).await?;
            output(json, &edited, render::operation)
        }

        Command::Delete(target) => {
            let outcome = match target {
                DeleteTarget::Id(id) => operation::delete_operation(db, id).await?,
                DeleteTarget::Master(master) => operation::delete_by_master(db, &master).await?,
            };
            output(json, &outcome, render::deleted)
        }

        Command::Pdf { key, out } => {
            let receipt = operation::fetch_receipt(db, &key).await?;
            let saved = save_receipt(&receipt, out)?;
            output(json, &saved, |s| {
                format!(
                    "Saved {} ({} bytes) to {}",
                    s.filename,
                    s.size_bytes,
                    s.path.display()
                )
            })
        }

        Command::Dashboard { filter } => {
            let report = dashboard::load_dashboard(db, filter).await?;
            output(json, &report, render::dashboard)
        }

        Command::Rates(RatesCommand::Show) => {
            let current = rates::show_rates(db).await;
            output(json, &current, render::rates)
        }

        Command::Rates(RatesCommand::History) => {
            let changes = rates::rate_history(db).await?;
            output(json, &changes, |c| render::rate_history(c))
        }

        Command::Rates(RatesCommand::Set {
            rates: new,
            admin_key,
        }) => {
            let change =
                rates::change_rates(db, config.admin_key.as_deref(), &admin_key, new).await?;
            output(json, &change, render::rate_change)
        }
    }
}

fn output<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> AppResult<String> {
    if json {
        render::json(value)
    } else {
        Ok(text(value))
    }
}

// =============================================================================
// Receipt Files
// =============================================================================

/// Reads a receipt PDF from disk. Oversized files are refused before any
/// bytes are read; the remaining checks happen in the command layer.
fn load_attachment(path: &Path) -> AppResult<Attachment> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::usage(format!("not a file: {}", path.display())))?;

    let size = std::fs::metadata(path)?.len();
    if size > MAX_ATTACHMENT_BYTES as u64 {
        return Err(ValidationError::InvalidFormat {
            field: "receipt".to_string(),
            reason: format!("file exceeds {} bytes", MAX_ATTACHMENT_BYTES),
        }
        .into());
    }

    let bytes = std::fs::read(path)?;
    debug!(%filename, size = bytes.len(), "Loaded receipt");
    Ok(Attachment::new(filename, bytes))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedReceipt {
    path: PathBuf,
    filename: String,
    size_bytes: usize,
}

/// Writes a receipt to `out`, or to its stored filename in the working
/// directory.
fn save_receipt(receipt: &Attachment, out: Option<PathBuf>) -> AppResult<SavedReceipt> {
    let path = match out {
        Some(path) => path,
        // Only the final component of the stored name is trusted
        None => Path::new(&receipt.filename)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("receipt.pdf")),
    };

    std::fs::write(&path, &receipt.bytes)?;
    info!(path = %path.display(), size = receipt.len(), "Receipt saved");

    Ok(SavedReceipt {
        path,
        filename: receipt.filename.clone(),
        size_bytes: receipt.len(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn config(admin_key: Option<&str>) -> AppConfig {
        AppConfig {
            database_path: PathBuf::from(":memory:"),
            admin_key: admin_key.map(String::from),
            max_connections: 1,
        }
    }

    async fn exec(db: &Database, config: &AppConfig, line: &str) -> AppResult<String> {
        let cli = cli::parse(&args(line))?;
        execute(db, config, cli.command, cli.json).await
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("logi-{}-{}", std::process::id(), name))
    }

    const NEW_LINE: &str = "new --fm-date 2026-03-01 --fm-master FM-1 --lm-date 2026-03-05 \
                            --packages 100 --weight 50 --crew-cost 200 --forklift 50 \
                            --yale 30 --subcontract 20 --adimex-paid 15";

    #[tokio::test]
    async fn test_help_needs_no_database() {
        let text = run(&args("--help")).await.unwrap();
        assert!(text.starts_with("Logi"));
    }

    #[tokio::test]
    async fn test_new_show_history_dashboard() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = config(None);

        let text = exec(&db, &config, NEW_LINE).await.unwrap();
        assert!(text.contains("Operation #1"));
        assert!(text.contains("$300.00"));
        assert!(text.contains("-$216.00"));

        let json = exec(&db, &config, "show 1 --json").await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["firstMileMaster"], "FM-1");
        assert_eq!(value["month"], "Marzo");
        assert!((value["ccServices"].as_f64().unwrap() - 84.0).abs() < 1e-9);

        let history = exec(&db, &config, "history --month 3 --year 2026")
            .await
            .unwrap();
        assert!(history.contains("FM-1"));

        let json = exec(&db, &config, "dashboard --json").await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totals"]["records"], 1);
        assert_eq!(value["filter"]["kind"], "all");
    }

    #[tokio::test]
    async fn test_edit_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = config(None);
        exec(&db, &config, NEW_LINE).await.unwrap();

        let text = exec(&db, &config, "edit 1 --packages 200").await.unwrap();
        assert!(text.contains("$168.00"));

        assert_eq!(
            exec(&db, &config, "delete 1").await.unwrap(),
            "Deleted 1 operation."
        );
        assert_eq!(
            exec(&db, &config, "delete 1").await.unwrap(),
            "Nothing to delete."
        );

        let err = exec(&db, &config, "show 1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_receipt_upload_and_download() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = config(None);

        let upload = temp_path("upload.pdf");
        std::fs::write(&upload, b"%PDF-1.4 test").unwrap();
        let line = format!("{} --pdf {}", NEW_LINE, upload.display());
        let text = exec(&db, &config, &line).await.unwrap();
        assert!(text.contains("upload.pdf (13 bytes)"));

        let download = temp_path("download.pdf");
        let line = format!("pdf --master FM-1 --out {}", download.display());
        exec(&db, &config, &line).await.unwrap();
        assert_eq!(std::fs::read(&download).unwrap(), b"%PDF-1.4 test");

        let _ = std::fs::remove_file(upload);
        let _ = std::fs::remove_file(download);
    }

    #[tokio::test]
    async fn test_missing_receipt_file_is_io_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let line = format!("{} --pdf {}", NEW_LINE, temp_path("absent.pdf").display());

        let err = exec(&db, &config(None), &line).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Io);
        assert_eq!(db.operations().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_oversized_receipt_refused_before_reading() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let upload = temp_path("huge.pdf");
        let file = std::fs::File::create(&upload).unwrap();
        file.set_len(MAX_ATTACHMENT_BYTES as u64 + 1).unwrap();
        drop(file);

        let err = load_attachment(&upload).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let line = format!("{} --pdf {}", NEW_LINE, upload.display());
        let err = exec(&db, &config(None), &line).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(db.operations().count().await.unwrap(), 0);

        let _ = std::fs::remove_file(upload);
    }

    #[tokio::test]
    async fn test_rates_admin_flow() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = exec(&db, &config(None), "rates set --cc 1 --adimex 0.4 --admin-key x")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let config = config(Some("x"));
        exec(&db, &config, "rates set --cc 1 --adimex 0.4 --admin-key x")
            .await
            .unwrap();

        let text = exec(&db, &config, "rates show").await.unwrap();
        assert!(text.contains("CC rate:     1 per package"));

        let history = exec(&db, &config, "rates history").await.unwrap();
        assert!(history.contains("CC 0.84 -> 1"));
    }
}
