use log::error;
use portfolio_core::db::open_db;
use portfolio_core::{
    init_logging, CoreConfig, EntityServiceError, ReconcileError, ReconcileErrorKind,
    YearWithSemester,
};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const EXIT_STORAGE: i32 = 1;
pub const EXIT_INVALID_ARG: i32 = 2;
pub const EXIT_NOT_FOUND: i32 = 3;

pub fn exit_with(code: i32, message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(code);
}

/// Parses `YEAR/SEMESTER`, e.g. `2023/1`.
pub fn parse_half_year(raw: &str) -> Result<YearWithSemester, String> {
    let (year, semester) = raw
        .trim()
        .split_once('/')
        .ok_or_else(|| format!("expected YEAR/SEMESTER, got `{raw}`"))?;
    let year: i32 = year
        .parse()
        .map_err(|e| format!("invalid year `{year}`: {e}"))?;
    let semester: i32 = semester
        .parse()
        .map_err(|e| format!("invalid semester `{semester}`: {e}"))?;
    let value = YearWithSemester::new(year, semester);
    if !value.is_valid() {
        return Err(format!("`{value}` is not a valid half-year"));
    }
    Ok(value)
}

/// Environment config with the `--db` flag applied; starts file logging when
/// `PORTFOLIO_LOG_DIR` is set. Any environment problem, including a log
/// directory that cannot be created, exits with `EXIT_INVALID_ARG`.
pub fn load_config(db: Option<PathBuf>) -> CoreConfig {
    let mut config =
        CoreConfig::from_env().unwrap_or_else(|e| exit_with(EXIT_INVALID_ARG, e));
    if let Some(path) = db {
        config.db_path = path;
    }
    if let Some(dir) = &config.log_dir {
        init_logging(config.log_level, dir).unwrap_or_else(|e| exit_with(EXIT_INVALID_ARG, e));
    }
    config
}

pub fn open_or_exit(config: &CoreConfig) -> Connection {
    open_db(&config.db_path).unwrap_or_else(|e| {
        error!(
            "event=cli_open module=cli status=error path={} error={}",
            config.db_path.display(),
            e
        );
        exit_with(
            EXIT_STORAGE,
            format!("failed to open {}: {e}", config.db_path.display()),
        )
    })
}

pub fn read_json_or_exit<T: DeserializeOwned>(path: &Path) -> T {
    let raw = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with(
            EXIT_INVALID_ARG,
            format!("failed to read {}: {e}", path.display()),
        )
    });
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        exit_with(
            EXIT_INVALID_ARG,
            format!("invalid payload in {}: {e}", path.display()),
        )
    })
}

pub fn print_json(payload: &Value) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{text}"),
        Err(e) => exit_with(EXIT_STORAGE, format!("failed to render json: {e}")),
    }
}

pub fn reconcile_exit_code(err: &ReconcileError) -> i32 {
    match err.kind() {
        ReconcileErrorKind::NotFound => EXIT_NOT_FOUND,
        ReconcileErrorKind::InvalidArg => EXIT_INVALID_ARG,
        ReconcileErrorKind::Storage => EXIT_STORAGE,
    }
}

pub fn entity_exit_code(err: &EntityServiceError) -> i32 {
    match err {
        EntityServiceError::UserNotFound(_)
        | EntityServiceError::ProjectNotFound(_)
        | EntityServiceError::ContestNotFound(_)
        | EntityServiceError::TeamNotFound(_) => EXIT_NOT_FOUND,
        EntityServiceError::BlankName(_)
        | EntityServiceError::InvalidDuration(_)
        | EntityServiceError::InvalidHalfYear(_)
        | EntityServiceError::MembersOutsideDuration { .. } => EXIT_INVALID_ARG,
        EntityServiceError::Repo(_) => EXIT_STORAGE,
    }
}
