use crate::support::{load_config, open_or_exit, print_json};
use portfolio_core::db::migrations::latest_version;
use serde_json::json;
use std::path::PathBuf;

pub fn run(db: Option<PathBuf>, json_output: bool) {
    let config = load_config(db);
    drop(open_or_exit(&config));

    if json_output {
        print_json(&json!({
            "action": "init",
            "dbPath": config.db_path.display().to_string(),
            "schemaVersion": latest_version(),
        }));
    } else {
        println!(
            "portfolio init\n  Path: {}\n  Schema: {}",
            config.db_path.display(),
            latest_version()
        );
    }
}
