use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_portfolio<I, S>(db: &Path, args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_portfolio_with_env(db, &[], args)
}

fn run_portfolio_with_env<I, S>(db: &Path, envs: &[(&str, &OsStr)], args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_portfolio");
    let mut command = Command::new(bin);
    command
        .env_remove("PORTFOLIO_DB_PATH")
        .env_remove("PORTFOLIO_LOG_LEVEL")
        .env_remove("PORTFOLIO_LOG_DIR");
    for (key, value) in envs {
        command.env(key, value);
    }
    command
        .arg("--db")
        .arg(db)
        .args(args)
        .output()
        .expect("portfolio command should execute")
}

fn assert_exit_code(output: &Output, expected: i32) {
    assert_eq!(
        output.status.code(),
        Some(expected),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

fn add_project(db: &Path) -> String {
    let project = parse_json(&run_portfolio(
        db,
        ["add-project", "Compiler", "--since", "2021/0", "--json"],
    ));
    project["project"]["project_id"].as_str().unwrap().to_string()
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn parse_json(output: &Output) -> Value {
    assert_success(output);
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

fn add_user(db: &Path, name: &str) -> String {
    let payload = parse_json(&run_portfolio(db, ["add-user", name, "--json"]));
    payload["user"]["user_id"]
        .as_str()
        .expect("user id")
        .to_string()
}

#[test]
fn init_reports_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("portfolio.sqlite3");

    let payload = parse_json(&run_portfolio(&db, ["init", "--json"]));
    assert_eq!(payload["action"], "init");
    assert_eq!(payload["schemaVersion"], 2);
    assert!(db.exists());
}

#[test]
fn project_members_round_trip_through_cli() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("portfolio.sqlite3");
    let ada = add_user(&db, "Ada");
    let brian = add_user(&db, "Brian");

    let project_id = add_project(&db);

    let payload_path = dir.path().join("members.json");
    fs::write(
        &payload_path,
        format!(
            r#"[
                {{"user_id": "{ada}", "since": {{"year": 2021, "semester": 0}}}},
                {{"user_id": "{brian}", "since": {{"year": 2021, "semester": 1}},
                  "until": {{"year": 2022, "semester": 0}}}}
            ]"#
        ),
    )
    .unwrap();

    let summary = parse_json(&run_portfolio(
        &db,
        [
            OsStr::new("set-project-members"),
            OsStr::new(&project_id),
            payload_path.as_os_str(),
            OsStr::new("--json"),
        ],
    ));
    assert_eq!(summary["added"], 2);
    assert_eq!(summary["removed"], 0);

    let listed = parse_json(&run_portfolio(
        &db,
        ["list-project-members", project_id.as_str(), "--json"],
    ));
    assert_eq!(listed["members"].as_array().unwrap().len(), 2);
}

#[test]
fn out_of_scope_member_exits_with_invalid_argument() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("portfolio.sqlite3");
    let ada = add_user(&db, "Ada");

    let project = parse_json(&run_portfolio(
        &db,
        [
            "add-project",
            "Compiler",
            "--since",
            "2021/0",
            "--until",
            "2021/1",
            "--json",
        ],
    ));
    let project_id = project["project"]["project_id"].as_str().unwrap().to_string();

    let payload_path = dir.path().join("members.json");
    fs::write(
        &payload_path,
        format!(r#"[{{"user_id": "{ada}", "since": {{"year": 2020, "semester": 1}}}}]"#),
    )
    .unwrap();

    let output = run_portfolio(
        &db,
        [
            OsStr::new("set-project-members"),
            OsStr::new(&project_id),
            payload_path.as_os_str(),
        ],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("duration_out_of_scope"));
}

#[test]
fn unknown_team_exits_with_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("portfolio.sqlite3");
    let payload_path = dir.path().join("team.json");
    fs::write(&payload_path, "[]").unwrap();

    let output = run_portfolio(
        &db,
        [
            OsStr::new("set-team-members"),
            OsStr::new("5f0c6f0e-8d7c-4a53-9f0e-1c1f3a0b9a11"),
            payload_path.as_os_str(),
        ],
    );
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn team_members_can_be_set_and_listed() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("portfolio.sqlite3");
    let ada = add_user(&db, "Ada");

    let contest = parse_json(&run_portfolio(
        &db,
        ["add-contest", "ICPC", "--held-in", "2023/1", "--json"],
    ));
    let contest_id = contest["contest"]["contest_id"].as_str().unwrap().to_string();
    let team = parse_json(&run_portfolio(
        &db,
        ["add-team", contest_id.as_str(), "Segfault", "--json"],
    ));
    let team_id = team["team"]["team_id"].as_str().unwrap().to_string();

    let payload_path = dir.path().join("team.json");
    fs::write(&payload_path, format!(r#"["{ada}", "{ada}"]"#)).unwrap();
    let output = run_portfolio(
        &db,
        [
            OsStr::new("set-team-members"),
            OsStr::new(&team_id),
            payload_path.as_os_str(),
        ],
    );
    assert_eq!(output.status.code(), Some(2));

    fs::write(&payload_path, format!(r#"["{ada}"]"#)).unwrap();
    assert_success(&run_portfolio(
        &db,
        [
            OsStr::new("set-team-members"),
            OsStr::new(&team_id),
            payload_path.as_os_str(),
        ],
    ));

    let listed = parse_json(&run_portfolio(
        &db,
        ["list-team-members", team_id.as_str(), "--json"],
    ));
    assert_eq!(listed["members"], serde_json::json!([ada]));
}

#[test]
fn payload_with_unknown_field_exits_with_invalid_argument() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("portfolio.sqlite3");
    let ada = add_user(&db, "Ada");
    let project_id = add_project(&db);

    let payload_path = dir.path().join("members.json");
    fs::write(
        &payload_path,
        format!(
            r#"[{{"user_id": "{ada}", "since": {{"year": 2021, "semester": 0}}, "role": "lead"}}]"#
        ),
    )
    .unwrap();

    let output = run_portfolio(
        &db,
        [
            OsStr::new("set-project-members"),
            OsStr::new(&project_id),
            payload_path.as_os_str(),
        ],
    );
    assert_exit_code(&output, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("role"));

    let listed = parse_json(&run_portfolio(
        &db,
        ["list-project-members", project_id.as_str(), "--json"],
    ));
    assert_eq!(listed["members"], serde_json::json!([]));
}

#[test]
fn missing_payload_file_exits_with_invalid_argument() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("portfolio.sqlite3");
    let project_id = add_project(&db);
    let missing = dir.path().join("absent.json");

    let output = run_portfolio(
        &db,
        [
            OsStr::new("set-project-members"),
            OsStr::new(&project_id),
            missing.as_os_str(),
        ],
    );
    assert_exit_code(&output, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}

#[test]
fn unsupported_log_level_exits_with_invalid_argument() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("portfolio.sqlite3");

    let output = run_portfolio_with_env(
        &db,
        &[("PORTFOLIO_LOG_LEVEL", OsStr::new("chatty"))],
        ["init"],
    );
    assert_exit_code(&output, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("PORTFOLIO_LOG_LEVEL"));
    assert!(!db.exists());
}

#[test]
fn relative_log_dir_exits_with_invalid_argument() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("portfolio.sqlite3");

    let output = run_portfolio_with_env(
        &db,
        &[("PORTFOLIO_LOG_DIR", OsStr::new("relative/logs"))],
        ["init"],
    );
    assert_exit_code(&output, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("PORTFOLIO_LOG_DIR"));
    assert!(!db.exists());
}

#[test]
fn uncreatable_log_dir_exits_with_invalid_argument() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("portfolio.sqlite3");
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();
    let log_dir = blocker.join("logs");

    let output = run_portfolio_with_env(
        &db,
        &[("PORTFOLIO_LOG_DIR", log_dir.as_os_str())],
        ["init"],
    );
    assert_exit_code(&output, 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("log directory"));
    assert!(!db.exists());
}

#[test]
fn log_dir_receives_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("portfolio.sqlite3");
    let log_dir = dir.path().join("logs");

    assert_success(&run_portfolio_with_env(
        &db,
        &[("PORTFOLIO_LOG_DIR", log_dir.as_os_str())],
        ["init"],
    ));
    let has_log = fs::read_dir(&log_dir)
        .unwrap()
        .filter_map(Result::ok)
        .any(|entry| entry.file_name().to_string_lossy().starts_with("portfolio"));
    assert!(has_log);
}
