use crate::support::{entity_exit_code, exit_with, load_config, open_or_exit, print_json};
use log::info;
use portfolio_core::{
    EntityService, SqliteEntityRepository, YearWithSemester, YearWithSemesterDuration,
};
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

pub fn run_add_user(db: Option<PathBuf>, name: String, json_output: bool) {
    let config = load_config(db);
    let conn = open_or_exit(&config);
    let service = EntityService::new(SqliteEntityRepository::new(&conn));

    let user = service
        .create_user(&name)
        .unwrap_or_else(|e| exit_with(entity_exit_code(&e), e));
    info!(
        "event=cli_add_user module=cli status=ok user_id={}",
        user.user_id
    );

    if json_output {
        print_json(&json!({ "action": "user.add", "user": user }));
    } else {
        println!("{}\t{}", user.user_id, user.display_name);
    }
}

pub fn run_add_project(
    db: Option<PathBuf>,
    title: String,
    since: YearWithSemester,
    until: Option<YearWithSemester>,
    json_output: bool,
) {
    let config = load_config(db);
    let conn = open_or_exit(&config);
    let service = EntityService::new(SqliteEntityRepository::new(&conn));

    let project = service
        .create_project(&title, YearWithSemesterDuration::new(since, until))
        .unwrap_or_else(|e| exit_with(entity_exit_code(&e), e));
    info!(
        "event=cli_add_project module=cli status=ok project_id={}",
        project.project_id
    );

    if json_output {
        print_json(&json!({ "action": "project.add", "project": project }));
    } else {
        println!(
            "{}\t{}\t{}",
            project.project_id, project.title, project.duration
        );
    }
}

pub fn run_add_contest(
    db: Option<PathBuf>,
    title: String,
    held_in: YearWithSemester,
    json_output: bool,
) {
    let config = load_config(db);
    let conn = open_or_exit(&config);
    let service = EntityService::new(SqliteEntityRepository::new(&conn));

    let contest = service
        .create_contest(&title, held_in)
        .unwrap_or_else(|e| exit_with(entity_exit_code(&e), e));
    info!(
        "event=cli_add_contest module=cli status=ok contest_id={}",
        contest.contest_id
    );

    if json_output {
        print_json(&json!({ "action": "contest.add", "contest": contest }));
    } else {
        println!(
            "{}\t{}\t{}",
            contest.contest_id, contest.title, contest.held_in
        );
    }
}

pub fn run_add_team(db: Option<PathBuf>, contest_id: Uuid, name: String, json_output: bool) {
    let config = load_config(db);
    let conn = open_or_exit(&config);
    let service = EntityService::new(SqliteEntityRepository::new(&conn));

    let team = service
        .create_team(contest_id, &name)
        .unwrap_or_else(|e| exit_with(entity_exit_code(&e), e));
    info!(
        "event=cli_add_team module=cli status=ok team_id={} contest_id={}",
        team.team_id, team.contest_id
    );

    if json_output {
        print_json(&json!({ "action": "team.add", "team": team }));
    } else {
        println!("{}\t{}\t{}", team.team_id, team.contest_id, team.name);
    }
}
