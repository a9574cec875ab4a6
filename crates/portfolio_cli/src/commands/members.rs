use crate::support::{
    exit_with, load_config, open_or_exit, print_json, read_json_or_exit, reconcile_exit_code,
};
use log::info;
use portfolio_core::{
    ContestTeamMemberService, MemberId, ProjectMemberService, ProjectMemberSpec,
    ReconcileSummary, SqliteProjectMemberRepository, SqliteTeamMemberRepository,
    YearWithSemester, YearWithSemesterDuration,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use uuid::Uuid;

/// One project member entry as written in the payload file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectMemberEntry {
    user_id: Uuid,
    since: YearWithSemester,
    #[serde(default)]
    until: Option<YearWithSemester>,
}

impl From<ProjectMemberEntry> for ProjectMemberSpec {
    fn from(entry: ProjectMemberEntry) -> Self {
        ProjectMemberSpec::with_duration(
            entry.user_id,
            YearWithSemesterDuration::new(entry.since, entry.until),
        )
    }
}

pub fn run_set_project(db: Option<PathBuf>, project_id: Uuid, file: PathBuf, json_output: bool) {
    let entries: Vec<ProjectMemberEntry> = read_json_or_exit(&file);
    let desired: Vec<ProjectMemberSpec> = entries.into_iter().map(Into::into).collect();

    let config = load_config(db);
    let mut conn = open_or_exit(&config);
    let mut service = ProjectMemberService::new(SqliteProjectMemberRepository::new(&mut conn));

    let summary = service.reconcile(project_id, &desired).unwrap_or_else(|e| {
        exit_with(
            reconcile_exit_code(&e),
            format!("[{}] {e}", e.error_code()),
        )
    });
    info!(
        "event=cli_set_members module=cli status=ok relation=project_members parent_id={} requested={}",
        project_id,
        desired.len()
    );
    print_summary("project.members.set", project_id, &summary, json_output);
}

pub fn run_set_team(db: Option<PathBuf>, team_id: Uuid, file: PathBuf, json_output: bool) {
    let member_ids: Vec<MemberId> = read_json_or_exit(&file);

    let config = load_config(db);
    let mut conn = open_or_exit(&config);
    let mut service = ContestTeamMemberService::new(SqliteTeamMemberRepository::new(&mut conn));

    let summary = service.reconcile(team_id, &member_ids).unwrap_or_else(|e| {
        exit_with(
            reconcile_exit_code(&e),
            format!("[{}] {e}", e.error_code()),
        )
    });
    info!(
        "event=cli_set_members module=cli status=ok relation=contest_team_members parent_id={} requested={}",
        team_id,
        member_ids.len()
    );
    print_summary("team.members.set", team_id, &summary, json_output);
}

pub fn run_list_project(db: Option<PathBuf>, project_id: Uuid, json_output: bool) {
    let config = load_config(db);
    let mut conn = open_or_exit(&config);
    let service = ProjectMemberService::new(SqliteProjectMemberRepository::new(&mut conn));

    let members = service
        .list_members(project_id)
        .unwrap_or_else(|e| exit_with(reconcile_exit_code(&e), e));

    if json_output {
        let items: Vec<Value> = members
            .iter()
            .map(|record| {
                json!({
                    "userId": record.member_id,
                    "since": record.attributes.since,
                    "until": record.attributes.until,
                })
            })
            .collect();
        print_json(&json!({ "projectId": project_id, "members": items }));
    } else {
        for record in &members {
            println!("{}\t{}", record.member_id, record.attributes);
        }
    }
}

pub fn run_list_team(db: Option<PathBuf>, team_id: Uuid, json_output: bool) {
    let config = load_config(db);
    let mut conn = open_or_exit(&config);
    let service = ContestTeamMemberService::new(SqliteTeamMemberRepository::new(&mut conn));

    let members = service
        .list_members(team_id)
        .unwrap_or_else(|e| exit_with(reconcile_exit_code(&e), e));

    if json_output {
        print_json(&json!({ "teamId": team_id, "members": members }));
    } else {
        for member_id in &members {
            println!("{member_id}");
        }
    }
}

fn print_summary(action: &str, parent_id: Uuid, summary: &ReconcileSummary, json_output: bool) {
    if json_output {
        print_json(&json!({
            "action": action,
            "parentId": parent_id,
            "added": summary.added,
            "updated": summary.updated,
            "removed": summary.removed,
        }));
    } else {
        println!(
            "{parent_id}\tadded={}\tupdated={}\tremoved={}",
            summary.added, summary.updated, summary.removed
        );
    }
}
