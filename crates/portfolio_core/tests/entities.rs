use portfolio_core::db::open_db_in_memory;
use portfolio_core::{
    ContestTeamMemberService, EntityService, EntityServiceError, ProjectMemberService,
    ProjectMemberSpec, RepoError, SqliteEntityRepository, SqliteProjectMemberRepository,
    SqliteTeamMemberRepository, YearWithSemester, YearWithSemesterDuration,
};
use rusqlite::{params, Connection};
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn half(year: i32, semester: i32) -> YearWithSemester {
    YearWithSemester::new(year, semester)
}

fn span(since: (i32, i32), until: Option<(i32, i32)>) -> YearWithSemesterDuration {
    YearWithSemesterDuration::new(
        half(since.0, since.1),
        until.map(|(year, semester)| half(year, semester)),
    )
}

#[test]
fn create_and_list_entities() {
    let conn = setup();
    let service = EntityService::new(SqliteEntityRepository::new(&conn));

    let zed = service.create_user("  Zed ").unwrap();
    let ada = service.create_user("Ada").unwrap();
    assert_eq!(zed.display_name, "Zed");
    let names: Vec<String> = service
        .list_users()
        .unwrap()
        .into_iter()
        .map(|user| user.display_name)
        .collect();
    assert_eq!(names, vec!["Ada", "Zed"]);
    assert_eq!(service.get_user(ada.user_id).unwrap(), ada);

    let project = service
        .create_project("Compiler", span((2021, 0), None))
        .unwrap();
    assert_eq!(service.get_project(project.project_id).unwrap(), project);
    assert_eq!(service.list_projects().unwrap(), vec![project]);

    let older = service.create_contest("Hackathon", half(2021, 1)).unwrap();
    let newer = service.create_contest("ICPC", half(2023, 0)).unwrap();
    assert_eq!(service.list_contests().unwrap(), vec![newer.clone(), older]);

    let team = service.create_team(newer.contest_id, "Segfault").unwrap();
    assert_eq!(service.get_team(team.team_id).unwrap(), team);
    assert_eq!(service.list_teams(newer.contest_id).unwrap(), vec![team]);
}

#[test]
fn invalid_input_is_rejected_before_storage() {
    let conn = setup();
    let service = EntityService::new(SqliteEntityRepository::new(&conn));

    assert!(matches!(
        service.create_user("   "),
        Err(EntityServiceError::BlankName(_))
    ));
    assert!(matches!(
        service.create_project("Compiler", span((2022, 1), Some((2022, 0)))),
        Err(EntityServiceError::InvalidDuration(_))
    ));
    assert!(matches!(
        service.create_project("Compiler", span((1969, 1), None)),
        Err(EntityServiceError::InvalidDuration(_))
    ));
    assert!(matches!(
        service.create_contest("ICPC", half(2023, 2)),
        Err(EntityServiceError::InvalidHalfYear(_))
    ));

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.create_team(missing, "Segfault"),
        Err(EntityServiceError::ContestNotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.get_project(missing),
        Err(EntityServiceError::ProjectNotFound(_))
    ));
    assert!(service.list_users().unwrap().is_empty());
}

#[test]
fn project_span_cannot_shrink_below_member_spans() {
    let mut conn = setup();
    let (user_id, project_id) = {
        let service = EntityService::new(SqliteEntityRepository::new(&conn));
        let user = service.create_user("Ada").unwrap();
        let project = service
            .create_project("Compiler", span((2020, 0), None))
            .unwrap();
        (user.user_id, project.project_id)
    };
    {
        let mut members = ProjectMemberService::new(SqliteProjectMemberRepository::new(&mut conn));
        members
            .reconcile(
                project_id,
                &[ProjectMemberSpec::with_duration(
                    user_id,
                    span((2020, 1), Some((2022, 0))),
                )],
            )
            .unwrap();
    }

    let service = EntityService::new(SqliteEntityRepository::new(&conn));
    let err = service
        .update_project_duration(project_id, span((2021, 0), None))
        .unwrap_err();
    match err {
        EntityServiceError::MembersOutsideDuration { members, .. } => {
            assert_eq!(members, vec![user_id])
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        service.get_project(project_id).unwrap().duration,
        span((2020, 0), None)
    );

    let updated = service
        .update_project_duration(project_id, span((2020, 1), Some((2022, 0))))
        .unwrap();
    assert_eq!(updated.duration, span((2020, 1), Some((2022, 0))));
    assert_eq!(service.get_project(project_id).unwrap(), updated);

    assert!(matches!(
        service.update_project_duration(Uuid::new_v4(), span((2020, 0), None)),
        Err(EntityServiceError::ProjectNotFound(_))
    ));
}

#[test]
fn user_portfolio_collects_projects_and_teams() {
    let mut conn = setup();
    let (user_id, early, late, team_id) = {
        let service = EntityService::new(SqliteEntityRepository::new(&conn));
        let user = service.create_user("Ada").unwrap();
        let late = service
            .create_project("Runtime", span((2020, 0), None))
            .unwrap();
        let early = service
            .create_project("Parser", span((2019, 0), None))
            .unwrap();
        let contest = service.create_contest("ICPC", half(2022, 1)).unwrap();
        let team = service.create_team(contest.contest_id, "Segfault").unwrap();
        (user.user_id, early, late, team.team_id)
    };
    {
        let mut members = ProjectMemberService::new(SqliteProjectMemberRepository::new(&mut conn));
        members
            .reconcile(
                late.project_id,
                &[ProjectMemberSpec::with_duration(user_id, span((2021, 1), None))],
            )
            .unwrap();
        members
            .reconcile(
                early.project_id,
                &[ProjectMemberSpec::with_duration(
                    user_id,
                    span((2019, 1), Some((2020, 0))),
                )],
            )
            .unwrap();
    }
    {
        let mut members =
            ContestTeamMemberService::new(SqliteTeamMemberRepository::new(&mut conn));
        members.reconcile(team_id, &[user_id]).unwrap();
    }

    let service = EntityService::new(SqliteEntityRepository::new(&conn));
    let portfolio = service.user_portfolio(user_id).unwrap();
    assert_eq!(portfolio.user.display_name, "Ada");
    let titles: Vec<&str> = portfolio
        .projects
        .iter()
        .map(|item| item.project.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Parser", "Runtime"]);
    assert_eq!(portfolio.projects[0].duration, span((2019, 1), Some((2020, 0))));
    assert_eq!(portfolio.teams.len(), 1);
    assert_eq!(portfolio.teams[0].team_id, team_id);

    assert!(matches!(
        service.user_portfolio(Uuid::new_v4()),
        Err(EntityServiceError::UserNotFound(_))
    ));
}

#[test]
fn user_portfolio_rejects_half_populated_member_span() {
    let conn = setup();
    let service = EntityService::new(SqliteEntityRepository::new(&conn));
    let user = service.create_user("Ada").unwrap();
    let project = service
        .create_project("Compiler", span((2020, 0), None))
        .unwrap();

    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute(
        "INSERT INTO project_members (
            project_uuid, user_uuid, since_year, since_semester, until_year, until_semester
        ) VALUES (?1, ?2, 2020, 1, 2022, NULL);",
        params![project.project_id.to_string(), user.user_id.to_string()],
    )
    .unwrap();

    match service.user_portfolio(user.user_id).unwrap_err() {
        EntityServiceError::Repo(RepoError::InvalidData(message)) => {
            assert!(message.contains("member_until"), "{message}")
        }
        other => panic!("unexpected error: {other}"),
    }
}
