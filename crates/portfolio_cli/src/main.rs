//! Portfolio CLI: the `portfolio` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let db = cli.db;

    match cli.command {
        Commands::Init { json } => commands::init::run(db, json),

        Commands::AddUser { name, json } => commands::entity::run_add_user(db, name, json),

        Commands::AddProject {
            title,
            since,
            until,
            json,
        } => commands::entity::run_add_project(db, title, since, until, json),

        Commands::AddContest {
            title,
            held_in,
            json,
        } => commands::entity::run_add_contest(db, title, held_in, json),

        Commands::AddTeam {
            contest,
            name,
            json,
        } => commands::entity::run_add_team(db, contest, name, json),

        Commands::SetProjectMembers {
            project,
            file,
            json,
        } => commands::members::run_set_project(db, project, file, json),

        Commands::SetTeamMembers { team, file, json } => {
            commands::members::run_set_team(db, team, file, json)
        }

        Commands::ListProjectMembers { project, json } => {
            commands::members::run_list_project(db, project, json)
        }

        Commands::ListTeamMembers { team, json } => {
            commands::members::run_list_team(db, team, json)
        }
    }
}
