use crate::support::parse_half_year;
use clap::{Parser, Subcommand};
use portfolio_core::YearWithSemester;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "portfolio",
    about = "Portfolio: users, projects and contest teams with half-year membership spans",
    version
)]
pub struct Cli {
    /// SQLite database path (overrides PORTFOLIO_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and apply migrations
    Init {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a user
    AddUser {
        /// Display name
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a project with its span
    AddProject {
        /// Project title
        title: String,

        /// First half-year, as `YEAR/SEMESTER` (semester 0 or 1)
        #[arg(long, value_parser = parse_half_year)]
        since: YearWithSemester,

        /// Last half-year; omit for an ongoing project
        #[arg(long, value_parser = parse_half_year)]
        until: Option<YearWithSemester>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a contest held in one half-year
    AddContest {
        /// Contest title
        title: String,

        /// Half-year the contest is held in, as `YEAR/SEMESTER`
        #[arg(long, value_parser = parse_half_year)]
        held_in: YearWithSemester,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a team under a contest
    AddTeam {
        /// Contest id
        contest: Uuid,

        /// Team name
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a project's member list with the entries in a JSON file
    SetProjectMembers {
        /// Project id
        project: Uuid,

        /// JSON array of `{"user_id", "since", "until"}` entries
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a contest team's member list with the user ids in a JSON file
    SetTeamMembers {
        /// Contest team id
        team: Uuid,

        /// JSON array of user ids
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a project's members with their spans
    ListProjectMembers {
        /// Project id
        project: Uuid,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a contest team's member ids
    ListTeamMembers {
        /// Contest team id
        team: Uuid,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
