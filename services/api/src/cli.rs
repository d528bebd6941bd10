use crate::commands::{
    run_chat_session, run_password_check, run_result, run_roll_number, run_session,
    PasswordArgs, ResultArgs, RollNumberArgs, SessionCommand,
};
use crate::demo::{run_demo, seed_book, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use srms::error::AppError;
use srms::records::{RecordBook, RecordImporter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Student Result Service",
    about = "Serve and query student results from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Look up one student's result by roll number and date of birth
    Result(ResultArgs),
    /// Suggest the next roll number for a class
    RollNumber(RollNumberArgs),
    /// Check a candidate password against the strength rules
    Password(PasswordArgs),
    /// Interactive result lookup on the terminal
    Chat(RecordArgs),
    /// Inspect or change the persisted sign-in session
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },
    /// Walk through the main features against built-in records
    Demo(DemoArgs),
}

/// CSV exports to load. Built-in demo records are used when none is given.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct RecordArgs {
    /// Roster export (Student ID,Name,Email,Class,Roll No,DOB,Phone)
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Marks export (Marks ID,Student ID,Subject,Marks Obtained,Max Marks,Term,Year)
    #[arg(long)]
    pub(crate) marks: Option<PathBuf>,
    /// Class subject export (Class,Subject,Code)
    #[arg(long)]
    pub(crate) subjects: Option<PathBuf>,
}

impl RecordArgs {
    pub(crate) fn load_book(&self) -> Result<RecordBook, AppError> {
        if self.roster.is_none() && self.marks.is_none() && self.subjects.is_none() {
            return Ok(seed_book());
        }

        Ok(RecordImporter::book_from_paths(
            self.roster.as_deref(),
            self.marks.as_deref(),
            self.subjects.as_deref(),
        )?)
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) records: RecordArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Result(args) => run_result(args),
        Command::RollNumber(args) => run_roll_number(args),
        Command::Password(args) => {
            run_password_check(args);
            Ok(())
        }
        Command::Chat(args) => run_chat_session(args),
        Command::Session { command } => run_session(command),
        Command::Demo(args) => run_demo(args),
    }
}
