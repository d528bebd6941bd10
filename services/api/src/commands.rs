use crate::chat::run_chat;
use crate::cli::RecordArgs;
use crate::demo::{render_result_card, seed_book};
use clap::{Args, Subcommand};
use srms::config::AppConfig;
use srms::error::AppError;
use srms::identity::next_roll_number;
use srms::lookup::{ResultService, ResultServiceError};
use srms::password::PasswordStrengthEvaluator;
use srms::records::{RecordBook, RecordImporter};
use srms::session::{FileSessionStore, Role, SessionContext, SessionError, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ResultArgs {
    /// Roll number, e.g. 5A02 (case-insensitive)
    #[arg(long)]
    pub(crate) roll: String,
    /// Date of birth in any accepted form (DD/MM/YYYY, DD-MM-YYYY, YYYY-MM-DD, DDMMYYYY)
    #[arg(long)]
    pub(crate) dob: String,
    #[command(flatten)]
    pub(crate) records: RecordArgs,
}

#[derive(Args, Debug)]
pub(crate) struct RollNumberArgs {
    /// Class name, e.g. "Class 5"
    #[arg(long = "class")]
    pub(crate) class_name: String,
    /// Roster export to allocate against
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct PasswordArgs {
    /// Candidate password
    pub(crate) password: String,
    /// Account email the password must not contain
    #[arg(long, default_value = "")]
    pub(crate) email: String,
}

#[derive(Subcommand, Debug)]
pub(crate) enum SessionCommand {
    /// Print the signed-in user, if any
    Show,
    /// Persist a session for the given user
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, value_parser = parse_role, default_value = "student")]
        role: Role,
    },
    /// Clear the persisted session
    Logout,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::parse(raw).ok_or_else(|| format!("unknown role '{raw}' (admin, teacher or student)"))
}

fn book_service(
    book: RecordBook,
    config: &AppConfig,
) -> ResultService<RecordBook, RecordBook, RecordBook> {
    let book = Arc::new(book);
    ResultService::new(
        book.clone(),
        book.clone(),
        book,
        config.grading.clone(),
        &config.lookup,
    )
}

pub(crate) fn run_result(args: ResultArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = book_service(args.records.load_book()?, &config);
    let card = service.lookup(&args.roll, &args.dob)?;
    print!("{}", render_result_card(&card));
    Ok(())
}

pub(crate) fn run_roll_number(args: RollNumberArgs) -> Result<(), AppError> {
    if args.class_name.trim().is_empty() {
        return Err(ResultServiceError::MissingClassName.into());
    }

    let roster = match args.roster {
        Some(path) => RecordImporter::students_from_path(path)?,
        None => seed_book().students,
    };
    println!("{}", next_roll_number(&args.class_name, &roster));
    Ok(())
}

pub(crate) fn run_password_check(args: PasswordArgs) {
    let strength = PasswordStrengthEvaluator.evaluate(&args.password, &args.email);
    println!("{}", strength.label);
    for issue in &strength.issues {
        println!("  - {issue}");
    }
}

pub(crate) fn run_chat_session(args: RecordArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = book_service(args.load_book()?, &config);
    let mut flow = service.flow();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_chat(&mut flow, stdin.lock(), stdout.lock())?;
    Ok(())
}

pub(crate) fn run_session(command: SessionCommand) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let mut context = SessionContext::load(FileSessionStore::new(&config.session.path))?;
    println!("{}", apply_session_command(&mut context, command)?);
    Ok(())
}

fn apply_session_command<S: SessionStore>(
    context: &mut SessionContext<S>,
    command: SessionCommand,
) -> Result<String, SessionError> {
    match command {
        SessionCommand::Show => Ok(match context.current() {
            Some(user) => format!(
                "{} signed in as {} since {}",
                user.email,
                user.role,
                user.login_time.format("%Y-%m-%d %H:%M UTC")
            ),
            None => "not signed in".to_string(),
        }),
        SessionCommand::Login { email, role } => {
            let user = context.login(&email, role)?;
            Ok(format!("signed in {} as {}", user.email, user.role))
        }
        SessionCommand::Logout => Ok(match context.logout()? {
            Some(user) => format!("signed out {}", user.email),
            None => "not signed in".to_string(),
        }),
    }
}
