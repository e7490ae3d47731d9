//! Roster admin CLI.
//!
//! # Responsibility
//! - Run the core startup sequence and apply one roster command.
//! - Surface validation, store and storage failures on stderr.
//! - Warn on stderr when startup fell back from an unreadable file.
//!
//! # Invariants
//! - Mutations are saved before their confirmation is printed.
//! - Log lines carry error kinds and field names, never field values.

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use roster_core::predicates::{self, NameMatch};
use roster_core::{
    init_logging, init_stderr_logging, read_config, start_session, Address, Email, Identity,
    LoadSource, Name, Phone, PrefsRepository, Record, RecordPredicate, RecordValidationError,
    RosterRepository, Session, StorageError, StoreError, Subject, Tag, ViewError,
    DEFAULT_CONFIG_FILE,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(
    name = "roster",
    version = env!("CARGO_PKG_VERSION"),
    about = "Tuition-center student roster"
)]
struct Cli {
    /// Config file; defaults to `config.json` in the working directory.
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// Directory for rolling log files; overrides `log_dir` from config.
    #[clap(long, global = true)]
    log_dir: Option<PathBuf>,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the (optionally filtered and sorted) roster
    List(ListArgs),
    /// Add a student
    Add(AddArgs),
    /// Delete the student with this NRIC
    Delete { nric: String },
    /// Enrol a student in a subject class
    Enrol {
        nric: String,
        subject: String,
        class: String,
    },
}

impl Command {
    fn label(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Add(_) => "add",
            Self::Delete { .. } => "delete",
            Self::Enrol { .. } => "enrol",
        }
    }
}

#[derive(clap::Args, Debug, Default)]
struct ListArgs {
    #[clap(long, value_enum, default_value = "insertion")]
    sort: SortKey,
    /// Keep students whose name contains any of these words.
    #[clap(long, num_args = 1..)]
    find: Vec<String>,
    #[clap(long)]
    tag: Option<String>,
    #[clap(long)]
    subject: Option<String>,
    #[clap(long)]
    class: Option<String>,
}

#[derive(clap::Args, Debug)]
struct AddArgs {
    #[clap(long)]
    nric: String,
    #[clap(long)]
    name: String,
    #[clap(long)]
    phone: String,
    #[clap(long)]
    email: String,
    #[clap(long)]
    address: String,
    /// Enrolment as `SUBJECT:CLASS`; repeatable.
    #[clap(long = "subject", value_parser = parse_enrolment)]
    subjects: Vec<(String, String)>,
    #[clap(long = "tag")]
    tags: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum SortKey {
    #[default]
    Insertion,
    Name,
    Class,
}

#[derive(Debug)]
enum CliError {
    Validation(RecordValidationError),
    Store(StoreError),
    View(ViewError),
    Storage(StorageError),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid {}: {err}", err.field()),
            Self::Store(err) => write!(f, "{err}"),
            Self::View(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::View(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl CliError {
    /// Metadata-only `key=value` fields for log lines; never echoes input values.
    fn log_fields(&self) -> String {
        match self {
            Self::Validation(err) => {
                format!("error_kind=invalid_argument field={}", err.field())
            }
            Self::Store(err) => format!("error_kind={}", err.kind()),
            Self::View(_) => "error_kind=missing_predicate".to_string(),
            Self::Storage(err) => err.log_fields(),
        }
    }
}

impl From<RecordValidationError> for CliError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ViewError> for CliError {
    fn from(value: ViewError) -> Self {
        Self::View(value)
    }
}

impl From<StorageError> for CliError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// What one invocation prints and the process exit code.
#[derive(Debug, Default)]
struct Outcome {
    stdout: Vec<String>,
    stderr: Vec<String>,
    code: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    start_logging(&config_path, cli.log_dir.as_deref());

    let session = start_session(Some(&config_path));
    let command = cli.command.unwrap_or(Command::List(ListArgs::default()));
    let outcome = execute(session, command);

    for line in &outcome.stderr {
        eprintln!("{line}");
    }
    for line in &outcome.stdout {
        println!("{line}");
    }
    ExitCode::from(outcome.code)
}

/// Applies `command`, then shuts the session down.
///
/// Startup fallbacks are reported ahead of the command result; any command
/// or shutdown failure makes the exit code non-zero.
fn execute<R: RosterRepository, P: PrefsRepository>(
    mut session: Session<R, P>,
    command: Command,
) -> Outcome {
    let mut outcome = Outcome {
        stderr: startup_warnings(&session),
        ..Outcome::default()
    };

    let label = command.label();
    match run(&mut session, command) {
        Ok(lines) => {
            info!("event=cli_command module=cli command={label} status=ok");
            outcome.stdout = lines;
        }
        Err(err) => {
            error!(
                "event=cli_command module=cli command={label} status=error {}",
                err.log_fields()
            );
            outcome.stderr.push(format!("error: {err}"));
            outcome.code = 1;
        }
    }
    for failure in session.shutdown() {
        outcome.stderr.push(format!("error: {failure}"));
        outcome.code = 1;
    }
    outcome
}

/// One line per startup stage that fell back because its file was unusable.
fn startup_warnings<R: RosterRepository, P: PrefsRepository>(
    session: &Session<R, P>,
) -> Vec<String> {
    let report = session.report();
    let mut warnings = Vec::new();
    if report.config == LoadSource::Recovered {
        warnings.push("warning: config file could not be read; using default settings".to_string());
    }
    if report.prefs == LoadSource::Recovered {
        warnings.push(format!(
            "warning: preferences file `{}` could not be read; using defaults",
            session.prefs_storage().prefs_path().display()
        ));
    }
    if report.data == LoadSource::Recovered {
        warnings.push(format!(
            "warning: data file `{}` could not be loaded; starting with an empty roster. \
             Any change to the roster will overwrite this file.",
            session.roster_storage().roster_path().display()
        ));
    }
    warnings
}

/// Applies one command and returns the lines to print.
fn run<R: RosterRepository, P: PrefsRepository>(
    session: &mut Session<R, P>,
    command: Command,
) -> Result<Vec<String>, CliError> {
    match command {
        Command::List(args) => list(session, &args),
        Command::Add(args) => {
            let record = build_record(&args)?;
            session.store_mut().add(record.clone())?;
            session.save_roster()?;
            Ok(vec![format!("New student added: {record}")])
        }
        Command::Delete { nric } => {
            let identity = Identity::parse(&nric)?;
            let target = session.store().find_by_identity(&identity)?.clone();
            let removed = session.store_mut().remove(&target)?;
            session.save_roster()?;
            Ok(vec![format!("Deleted student: {removed}")])
        }
        Command::Enrol {
            nric,
            subject,
            class,
        } => {
            let identity = Identity::parse(&nric)?;
            let subject = Subject::parse(&subject, &class)?;
            let target = session.store().find_by_identity(&identity)?.clone();
            let updated = session.store_mut().add_subject_to_record(&target, subject)?;
            session.save_roster()?;
            Ok(vec![format!("Enrolled: {updated}")])
        }
    }
}

fn list<R: RosterRepository, P: PrefsRepository>(
    session: &mut Session<R, P>,
    args: &ListArgs,
) -> Result<Vec<String>, CliError> {
    let mut filters: Vec<RecordPredicate> = Vec::new();
    if !args.find.is_empty() {
        filters.push(predicates::name_contains_keywords(&args.find, NameMatch::Token));
    }
    if let Some(tag) = &args.tag {
        filters.push(predicates::has_tag(tag));
    }
    if let Some(subject) = &args.subject {
        filters.push(predicates::enrolled_in_subject(subject));
    }
    if let Some(class) = &args.class {
        filters.push(predicates::in_class(class));
    }

    let view = session.view_mut();
    if filters.is_empty() {
        view.show_all();
    } else {
        view.set_predicate(Some(predicates::all_of(filters)))?;
    }
    match args.sort {
        SortKey::Insertion => view.sort_by_insertion(),
        SortKey::Name => view.sort_by_name(),
        SortKey::Class => view.sort_by_class(),
    }

    let records = session.current_view();
    let mut lines = records
        .iter()
        .enumerate()
        .map(|(index, record)| format!("{}. {record}", index + 1))
        .collect::<Vec<_>>();
    lines.push(format!("{} students listed", records.len()));
    Ok(lines)
}

fn build_record(args: &AddArgs) -> Result<Record, RecordValidationError> {
    let subjects = args
        .subjects
        .iter()
        .map(|(subject, class)| Subject::parse(subject, class))
        .collect::<Result<Vec<_>, _>>()?;
    let tags = args
        .tags
        .iter()
        .map(|tag| Tag::parse(tag))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Record::new(
        Identity::parse(&args.nric)?,
        Name::parse(&args.name)?,
        Phone::parse(&args.phone)?,
        Email::parse(&args.email)?,
        Address::parse(&args.address)?,
        subjects,
        tags,
    ))
}

fn parse_enrolment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((subject, class)) if !subject.trim().is_empty() && !class.trim().is_empty() => {
            Ok((subject.trim().to_string(), class.trim().to_string()))
        }
        _ => Err(format!("expected SUBJECT:CLASS, got `{raw}`")),
    }
}

/// Starts logging before the session so startup events are captured.
///
/// Uses rolling files when a log directory is known and stderr otherwise;
/// warnings reach stderr either way.
fn start_logging(config_path: &Path, cli_log_dir: Option<&Path>) {
    // Why: a corrupt config is reported again by the startup sequence.
    let config = read_config(config_path).ok().flatten().unwrap_or_default();
    let started = match cli_log_dir.map(Path::to_path_buf).or(config.log_dir.clone()) {
        Some(log_dir) => match absolute(&log_dir) {
            Ok(log_dir) => init_logging(&config.log_level, &log_dir),
            Err(err) => {
                eprintln!("warning: cannot resolve log dir `{}`: {err}", log_dir.display());
                init_stderr_logging(&config.log_level)
            }
        },
        None => init_stderr_logging(&config.log_level),
    };
    if let Err(err) = started {
        eprintln!("warning: {err}; logging warnings to stderr");
        if let Err(err) = init_stderr_logging("warn") {
            eprintln!("warning: logging disabled: {err}");
        }
    }
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
