use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};

use situm_core::CrmConfig;
use situm_core::deletion::DeletionKey;
use situm_core::model::{EventName, InteractionStatus, Operator, Region, Source, TargetType};
use situm_core::report::GroupBy;

/// Outreach goal tracking for the SITUM program.
#[derive(Parser, Debug)]
#[command(name = "situm", author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding `interazioni_log.csv` and `obiettivi.csv`.
    #[arg(long, env = "SITUM_DATA_DIR", default_value = ".", global = true)]
    pub data_dir: PathBuf,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data files with their headers if they do not exist.
    Init,
    /// Record a new interaction dated today.
    Record(RecordArgs),
    /// Read or update goals.
    #[command(subcommand)]
    Goals(GoalsCommand),
    /// Goal progress and suggested contacts per day.
    Progress(ProgressArgs),
    /// Filtered contact list, optionally exported to CSV.
    Rubric(RubricArgs),
    /// List or delete the operator's own interactions.
    Delete(DeleteArgs),
    /// Interaction counts grouped by region, event or month.
    Report(ReportArgs),
    /// Cumulative participants per operator and target for an event.
    Cumulative(CumulativeArgs),
    /// Show a historical contact list file.
    Contacts(ContactsArgs),
}

#[derive(ClapArgs, Debug)]
pub struct OperatorArg {
    /// Operator name, or `coordinator`.
    #[arg(long, env = "SITUM_OPERATOR", value_parser = parse_operator)]
    pub operator: Operator,
}

#[derive(ClapArgs, Debug)]
pub struct RecordArgs {
    #[command(flatten)]
    pub operator: OperatorArg,
    #[arg(long)]
    pub name: String,
    #[arg(long, value_parser = parse_target)]
    pub target: TargetType,
    #[arg(long, default_value = "")]
    pub affiliation: String,
    #[arg(long, value_parser = parse_region)]
    pub region: Region,
    #[arg(long)]
    pub event: EventName,
    #[arg(long, value_parser = parse_status)]
    pub status: InteractionStatus,
    #[arg(long, value_parser = parse_source)]
    pub source: Source,
    #[arg(long)]
    pub note: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub transcript: Option<String>,
    /// Text file merged into the transcript.
    #[arg(long)]
    pub attach: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum GoalsCommand {
    /// Replace the three target goals of an event.
    Set(GoalsSetArgs),
    /// Show the stored goals of an event.
    Show(GoalsShowArgs),
    /// Events the operator can set goals for.
    Events(OperatorArg),
}

#[derive(ClapArgs, Debug)]
pub struct GoalsSetArgs {
    #[command(flatten)]
    pub operator: OperatorArg,
    #[arg(long)]
    pub event: EventName,
    #[arg(long, default_value_t = 0)]
    pub business: u32,
    #[arg(long, default_value_t = 0)]
    pub teacher: u32,
    #[arg(long, default_value_t = 0)]
    pub student: u32,
    /// Deadline as YYYY-MM-DD.
    #[arg(long)]
    pub deadline: NaiveDate,
}

#[derive(ClapArgs, Debug)]
pub struct GoalsShowArgs {
    #[command(flatten)]
    pub operator: OperatorArg,
    #[arg(long)]
    pub event: EventName,
}

#[derive(ClapArgs, Debug)]
pub struct ProgressArgs {
    #[command(flatten)]
    pub operator: OperatorArg,
    #[arg(long)]
    pub event: EventName,
    /// Compute a single target against an explicit goal instead of stored goals.
    #[arg(long, value_parser = parse_target, requires_all = ["goal", "deadline"])]
    pub target: Option<TargetType>,
    #[arg(long)]
    pub goal: Option<u32>,
    #[arg(long)]
    pub deadline: Option<NaiveDate>,
}

#[derive(ClapArgs, Debug)]
pub struct RubricArgs {
    #[command(flatten)]
    pub operator: OperatorArg,
    #[arg(long)]
    pub event: Option<EventName>,
    #[arg(long, value_parser = parse_target)]
    pub target: Option<TargetType>,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<InteractionStatus>,
    /// Write the filtered rows to this CSV file (a directory gets `rubrica_<operator>.csv`).
    #[arg(long)]
    pub export: Option<PathBuf>,
    /// Only list the available filter values.
    #[arg(long)]
    pub options: bool,
}

#[derive(ClapArgs, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub operator: OperatorArg,
    /// Key of the interaction to delete, as shown by `--list` (`<id>:<digest>`).
    #[arg(long, conflicts_with = "list", required_unless_present = "list")]
    pub key: Option<DeletionKey>,
    #[arg(long)]
    pub list: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ReportArgs {
    #[arg(long, default_value = "event")]
    pub group_by: GroupBy,
    #[arg(long, value_parser = parse_target)]
    pub target: Option<TargetType>,
}

#[derive(ClapArgs, Debug)]
pub struct CumulativeArgs {
    /// Event to chart; defaults to the first event in the log.
    #[arg(long)]
    pub event: Option<EventName>,
}

#[derive(ClapArgs, Debug)]
pub struct ContactsArgs {
    pub path: PathBuf,
}

// ─── Value parsers ─────────────────────────────────────────────────────────────

/// Accepts a configured label or a case-insensitive short name for one.
fn lenient<T: Copy + PartialEq>(
    offered: &[T],
    label: impl Fn(T) -> &'static str,
    aliases: &[(&str, T)],
    raw: &str,
) -> Result<T, String> {
    let wanted = raw.trim();
    offered
        .iter()
        .copied()
        .find(|v| label(*v).eq_ignore_ascii_case(wanted))
        .or_else(|| {
            aliases
                .iter()
                .find(|(alias, v)| alias.eq_ignore_ascii_case(wanted) && offered.contains(v))
                .map(|(_, v)| *v)
        })
        .ok_or_else(|| {
            let choices: Vec<&str> = offered.iter().map(|v| label(*v)).collect();
            format!("expected one of: {}", choices.join(", "))
        })
}

fn parse_operator(raw: &str) -> Result<Operator, String> {
    let config = CrmConfig::situm();
    let aliases = [("coordinator", config.coordinator), ("alessandro", config.coordinator)];
    lenient(&config.operators, Operator::as_str, &aliases, raw)
}

fn parse_target(raw: &str) -> Result<TargetType, String> {
    let aliases = [
        ("business", TargetType::Business),
        ("teacher", TargetType::Teacher),
        ("student", TargetType::Student),
    ];
    lenient(&CrmConfig::situm().target_types, TargetType::as_str, &aliases, raw)
}

fn parse_region(raw: &str) -> Result<Region, String> {
    lenient(&CrmConfig::situm().regions, Region::as_str, &[], raw)
}

fn parse_status(raw: &str) -> Result<InteractionStatus, String> {
    let aliases = [
        ("contacted", InteractionStatus::Contacted),
        ("letter-signed", InteractionStatus::LetterSigned),
        ("form-filled", InteractionStatus::FormFilled),
        ("paid", InteractionStatus::Paid),
    ];
    lenient(&CrmConfig::situm().statuses, InteractionStatus::as_str, &aliases, raw)
}

fn parse_source(raw: &str) -> Result<Source, String> {
    let aliases = [
        ("phone", Source::Phone),
        ("website", Source::Website),
        ("other", Source::Other),
    ];
    lenient(&CrmConfig::situm().sources, Source::as_str, &aliases, raw)
}
