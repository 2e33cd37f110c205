use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, info};

use services::{AppServices, Clock, CrmConfig, EventPlan, GoalSheet};
use situm_core::model::{InteractionDraft, Selection, TargetGoals};
use situm_core::progress::Progress;
use situm_core::rubric::RubricFilter;

use crate::args::{
    Args, Command, ContactsArgs, CumulativeArgs, DeleteArgs, GoalsCommand, GoalsSetArgs,
    GoalsShowArgs, OperatorArg, ProgressArgs, RecordArgs, ReportArgs, RubricArgs,
};

/// Dispatch one subcommand against the CSV stores in `args.data_dir`.
pub async fn run(args: Args) -> Result<()> {
    let app = AppServices::new_flat_file(&args.data_dir, Clock::default(), CrmConfig::situm())
        .await
        .with_context(|| format!("opening data directory {}", args.data_dir.display()))?;
    let out = Output { json: args.json };
    debug!(data_dir = %args.data_dir.display(), "stores ready");

    match args.command {
        Command::Init => {
            info!(data_dir = %args.data_dir.display(), "data files initialized");
            Ok(())
        }
        Command::Record(record) => record_interaction(&app, &out, record).await,
        Command::Goals(GoalsCommand::Set(set)) => set_goals(&app, &out, set).await,
        Command::Goals(GoalsCommand::Show(show)) => show_goals(&app, &out, show).await,
        Command::Goals(GoalsCommand::Events(OperatorArg { operator })) => {
            let events = app.goals().known_events(operator).await?;
            out.emit(&events, || events.iter().map(ToString::to_string).collect())
        }
        Command::Progress(progress) => show_progress(&app, &out, progress).await,
        Command::Rubric(rubric) => show_rubric(&app, &out, rubric).await,
        Command::Delete(delete) => delete_interaction(&app, &out, delete).await,
        Command::Report(report) => show_report(&app, &out, report).await,
        Command::Cumulative(cumulative) => show_cumulative(&app, &out, cumulative).await,
        Command::Contacts(ContactsArgs { path }) => {
            let list = app.attachments().read_contact_list(&path).await?;
            out.emit(&list, || {
                std::iter::once(list.headers.join("\t"))
                    .chain(list.rows.iter().map(|row| row.join("\t")))
                    .collect()
            })
        }
    }
}

// ─── Output ──────────────────────────────────────────────────────────────────

struct Output {
    json: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> Vec<String>) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            for line in text() {
                println!("{line}");
            }
        }
        Ok(())
    }
}

fn join_labels<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn progress_line(label: &str, progress: &Progress) -> String {
    if !progress.has_goal() {
        return format!("{label}: {} done, no goal set", progress.achieved);
    }
    let suffix = if progress.is_reached() {
        "goal reached".to_owned()
    } else {
        format!("{} per day for {} days", progress.daily_target, progress.days_remaining)
    };
    format!(
        "{label}: {}/{} ({}%), {suffix}",
        progress.achieved, progress.goal, progress.percent
    )
}

fn plan_lines(plan: &EventPlan) -> Vec<String> {
    let mut lines = vec![format!(
        "{} / {} (deadline {}{})",
        plan.operator,
        plan.event,
        plan.deadline,
        if plan.goals_set { "" } else { ", goals not set" }
    )];
    lines.extend(
        plan.targets
            .iter()
            .map(|entry| progress_line(entry.target.as_str(), &entry.progress)),
    );
    lines
}

// ─── Commands ────────────────────────────────────────────────────────────────

async fn record_interaction(app: &AppServices, out: &Output, args: RecordArgs) -> Result<()> {
    let mut draft = InteractionDraft::new(
        args.operator.operator,
        args.name,
        args.target,
        args.affiliation,
        args.region,
        args.event,
        args.status,
        args.source,
    );
    if let Some(note) = args.note {
        draft = draft.with_note(note);
    }
    if let Some(phone) = args.phone {
        draft = draft.with_phone(phone);
    }
    if let Some(transcript) = args.transcript {
        draft = draft.with_transcript(transcript);
    }
    if let Some(path) = args.attach {
        let text = app.attachments().read_text(&path).await?;
        draft = app.attachments().merge_transcript(draft, &text);
    }
    if draft.name.trim().is_empty() {
        bail!("contact name must not be empty");
    }

    let saved = app.interactions().record(draft).await?;
    out.emit(&saved, || vec![format!("#{} {}", saved.id, saved.label())])
}

async fn set_goals(app: &AppServices, out: &Output, args: GoalsSetArgs) -> Result<()> {
    let targets = TargetGoals::new(args.business, args.teacher, args.student);
    let rows = app
        .goals()
        .set_goals(args.operator.operator, &args.event, targets, args.deadline)
        .await?;
    out.emit(&rows, || {
        rows.iter()
            .map(|goal| format!("{}: {} by {}", goal.target, goal.goal_count, goal.deadline))
            .collect()
    })
}

async fn show_goals(app: &AppServices, out: &Output, args: GoalsShowArgs) -> Result<()> {
    let sheet: GoalSheet = app.goals().sheet(args.operator.operator, &args.event).await?;
    let config = app.config();
    out.emit(&sheet, || {
        let mut lines = vec![format!(
            "deadline {}{}",
            sheet.deadline,
            if sheet.is_set { "" } else { " (not set)" }
        )];
        lines.extend(
            config
                .target_types
                .iter()
                .map(|target| format!("{target}: {}", sheet.goals.get(*target))),
        );
        lines
    })
}

async fn show_progress(app: &AppServices, out: &Output, args: ProgressArgs) -> Result<()> {
    let operator = args.operator.operator;
    if let (Some(target), Some(goal), Some(deadline)) = (args.target, args.goal, args.deadline) {
        let progress = app
            .progress()
            .compute_progress(operator, &args.event, target, goal, deadline)
            .await?;
        return out.emit(&progress, || vec![progress_line(target.as_str(), &progress)]);
    }
    let plan = app.progress().event_plan(operator, &args.event).await?;
    out.emit(&plan, || plan_lines(&plan))
}

async fn show_rubric(app: &AppServices, out: &Output, args: RubricArgs) -> Result<()> {
    let viewer = args.operator.operator;
    if args.options {
        let options = app.rubric().options(viewer).await?;
        return out.emit(&options, || {
            vec![
                format!("events: {}", join_labels(&options.events)),
                format!("targets: {}", join_labels(&options.targets)),
                format!("statuses: {}", join_labels(&options.statuses)),
            ]
        });
    }

    let filter = RubricFilter {
        event: Selection::from(args.event),
        target: Selection::from(args.target),
        status: Selection::from(args.status),
    };

    if let Some(path) = args.export {
        let export = app.rubric().export(viewer, &filter).await?;
        let dest = export_destination(&path, &export.file_name);
        tokio::fs::write(&dest, &export.bytes)
            .await
            .with_context(|| format!("writing {}", dest.display()))?;
        info!(path = %dest.display(), rows = export.rows, "rubric written");
        return Ok(());
    }

    let rows = app.rubric().filter(viewer, &filter).await?;
    out.emit(&rows, || {
        rows.iter()
            .map(|row| {
                format!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    row.date,
                    row.operator,
                    row.name,
                    row.target,
                    row.affiliation,
                    row.region,
                    row.event,
                    row.status,
                    row.phone.as_deref().unwrap_or("")
                )
            })
            .collect()
    })
}

/// A directory receives the default export name, anything else is used as is.
fn export_destination(path: &Path, file_name: &str) -> PathBuf {
    if path.is_dir() {
        path.join(file_name)
    } else {
        path.to_path_buf()
    }
}

async fn delete_interaction(app: &AppServices, out: &Output, args: DeleteArgs) -> Result<()> {
    let operator = args.operator.operator;
    let Some(key) = args.key else {
        let candidates = app.interactions().deletion_candidates(operator).await?;
        return out.emit(&candidates, || {
            candidates
                .iter()
                .map(|candidate| format!("{}  {}", candidate.key, candidate.label))
                .collect()
        });
    };

    match app.interactions().delete(operator, &key).await? {
        Some(removed) => out.emit(&removed, || vec![format!("deleted {}", removed.label())]),
        None => bail!("no interaction {key} owned by {operator}; list the candidates again"),
    }
}

async fn show_report(app: &AppServices, out: &Output, args: ReportArgs) -> Result<()> {
    let rows = app
        .reports()
        .aggregate(args.group_by, &Selection::from(args.target))
        .await?;
    out.emit(&rows, || {
        rows.iter()
            .map(|row| format!("{}\t{}\t{}", row.key, row.target, row.count))
            .collect()
    })
}

async fn show_cumulative(app: &AppServices, out: &Output, args: CumulativeArgs) -> Result<()> {
    let event = match args.event {
        Some(event) => event,
        None => match app.reports().events().await?.into_iter().next() {
            Some(event) => event,
            None => bail!("the interaction log has no events yet"),
        },
    };
    let series = app.reports().cumulative(&event).await?;
    out.emit(&series, || {
        let mut lines = vec![format!("event {event}")];
        for entry in &series {
            lines.push(format!("{} / {}", entry.operator, entry.target));
            lines.extend(
                entry
                    .points
                    .iter()
                    .map(|point| {
                        format!("  {}  +{}  = {}", point.day, point.daily, point.cumulative)
                    }),
            );
        }
        lines
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use situm_core::model::TargetType;

    #[test]
    fn export_into_directory_uses_default_name() {
        let dir = std::env::temp_dir();
        assert_eq!(
            export_destination(&dir, "rubrica_Nadia.csv"),
            dir.join("rubrica_Nadia.csv")
        );
        let file = Path::new("out/custom.csv");
        assert_eq!(export_destination(file, "rubrica_Nadia.csv"), file.to_path_buf());
    }

    #[test]
    fn progress_line_reports_daily_target() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let deadline = NaiveDate::from_ymd_opt(2025, 3, 6).unwrap();
        let progress = situm_core::progress::compute_progress(5, 10, deadline, today);
        assert_eq!(
            progress_line(TargetType::Teacher.as_str(), &progress),
            "Docente: 5/10 (50%), 2 per day for 5 days"
        );
    }

    #[test]
    fn progress_line_without_goal() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let progress = situm_core::progress::compute_progress(3, 0, today, today);
        assert_eq!(progress_line("Impresa", &progress), "Impresa: 3 done, no goal set");
    }
}
