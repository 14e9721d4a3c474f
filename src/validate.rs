//! Vérification croisée du document entier. Le validateur ne s'arrête
//! jamais à la première violation : il les collecte toutes en une passe,
//! dans l'ordre des éléments puis dans l'ordre des contrôles, pour une
//! sortie d'erreur déterministe.

use crate::model::{RecurrenceRule, RecurringItem, Schedule, ScheduleItem, SingleItem};
use crate::series::ResolveError;
use chrono::NaiveTime;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// Champ requis manquant ou forme invalide, détecté avant les
    /// contrôles croisés proprement dits.
    Schema,
    /// Violation de cohérence entre champs.
    Consistency,
    /// Rattachement vers une série ou une déclinaison inexistante.
    UnknownSeriesOrVariant,
}

impl IssueKind {
    pub fn code(self) -> &'static str {
        match self {
            IssueKind::Schema => "schema",
            IssueKind::Consistency => "consistency",
            IssueKind::UnknownSeriesOrVariant => "unknown-series-or-variant",
        }
    }
}

/// Une violation, localisée par un chemin type `items[3].endTime`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: String,
    pub kind: IssueKind,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Échec agrégé : jamais appliqué partiellement, la liste est complète.
#[derive(Error, Debug)]
#[error("invalid schedule: {} issue(s)", .issues.len())]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

/// Preuve qu'un document a passé la validation ; seul ce jeton peut être
/// donné au moteur de déploiement.
#[derive(Debug, Clone, Copy)]
pub struct Validated<'a> {
    schedule: &'a Schedule,
}

impl<'a> Validated<'a> {
    pub fn schedule(&self) -> &'a Schedule {
        self.schedule
    }
}

pub fn validate_schedule(schedule: &Schedule) -> Result<Validated<'_>, ValidationError> {
    let mut issues = Vec::new();

    check_term_bounds(schedule, &mut issues);
    check_registry(schedule, &mut issues);
    for (index, item) in schedule.items.iter().enumerate() {
        check_binding(schedule, index, item, &mut issues);
        match item {
            ScheduleItem::Recurring(recurring) => check_recurring(index, recurring, &mut issues),
            ScheduleItem::Single(single) => check_single(index, single, &mut issues),
        }
    }

    if issues.is_empty() {
        Ok(Validated { schedule })
    } else {
        Err(ValidationError { issues })
    }
}

fn push(issues: &mut Vec<Issue>, path: String, kind: IssueKind, message: impl Into<String>) {
    issues.push(Issue {
        path,
        kind,
        message: message.into(),
    });
}

fn check_term_bounds(schedule: &Schedule, issues: &mut Vec<Issue>) {
    if let (Some(start), Some(end)) = (schedule.term_start, schedule.term_end) {
        if end < start {
            push(
                issues,
                "termEnd".to_owned(),
                IssueKind::Consistency,
                "termEnd must not be before termStart",
            );
        }
    }
}

fn check_registry(schedule: &Schedule, issues: &mut Vec<Issue>) {
    for (key, entry) in schedule.series.iter() {
        if entry.variants.is_empty() {
            push(
                issues,
                format!("series.{key}.variants"),
                IssueKind::Schema,
                "series must declare at least one variant",
            );
        }
    }
}

fn check_binding(schedule: &Schedule, index: usize, item: &ScheduleItem, issues: &mut Vec<Issue>) {
    let meta = item.meta();
    match (&meta.series_id, &meta.variant) {
        (None, None) => {}
        (Some(_), None) => push(
            issues,
            format!("items[{index}].variant"),
            IssueKind::Schema,
            "seriesId is set but variant is missing",
        ),
        (None, Some(_)) => push(
            issues,
            format!("items[{index}].seriesId"),
            IssueKind::Schema,
            "variant is set but seriesId is missing",
        ),
        (Some(series_id), Some(variant)) => {
            match schedule.series.resolve_variant(series_id, &variant.key) {
                Ok(_) => {}
                Err(err @ ResolveError::UnknownSeries(_)) => push(
                    issues,
                    format!("items[{index}].seriesId"),
                    IssueKind::UnknownSeriesOrVariant,
                    err.to_string(),
                ),
                Err(err @ ResolveError::UnknownVariant { .. }) => push(
                    issues,
                    format!("items[{index}].variant.key"),
                    IssueKind::UnknownSeriesOrVariant,
                    err.to_string(),
                ),
            }
        }
    }
}

fn check_recurring(index: usize, item: &RecurringItem, issues: &mut Vec<Issue>) {
    if matches!(item.recurrence, RecurrenceRule::None) {
        push(
            issues,
            format!("items[{index}].recurrence.kind"),
            IssueKind::Schema,
            "recurring item requires a recurrence other than none",
        );
    }

    // La fenêtre horaire de base vient de la règle pour `simpleWeekly`,
    // de l'élément sinon.
    let (start_time, end_time, end_path): (Option<NaiveTime>, Option<NaiveTime>, &str) =
        match &item.recurrence {
            RecurrenceRule::SimpleWeekly {
                start_time,
                end_time,
                ..
            } => (Some(*start_time), Some(*end_time), "recurrence.endTime"),
            _ => (item.start_time, item.end_time, "endTime"),
        };
    match (start_time, end_time) {
        (Some(start), Some(end)) => {
            if end <= start {
                push(
                    issues,
                    format!("items[{index}].{end_path}"),
                    IssueKind::Consistency,
                    "end time must be strictly after start time",
                );
            }
        }
        (start, end) => {
            if start.is_none() {
                push(
                    issues,
                    format!("items[{index}].startTime"),
                    IssueKind::Schema,
                    "recurring item requires a startTime",
                );
            }
            if end.is_none() {
                push(
                    issues,
                    format!("items[{index}].endTime"),
                    IssueKind::Schema,
                    "recurring item requires an endTime",
                );
            }
        }
    }

    if let (Some(start_on), Some(end_on)) = (item.start_on, item.end_on) {
        if end_on < start_on {
            push(
                issues,
                format!("items[{index}].endOn"),
                IssueKind::Consistency,
                "endOn must not be before startOn",
            );
        }
    }

    if let Some(by_days) = item.recurrence.weekday_set() {
        if by_days.is_empty() {
            push(
                issues,
                format!("items[{index}].recurrence.byDays"),
                IssueKind::Consistency,
                "weekday set cannot be empty",
            );
        }
    }

    if item.recurrence.declared_interval() == Some(0) {
        push(
            issues,
            format!("items[{index}].recurrence.interval"),
            IssueKind::Consistency,
            "interval must be at least 1",
        );
    }

    match &item.recurrence {
        RecurrenceRule::MonthlyByDay { day, .. } if !(1..=31).contains(day) => push(
            issues,
            format!("items[{index}].recurrence.day"),
            IssueKind::Consistency,
            "day of month must be between 1 and 31",
        ),
        RecurrenceRule::XDays { dates } if dates.is_empty() => push(
            issues,
            format!("items[{index}].recurrence.dates"),
            IssueKind::Consistency,
            "explicit date list cannot be empty",
        ),
        _ => {}
    }
}

fn check_single(index: usize, item: &SingleItem, issues: &mut Vec<Issue>) {
    if item.end <= item.start {
        push(
            issues,
            format!("items[{index}].end"),
            IssueKind::Consistency,
            "end must be strictly after start",
        );
    }
}
