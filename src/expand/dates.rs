//! Génération des dates candidates par règle. Chaque fonction rend un
//! `BTreeSet` : dates dédupliquées, itérées en ordre croissant, ce qui
//! fixe l'ordre des instances d'un élément.

use super::window::Window;
use crate::model::{RecurrenceRule, Weekday, WeekdayPosition};
use chrono::{Datelike, Days, Months, NaiveDate};
use std::collections::BTreeSet;

/// `None` signale un débordement d'arithmétique de dates, jamais atteint
/// avec des bornes parsées valides.
pub(super) fn candidate_dates(
    rule: &RecurrenceRule,
    window: Window,
) -> Option<BTreeSet<NaiveDate>> {
    // La validation garantit un pas >= 1 ; `.max(1)` évite toute boucle
    // infinie si le moteur était appelé hors de ce contrat.
    let interval = rule.interval().max(1);
    match rule {
        RecurrenceRule::None => Some(BTreeSet::new()),
        RecurrenceRule::Daily { .. } => daily(interval, window),
        RecurrenceRule::Weekly { by_days, .. }
        | RecurrenceRule::SimpleWeekly { by_days, .. } => weekly(by_days, interval, window),
        RecurrenceRule::MonthlyByDay { day, .. } => monthly_by_day(*day, interval, window),
        RecurrenceRule::MonthlyByWeekday {
            position, weekday, ..
        } => monthly_by_weekday(*position, *weekday, interval, window),
        // Auto-borné, déployé sans fenêtre ; traité en amont.
        RecurrenceRule::XDays { dates } => Some(dates.iter().copied().collect()),
    }
}

fn daily(interval: u32, window: Window) -> Option<BTreeSet<NaiveDate>> {
    let mut out = BTreeSet::new();
    let mut current = window.start;
    while current <= window.end {
        out.insert(current);
        current = current.checked_add_days(Days::new(u64::from(interval)))?;
    }
    Some(out)
}

fn weekly(
    by_days: &BTreeSet<Weekday>,
    interval: u32,
    window: Window,
) -> Option<BTreeSet<NaiveDate>> {
    // Semaines calendaires ancrées au lundi de la semaine de la borne basse.
    let back = window.start.weekday().num_days_from_monday();
    let mut week_start = window.start.checked_sub_days(Days::new(u64::from(back)))?;
    let mut out = BTreeSet::new();
    while week_start <= window.end {
        for day in by_days {
            let offset = day.to_chrono().num_days_from_monday();
            let date = week_start.checked_add_days(Days::new(u64::from(offset)))?;
            if window.contains(date) {
                out.insert(date);
            }
        }
        week_start = week_start.checked_add_days(Days::new(7 * u64::from(interval)))?;
    }
    Some(out)
}

fn monthly_by_day(day: u8, interval: u32, window: Window) -> Option<BTreeSet<NaiveDate>> {
    let mut out = BTreeSet::new();
    let mut month_first = window.start.with_day(1)?;
    while month_first <= window.end {
        // Mois sans ce jour : aucune occurrence, jamais de repli sur un
        // jour voisin.
        if let Some(date) =
            NaiveDate::from_ymd_opt(month_first.year(), month_first.month(), u32::from(day))
        {
            if window.contains(date) {
                out.insert(date);
            }
        }
        month_first = month_first.checked_add_months(Months::new(interval))?;
    }
    Some(out)
}

fn monthly_by_weekday(
    position: WeekdayPosition,
    weekday: Weekday,
    interval: u32,
    window: Window,
) -> Option<BTreeSet<NaiveDate>> {
    let mut out = BTreeSet::new();
    let mut month_first = window.start.with_day(1)?;
    while month_first <= window.end {
        if let Some(date) =
            nth_weekday_in_month(month_first.year(), month_first.month(), position, weekday)
        {
            if window.contains(date) {
                out.insert(date);
            }
        }
        month_first = month_first.checked_add_months(Months::new(interval))?;
    }
    Some(out)
}

/// Date concrète du couple `(position, jour)` dans un mois, `None` si le
/// mois n'a pas de n-ième occurrence (ex. 5e lundi).
fn nth_weekday_in_month(
    year: i32,
    month: u32,
    position: WeekdayPosition,
    weekday: Weekday,
) -> Option<NaiveDate> {
    let target = weekday.to_chrono().num_days_from_monday();
    match position.index() {
        Some(nth) => {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let shift = (7 + target - first.weekday().num_days_from_monday()) % 7;
            let date = first
                .checked_add_days(Days::new(u64::from(shift) + 7 * (u64::from(nth) - 1)))?;
            (date.month() == month).then_some(date)
        }
        None => {
            let last = last_day_of_month(year, month)?;
            let back = (7 + last.weekday().num_days_from_monday() - target) % 7;
            last.checked_sub_days(Days::new(u64::from(back)))
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}
