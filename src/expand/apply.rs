//! Résolution des champs d'une occurrence (base de l'élément, série liée,
//! remplacement par jour de semaine, correctif daté) puis matérialisation
//! en [`EventInstance`].

use crate::model::{
    Classroom, EventInstance, ItemMeta, OccurrenceOverride, RecurrenceRule, RecurringItem,
    SingleItem, Weekday,
};
use crate::series::{SeriesEntry, SeriesRegistry};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

/// Construit l'instance d'un élément récurrent pour une date retenue.
/// `None` seulement si aucune fenêtre horaire de base n'est résoluble,
/// impossible après validation.
pub(super) fn build_instance(
    registry: &SeriesRegistry,
    item: &RecurringItem,
    date: NaiveDate,
    patch: Option<&OccurrenceOverride>,
) -> Option<EventInstance> {
    let weekday = Weekday::from_chrono(date.weekday());
    let weekday_override = item
        .weekday_overrides
        .iter()
        .find(|o| o.weekday == weekday);
    let (rule_start, rule_end) = match &item.recurrence {
        RecurrenceRule::SimpleWeekly {
            start_time,
            end_time,
            ..
        } => (Some(*start_time), Some(*end_time)),
        _ => (None, None),
    };

    // Du plus spécifique au plus général : correctif daté, remplacement du
    // jour de semaine, horaires de la règle, horaires de l'élément.
    let start = patch
        .and_then(|p| p.start)
        .or_else(|| weekday_override.and_then(|o| o.start_time))
        .or(rule_start)
        .or(item.start_time)?;
    let end = patch
        .and_then(|p| p.end)
        .or_else(|| weekday_override.and_then(|o| o.end_time))
        .or(rule_end)
        .or(item.end_time)?;

    let series = bound_series(registry, &item.meta);
    let title = patch
        .and_then(|p| p.title.clone())
        .or_else(|| resolve_title(&item.meta, series));
    let location = patch
        .and_then(|p| p.location.clone())
        .or_else(|| weekday_override.and_then(|o| o.location.clone()))
        .or_else(|| resolve_location(&item.meta, series));
    let description = patch
        .and_then(|p| p.description.clone())
        .or_else(|| weekday_override.and_then(|o| o.description.clone()))
        .or_else(|| resolve_description(&item.meta, series));

    Some(materialize(
        &item.meta, title, date, start, end, location, description,
    ))
}

/// Un élément ponctuel émet exactement une instance, à ses horodatages
/// fixes ; ni exclusion ni remplacement ne s'y appliquent.
pub(super) fn single_instance(registry: &SeriesRegistry, item: &SingleItem) -> EventInstance {
    let series = bound_series(registry, &item.meta);
    let title = resolve_title(&item.meta, series);
    let location = resolve_location(&item.meta, series);
    let description = resolve_description(&item.meta, series);
    let mut instance = materialize(
        &item.meta,
        title,
        item.start.date(),
        item.start.time(),
        item.end.time(),
        location,
        description,
    );
    // Un ponctuel peut finir un autre jour (soutenance tardive...) ; la
    // matérialisation commune suppose la même date aux deux bouts.
    instance.end_date_time_local = local_datetime(item.end.date(), item.end.time());
    instance
}

fn bound_series<'a>(registry: &'a SeriesRegistry, meta: &ItemMeta) -> Option<&'a SeriesEntry> {
    meta.series_id.as_deref().and_then(|id| registry.get(id))
}

fn resolve_title(meta: &ItemMeta, series: Option<&SeriesEntry>) -> Option<String> {
    meta.title.clone().or_else(|| {
        series.map(|entry| match &meta.variant {
            Some(variant) => format!("{} ({})", entry.title, variant.key),
            None => entry.title.clone(),
        })
    })
}

fn resolve_location(meta: &ItemMeta, series: Option<&SeriesEntry>) -> Option<String> {
    meta.location
        .clone()
        .or_else(|| meta.classroom.as_ref().map(Classroom::label))
        .or_else(|| series.and_then(|entry| entry.location.clone()))
}

fn resolve_description(meta: &ItemMeta, series: Option<&SeriesEntry>) -> Option<String> {
    meta.description
        .clone()
        .or_else(|| series.and_then(|entry| entry.description.clone()))
}

fn materialize(
    meta: &ItemMeta,
    title: Option<String>,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    location: Option<String>,
    description: Option<String>,
) -> EventInstance {
    EventInstance {
        class_id: meta.id.clone(),
        title: title.unwrap_or_else(|| "Sans titre".to_owned()),
        date,
        start_date_time_local: local_datetime(date, start),
        end_date_time_local: local_datetime(date, end),
        location,
        description,
    }
}

/// `YYYY-MM-DDTHH:MM:00` : secondes tronquées, résolution à la minute.
pub(super) fn local_datetime(date: NaiveDate, time: NaiveTime) -> String {
    format!(
        "{}T{:02}:{:02}:00",
        date.format("%Y-%m-%d"),
        time.hour(),
        time.minute()
    )
}
