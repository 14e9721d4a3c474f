//! Moteur de déploiement : transforme un document validé en la liste
//! ordonnée de ses instances concrètes. Fonction pure du document : deux
//! appels sur la même entrée produisent une sortie identique octet à
//! octet.
//!
//! Ordre garanti : position de l'élément dans le document, puis date
//! croissante au sein d'un élément. Aucun tri chronologique inter-éléments
//! n'est fait ici ; un consommateur qui en veut un trie lui-même.

mod apply;
mod dates;
mod types;
mod window;

pub use types::{ExpandError, MAX_OCCURRENCES_PER_ITEM};

use crate::model::{EventInstance, RecurrenceRule, ScheduleItem};
use crate::validate::Validated;
use chrono::NaiveDate;
use std::collections::BTreeSet;

pub fn expand_schedule(validated: &Validated<'_>) -> Result<Vec<EventInstance>, ExpandError> {
    let schedule = validated.schedule();
    let mut out = Vec::new();

    for (index, item) in schedule.items.iter().enumerate() {
        match item {
            ScheduleItem::Single(single) => {
                out.push(apply::single_instance(&schedule.series, single));
            }
            ScheduleItem::Recurring(recurring) => {
                let candidates: BTreeSet<NaiveDate> = match &recurring.recurrence {
                    RecurrenceRule::XDays { dates } => dates.iter().copied().collect(),
                    rule => {
                        let win = window::effective_window(schedule, recurring)
                            .ok_or(ExpandError::UnboundedWindow { item: index })?;
                        dates::candidate_dates(rule, win)
                            .ok_or(ExpandError::DateOutOfRange { item: index })?
                    }
                };
                if candidates.len() > MAX_OCCURRENCES_PER_ITEM {
                    return Err(ExpandError::TooManyOccurrences {
                        item: index,
                        max: MAX_OCCURRENCES_PER_ITEM,
                    });
                }
                for date in candidates {
                    if recurring.exclusions.contains(&date) {
                        continue;
                    }
                    let patch = recurring.overrides.get(&date);
                    if patch.is_some_and(|p| p.cancelled) {
                        continue;
                    }
                    let instance = apply::build_instance(&schedule.series, recurring, date, patch)
                        .ok_or(ExpandError::MissingTimes { item: index })?;
                    out.push(instance);
                }
            }
        }
    }

    Ok(out)
}
