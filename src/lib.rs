#![forbid(unsafe_code)]
//! Edt — bibliothèque de validation et de déploiement d'emplois du temps
//! académiques (sans BD).
//!
//! - Document JSON unique : fuseau IANA, bornes de période, registre de
//!   séries, éléments ponctuels ou récurrents.
//! - Validation croisée en une passe : toutes les violations collectées.
//! - Déploiement déterministe des récurrences en instances datées.
//! - Heures locales « mur » uniquement ; aucune arithmétique d'offset.

pub mod expand;
pub mod io;
pub mod model;
pub mod primitives;
pub mod series;
pub mod sink;
pub mod storage;
pub mod validate;

pub use expand::{expand_schedule, ExpandError, MAX_OCCURRENCES_PER_ITEM};
pub use model::{
    Classroom, EventInstance, ItemMeta, OccurrenceOverride, RecurrenceRule, RecurringItem,
    Schedule, ScheduleItem, SingleItem, Weekday, WeekdayOverride, WeekdayPosition,
};
pub use primitives::{
    parse_iana_time_zone, parse_iso_date, parse_iso_time, parse_local_datetime, PrimitiveError,
    TimeZoneId,
};
pub use series::{ResolveError, SeriesEntry, SeriesRegistry, VariantInfo};
pub use sink::{prepare_agenda, Agenda, AgendaRenderer, TextAgenda};
pub use storage::{JsonStorage, Storage};
pub use validate::{validate_schedule, Issue, IssueKind, Validated, ValidationError};
