//! Modèle de données du document d'emploi du temps : règles de récurrence,
//! éléments ponctuels/récurrents, racine du document et instances produites.
//! Tout est de la donnée inerte ; la cohérence croisée est vérifiée dans
//! [`crate::validate`], le déploiement dans [`crate::expand`].

use crate::primitives::{
    serde_date_list, serde_date_map, serde_date_set, serde_iso_date, serde_iso_date_opt,
    serde_iso_time, serde_iso_time_opt, serde_local_datetime, TimeZoneId,
};
use crate::series::{SeriesRegistry, VariantInfo};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Jour de semaine, codes ISO 8601 à deux lettres (sensibles à la casse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "MO")]
    Mo,
    #[serde(rename = "TU")]
    Tu,
    #[serde(rename = "WE")]
    We,
    #[serde(rename = "TH")]
    Th,
    #[serde(rename = "FR")]
    Fr,
    #[serde(rename = "SA")]
    Sa,
    #[serde(rename = "SU")]
    Su,
}

impl Weekday {
    pub fn code(self) -> &'static str {
        match self {
            Weekday::Mo => "MO",
            Weekday::Tu => "TU",
            Weekday::We => "WE",
            Weekday::Th => "TH",
            Weekday::Fr => "FR",
            Weekday::Sa => "SA",
            Weekday::Su => "SU",
        }
    }

    pub fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Weekday::Mo,
            chrono::Weekday::Tue => Weekday::Tu,
            chrono::Weekday::Wed => Weekday::We,
            chrono::Weekday::Thu => Weekday::Th,
            chrono::Weekday::Fri => Weekday::Fr,
            chrono::Weekday::Sat => Weekday::Sa,
            chrono::Weekday::Sun => Weekday::Su,
        }
    }

    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Weekday::Mo => chrono::Weekday::Mon,
            Weekday::Tu => chrono::Weekday::Tue,
            Weekday::We => chrono::Weekday::Wed,
            Weekday::Th => chrono::Weekday::Thu,
            Weekday::Fr => chrono::Weekday::Fri,
            Weekday::Sa => chrono::Weekday::Sat,
            Weekday::Su => chrono::Weekday::Sun,
        }
    }
}

/// N-ième occurrence d'un jour de semaine dans le mois (1..4 ou dernière).
/// Sérialisé comme l'entier 1..4 ou la chaîne `"last"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekdayPosition {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekdayPosition {
    /// Rang 1..4, `None` pour la dernière occurrence.
    pub fn index(self) -> Option<u8> {
        match self {
            WeekdayPosition::First => Some(1),
            WeekdayPosition::Second => Some(2),
            WeekdayPosition::Third => Some(3),
            WeekdayPosition::Fourth => Some(4),
            WeekdayPosition::Last => None,
        }
    }
}

impl Serialize for WeekdayPosition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.index() {
            Some(n) => serializer.serialize_u8(n),
            None => serializer.serialize_str("last"),
        }
    }
}

impl<'de> Deserialize<'de> for WeekdayPosition {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl serde::de::Visitor<'_> for Visitor {
            type Value = WeekdayPosition;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("an integer in 1..=4 or the string \"last\"")
            }

            fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<Self::Value, E> {
                match value {
                    1 => Ok(WeekdayPosition::First),
                    2 => Ok(WeekdayPosition::Second),
                    3 => Ok(WeekdayPosition::Third),
                    4 => Ok(WeekdayPosition::Fourth),
                    other => Err(E::custom(format!("weekday position out of range: {other}"))),
                }
            }

            fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<Self::Value, E> {
                u64::try_from(value)
                    .map_err(|_| E::custom(format!("weekday position out of range: {value}")))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Self::Value, E> {
                if value == "last" {
                    Ok(WeekdayPosition::Last)
                } else {
                    Err(E::custom(format!("unknown weekday position: {value:?}")))
                }
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

/// Règle de récurrence, discriminée par `kind`. Exactement une variante
/// active par élément ; un `kind` inconnu est rejeté au parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RecurrenceRule {
    #[default]
    None,
    Daily {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<u32>,
        #[serde(default, with = "serde_iso_date_opt", skip_serializing_if = "Option::is_none")]
        until: Option<NaiveDate>,
    },
    #[serde(rename_all = "camelCase")]
    Weekly {
        #[serde(default)]
        by_days: BTreeSet<Weekday>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<u32>,
        #[serde(default, with = "serde_iso_date_opt", skip_serializing_if = "Option::is_none")]
        until: Option<NaiveDate>,
    },
    /// Variante hebdomadaire qui porte directement sa fenêtre horaire,
    /// partagée par tous ses jours.
    #[serde(rename_all = "camelCase")]
    SimpleWeekly {
        #[serde(default)]
        by_days: BTreeSet<Weekday>,
        #[serde(with = "serde_iso_time")]
        start_time: NaiveTime,
        #[serde(with = "serde_iso_time")]
        end_time: NaiveTime,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<u32>,
        #[serde(default, with = "serde_iso_date_opt", skip_serializing_if = "Option::is_none")]
        until: Option<NaiveDate>,
    },
    MonthlyByDay {
        day: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<u32>,
        #[serde(default, with = "serde_iso_date_opt", skip_serializing_if = "Option::is_none")]
        until: Option<NaiveDate>,
    },
    MonthlyByWeekday {
        position: WeekdayPosition,
        weekday: Weekday,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<u32>,
        #[serde(default, with = "serde_iso_date_opt", skip_serializing_if = "Option::is_none")]
        until: Option<NaiveDate>,
    },
    /// Énumération exhaustive de dates absolues ; ni pas, ni borne `until`.
    #[serde(rename = "xDays")]
    XDays {
        #[serde(with = "serde_date_list")]
        dates: Vec<NaiveDate>,
    },
}

impl RecurrenceRule {
    /// Pas déclaré dans le document, sans appliquer le défaut.
    pub fn declared_interval(&self) -> Option<u32> {
        match self {
            RecurrenceRule::Daily { interval, .. }
            | RecurrenceRule::Weekly { interval, .. }
            | RecurrenceRule::SimpleWeekly { interval, .. }
            | RecurrenceRule::MonthlyByDay { interval, .. }
            | RecurrenceRule::MonthlyByWeekday { interval, .. } => *interval,
            RecurrenceRule::None | RecurrenceRule::XDays { .. } => None,
        }
    }

    /// Pas effectif (défaut 1).
    pub fn interval(&self) -> u32 {
        self.declared_interval().unwrap_or(1)
    }

    pub fn until(&self) -> Option<NaiveDate> {
        match self {
            RecurrenceRule::Daily { until, .. }
            | RecurrenceRule::Weekly { until, .. }
            | RecurrenceRule::SimpleWeekly { until, .. }
            | RecurrenceRule::MonthlyByDay { until, .. }
            | RecurrenceRule::MonthlyByWeekday { until, .. } => *until,
            RecurrenceRule::None | RecurrenceRule::XDays { .. } => None,
        }
    }

    /// `xDays` borne lui-même ses occurrences ; les autres règles exigent
    /// une borne haute résoluble.
    pub fn is_self_bounding(&self) -> bool {
        matches!(self, RecurrenceRule::XDays { .. })
    }

    pub fn weekday_set(&self) -> Option<&BTreeSet<Weekday>> {
        match self {
            RecurrenceRule::Weekly { by_days, .. }
            | RecurrenceRule::SimpleWeekly { by_days, .. } => Some(by_days),
            _ => None,
        }
    }
}

/// Salle structurée (alternative à une localisation texte libre).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    pub room: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Classroom {
    /// Libellé court pour le champ `location` des instances.
    pub fn label(&self) -> String {
        let mut out = String::new();
        if let Some(building) = &self.building {
            out.push_str(building);
            out.push(' ');
        }
        out.push_str(&self.room);
        if let Some(campus) = &self.campus {
            out.push_str(" (");
            out.push_str(campus);
            out.push(')');
        }
        out
    }
}

/// Remplacement hérité par jour de semaine : ajuste horaires ou lieu d'un
/// jour donné sans créer un nouvel élément.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayOverride {
    pub weekday: Weekday,
    #[serde(default, with = "serde_iso_time_opt", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "serde_iso_time_opt", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Remplacement daté : annulation, ou correctif partiel appliqué champ à
/// champ sur l'occurrence. `cancelled` l'emporte sur tout correctif présent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceOverride {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
    #[serde(default, with = "serde_iso_time_opt", skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveTime>,
    #[serde(default, with = "serde_iso_time_opt", skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Champs communs aux éléments ponctuels et récurrents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classroom: Option<Classroom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Référence faible vers le registre : les deux champs vont ensemble.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantInfo>,
}

/// Événement ponctuel : horodatages locaux absolus, sans offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleItem {
    #[serde(flatten)]
    pub meta: ItemMeta,
    #[serde(with = "serde_local_datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "serde_local_datetime")]
    pub end: NaiveDateTime,
}

/// Événement récurrent : une règle, une fenêtre horaire de base, des bornes
/// de dates optionnelles, des exclusions et des remplacements datés.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringItem {
    #[serde(flatten)]
    pub meta: ItemMeta,
    pub recurrence: RecurrenceRule,
    #[serde(default, with = "serde_iso_time_opt", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "serde_iso_time_opt", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, with = "serde_iso_date_opt", skip_serializing_if = "Option::is_none")]
    pub start_on: Option<NaiveDate>,
    #[serde(default, with = "serde_iso_date_opt", skip_serializing_if = "Option::is_none")]
    pub end_on: Option<NaiveDate>,
    #[serde(default, with = "serde_date_set", skip_serializing_if = "BTreeSet::is_empty")]
    pub exclusions: BTreeSet<NaiveDate>,
    #[serde(default, with = "serde_date_map", skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<NaiveDate, OccurrenceOverride>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekday_overrides: Vec<WeekdayOverride>,
}

/// Élément d'emploi du temps, discriminé par `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScheduleItem {
    Single(SingleItem),
    Recurring(RecurringItem),
}

impl ScheduleItem {
    pub fn meta(&self) -> &ItemMeta {
        match self {
            ScheduleItem::Single(item) => &item.meta,
            ScheduleItem::Recurring(item) => &item.meta,
        }
    }
}

/// Racine du document. Construit une fois par l'extracteur amont, jamais
/// muté ensuite ; le moteur n'en dérive que des données.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Unique fuseau IANA du document ; toutes les heures locales s'y
    /// interprètent. Aucun remplacement par élément n'existe.
    pub time_zone: TimeZoneId,
    #[serde(default, with = "serde_iso_date_opt", skip_serializing_if = "Option::is_none")]
    pub term_start: Option<NaiveDate>,
    #[serde(default, with = "serde_iso_date_opt", skip_serializing_if = "Option::is_none")]
    pub term_end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "SeriesRegistry::is_empty")]
    pub series: SeriesRegistry,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ScheduleItem>,
}

/// Instance concrète produite par le déploiement. Les horodatages locaux
/// sont matérialisés `YYYY-MM-DDTHH:MM:00` (résolution à la minute).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    pub title: String,
    #[serde(with = "serde_iso_date")]
    pub date: NaiveDate,
    pub start_date_time_local: String,
    pub end_date_time_local: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
