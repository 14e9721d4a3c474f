//! Validation stricte des valeurs primitives du document : dates ISO,
//! heures ISO, fuseau IANA. Aucun défaut n'est inféré ; le fuseau vient
//! toujours explicitement de la racine du document.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    #[error("invalid date (expected YYYY-MM-DD): {0:?}")]
    InvalidDate(String),
    #[error("invalid time (expected HH:MM:SS): {0:?}")]
    InvalidTime(String),
    #[error("invalid local datetime (expected YYYY-MM-DDTHH:MM:SS): {0:?}")]
    InvalidDateTime(String),
    #[error("invalid IANA time zone: {0:?}")]
    InvalidTimeZone(String),
}

/// Identifiant de fuseau IANA (ex. `Europe/Paris`), porté tel quel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeZoneId(String);

impl TimeZoneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimeZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse `YYYY-MM-DD` strict : largeur fixe, zéro-paddé, calendrier valide.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, PrimitiveError> {
    let err = || PrimitiveError::InvalidDate(s.to_owned());
    let b = s.as_bytes();
    if b.len() != 10 || b[4] != b'-' || b[7] != b'-' {
        return Err(err());
    }
    let year = parse_digits(&b[0..4]).ok_or_else(err)?;
    let month = parse_digits(&b[5..7]).ok_or_else(err)?;
    let day = parse_digits(&b[8..10]).ok_or_else(err)?;
    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(err)
}

/// Parse `HH:MM:SS` strict : secondes obligatoires, ni fraction ni offset.
pub fn parse_iso_time(s: &str) -> Result<NaiveTime, PrimitiveError> {
    let err = || PrimitiveError::InvalidTime(s.to_owned());
    let b = s.as_bytes();
    if b.len() != 8 || b[2] != b':' || b[5] != b':' {
        return Err(err());
    }
    let hour = parse_digits(&b[0..2]).ok_or_else(err)?;
    let minute = parse_digits(&b[3..5]).ok_or_else(err)?;
    let second = parse_digits(&b[6..8]).ok_or_else(err)?;
    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(err)
}

/// Parse `YYYY-MM-DDTHH:MM:SS` strict (heure locale « mur », sans offset).
pub fn parse_local_datetime(s: &str) -> Result<NaiveDateTime, PrimitiveError> {
    let err = || PrimitiveError::InvalidDateTime(s.to_owned());
    let b = s.as_bytes();
    if b.len() != 19 || b[10] != b'T' {
        return Err(err());
    }
    let date = parse_iso_date(&s[0..10]).map_err(|_| err())?;
    let time = parse_iso_time(&s[11..19]).map_err(|_| err())?;
    Ok(NaiveDateTime::new(date, time))
}

/// Parse un identifiant de fuseau IANA : au moins un segment `Area/Location`
/// et présent dans la base tz.
pub fn parse_iana_time_zone(s: &str) -> Result<TimeZoneId, PrimitiveError> {
    if !s.contains('/') {
        return Err(PrimitiveError::InvalidTimeZone(s.to_owned()));
    }
    s.parse::<chrono_tz::Tz>()
        .map_err(|_| PrimitiveError::InvalidTimeZone(s.to_owned()))?;
    Ok(TimeZoneId(s.to_owned()))
}

fn parse_digits(bytes: &[u8]) -> Option<u32> {
    let mut out = 0u32;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        out = out * 10 + u32::from(b - b'0');
    }
    Some(out)
}

impl serde::Serialize for TimeZoneId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for TimeZoneId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: String = serde::Deserialize::deserialize(deserializer)?;
        parse_iana_time_zone(&raw).map_err(serde::de::Error::custom)
    }
}

/// Adaptateurs serde : chaque champ date/heure du document passe par les
/// parseurs stricts ci-dessus, jamais par le parsing permissif de chrono.
pub mod serde_iso_date {
    use super::parse_iso_date;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso_date(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod serde_iso_date_opt {
    use super::parse_iso_date;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|r| parse_iso_date(&r).map_err(serde::de::Error::custom))
            .transpose()
    }
}

pub mod serde_iso_time {
    use super::parse_iso_time;
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M:%S"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso_time(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod serde_iso_time_opt {
    use super::parse_iso_time;
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.collect_str(&t.format("%H:%M:%S")),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|r| parse_iso_time(&r).map_err(serde::de::Error::custom))
            .transpose()
    }
}

pub mod serde_local_datetime {
    use super::parse_local_datetime;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        datetime: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&datetime.format("%Y-%m-%dT%H:%M:%S"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_local_datetime(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod serde_date_list {
    use super::parse_iso_date;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        dates: &[NaiveDate],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(dates.iter().map(|d| d.format("%Y-%m-%d").to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<NaiveDate>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|r| parse_iso_date(r).map_err(serde::de::Error::custom))
            .collect()
    }
}

pub mod serde_date_set {
    use super::parse_iso_date;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeSet;

    pub fn serialize<S: Serializer>(
        dates: &BTreeSet<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(dates.iter().map(|d| d.format("%Y-%m-%d").to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeSet<NaiveDate>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|r| parse_iso_date(r).map_err(serde::de::Error::custom))
            .collect()
    }
}

pub mod serde_date_map {
    use super::parse_iso_date;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer, V: Serialize>(
        map: &BTreeMap<NaiveDate, V>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            map.iter()
                .map(|(k, v)| (k.format("%Y-%m-%d").to_string(), v)),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>, V: Deserialize<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<NaiveDate, V>, D::Error> {
        let raw = BTreeMap::<String, V>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, v)| {
                parse_iso_date(&k)
                    .map(|d| (d, v))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
