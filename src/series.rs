//! Registre des séries : catalogue nommé de matières, chacune déclarant le
//! menu fermé de déclinaisons (groupes de TP, de TD...) auxquelles un
//! élément peut se rattacher. Les éléments portent une référence faible
//! (`seriesId` + clé de déclinaison) résolue ici, jamais un lien possédant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Déclinaison d'un élément au sein d'une série.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInfo {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

/// Entrée du registre : une matière et ses déclinaisons autorisées.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub variants: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown series: {0}")]
    UnknownSeries(String),
    #[error("unknown variant {variant:?} for series {series}")]
    UnknownVariant { series: String, variant: String },
}

/// Registre slug → série ; les clés sont uniques par construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesRegistry(BTreeMap<String, SeriesEntry>);

impl SeriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: SeriesEntry) {
        self.0.insert(id.into(), entry);
    }

    pub fn get(&self, id: &str) -> Option<&SeriesEntry> {
        self.0.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SeriesEntry)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Vérifie qu'une série existe et qu'elle déclare bien la déclinaison.
    pub fn resolve_variant(
        &self,
        series_id: &str,
        variant_key: &str,
    ) -> Result<&SeriesEntry, ResolveError> {
        let entry = self
            .get(series_id)
            .ok_or_else(|| ResolveError::UnknownSeries(series_id.to_owned()))?;
        if !entry.variants.iter().any(|v| v == variant_key) {
            return Err(ResolveError::UnknownVariant {
                series: series_id.to_owned(),
                variant: variant_key.to_owned(),
            });
        }
        Ok(entry)
    }
}
