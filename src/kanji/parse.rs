use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

/// One row of the optional search list. Field names match the original data
/// export: `k` kanji, `r` reading, `m` meaning.
#[derive(Clone, Debug, Deserialize)]
pub struct SearchEntry {
    #[serde(rename = "k")]
    pub id: String,
    #[serde(default, rename = "r")]
    pub reading: String,
    #[serde(default, rename = "m")]
    pub meaning: String,
}

pub(super) fn parse_composition(raw: &str) -> Result<HashMap<String, Vec<String>>> {
    let entries: HashMap<String, Vec<String>> =
        serde_json::from_str(raw).context("invalid composition JSON")?;

    if entries.is_empty() {
        return Err(anyhow!("composition dictionary contains no entries"));
    }

    Ok(entries
        .into_iter()
        .filter(|(id, _)| !id.is_empty())
        .collect())
}

pub(super) fn parse_tier_list(raw: &str) -> Result<Vec<String>> {
    let list: Vec<String> = serde_json::from_str(raw).context("invalid tier list JSON")?;
    Ok(list.into_iter().filter(|id| !id.is_empty()).collect())
}

pub(super) fn parse_search_list(raw: &str) -> Result<Vec<SearchEntry>> {
    let list: Vec<SearchEntry> = serde_json::from_str(raw).context("invalid search list JSON")?;
    Ok(list.into_iter().filter(|entry| !entry.id.is_empty()).collect())
}
