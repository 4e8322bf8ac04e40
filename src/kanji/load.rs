use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use super::index::CompositionIndex;
use super::parse::{SearchEntry, parse_composition, parse_search_list, parse_tier_list};
use super::tier::TierLists;

/// Everything the viewer consumes: the composition index with its derived
/// reverse mapping, the two tier-membership lists, and the optional search
/// rows. Loaded once at startup and treated as immutable afterwards.
#[derive(Clone, Debug)]
pub struct CharacterData {
    pub index: CompositionIndex,
    pub tiers: TierLists,
    pub search: Vec<SearchEntry>,
}

pub fn load_character_data(data_dir: &Path) -> Result<CharacterData> {
    let composition_path = data_dir.join("composition.json");
    let composition_raw = fs::read_to_string(&composition_path)
        .with_context(|| format!("failed to read {}", composition_path.display()))?;
    let entries = parse_composition(&composition_raw)
        .with_context(|| format!("failed to parse {}", composition_path.display()))?;
    let index = CompositionIndex::from_entries(entries);

    let common = read_tier_list(data_dir, "joyo.json")?;
    let proper_name = read_tier_list(data_dir, "jinmeiyo.json")?;
    let tiers = TierLists::new(common, proper_name);

    let search = match read_search_list(data_dir) {
        Ok(search) => search,
        Err(error) => {
            warn!("search list unavailable, falling back to id matching: {error:#}");
            Vec::new()
        }
    };

    info!(
        "loaded {} characters ({} jōyō, {} jinmeiyō, {} search rows) from {}",
        index.character_count(),
        tiers.common_count(),
        tiers.proper_name_count(),
        search.len(),
        data_dir.display()
    );

    Ok(CharacterData {
        index,
        tiers,
        search,
    })
}

fn read_tier_list(data_dir: &Path, file_name: &str) -> Result<Vec<String>> {
    let path = data_dir.join(file_name);
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_tier_list(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn read_search_list(data_dir: &Path) -> Result<Vec<SearchEntry>> {
    let path = data_dir.join("searchlist.json");
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_search_list(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
