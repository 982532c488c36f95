use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use super::rrf;
use super::LoadError;
use crate::models::Concept;

pub const MRSTY: &str = "MRSTY.RRF";
pub const SRDEF: &str = "SRDEF";

const UNKNOWN_TYPE: &str = "UnknownType";

/// Semantic Network type UI → type name (`T047` → `Disease or Syndrome`).
pub fn load_type_names(semantic_network_dir: &Path) -> Result<HashMap<String, String>, LoadError> {
    let parts = rrf::required_table(semantic_network_dir, SRDEF)?;
    let mut names = HashMap::new();
    rrf::for_each_record(&parts, 3, |fields| {
        names.insert(fields[1].to_string(), fields[2].to_string());
        Ok(())
    })?;
    Ok(names)
}

/// Attach semantic type names from MRSTY to the loaded concepts.
pub fn load_semantic_types(
    meta_dir: &Path,
    semantic_network_dir: &Path,
    concepts: &mut [Concept],
) -> Result<(), LoadError> {
    tracing::info!("Loading types from UMLS");

    let type_names = load_type_names(semantic_network_dir)?;
    let index: HashMap<String, usize> = concepts
        .iter()
        .enumerate()
        .map(|(i, c)| (c.cui.clone(), i))
        .collect();

    let parts = rrf::required_table(meta_dir, MRSTY)?;
    let mut all_types = BTreeSet::new();
    rrf::for_each_record(&parts, 2, |fields| {
        let (cui, tui) = (fields[0], fields[1]);
        let Some(&i) = index.get(cui) else {
            return Ok(());
        };
        if tui == UNKNOWN_TYPE {
            return Ok(());
        }

        let name = type_names
            .get(tui)
            .ok_or_else(|| LoadError::UnknownSemanticType {
                cui: cui.into(),
                tui: tui.into(),
            })?;

        let types = &mut concepts[i].semantic_types;
        if !types.contains(name) {
            types.push(name.clone());
            all_types.insert(name.clone());
        }
        Ok(())
    })?;

    tracing::info!(types = all_types.len(), "Loaded types from UMLS");
    Ok(())
}
