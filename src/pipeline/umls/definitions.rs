use std::collections::HashMap;
use std::path::Path;

use super::rrf;
use super::LoadError;
use crate::models::Concept;

pub const MRDEF: &str = "MRDEF.RRF";

/// Attach MRDEF definitions. The file is optional; when a concept has
/// several definitions the last one read is kept.
pub fn load_definitions(meta_dir: &Path, concepts: &mut [Concept]) -> Result<(), LoadError> {
    tracing::info!("Loading definitions from UMLS");

    let parts = rrf::table_parts(meta_dir, MRDEF)?;
    if parts.is_empty() {
        tracing::warn!(dir = %meta_dir.display(), "No MRDEF table, skipping definitions");
        return Ok(());
    }

    let index: HashMap<String, usize> = concepts
        .iter()
        .enumerate()
        .map(|(i, c)| (c.cui.clone(), i))
        .collect();

    rrf::for_each_record(&parts, 6, |fields| {
        if let Some(&i) = index.get(fields[0]) {
            concepts[i].definition = Some(fields[5].to_string());
        }
        Ok(())
    })?;

    let defined = concepts.iter().filter(|c| c.definition.is_some()).count();
    tracing::info!(definitions = defined, "Loaded definitions from UMLS");
    Ok(())
}
