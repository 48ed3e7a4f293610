use std::collections::BTreeMap;

use crate::error::TariffError;
use crate::types::TensionLevel;
use crate::TariffResult;

/// A record that belongs to exactly one tension level within its section.
pub trait LevelKeyed {
    fn tension_level(&self) -> TensionLevel;
}

/// Records of one section keyed by tension level. Iteration is ascending.
pub type LevelMap<'a, T> = BTreeMap<TensionLevel, &'a T>;

/// Index a section's records by tension level, rejecting duplicates.
pub fn index_by_level<'a, T: LevelKeyed>(
    section: &str,
    records: &'a [T],
) -> TariffResult<LevelMap<'a, T>> {
    let mut map = BTreeMap::new();
    for record in records {
        let level = record.tension_level();
        if map.insert(level, record).is_some() {
            return Err(TariffError::DuplicateLevel {
                section: section.to_string(),
                level,
            });
        }
    }
    Ok(map)
}
