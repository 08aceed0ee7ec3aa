use std::str::FromStr;

use dashmap::DashMap;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{errors::ServiceError, models::RawMaterial};

/// In-memory raw material master: the flattened lookup the recipe-authoring
/// flow resolves against. Keyed by `material_code` with a UUID side index,
/// bounded by a configured safety cap.
pub struct MaterialCatalog {
    by_code: DashMap<String, RawMaterial>,
    id_index: DashMap<Uuid, String>,
    capacity: usize,
}

impl MaterialCatalog {
    pub fn new(capacity: usize) -> Self {
        Self {
            by_code: DashMap::new(),
            id_index: DashMap::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Inserts or replaces a single material.
    pub fn upsert(&self, material: RawMaterial) -> Result<(), ServiceError> {
        let is_new = !self.by_code.contains_key(&material.material_code);
        if is_new && self.by_code.len() >= self.capacity {
            return Err(ServiceError::Conflict(format!(
                "Material catalog capacity of {} reached",
                self.capacity
            )));
        }
        self.id_index
            .insert(material.id, material.material_code.clone());
        self.by_code
            .insert(material.material_code.clone(), material);
        Ok(())
    }

    /// Bulk upsert. Entries beyond the capacity cap are skipped with a
    /// warning instead of failing the whole import. Returns
    /// `(imported, skipped)`.
    #[instrument(skip(self, materials))]
    pub fn import(&self, materials: Vec<RawMaterial>) -> (usize, usize) {
        let mut imported = 0;
        let mut skipped = 0;
        for material in materials {
            match self.upsert(material) {
                Ok(()) => imported += 1,
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(
                imported,
                skipped,
                capacity = self.capacity,
                "material import truncated at catalog capacity"
            );
        }
        (imported, skipped)
    }

    /// Looks a material up by `material_code`, falling back to its UUID.
    pub fn find(&self, code_or_id: &str) -> Option<RawMaterial> {
        if let Some(material) = self.by_code.get(code_or_id) {
            return Some(material.clone());
        }
        Uuid::from_str(code_or_id)
            .ok()
            .and_then(|id| self.id_index.get(&id).map(|code| code.clone()))
            .and_then(|code| self.by_code.get(&code).map(|m| m.clone()))
    }

    /// Deterministic page of materials ordered by `material_code`.
    pub fn list(&self, page: u64, limit: u64) -> (Vec<RawMaterial>, u64) {
        let mut materials: Vec<RawMaterial> =
            self.by_code.iter().map(|entry| entry.value().clone()).collect();
        materials.sort_by(|a, b| a.material_code.cmp(&b.material_code));

        let total = materials.len() as u64;
        let limit = limit.max(1);
        let offset = (page.max(1) - 1) * limit;
        let page_items = materials
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        (page_items, total)
    }
}
