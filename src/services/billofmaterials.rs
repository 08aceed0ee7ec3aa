use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    costing::{
        match_unit_to_fixed_options, recompute_line, recompute_recipe_total, resolve_unit_cost,
        round_currency, NESTED_RECIPE_UNIT,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{BillOfMaterials, BomLineItem, BomStatus},
    services::catalog::MaterialCatalog,
};

/// Summary view returned when listing BOMs
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BomSummary {
    pub id: Uuid,
    pub bom_code: String,
    pub product_name: String,
    pub version: String,
    pub status: BomStatus,
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input payload for creating a BOM
#[derive(Debug, Clone)]
pub struct CreateBomInput {
    pub bom_code: Option<String>,
    pub product_name: String,
    pub version: String,
    pub status: Option<BomStatus>,
    pub items: Vec<CreateLineItemInput>,
}

/// Input payload for creating or adding a recipe line
#[derive(Debug, Clone)]
pub enum CreateLineItemInput {
    RawMaterial {
        material_code: String,
        quantity: Decimal,
        /// Canonical unit chosen by the author; when absent the material's
        /// own unit is matched against the fixed option list.
        unit_of_measure: Option<String>,
    },
    Recipe {
        bom_code: String,
        quantity: Decimal,
    },
}

/// Input payload for updating high-level BOM fields
#[derive(Debug, Clone, Default)]
pub struct UpdateBomInput {
    pub product_name: Option<String>,
    pub version: Option<String>,
    pub status: Option<BomStatus>,
}

/// Input payload for editing one line in place
#[derive(Debug, Clone, Default)]
pub struct UpdateLineItemInput {
    pub quantity: Option<Decimal>,
    pub unit_of_measure: Option<String>,
}

/// Resolver output for the authoring-time cost preview
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CostPreview {
    pub material_code: String,
    pub material_found: bool,
    pub matched_unit: String,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
}

/// Service owning recipe records and their derived costs. All writes
/// recompute every affected line through the costing core so stored totals
/// are never stale.
///
/// Mutations clone the record, rework the clone, and re-insert it: lookups
/// into the store (nested-recipe resolution) never run while a shard guard
/// is held.
#[derive(Clone)]
pub struct BillOfMaterialsService {
    store: Arc<DashMap<Uuid, BillOfMaterials>>,
    code_index: Arc<DashMap<String, Uuid>>,
    materials: Arc<MaterialCatalog>,
    event_sender: Arc<EventSender>,
}

impl BillOfMaterialsService {
    pub fn new(materials: Arc<MaterialCatalog>, event_sender: Arc<EventSender>) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            code_index: Arc::new(DashMap::new()),
            materials,
            event_sender,
        }
    }

    /// Creates a BOM with its initial line items, resolving every line cost
    /// server-side.
    #[instrument(skip(self, input))]
    pub async fn create_bom(&self, input: CreateBomInput) -> Result<Uuid, ServiceError> {
        let bom_code = input
            .bom_code
            .unwrap_or_else(|| format!("BOM-{}", Uuid::new_v4().simple()));

        if self.code_index.contains_key(&bom_code) {
            return Err(ServiceError::Conflict(format!(
                "BOM code {} already exists",
                bom_code
            )));
        }

        let now = Utc::now();
        let mut bom = BillOfMaterials {
            id: Uuid::new_v4(),
            bom_code: bom_code.clone(),
            product_name: input.product_name,
            version: input.version,
            status: input.status.unwrap_or_default(),
            items: Vec::with_capacity(input.items.len()),
            total_cost: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };

        for line_input in input.items {
            let line = self.build_line(&bom.bom_code, line_input);
            bom.items.push(line);
        }
        self.recompute(&mut bom);

        let bom_id = bom.id;
        let total_cost = bom.total_cost;
        self.code_index.insert(bom_code.clone(), bom_id);
        self.store.insert(bom_id, bom);

        self.event_sender
            .send_or_log(Event::BomCreated {
                bom_id,
                bom_code,
                total_cost,
            })
            .await;

        Ok(bom_id)
    }

    /// Fetches a BOM by identifier.
    pub fn get_bom(&self, bom_id: &Uuid) -> Option<BillOfMaterials> {
        self.store.get(bom_id).map(|entry| entry.clone())
    }

    /// Fetches a BOM by its code.
    pub fn get_bom_by_code(&self, bom_code: &str) -> Option<BillOfMaterials> {
        self.code_index
            .get(bom_code)
            .map(|entry| *entry.value())
            .and_then(|id| self.get_bom(&id))
    }

    /// Returns paginated BOM summaries, newest first, optionally filtered by
    /// status.
    #[instrument(skip(self))]
    pub fn list_boms(
        &self,
        page: u64,
        limit: u64,
        status: Option<BomStatus>,
    ) -> (Vec<BomSummary>, u64) {
        let mut summaries: Vec<BomSummary> = self
            .store
            .iter()
            .filter(|entry| status.map_or(true, |s| entry.status == s))
            .map(|entry| Self::map_summary(entry.value()))
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = summaries.len() as u64;
        let limit = limit.max(1);
        let offset = (page.max(1) - 1) * limit;
        let page_items = summaries
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        (page_items, total)
    }

    /// Applies updates to mutable BOM fields and recomputes totals.
    #[instrument(skip(self, input))]
    pub async fn update_bom(&self, bom_id: Uuid, input: UpdateBomInput) -> Result<(), ServiceError> {
        let mut bom = self
            .get_bom(&bom_id)
            .ok_or_else(|| ServiceError::NotFound(format!("BOM {} not found", bom_id)))?;

        let mut status_change = None;
        if let Some(product_name) = input.product_name {
            bom.product_name = product_name;
        }
        if let Some(version) = input.version {
            bom.version = version;
        }
        if let Some(status) = input.status {
            if bom.status != status {
                status_change = Some((bom.status, status));
            }
            bom.status = status;
        }

        self.recompute(&mut bom);
        self.store.insert(bom_id, bom);

        self.event_sender
            .send_or_log(Event::BomUpdated { bom_id })
            .await;
        if let Some((old_status, new_status)) = status_change {
            self.event_sender
                .send_or_log(Event::BomStatusChanged {
                    bom_id,
                    old_status,
                    new_status,
                })
                .await;
        }

        Ok(())
    }

    /// Retrieves the line items for a BOM.
    pub fn get_line_items(&self, bom_id: &Uuid) -> Result<Vec<BomLineItem>, ServiceError> {
        self.store
            .get(bom_id)
            .map(|entry| entry.items.clone())
            .ok_or_else(|| ServiceError::NotFound(format!("BOM {} not found", bom_id)))
    }

    /// Appends a line to a BOM and returns its index.
    #[instrument(skip(self, line_input))]
    pub async fn add_line_item(
        &self,
        bom_id: &Uuid,
        line_input: CreateLineItemInput,
    ) -> Result<usize, ServiceError> {
        let mut bom = self
            .get_bom(bom_id)
            .ok_or_else(|| ServiceError::NotFound(format!("BOM {} not found", bom_id)))?;

        let line = self.build_line(&bom.bom_code, line_input);
        bom.items.push(line);
        let index = bom.items.len() - 1;

        self.recompute(&mut bom);
        self.store.insert(*bom_id, bom);

        self.event_sender
            .send_or_log(Event::LineItemAdded {
                bom_id: *bom_id,
                index,
            })
            .await;

        Ok(index)
    }

    /// Edits quantity and/or unit of one line, recomputing costs.
    #[instrument(skip(self, input))]
    pub async fn update_line_item(
        &self,
        bom_id: &Uuid,
        index: usize,
        input: UpdateLineItemInput,
    ) -> Result<(), ServiceError> {
        let mut bom = self
            .get_bom(bom_id)
            .ok_or_else(|| ServiceError::NotFound(format!("BOM {} not found", bom_id)))?;

        let line = bom.items.get_mut(index).ok_or_else(|| {
            ServiceError::InvalidOperation(format!("Line index {} out of range", index))
        })?;

        match line {
            BomLineItem::RawMaterial {
                quantity,
                unit_of_measure,
                ..
            } => {
                if let Some(q) = input.quantity {
                    *quantity = q;
                }
                if let Some(unit) = input.unit_of_measure {
                    *unit_of_measure = unit;
                }
            }
            BomLineItem::Recipe { quantity, .. } => {
                if let Some(q) = input.quantity {
                    *quantity = q;
                }
                // Nested lines are pinned to "pcs"; a unit edit is ignored
                // rather than rejected.
            }
        }

        self.recompute(&mut bom);
        self.store.insert(*bom_id, bom);

        self.event_sender
            .send_or_log(Event::BomUpdated { bom_id: *bom_id })
            .await;
        Ok(())
    }

    /// Removes a line from a BOM.
    #[instrument(skip(self))]
    pub async fn remove_line_item(&self, bom_id: &Uuid, index: usize) -> Result<(), ServiceError> {
        let mut bom = self
            .get_bom(bom_id)
            .ok_or_else(|| ServiceError::NotFound(format!("BOM {} not found", bom_id)))?;

        if index >= bom.items.len() {
            return Err(ServiceError::InvalidOperation(format!(
                "Line index {} out of range",
                index
            )));
        }
        bom.items.remove(index);

        self.recompute(&mut bom);
        self.store.insert(*bom_id, bom);

        self.event_sender
            .send_or_log(Event::LineItemRemoved {
                bom_id: *bom_id,
                index,
            })
            .await;

        Ok(())
    }

    /// Resolves a material/unit/quantity triple without persisting anything:
    /// the live preview behind the authoring form.
    pub fn cost_preview(
        &self,
        material_code: &str,
        target_unit: Option<&str>,
        quantity: Decimal,
    ) -> CostPreview {
        let material = self.materials.find(material_code);
        let matched_unit = match target_unit {
            Some(unit) if !unit.trim().is_empty() => unit.to_string(),
            _ => match_unit_to_fixed_options(
                material
                    .as_ref()
                    .map(|m| m.unit_of_measure.as_str())
                    .unwrap_or(""),
            ),
        };

        let unit_cost = resolve_unit_cost(material.as_ref(), &matched_unit);
        let total_cost = if quantity > Decimal::ZERO {
            round_currency(quantity * unit_cost)
        } else {
            Decimal::ZERO
        };

        CostPreview {
            material_code: material_code.to_string(),
            material_found: material.is_some(),
            matched_unit,
            unit_cost,
            total_cost,
        }
    }

    /// Builds a line from input, resolving names, units and costs. Missing
    /// materials or recipe references cost zero; they never fail the build.
    fn build_line(&self, own_bom_code: &str, input: CreateLineItemInput) -> BomLineItem {
        match input {
            CreateLineItemInput::RawMaterial {
                material_code,
                quantity,
                unit_of_measure,
            } => {
                let material = self.materials.find(&material_code);
                let unit = match unit_of_measure {
                    Some(unit) if !unit.trim().is_empty() => unit,
                    _ => match_unit_to_fixed_options(
                        material
                            .as_ref()
                            .map(|m| m.unit_of_measure.as_str())
                            .unwrap_or(""),
                    ),
                };
                let (material_name, material_id) = match &material {
                    Some(m) => (m.material_name.clone(), Some(m.id)),
                    None => (material_code.clone(), None),
                };

                let mut line = BomLineItem::RawMaterial {
                    material_code,
                    material_name,
                    material_id,
                    quantity,
                    unit_of_measure: unit,
                    unit_cost: Decimal::ZERO,
                    total_cost: Decimal::ZERO,
                };
                recompute_line(&mut line, material.as_ref(), None);
                line
            }
            CreateLineItemInput::Recipe { bom_code, quantity } => {
                let referenced = self.resolve_nested(own_bom_code, &bom_code);
                let (material_name, bom_id, nested_total) = match &referenced {
                    Some(r) => (r.product_name.clone(), Some(r.id), Some(r.total_cost)),
                    None => (bom_code.clone(), None, None),
                };

                let mut line = BomLineItem::Recipe {
                    bom_code,
                    bom_id,
                    material_name,
                    quantity,
                    unit_of_measure: NESTED_RECIPE_UNIT.to_string(),
                    unit_cost: Decimal::ZERO,
                    total_cost: Decimal::ZERO,
                };
                recompute_line(&mut line, None, nested_total);
                line
            }
        }
    }

    /// Re-resolves every line and the grand total against current catalog and
    /// store state. Idempotent; safe to run after any mutation.
    fn recompute(&self, bom: &mut BillOfMaterials) {
        let own_code = bom.bom_code.clone();
        for line in &mut bom.items {
            match line {
                BomLineItem::RawMaterial { material_code, .. } => {
                    let material = self.materials.find(material_code);
                    recompute_line(line, material.as_ref(), None);
                }
                BomLineItem::Recipe {
                    bom_code,
                    bom_id,
                    material_name,
                    ..
                } => {
                    let referenced = self.resolve_nested(&own_code, bom_code);
                    if let Some(referenced) = &referenced {
                        *bom_id = Some(referenced.id);
                        *material_name = referenced.product_name.clone();
                    }
                    let nested_total = referenced.map(|r| r.total_cost);
                    recompute_line(line, None, nested_total);
                }
            }
        }
        bom.total_cost = recompute_recipe_total(&bom.items);
        bom.updated_at = Utc::now();
    }

    /// Nested-recipe lookup. A direct self-reference resolves like a missing
    /// recipe (cost zero). Indirect cycles (A references B, B references A)
    /// are not detected; such lines carry whatever total the referenced
    /// recipe had when it was last recomputed.
    fn resolve_nested(&self, own_bom_code: &str, bom_code: &str) -> Option<BillOfMaterials> {
        if bom_code == own_bom_code {
            warn!(
                bom_code,
                "nested line references its own recipe; costing as zero"
            );
            return None;
        }
        let referenced = self.get_bom_by_code(bom_code);
        if referenced.is_none() {
            warn!(bom_code, "nested line references unknown recipe; costing as zero");
        }
        referenced
    }

    fn map_summary(bom: &BillOfMaterials) -> BomSummary {
        BomSummary {
            id: bom.id,
            bom_code: bom.bom_code.clone(),
            product_name: bom.product_name.clone(),
            version: bom.version.clone(),
            status: bom.status,
            total_cost: bom.total_cost,
            created_at: bom.created_at,
            updated_at: bom.updated_at,
        }
    }
}
