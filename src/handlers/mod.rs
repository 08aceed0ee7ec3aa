pub mod bom;
pub mod common;
pub mod materials;

use crate::events::EventSender;
use crate::services::{BillOfMaterialsService, MaterialCatalog};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub materials: Arc<MaterialCatalog>,
    pub bill_of_materials: Arc<BillOfMaterialsService>,
}

impl AppServices {
    pub fn new(catalog_capacity: usize, event_sender: Arc<EventSender>) -> Self {
        let materials = Arc::new(MaterialCatalog::new(catalog_capacity));
        let bill_of_materials = Arc::new(BillOfMaterialsService::new(
            materials.clone(),
            event_sender,
        ));
        Self {
            materials,
            bill_of_materials,
        }
    }
}
