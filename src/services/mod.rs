pub mod billofmaterials;
pub mod catalog;

pub use billofmaterials::{
    BillOfMaterialsService, BomSummary, CostPreview, CreateBomInput, CreateLineItemInput,
    UpdateBomInput, UpdateLineItemInput,
};
pub use catalog::MaterialCatalog;
