pub mod bill_of_materials;
pub mod raw_material;

pub use bill_of_materials::{BillOfMaterials, BomLineItem, BomStatus};
pub use raw_material::RawMaterial;
