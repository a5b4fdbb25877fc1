pub mod inventory_record;
pub mod order_record;
pub mod product;

pub use inventory_record::{FieldUpdate, InventoryRecord, InventoryUpdate};
pub use order_record::{OrderLine, OrderRecord};
pub use product::{default_catalog, Product, ProductId};
