use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use validator::Validate;

pub type ProductId = u32;

/// A product tracked on the count sheet. Static for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[validate(length(min = 1))]
    pub name: String,
    /// Informational only; order math works in bags.
    #[serde(alias = "bunsperbag", alias = "buns_per_bag")]
    pub buns_per_bag: u32,
    /// Order quantities are always a multiple of this.
    #[serde(alias = "orderincrement", alias = "order_increment")]
    pub order_increment: NonZeroU32,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        buns_per_bag: u32,
        order_increment: NonZeroU32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            buns_per_bag,
            order_increment,
        }
    }

    pub fn increment(&self) -> i64 {
        i64::from(self.order_increment.get())
    }
}

static DEFAULT_CATALOG: Lazy<Vec<Product>> = Lazy::new(|| {
    vec![
        Product::new(1, "Original Bun", 12, increment(5)),
        Product::new(2, "Hot Dog Bun", 6, increment(9)),
        Product::new(3, "Junior Bun", 8, increment(9)),
    ]
});

fn increment(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

/// The catalog used when configuration does not provide one.
pub fn default_catalog() -> Vec<Product> {
    DEFAULT_CATALOG.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_matches_counter_sheet() {
        let catalog = default_catalog();
        let summary: Vec<_> = catalog
            .iter()
            .map(|p| (p.id, p.name.as_str(), p.buns_per_bag, p.increment()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "Original Bun", 12, 5),
                (2, "Hot Dog Bun", 6, 9),
                (3, "Junior Bun", 8, 9),
            ]
        );
    }

    #[test]
    fn zero_increment_is_rejected_on_deserialize() {
        let raw = r#"{"id":9,"name":"Brioche","bunsPerBag":6,"orderIncrement":0}"#;
        assert!(serde_json::from_str::<Product>(raw).is_err());
    }

    #[test]
    fn empty_name_fails_validation() {
        let product = Product::new(4, "", 6, increment(3));
        assert!(product.validate().is_err());
    }
}
