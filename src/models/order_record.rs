use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One product line of a placed order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_name: String,
    pub increment: u32,
    pub needed: i64,
    pub ordered: i64,
}

/// Entry in the append-only order log. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub items: Vec<OrderLine>,
}

impl OrderRecord {
    pub fn total_ordered(&self) -> i64 {
        self.items.iter().map(|item| item.ordered).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_item_fields_are_ignored() {
        let raw = r#"{
            "orderDate": "2024-05-06",
            "deliveryDate": "2024-05-09",
            "items": [
                {"productName": "Original Bun", "increment": 5, "needed": 7, "ordered": 5, "deliveryDate": "2024-05-09"},
                {"productName": "Junior Bun", "increment": 9, "needed": 0, "ordered": 0}
            ]
        }"#;
        let record: OrderRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.items.len(), 2);
        assert_eq!(record.items[0].product_name, "Original Bun");
        assert_eq!(record.total_ordered(), 5);
    }
}
