use salesflow_table::{AttributeValue, Item};
use serde::Deserialize;

pub const ORDER_ID: &str = "OrderID";
pub const QUANTITY: &str = "Quantity";
pub const PRICE: &str = "Price";
pub const TOTAL_AMOUNT: &str = "TotalAmount";

/// One row of the transformed file as the loader sees it. Columns other than
/// `OrderID` and `TotalAmount` are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransformedRow {
    #[serde(rename = "OrderID")]
    pub order_id: String,
    #[serde(rename = "TotalAmount")]
    pub total_amount: String,
}

/// The persisted projection of a sales record. `total_amount` is the number
/// exactly as written in the transformed file.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesItem {
    pub order_id: String,
    pub total_amount: String,
}

impl SalesItem {
    pub fn to_item(&self) -> Item {
        Item::from([
            (
                ORDER_ID.to_string(),
                AttributeValue::S(self.order_id.clone()),
            ),
            (
                TOTAL_AMOUNT.to_string(),
                AttributeValue::N(self.total_amount.clone()),
            ),
        ])
    }
}
