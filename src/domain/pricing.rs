use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// A priced line ready to be persisted as an order item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: i32,
    pub name: String,
    pub quantity: i32,
    pub price: BigDecimal,
    pub customizations: Vec<String>,
}

impl OrderLine {
    pub fn total(&self) -> BigDecimal {
        &self.price * BigDecimal::from(self.quantity)
    }
}

/// Sum of `price * quantity`, rounded to cents.
pub fn order_total<'a>(lines: impl IntoIterator<Item = &'a OrderLine>) -> BigDecimal {
    lines
        .into_iter()
        .fold(BigDecimal::from(0), |acc, line| acc + line.total())
        .with_scale(2)
}
