//! Client-side cart. Nothing here is persisted; a cart is thrown away once its
//! order has been submitted.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::{models::MenuItemEntity, services::submission::SubmitOrderItem};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item: MenuItemEntity,
    pub quantity: i32,
    pub customizations: Vec<String>,
}

impl CartLine {
    /// Customizations compare in order: `["Less Sugar", "Extra Milk"]` and
    /// `["Extra Milk", "Less Sugar"]` stay separate lines.
    fn matches(&self, menu_item_id: i32, customizations: &[String]) -> bool {
        self.menu_item.id == menu_item_id && self.customizations == customizations
    }

    pub fn total(&self) -> BigDecimal {
        &self.menu_item.price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit, merging into an existing line with the same item and customizations.
    pub fn add(&mut self, item: MenuItemEntity, customizations: Vec<String>) {
        match self
            .lines
            .iter_mut()
            .find(|line| line.matches(item.id, &customizations))
        {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine {
                menu_item: item,
                quantity: 1,
                customizations,
            }),
        }
    }

    /// `0` removes the line. Out-of-range indices and negative quantities are ignored.
    pub fn set_quantity(&mut self, index: usize, quantity: i32) {
        if quantity == 0 {
            self.remove(index);
        } else if quantity > 0 {
            if let Some(line) = self.lines.get_mut(index) {
                line.quantity = quantity;
            }
        }
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.lines.len() {
            self.lines.remove(index);
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total(&self) -> BigDecimal {
        self.lines
            .iter()
            .fold(BigDecimal::from(0), |acc, line| acc + line.total())
            .with_scale(2)
    }

    pub fn to_submission_items(&self) -> Vec<SubmitOrderItem> {
        self.lines
            .iter()
            .map(|line| SubmitOrderItem {
                menu_item_id: line.menu_item.id,
                name: Some(line.menu_item.name.clone()),
                quantity: line.quantity,
                price: Some(line.menu_item.price.clone()),
                customizations: line.customizations.clone(),
            })
            .collect()
    }
}
