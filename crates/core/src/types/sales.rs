//! Row types for the four sales-schema reads.
//!
//! Each type mirrors the column list of one fixed query. Numeric columns are
//! `Option` because the store may hand back values that do not parse as
//! numbers; those are kept as missing instead of failing the whole fetch.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::age::AgeRule;
use super::id::{CustomerId, OrderDetailId, OrderId, ProductId};
use super::money::Money;

/// A customer as listed on the customers page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birthdate: Option<NaiveDate>,
}

impl Customer {
    /// Age on `today` under the given rule.
    #[must_use]
    pub fn age_on(&self, today: NaiveDate, rule: AgeRule) -> Option<i64> {
        self.birthdate.and_then(|b| rule.age_on(b, today))
    }
}

/// A product with its current price and stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
}

impl Product {
    /// Price × stock, `None` if either is missing.
    #[must_use]
    pub fn inventory_value(&self) -> Option<Money> {
        Some(self.price?.times(self.stock?))
    }
}

/// An order joined with the customer who placed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_date: NaiveDateTime,
    pub total_amount: Option<Money>,
    pub customer_name: String,
    pub phone: Option<String>,
}

impl OrderSummary {
    /// Calendar day of the order.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.order_date.date()
    }

    /// `YYYY-MM` bucket of the order.
    #[must_use]
    pub fn month(&self) -> String {
        self.order_date.format("%Y-%m").to_string()
    }
}

/// One order line flattened with its order, customer and product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderDetailId,
    pub order_id: OrderId,
    pub order_date: NaiveDateTime,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Option<Money>,
    pub quantity: Option<i64>,
    pub subtotal: Option<Money>,
    pub order_total: Option<Money>,
    pub phone: Option<String>,
}

impl OrderLine {
    /// Calendar day of the parent order.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.order_date.date()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_value_requires_price_and_stock() {
        let mut product = Product {
            id: ProductId::new(1),
            name: "Kopi".to_string(),
            description: None,
            price: Some(Money::from_units(25_000)),
            stock: Some(4),
        };
        assert_eq!(product.inventory_value(), Some(Money::from_units(100_000)));

        product.stock = None;
        assert!(product.inventory_value().is_none());
    }

    #[test]
    fn test_order_month_and_day() {
        let order = OrderSummary {
            id: OrderId::new(9),
            order_date: NaiveDate::from_ymd_opt(2024, 3, 7)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
            total_amount: None,
            customer_name: "Alice".to_string(),
            phone: None,
        };
        assert_eq!(order.month(), "2024-03");
        assert_eq!(order.day(), NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
    }

    #[test]
    fn test_customer_without_birthdate_has_no_age() {
        let customer = Customer {
            id: CustomerId::new(1),
            name: "Bob".to_string(),
            email: None,
            phone: None,
            address: None,
            birthdate: None,
        };
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(customer.age_on(today, AgeRule::Calendar).is_none());
    }
}
