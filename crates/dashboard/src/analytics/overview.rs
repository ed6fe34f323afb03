//! Home page summary.

use sales_dashboard_core::{Money, OrderSummary};

use super::sum_money;

/// Headline counts shown on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct Overview {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
    pub revenue: Money,
}

impl Overview {
    #[must_use]
    pub fn build(customers: usize, products: usize, orders: &[OrderSummary]) -> Self {
        Self {
            customers,
            products,
            orders: orders.len(),
            revenue: sum_money(orders.iter().map(|o| o.total_amount)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use sales_dashboard_core::OrderId;

    use super::*;

    #[test]
    fn test_revenue_skips_missing_totals() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let orders = [Some(10_000), None, Some(2_500)].map(|amount| OrderSummary {
            id: OrderId::new(1),
            order_date: at,
            total_amount: amount.map(Money::from_units),
            customer_name: "Ani".to_string(),
            phone: None,
        });
        let overview = Overview::build(2, 3, &orders);
        assert_eq!(overview.orders, 3);
        assert_eq!(overview.revenue, Money::from_units(12_500));
    }

    #[test]
    fn test_offline_overview_is_zero() {
        assert_eq!(Overview::build(0, 0, &[]), Overview::default());
    }
}
