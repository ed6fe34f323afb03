//! Customer listing with the age filter.

use chrono::NaiveDate;

use sales_dashboard_core::{AgeRule, Customer};

use super::{Bounds, RangeFilter, passes};
use crate::export::TableRow;

/// Age filter inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerFilter {
    pub age_min: Option<i64>,
    pub age_max: Option<i64>,
}

/// A customer with the age derived for today.
#[derive(Debug, Clone)]
pub struct CustomerRow {
    pub customer: Customer,
    pub age: Option<i64>,
}

impl TableRow for CustomerRow {
    const COLUMNS: &'static [&'static str] = &[
        "customer_id",
        "name",
        "email",
        "phone",
        "address",
        "birthdate",
        "age",
    ];
    const DEFAULT_COLUMNS: &'static [&'static str] = Self::COLUMNS;

    fn cell(&self, column: &str) -> String {
        let c = &self.customer;
        match column {
            "customer_id" => c.id.to_string(),
            "name" => c.name.clone(),
            "email" => c.email.clone().unwrap_or_default(),
            "phone" => c.phone.clone().unwrap_or_default(),
            "address" => c.address.clone().unwrap_or_default(),
            "birthdate" => c
                .birthdate
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            "age" => self.age.map(|a| a.to_string()).unwrap_or_default(),
            _ => String::new(),
        }
    }
}

/// Customers page data.
#[derive(Debug, Clone)]
pub struct CustomerReport {
    /// Filtered rows in store order (name ascending).
    pub rows: Vec<CustomerRow>,
    /// Customers before filtering.
    pub total: usize,
    /// Input domain for the age range.
    pub age_bounds: Option<Bounds<i64>>,
    /// Applied age range.
    pub age_range: Option<RangeFilter<i64>>,
}

impl CustomerReport {
    #[must_use]
    pub fn build(
        customers: Vec<Customer>,
        today: NaiveDate,
        rule: AgeRule,
        filter: CustomerFilter,
    ) -> Self {
        let total = customers.len();
        let all: Vec<CustomerRow> = customers
            .into_iter()
            .map(|customer| CustomerRow {
                age: customer.age_on(today, rule),
                customer,
            })
            .collect();

        let age_bounds = Bounds::observed(all.iter().map(|r| r.age)).map(Bounds::widened);
        let age_range = RangeFilter::resolve(filter.age_min, filter.age_max, age_bounds);
        let rows = all
            .into_iter()
            .filter(|r| passes(age_range.as_ref(), r.age))
            .collect();

        Self {
            rows,
            total,
            age_bounds,
            age_range,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sales_dashboard_core::CustomerId;

    use super::*;

    fn customer(id: i32, name: &str, birthdate: Option<&str>) -> Customer {
        Customer {
            id: CustomerId::new(id),
            name: name.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            phone: None,
            address: Some("Jl. Sudirman, Jakarta".to_string()),
            birthdate: birthdate.map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_default_range_keeps_everyone_with_an_age() {
        let report = CustomerReport::build(
            vec![
                customer(1, "Alice", Some("1990-01-01")),
                customer(2, "Bob", Some("2000-01-01")),
                customer(3, "Cici", None),
            ],
            today(),
            AgeRule::Calendar,
            CustomerFilter::default(),
        );
        assert_eq!(report.total, 3);
        assert_eq!(report.age_bounds, Some(Bounds { min: 24, max: 34 }));
        let names: Vec<_> = report.rows.iter().map(|r| r.customer.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);
    }

    #[test]
    fn test_age_filter_is_inclusive() {
        let report = CustomerReport::build(
            vec![
                customer(1, "Alice", Some("1990-01-01")),
                customer(2, "Bob", Some("2000-01-01")),
            ],
            today(),
            AgeRule::Calendar,
            CustomerFilter {
                age_min: Some(30),
                age_max: Some(34),
            },
        );
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].age, Some(34));
    }

    #[test]
    fn test_single_age_widens_bounds() {
        let report = CustomerReport::build(
            vec![customer(1, "Alice", Some("1990-01-01"))],
            today(),
            AgeRule::DayCount365,
            CustomerFilter::default(),
        );
        assert_eq!(report.age_bounds, Some(Bounds { min: 34, max: 35 }));
        assert_eq!(report.rows.len(), 1);
    }

    #[test]
    fn test_cells_render_missing_as_empty() {
        let row = CustomerRow {
            customer: customer(5, "Dedi", None),
            age: None,
        };
        assert_eq!(row.cell("customer_id"), "5");
        assert_eq!(row.cell("birthdate"), "");
        assert_eq!(row.cell("age"), "");
        assert_eq!(row.cell("address"), "Jl. Sudirman, Jakarta");
    }
}
