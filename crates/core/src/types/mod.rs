//! Core types for the sales dashboard.
//!
//! This module provides type-safe wrappers for the sales schema.

pub mod age;
pub mod id;
pub mod money;
pub mod sales;
pub mod view;

pub use age::{AgeRule, AgeRuleError};
pub use id::*;
pub use money::Money;
pub use sales::{Customer, OrderLine, OrderSummary, Product};
pub use view::View;
