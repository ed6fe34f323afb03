//! Dashboard navigation.
//!
//! The dashboard has exactly one current view at a time. Each view owns one
//! route, so the view is selected by the request path rather than by a set
//! of independent toggles that must be kept mutually exclusive.

use serde::{Deserialize, Serialize};

/// A dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Home,
    Customers,
    Products,
    Orders,
    OrderDetails,
}

impl View {
    /// All views in sidebar order.
    pub const ALL: [Self; 5] = [
        Self::Home,
        Self::Customers,
        Self::Products,
        Self::Orders,
        Self::OrderDetails,
    ];

    /// Route path of the view.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Customers => "/customers",
            Self::Products => "/products",
            Self::Orders => "/orders",
            Self::OrderDetails => "/order-details",
        }
    }

    /// Sidebar label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Customers => "Customers",
            Self::Products => "Products",
            Self::Orders => "Orders",
            Self::OrderDetails => "Order Details",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Home => "🏠",
            Self::Customers => "👥",
            Self::Products => "📦",
            Self::Orders => "🛒",
            Self::OrderDetails => "📋",
        }
    }

    /// Resolve a request path to its view. Unknown paths land on `Home`.
    ///
    /// Sub-paths such as `/orders/export.csv` resolve to their parent view.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        Self::ALL
            .into_iter()
            .filter(|view| *view != Self::Home)
            .find(|view| {
                trimmed == view.path()
                    || trimmed
                        .strip_prefix(view.path())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .unwrap_or(Self::Home)
    }
}
