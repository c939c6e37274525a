//! Identifier case conversions exposed to templates as filters.

use convert_case::{Case, Casing};

/// Convert an identifier to snake_case.
///
/// # Examples
/// ```
/// # use xmigen::generate::to_snake_case;
/// assert_eq!(to_snake_case("LineItem"), "line_item");
/// assert_eq!(to_snake_case("orderId"), "order_id");
/// ```
pub fn to_snake_case(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Convert an identifier to PascalCase.
///
/// # Examples
/// ```
/// # use xmigen::generate::to_pascal_case;
/// assert_eq!(to_pascal_case("line_item"), "LineItem");
/// assert_eq!(to_pascal_case("order-status"), "OrderStatus");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    s.to_case(Case::Pascal)
}

pub fn to_camel_case(s: &str) -> String {
    s.to_case(Case::Camel)
}
