//! Column-role inference over raw header names.
//!
//! Each semantic role (`area`, `year`, `price`, `demand`, `size`, `supply`)
//! resolves to the first column, in original order, whose lowercase name
//! contains the role as a substring. `area` additionally falls back to the
//! first column when nothing matches, since it anchors row identity.
//!
//! Known limitation: substring matching is ambiguous for colliding headers
//! such as `Supply_Year`, which matches both `supply` and `year`. The
//! tie-break is deliberate and fixed: roles resolve in declared order and the
//! first matching column wins for each.

use serde::Serialize;

/// Resolved role-to-column mapping. Built once per dataset; `None` marks an
/// unresolved role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleMap {
    pub area: Option<String>,
    pub year: Option<String>,
    pub price: Option<String>,
    pub demand: Option<String>,
    pub size: Option<String>,
    pub supply: Option<String>,
}

/// Infers the role map from the dataset's column names (the first record's
/// key set). An empty column list leaves every role unresolved.
pub fn infer_roles(columns: &[String]) -> RoleMap {
    let find = |needle: &str| {
        columns
            .iter()
            .find(|name| name.to_lowercase().contains(needle))
            .cloned()
    };
    RoleMap {
        area: find("area").or_else(|| columns.first().cloned()),
        year: find("year"),
        price: find("price"),
        demand: find("demand"),
        size: find("size"),
        supply: find("supply"),
    }
}
