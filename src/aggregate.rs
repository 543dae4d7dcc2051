//! Year-keyed aggregation of decoded records.
//!
//! Each record is assigned to a year group by the first four characters of its
//! year cell's display form; records whose year fails to parse (or is not
//! positive) are dropped silently. Within a group, price/demand/size/supply
//! accumulate with non-numeric cells coerced to zero, and the record count
//! increments once per assigned record regardless of which cells were present.
//!
//! Finalization is deliberately asymmetric: price and size are per-unit
//! measures and emit as arithmetic means, demand and supply are volumes and
//! emit as raw sums.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{columns::RoleMap, decode::Record};

/// Finalized aggregate for one year. Read-only once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyStat {
    pub year: i64,
    pub price: f64,
    pub demand: f64,
    pub size: f64,
    pub supply: f64,
}

#[derive(Debug, Default)]
struct YearGroup {
    price: f64,
    demand: f64,
    size: f64,
    supply: f64,
    count: u64,
}

/// Groups `rows` by inferred year and returns the finalized stats in
/// ascending year order.
///
/// An unresolved `year` role yields an empty sequence: with no grouping key
/// every record is dropped, which is not an error.
pub fn aggregate_by_year(rows: &[Record], roles: &RoleMap) -> Vec<YearlyStat> {
    let Some(year_column) = roles.year.as_deref() else {
        return Vec::new();
    };

    let mut groups: BTreeMap<i64, YearGroup> = BTreeMap::new();
    for row in rows {
        let Some(year) = year_key(row.get(year_column)) else {
            continue;
        };
        let group = groups.entry(year).or_default();
        group.price += numeric_cell(row, roles.price.as_deref());
        group.demand += numeric_cell(row, roles.demand.as_deref());
        group.size += numeric_cell(row, roles.size.as_deref());
        group.supply += numeric_cell(row, roles.supply.as_deref());
        group.count += 1;
    }

    groups
        .into_iter()
        .map(|(year, group)| {
            let count = group.count as f64;
            YearlyStat {
                year,
                price: group.price / count,
                demand: group.demand,
                size: group.size / count,
                supply: group.supply,
            }
        })
        .collect()
}

// Year key: display form of the cell, first four characters, parsed as an
// integer. Null cells, parse failures, and non-positive values drop the row.
fn year_key(value: Option<&Value>) -> Option<i64> {
    let display = display_string(value?)?;
    let prefix: String = display.chars().take(4).collect();
    let year = prefix.trim().parse::<i64>().ok()?;
    (year > 0).then_some(year)
}

fn numeric_cell(row: &Record, column: Option<&str>) -> f64 {
    column
        .and_then(|name| row.get(name))
        .map(coerce_number)
        .unwrap_or(0.0)
}

/// Lenient numeric coercion: numbers pass through, numeric strings parse,
/// booleans count as 0/1, everything else (including null) is zero.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        Value::Bool(b) => f64::from(*b as u8),
        _ => 0.0,
    }
}

fn display_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.as_f64().map(format_number).unwrap_or_default()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Renders a number without trailing `.0` noise; fractional values use the
/// shortest round-trippable form.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
