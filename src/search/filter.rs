//! Typed filter and ordering expressions rendered to the service's OData syntax.
//!
//! Literal values are escaped when rendered, so caller input can never close a
//! string literal and inject further clauses.

use crate::geo::GeoPoint;
use std::fmt;

/// A boolean filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// `Field eq 'value'`
    Eq { field: &'static str, value: String },

    /// `geo.distance(Field, geography'POINT(lon lat)') le km`
    GeoWithin {
        field: &'static str,
        point: GeoPoint,
        max_km: f64,
    },

    /// Conjunction of two or more clauses
    And(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Case-insensitive equality against an upper-cased field.
    ///
    /// Source data is stored upper case, so the comparison value is normalised
    /// the same way.
    pub fn eq_ignore_case(field: &'static str, value: &str) -> Self {
        FilterExpr::Eq {
            field,
            value: value.trim().to_uppercase(),
        }
    }

    pub fn geo_within(field: &'static str, point: GeoPoint, max_km: f64) -> Self {
        FilterExpr::GeoWithin {
            field,
            point,
            max_km,
        }
    }

    /// AND-join the clauses. Nested conjunctions are flattened; no clauses
    /// yields `None` and a single clause is returned as is.
    pub fn all(clauses: impl IntoIterator<Item = FilterExpr>) -> Option<FilterExpr> {
        let mut flat = Vec::new();
        for clause in clauses {
            match clause {
                FilterExpr::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }

        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(FilterExpr::And(flat)),
        }
    }

    /// Number of leaf clauses
    pub fn clause_count(&self) -> usize {
        match self {
            FilterExpr::And(inner) => inner.iter().map(FilterExpr::clause_count).sum(),
            _ => 1,
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Eq { field, value } => {
                write!(f, "{} eq '{}'", field, escape_literal(value))
            }
            FilterExpr::GeoWithin {
                field,
                point,
                max_km,
            } => write!(f, "{} le {}", GeoDistance { field, point }, max_km),
            FilterExpr::And(clauses) => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" and ")?;
                    }
                    write!(f, "{}", clause)?;
                }
                Ok(())
            }
        }
    }
}

/// Ordering direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("asc"),
            Direction::Desc => f.write_str("desc"),
        }
    }
}

/// What an ordering clause sorts on
#[derive(Debug, Clone, PartialEq)]
pub enum OrderTarget {
    Field(&'static str),
    Distance { field: &'static str, point: GeoPoint },
}

/// One `$orderby` clause
#[derive(Debug, Clone, PartialEq)]
pub struct OrderClause {
    pub target: OrderTarget,
    pub direction: Direction,
}

impl OrderClause {
    pub fn field(field: &'static str, direction: Direction) -> Self {
        Self {
            target: OrderTarget::Field(field),
            direction,
        }
    }

    pub fn nearest_first(field: &'static str, point: GeoPoint) -> Self {
        Self {
            target: OrderTarget::Distance { field, point },
            direction: Direction::Asc,
        }
    }
}

impl fmt::Display for OrderClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            OrderTarget::Field(field) => write!(f, "{} {}", field, self.direction),
            OrderTarget::Distance { field, point } => {
                write!(f, "{} {}", GeoDistance { field, point }, self.direction)
            }
        }
    }
}

/// Render a list of clauses as a comma-separated `$orderby` value
pub fn render_order_by(clauses: &[OrderClause]) -> Option<String> {
    if clauses.is_empty() {
        return None;
    }
    Some(
        clauses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

struct GeoDistance<'a> {
    field: &'a str,
    point: &'a GeoPoint,
}

impl fmt::Display for GeoDistance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "geo.distance({}, geography'POINT({} {})')",
            self.field, self.point.longitude, self.point.latitude
        )
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}
