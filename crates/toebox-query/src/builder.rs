//! Lowering conditions to SQL predicates and sort directives.
//!
//! Filter semantics:
//!
//! - each keyword becomes an OR-group of case-insensitive substring matches
//!   over model, brand, intended use, gender-variant labels, and review
//!   text; keyword groups are AND-combined with each other and with every
//!   other filter;
//! - one logical stack-height spec constrains both physical columns as
//!   "either column satisfies the bound", and sorts on both columns in the
//!   same direction (forefoot primary, heel as the tie-break);
//! - drop bounds filter the drop column directly; drop *ordering* is not
//!   delegated to the store and is applied in memory after the fetch;
//! - the effective result cap is `min(requested, 5)`, and an empty
//!   condition set produces no query at all rather than the whole catalog.

use rusqlite::types::Value;

use crate::conditions::{RangeSpec, ShoeSearchConditions, SortOrder};

/// Hard ceiling on returned records, regardless of the requested limit.
pub const MAX_RESULTS: usize = 5;

/// A lowered, executable query.
#[derive(Debug, Clone)]
pub struct ShoeQuery {
    /// WHERE fragments, AND-combined
    pub where_clauses: Vec<String>,
    /// Positional parameters, in fragment order
    pub params: Vec<Value>,
    /// ORDER BY fragments, in priority order
    pub order_by: Vec<String>,
    /// Effective result cap
    pub limit: usize,
    /// Requested in-memory ordering by the derived drop value
    pub drop_sort: Option<SortOrder>,
}

impl ShoeQuery {
    /// Whether any filter predicate exists. With none, execution returns an
    /// empty result set instead of the whole catalog.
    pub fn has_conditions(&self) -> bool {
        !self.where_clauses.is_empty()
    }
}

fn like_pattern(term: &str) -> Value {
    Value::Text(format!("%{term}%"))
}

/// The OR-group every keyword is matched through.
fn keyword_clause() -> String {
    "(shoe.model LIKE ? \
      OR shoe.brand LIKE ? \
      OR shoe.intended_use LIKE ? \
      OR EXISTS (SELECT 1 FROM shoe_gender g WHERE g.shoe_id = shoe.id AND g.gender LIKE ?) \
      OR EXISTS (SELECT 1 FROM shoe_review r WHERE r.shoe_id = shoe.id \
                 AND (r.fit LIKE ? OR r.feel LIKE ? OR r.durability LIKE ?)))"
        .to_string()
}

fn push_keyword_params(params: &mut Vec<Value>, keyword: &str) {
    for _ in 0..7 {
        params.push(like_pattern(keyword));
    }
}

/// Bound fragments for one physical column, AND-combined.
fn column_bounds(column: &str, spec: &RangeSpec, params: &mut Vec<Value>) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(min) = spec.min() {
        parts.push(format!("shoe.{column} >= ?"));
        params.push(Value::Real(min));
    }
    if let Some(max) = spec.max() {
        parts.push(format!("shoe.{column} <= ?"));
        params.push(Value::Real(max));
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("({})", parts.join(" AND ")))
    }
}

fn sort_keyword(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

/// Lower a condition set into SQL fragments.
pub fn build_query(conditions: &ShoeSearchConditions) -> ShoeQuery {
    let mut where_clauses = Vec::new();
    let mut params = Vec::new();
    let mut order_by = Vec::new();

    // Keywords: per-keyword OR-groups, AND-combined
    if let Some(keywords) = &conditions.keywords {
        for keyword in keywords.iter().filter(|k| !k.trim().is_empty()) {
            where_clauses.push(keyword_clause());
            push_keyword_params(&mut params, keyword);
        }
    }

    // One stack-height spec constrains both physical columns
    let stack = &conditions.stack_height_mm;
    {
        let mut stack_params = Vec::new();
        let forefoot = column_bounds("forefoot_stack_height_mm", stack, &mut stack_params);
        let heel = column_bounds("heel_stack_height_mm", stack, &mut stack_params);
        if let (Some(forefoot), Some(heel)) = (forefoot, heel) {
            where_clauses.push(format!("({forefoot} OR {heel})"));
            params.extend(stack_params);
        }
        if let Some(sort) = stack.sort() {
            order_by.push(format!("shoe.forefoot_stack_height_mm {}", sort_keyword(sort)));
            order_by.push(format!("shoe.heel_stack_height_mm {}", sort_keyword(sort)));
        }
    }

    // Drop bounds hit the drop column directly
    if let Some(min) = conditions.drop.min() {
        where_clauses.push("shoe.drop_mm >= ?".to_string());
        params.push(Value::Real(min));
    }
    if let Some(max) = conditions.drop.max() {
        where_clauses.push("shoe.drop_mm <= ?".to_string());
        params.push(Value::Real(max));
    }

    // String filters
    if let Some(width) = conditions.width.value() {
        where_clauses.push("shoe.fit LIKE ?".to_string());
        params.push(like_pattern(width));
    }
    if let Some(intended_use) = conditions.intended_use.value() {
        where_clauses.push("shoe.intended_use LIKE ?".to_string());
        params.push(like_pattern(intended_use));
    }
    if let Some(gender) = conditions.gender.value() {
        where_clauses.push(
            "EXISTS (SELECT 1 FROM shoe_gender g WHERE g.shoe_id = shoe.id AND g.gender LIKE ?)"
                .to_string(),
        );
        params.push(like_pattern(gender));
    }

    let limit = conditions
        .limit
        .map_or(MAX_RESULTS, |requested| requested as usize)
        .min(MAX_RESULTS);

    ShoeQuery {
        where_clauses,
        params,
        order_by,
        limit,
        drop_sort: conditions.drop.sort(),
    }
}

/// Lower fallback keywords into a single OR-combined query.
///
/// Unlike the structured path, fallback tokens are OR-matched: any keyword
/// hit qualifies a record.
pub fn build_fallback_query(keywords: &[String]) -> ShoeQuery {
    let mut params = Vec::new();
    let groups: Vec<String> = keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .map(|keyword| {
            push_keyword_params(&mut params, keyword);
            keyword_clause()
        })
        .collect();

    let where_clauses = if groups.is_empty() {
        Vec::new()
    } else {
        vec![format!("({})", groups.join(" OR "))]
    };

    ShoeQuery {
        where_clauses,
        params,
        order_by: Vec::new(),
        limit: MAX_RESULTS,
        drop_sort: None,
    }
}
