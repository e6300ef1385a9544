//! # Query Builder
//!
//! Turns list filters into a parameterized `SELECT` on `cars`.
//!
//! Search text and status always travel as bound parameters. The sort
//! column and direction cannot be bound, so they come from closed enums
//! whose SQL text is fixed; anything outside the allow-list falls back to
//! `created_at DESC`.

use crate::db::SqlValue;
use crate::model::{CarStatus, CAR_COLUMNS};

/// Raw list filters as they arrive in the query string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub q: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl ListParams {
    /// Builds the filters from decoded query pairs.
    ///
    /// A key given more than once carries no single value and is dropped,
    /// the same as any other unusable filter. Unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = ListParams::default();
        let mut repeated: Vec<String> = Vec::new();

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "q" => &mut params.q,
                "status" => &mut params.status,
                "sortBy" => &mut params.sort_by,
                "sortDir" => &mut params.sort_dir,
                _ => continue,
            };
            if slot.is_some() || repeated.contains(&key) {
                *slot = None;
                if !repeated.contains(&key) {
                    repeated.push(key);
                }
            } else {
                *slot = Some(value);
            }
        }

        params
    }
}

/// Columns a list may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    CreatedAt,
    Price,
    Year,
    Mileage,
}

impl SortColumn {
    /// Exact match against the allow-list; `None` for anything else
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created_at" => Some(SortColumn::CreatedAt),
            "price" => Some(SortColumn::Price),
            "year" => Some(SortColumn::Year),
            "mileage" => Some(SortColumn::Mileage),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortColumn::CreatedAt => "created_at",
            SortColumn::Price => "price",
            SortColumn::Year => "year",
            SortColumn::Mileage => "mileage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Case-insensitive `ASC`/`DESC`
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Validated list filters. Invalid inputs have already been dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CarFilter {
    pub search: Option<String>,
    pub status: Option<CarStatus>,
    pub sort_by: SortColumn,
    pub sort_dir: SortDirection,
}

impl From<ListParams> for CarFilter {
    fn from(params: ListParams) -> Self {
        Self {
            search: params.q.filter(|q| !q.is_empty()),
            status: params.status.as_deref().and_then(|s| s.parse().ok()),
            sort_by: params
                .sort_by
                .as_deref()
                .and_then(SortColumn::parse)
                .unwrap_or_default(),
            sort_dir: params
                .sort_dir
                .as_deref()
                .and_then(SortDirection::parse)
                .unwrap_or_default(),
        }
    }
}

/// A ready-to-run statement and its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl CarFilter {
    pub fn build(&self) -> BuiltQuery {
        let mut sql = format!("SELECT {} FROM cars", CAR_COLUMNS);
        let mut params = Vec::new();
        let mut conditions = Vec::new();

        if let Some(q) = &self.search {
            conditions.push("(make LIKE ? ESCAPE '\\' OR model LIKE ? ESCAPE '\\')");
            let pattern = format!("%{}%", escape_like(q));
            params.push(SqlValue::Text(pattern.clone()));
            params.push(SqlValue::Text(pattern));
        }

        if let Some(status) = self.status {
            conditions.push("status = ?");
            params.push(SqlValue::Text(status.as_str().to_string()));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        // id breaks ties so rows inserted within the same second keep a stable order
        let dir = self.sort_dir.as_sql();
        sql.push_str(&format!(
            " ORDER BY {} {}, id {}",
            self.sort_by.as_sql(),
            dir,
            dir
        ));

        BuiltQuery { sql, params }
    }
}

/// Escapes LIKE wildcards so the search text matches literally
fn escape_like(q: &str) -> String {
    let mut out = String::with_capacity(q.len());
    for c in q.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
