use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Raw query-string parameters, ordered by key so generated SQL is stable
pub type QueryParams = BTreeMap<String, String>;

/// Query-string keys that control the read rather than filter it
pub const RESERVED_KEYS: &[&str] = &["select", "sort", "page", "limit"];

/// Comparison operators accepted as `field[op]=value`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
}

impl FilterOp {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "in" => Some(FilterOp::In),
            _ => None,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::In => "= ANY",
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, FilterOp::Lt | FilterOp::Lte | FilterOp::Gt | FilterOp::Gte)
    }
}

/// A bound parameter, already parsed into the type of the column it is compared with
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    TextList(Vec<String>),
    IntegerList(Vec<i64>),
    FloatList(Vec<f64>),
    UuidList(Vec<Uuid>),
}

/// One typed predicate: field × operator × value
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub field: &'static str,
    pub op: FilterOp,
    pub value: FilterValue,
}

/// Great-circle radius search around a point, radius expressed in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoWithin {
    pub column: &'static str,
    pub longitude: f64,
    pub latitude: f64,
    pub radians: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

/// Page/limit pair after defaults and caps have been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
}

impl PageWindow {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn end(&self) -> i64 {
        self.page.saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

impl Pagination {
    pub fn for_window(window: PageWindow, total: i64) -> Self {
        let next = (total > window.end()).then(|| PageRef {
            page: window.page + 1,
            limit: window.limit,
        });
        let prev = (window.page > 1).then(|| PageRef {
            page: window.page - 1,
            limit: window.limit,
        });
        Self { next, prev }
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<FilterValue>,
}
