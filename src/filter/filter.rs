use crate::config::QueryConfig;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::{FilterWhere, ROW_ALIAS};
use super::schema::{Populate, ResourceSchema};
use super::types::{
    FilterCondition, FilterOrderInfo, FilterValue, GeoWithin, PageWindow, QueryParams,
    SqlResult, RESERVED_KEYS,
};

/// A read against one resource: projection, typed predicate, order, window and joins.
#[derive(Debug, Clone)]
pub struct Filter {
    schema: ResourceSchema,
    select_columns: Vec<&'static str>,
    conditions: Vec<FilterCondition>,
    geo: Option<GeoWithin>,
    order_data: Vec<FilterOrderInfo>,
    window: Option<PageWindow>,
    populate: Vec<Populate>,
}

impl Filter {
    pub fn new(schema: ResourceSchema) -> Self {
        Self {
            schema,
            select_columns: vec![],
            conditions: vec![],
            geo: None,
            order_data: FilterOrder::default_order(),
            window: None,
            populate: vec![],
        }
    }

    /// Build a paged read from query-string parameters.
    pub fn from_query(
        schema: ResourceSchema,
        params: &QueryParams,
        config: &QueryConfig,
    ) -> Result<Self, FilterError> {
        let mut filter = Self::new(schema);

        for (key, value) in params {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let condition = FilterWhere::parse_condition(&filter.schema, key, value)?;
            filter.conditions.push(condition);
        }

        if let Some(select) = params.get("select") {
            filter.select(select);
        }
        if let Some(sort) = params.get("sort") {
            filter.order(sort);
        }
        filter.paginate(
            params.get("page").map(String::as_str),
            params.get("limit").map(String::as_str),
            config,
        );

        if config.debug_logging {
            tracing::debug!(
                "filter on {}: {} conditions, window {:?}",
                filter.schema.table,
                filter.conditions.len(),
                filter.window
            );
        }
        Ok(filter)
    }

    /// Restrict the projection; `id` is always kept. Unknown names are dropped.
    pub fn select(&mut self, fields: &str) -> &mut Self {
        let mut columns: Vec<&'static str> = Vec::new();
        for def in fields.split(',').filter_map(|name| self.schema.field(name.trim())) {
            if !columns.contains(&def.name) {
                columns.push(def.name);
            }
        }
        if columns.is_empty() {
            self.select_columns.clear();
        } else {
            columns.retain(|c| *c != "id");
            columns.insert(0, "id");
            self.select_columns = columns;
        }
        self
    }

    pub fn order(&mut self, fields: &str) -> &mut Self {
        let parsed = FilterOrder::parse(&self.schema, fields);
        self.order_data = if parsed.is_empty() {
            FilterOrder::default_order()
        } else {
            parsed
        };
        self
    }

    /// Equality scope added by the server itself (nested routes, ownership lookups).
    pub fn where_eq(&mut self, field: &'static str, value: FilterValue) -> &mut Self {
        self.conditions.push(FilterCondition {
            field,
            op: super::types::FilterOp::Eq,
            value,
        });
        self
    }

    pub fn within_radius(&mut self, geo: GeoWithin) -> &mut Self {
        self.geo = Some(geo);
        self
    }

    pub fn populate(&mut self, join: Populate) -> &mut Self {
        self.populate.push(join);
        self
    }

    /// Apply page/limit. Non-numeric or non-positive values fall back to defaults,
    /// as does a page whose end row would not fit in an i64.
    pub fn paginate(
        &mut self,
        page: Option<&str>,
        limit: Option<&str>,
        config: &QueryConfig,
    ) -> &mut Self {
        let page = parse_positive(page).unwrap_or(1);
        let requested = parse_positive(limit).unwrap_or(config.default_limit);
        let limit = match config.max_limit {
            Some(max) if requested > max => {
                if config.debug_logging {
                    tracing::warn!("Limit {} exceeds max {}, capping to max", requested, max);
                }
                max
            }
            _ => requested,
        };
        let page = if page.checked_mul(limit).is_some() { page } else { 1 };
        self.window = Some(PageWindow { page, limit });
        self
    }

    pub fn window(&self) -> Option<PageWindow> {
        self.window
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) =
            FilterWhere::generate(&self.schema, &self.conditions, self.geo.as_ref(), 0);
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self
            .window
            .map(|w| format!("LIMIT {} OFFSET {}", w.limit, w.offset()))
            .unwrap_or_default();

        let query = [
            format!("SELECT {} AS \"row\"", self.build_projection()),
            format!("FROM \"{}\" {}", self.schema.table, ROW_ALIAS),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    /// Count of rows matching the same predicate, ignoring the page window.
    pub fn to_count_sql(&self) -> SqlResult {
        let (where_clause, params) =
            FilterWhere::generate(&self.schema, &self.conditions, self.geo.as_ref(), 0);
        let query = format!(
            "SELECT COUNT(*) AS count FROM \"{}\" {} WHERE {}",
            self.schema.table, ROW_ALIAS, where_clause
        );
        SqlResult { query, params }
    }

    fn build_projection(&self) -> String {
        let columns: Vec<&'static str> = if self.select_columns.is_empty() {
            self.schema.field_names().collect()
        } else {
            self.select_columns.clone()
        };

        let mut pairs: Vec<String> = columns
            .iter()
            .map(|column| match self.parent_join(column) {
                Some(join) => format!("'{}', {}", column, join),
                None => format!("'{}', {}.\"{}\"", column, ROW_ALIAS, column),
            })
            .collect();

        for join in &self.populate {
            if let Populate::Children { name, table, foreign_key, columns } = join {
                pairs.push(format!(
                    "'{}', COALESCE((SELECT json_agg({} ORDER BY c.\"createdAt\") FROM \"{}\" c WHERE c.\"{}\" = {}.\"id\"), '[]'::json)",
                    name,
                    json_object("c", columns),
                    table,
                    foreign_key,
                    ROW_ALIAS
                ));
            }
        }

        format!("json_build_object({})", pairs.join(", "))
    }

    fn parent_join(&self, column: &str) -> Option<String> {
        self.populate.iter().find_map(|join| match join {
            Populate::Parent { field, table, columns } if *field == column => Some(format!(
                "(SELECT {} FROM \"{}\" p WHERE p.\"id\" = {}.\"{}\")",
                json_object("p", columns),
                table,
                ROW_ALIAS,
                field
            )),
            _ => None,
        })
    }
}

fn json_object(alias: &str, columns: &[&str]) -> String {
    let pairs: Vec<String> = columns
        .iter()
        .map(|c| format!("'{}', {}.\"{}\"", c, alias, c))
        .collect();
    format!("json_build_object({})", pairs.join(", "))
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).filter(|v| *v > 0)
}
