use super::filter_where::ROW_ALIAS;
use super::schema::{FieldKind, ResourceSchema};
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Newest first when no usable sort is given
    pub fn default_order() -> Vec<FilterOrderInfo> {
        vec![FilterOrderInfo {
            column: "createdAt",
            sort: SortDirection::Desc,
        }]
    }

    /// Parse `a,-b`. Names not in the schema, or not sortable, are skipped.
    pub fn parse(schema: &ResourceSchema, fields: &str) -> Vec<FilterOrderInfo> {
        let mut out = Vec::new();
        for part in fields.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (name, sort) = match trimmed.strip_prefix('-') {
                Some(rest) => (rest, SortDirection::Desc),
                None => (trimmed.trim_start_matches('+'), SortDirection::Asc),
            };
            let Some(def) = schema.field(name) else {
                continue;
            };
            if def.kind == FieldKind::Json || out.iter().any(|o: &FilterOrderInfo| o.column == def.name) {
                continue;
            }
            out.push(FilterOrderInfo {
                column: def.name,
                sort,
            });
        }
        out
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        let mut parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{}.\"{}\" {}", ROW_ALIAS, i.column, i.sort.to_sql()))
            .collect();
        if !infos.iter().any(|i| i.column == "id") {
            parts.push(format!("{}.\"id\" ASC", ROW_ALIAS));
        }
        format!("ORDER BY {}", parts.join(", "))
    }
}
