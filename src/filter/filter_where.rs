use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::error::FilterError;
use super::schema::{FieldKind, ResourceSchema};
use super::types::{FilterCondition, FilterOp, FilterValue, GeoWithin};

/// Table alias used by every generated statement
pub const ROW_ALIAS: &str = "r";

pub struct FilterWhere {
    param_values: Vec<FilterValue>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Parse one query-string pair (`averageCost[lte]=10000`) into a typed condition.
    pub fn parse_condition(
        schema: &ResourceSchema,
        key: &str,
        raw: &str,
    ) -> Result<FilterCondition, FilterError> {
        let (name, op) = Self::split_key(key)?;
        let def = schema
            .field(name)
            .ok_or_else(|| FilterError::UnknownField(name.to_string()))?;

        match def.kind {
            FieldKind::Json => return Err(FilterError::NotFilterable(name.to_string())),
            FieldKind::Bool | FieldKind::Uuid if op.is_range() => {
                return Err(unsupported(name, op));
            }
            FieldKind::TextArray if op.is_range() => return Err(unsupported(name, op)),
            FieldKind::Bool | FieldKind::Timestamp if op == FilterOp::In => {
                return Err(unsupported(name, op));
            }
            _ => {}
        }

        let value = if op == FilterOp::In {
            parse_list(def.name, def.kind, raw)?
        } else {
            parse_scalar(def.name, def.kind, raw)?
        };

        Ok(FilterCondition {
            field: def.name,
            op,
            value,
        })
    }

    fn split_key(key: &str) -> Result<(&str, FilterOp), FilterError> {
        let Some(open) = key.find('[') else {
            return Ok((key, FilterOp::Eq));
        };
        let name = &key[..open];
        let token = key[open + 1..]
            .strip_suffix(']')
            .ok_or_else(|| FilterError::MalformedKey(key.to_string()))?;
        if name.is_empty() {
            return Err(FilterError::MalformedKey(key.to_string()));
        }
        let op = FilterOp::from_token(token).ok_or_else(|| FilterError::UnsupportedOperator {
            field: name.to_string(),
            op: token.to_string(),
        })?;
        Ok((name, op))
    }

    pub fn generate(
        schema: &ResourceSchema,
        conditions: &[FilterCondition],
        geo: Option<&GeoWithin>,
        starting_param_index: usize,
    ) -> (String, Vec<FilterValue>) {
        let mut filter_where = Self::new(starting_param_index);
        let mut sql_conditions = Vec::with_capacity(conditions.len() + 1);

        for condition in conditions {
            let kind = schema
                .field(condition.field)
                .map(|f| f.kind)
                .unwrap_or(FieldKind::Text);
            sql_conditions.push(filter_where.build_sql_condition(condition, kind));
        }
        if let Some(geo) = geo {
            sql_conditions.push(filter_where.build_geo_condition(geo));
        }

        let where_clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        (where_clause, filter_where.param_values)
    }

    fn build_sql_condition(&mut self, condition: &FilterCondition, kind: FieldKind) -> String {
        let column = format!("{}.\"{}\"", ROW_ALIAS, condition.field);
        let param = self.param(condition.value.clone());

        match (kind, condition.op) {
            (FieldKind::TextArray, FilterOp::In) => format!("{} && {}", column, param),
            (FieldKind::TextArray, _) => format!("{} = ANY({})", param, column),
            (_, FilterOp::In) => format!("{} = ANY({})", column, param),
            (_, op) => format!("{} {} {}", column, op.to_sql(), param),
        }
    }

    /// Spherical law of cosines against the GeoJSON `[lng, lat]` pair.
    fn build_geo_condition(&mut self, geo: &GeoWithin) -> String {
        let lat = self.param(FilterValue::Float(geo.latitude));
        let lng = self.param(FilterValue::Float(geo.longitude));
        let radians = self.param(FilterValue::Float(geo.radians));
        let row_lng = format!(
            "({}.\"{}\"->'coordinates'->>0)::float8",
            ROW_ALIAS, geo.column
        );
        let row_lat = format!(
            "({}.\"{}\"->'coordinates'->>1)::float8",
            ROW_ALIAS, geo.column
        );

        format!(
            "({alias}.\"{col}\" IS NOT NULL AND acos(LEAST(1.0, GREATEST(-1.0, \
             sin(radians({lat})) * sin(radians({row_lat})) + \
             cos(radians({lat})) * cos(radians({row_lat})) * cos(radians({row_lng}) - radians({lng}))\
             ))) <= {radians})",
            alias = ROW_ALIAS,
            col = geo.column,
            lat = lat,
            lng = lng,
            row_lat = row_lat,
            row_lng = row_lng,
            radians = radians,
        )
    }

    fn param(&mut self, value: FilterValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

fn unsupported(field: &str, op: FilterOp) -> FilterError {
    FilterError::UnsupportedOperator {
        field: field.to_string(),
        op: format!("{:?}", op).to_lowercase(),
    }
}

fn invalid(field: &str, raw: &str, kind: FieldKind) -> FilterError {
    FilterError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
        expected: kind.describe(),
    }
}

fn parse_scalar(field: &str, kind: FieldKind, raw: &str) -> Result<FilterValue, FilterError> {
    let raw = raw.trim();
    match kind {
        FieldKind::Text | FieldKind::TextArray => Ok(FilterValue::Text(raw.to_string())),
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(FilterValue::Integer)
            .map_err(|_| invalid(field, raw, kind)),
        FieldKind::Float => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(FilterValue::Float)
            .ok_or_else(|| invalid(field, raw, kind)),
        FieldKind::Bool => match raw {
            "true" | "1" => Ok(FilterValue::Bool(true)),
            "false" | "0" => Ok(FilterValue::Bool(false)),
            _ => Err(invalid(field, raw, kind)),
        },
        FieldKind::Uuid => Uuid::parse_str(raw)
            .map(FilterValue::Uuid)
            .map_err(|_| invalid(field, raw, kind)),
        FieldKind::Timestamp => parse_timestamp(raw)
            .map(FilterValue::Timestamp)
            .ok_or_else(|| invalid(field, raw, kind)),
        FieldKind::Json => Err(FilterError::NotFilterable(field.to_string())),
    }
}

fn parse_list(field: &str, kind: FieldKind, raw: &str) -> Result<FilterValue, FilterError> {
    let items: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let scalars = items
        .iter()
        .map(|item| parse_scalar(field, kind, item))
        .collect::<Result<Vec<_>, _>>()?;

    let value = match kind {
        FieldKind::Text | FieldKind::TextArray => FilterValue::TextList(
            scalars
                .into_iter()
                .filter_map(|v| match v {
                    FilterValue::Text(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        FieldKind::Integer => FilterValue::IntegerList(
            scalars
                .into_iter()
                .filter_map(|v| match v {
                    FilterValue::Integer(i) => Some(i),
                    _ => None,
                })
                .collect(),
        ),
        FieldKind::Float => FilterValue::FloatList(
            scalars
                .into_iter()
                .filter_map(|v| match v {
                    FilterValue::Float(f) => Some(f),
                    _ => None,
                })
                .collect(),
        ),
        FieldKind::Uuid => FilterValue::UuidList(
            scalars
                .into_iter()
                .filter_map(|v| match v {
                    FilterValue::Uuid(u) => Some(u),
                    _ => None,
                })
                .collect(),
        ),
        _ => {
            return Err(FilterError::UnsupportedOperator {
                field: field.to_string(),
                op: "in".to_string(),
            })
        }
    };
    Ok(value)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::schema::field;

    const SCHEMA: ResourceSchema = ResourceSchema {
        table: "bootcamps",
        fields: &[
            field("id", FieldKind::Uuid),
            field("name", FieldKind::Text),
            field("housing", FieldKind::Bool),
            field("averageCost", FieldKind::Integer),
            field("averageRating", FieldKind::Float),
            field("careers", FieldKind::TextArray),
            field("location", FieldKind::Json),
            field("createdAt", FieldKind::Timestamp),
        ],
    };

    fn parse(key: &str, raw: &str) -> Result<FilterCondition, FilterError> {
        FilterWhere::parse_condition(&SCHEMA, key, raw)
    }

    #[test]
    fn bare_key_is_equality() {
        let cond = parse("housing", "true").unwrap();
        assert_eq!(cond.field, "housing");
        assert_eq!(cond.op, FilterOp::Eq);
        assert_eq!(cond.value, FilterValue::Bool(true));
    }

    #[test]
    fn bracketed_operator_is_parsed_structurally() {
        let cond = parse("averageCost[lte]", "10000").unwrap();
        assert_eq!(cond.op, FilterOp::Lte);
        assert_eq!(cond.value, FilterValue::Integer(10000));
    }

    #[test]
    fn field_names_containing_operator_words_are_untouched() {
        // "housing" contains "in"
        let cond = parse("housing", "false").unwrap();
        assert_eq!(cond.field, "housing");
        assert_eq!(cond.op, FilterOp::Eq);
    }

    #[test]
    fn in_splits_on_commas() {
        let cond = parse("careers[in]", "Business, UI/UX").unwrap();
        assert_eq!(
            cond.value,
            FilterValue::TextList(vec!["Business".into(), "UI/UX".into()])
        );
    }

    #[test]
    fn rejects_unknown_fields_and_operators() {
        assert_eq!(
            parse("password", "x"),
            Err(FilterError::UnknownField("password".into()))
        );
        assert!(matches!(
            parse("averageCost[ne]", "1"),
            Err(FilterError::UnsupportedOperator { .. })
        ));
        assert!(matches!(
            parse("averageCost[lte", "1"),
            Err(FilterError::MalformedKey(_))
        ));
        assert!(matches!(
            parse("location", "x"),
            Err(FilterError::NotFilterable(_))
        ));
        assert!(matches!(
            parse("housing[gt]", "true"),
            Err(FilterError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn rejects_values_of_the_wrong_type() {
        assert!(matches!(
            parse("averageCost[gte]", "cheap"),
            Err(FilterError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse("housing", "maybe"),
            Err(FilterError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse("averageRating[gt]", "NaN"),
            Err(FilterError::InvalidValue { .. })
        ));
    }

    #[test]
    fn timestamps_accept_plain_dates() {
        let cond = parse("createdAt[gte]", "2024-02-01").unwrap();
        match cond.value {
            FilterValue::Timestamp(ts) => assert_eq!(ts.to_rfc3339(), "2024-02-01T00:00:00+00:00"),
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn generates_numbered_placeholders() {
        let conditions = vec![
            parse("averageCost[lte]", "10000").unwrap(),
            parse("housing", "true").unwrap(),
            parse("careers", "Business").unwrap(),
            parse("careers[in]", "Business,Other").unwrap(),
        ];
        let (sql, params) = FilterWhere::generate(&SCHEMA, &conditions, None, 0);
        assert_eq!(
            sql,
            "r.\"averageCost\" <= $1 AND r.\"housing\" = $2 AND $3 = ANY(r.\"careers\") AND r.\"careers\" && $4"
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let (sql, params) = FilterWhere::generate(&SCHEMA, &[], None, 0);
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn geo_condition_binds_three_floats() {
        let geo = GeoWithin {
            column: "location",
            longitude: -71.1,
            latitude: 42.3,
            radians: 10.0 / 3963.0,
        };
        let (sql, params) = FilterWhere::generate(&SCHEMA, &[], Some(&geo), 0);
        assert!(sql.contains("acos("));
        assert!(sql.contains("<= $3"));
        assert_eq!(
            params,
            vec![
                FilterValue::Float(42.3),
                FilterValue::Float(-71.1),
                FilterValue::Float(10.0 / 3963.0)
            ]
        );
    }
}
