/// Column types the filter knows how to parse and compare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Bool,
    Uuid,
    Timestamp,
    TextArray,
    /// Returned as-is; never filtered or sorted on
    Json,
}

impl FieldKind {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "number",
            FieldKind::Bool => "true or false",
            FieldKind::Uuid => "id",
            FieldKind::Timestamp => "RFC 3339 timestamp or YYYY-MM-DD date",
            FieldKind::TextArray => "text",
            FieldKind::Json => "object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

pub const fn field(name: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef { name, kind }
}

/// Joins a listing can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Populate {
    /// Replace a reference column with a few columns of the referenced row
    Parent {
        field: &'static str,
        table: &'static str,
        columns: &'static [&'static str],
    },
    /// Attach the rows of a child table that reference the listed row
    Children {
        name: &'static str,
        table: &'static str,
        foreign_key: &'static str,
        columns: &'static [&'static str],
    },
}

/// The readable shape of one collection. Columns not listed here (password
/// hashes, reset tokens) can never be selected, filtered or sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSchema {
    pub table: &'static str,
    pub fields: &'static [FieldDef],
}

impl ResourceSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|f| f.name)
    }
}
