pub mod error;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod schema;
pub mod types;

pub use error::FilterError;
pub use filter::Filter;
pub use schema::{field, FieldDef, FieldKind, Populate, ResourceSchema};
pub use types::*;
