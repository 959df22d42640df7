pub mod auth;
pub mod extract;
pub mod response;
pub mod roles;

pub use auth::protect;
pub use extract::{ApiJson, ApiPath};
pub use response::{
    empty, ApiResponse, CollectionResponse, ListResponse, LogoutResponse, TokenResponse,
};
pub use roles::authorize;

pub type ApiResult<T> = Result<T, crate::error::ApiError>;
