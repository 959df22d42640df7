use axum::{
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::SecurityConfig;
use crate::database::QueryResults;
use crate::filter::Pagination;

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

/// `{ success: true, data: {} }` for deletes and logout
pub fn empty() -> ApiResponse<Value> {
    ApiResponse::success(json!({}))
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "success": true, "data": data_value }))).into_response()
    }
}

/// Unpaged collection: `{ success, count, data }`
#[derive(Debug, Serialize)]
pub struct CollectionResponse<T: Serialize> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> CollectionResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for CollectionResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Paged listing: `{ success, count, pagination, data }`
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<Value>,
}

impl From<QueryResults<Value>> for ListResponse {
    fn from(results: QueryResults<Value>) -> Self {
        Self {
            success: true,
            count: results.count,
            pagination: results.pagination,
            data: results.data,
        }
    }
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `{ success, token }` plus the `token` cookie
#[derive(Debug)]
pub struct TokenResponse {
    pub token: String,
    pub status_code: StatusCode,
    cookie: String,
}

impl TokenResponse {
    pub fn new(token: String, security: &SecurityConfig) -> Self {
        let cookie = session_cookie(&token, Duration::days(security.cookie_expiry_days), security.secure_cookies);
        Self {
            token,
            status_code: StatusCode::OK,
            cookie,
        }
    }

    pub fn created(mut self) -> Self {
        self.status_code = StatusCode::CREATED;
        self
    }
}

impl IntoResponse for TokenResponse {
    fn into_response(self) -> Response {
        let body = Json(json!({ "success": true, "token": self.token }));
        let mut response = (self.status_code, body).into_response();
        match HeaderValue::from_str(&self.cookie) {
            Ok(value) => {
                response.headers_mut().insert(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Could not encode session cookie: {}", e),
        }
        response
    }
}

/// Overwrites the session cookie with `none`, expiring in ten seconds
pub struct LogoutResponse {
    cookie: String,
}

impl LogoutResponse {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            cookie: session_cookie("none", Duration::seconds(10), security.secure_cookies),
        }
    }
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        let mut response = empty().into_response();
        if let Ok(value) = HeaderValue::from_str(&self.cookie) {
            response.headers_mut().insert(SET_COOKIE, value);
        }
        response
    }
}

pub fn session_cookie(value: &str, lifetime: Duration, secure: bool) -> String {
    let expires = (Utc::now() + lifetime).format("%a, %d %b %Y %H:%M:%S GMT");
    let mut cookie = format!(
        "token={}; Path=/; HttpOnly; Max-Age={}; Expires={}",
        value,
        lifetime.num_seconds(),
        expires
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
