// handlers/mod.rs - route handlers, one module per resource
//
// Guards are attached in server.rs; handlers that need the caller take a
// `Principal` extractor, which only resolves behind `protect`.
pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod users;
