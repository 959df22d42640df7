pub mod bootcamp;
pub mod photo;
pub mod radius;

pub use bootcamp::{create, delete, get, list, update};
pub use photo::upload as photo_upload;
pub use radius::within_radius;
