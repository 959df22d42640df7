pub mod account;
pub mod reset;
pub mod session;

pub use account::{update_details, update_password};
pub use reset::{forgot_password, reset_password};
pub use session::{login, logout, me, register};
