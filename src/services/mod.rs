pub mod aggregates;
pub mod geocoder;
pub mod mailer;
pub mod uploads;

pub use geocoder::{Geocoder, MapQuestGeocoder};
pub use mailer::{Mailer, Message};
