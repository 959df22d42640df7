// handlers/bootcamps/radius.rs - GET /api/v1/bootcamps/radius/:zipcode/:distance
use axum::extract::State;

use crate::database::models::{bootcamp, Bootcamp};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::{Filter, GeoWithin};
use crate::middleware::{ApiPath, ApiResult, CollectionResponse};
use crate::state::AppState;

/// Mean equatorial radius, kilometres
pub const EARTH_RADIUS_KM: f64 = 6378.0;

pub fn angular_radius(distance_km: f64) -> f64 {
    distance_km / EARTH_RADIUS_KM
}

/// Bootcamps within `distance` km of the postal code's centre point
pub async fn within_radius(
    State(state): State<AppState>,
    ApiPath((zipcode, distance)): ApiPath<(String, f64)>,
) -> ApiResult<CollectionResponse<Bootcamp>> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(ApiError::invalid_field(
            "distance",
            "Distance must be a positive number of kilometres",
        ));
    }

    let center = state.geocoder.geocode(&zipcode).await?;
    let mut filter = Filter::new(bootcamp::SCHEMA);
    filter.within_radius(GeoWithin {
        column: "location",
        longitude: center.longitude(),
        latitude: center.latitude(),
        radians: angular_radius(distance),
    });

    let bootcamps = Repository::<Bootcamp>::new(state.pool.clone())
        .select_any(filter)
        .await?;
    Ok(CollectionResponse::new(bootcamps))
}
