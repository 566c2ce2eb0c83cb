use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

use crate::metrics;
use crate::models::FeatureRecord;
use crate::services::{generate_record, generate_seeded};

/// Query parameters for GET /rnd
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RandomRecordQuery {
    /// Seed for a reproducible record; omitted means a fresh random one
    pub seed: Option<u64>,
}

/// GET /rnd
/// Generate random data that the model could consume
#[utoipa::path(
    get,
    path = "/rnd",
    params(RandomRecordQuery),
    responses(
        (status = 200, description = "Schema-valid synthetic customer", body = FeatureRecord)
    )
)]
pub async fn random_record(query: web::Query<RandomRecordQuery>) -> HttpResponse {
    let record = match query.seed {
        Some(seed) => generate_seeded(seed),
        None => generate_record(&mut rand::thread_rng()),
    };

    metrics::record_generated();
    debug!(seed = ?query.seed, "Generated synthetic feature record");

    HttpResponse::Ok().json(record)
}
