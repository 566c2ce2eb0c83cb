use std::borrow::Cow;
use utoipa::openapi::schema::{KnownFormat, ObjectBuilder, Schema, SchemaFormat, Type};
use utoipa::openapi::RefOr;
use utoipa::{OpenApi, PartialSchema, ToSchema};

use crate::error::ErrorResponse;
use crate::handlers::{predictions, records, ModelInfoResponse, PredictionResponse};
use crate::models::{FeatureRecord, FieldKind, FIELDS};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Customer Churn Prediction API",
        version = "1.0",
        description = "A simple API for predicting customer churn"
    ),
    paths(predictions::predict, predictions::model_info, records::random_record),
    components(schemas(FeatureRecord, PredictionResponse, ModelInfoResponse, ErrorResponse)),
    tags((name = "predictions", description = "Churn Predictions"))
)]
pub struct ApiDoc;

/// OpenAPI specification for the churn service.
pub fn doc() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

// The feature record's field names are not Rust identifiers, so its schema is
// built from the field catalog instead of derived.
impl PartialSchema for FeatureRecord {
    fn schema() -> RefOr<Schema> {
        let mut customer = ObjectBuilder::new()
            .description(Some("Customer feature record; every field is required"));

        for field in FIELDS.iter() {
            let property = match field.kind {
                FieldKind::Continuous { .. } => ObjectBuilder::new()
                    .schema_type(Type::Number)
                    .format(Some(SchemaFormat::KnownFormat(KnownFormat::Double))),
                FieldKind::Binary | FieldKind::Member(_) => {
                    ObjectBuilder::new().schema_type(Type::Integer)
                }
            }
            .description(Some(field.description));

            customer = customer
                .property(field.name, Schema::Object(property.build()))
                .required(field.name);
        }

        RefOr::T(Schema::Object(customer.build()))
    }
}

impl ToSchema for FeatureRecord {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Customer")
    }
}
