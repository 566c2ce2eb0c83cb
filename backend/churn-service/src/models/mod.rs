pub mod feature_record;

pub use feature_record::{
    field_index, field_order, FeatureRecord, FieldKind, FieldSpec, OneHotGroup, ScoreResult,
    FEATURE_COUNT, FIELDS,
};
