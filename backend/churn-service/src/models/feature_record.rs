//! Feature record contract shared by the scorer and the generator.
//!
//! The catalog below fixes the column order the model artifact was trained
//! with. Spellings such as `InternetService_Fiber optic` and
//! `PaymentMethod_Bank transfer (automatic)` are part of that contract.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::ops::Range;

use crate::error::SchemaError;

/// Number of columns in a feature record.
pub const FEATURE_COUNT: usize = 34;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Plain 0/1 indicator
    Binary,
    /// Non-negative amount; the range only bounds synthesized values
    Continuous { min: f64, max: f64 },
    /// 0/1 member of a one-hot group
    Member(OneHotGroup),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

impl FieldSpec {
    const fn binary(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Binary,
            description,
        }
    }

    const fn continuous(name: &'static str, min: f64, max: f64, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Continuous { min, max },
            description,
        }
    }

    const fn member(group: OneHotGroup, name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Member(group),
            description,
        }
    }

    pub fn is_binary(&self) -> bool {
        !matches!(self.kind, FieldKind::Continuous { .. })
    }
}

/// Canonical field catalog, in model column order.
pub static FIELDS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec::binary("SeniorCitizen", "Senior Citizen binary indicator (0 or 1)"),
    FieldSpec::binary("Partner", "Partner binary indicator (0 or 1)"),
    FieldSpec::binary("Dependents", "Dependents binary indicator (0 or 1)"),
    FieldSpec::binary("PhoneService", "Phone Service binary indicator (0 or 1)"),
    FieldSpec::binary("MultipleLines", "Multiple Lines binary indicator (0 or 1)"),
    FieldSpec::binary("OnlineSecurity", "Online Security binary indicator (0 or 1)"),
    FieldSpec::binary("OnlineBackup", "Online Backup binary indicator (0 or 1)"),
    FieldSpec::binary("DeviceProtection", "Device Protection binary indicator (0 or 1)"),
    FieldSpec::binary("TechSupport", "Tech Support binary indicator (0 or 1)"),
    FieldSpec::binary("StreamingTV", "Streaming TV binary indicator (0 or 1)"),
    FieldSpec::binary("StreamingMovies", "Streaming Movies binary indicator (0 or 1)"),
    FieldSpec::binary("PaperlessBilling", "Paperless Billing binary indicator (0 or 1)"),
    FieldSpec::continuous("MonthlyCharges", 20.0, 200.0, "Monthly Charges (numeric value)"),
    FieldSpec::continuous("TotalCharges", 20.0, 8000.0, "Total Charges (numeric value)"),
    FieldSpec::binary("HasInternetService", "Internet Service binary indicator (0 or 1)"),
    FieldSpec::binary("HasContract", "Has Contract binary indicator (0 or 1)"),
    FieldSpec::member(OneHotGroup::Gender, "Gender_Female", "Gender Female binary indicator (0 or 1)"),
    FieldSpec::member(OneHotGroup::Gender, "Gender_Male", "Gender Male binary indicator (0 or 1)"),
    FieldSpec::member(
        OneHotGroup::InternetService,
        "InternetService_DSL",
        "Internet Service DSL binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::InternetService,
        "InternetService_Fiber optic",
        "Internet Service Fiber Optic binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::InternetService,
        "InternetService_No",
        "No Internet Service binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::PaymentMethod,
        "PaymentMethod_Bank transfer (automatic)",
        "Payment Method Bank Transfer (automatic) binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::PaymentMethod,
        "PaymentMethod_Credit card (automatic)",
        "Payment Method Credit Card (automatic) binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::PaymentMethod,
        "PaymentMethod_Electronic check",
        "Payment Method Electronic Check binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::PaymentMethod,
        "PaymentMethod_Mailed check",
        "Payment Method Mailed Check binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::ContractType,
        "ContractType_Month-to-month",
        "Contract Type Month-to-Month binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::ContractType,
        "ContractType_One year",
        "Contract Type One Year binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::ContractType,
        "ContractType_Two year",
        "Contract Type Two Year binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::TenureGroup,
        "TenureGroup_1 - 12",
        "Tenure Group 1-12 Months binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::TenureGroup,
        "TenureGroup_13 - 24",
        "Tenure Group 13-24 Months binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::TenureGroup,
        "TenureGroup_25 - 36",
        "Tenure Group 25-36 Months binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::TenureGroup,
        "TenureGroup_37 - 48",
        "Tenure Group 37-48 Months binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::TenureGroup,
        "TenureGroup_49 - 60",
        "Tenure Group 49-60 Months binary indicator (0 or 1)",
    ),
    FieldSpec::member(
        OneHotGroup::TenureGroup,
        "TenureGroup_61 - 72",
        "Tenure Group 61-72 Months binary indicator (0 or 1)",
    ),
];

/// Canonical column order expected by the model artifact.
pub fn field_order() -> [&'static str; FEATURE_COUNT] {
    std::array::from_fn(|i| FIELDS[i].name)
}

/// Position of `name` in the canonical order.
pub fn field_index(name: &str) -> Option<usize> {
    FIELDS.iter().position(|field| field.name == name)
}

/// Categorical variable encoded as mutually-exclusive indicator columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OneHotGroup {
    Gender,
    InternetService,
    PaymentMethod,
    ContractType,
    TenureGroup,
}

impl OneHotGroup {
    pub const ALL: [OneHotGroup; 5] = [
        OneHotGroup::Gender,
        OneHotGroup::InternetService,
        OneHotGroup::PaymentMethod,
        OneHotGroup::ContractType,
        OneHotGroup::TenureGroup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OneHotGroup::Gender => "Gender",
            OneHotGroup::InternetService => "InternetService",
            OneHotGroup::PaymentMethod => "PaymentMethod",
            OneHotGroup::ContractType => "ContractType",
            OneHotGroup::TenureGroup => "TenureGroup",
        }
    }

    // Members are contiguous in the catalog.
    pub(crate) fn range(self) -> Range<usize> {
        match self {
            OneHotGroup::Gender => 16..18,
            OneHotGroup::InternetService => 18..21,
            OneHotGroup::PaymentMethod => 21..25,
            OneHotGroup::ContractType => 25..28,
            OneHotGroup::TenureGroup => 28..34,
        }
    }

    pub fn members(self) -> &'static [FieldSpec] {
        &FIELDS[self.range()]
    }
}

impl fmt::Display for OneHotGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A complete, schema-valid feature record.
///
/// Values are held in canonical column order. Every constructor checks the
/// schema invariants, so a `FeatureRecord` in hand is always safe to score.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    values: [f64; FEATURE_COUNT],
}

impl FeatureRecord {
    /// Validate a raw JSON payload into a record.
    ///
    /// Checks run in a fixed order and stop at the first violation: object
    /// shape, then each field in canonical order (presence, JSON type,
    /// domain), then unknown fields, then one-hot group sums. Nothing is
    /// coerced: `1.0`, `true` and `"1"` are all type errors for a binary
    /// field.
    pub fn validate(raw: &Value) -> Result<Self, SchemaError> {
        let object = raw.as_object().ok_or(SchemaError::NotAnObject)?;

        let mut values = [0.0; FEATURE_COUNT];
        for (slot, field) in values.iter_mut().zip(FIELDS.iter()) {
            let value = object
                .get(field.name)
                .ok_or(SchemaError::MissingField { field: field.name })?;
            *slot = parse_value(field, value)?;
        }

        if let Some(unknown) = object.keys().find(|key| field_index(key).is_none()) {
            return Err(SchemaError::UnknownField {
                field: unknown.clone(),
            });
        }

        check_groups(&values)?;
        Ok(Self { values })
    }

    /// Build a record from values already in canonical order.
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Result<Self, SchemaError> {
        for (field, value) in FIELDS.iter().zip(values.iter()) {
            check_domain(field, *value)?;
        }
        check_groups(&values)?;
        Ok(Self { values })
    }

    /// For values that are valid by construction; checked in debug builds only.
    pub(crate) fn from_trusted(values: [f64; FEATURE_COUNT]) -> Self {
        debug_assert!(Self::from_values(values).is_ok());
        Self { values }
    }

    /// Lowest-valued valid record: every indicator off, charges at their
    /// plausible minimum and the first member of each group active.
    pub fn baseline() -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, field) in values.iter_mut().zip(FIELDS.iter()) {
            if let FieldKind::Continuous { min, .. } = field.kind {
                *slot = min;
            }
        }
        for group in OneHotGroup::ALL {
            values[group.range().start] = 1.0;
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        field_index(name).map(|i| self.values[i])
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Name of the single active member of `group`.
    pub fn active_member(&self, group: OneHotGroup) -> &'static str {
        let range = group.range();
        let start = range.start;
        range
            .map(|i| (i, self.values[i]))
            .find(|(_, value)| *value == 1.0)
            .map(|(i, _)| FIELDS[i].name)
            .unwrap_or(FIELDS[start].name)
    }

    /// Model input row in canonical column order.
    pub fn to_model_input(&self) -> Vec<f32> {
        self.values.iter().map(|v| *v as f32).collect()
    }
}

fn parse_value(field: &FieldSpec, value: &Value) -> Result<f64, SchemaError> {
    match field.kind {
        FieldKind::Binary | FieldKind::Member(_) => {
            let number = match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => n,
                _ => {
                    return Err(SchemaError::WrongType {
                        field: field.name,
                        expected: "an integer 0 or 1",
                    })
                }
            };
            match number.as_u64() {
                Some(0) => Ok(0.0),
                Some(1) => Ok(1.0),
                _ => Err(SchemaError::NotBinary {
                    field: field.name,
                    value: number.to_string(),
                }),
            }
        }
        FieldKind::Continuous { .. } => {
            let number = value.as_f64().ok_or(SchemaError::WrongType {
                field: field.name,
                expected: "a number",
            })?;
            check_domain(field, number)?;
            Ok(number)
        }
    }
}

fn check_domain(field: &FieldSpec, value: f64) -> Result<(), SchemaError> {
    if field.is_binary() {
        if value != 0.0 && value != 1.0 {
            return Err(SchemaError::NotBinary {
                field: field.name,
                value: value.to_string(),
            });
        }
    } else if value < 0.0 || !(value as f32).is_finite() {
        return Err(SchemaError::OutOfDomain {
            field: field.name,
            value,
        });
    }
    Ok(())
}

fn check_groups(values: &[f64; FEATURE_COUNT]) -> Result<(), SchemaError> {
    for group in OneHotGroup::ALL {
        let active = values[group.range()]
            .iter()
            .filter(|value| **value == 1.0)
            .count() as u32;
        if active != 1 {
            return Err(SchemaError::GroupSum { group, active });
        }
    }
    Ok(())
}

impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (field, value) in FIELDS.iter().zip(self.values.iter()) {
            if field.is_binary() {
                map.serialize_entry(field.name, &(*value as u8))?;
            } else {
                map.serialize_entry(field.name, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FeatureRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        FeatureRecord::validate(&raw).map_err(D::Error::custom)
    }
}

/// Output of one scoring call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    /// Probability of the positive (churn) class
    pub soft_prediction: f64,
    /// Class label from the model's own decision rule, 1 = churn
    pub hard_prediction: u8,
}
