//! Synthetic feature records for smoke tests and demos.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{FeatureRecord, FieldKind, OneHotGroup, FEATURE_COUNT, FIELDS};

/// Round to two decimal places.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Draw a random record that satisfies every schema invariant by
/// construction.
///
/// Plain indicators are fair coin flips, charges are uniform over their
/// plausible range and rounded to cents, and each one-hot group gets exactly
/// one uniformly chosen active member.
pub fn generate_record<R: Rng + ?Sized>(rng: &mut R) -> FeatureRecord {
    let mut values = [0.0; FEATURE_COUNT];

    for (slot, field) in values.iter_mut().zip(FIELDS.iter()) {
        *slot = match field.kind {
            FieldKind::Binary => f64::from(rng.gen_range(0u8..=1)),
            FieldKind::Continuous { min, max } => round_to_cents(rng.gen_range(min..=max)),
            FieldKind::Member(_) => 0.0,
        };
    }

    for group in OneHotGroup::ALL {
        let active = rng.gen_range(group.range());
        values[active] = 1.0;
    }

    FeatureRecord::from_trusted(values)
}

/// Reproducible record for a given seed.
pub fn generate_seeded(seed: u64) -> FeatureRecord {
    generate_record(&mut StdRng::seed_from_u64(seed))
}
