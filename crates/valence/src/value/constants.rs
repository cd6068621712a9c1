//! Canonical shared constants

use std::sync::OnceLock;

use super::{ObjectPayload, Payload, StaticValue, Storage, ValueData};

static CONSTANTS: OnceLock<Constants> = OnceLock::new();

/// The canonical values shared by the whole runtime.
///
/// Built once, either at warm-up or on first use. Handles obtained from
/// these are always shared, so they can never be mutated in place.
#[derive(Debug)]
pub struct Constants {
    /// `T`
    pub logical_true: StaticValue,
    /// `F`
    pub logical_false: StaticValue,
    /// `NULL`
    pub null: StaticValue,
    /// `NULL`, suppressed when echoed
    pub null_invisible: StaticValue,
    /// The result of an expression that produces nothing
    pub void: StaticValue,
    /// `0`
    pub int_zero: StaticValue,
    /// `1`
    pub int_one: StaticValue,
    /// `0.0`
    pub float_zero: StaticValue,
    /// `1.0`
    pub float_one: StaticValue,
    /// `NAN`
    pub float_nan: StaticValue,
    /// `INF`
    pub float_inf: StaticValue,
    /// `-INF`
    pub float_neg_inf: StaticValue,
    /// `logical(0)`
    pub empty_logical: StaticValue,
    /// `integer(0)`
    pub empty_int: StaticValue,
    /// `float(0)`
    pub empty_float: StaticValue,
    /// `string(0)`
    pub empty_string_vec: StaticValue,
    /// `object(0)`, with no element class
    pub empty_object: StaticValue,
    /// `""`
    pub empty_string: StaticValue,
}

fn constant(payload: Payload) -> StaticValue {
    StaticValue::new(ValueData::from_payload(payload))
}

impl Constants {
    fn build() -> Self {
        tracing::debug!("creating canonical constants");

        let mut null_invisible = ValueData::from_payload(Payload::Null);
        null_invisible.invisible = true;

        Self {
            logical_true: constant(Payload::Logical(Storage::Singleton(true))),
            logical_false: constant(Payload::Logical(Storage::Singleton(false))),
            null: constant(Payload::Null),
            null_invisible: StaticValue::new(null_invisible),
            void: constant(Payload::Void),
            int_zero: constant(Payload::Int(Storage::Singleton(0))),
            int_one: constant(Payload::Int(Storage::Singleton(1))),
            float_zero: constant(Payload::Float(Storage::Singleton(0.0))),
            float_one: constant(Payload::Float(Storage::Singleton(1.0))),
            float_nan: constant(Payload::Float(Storage::Singleton(f64::NAN))),
            float_inf: constant(Payload::Float(Storage::Singleton(f64::INFINITY))),
            float_neg_inf: constant(Payload::Float(Storage::Singleton(f64::NEG_INFINITY))),
            empty_logical: constant(Payload::Logical(Storage::Vector(Vec::new()))),
            empty_int: constant(Payload::Int(Storage::Vector(Vec::new()))),
            empty_float: constant(Payload::Float(Storage::Vector(Vec::new()))),
            empty_string_vec: constant(Payload::String(Storage::Vector(Vec::new()))),
            empty_object: constant(Payload::Object(ObjectPayload::new(
                None,
                Storage::Vector(Vec::new()),
            ))),
            empty_string: constant(Payload::String(Storage::Singleton(String::new()))),
        }
    }
}

/// The canonical constants, built on first use.
pub fn constants() -> &'static Constants {
    CONSTANTS.get_or_init(Constants::build)
}
