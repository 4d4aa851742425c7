//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use fieldlog_rs::{FieldLogError, RawSource, RawValue, Result};

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Source producing the same payload on every read
pub struct FixedSource {
    payload: Vec<RawValue>,
}

impl FixedSource {
    pub fn new(payload: Vec<RawValue>) -> Self {
        Self { payload }
    }
}

impl RawSource for FixedSource {
    fn read_raw_data(&mut self) -> Result<Vec<RawValue>> {
        Ok(self.payload.clone())
    }
}

/// Source failing on every read
pub struct OfflineSource;

impl RawSource for OfflineSource {
    fn read_raw_data(&mut self) -> Result<Vec<RawValue>> {
        Err(FieldLogError::Acquisition("source offline".to_string()))
    }
}
