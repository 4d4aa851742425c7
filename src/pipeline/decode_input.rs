//! Input step that acquires a raw payload and decodes it into named
//! typed variables.
//!
//! The acquisition itself lives behind the [`RawSource`] trait so concrete
//! transports (serial, modbus, a test double) stay out of the pipeline core.
//! One [`DataDecoder`] is built at construction and retained for the step's
//! lifetime.

use crate::decode::{Conversion, DataDecoder, VariableDef, VariableDefaults};
use crate::error::Result;
use crate::pipeline::step::{PipelineStep, StepKind};
use crate::types::{RawValue, Record, Value, VariableType};
use std::collections::HashMap;

/// Source of raw payloads for a [`DecodeInputStep`]
///
/// Implementations must return payloads whose arity matches the decoder's
/// variable specification. Must be `Send` so a pipeline can run on a
/// dedicated thread.
#[cfg_attr(test, mockall::automock)]
pub trait RawSource: Send {
    /// Acquire one raw payload from the underlying device or transport
    fn read_raw_data(&mut self) -> Result<Vec<RawValue>>;
}

/// Input step: acquires from a [`RawSource`] and decodes the payload.
///
/// Acquisition and decode failures propagate to the caller; isolation
/// happens one level up, in the multi-step or the monitor loop.
pub struct DecodeInputStep {
    name: String,
    source: Box<dyn RawSource>,
    decoder: DataDecoder,
}

impl DecodeInputStep {
    /// Build the step and its decoder from a variable specification
    pub fn new(
        name: impl Into<String>,
        source: Box<dyn RawSource>,
        variables: Vec<VariableDef>,
        conversion_overrides: &HashMap<String, Conversion>,
        custom_types: &HashMap<String, VariableType>,
        defaults: VariableDefaults,
    ) -> Result<Self> {
        let decoder = DataDecoder::new(variables, conversion_overrides, custom_types, defaults)?;
        Ok(Self {
            name: name.into(),
            source,
            decoder,
        })
    }

    /// The decoder built at construction
    pub fn decoder(&self) -> &DataDecoder {
        &self.decoder
    }

    /// Decode one raw payload with the retained decoder
    pub fn decode_data(&self, raw_data: &[RawValue]) -> Result<Record> {
        tracing::debug!(step = %self.name, decoder = ?self.decoder, "Decoding raw payload");
        self.decoder.decode_data(raw_data)
    }
}

impl PipelineStep for DecodeInputStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StepKind {
        StepKind::Input
    }

    fn execute(&mut self, _input: Option<&Value>) -> Result<Option<Value>> {
        let raw_data = self.source.read_raw_data()?;
        let record = self.decoder.decode_data(&raw_data)?;
        Ok(Some(Value::Map(record)))
    }
}
