//! Sequential composition of pipeline steps.
//!
//! Every sub-step receives the *same* input — outputs are not threaded from
//! one sub-step to the next. The ordered outputs are then flattened into one
//! merged record; on key collisions the later sub-step wins.

use crate::error::{FieldLogError, Result};
use crate::pipeline::step::{PipelineStep, StepKind};
use crate::types::{Record, Value};

/// Runs an ordered list of sub-steps and merges their record outputs
pub struct SequentialMultiStep {
    name: String,
    steps: Vec<Box<dyn PipelineStep>>,
}

impl SequentialMultiStep {
    /// Compose the given sub-steps under one name
    pub fn new(name: impl Into<String>, steps: Vec<Box<dyn PipelineStep>>) -> Self {
        let name = name.into();
        let shape: Vec<&str> = steps.iter().map(|s| s.kind().label()).collect();
        tracing::debug!(multi_step = %name, ?shape, "Composed sequential multi-step");
        Self { name, steps }
    }

    /// Number of composed sub-steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when no sub-steps are composed
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run one sub-step, tagged with its position for log correlation
    fn execute_step(
        idx: usize,
        step: &mut dyn PipelineStep,
        input: Option<&Value>,
    ) -> Result<Option<Value>> {
        tracing::debug!(
            sub_step = idx,
            name = step.name(),
            kind = step.kind().label(),
            "Executing sub-step"
        );
        step.execute(input)
    }
}

impl PipelineStep for SequentialMultiStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StepKind {
        StepKind::Unit
    }

    fn execute(&mut self, input: Option<&Value>) -> Result<Option<Value>> {
        let mut outputs = Vec::with_capacity(self.steps.len());
        for (idx, step) in self.steps.iter_mut().enumerate() {
            let step_output = Self::execute_step(idx, step.as_mut(), input)?;
            outputs.push(step_output);
        }

        let mut merged = Record::new();
        for (idx, output) in outputs.into_iter().enumerate() {
            match output {
                // A sub-step may legitimately produce nothing
                None => {}
                Some(Value::Map(record)) => merged.extend(record),
                Some(other) => {
                    return Err(FieldLogError::Composition(format!(
                        "sub-step {} of {:?} produced a non-mergeable {} output",
                        idx,
                        self.name,
                        other.type_name()
                    )));
                }
            }
        }
        Ok(Some(Value::Map(merged)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Sub-step producing a fixed output, recording the inputs it saw
    struct FixedStep {
        name: String,
        output: Option<Value>,
        seen_inputs: Arc<Mutex<Vec<Option<Value>>>>,
    }

    impl FixedStep {
        fn new(name: &str, output: Option<Value>) -> (Self, Arc<Mutex<Vec<Option<Value>>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    name: name.to_string(),
                    output,
                    seen_inputs: seen.clone(),
                },
                seen,
            )
        }
    }

    impl PipelineStep for FixedStep {
        fn name(&self) -> &str {
            &self.name
        }

        fn kind(&self) -> StepKind {
            StepKind::Transform
        }

        fn execute(&mut self, input: Option<&Value>) -> Result<Option<Value>> {
            self.seen_inputs.lock().unwrap().push(input.cloned());
            Ok(self.output.clone())
        }
    }

    fn single_key(key: &str, value: i64) -> Option<Value> {
        let mut record = Record::new();
        record.insert(key.to_string(), Value::Int(value));
        Some(Value::Map(record))
    }

    #[test]
    fn test_merge_distinct_keys() {
        let (a, _) = FixedStep::new("a", single_key("va", 1));
        let (b, _) = FixedStep::new("b", single_key("vb", 2));
        let (c, _) = FixedStep::new("c", single_key("vc", 3));
        let mut multi =
            SequentialMultiStep::new("sensors", vec![Box::new(a), Box::new(b), Box::new(c)]);

        let output = multi.execute(None).unwrap().unwrap();
        let record = output.as_map().unwrap();
        assert_eq!(record.len(), 3);
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["va", "vb", "vc"]);
    }

    #[test]
    fn test_merge_collision_later_wins() {
        let (a, _) = FixedStep::new("a", single_key("v", 1));
        let (b, _) = FixedStep::new("b", single_key("v", 2));
        let mut multi = SequentialMultiStep::new("sensors", vec![Box::new(a), Box::new(b)]);

        let output = multi.execute(None).unwrap().unwrap();
        let record = output.as_map().unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record["v"], Value::Int(2));
    }

    #[test]
    fn test_each_sub_step_sees_original_input() {
        let (a, seen_a) = FixedStep::new("a", single_key("va", 1));
        let (b, seen_b) = FixedStep::new("b", single_key("vb", 2));
        let mut multi = SequentialMultiStep::new("sensors", vec![Box::new(a), Box::new(b)]);

        let input = Value::Str("upstream".to_string());
        multi.execute(Some(&input)).unwrap();

        assert_eq!(seen_a.lock().unwrap()[0], Some(input.clone()));
        // b receives the original input, not a's output
        assert_eq!(seen_b.lock().unwrap()[0], Some(input));
    }

    #[test]
    fn test_non_map_output_is_composition_error() {
        let (a, _) = FixedStep::new("a", single_key("va", 1));
        let (b, _) = FixedStep::new("b", Some(Value::Int(7)));
        let mut multi = SequentialMultiStep::new("sensors", vec![Box::new(a), Box::new(b)]);

        let err = multi.execute(None).unwrap_err();
        assert_eq!(err.kind(), "CompositionError");
        assert!(err.to_string().contains("sub-step 1"));
    }

    #[test]
    fn test_none_output_contributes_nothing() {
        let (a, _) = FixedStep::new("a", single_key("va", 1));
        let (b, _) = FixedStep::new("b", None);
        let mut multi = SequentialMultiStep::new("sensors", vec![Box::new(a), Box::new(b)]);

        let output = multi.execute(None).unwrap().unwrap();
        assert_eq!(output.as_map().unwrap().len(), 1);
    }

    #[test]
    fn test_sub_step_failure_propagates() {
        struct FailingStep;
        impl PipelineStep for FailingStep {
            fn name(&self) -> &str {
                "failing"
            }
            fn kind(&self) -> StepKind {
                StepKind::Input
            }
            fn execute(&mut self, _input: Option<&Value>) -> Result<Option<Value>> {
                Err(FieldLogError::Acquisition("sensor offline".to_string()))
            }
        }

        let (a, _) = FixedStep::new("a", single_key("va", 1));
        let mut multi =
            SequentialMultiStep::new("sensors", vec![Box::new(a), Box::new(FailingStep)]);
        let err = multi.execute(None).unwrap_err();
        assert_eq!(err.kind(), "AcquisitionError");
    }
}
