//! Status data collection from a registry of named items.
//!
//! Each [`StatusDataItem`] pairs a name with a zero-argument producer
//! function and an `unpack` flag. Collection rebuilds the record from
//! scratch every cycle, visiting items in registration order: unpacked
//! items merge their map entries directly into the record, all others are
//! stored under their own name.

use crate::error::{FieldLogError, Result, ResultExt};
use crate::types::{Record, Value};
use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Zero-argument data-producing function of a status item
pub type StatusFn = Box<dyn Fn() -> Result<Value> + Send + Sync>;

/// A named status entry: producer function plus unpack flag
pub struct StatusDataItem {
    name: String,
    function: StatusFn,
    unpack: bool,
}

impl StatusDataItem {
    /// Create an item; with `unpack` the produced value must be a map whose
    /// entries merge directly into the cycle record
    pub fn new(name: impl Into<String>, function: StatusFn, unpack: bool) -> Self {
        Self {
            name: name.into(),
            function,
            unpack,
        }
    }

    /// Item name, also the record key for non-unpacked items
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the produced map merges flat into the record
    pub fn unpack(&self) -> bool {
        self.unpack
    }

    /// Call the producer function
    pub fn invoke(&self) -> Result<Value> {
        (self.function)()
    }
}

impl fmt::Debug for StatusDataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusDataItem")
            .field("name", &self.name)
            .field("unpack", &self.unpack)
            .finish()
    }
}

/// Ordered, immutable-at-runtime collection of status items
#[derive(Debug, Default)]
pub struct StatusRegistry {
    items: Vec<StatusDataItem>,
}

impl StatusRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item; collection order is registration order
    pub fn register(&mut self, item: StatusDataItem) {
        self.items.push(item);
    }

    /// Builder-style registration
    pub fn with_item(
        mut self,
        name: impl Into<String>,
        function: StatusFn,
        unpack: bool,
    ) -> Self {
        self.register(StatusDataItem::new(name, function, unpack));
        self
    }

    /// Number of registered items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no items are registered
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in registration order
    pub fn iter(&self) -> impl Iterator<Item = &StatusDataItem> {
        self.items.iter()
    }

    /// Registry of built-in process status items, usable without any
    /// sensor hardware: UTC timestamp, cycle counter, and an unpacked
    /// runtime map (uptime seconds and process id)
    pub fn with_default_items() -> Self {
        let started = Instant::now();
        let cycle = Arc::new(AtomicU64::new(0));

        Self::new()
            .with_item(
                "time_utc",
                Box::new(|| Ok(Value::Str(Utc::now().to_rfc3339()))),
                false,
            )
            .with_item(
                "cycle",
                Box::new(move || Ok(Value::UInt(cycle.fetch_add(1, Ordering::Relaxed)))),
                false,
            )
            .with_item(
                "runtime",
                Box::new(move || {
                    let mut runtime = Record::new();
                    runtime.insert(
                        "uptime_s".to_string(),
                        Value::Float(started.elapsed().as_secs_f64()),
                    );
                    runtime.insert("pid".to_string(), Value::UInt(std::process::id() as u64));
                    Ok(Value::Map(runtime))
                }),
                true,
            )
    }
}

/// Collect one cycle's status record from the registry
///
/// Rebuilt fresh each call. Later entries win on key collisions, both for
/// unpacked maps and for repeated item names.
pub fn get_status_data(registry: &StatusRegistry) -> Result<Record> {
    let mut status_data = Record::new();
    for item in registry.iter() {
        let output_data = item
            .invoke()
            .with_context(|| format!("collecting status item {:?}", item.name()))?;
        if item.unpack() {
            match output_data {
                Value::Map(inner) => status_data.extend(inner),
                other => {
                    return Err(FieldLogError::Composition(format!(
                        "status item {:?} is marked unpack but produced a {} value",
                        item.name(),
                        other.type_name()
                    )));
                }
            }
        } else {
            status_data.insert(item.name().to_string(), output_data);
        }
    }
    tracing::debug!(status_data = ?status_data, "Collected status data");
    Ok(status_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(name: &str, value: Value, unpack: bool) -> StatusDataItem {
        StatusDataItem::new(name, Box::new(move || Ok(value.clone())), unpack)
    }

    #[test]
    fn test_one_key_per_plain_item() {
        let mut registry = StatusRegistry::new();
        registry.register(item("a", Value::Int(1), false));
        registry.register(item("b", Value::Int(2), false));

        let record = get_status_data(&registry).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record["a"], Value::Int(1));
        assert_eq!(record["b"], Value::Int(2));
    }

    #[test]
    fn test_unpack_merges_keys_directly() {
        let mut inner = Record::new();
        inner.insert("x".to_string(), Value::Int(1));
        inner.insert("y".to_string(), Value::Int(2));

        let mut registry = StatusRegistry::new();
        registry.register(item("grouped", Value::Map(inner), true));

        let record = get_status_data(&registry).unwrap();
        assert!(record.contains_key("x"));
        assert!(record.contains_key("y"));
        assert!(!record.contains_key("grouped"));
    }

    #[test]
    fn test_non_unpack_map_nests_under_item_name() {
        let mut inner = Record::new();
        inner.insert("x".to_string(), Value::Int(1));

        let mut registry = StatusRegistry::new();
        registry.register(item("grouped", Value::Map(inner), false));

        let record = get_status_data(&registry).unwrap();
        assert!(record["grouped"].is_map());
    }

    #[test]
    fn test_unpack_collision_later_wins() {
        let mut first = Record::new();
        first.insert("v".to_string(), Value::Int(1));
        let mut second = Record::new();
        second.insert("v".to_string(), Value::Int(2));

        let mut registry = StatusRegistry::new();
        registry.register(item("a", Value::Map(first), true));
        registry.register(item("b", Value::Map(second), true));

        let record = get_status_data(&registry).unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record["v"], Value::Int(2));
    }

    #[test]
    fn test_unpack_non_map_is_composition_error() {
        let mut registry = StatusRegistry::new();
        registry.register(item("bad", Value::Int(1), true));

        let err = get_status_data(&registry).unwrap_err();
        assert_eq!(err.kind(), "CompositionError");
    }

    #[test]
    fn test_item_failure_propagates_with_name() {
        let mut registry = StatusRegistry::new();
        registry.register(StatusDataItem::new(
            "sensor",
            Box::new(|| Err(FieldLogError::Acquisition("offline".to_string()))),
            false,
        ));

        let err = get_status_data(&registry).unwrap_err();
        assert_eq!(err.kind(), "AcquisitionError");
        assert!(err.to_string().contains("sensor"));
    }

    #[test]
    fn test_default_items_shape() {
        let registry = StatusRegistry::with_default_items();
        let record = get_status_data(&registry).unwrap();

        assert!(record.contains_key("time_utc"));
        assert!(record.contains_key("cycle"));
        // runtime unpacks into its member keys
        assert!(record.contains_key("uptime_s"));
        assert!(record.contains_key("pid"));
        assert!(!record.contains_key("runtime"));
    }

    #[test]
    fn test_default_cycle_counter_advances() {
        let registry = StatusRegistry::with_default_items();
        let first = get_status_data(&registry).unwrap();
        let second = get_status_data(&registry).unwrap();
        assert_eq!(first["cycle"], Value::UInt(0));
        assert_eq!(second["cycle"], Value::UInt(1));
    }

    proptest! {
        #[test]
        fn prop_one_key_per_distinct_item(
            names in prop::collection::hash_set("[a-z]{1,8}", 1..8)
        ) {
            let mut registry = StatusRegistry::new();
            for (i, name) in names.iter().enumerate() {
                let value = i as i64;
                registry.register(StatusDataItem::new(
                    name.clone(),
                    Box::new(move || Ok(Value::Int(value))),
                    false,
                ));
            }

            let record = get_status_data(&registry).unwrap();
            prop_assert_eq!(record.len(), names.len());
            for name in &names {
                prop_assert!(record.contains_key(name));
            }
        }
    }
}
