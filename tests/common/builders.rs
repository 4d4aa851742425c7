//! Test data builders for creating test objects

use fieldlog_rs::{
    Conversion, StatusDataItem, StatusFn, StatusRegistry, Value, VariableDef,
};

/// Builder for creating test VariableDefs
pub struct VariableDefBuilder {
    name: String,
    type_name: String,
    conversion: Option<Conversion>,
}

impl VariableDefBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: "u16".to_string(),
            conversion: None,
        }
    }

    pub fn type_name(mut self, type_name: &str) -> Self {
        self.type_name = type_name.to_string();
        self
    }

    pub fn conversion(mut self, conversion: Conversion) -> Self {
        self.conversion = Some(conversion);
        self
    }

    pub fn build(self) -> VariableDef {
        let def = VariableDef::new(self.name, self.type_name);
        match self.conversion {
            Some(conversion) => def.with_conversion(conversion),
            None => def,
        }
    }
}

/// Registry with simple constant-valued items
pub fn constant_registry(entries: &[(&str, i64)]) -> StatusRegistry {
    let mut registry = StatusRegistry::new();
    for (name, value) in entries {
        let value = *value;
        let function: StatusFn = Box::new(move || Ok(Value::Int(value)));
        registry.register(StatusDataItem::new(*name, function, false));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_def_builder() {
        let def = VariableDefBuilder::new("v_bat").type_name("f32").build();
        assert_eq!(def.name, "v_bat");
        assert_eq!(def.type_name, "f32");
    }
}
