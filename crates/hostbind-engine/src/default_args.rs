//! Default-Argument Record
//!
//! Optional per-function record of parameter names, default values and
//! help text. It documents a registration entry and is read by help and
//! introspection tooling; it never affects dispatch. Position 0 names the
//! return value and carries no default.

use hostbind_sdk::{BindError, BindResult, IntoSlot, Kind, SlotValue};

use crate::slots::FunctionContext;

/// One documented position of a default-argument record
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue {
    name: String,
    value: SlotValue,
}

impl DefaultValue {
    /// Parameter name (return name at position 0)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default value (`Void` at position 0)
    pub fn value(&self) -> &SlotValue {
        &self.value
    }
}

/// Default values and help text for one registered function
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultArgs {
    values: Vec<DefaultValue>,
    help: String,
}

impl DefaultArgs {
    /// Start a record; `return_name` documents the return value
    pub fn new(return_name: impl Into<String>) -> Self {
        Self {
            values: vec![DefaultValue {
                name: return_name.into(),
                value: SlotValue::Void,
            }],
            help: String::new(),
        }
    }

    /// Append the next parameter's name and default
    pub fn param(mut self, name: impl Into<String>, value: impl IntoSlot) -> Self {
        self.values.push(DefaultValue {
            name: name.into(),
            value: value.into_slot(),
        });
        self
    }

    /// Set the help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Number of positions, including the return position
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Raw storage: `(count, values)`, return position first
    pub fn storage(&self) -> (usize, &[DefaultValue]) {
        (self.values.len(), &self.values)
    }

    /// Default of parameter `index` (1-based)
    pub fn default_value(&self, index: usize) -> Option<&DefaultValue> {
        if index == 0 {
            return None;
        }
        self.values.get(index)
    }

    /// Default of parameter `index` rendered as text
    pub fn value_as_string(&self, index: usize) -> Option<String> {
        self.default_value(index).map(|d| d.value.to_string())
    }

    /// Help text
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Name documented for the return value
    pub fn return_name(&self) -> &str {
        &self.values[0].name
    }

    /// Check the record against a function's slot table.
    ///
    /// The position count must equal arity + 1. With `check_kinds`, every
    /// default must also match its slot kind; object parameters accept any
    /// default since ids are only meaningful at call time.
    pub fn validate(
        &self,
        function: &str,
        ctx: &FunctionContext,
        check_kinds: bool,
    ) -> BindResult<()> {
        let expected = ctx.parameter_count() + 1;
        if self.values.len() != expected {
            return Err(BindError::DefaultArgsMismatch {
                function: function.to_string(),
                reason: format!(
                    "expected {} positions (including return), got {}",
                    expected,
                    self.values.len()
                ),
            });
        }

        if !check_kinds {
            return Ok(());
        }

        for (index, slot) in ctx.slots().iter().enumerate().skip(1) {
            let kind = slot.kind();
            if kind == Kind::Object {
                continue;
            }
            let found = self.values[index].value.kind();
            if found != kind {
                return Err(BindError::DefaultArgsMismatch {
                    function: function.to_string(),
                    reason: format!(
                        "default for '{}' is {}, parameter {} is {}",
                        self.values[index].name, found, index, kind
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::KindRegistry;
    use hostbind_sdk::{NativeType, ObjectId};

    fn ctx(params: &[NativeType]) -> FunctionContext {
        FunctionContext::for_signature(&KindRegistry::new(), NativeType::of::<i32>(), params)
            .unwrap()
    }

    fn add_defaults() -> DefaultArgs {
        DefaultArgs::new("sum")
            .param("a", 1)
            .param("b", 2)
            .with_help("Adds two numbers")
    }

    #[test]
    fn test_storage_and_accessors() {
        let defaults = add_defaults();
        let (count, values) = defaults.storage();
        assert_eq!(count, 3);
        assert_eq!(values[0].name(), "sum");
        assert!(values[0].value().is_void());
        assert_eq!(values[2].value(), &SlotValue::Int(2));

        assert!(defaults.default_value(0).is_none());
        assert_eq!(defaults.default_value(1).unwrap().name(), "a");
        assert!(defaults.default_value(3).is_none());
        assert_eq!(defaults.value_as_string(2), Some("2".to_string()));
        assert_eq!(defaults.help(), "Adds two numbers");
        assert_eq!(defaults.return_name(), "sum");
    }

    #[test]
    fn test_validate_ok() {
        let ctx = ctx(&[NativeType::of::<i32>(), NativeType::of::<i32>()]);
        add_defaults().validate("Add", &ctx, true).unwrap();
    }

    #[test]
    fn test_validate_count() {
        let ctx = ctx(&[NativeType::of::<i32>()]);
        let err = add_defaults().validate("Add", &ctx, false).unwrap_err();
        assert!(matches!(err, BindError::DefaultArgsMismatch { .. }));
    }

    #[test]
    fn test_validate_kinds() {
        let ctx = ctx(&[NativeType::of::<i32>(), NativeType::of::<String>()]);
        let err = add_defaults().validate("Add", &ctx, true).unwrap_err();
        assert!(matches!(err, BindError::DefaultArgsMismatch { .. }));

        // kind checking switched off
        add_defaults().validate("Add", &ctx, false).unwrap();
    }

    #[test]
    fn test_object_parameters_skip_kind_check() {
        let ctx = ctx(&[NativeType::of::<ObjectId>()]);
        DefaultArgs::new("r")
            .param("target", 0)
            .validate("Find", &ctx, true)
            .unwrap();
    }
}
