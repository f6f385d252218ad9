//! Parameter Slot Model
//!
//! A `FunctionContext` is the ordered slot table of one function: slot 0
//! receives the return value, slots 1..=N hold the parameters. The table is
//! built once when the function is registered and its shape never changes
//! afterward; only slot values are rewritten, call after call.
//!
//! ```text
//! [0] __return : int
//! [1] _p1      : int
//! [2] _p2      : string
//! ```

use hostbind_sdk::{hash, BindError, BindResult, Kind, NativeType, SlotValue};

use crate::defaults::{PARAM_SLOT_PREFIX, RETURN_SLOT_NAME};
use crate::kinds::KindRegistry;

// ============================================================================
// ParameterSlot
// ============================================================================

/// One named, typed storage cell of a function context
#[derive(Debug, Clone)]
pub struct ParameterSlot {
    name: String,
    key: u32,
    kind: Kind,
    native_type: Option<NativeType>,
    value: SlotValue,
}

impl ParameterSlot {
    fn new(name: String, kind: Kind, native_type: Option<NativeType>) -> Self {
        let key = hash(&name);
        Self {
            name,
            key,
            kind,
            native_type,
            value: SlotValue::Void,
        }
    }

    /// Slot name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hash of the slot name
    pub fn key(&self) -> u32 {
        self.key
    }

    /// Declared kind
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Native type the slot was declared from (none for script-defined functions)
    pub fn native_type(&self) -> Option<&NativeType> {
        self.native_type.as_ref()
    }

    /// Current value
    pub fn value(&self) -> &SlotValue {
        &self.value
    }
}

// ============================================================================
// FunctionContext
// ============================================================================

/// Ordered slot table of one registered function
#[derive(Debug, Clone)]
pub struct FunctionContext {
    slots: Vec<ParameterSlot>,
}

/// Name of parameter slot `index` (1-based)
pub fn param_slot_name(index: usize) -> String {
    format!("{}{}", PARAM_SLOT_PREFIX, index)
}

impl FunctionContext {
    /// Context with only the return slot
    fn with_return(kind: Kind, native_type: Option<NativeType>) -> Self {
        Self {
            slots: vec![ParameterSlot::new(
                RETURN_SLOT_NAME.to_string(),
                kind,
                native_type,
            )],
        }
    }

    /// Build the context of a native signature.
    ///
    /// Every type must map to a registered kind; the first one that does not
    /// fails the whole construction.
    pub fn for_signature(
        kinds: &KindRegistry,
        return_type: NativeType,
        params: &[NativeType],
    ) -> BindResult<Self> {
        let return_kind = kinds.kind_of(&return_type);
        if !return_kind.is_registered() {
            return Err(BindError::UnrecognizedType {
                type_name: return_type.name().to_string(),
                position: 0,
            });
        }

        let mut context = Self::with_return(return_kind, Some(return_type));
        for (i, ty) in params.iter().enumerate() {
            let index = i + 1;
            let kind = kinds.kind_of(ty);
            context.add_parameter(param_slot_name(index), kind, Some(*ty), index)?;
        }
        Ok(context)
    }

    /// Build the context of a script-defined function from named, typed parameters
    pub fn for_script(return_kind: Kind, params: &[(&str, Kind)]) -> BindResult<Self> {
        if !return_kind.is_registered() {
            return Err(BindError::UnrecognizedType {
                type_name: return_kind.name().to_string(),
                position: 0,
            });
        }

        let mut context = Self::with_return(return_kind, None);
        for (i, (name, kind)) in params.iter().enumerate() {
            context.add_parameter((*name).to_string(), *kind, None, i + 1)?;
        }
        Ok(context)
    }

    fn add_parameter(
        &mut self,
        name: String,
        kind: Kind,
        native_type: Option<NativeType>,
        position: usize,
    ) -> BindResult<()> {
        // Void is only meaningful for the return slot
        if !kind.is_registered() || kind == Kind::Void {
            let type_name = match native_type {
                Some(ty) => ty.name().to_string(),
                None => kind.name().to_string(),
            };
            return Err(BindError::UnrecognizedType {
                type_name,
                position,
            });
        }
        self.slots.push(ParameterSlot::new(name, kind, native_type));
        Ok(())
    }

    /// Number of parameters, excluding the return slot
    pub fn parameter_count(&self) -> usize {
        self.slots.len() - 1
    }

    /// Every slot, return slot first
    pub fn slots(&self) -> &[ParameterSlot] {
        &self.slots
    }

    /// Slot at `index`
    pub fn slot(&self, index: usize) -> Option<&ParameterSlot> {
        self.slots.get(index)
    }

    /// Index of the slot whose name hashes to `key`
    pub fn find_slot(&self, key: u32) -> Option<usize> {
        self.slots.iter().position(|s| s.key == key)
    }

    /// Declared kind of slot `index`
    pub fn get_type(&self, index: usize) -> Option<Kind> {
        self.slots.get(index).map(|s| s.kind)
    }

    /// Declared kind of the return slot
    pub fn return_kind(&self) -> Kind {
        self.slots[0].kind
    }

    /// Declared parameter kinds, in order
    pub fn parameter_kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.slots[1..].iter().map(|s| s.kind)
    }

    /// Current value of slot `index`
    pub fn value(&self, index: usize) -> Option<&SlotValue> {
        self.slots.get(index).map(|s| &s.value)
    }

    /// Current value of the return slot
    pub fn return_value(&self) -> &SlotValue {
        &self.slots[0].value
    }

    /// Write a value into slot `index`. The value must match the declared kind.
    pub fn set_value(&mut self, index: usize, value: SlotValue) -> BindResult<()> {
        let slot = self.slots.get_mut(index).ok_or(BindError::SlotKindMismatch {
            slot: index,
            expected: Kind::Unregistered,
            found: value.kind(),
        })?;
        if value.kind() != slot.kind {
            return Err(BindError::SlotKindMismatch {
                slot: index,
                expected: slot.kind,
                found: value.kind(),
            });
        }
        tracing::trace!(slot = index, name = %slot.name, value = %value, "slot write");
        slot.value = value;
        Ok(())
    }

    /// Write the return slot
    pub fn set_return_value(&mut self, value: SlotValue) -> BindResult<()> {
        self.set_value(0, value)
    }

    /// Reset every slot to `Void`
    pub fn clear_values(&mut self) {
        for slot in &mut self.slots {
            slot.value = SlotValue::Void;
        }
    }
}
