//! Dispatch Adapter (script calls native)
//!
//! A dispatch adapter reads the parameter slots of a populated
//! `FunctionContext`, calls the underlying native function or method, and
//! boxes the result into slot 0.
//!
//! Native signatures of any arity up to twelve are handled through one
//! calling convention: `NativeFunction<Args>` and `NativeMethod<C, Args>`
//! are implemented for every `Fn` of matching shape, with `Args` the tuple
//! of parameter types. The adapter types are generic over that tuple, so
//! there is one adapter type per signature, produced by the compiler.
//!
//! Methods taking `&self` and `&mut self` are told apart by the `Shared` and
//! `Exclusive` markers at the head of the argument tuple.

use std::any::Any;
use std::marker::PhantomData;

use hostbind_sdk::{BindError, BindResult, FromSlot, IntoSlot, Kind, NativeType};

use crate::slots::FunctionContext;

/// Script-visible class of a host type
pub trait ScriptClass: Any + Send {
    /// Class name; methods of the class are registered in the namespace of its hash
    const CLASS_NAME: &'static str;
}

/// Invokes one native callable against a populated function context
pub trait DispatchAdapter: Send + Sync {
    /// Read slots 1..=N, call the native code, write slot 0.
    ///
    /// `receiver` is the object a method is called on; free functions ignore it.
    fn dispatch(&self, receiver: Option<&mut dyn Any>, ctx: &mut FunctionContext)
        -> BindResult<()>;
}

/// Marker for methods taking `&self`
pub struct Shared;

/// Marker for methods taking `&mut self`
pub struct Exclusive;

/// A free native function with argument tuple `Args`
pub trait NativeFunction<Args>: Send + Sync + 'static {
    /// Return type
    type Output: IntoSlot + 'static;

    /// Native parameter types, in order
    fn param_types() -> Vec<NativeType>;

    /// Call with arguments read from the context's parameter slots
    fn call_with(&self, ctx: &FunctionContext) -> BindResult<Self::Output>;
}

/// A native method of `C` with argument tuple `Args` (receiver marker first)
pub trait NativeMethod<C, Args>: Send + Sync + 'static {
    /// Return type
    type Output: IntoSlot + 'static;

    /// Native parameter types, in order, excluding the receiver
    fn param_types() -> Vec<NativeType>;

    /// Call on `receiver` with arguments read from the context's parameter slots
    fn call_on(&self, receiver: &mut C, ctx: &FunctionContext) -> BindResult<Self::Output>;
}

/// Read parameter slot `index` as `T`
fn read_arg<T: FromSlot>(ctx: &FunctionContext, index: usize) -> BindResult<T> {
    let value = ctx.value(index).ok_or(BindError::SlotKindMismatch {
        slot: index,
        expected: Kind::Unregistered,
        found: Kind::Void,
    })?;
    T::from_slot(value).map_err(|e| match e {
        BindError::TypeMismatch { expected, found } => BindError::SlotKindMismatch {
            slot: index,
            expected,
            found,
        },
        other => other,
    })
}

macro_rules! impl_native_callables {
    ($($arg:ident => $idx:tt),*) => {
        impl<Func, Ret, $($arg,)*> NativeFunction<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret + Send + Sync + 'static,
            Ret: IntoSlot + 'static,
            $($arg: FromSlot + 'static,)*
        {
            type Output = Ret;

            fn param_types() -> Vec<NativeType> {
                vec![$(NativeType::of::<$arg>()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn call_with(&self, ctx: &FunctionContext) -> BindResult<Ret> {
                $(let $arg = read_arg::<$arg>(ctx, $idx)?;)*
                Ok((self)($($arg),*))
            }
        }

        impl<Func, Class, Ret, $($arg,)*> NativeMethod<Class, (Shared, $($arg,)*)> for Func
        where
            Func: Fn(&Class, $($arg),*) -> Ret + Send + Sync + 'static,
            Class: 'static,
            Ret: IntoSlot + 'static,
            $($arg: FromSlot + 'static,)*
        {
            type Output = Ret;

            fn param_types() -> Vec<NativeType> {
                vec![$(NativeType::of::<$arg>()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn call_on(&self, receiver: &mut Class, ctx: &FunctionContext) -> BindResult<Ret> {
                $(let $arg = read_arg::<$arg>(ctx, $idx)?;)*
                Ok((self)(&*receiver, $($arg),*))
            }
        }

        impl<Func, Class, Ret, $($arg,)*> NativeMethod<Class, (Exclusive, $($arg,)*)> for Func
        where
            Func: Fn(&mut Class, $($arg),*) -> Ret + Send + Sync + 'static,
            Class: 'static,
            Ret: IntoSlot + 'static,
            $($arg: FromSlot + 'static,)*
        {
            type Output = Ret;

            fn param_types() -> Vec<NativeType> {
                vec![$(NativeType::of::<$arg>()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn call_on(&self, receiver: &mut Class, ctx: &FunctionContext) -> BindResult<Ret> {
                $(let $arg = read_arg::<$arg>(ctx, $idx)?;)*
                Ok((self)(receiver, $($arg),*))
            }
        }
    };
}

impl_native_callables!();
impl_native_callables!(A1 => 1);
impl_native_callables!(A1 => 1, A2 => 2);
impl_native_callables!(A1 => 1, A2 => 2, A3 => 3);
impl_native_callables!(A1 => 1, A2 => 2, A3 => 3, A4 => 4);
impl_native_callables!(A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5);
impl_native_callables!(A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6);
impl_native_callables!(A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6, A7 => 7);
impl_native_callables!(A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6, A7 => 7, A8 => 8);
impl_native_callables!(
    A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6, A7 => 7, A8 => 8, A9 => 9
);
impl_native_callables!(
    A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6, A7 => 7, A8 => 8, A9 => 9, A10 => 10
);
impl_native_callables!(
    A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6, A7 => 7, A8 => 8, A9 => 9, A10 => 10,
    A11 => 11
);
impl_native_callables!(
    A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6, A7 => 7, A8 => 8, A9 => 9, A10 => 10,
    A11 => 11, A12 => 12
);

// ============================================================================
// Adapters
// ============================================================================

/// Adapter of a free function
pub struct FunctionAdapter<F, Args> {
    func: F,
    _args: PhantomData<fn(Args)>,
}

impl<F, Args> FunctionAdapter<F, Args>
where
    F: NativeFunction<Args>,
{
    /// Wrap `func`
    pub fn new(func: F) -> Self {
        Self {
            func,
            _args: PhantomData,
        }
    }
}

impl<F, Args> DispatchAdapter for FunctionAdapter<F, Args>
where
    F: NativeFunction<Args>,
    Args: 'static,
{
    fn dispatch(
        &self,
        _receiver: Option<&mut dyn Any>,
        ctx: &mut FunctionContext,
    ) -> BindResult<()> {
        let result = self.func.call_with(ctx)?;
        ctx.set_return_value(result.into_slot())
    }
}

/// Adapter of a method on `C`
pub struct MethodAdapter<C, F, Args> {
    name: String,
    class_name: &'static str,
    func: F,
    _sig: PhantomData<fn(&C, Args)>,
}

impl<C, F, Args> MethodAdapter<C, F, Args>
where
    C: 'static,
    F: NativeMethod<C, Args>,
{
    /// Wrap `func`; `name` and `class_name` only appear in errors
    pub fn new(name: impl Into<String>, class_name: &'static str, func: F) -> Self {
        Self {
            name: name.into(),
            class_name,
            func,
            _sig: PhantomData,
        }
    }
}

impl<C, F, Args> DispatchAdapter for MethodAdapter<C, F, Args>
where
    C: 'static,
    F: NativeMethod<C, Args>,
    Args: 'static,
{
    fn dispatch(
        &self,
        receiver: Option<&mut dyn Any>,
        ctx: &mut FunctionContext,
    ) -> BindResult<()> {
        let receiver = receiver.ok_or_else(|| BindError::MissingReceiver(self.name.clone()))?;
        let object = receiver
            .downcast_mut::<C>()
            .ok_or_else(|| BindError::ReceiverMismatch {
                function: self.name.clone(),
                expected: self.class_name.to_string(),
            })?;
        let result = self.func.call_on(object, ctx)?;
        ctx.set_return_value(result.into_slot())
    }
}
