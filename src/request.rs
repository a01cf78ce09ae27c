//! Call requests and argument normalization.

use serde::Serialize;
use serde_json::{Number, Value};

/// Primary argument of a remote call.
///
/// Remote methods take text. Structured values are sent as their compact
/// JSON encoding, a missing or `null` argument is sent as the empty string,
/// and other scalars are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Argument(Option<Value>);

impl Argument {
    /// No argument.
    pub fn none() -> Self {
        Self(None)
    }

    /// Serialize any value into an argument.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(|v| Self(Some(v)))
    }

    pub fn is_none(&self) -> bool {
        matches!(self.0, None | Some(Value::Null))
    }

    pub fn value(&self) -> Option<&Value> {
        self.0.as_ref()
    }

    /// The value as it goes on the wire.
    pub fn to_wire(&self) -> Value {
        match &self.0 {
            None | Some(Value::Null) => Value::String(String::new()),
            Some(v @ (Value::Object(_) | Value::Array(_))) => Value::String(v.to_string()),
            Some(scalar) => scalar.clone(),
        }
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Self(Some(value))
    }
}

impl From<Option<Value>> for Argument {
    fn from(value: Option<Value>) -> Self {
        Self(value)
    }
}

impl From<()> for Argument {
    fn from(_: ()) -> Self {
        Self(None)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self(Some(Value::String(value.to_string())))
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self(Some(Value::String(value)))
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Self(Some(Value::Bool(value)))
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Self(Some(Value::Number(value.into())))
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Self(Some(Value::Number(value.into())))
    }
}

impl From<u64> for Argument {
    fn from(value: u64) -> Self {
        Self(Some(Value::Number(value.into())))
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        // Non-finite floats have no JSON form.
        Self(Number::from_f64(value).map(Value::Number))
    }
}

/// A single remote call: method name, primary argument and an optional
/// secondary number.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    method: String,
    argument: Argument,
    secondary: Option<Number>,
}

impl CallRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            argument: Argument::none(),
            secondary: None,
        }
    }

    /// Set the primary argument
    pub fn argument(mut self, argument: impl Into<Argument>) -> Self {
        self.argument = argument.into();
        self
    }

    /// Set the secondary argument. Zero counts as present.
    pub fn secondary(mut self, secondary: impl Into<Number>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn primary(&self) -> &Argument {
        &self.argument
    }

    pub fn secondary_value(&self) -> Option<&Number> {
        self.secondary.as_ref()
    }

    /// Arguments in the order the remote method receives them.
    pub fn wire_args(&self) -> Vec<Value> {
        let mut args = vec![self.argument.to_wire()];
        if let Some(secondary) = &self.secondary {
            args.push(Value::Number(secondary.clone()));
        }
        args
    }
}
