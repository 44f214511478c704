//! Structured message exchanged with the inspector daemon.
//!
//! # Format
//!
//! Every frame payload is a binary property list dictionary:
//!
//! ```text
//! {
//!   "__selector": "_rpc_forwardGetListing:",
//!   "__argument": {
//!     "WIRConnectionIdentifierKey": "8d3c…",
//!     "WIRApplicationIdentifierKey": "com.apple.mobilesafari"
//!   }
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use plist::{Dictionary, Value};

use crate::error::{Error, Result};

use super::selector::Selector;

// ============================================================================
// Constants
// ============================================================================

/// Top-level key holding the selector.
const SELECTOR_KEY: &str = "__selector";

/// Top-level key holding the argument dictionary.
const ARGUMENT_KEY: &str = "__argument";

// ============================================================================
// Message
// ============================================================================

/// A selector plus its argument dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// What the message is for.
    pub selector: Selector,

    /// Selector-specific fields.
    pub argument: Dictionary,
}

impl Message {
    /// Creates a message with an empty argument.
    #[inline]
    #[must_use]
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            argument: Dictionary::new(),
        }
    }

    /// Adds an argument field.
    #[inline]
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.argument.insert(key.to_string(), value.into());
        self
    }

    /// Adds a raw-bytes argument field.
    #[inline]
    #[must_use]
    pub fn with_data(mut self, key: &str, data: Vec<u8>) -> Self {
        self.argument.insert(key.to_string(), Value::Data(data));
        self
    }

    /// Converts into the wire dictionary.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut root = Dictionary::new();
        root.insert(
            SELECTOR_KEY.to_string(),
            Value::String(self.selector.wire_name()),
        );
        root.insert(ARGUMENT_KEY.to_string(), Value::Dictionary(self.argument));
        Value::Dictionary(root)
    }

    /// Interprets a decoded payload.
    ///
    /// A missing argument is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] when the payload is not a dictionary or
    /// carries no selector. An empty selector counts as none.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut root = value
            .into_dictionary()
            .ok_or_else(|| Error::protocol("payload is not a dictionary"))?;

        let selector = root
            .remove(SELECTOR_KEY)
            .and_then(Value::into_string)
            .filter(|selector| !selector.is_empty())
            .ok_or_else(|| Error::protocol("payload has no selector"))?;

        let argument = root
            .remove(ARGUMENT_KEY)
            .and_then(Value::into_dictionary)
            .unwrap_or_default();

        Ok(Self {
            selector: Selector::parse(&selector),
            argument,
        })
    }

    /// Returns an argument field.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.argument.get(key)
    }

    /// Returns an argument field as a string.
    #[inline]
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_string)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_value_shape() {
        let value = Message::new(Selector::ReportIdentifier)
            .with("WIRConnectionIdentifierKey", "abc")
            .into_value();

        let root = value.as_dictionary().expect("dictionary");
        assert_eq!(
            root.get("__selector").and_then(Value::as_string),
            Some("_rpc_reportIdentifier:")
        );
        let argument = root
            .get("__argument")
            .and_then(Value::as_dictionary)
            .expect("argument");
        assert_eq!(
            argument
                .get("WIRConnectionIdentifierKey")
                .and_then(Value::as_string),
            Some("abc")
        );
    }

    #[test]
    fn test_from_value_roundtrip() {
        let message = Message::new(Selector::ReportSetup)
            .with("WIRSimulatorNameKey", "iPhone 6")
            .with_data("WIRMessageDataKey", b"{}".to_vec());

        let parsed = Message::from_value(message.clone().into_value()).expect("message");
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_from_value_without_selector() {
        let mut root = Dictionary::new();
        root.insert("__argument".into(), Value::Dictionary(Dictionary::new()));
        let err = Message::from_value(Value::Dictionary(root)).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_from_value_empty_selector() {
        let mut root = Dictionary::new();
        root.insert("__selector".into(), Value::String(String::new()));

        let err = Message::from_value(Value::Dictionary(root)).unwrap_err();
        assert!(err.to_string().contains("no selector"));
    }

    #[test]
    fn test_from_value_not_a_dictionary() {
        let err = Message::from_value(Value::String("nope".into())).unwrap_err();
        assert!(err.to_string().contains("not a dictionary"));
    }

    #[test]
    fn test_from_value_missing_argument_is_empty() {
        let mut root = Dictionary::new();
        root.insert(
            "__selector".into(),
            Value::String("_rpc_applicationDisconnected:".into()),
        );

        let message = Message::from_value(Value::Dictionary(root)).expect("message");
        assert_eq!(message.selector, Selector::ApplicationDisconnected);
        assert!(message.argument.is_empty());
    }
}
