//! Named, typed values shared between the caller and band callbacks.

use std::any::{self, Any};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::ReportError;

/// Store mapping variable names to values of any type.
///
/// Master data bands read their datasets from here as `Vec<T>`.  Values are
/// reference counted so callbacks can iterate a dataset while drawing.
#[derive(Clone, Default)]
pub struct Variables {
    values: HashMap<String, Rc<dyn Any>>,
}

impl Variables {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `name`, replacing any previous value.
    pub fn set<T: 'static>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), Rc::new(value));
    }

    /// Returns the value stored under `name`.
    pub fn get<T: 'static>(&self, name: &str) -> Result<Rc<T>, ReportError> {
        let value = self
            .values
            .get(name)
            .cloned()
            .ok_or_else(|| ReportError::MissingVariable(name.to_string()))?;
        value.downcast::<T>().map_err(|_| ReportError::VariableType {
            name: name.to_string(),
            expected: any::type_name::<T>(),
        })
    }

    /// Returns whether a value is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates over the stored names in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl fmt::Debug for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Variables").field("names", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookup_returns_stored_value() {
        let mut variables = Variables::new();
        variables.set("rows", vec![1u32, 2, 3]);
        let rows = variables.get::<Vec<u32>>("rows").unwrap();
        assert_eq!(rows.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn missing_variable_is_reported() {
        let variables = Variables::new();
        assert!(matches!(
            variables.get::<String>("title"),
            Err(ReportError::MissingVariable(name)) if name == "title"
        ));
    }

    #[test]
    fn wrong_type_is_reported() {
        let mut variables = Variables::new();
        variables.set("title", "Quarterly".to_string());
        assert!(matches!(
            variables.get::<Vec<u32>>("title"),
            Err(ReportError::VariableType { .. })
        ));
    }

    #[test]
    fn setting_again_replaces_value() {
        let mut variables = Variables::new();
        variables.set("count", 1u8);
        variables.set("count", 2u8);
        assert_eq!(*variables.get::<u8>("count").unwrap(), 2);
    }
}
