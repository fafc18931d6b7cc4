//! Uppercase text fields.

use crate::core::{Row, Value};
use crate::plugin::{Plugin, PluginDescriptor, PluginResult, TransformPlugin};

/// Converts text fields to uppercase.
///
/// With no configured fields every text value in the row is converted;
/// otherwise only the named fields are. Non-text values pass through.
pub struct UpperCaseTransform {
    descriptor: PluginDescriptor,
    fields_to_convert: Vec<String>,
}

impl UpperCaseTransform {
    /// Plugin identifier.
    pub const ID: &'static str = "rhop.transform.uppercase";

    /// Create with a custom name and description.
    pub fn new(name: &str, description: &str) -> Self {
        let description = if description.is_empty() {
            "Converts text fields to uppercase"
        } else {
            description
        };
        Self {
            descriptor: PluginDescriptor::new(name, description),
            fields_to_convert: Vec::new(),
        }
    }

    /// Restrict conversion to `fields`. An empty list converts every text
    /// field.
    pub fn set_fields_to_convert<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields_to_convert = fields.into_iter().map(Into::into).collect();
    }

    fn upper(value: &mut Value) {
        if let Value::Text(s) = value {
            *s = s.to_uppercase();
        }
    }
}

impl Default for UpperCaseTransform {
    fn default() -> Self {
        Self::new("UpperCase", "")
    }
}

impl Plugin for UpperCaseTransform {
    fn identifier(&self) -> &str {
        Self::ID
    }

    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut PluginDescriptor {
        &mut self.descriptor
    }
}

impl TransformPlugin for UpperCaseTransform {
    fn process_row(&mut self, mut row: Row) -> PluginResult<Option<Row>> {
        if self.fields_to_convert.is_empty() {
            row.values_mut().for_each(Self::upper);
        } else {
            for field in &self.fields_to_convert {
                if let Some(value) = row.get_mut(field) {
                    Self::upper(value);
                }
            }
        }
        Ok(Some(row))
    }

    fn input_fields(&self) -> &[String] {
        &self.fields_to_convert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Row {
        let mut row = Row::new();
        row.insert("name".to_string(), Value::from("john doe"));
        row.insert("city".to_string(), Value::from("boston"));
        row.insert("age".to_string(), Value::Int(30));
        row
    }

    #[test]
    fn test_uppercase_all_text_fields() {
        let mut plugin = UpperCaseTransform::default();
        let out = plugin.process_row(person()).unwrap().unwrap();

        assert_eq!(out["name"], Value::from("JOHN DOE"));
        assert_eq!(out["city"], Value::from("BOSTON"));
        assert_eq!(out["age"], Value::Int(30));
    }

    #[test]
    fn test_uppercase_selected_fields() {
        let mut plugin = UpperCaseTransform::default();
        plugin.set_fields_to_convert(["city", "missing"]);

        let out = plugin.process_row(person()).unwrap().unwrap();
        assert_eq!(out["name"], Value::from("john doe"));
        assert_eq!(out["city"], Value::from("BOSTON"));
        assert_eq!(plugin.input_fields(), ["city".to_string(), "missing".to_string()]);
    }

    #[test]
    fn test_default_description() {
        let plugin = UpperCaseTransform::default();
        assert_eq!(plugin.name(), "UpperCase");
        assert_eq!(plugin.description(), "Converts text fields to uppercase");

        let custom = UpperCaseTransform::new("Shout", "Loud");
        assert_eq!(custom.description(), "Loud");
    }
}
