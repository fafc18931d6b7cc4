//! Calculated field transform.

use crate::core::{Row, Value};
use crate::plugin::{Plugin, PluginDescriptor, PluginResult, TransformPlugin};

/// Adds `output = quantity * unit_price` to every row.
///
/// Missing inputs count as zero and booleans as one or zero. A null or
/// other non-numeric input makes the output `Int(0)`.
pub struct CalculatedFieldTransform {
    descriptor: PluginDescriptor,
    quantity_field: String,
    price_field: String,
    output_field: String,
    input_fields: Vec<String>,
    output_fields: Vec<String>,
}

impl CalculatedFieldTransform {
    /// Plugin identifier.
    pub const ID: &'static str = "rhop.transform.calculated_field";

    /// Create with a custom name and description.
    pub fn new(name: &str, description: &str) -> Self {
        let description = if description.is_empty() {
            "Adds a calculated field to each row"
        } else {
            description
        };
        let mut plugin = Self {
            descriptor: PluginDescriptor::new(name, description),
            quantity_field: String::new(),
            price_field: String::new(),
            output_field: String::new(),
            input_fields: Vec::new(),
            output_fields: Vec::new(),
        };
        plugin.configure("quantity", "unit_price", "total_price");
        plugin
    }

    /// Set the field names used by the calculation.
    pub fn configure(&mut self, quantity_field: &str, price_field: &str, output_field: &str) {
        self.quantity_field = quantity_field.to_string();
        self.price_field = price_field.to_string();
        self.output_field = output_field.to_string();
        self.input_fields = vec![self.quantity_field.clone(), self.price_field.clone()];
    }

    /// Field receiving the result.
    pub fn output_field(&self) -> &str {
        &self.output_field
    }

    /// A missing field counts as zero; a present null is not numeric.
    fn operand(row: &Row, field: &str) -> Option<f64> {
        match row.get(field) {
            None => Some(0.0),
            Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
            Some(value) => value.to_number(),
        }
    }
}

impl Default for CalculatedFieldTransform {
    fn default() -> Self {
        Self::new("CalculatedField", "")
    }
}

impl Plugin for CalculatedFieldTransform {
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

impl TransformPlugin for CalculatedFieldTransform {
    fn init(&mut self) -> PluginResult<()> {
        if !self.output_fields.contains(&self.output_field) {
            self.output_fields.push(self.output_field.clone());
        }
        tracing::debug!(
            quantity = %self.quantity_field,
            price = %self.price_field,
            output = %self.output_field,
            "initialized calculated field"
        );
        Ok(())
    }

    fn process_row(&mut self, mut row: Row) -> PluginResult<Option<Row>> {
        let quantity = Self::operand(&row, &self.quantity_field);
        let price = Self::operand(&row, &self.price_field);

        let total = match (quantity, price) {
            (Some(q), Some(p)) => Value::Float(q * p),
            _ => Value::Int(0),
        };
        row.insert(self.output_field.clone(), total);
        Ok(Some(row))
    }

    fn input_fields(&self) -> &[String] {
        &self.input_fields
    }

    fn output_fields(&self) -> &[String] {
        &self.output_fields
    }
}
