//! Field contracts and input validation (§4.4 "Contract validation", §2
//! "Field contract").

use std::collections::HashMap;

use nebula_error::SandboxError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The declared shape of one field (§2 "Field contract").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    Map,
    Slice,
    Any,
}

impl FieldType {
    /// Whether `value`'s runtime shape satisfies this type. Any
    /// JSON-numeric value satisfies both `Int` and `Float` (§4.4).
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::Any => true,
            FieldType::String => value.is_string(),
            FieldType::Int | FieldType::Float => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Map => value.is_object(),
            FieldType::Slice => value.is_array(),
        }
    }
}

/// One field's declared shape, description, and optional default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub type_: FieldType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: Option<Value>,
}

/// `{requiredInputs, optionalInputs, outputs}` (§2 "Field contract").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldContract {
    #[serde(default, rename = "requiredInputs")]
    pub required_inputs: HashMap<String, FieldSpec>,
    #[serde(default, rename = "optionalInputs")]
    pub optional_inputs: HashMap<String, FieldSpec>,
    #[serde(default)]
    pub outputs: HashMap<String, FieldSpec>,
}

impl FieldContract {
    /// Validate `params` against this contract and return a copy with
    /// optional-field defaults applied. The caller's map is never mutated
    /// (§4.4). On failure, lists every missing or mistyped field at once.
    pub fn validate(&self, params: &Value) -> Result<Value, SandboxError> {
        let empty = serde_json::Map::new();
        let object = params.as_object().unwrap_or(&empty);
        let mut violations = Vec::new();

        for (name, spec) in &self.required_inputs {
            match object.get(name) {
                None | Some(Value::Null) => violations.push(name.clone()),
                Some(value) if !spec.type_.accepts(value) => violations.push(name.clone()),
                Some(_) => {}
            }
        }
        for (name, spec) in &self.optional_inputs {
            if let Some(value) = object.get(name) {
                if !matches!(value, Value::Null) && !spec.type_.accepts(value) {
                    violations.push(name.clone());
                }
            }
        }

        if !violations.is_empty() {
            violations.sort();
            return Err(SandboxError::ContractViolation { fields: violations });
        }

        let mut result = object.clone();
        for (name, spec) in &self.optional_inputs {
            if !result.contains_key(name) {
                if let Some(default) = &spec.default {
                    result.insert(name.clone(), default.clone());
                }
            }
        }
        Ok(Value::Object(result))
    }
}
