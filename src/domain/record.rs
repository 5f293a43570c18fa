use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// A fully-populated record produced by the data factory.
///
/// Keys follow the schema's declared field order. There is no mutable access;
/// a test that needs different values builds a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedRecord {
    schema: String,
    values: Vec<(String, Value)>,
}

impl GeneratedRecord {
    pub(crate) fn new(schema: impl Into<String>, values: Vec<(String, Value)>) -> Self {
        Self {
            schema: schema.into(),
            values,
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// String value of `field`, if present and a string
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self.values.iter().cloned().collect();
        Value::Object(map)
    }
}

impl Serialize for GeneratedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl std::ops::Index<&str> for GeneratedRecord {
    type Output = Value;

    /// Missing fields index to `null`, like `serde_json::Value`.
    fn index(&self, field: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.get(field).unwrap_or(&NULL)
    }
}
