use crate::context::{Context, Boxed, into_box};
pub use serde_json::Value as JsonValue;


impl Context for JsonValue {
    fn is_falsy(&self) -> bool {
        match self {
            JsonValue::Null => true,
            JsonValue::Bool(b) => !b,
            JsonValue::Array(seq) => seq.is_empty(),
            _ => false
        }
    }

    fn children(&self) -> Option<Vec<Boxed<'_>>> {
        match self {
            JsonValue::Array(seq) =>
                Some(
                    seq.iter()
                        .map(into_box)
                        .collect::<_>()
                ),
            _ => None
        }
    }

    fn child(&self, name: &str, _body: Option<&str>) -> Option<Boxed<'_>> {
        self.as_object()?
            .get(name)
            .map(into_box)
    }

    fn value(&self) -> String {
        match self {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => String::new(),
            other => other.to_string()
        }
    }
}
