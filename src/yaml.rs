use crate::context::{Context, Boxed, into_box};
pub use serde_yaml::Value as YamlValue;


// tags carry no meaning for rendering, tagged values behave as their content
impl Context for YamlValue {
    fn is_falsy(&self) -> bool {
        match self {
            YamlValue::Null => true,
            YamlValue::Bool(b) => !b,
            YamlValue::Sequence(seq) => seq.is_empty(),
            YamlValue::Tagged(tagged) => tagged.value.is_falsy(),
            _ => false
        }
    }

    fn children(&self) -> Option<Vec<Boxed<'_>>> {
        match self {
            YamlValue::Sequence(seq) =>
                Some(
                    seq.iter()
                        .map(into_box)
                        .collect::<_>()
                ),
            YamlValue::Tagged(tagged) => tagged.value.children(),
            _ => None
        }
    }

    fn child(&self, name: &str, body: Option<&str>) -> Option<Boxed<'_>> {
        match self {
            YamlValue::Mapping(mapping) => mapping.get(name).map(into_box),
            YamlValue::Tagged(tagged) => tagged.value.child(name, body),
            _ => None
        }
    }

    fn value(&self) -> String {
        match self {
            YamlValue::String(s) => s.clone(),
            YamlValue::Number(n) => n.to_string(),
            YamlValue::Bool(b) => b.to_string(),
            YamlValue::Tagged(tagged) => tagged.value.value(),
            _ => "".to_owned()
        }
    }
}
