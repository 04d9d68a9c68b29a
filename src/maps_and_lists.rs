use std::{collections::HashMap, fmt};
use crate::context::{Context, Boxed, LambdaText, into_box};


enum Value {
    Null,
    Bool(bool),
    Text(String),
    Mapping(HashMap<String, MapsAndLists>),
    Sequence(Vec<MapsAndLists>),
    Invocable0(Box<dyn Fn() -> MapsAndLists>),
    Invocable1(Box<dyn Fn(&str) -> MapsAndLists>),
}

/// Plain data built in code, with support for lambdas.
///
/// A lambda without argument produces a template rendered in place of the
/// tag. A lambda with one argument is called with the raw body of the
/// section it is used for, and produces a template rendered in place of
/// the section.
///
/// Lambdas built with [MapsAndLists::invocable0] and
/// [MapsAndLists::invocable1] may also produce data. A text result is
/// still a template, any other result is used as the member itself.
pub struct MapsAndLists(Value);

impl MapsAndLists {
    pub fn null() -> MapsAndLists {
        MapsAndLists(Value::Null)
    }

    pub fn bool(b: bool) -> MapsAndLists {
        MapsAndLists(Value::Bool(b))
    }

    pub fn text(t: &str) -> MapsAndLists {
        MapsAndLists(Value::Text(t.to_owned()))
    }

    pub fn mapping(mapping: HashMap<String, MapsAndLists>) -> MapsAndLists {
        MapsAndLists(Value::Mapping(mapping))
    }

    pub fn sequence(sequence: Vec<MapsAndLists>) -> MapsAndLists {
        MapsAndLists(Value::Sequence(sequence))
    }

    pub fn lambda0<T>(fun: T) -> MapsAndLists
    where T: Fn() -> String + 'static {
        Self::invocable0(move || MapsAndLists(Value::Text(fun())))
    }

    pub fn lambda1<T>(fun: T) -> MapsAndLists
    where T: Fn(&str) -> String + 'static {
        Self::invocable1(move |body| MapsAndLists(Value::Text(fun(body))))
    }

    pub fn invocable0<T>(fun: T) -> MapsAndLists
    where T: Fn() -> MapsAndLists + 'static {
        MapsAndLists(Value::Invocable0(Box::new(fun)))
    }

    pub fn invocable1<T>(fun: T) -> MapsAndLists
    where T: Fn(&str) -> MapsAndLists + 'static {
        MapsAndLists(Value::Invocable1(Box::new(fun)))
    }

    // text results stay lambdas, data results are plain members
    fn invoked<'a>(result: MapsAndLists) -> Boxed<'a> {
        match result {
            MapsAndLists(Value::Text(text)) => into_box(LambdaText(text)),
            data => into_box(data),
        }
    }
}

impl From<&str> for MapsAndLists {
    fn from(text: &str) -> Self {
        MapsAndLists::text(text)
    }
}

impl From<bool> for MapsAndLists {
    fn from(b: bool) -> Self {
        MapsAndLists::bool(b)
    }
}

impl From<Vec<MapsAndLists>> for MapsAndLists {
    fn from(sequence: Vec<MapsAndLists>) -> Self {
        MapsAndLists::sequence(sequence)
    }
}

impl<K: Into<String>> FromIterator<(K, MapsAndLists)> for MapsAndLists {
    fn from_iter<I: IntoIterator<Item = (K, MapsAndLists)>>(entries: I) -> Self {
        MapsAndLists::mapping(
            entries.into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect()
        )
    }
}

impl fmt::Debug for MapsAndLists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(text) => write!(f, "{:?}", text),
            Value::Mapping(mapping) => f.debug_map().entries(mapping.iter()).finish(),
            Value::Sequence(sequence) => f.debug_list().entries(sequence.iter()).finish(),
            Value::Invocable0(_) => write!(f, "<lambda0>"),
            Value::Invocable1(_) => write!(f, "<lambda1>"),
        }
    }
}

impl Context for MapsAndLists {
    fn is_falsy(&self) -> bool {
        match self {
            MapsAndLists(Value::Null) => true,
            MapsAndLists(Value::Bool(b)) => !b,
            MapsAndLists(Value::Sequence(seq)) => seq.is_empty(),
            _ => false
        }
    }

    fn children(&self) -> Option<Vec<Boxed<'_>>> {
        match self {
            MapsAndLists(Value::Sequence(seq)) =>
                Some(
                    seq.iter()
                        .map(into_box)
                        .collect::<Vec<_>>()
                ),
            _ => None
        }
    }

    fn child(&self, name: &str, body: Option<&str>) -> Option<Boxed<'_>> {
        match self {
            MapsAndLists(Value::Mapping(obj)) =>
                obj.get(name).map(
                    |it| match (it, body) {
                        (MapsAndLists(Value::Invocable0(fun)), _) =>
                            Self::invoked(fun()),
                        (MapsAndLists(Value::Invocable1(fun)), Some(body)) =>
                            Self::invoked(fun(body)),
                        _ => into_box(it)
                    }
                ),
            _ => None
        }
    }

    fn value(&self) -> String {
        match self {
            MapsAndLists(Value::Bool(b)) => b.to_string(),
            MapsAndLists(Value::Text(text)) => text.to_owned(),
            _ => "".to_owned()
        }
    }

    fn lambda(&self) -> Option<String> {
        match self {
            MapsAndLists(Value::Invocable0(fun)) => match fun() {
                MapsAndLists(Value::Text(text)) => Some(text),
                _ => None
            },
            _ => None
        }
    }
}
