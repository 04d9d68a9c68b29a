/// A context borrowed from its parent, boxed so that adapters can hand
/// out either plain references or values computed on the fly.
pub type Boxed<'a> = Box<dyn Context + 'a>;

/// Hierarchical data a template is rendered against.
///
/// Navigation goes down with [Context::child] for names and
/// [Context::children] for lists. A context that behaves as a lambda
/// returns the template text it produces from [Context::lambda].
///
/// `body` is the raw source of the section being rendered, given only
/// when the name is resolved for a section tag. Adapters may call a
/// one-argument lambda with it and return the result as a [LambdaText].
pub trait Context {
    fn is_falsy(&self) -> bool;

    /// The items of a list, None when the context is not a list.
    fn children(&self) -> Option<Vec<Boxed<'_>>>;

    /// The member called `name`, None when missing.
    fn child(&self, name: &str, body: Option<&str>) -> Option<Boxed<'_>>;

    /// Text used when the context is interpolated.
    fn value(&self) -> String;

    /// Template text to render in place of this context, for lambdas.
    fn lambda(&self) -> Option<String> {
        None
    }
}

impl<T: Context + ?Sized> Context for &T {
    fn is_falsy(&self) -> bool {
        (**self).is_falsy()
    }

    fn children(&self) -> Option<Vec<Boxed<'_>>> {
        (**self).children()
    }

    fn child(&self, name: &str, body: Option<&str>) -> Option<Boxed<'_>> {
        (**self).child(name, body)
    }

    fn value(&self) -> String {
        (**self).value()
    }

    fn lambda(&self) -> Option<String> {
        (**self).lambda()
    }
}

pub(crate) fn into_box<'a, T: Context + 'a>(context: T) -> Boxed<'a> {
    Box::new(context)
}


/// The text produced by a lambda, rendered as a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaText(pub String);

impl Context for LambdaText {
    fn is_falsy(&self) -> bool {
        false
    }

    fn children(&self) -> Option<Vec<Boxed<'_>>> {
        None
    }

    fn child(&self, _name: &str, _body: Option<&str>) -> Option<Boxed<'_>> {
        None
    }

    fn value(&self) -> String {
        self.0.clone()
    }

    fn lambda(&self) -> Option<String> {
        Some(self.0.clone())
    }
}


/// Frames of the contexts entered while rendering, innermost first.
///
/// Each frame borrows its parent, frames are pushed by creating a new
/// stack value that lives as long as the section being rendered.
pub(crate) struct Stack<'a> {
    context: &'a dyn Context,
    parent: Option<&'a Stack<'a>>,
}

impl<'a> Stack<'a> {
    pub(crate) fn new(context: &'a dyn Context) -> Self {
        Stack {
            context,
            parent: None
        }
    }

    pub(crate) fn push<'b>(&'b self, context: &'b dyn Context) -> Stack<'b> {
        Stack {
            context,
            parent: Some(self)
        }
    }

    /// Resolve `name` and pass the result to `f`.
    ///
    /// The first part of a dotted name is searched from the innermost frame
    /// outward, the remaining parts only below the context found. `body`
    /// is passed on the last part only.
    pub(crate) fn resolve<R>(
        &self,
        name: &str,
        body: Option<&str>,
        f: impl FnOnce(Option<&dyn Context>) -> R
    ) -> R {
        if name == "." {
            return f(Some(self.context));
        }
        match name.split_once('.') {
            Some((head, tail)) => match self.lookup(head, None) {
                Some(found) => descend(found.as_ref(), tail, body, f),
                None => f(None),
            },
            None => f(self.lookup(name, body).as_deref()),
        }
    }

    fn lookup(&self, name: &str, body: Option<&str>) -> Option<Boxed<'_>> {
        match self.context.child(name, body) {
            Some(found) => Some(found),
            None => self.parent.and_then(|parent| parent.lookup(name, body)),
        }
    }
}

fn descend<R>(
    context: &dyn Context,
    name: &str,
    body: Option<&str>,
    f: impl FnOnce(Option<&dyn Context>) -> R
) -> R {
    match name.split_once('.') {
        Some((head, tail)) => match context.child(head, None) {
            Some(found) => descend(found.as_ref(), tail, body, f),
            None => f(None),
        },
        None => f(context.child(name, body).as_deref()),
    }
}
