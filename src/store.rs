use std::{
    collections::HashMap,
    fs,
    path::{self, Component, Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{debug, warn};
use crate::error::ParseError;
use crate::template::{Options, Template};


/// Source of the partials a template refers to by name.
///
/// Any `Fn(&str) -> Option<Arc<Template>>` closure is a store.
pub trait TemplateStore {
    fn get(&self, name: &str) -> Option<Arc<Template>>;
}

impl<F> TemplateStore for F
where F: Fn(&str) -> Option<Arc<Template>> {
    fn get(&self, name: &str) -> Option<Arc<Template>> {
        self(name)
    }
}


/// A store resolving every name to an empty template.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStore;

impl TemplateStore for EmptyStore {
    fn get(&self, _name: &str) -> Option<Arc<Template>> {
        Some(Arc::new(Template::empty()))
    }
}


/// Templates compiled from in-memory sources.
#[derive(Debug, Clone, Default)]
pub struct TemplateMap {
    templates: HashMap<String, Arc<Template>>,
}

impl TemplateMap {
    pub fn new<'s, I>(sources: I) -> Result<Self, ParseError>
    where I: IntoIterator<Item = (&'s str, &'s str)> {
        Self::with_options(sources, &Options::default())
    }

    pub fn with_options<'s, I>(sources: I, options: &Options) -> Result<Self, ParseError>
    where I: IntoIterator<Item = (&'s str, &'s str)> {
        let mut templates = HashMap::new();
        for (name, source) in sources {
            let template = Template::with_options(source, options)?;
            templates.insert(name.to_owned(), Arc::new(template));
        }
        Ok(TemplateMap { templates })
    }

    pub fn insert(&mut self, name: &str, template: Template) {
        self.templates.insert(name.to_owned(), Arc::new(template));
    }
}

impl TemplateStore for TemplateMap {
    fn get(&self, name: &str) -> Option<Arc<Template>> {
        self.templates.get(name).map(Arc::clone)
    }
}


/// Templates read from files in a folder, named after the file stem.
///
/// Files are compiled on first use and cached. A missing or ill-formed
/// file is cached as an empty template. Names that are not plain file
/// names, such as `../x` or `a/b`, render as an empty template.
#[derive(Debug)]
pub struct TemplateFolder {
    path: PathBuf,
    extension: String,
    options: Options,
    templates: Mutex<HashMap<String, Arc<Template>>>,
}

impl TemplateFolder {
    /// A folder of `.mustache` files.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_extension(path, "mustache")
    }

    /// A folder of files with the given extension, or no extension when empty.
    pub fn with_extension(path: impl Into<PathBuf>, extension: &str) -> Self {
        TemplateFolder {
            path: path.into(),
            extension: extension.to_owned(),
            options: Options::default(),
            templates: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_options(self, options: Options) -> Self {
        TemplateFolder { options, ..self }
    }

    pub fn clear_cache(&self) {
        let mut templates = self.templates
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        debug!(path = %self.path.display(), cached = templates.len(), "partial cache cleared");
        templates.clear();
    }

    fn load(&self, name: &str) -> Template {
        let file = match self.extension.as_str() {
            "" => self.path.join(name),
            extension => self.path.join(format!("{}.{}", name, extension)),
        };
        let source = match fs::read_to_string(&file) {
            Ok(source) => source,
            Err(error) => {
                debug!(path = %file.display(), %error, "partial not readable");
                return Template::empty();
            }
        };
        match Template::with_options(&source, &self.options) {
            Ok(template) => {
                debug!(path = %file.display(), "partial loaded");
                template
            },
            Err(error) => {
                warn!(path = %file.display(), %error, "ill-formed partial ignored");
                Template::empty()
            }
        }
    }
}

// a single normal path component, so that names stay inside the folder
fn is_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    !name.contains(path::is_separator) && matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl TemplateStore for TemplateFolder {
    fn get(&self, name: &str) -> Option<Arc<Template>> {
        if !is_file_name(name) {
            warn!(path = %self.path.display(), partial = %name, "partial name outside of folder rejected");
            return Some(Arc::new(Template::empty()));
        }
        let mut templates = self.templates
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let template = templates
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(self.load(name)));
        Some(Arc::clone(template))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn map_compiles_every_source() {
        let store = TemplateMap::new([("a", "A"), ("b", "{{x}}")]).unwrap();
        assert!(store.get("a").is_some());
        assert!(store.get("c").is_none());
        assert_eq!(store.get("b").unwrap().render(&json!({ "x": 1 })), "1");
    }

    #[test]
    fn map_rejects_ill_formed_sources() {
        let error = TemplateMap::new([("a", "{{#a}}")]).unwrap_err();
        assert_eq!(error.offset, 6);
    }

    #[test]
    fn closures_are_stores() {
        let partial = Arc::new(Template::from("partial").unwrap());
        let store = move |name: &str| match name {
            "p" => Some(Arc::clone(&partial)),
            _ => None,
        };
        let template = Template::from("[{{>p}}][{{>q}}]").unwrap();
        assert_eq!(template.render_with_partials(&json!({}), &store), "[partial][]");
    }

    #[test]
    fn file_names_stay_in_folder() {
        assert!(is_file_name("partial"));
        assert!(is_file_name("partial.html"));
        assert!(!is_file_name(""));
        assert!(!is_file_name(".."));
        assert!(!is_file_name("../secret"));
        assert!(!is_file_name("sub/partial"));
        assert!(!is_file_name("partial/"));
        assert!(!is_file_name("/etc/passwd"));
    }

    #[test]
    fn rejected_names_are_not_cached() {
        let folder = TemplateFolder::new("templates");
        assert_eq!(folder.get("../secret").unwrap().render(&json!({})), "");
        assert!(folder.templates.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_store_resolves_everything() {
        assert_eq!(EmptyStore.get("anything").unwrap().render(&json!({})), "");
    }
}
