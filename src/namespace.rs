use super::*;

use std::collections::BTreeMap;

/// Something page-lifecycle code can invoke by name once the document
/// content is in place.
pub trait EntryPoint {
    fn invoke(&self, binding: &mut dyn DomBinding);
}

impl EntryPoint for Initializer {
    fn invoke(&self, binding: &mut dyn DomBinding) {
        self.initialize(binding);
    }
}

/// Named entry points grouped under one namespace, e.g. `Superlists`.
///
/// Built explicitly and handed to whatever needs it; there is no
/// process-wide instance.
pub struct Namespace {
    name: String,
    entries: BTreeMap<String, Rc<dyn EntryPoint>>,
}

impl Namespace {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: BTreeMap::new(),
        }
    }

    /// `Superlists` with `initialize` bound to the default [`Initializer`].
    pub fn superlists() -> Self {
        Self::superlists_with(Initializer::new())
    }

    pub fn superlists_with(initializer: Initializer) -> Self {
        let mut namespace = Self::new("Superlists");
        namespace.register("initialize", Rc::new(initializer));
        namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers `entry` under `name`, returning the entry it replaced.
    pub fn register(
        &mut self,
        name: &str,
        entry: Rc<dyn EntryPoint>,
    ) -> Option<Rc<dyn EntryPoint>> {
        self.entries.insert(name.to_string(), entry)
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn EntryPoint>> {
        self.entries.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn call(&self, name: &str, binding: &mut dyn DomBinding) -> Result<()> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| Error::UnknownEntryPoint {
                namespace: self.name.clone(),
                name: name.to_string(),
            })?;
        tracing::debug!(namespace = %self.name, entry = name, "invoking entry point");
        entry.invoke(binding);
        Ok(())
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.name)
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
