use super::*;

use std::str::FromStr;

/// Callback registered through [`DomBinding::on_any`].
///
/// Handlers receive the binding they were registered on, so they can query
/// and mutate the live document at trigger time.
pub type Handler = Rc<dyn Fn(&mut dyn DomBinding, &Event)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: NodeId,
    pub bubbles: bool,
    /// Key value for keyboard events, e.g. `"a"` or `"Enter"`.
    pub key: Option<String>,
}

impl Event {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            bubbles: true,
            key: None,
        }
    }

    pub(crate) fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }
}

/// Ordered, duplicate-free set of event type names.
///
/// Parses the space-separated form used by query-library `.on()` calls:
///
/// ```
/// use superlists_dom::EventSet;
///
/// let events: EventSet = "keypress click keypress".parse()?;
/// assert_eq!(events.names().collect::<Vec<_>>(), ["keypress", "click"]);
/// assert!("   ".parse::<EventSet>().is_err());
/// # Ok::<(), superlists_dom::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSet {
    names: Vec<String>,
}

impl EventSet {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(Error::InvalidEventSet("blank event name".into()));
            }
            if name.chars().any(|ch| ch.is_whitespace()) {
                return Err(Error::InvalidEventSet(format!(
                    "event name contains whitespace: {name:?}"
                )));
            }
            // Event types are case-sensitive, as in the DOM.
            if !out.iter().any(|existing| existing == name) {
                out.push(name.to_string());
            }
        }
        if out.is_empty() {
            return Err(Error::InvalidEventSet("no events given".into()));
        }
        Ok(Self { names: out })
    }

    /// For built-in lists already known to be distinct and non-empty.
    pub(crate) fn from_trusted(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.names.iter().any(|name| name == event_type)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromStr for EventSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.split_whitespace())
    }
}

impl fmt::Display for EventSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join(" "))
    }
}

#[derive(Clone)]
pub(crate) struct Listener {
    pub(crate) handler: Handler,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("handler", &Rc::as_ptr(&self.handler))
            .finish()
    }
}

#[derive(Debug, Default)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    /// Returns `false` when the same handler is already registered for this
    /// node and event type.
    pub(crate) fn add(&mut self, node_id: NodeId, event: String, listener: Listener) -> bool {
        let listeners = self
            .map
            .entry(node_id)
            .or_default()
            .entry(event)
            .or_default();

        if listeners
            .iter()
            .any(|existing| Rc::ptr_eq(&existing.handler, &listener.handler))
        {
            return false;
        }

        listeners.push(listener);
        true
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, node_id: NodeId, event: &str) -> usize {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map_or(0, Vec::len)
    }

    pub(crate) fn remove_node(&mut self, node_id: NodeId) -> usize {
        self.map
            .remove(&node_id)
            .map_or(0, |events| events.values().map(Vec::len).sum())
    }
}
