use super::*;

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) log_limit: usize,
    pub(crate) to_stderr: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            to_stderr: true,
        }
    }
}

/// A document plus the listeners registered on it.
///
/// Drives user interactions (`press_key`, `type_text`, `click`) and checks
/// the result. Implements [`DomBinding`], so it can be handed straight to
/// [`Initializer::initialize`] or [`Namespace::call`].
#[derive(Debug)]
pub struct Harness {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) trace_state: TraceState,
}

impl Harness {
    pub fn from_html(html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        Ok(Self {
            dom,
            listeners: ListenerStore::default(),
            trace_state: TraceState::default(),
        })
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace_state.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace_state.logs.drain(..).collect()
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_state.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_state.events = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Config(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_state.log_limit = max_entries;
        while self.trace_state.logs.len() > self.trace_state.log_limit {
            self.trace_state.logs.pop_front();
        }
        Ok(())
    }

    /// Replaces the whole body with `html`, the way a test fixture is reset
    /// between cases. Listeners on the removed nodes are dropped with them.
    ///
    /// On a parse error the document is left untouched.
    ///
    /// Removed nodes keep their slots in the document arena so old
    /// [`NodeId`]s stay safe to use; a harness reset many times grows by
    /// every replaced subtree. Build a fresh harness for long runs.
    pub fn replace_body(&mut self, html: &str) -> Result<()> {
        parse_html(html)?;
        let body = self.dom.body();
        let detached = self.dom.replace_children(body, html)?;
        let dropped = detached
            .iter()
            .map(|node| self.listeners.remove_node(*node))
            .sum::<usize>();
        tracing::debug!(
            detached = detached.len(),
            listeners_dropped = dropped,
            "document body replaced"
        );
        self.trace_line(format!(
            "[document] body replaced detached={} listeners_dropped={dropped}",
            detached.len()
        ));
        Ok(())
    }

    /// Fires `keydown`, `keypress` and `keyup` for one key.
    pub fn press_key(&mut self, selector: &str, key: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        for event_type in ["keydown", "keypress", "keyup"] {
            self.dispatch_event(Event::new(event_type, target).with_key(key));
        }
        Ok(())
    }

    /// Types `text` one character at a time, appending to the current value.
    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }
        if self.dom.disabled(target) || self.dom.readonly(target) {
            return Ok(());
        }

        for ch in text.chars() {
            let key = ch.to_string();
            self.dispatch_event(Event::new("keydown", target).with_key(&key));
            self.dispatch_event(Event::new("keypress", target).with_key(&key));
            let mut value = self.dom.value(target).unwrap_or_default().to_string();
            value.push(ch);
            self.dom.set_value(target, &value);
            self.dispatch_event(Event::new("input", target));
            self.dispatch_event(Event::new("keyup", target).with_key(&key));
        }
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        self.dispatch_event(Event::new("click", target));
        Ok(())
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(Event::new(event, target));
        Ok(())
    }

    /// Dispatches on a node handle directly, even one no longer in the
    /// document.
    pub fn dispatch_to(&mut self, node: NodeId, event: &str) -> Event {
        self.dispatch_event(Event::new(event, node))
    }

    /// Shows every element matching `selector` again, restoring the inline
    /// display it had before it was hidden. Returns how many were shown.
    pub fn show(&mut self, selector: &str) -> Result<usize> {
        let targets = self.dom.query_selector_all(&Selector::parse(selector)?);
        if targets.is_empty() {
            return Err(Error::SelectorNotFound(selector.to_string()));
        }
        let mut shown = 0;
        for target in targets {
            if self.dom.show(target)? {
                shown += 1;
                let label = self.dom.node_label(target);
                self.trace_line(format!("[show] {label}"));
            }
        }
        Ok(shown)
    }

    pub fn add_class(&mut self, selector: &str, class_name: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dom.class_add(target, class_name)
    }

    pub fn remove_class(&mut self, selector: &str, class_name: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dom.class_remove(target, class_name)
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.class_contains(target, class_name))
    }

    pub fn is_visible(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.is_visible(target))
    }

    /// Number of listeners for `event` on the first element matching
    /// `selector`.
    pub fn listener_count(&self, selector: &str, event: &str) -> Result<usize> {
        let target = self.select_one(selector)?;
        Ok(self.listeners.count(target, event))
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target).unwrap_or_default();
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    /// Every element matching `selector` must be visible.
    pub fn assert_visible(&self, selector: &str) -> Result<()> {
        self.assert_visibility(selector, true)
    }

    /// Every element matching `selector` must be hidden.
    pub fn assert_hidden(&self, selector: &str) -> Result<()> {
        self.assert_visibility(selector, false)
    }

    fn assert_visibility(&self, selector: &str, expected: bool) -> Result<()> {
        let targets = self.dom.query_selector_all(&Selector::parse(selector)?);
        if targets.is_empty() {
            return Err(Error::SelectorNotFound(selector.to_string()));
        }
        let label = |visible: bool| if visible { "visible" } else { "hidden" };
        for target in targets {
            let actual = self.dom.is_visible(target);
            if actual != expected {
                return Err(Error::AssertionFailed {
                    selector: selector.to_string(),
                    expected: label(expected).into(),
                    actual: label(actual).into(),
                    dom_snippet: self.node_snippet(target),
                });
            }
        }
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(&Selector::parse(selector)?)
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    /// Runs listeners on the target, then on each ancestor while the event
    /// bubbles. The listener list for a node is read before any of them run.
    pub(crate) fn dispatch_event(&mut self, mut event: Event) -> Event {
        let mut path = vec![event.target];
        if event.bubbles {
            let mut cursor = self.dom.parent(event.target);
            while let Some(node) = cursor {
                path.push(node);
                cursor = self.dom.parent(node);
            }
        }

        let mut invoked = 0usize;
        for node in path {
            let listeners = self.listeners.get(node, &event.event_type);
            if listeners.is_empty() {
                continue;
            }
            event.current_target = node;
            if self.trace_state.enabled {
                self.trace_event_line(format!(
                    "[event] {} target={} current={} listeners={}",
                    event.event_type,
                    self.dom.node_label(event.target),
                    self.dom.node_label(node),
                    listeners.len()
                ));
            }
            for listener in listeners {
                (listener.handler)(self, &event);
                invoked += 1;
            }
        }

        tracing::trace!(
            event = %event.event_type,
            node = event.target.0,
            listeners = invoked,
            "event dispatched"
        );
        if self.trace_state.enabled {
            self.trace_event_line(format!(
                "[event] done {} target={} invoked={invoked}",
                event.event_type,
                self.dom.node_label(event.target)
            ));
        }
        event
    }

    pub(crate) fn trace_event_line(&mut self, line: String) {
        if self.trace_state.enabled && self.trace_state.events {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        if self.trace_state.enabled {
            if self.trace_state.to_stderr {
                eprintln!("{line}");
            }
            if self.trace_state.logs.len() >= self.trace_state.log_limit {
                self.trace_state.logs.pop_front();
            }
            self.trace_state.logs.push_back(line);
        }
    }
}

impl DomBinding for Harness {
    fn find(&self, selector: &Selector) -> Option<NodeId> {
        self.dom.query_selector(selector)
    }

    fn find_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.dom.query_selector_all(selector)
    }

    fn hide(&mut self, node: NodeId) {
        if let Ok(true) = self.dom.hide(node) {
            tracing::trace!(node = node.0, "element hidden");
            if self.trace_state.enabled {
                let label = self.dom.node_label(node);
                self.trace_line(format!("[hide] {label}"));
            }
        }
    }

    fn on_any(&mut self, node: NodeId, events: &EventSet, handler: Handler) {
        if self.dom.element(node).is_none() || !self.dom.is_connected(node) {
            tracing::debug!(node = node.0, "not a connected element, listener skipped");
            return;
        }
        for event_type in events.names() {
            let added = self.listeners.add(
                node,
                event_type.to_string(),
                events::Listener {
                    handler: Rc::clone(&handler),
                },
            );
            if self.trace_state.enabled {
                let label = self.dom.node_label(node);
                self.trace_line(format!("[listen] {event_type} target={label} added={added}"));
            }
        }
    }
}
