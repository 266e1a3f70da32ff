use super::*;

/// Selector for the item text input the handler is bound to.
pub const TARGET_SELECTOR: &str = r#"input[name="text"]"#;

/// Selector for validation error indicators hidden on interaction.
pub const ERROR_SELECTOR: &str = ".has-error";

/// Events the handler listens for by default.
pub const DEFAULT_EVENTS: [&str; 2] = ["keypress", "click"];

/// Binds "hide the validation errors" to the item text input.
///
/// One `Initializer` owns one handler. Calling [`initialize`] again on the
/// same document re-registers that same handler, which the binding ignores,
/// so repeated calls never stack listeners. After the document body is
/// replaced, calling it again binds to whatever input now exists.
///
/// [`initialize`]: Initializer::initialize
#[derive(Clone)]
pub struct Initializer {
    target: Selector,
    errors: Selector,
    events: EventSet,
    handler: Handler,
}

impl Initializer {
    /// The `keypress click` variant.
    pub fn new() -> Self {
        Self::build(
            Selector::input_named("text"),
            Selector::class("has-error"),
            EventSet::from_trusted(&DEFAULT_EVENTS),
        )
    }

    /// The `keypress`-only variant.
    pub fn keypress_only() -> Self {
        Self::new().with_events(EventSet::from_trusted(&["keypress"]))
    }

    pub fn from_config(config: &InitializerConfig) -> Result<Self> {
        let target = Selector::parse(&config.target_selector)?;
        let errors = Selector::parse(&config.error_selector)?;
        let events = EventSet::new(&config.events)?;
        Ok(Self::build(target, errors, events))
    }

    fn build(target: Selector, errors: Selector, events: EventSet) -> Self {
        let handler = hide_errors_handler(errors.clone());
        Self {
            target,
            errors,
            events,
            handler,
        }
    }

    pub fn with_events(mut self, events: EventSet) -> Self {
        self.events = events;
        self
    }

    pub fn target_selector(&self) -> &Selector {
        &self.target
    }

    pub fn error_selector(&self) -> &Selector {
        &self.errors
    }

    pub fn events(&self) -> &EventSet {
        &self.events
    }

    /// Binds the handler to the first element matching the target selector.
    /// Does nothing when there is no such element.
    pub fn initialize(&self, binding: &mut dyn DomBinding) {
        let Some(target) = binding.find(&self.target) else {
            tracing::debug!(selector = %self.target, "no target element, nothing bound");
            return;
        };
        tracing::debug!(
            selector = %self.target,
            node = target.0,
            events = %self.events,
            "binding error-hiding handler"
        );
        binding.on_any(target, &self.events, Rc::clone(&self.handler));
    }

    /// Runs the handler body directly: hides every element matching the
    /// error selector.
    pub fn hide_errors(&self, binding: &mut dyn DomBinding) {
        hide_matching(binding, &self.errors);
    }
}

impl Default for Initializer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Initializer")
            .field("target", &self.target.as_str())
            .field("errors", &self.errors.as_str())
            .field("events", &self.events.to_string())
            .finish_non_exhaustive()
    }
}

fn hide_errors_handler(errors: Selector) -> Handler {
    Rc::new(move |binding: &mut dyn DomBinding, event: &Event| {
        tracing::trace!(event = %event.event_type, node = event.target.0, "hiding errors");
        hide_matching(binding, &errors);
    })
}

fn hide_matching(binding: &mut dyn DomBinding, errors: &Selector) {
    for node in binding.find_all(errors) {
        binding.hide(node);
    }
}
