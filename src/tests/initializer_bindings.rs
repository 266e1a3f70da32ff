use super::*;

use std::cell::RefCell;

/// Records what the initializer asks of the document, without one.
#[derive(Default)]
struct RecordingBinding {
    target: Option<NodeId>,
    errors: Vec<NodeId>,
    queries: RefCell<Vec<String>>,
    hidden: Vec<NodeId>,
    registered: Vec<(NodeId, Vec<String>, Handler)>,
}

impl DomBinding for RecordingBinding {
    fn find_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.queries.borrow_mut().push(selector.to_string());
        if selector.as_str() == TARGET_SELECTOR {
            self.target.into_iter().collect()
        } else {
            self.errors.clone()
        }
    }

    fn hide(&mut self, node: NodeId) {
        self.hidden.push(node);
    }

    fn on_any(&mut self, node: NodeId, events: &EventSet, handler: Handler) {
        let names = events.names().map(str::to_string).collect();
        self.registered.push((node, names, handler));
    }
}

#[test]
fn initializer_registers_one_handler_for_both_events() {
    let mut binding = RecordingBinding {
        target: Some(NodeId(7)),
        ..RecordingBinding::default()
    };

    Initializer::new().initialize(&mut binding);

    assert_eq!(binding.registered.len(), 1);
    let (node, events, _) = &binding.registered[0];
    assert_eq!(*node, NodeId(7));
    assert_eq!(events, &["keypress", "click"]);
    assert_eq!(binding.queries.borrow().as_slice(), [TARGET_SELECTOR]);
    assert!(binding.hidden.is_empty());
}

#[test]
fn missing_target_binds_nothing() {
    let mut binding = RecordingBinding::default();
    Initializer::new().initialize(&mut binding);
    assert!(binding.registered.is_empty());
    assert!(binding.hidden.is_empty());
}

#[test]
fn handler_queries_errors_at_trigger_time() {
    let mut binding = RecordingBinding {
        target: Some(NodeId(1)),
        ..RecordingBinding::default()
    };
    Initializer::new().initialize(&mut binding);
    let handler = Rc::clone(&binding.registered[0].2);

    // Errors that appear after binding are still hidden.
    binding.errors = vec![NodeId(3), NodeId(4)];
    handler(&mut binding, &Event::new("keypress", NodeId(1)));

    assert_eq!(binding.hidden, [NodeId(3), NodeId(4)]);
    assert_eq!(
        binding.queries.borrow().as_slice(),
        [TARGET_SELECTOR, ERROR_SELECTOR]
    );
}

#[test]
fn repeated_initialize_reuses_the_same_handler() {
    let mut binding = RecordingBinding {
        target: Some(NodeId(1)),
        ..RecordingBinding::default()
    };
    let initializer = Initializer::new();
    initializer.initialize(&mut binding);
    initializer.initialize(&mut binding);

    assert_eq!(binding.registered.len(), 2);
    assert!(Rc::ptr_eq(&binding.registered[0].2, &binding.registered[1].2));
}

#[test]
fn keypress_only_variant_ignores_clicks() -> Result<()> {
    let mut h = Harness::from_html(ITEM_FORM_HTML)?;
    let initializer = Initializer::keypress_only();
    assert_eq!(initializer.events().to_string(), "keypress");

    initializer.initialize(&mut h);
    assert_eq!(h.listener_count("#id_text", "click")?, 0);

    h.click("#id_text")?;
    h.assert_visible(".has-error")?;

    h.press_key("#id_text", "Enter")?;
    h.assert_hidden(".has-error")?;
    Ok(())
}

#[test]
fn initializing_twice_leaves_one_listener_per_event() -> Result<()> {
    let mut h = Harness::from_html(ITEM_FORM_HTML)?;
    let initializer = Initializer::new();
    initializer.initialize(&mut h);
    initializer.initialize(&mut h);

    assert_eq!(h.listener_count("#id_text", "keypress")?, 1);
    assert_eq!(h.listener_count("#id_text", "click")?, 1);

    h.press_key("#id_text", "a")?;
    h.assert_hidden(".has-error")?;
    Ok(())
}

#[test]
fn separate_initializers_each_register_their_own_handler() -> Result<()> {
    let mut h = Harness::from_html(ITEM_FORM_HTML)?;
    Initializer::new().initialize(&mut h);
    Initializer::new().initialize(&mut h);

    assert_eq!(h.listener_count("#id_text", "keypress")?, 2);
    h.press_key("#id_text", "a")?;
    h.assert_hidden(".has-error")?;
    Ok(())
}

#[test]
fn no_target_input_is_a_no_op() -> Result<()> {
    let mut h = Harness::from_html(
        r#"<input name="sharee"><div class="has-error">bad email</div>"#,
    )?;
    Initializer::new().initialize(&mut h);

    assert_eq!(h.listener_count(r#"input[name="sharee"]"#, "keypress")?, 0);
    h.press_key(r#"input[name="sharee"]"#, "a")?;
    h.assert_visible(".has-error")?;
    Ok(())
}

#[test]
fn no_error_elements_is_a_no_op() -> Result<()> {
    let mut h = Harness::from_html(r#"<input name="text"><p id="other">ok</p>"#)?;
    Initializer::new().initialize(&mut h);

    h.press_key(r#"input[name="text"]"#, "a")?;
    h.click(r#"input[name="text"]"#)?;
    h.assert_visible("#other")?;
    Ok(())
}

#[test]
fn only_the_first_matching_input_is_bound() -> Result<()> {
    let mut h = Harness::from_html(
        r#"<input name="text" id="first"><input name="text" id="second">
           <div class="has-error">e</div>"#,
    )?;
    Initializer::new().initialize(&mut h);

    assert_eq!(h.listener_count("#first", "keypress")?, 1);
    assert_eq!(h.listener_count("#second", "keypress")?, 0);

    h.press_key("#second", "a")?;
    h.assert_visible(".has-error")?;
    h.press_key("#first", "a")?;
    h.assert_hidden(".has-error")?;
    Ok(())
}

#[test]
fn every_error_indicator_in_the_document_is_hidden() -> Result<()> {
    let mut h = Harness::from_html(
        r#"<div class="has-error" id="a">a</div>
           <form><input name="text"></form>
           <section><p class="help has-error" id="b">b</p></section>
           <p class="help" id="c">c</p>"#,
    )?;
    Initializer::new().initialize(&mut h);

    h.click(r#"input[name="text"]"#)?;

    h.assert_hidden("#a")?;
    h.assert_hidden("#b")?;
    h.assert_visible("#c")?;
    Ok(())
}

#[test]
fn custom_events_from_an_event_set() -> Result<()> {
    let mut h = Harness::from_html(ITEM_FORM_HTML)?;
    let events: EventSet = "input focus".parse()?;
    Initializer::new().with_events(events).initialize(&mut h);

    h.press_key("#id_text", "a")?;
    h.assert_visible(".has-error")?;

    h.type_text("#id_text", "x")?;
    h.assert_hidden(".has-error")?;
    Ok(())
}

#[test]
fn hide_errors_runs_the_handler_body_directly() -> Result<()> {
    let mut h = Harness::from_html(ITEM_FORM_HTML)?;
    Initializer::new().hide_errors(&mut h);
    h.assert_hidden(".has-error")?;
    Ok(())
}

#[test]
fn event_set_rejects_blank_names() {
    assert!(matches!(
        EventSet::new(Vec::<String>::new()),
        Err(Error::InvalidEventSet(_))
    ));
    assert!(matches!(
        EventSet::new(["keypress", " "]),
        Err(Error::InvalidEventSet(_))
    ));
    assert!(matches!(
        EventSet::new(["key press"]),
        Err(Error::InvalidEventSet(_))
    ));
}

#[test]
fn event_set_keeps_case_and_drops_duplicates() -> Result<()> {
    let events = EventSet::new(["KeyPress", "click", "keypress", "click"])?;
    assert_eq!(events.len(), 3);
    assert!(events.contains("KeyPress"));
    assert!(events.contains("keypress"));
    assert!(!events.contains("KEYPRESS"));
    assert!(!events.contains("keyup"));
    assert_eq!(events.to_string(), "KeyPress click keypress");
    Ok(())
}

#[test]
fn mixed_case_custom_event_hides_the_errors() -> Result<()> {
    let mut h = Harness::from_html(ITEM_FORM_HTML)?;
    Initializer::new()
        .with_events(EventSet::new(["itemEdited"])?)
        .initialize(&mut h);

    assert_eq!(h.listener_count("#id_text", "itemEdited")?, 1);
    h.dispatch("#id_text", "itemedited")?;
    h.assert_visible(".has-error")?;

    h.dispatch("#id_text", "itemEdited")?;
    h.assert_hidden(".has-error")?;
    Ok(())
}
