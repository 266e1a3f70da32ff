use super::*;

use std::cell::RefCell;

fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Handler {
    let log = Rc::clone(log);
    Rc::new(move |_binding: &mut dyn DomBinding, event: &Event| {
        log.borrow_mut().push(format!(
            "{tag}:{}:{}",
            event.event_type,
            event.key.as_deref().unwrap_or("-")
        ));
    })
}

#[test]
fn press_key_fires_keydown_keypress_keyup_in_order() -> Result<()> {
    let mut h = Harness::from_html(r#"<input id="i" name="text">"#)?;
    let log = Rc::new(RefCell::new(Vec::new()));
    let node = h.find(&Selector::parse("#i")?).ok_or_else(|| Error::SelectorNotFound("#i".into()))?;
    h.on_any(node, &"keydown keypress keyup".parse()?, recorder(&log, "i"));

    h.press_key("#i", "Enter")?;

    assert_eq!(
        log.borrow().as_slice(),
        ["i:keydown:Enter", "i:keypress:Enter", "i:keyup:Enter"]
    );
    Ok(())
}

#[test]
fn type_text_appends_and_fires_input_per_character() -> Result<()> {
    let mut h = Harness::from_html(r#"<input id="i" value="Buy ">"#)?;
    let log = Rc::new(RefCell::new(Vec::new()));
    let node = h.find(&Selector::parse("#i")?).ok_or_else(|| Error::SelectorNotFound("#i".into()))?;
    h.on_any(node, &"keypress input".parse()?, recorder(&log, "i"));

    h.type_text("#i", "ab")?;

    h.assert_value("#i", "Buy ab")?;
    assert_eq!(
        log.borrow().as_slice(),
        ["i:keypress:a", "i:input:-", "i:keypress:b", "i:input:-"]
    );
    Ok(())
}

#[test]
fn type_text_rejects_non_text_controls() -> Result<()> {
    let mut h = Harness::from_html(r#"<div id="d"></div>"#)?;
    let err = h.type_text("#d", "x").err();
    assert!(matches!(err, Some(Error::TypeMismatch { .. })));
    Ok(())
}

#[test]
fn disabled_and_readonly_controls_ignore_interaction() -> Result<()> {
    let mut h = Harness::from_html(
        r#"<input name="text" id="i" disabled>
           <input id="r" readonly value="fixed">
           <div class="has-error">e</div>"#,
    )?;
    Initializer::new().initialize(&mut h);
    h.press_key("#i", "a")?;
    h.click("#i")?;
    h.type_text("#i", "a")?;
    h.assert_visible(".has-error")?;

    h.type_text("#r", "zzz")?;
    h.assert_value("#r", "fixed")?;
    Ok(())
}

#[test]
fn events_bubble_to_ancestor_listeners() -> Result<()> {
    let mut h = Harness::from_html(r#"<form id="f"><p><input id="i"></p></form>"#)?;
    let log = Rc::new(RefCell::new(Vec::new()));
    let form = h.find(&Selector::parse("#f")?).ok_or_else(|| Error::SelectorNotFound("#f".into()))?;
    let input = h.find(&Selector::parse("#i")?).ok_or_else(|| Error::SelectorNotFound("#i".into()))?;
    h.on_any(form, &"click".parse()?, recorder(&log, "form"));
    h.on_any(input, &"click".parse()?, recorder(&log, "input"));

    let event = h.dispatch_to(input, "click");

    assert_eq!(log.borrow().as_slice(), ["input:click:-", "form:click:-"]);
    assert_eq!(event.target, input);
    assert_eq!(event.current_target, form);
    Ok(())
}

#[test]
fn handlers_may_mutate_the_document_mid_dispatch() -> Result<()> {
    let mut h = Harness::from_html(
        r#"<input name="text"><div class="has-error" id="e1">a</div>"#,
    )?;
    let input = h
        .find(&Selector::parse("input")?)
        .ok_or_else(|| Error::SelectorNotFound("input".into()))?;
    let count = Rc::new(RefCell::new(0usize));
    let seen = Rc::clone(&count);
    let counter: Handler = Rc::new(move |binding: &mut dyn DomBinding, _event: &Event| {
        if let Ok(errors) = Selector::parse(".has-error") {
            *seen.borrow_mut() += binding.find_all(&errors).len();
        }
    });
    Initializer::new().initialize(&mut h);
    h.on_any(input, &"keypress".parse()?, counter);

    h.press_key("input", "a")?;

    // The counter runs after the hiding handler and still finds the element.
    assert_eq!(*count.borrow(), 1);
    h.assert_hidden("#e1")?;
    Ok(())
}

#[test]
fn listeners_on_detached_nodes_are_skipped() -> Result<()> {
    let mut h = Harness::from_html(r#"<body><input name="text" id="old"></body>"#)?;
    let old = h
        .find(&Selector::parse("#old")?)
        .ok_or_else(|| Error::SelectorNotFound("#old".into()))?;
    h.replace_body(r#"<input name="text" id="new">"#)?;

    let log = Rc::new(RefCell::new(Vec::new()));
    h.on_any(old, &"keypress".parse()?, recorder(&log, "old"));
    h.dispatch_to(old, "keypress");

    assert!(log.borrow().is_empty());
    Ok(())
}

#[test]
fn replace_body_keeps_the_document_on_parse_error() -> Result<()> {
    let mut h = Harness::from_html(r#"<body><p id="keep">x</p></body>"#)?;
    let err = h.replace_body("<div><!-- broken").err();
    assert!(matches!(err, Some(Error::HtmlParse(_))));
    h.assert_text("#keep", "x")?;
    Ok(())
}

#[test]
fn assertions_report_selector_and_snippet() -> Result<()> {
    let h = Harness::from_html(
        r#"<div class="has-error" id="e">You can't have an empty list item</div>"#,
    )?;

    match h.assert_hidden(".has-error") {
        Err(Error::AssertionFailed {
            selector,
            expected,
            actual,
            dom_snippet,
        }) => {
            assert_eq!(selector, ".has-error");
            assert_eq!(expected, "hidden");
            assert_eq!(actual, "visible");
            assert!(dom_snippet.starts_with(r#"<div class="has-error" id="e">"#));
        }
        other => panic!("unexpected: {other:?}"),
    }

    assert!(matches!(
        h.assert_visible(".missing"),
        Err(Error::SelectorNotFound(_))
    ));
    assert!(matches!(
        h.assert_text("#e", "nope"),
        Err(Error::AssertionFailed { .. })
    ));
    h.assert_text("#e", "You can't have an empty list item")?;
    h.assert_exists("#e")?;
    assert!(h.is_visible("#e")?);
    Ok(())
}

#[test]
fn dump_dom_shows_hidden_style() -> Result<()> {
    let mut h = Harness::from_html(
        r#"<input name="text"><span class="has-error">e</span>"#,
    )?;
    Initializer::new().initialize(&mut h);
    h.click("input")?;
    assert_eq!(
        h.dump_dom(".has-error")?,
        r#"<span class="has-error" style="display: none;">e</span>"#
    );
    Ok(())
}

#[test]
fn trace_logs_capture_binding_dispatch_and_hiding() -> Result<()> {
    let mut h = Harness::from_html(
        r#"<input name="text" id="id_text"><div class="has-error">e</div>"#,
    )?;
    h.enable_trace(true);
    h.set_trace_stderr(false);

    Initializer::new().initialize(&mut h);
    h.click("#id_text")?;

    let logs = h.take_trace_logs();
    assert_eq!(
        logs,
        [
            "[listen] keypress target=input#id_text added=true",
            "[listen] click target=input#id_text added=true",
            "[event] click target=input#id_text current=input#id_text listeners=1",
            "[hide] div.has-error",
            "[event] done click target=input#id_text invoked=1",
        ]
    );
    assert!(h.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn trace_event_lines_can_be_muted_and_bounded() -> Result<()> {
    let mut h = Harness::from_html(
        r#"<input name="text" id="id_text"><div class="has-error">e</div>"#,
    )?;
    h.enable_trace(true);
    h.set_trace_stderr(false);
    h.set_trace_events(false);
    assert!(matches!(h.set_trace_log_limit(0), Err(Error::Config(_))));
    h.set_trace_log_limit(1)?;

    Initializer::new().initialize(&mut h);
    h.press_key("#id_text", "a")?;

    assert_eq!(h.take_trace_logs(), ["[hide] div.has-error"]);
    Ok(())
}

#[test]
fn trace_is_off_by_default() -> Result<()> {
    let mut h = Harness::from_html(
        r#"<input name="text"><div class="has-error">e</div>"#,
    )?;
    Initializer::new().initialize(&mut h);
    h.press_key("input", "a")?;
    assert!(h.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn re_shown_errors_are_hidden_again_on_the_next_keypress() -> Result<()> {
    let mut h = Harness::from_html(
        r#"<input name="text" id="id_text">
           <div class="form-group" id="g" style="display: block">e</div>"#,
    )?;
    Initializer::new().initialize(&mut h);

    h.add_class("#g", "has-error")?;
    assert!(h.has_class("#g", "has-error")?);
    h.press_key("#id_text", "a")?;
    h.assert_hidden("#g")?;

    assert_eq!(h.show(".has-error")?, 1);
    assert_eq!(h.show(".has-error")?, 0);
    assert_eq!(h.dump_dom("#g")?, r#"<div class="form-group has-error" id="g" style="display: block;">e</div>"#);

    h.press_key("#id_text", "b")?;
    h.assert_hidden("#g")?;

    h.remove_class("#g", "has-error")?;
    assert!(!h.has_class("#g", "has-error")?);
    assert!(matches!(h.show(".has-error"), Err(Error::SelectorNotFound(_))));
    Ok(())
}
