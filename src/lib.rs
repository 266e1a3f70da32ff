//! Item-form error hiding for the Superlists to-do pages, bound against a
//! deterministic in-memory document.
//!
//! The [`Initializer`] looks up the item text input (`input[name="text"]`)
//! and registers a handler that hides every `.has-error` element when the
//! input sees a `keypress` or `click`. [`Harness`] owns the document the
//! handler runs against and drives user interactions in tests.
//!
//! ```
//! use superlists_dom::{Harness, Namespace};
//!
//! let mut page = Harness::from_html(
//!     r#"<form><input name="text"><div class="has-error">blank item</div></form>"#,
//! )?;
//! Namespace::superlists().call("initialize", &mut page)?;
//! page.press_key(r#"input[name="text"]"#, "a")?;
//! page.assert_hidden(".has-error")?;
//! # Ok::<(), superlists_dom::Error>(())
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

mod binding;
mod config;
mod dom;
mod events;
mod harness;
mod html;
mod initializer;
mod namespace;
mod selector;

pub use binding::DomBinding;
pub use config::InitializerConfig;
pub use dom::NodeId;
pub use events::{Event, EventSet, Handler};
pub use harness::Harness;
pub use initializer::{DEFAULT_EVENTS, ERROR_SELECTOR, Initializer, TARGET_SELECTOR};
pub use namespace::{EntryPoint, Namespace};
pub use selector::Selector;

use dom::{Dom, Element};
use events::ListenerStore;
use html::{parse_fragment, parse_html};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("type mismatch for {selector}: expected {expected}, actual {actual}")]
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    #[error(
        "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
    )]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
    #[error("invalid event set: {0}")]
    InvalidEventSet(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("unknown entry point: {namespace}.{name}")]
    UnknownEntryPoint { namespace: String, name: String },
}

pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
