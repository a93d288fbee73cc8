//! The slice of the browser the page script talks to.
//!
//! Components are written against these traits. `web.rs` backs them with
//! web-sys, tests back them with the in-memory page in `testing.rs`.

use std::cell::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Click,
    Input,
    Scroll,
    Submit,
    Ready,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Input => "input",
            EventKind::Scroll => "scroll",
            EventKind::Submit => "submit",
            EventKind::Ready => "DOMContentLoaded",
        }
    }
}

/// Where a listener gets attached.
#[derive(Clone, Debug, PartialEq)]
pub enum Target<E> {
    Window,
    Document,
    Element(E),
}

/// What a handler sees of a dispatched event. The adapter forwards
/// `prevent_default` to the real event once the handler returns.
#[derive(Debug, Default)]
pub struct Event {
    default_prevented: Cell<bool>,
}

impl Event {
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

pub type Handler = Box<dyn FnMut(&Event)>;

#[derive(Clone, Debug, PartialEq)]
pub struct ObserverOptions {
    pub threshold: f64,
    pub root_margin: Option<&'static str>,
}

impl ObserverOptions {
    pub const fn new(threshold: f64) -> Self {
        Self { threshold, root_margin: None }
    }

    pub const fn with_root_margin(self, margin: &'static str) -> Self {
        Self { root_margin: Some(margin), ..self }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionEntry<E> {
    pub target: E,
    pub is_intersecting: bool,
}

/// An element handle. Handles are cheap clones that compare by identity.
///
/// Control-only methods (`value`, `set_disabled`, ...) are no-ops on elements
/// that are not form controls.
pub trait Element: Clone + PartialEq + 'static {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;
    fn set_class_name(&self, class_name: &str);

    /// An empty value removes the inline property.
    fn set_style(&self, property: &str, value: &str);
    fn style(&self, property: &str) -> String;

    fn text(&self) -> String;
    fn set_text(&self, text: &str);
    fn attribute(&self, name: &str) -> Option<String>;
    fn offset_top(&self) -> f64;

    fn value(&self) -> String;
    fn set_value(&self, value: &str);
    fn set_disabled(&self, disabled: bool);
    fn is_disabled(&self) -> bool;
}

pub trait Observer<E> {
    fn observe(&self, target: &E);
    fn unobserve(&self, target: &E);
    fn disconnect(&self);
}

pub type IntersectionHandler<E, O> = Box<dyn FnMut(Vec<IntersectionEntry<E>>, &O)>;

pub trait Page: Clone + 'static {
    type Element: Element;
    type Observer: Observer<Self::Element> + Clone + 'static;
    type Listener;

    fn query(&self, selector: &str) -> Option<Self::Element>;
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    fn by_id(&self, id: &str) -> Option<Self::Element> {
        self.query(&format!("#{}", id))
    }

    /// True while the document is still parsing, i.e. `Ready` has not fired yet.
    fn is_loading(&self) -> bool;

    fn scroll_y(&self) -> f64;
    fn smooth_scroll_to(&self, top: f64);

    fn listen(
        &self,
        target: Target<Self::Element>,
        kind: EventKind,
        handler: Handler,
    ) -> Option<Self::Listener>;

    fn unlisten(&self, listener: Self::Listener);

    /// Creates an observer. Targets are added with `Observer::observe`.
    fn observe_intersections(
        &self,
        options: &ObserverOptions,
        handler: IntersectionHandler<Self::Element, Self::Observer>,
    ) -> Option<Self::Observer>;
}
