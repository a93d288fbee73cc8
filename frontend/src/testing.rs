//! In-memory page and virtual clock for driving components without a browser.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::dom::{
    Element, Event, EventKind, Handler, IntersectionEntry, IntersectionHandler, Observer,
    ObserverOptions, Page, Target,
};
use crate::timers::{Task, Timers};

#[derive(Default)]
struct Node {
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    text: String,
    attributes: BTreeMap<String, String>,
    offset_top: f64,
    value: String,
    disabled: bool,
}

#[derive(Clone, Default)]
pub struct FakeElement(Rc<RefCell<Node>>);

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.0.borrow_mut().attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_value(self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_offset_top(self, top: f64) -> Self {
        self.set_offset_top(top);
        self
    }

    pub fn set_offset_top(&self, top: f64) {
        self.0.borrow_mut().offset_top = top;
    }

    pub fn class_name(&self) -> String {
        self.0.borrow().classes.join(" ")
    }
}

impl PartialEq for FakeElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.0.borrow();
        f.debug_struct("FakeElement")
            .field("classes", &node.classes)
            .field("attributes", &node.attributes)
            .field("text", &node.text)
            .finish()
    }
}

impl Element for FakeElement {
    fn add_class(&self, class: &str) {
        let mut node = self.0.borrow_mut();
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    fn set_class_name(&self, class_name: &str) {
        self.0.borrow_mut().classes = class_name.split_whitespace().map(str::to_string).collect();
    }

    fn set_style(&self, property: &str, value: &str) {
        let mut node = self.0.borrow_mut();
        if value.is_empty() {
            node.style.remove(property);
        } else {
            node.style.insert(property.to_string(), value.to_string());
        }
    }

    fn style(&self, property: &str) -> String {
        self.0.borrow().style.get(property).cloned().unwrap_or_default()
    }

    fn text(&self) -> String {
        self.0.borrow().text.clone()
    }

    fn set_text(&self, text: &str) {
        self.0.borrow_mut().text = text.to_string();
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    fn offset_top(&self) -> f64 {
        self.0.borrow().offset_top
    }

    fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    fn set_value(&self, value: &str) {
        self.0.borrow_mut().value = value.to_string();
    }

    fn set_disabled(&self, disabled: bool) {
        self.0.borrow_mut().disabled = disabled;
    }

    fn is_disabled(&self) -> bool {
        self.0.borrow().disabled
    }
}

struct ObserverState {
    options: ObserverOptions,
    observed: Vec<FakeElement>,
    handler: Option<IntersectionHandler<FakeElement, FakeObserver>>,
    connected: bool,
}

#[derive(Clone)]
pub struct FakeObserver(Rc<RefCell<ObserverState>>);

impl FakeObserver {
    pub fn options(&self) -> ObserverOptions {
        self.0.borrow().options.clone()
    }

    pub fn observed(&self) -> Vec<FakeElement> {
        self.0.borrow().observed.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.0.borrow().connected
    }

    fn deliver(&self, entries: Vec<IntersectionEntry<FakeElement>>) {
        let handler = self.0.borrow_mut().handler.take();
        if let Some(mut handler) = handler {
            handler(entries, self);
            self.0.borrow_mut().handler = Some(handler);
        }
    }
}

impl Observer<FakeElement> for FakeObserver {
    fn observe(&self, target: &FakeElement) {
        let mut state = self.0.borrow_mut();
        if state.connected && !state.observed.contains(target) {
            state.observed.push(target.clone());
        }
    }

    fn unobserve(&self, target: &FakeElement) {
        self.0.borrow_mut().observed.retain(|el| el != target);
    }

    fn disconnect(&self) {
        let mut state = self.0.borrow_mut();
        state.observed.clear();
        state.connected = false;
    }
}

struct Listener {
    id: usize,
    target: Target<FakeElement>,
    kind: EventKind,
    handler: Option<Handler>,
}

#[derive(Default)]
struct PageState {
    selectors: HashMap<String, Vec<FakeElement>>,
    loading: bool,
    scroll_y: f64,
    scrolled_to: Vec<f64>,
    listeners: Vec<Listener>,
    next_listener: usize,
    observers: Vec<FakeObserver>,
}

/// A page whose "selectors" are whatever the test registered them as.
#[derive(Clone, Default)]
pub struct FakePage(Rc<RefCell<PageState>>);

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading() -> Self {
        let page = Self::default();
        page.0.borrow_mut().loading = true;
        page
    }

    /// Registers `element` as a match for `selector` and hands it back.
    pub fn insert(&self, selector: &str, element: FakeElement) -> FakeElement {
        self.0
            .borrow_mut()
            .selectors
            .entry(selector.to_string())
            .or_default()
            .push(element.clone());
        element
    }

    pub fn dispatch(&self, target: &Target<FakeElement>, kind: EventKind) -> bool {
        let ids: Vec<usize> = self
            .0
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == kind && &l.target == target)
            .map(|l| l.id)
            .collect();

        let event = Event::default();
        for id in ids {
            let handler = self
                .0
                .borrow_mut()
                .listeners
                .iter_mut()
                .find(|l| l.id == id)
                .and_then(|l| l.handler.take());
            if let Some(mut handler) = handler {
                handler(&event);
                if let Some(listener) = self.0.borrow_mut().listeners.iter_mut().find(|l| l.id == id) {
                    listener.handler = Some(handler);
                }
            }
        }
        event.default_prevented()
    }

    pub fn click(&self, element: &FakeElement) -> bool {
        self.dispatch(&Target::Element(element.clone()), EventKind::Click)
    }

    pub fn input(&self, element: &FakeElement) -> bool {
        self.dispatch(&Target::Element(element.clone()), EventKind::Input)
    }

    pub fn submit(&self, element: &FakeElement) -> bool {
        self.dispatch(&Target::Element(element.clone()), EventKind::Submit)
    }

    pub fn scroll(&self, y: f64) {
        self.0.borrow_mut().scroll_y = y;
        self.dispatch(&Target::Window, EventKind::Scroll);
    }

    pub fn finish_loading(&self) {
        self.0.borrow_mut().loading = false;
        self.dispatch(&Target::Document, EventKind::Ready);
    }

    pub fn enter_viewport(&self, element: &FakeElement) {
        self.intersect(element, true);
    }

    pub fn leave_viewport(&self, element: &FakeElement) {
        self.intersect(element, false);
    }

    fn intersect(&self, element: &FakeElement, is_intersecting: bool) {
        let watching: Vec<FakeObserver> = self
            .0
            .borrow()
            .observers
            .iter()
            .filter(|o| o.0.borrow().observed.contains(element))
            .cloned()
            .collect();
        for observer in watching {
            observer.deliver(vec![IntersectionEntry { target: element.clone(), is_intersecting }]);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.0.borrow().listeners.len()
    }

    pub fn observers(&self) -> Vec<FakeObserver> {
        self.0.borrow().observers.clone()
    }

    pub fn scrolled_to(&self) -> Vec<f64> {
        self.0.borrow().scrolled_to.clone()
    }
}

impl Page for FakePage {
    type Element = FakeElement;
    type Observer = FakeObserver;
    type Listener = usize;

    fn query(&self, selector: &str) -> Option<FakeElement> {
        self.0.borrow().selectors.get(selector).and_then(|els| els.first().cloned())
    }

    fn query_all(&self, selector: &str) -> Vec<FakeElement> {
        self.0.borrow().selectors.get(selector).cloned().unwrap_or_default()
    }

    fn is_loading(&self) -> bool {
        self.0.borrow().loading
    }

    fn scroll_y(&self) -> f64 {
        self.0.borrow().scroll_y
    }

    fn smooth_scroll_to(&self, top: f64) {
        self.0.borrow_mut().scrolled_to.push(top);
    }

    fn listen(&self, target: Target<FakeElement>, kind: EventKind, handler: Handler) -> Option<usize> {
        let mut state = self.0.borrow_mut();
        let id = state.next_listener;
        state.next_listener += 1;
        state.listeners.push(Listener { id, target, kind, handler: Some(handler) });
        Some(id)
    }

    fn unlisten(&self, listener: usize) {
        self.0.borrow_mut().listeners.retain(|l| l.id != listener);
    }

    fn observe_intersections(
        &self,
        options: &ObserverOptions,
        handler: IntersectionHandler<FakeElement, FakeObserver>,
    ) -> Option<FakeObserver> {
        let observer = FakeObserver(Rc::new(RefCell::new(ObserverState {
            options: options.clone(),
            observed: Vec::new(),
            handler: Some(handler),
            connected: true,
        })));
        self.0.borrow_mut().observers.push(observer.clone());
        Some(observer)
    }
}

struct Pending {
    due: u64,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Clock {
    now: u64,
    seq: u64,
    pending: Vec<Pending>,
}

/// Virtual clock. Tasks run in due order (ties by scheduling order) while
/// `advance` walks time forward, including tasks scheduled along the way.
#[derive(Clone, Default)]
pub struct ManualTimers(Rc<RefCell<Clock>>);

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.0.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().pending.len()
    }

    pub fn advance(&self, ms: u64) {
        let until = self.0.borrow().now + ms;
        loop {
            let next = {
                let mut clock = self.0.borrow_mut();
                let index = clock
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= until)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(i, _)| i);
                index.map(|i| {
                    let pending = clock.pending.remove(i);
                    clock.now = pending.due;
                    pending.task
                })
            };
            match next {
                Some(task) => task(),
                None => break,
            }
        }
        self.0.borrow_mut().now = until;
    }
}

impl Timers for ManualTimers {
    fn after(&self, delay_ms: u32, task: Task) {
        let mut clock = self.0.borrow_mut();
        let due = clock.now + u64::from(delay_ms);
        let seq = clock.seq;
        clock.seq += 1;
        clock.pending.push(Pending { due, seq, task });
    }
}
