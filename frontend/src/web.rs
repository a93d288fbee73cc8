use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    Document, EventTarget, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    ScrollBehavior, ScrollToOptions, Window,
};

use crate::dom::{
    Element, Event, EventKind, Handler, IntersectionEntry, IntersectionHandler, Observer,
    ObserverOptions, Page, Target,
};

#[derive(Clone, Debug, PartialEq)]
pub struct WebElement(HtmlElement);

impl Element for WebElement {
    fn add_class(&self, class: &str) {
        let _ = self.0.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.0.class_list().remove_1(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn set_class_name(&self, class_name: &str) {
        self.0.set_class_name(class_name);
    }

    fn set_style(&self, property: &str, value: &str) {
        let style = self.0.style();
        if value.is_empty() {
            let _ = style.remove_property(property);
        } else {
            let _ = style.set_property(property, value);
        }
    }

    fn style(&self, property: &str) -> String {
        self.0.style().get_property_value(property).unwrap_or_default()
    }

    fn text(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn offset_top(&self) -> f64 {
        f64::from(self.0.offset_top())
    }

    fn value(&self) -> String {
        if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = self.0.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = self.0.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn set_value(&self, value: &str) {
        if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = self.0.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(select) = self.0.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        }
    }

    fn set_disabled(&self, disabled: bool) {
        if let Some(button) = self.0.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        } else if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            input.set_disabled(disabled);
        }
    }

    fn is_disabled(&self) -> bool {
        if let Some(button) = self.0.dyn_ref::<HtmlButtonElement>() {
            button.disabled()
        } else if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            input.disabled()
        } else {
            false
        }
    }
}

#[derive(Clone)]
pub struct WebObserver(IntersectionObserver);

impl Observer<WebElement> for WebObserver {
    fn observe(&self, target: &WebElement) {
        self.0.observe(&target.0);
    }

    fn unobserve(&self, target: &WebElement) {
        self.0.unobserve(&target.0);
    }

    fn disconnect(&self) {
        self.0.disconnect();
    }
}

pub struct WebListener {
    target: EventTarget,
    kind: EventKind,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

#[derive(Clone)]
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    fn event_target(&self, target: &Target<WebElement>) -> EventTarget {
        match target {
            Target::Window => self.window.clone().into(),
            Target::Document => self.document.clone().into(),
            Target::Element(el) => el.0.clone().into(),
        }
    }
}

impl Page for WebPage {
    type Element = WebElement;
    type Observer = WebObserver;
    type Listener = WebListener;

    fn query(&self, selector: &str) -> Option<WebElement> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .map(WebElement)
    }

    fn query_all(&self, selector: &str) -> Vec<WebElement> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            warn!("invalid selector {}", selector);
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .map(WebElement)
            .collect()
    }

    fn is_loading(&self) -> bool {
        self.document.ready_state() == "loading"
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn smooth_scroll_to(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn listen(&self, target: Target<WebElement>, kind: EventKind, mut handler: Handler) -> Option<WebListener> {
        let target = self.event_target(&target);
        let callback = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let seen = Event::default();
            handler(&seen);
            if seen.default_prevented() {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(web_sys::Event)>);

        match target.add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref()) {
            Ok(()) => Some(WebListener { target, kind, callback }),
            Err(e) => {
                warn!("could not listen for {}: {:?}", kind.as_str(), e);
                None
            }
        }
    }

    fn unlisten(&self, listener: WebListener) {
        let _ = listener
            .target
            .remove_event_listener_with_callback(listener.kind.as_str(), listener.callback.as_ref().unchecked_ref());
    }

    fn observe_intersections(
        &self,
        options: &ObserverOptions,
        mut handler: IntersectionHandler<WebElement, WebObserver>,
    ) -> Option<WebObserver> {
        let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
            let entries = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .filter_map(|entry| {
                    let is_intersecting = entry.is_intersecting();
                    entry
                        .target()
                        .dyn_into::<HtmlElement>()
                        .ok()
                        .map(|el| IntersectionEntry { target: WebElement(el), is_intersecting })
                })
                .collect();
            handler(entries, &WebObserver(observer));
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        if let Some(margin) = options.root_margin {
            init.set_root_margin(margin);
        }

        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => {
                // observers live as long as the page
                callback.forget();
                Some(WebObserver(observer))
            }
            Err(e) => {
                warn!("could not create intersection observer: {:?}", e);
                None
            }
        }
    }
}
