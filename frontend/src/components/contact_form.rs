use std::cell::RefCell;
use std::rc::Rc;

use gloo_net::http::Request;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use wasm_bindgen_futures::spawn_local;

use crate::dom::{Element, Page};
use crate::timers::Timers;

pub const SIMULATED_LATENCY_MS: u32 = 1500;
pub const MESSAGE_LINGER_MS: u32 = 5000;
pub const SENDING_LABEL: &str = "Sending...";
pub const SUCCESS_TEXT: &str = "Thank you! We'll contact you within 24 hours to schedule your demo.";

pub const FIELD_NAMES: [&str; 7] = ["name", "email", "phone", "hospital", "title", "procedures", "message"];

pub fn error_text(support_email: &str) -> String {
    format!(
        "Sorry, there was an error. Please try again or email us directly at {}",
        support_email
    )
}

/// Everything the visitor typed, keyed by field name.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub hospital: String,
    pub title: String,
    pub procedures: String,
    pub message: String,
}

impl ContactRequest {
    fn from_fields<E: Element>(fields: &[(&'static str, E)]) -> Self {
        let mut request = Self::default();
        for (name, el) in fields {
            let value = el.value();
            match *name {
                "name" => request.name = value,
                "email" => request.email = value,
                "phone" => request.phone = value,
                "hospital" => request.hospital = value,
                "title" => request.title = value,
                "procedures" => request.procedures = value,
                "message" => request.message = value,
                _ => {}
            }
        }
        request
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("could not build contact request: {0}")]
    Request(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {0}")]
    Status(u16),
}

pub type Completion = Box<dyn FnOnce(Result<(), SubmitError>)>;

/// Delivers a contact request and reports back exactly once.
pub trait Submitter {
    fn submit(&self, request: ContactRequest, done: Completion);
}

/// Pretends the request went through after a fixed delay.
pub struct MockSubmitter<T> {
    timers: T,
    latency_ms: u32,
}

impl<T: Timers> MockSubmitter<T> {
    pub fn new(timers: T) -> Self {
        Self { timers, latency_ms: SIMULATED_LATENCY_MS }
    }
}

impl<T: Timers> Submitter for MockSubmitter<T> {
    fn submit(&self, request: ContactRequest, done: Completion) {
        debug!("simulating contact submission for {}", request.email);
        self.timers.after(self.latency_ms, Box::new(move || done(Ok(()))));
    }
}

/// Posts the request as JSON to a real endpoint.
pub struct HttpSubmitter {
    endpoint: String,
}

impl HttpSubmitter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Submitter for HttpSubmitter {
    fn submit(&self, request: ContactRequest, done: Completion) {
        let endpoint = self.endpoint.clone();
        spawn_local(async move {
            done(post_contact(&endpoint, &request).await);
        });
    }
}

/// The submitter a page ends up with: simulated unless an endpoint is configured.
pub enum ContactSubmitter<T> {
    Simulated(MockSubmitter<T>),
    Http(HttpSubmitter),
}

impl<T: Timers> ContactSubmitter<T> {
    pub fn for_endpoint(endpoint: Option<String>, timers: T) -> Self {
        match endpoint {
            Some(url) => {
                info!("contact form posts to {}", url);
                ContactSubmitter::Http(HttpSubmitter::new(url))
            }
            None => ContactSubmitter::Simulated(MockSubmitter::new(timers)),
        }
    }
}

impl<T: Timers> Submitter for ContactSubmitter<T> {
    fn submit(&self, request: ContactRequest, done: Completion) {
        match self {
            ContactSubmitter::Simulated(mock) => mock.submit(request, done),
            ContactSubmitter::Http(http) => http.submit(request, done),
        }
    }
}

async fn post_contact(endpoint: &str, request: &ContactRequest) -> Result<(), SubmitError> {
    let request = Request::post(endpoint)
        .header("Content-Type", "application/json")
        .json(request)
        .map_err(|e| SubmitError::Request(e.to_string()))?;

    let response = request
        .send()
        .await
        .map_err(|e| SubmitError::Network(e.to_string()))?;

    if response.ok() {
        Ok(())
    } else {
        Err(SubmitError::Status(response.status()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Pending,
    Success,
    Failed,
}

pub struct ContactForm<E, T> {
    fields: Vec<(&'static str, E)>,
    button: Option<E>,
    message: Option<E>,
    state: SubmissionState,
    original_label: String,
    // bumped whenever a new message is shown so older hide timers stand down
    shown: u64,
    support_email: String,
    submitter: Rc<dyn Submitter>,
    timers: T,
}

impl<E: Element, T: Timers> ContactForm<E, T> {
    /// Returns the form element alongside the handler, `None` without `#contact-form`.
    pub fn mount<P: Page<Element = E>>(
        page: &P,
        submitter: Rc<dyn Submitter>,
        timers: T,
        support_email: &str,
    ) -> Option<(E, Self)> {
        let form = page.by_id("contact-form")?;
        let fields = FIELD_NAMES
            .iter()
            .filter_map(|name| {
                page.query(&format!("#contact-form [name=\"{}\"]", name))
                    .map(|el| (*name, el))
            })
            .collect();

        let handler = Self {
            fields,
            button: page.query("#contact-form button[type=\"submit\"]"),
            message: page.by_id("form-message"),
            state: SubmissionState::Idle,
            original_label: String::new(),
            shown: 0,
            support_email: support_email.to_string(),
            submitter,
            timers,
        };
        Some((form, handler))
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Starts a submission unless one is already in flight.
    pub fn submit(this: &Rc<RefCell<Self>>) {
        let (request, submitter) = {
            let mut guard = this.borrow_mut();
            let form = &mut *guard;
            if form.state == SubmissionState::Pending {
                debug!("contact form already sending, ignoring submit");
                return;
            }
            form.state = SubmissionState::Pending;

            let request = ContactRequest::from_fields(&form.fields);
            if let Some(button) = &form.button {
                let label = button.text();
                button.set_text(SENDING_LABEL);
                button.set_disabled(true);
                form.original_label = label;
            }
            (request, Rc::clone(&form.submitter))
        };

        info!("submitting contact request");
        let this = Rc::clone(this);
        submitter.submit(request, Box::new(move |result| Self::complete(&this, result)));
    }

    fn complete(this: &Rc<RefCell<Self>>, result: Result<(), SubmitError>) {
        let mut guard = this.borrow_mut();
        let form = &mut *guard;
        form.shown += 1;
        let shown = form.shown;

        match result {
            Ok(()) => {
                info!("contact request delivered");
                form.state = SubmissionState::Success;
                form.show_message("form-message success", SUCCESS_TEXT);
                for (_, field) in &form.fields {
                    field.set_value("");
                }

                let this = Rc::clone(this);
                form.timers.after(
                    MESSAGE_LINGER_MS,
                    Box::new(move || this.borrow().hide_message(shown)),
                );
            }
            Err(e) => {
                warn!("contact request failed: {}", e);
                form.state = SubmissionState::Failed;
                let text = error_text(&form.support_email);
                form.show_message("form-message error", &text);
            }
        }

        if let Some(button) = &form.button {
            button.set_text(&form.original_label);
            button.set_disabled(false);
        }
    }

    fn show_message(&self, class_name: &str, text: &str) {
        if let Some(message) = &self.message {
            message.set_class_name(class_name);
            message.set_text(text);
            message.set_style("display", "");
        }
    }

    fn hide_message(&self, shown: u64) {
        if shown != self.shown {
            return;
        }
        if let Some(message) = &self.message {
            message.set_style("display", "none");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeElement, FakePage, ManualTimers};

    struct Fixture {
        page: FakePage,
        timers: ManualTimers,
        button: FakeElement,
        message: FakeElement,
        fields: Vec<FakeElement>,
    }

    fn fixture() -> Fixture {
        let page = FakePage::new();
        page.insert("#contact-form", FakeElement::new());
        let button = page.insert("#contact-form button[type=\"submit\"]", FakeElement::new().with_text("Request Demo"));
        let message = page.insert("#form-message", FakeElement::new().with_class("form-message"));
        let fields = FIELD_NAMES
            .iter()
            .map(|name| {
                page.insert(
                    &format!("#contact-form [name=\"{}\"]", name),
                    FakeElement::new().with_value(&format!("{} value", name)),
                )
            })
            .collect();
        Fixture { page, timers: ManualTimers::new(), button, message, fields }
    }

    fn mount(fx: &Fixture, submitter: Rc<dyn Submitter>) -> Rc<RefCell<ContactForm<FakeElement, ManualTimers>>> {
        let (_, form) = ContactForm::mount(&fx.page, submitter, fx.timers.clone(), "support@deanware.com")
            .expect("form present");
        Rc::new(RefCell::new(form))
    }

    /// Completes immediately with a canned outcome and remembers what it was sent.
    struct Scripted {
        fail_with: Option<u16>,
        sent: RefCell<Vec<ContactRequest>>,
    }

    impl Submitter for Scripted {
        fn submit(&self, request: ContactRequest, done: Completion) {
            self.sent.borrow_mut().push(request);
            match self.fail_with {
                Some(status) => done(Err(SubmitError::Status(status))),
                None => done(Ok(())),
            }
        }
    }

    #[test]
    fn mock_submission_timeline() {
        let fx = fixture();
        let form = mount(&fx, Rc::new(MockSubmitter::new(fx.timers.clone())));

        ContactForm::submit(&form);
        assert_eq!(form.borrow().state(), SubmissionState::Pending);
        assert!(fx.button.is_disabled());
        assert_eq!(fx.button.text(), SENDING_LABEL);

        fx.timers.advance(1499);
        assert_eq!(form.borrow().state(), SubmissionState::Pending);
        assert_eq!(fx.message.text(), "");

        fx.timers.advance(1);
        assert_eq!(form.borrow().state(), SubmissionState::Success);
        assert_eq!(fx.message.class_name(), "form-message success");
        assert_eq!(fx.message.text(), SUCCESS_TEXT);
        assert_eq!(fx.message.style("display"), "");
        assert!(fx.fields.iter().all(|f| f.value().is_empty()));
        assert!(!fx.button.is_disabled());
        assert_eq!(fx.button.text(), "Request Demo");

        fx.timers.advance(4999);
        assert_eq!(fx.message.style("display"), "");
        fx.timers.advance(1);
        assert_eq!(fx.message.style("display"), "none");
    }

    #[test]
    fn submit_while_pending_is_ignored() {
        let fx = fixture();
        let form = mount(&fx, Rc::new(MockSubmitter::new(fx.timers.clone())));

        ContactForm::submit(&form);
        fx.timers.advance(500);
        ContactForm::submit(&form);
        assert_eq!(fx.timers.pending(), 1);

        fx.timers.advance(1000);
        assert_eq!(form.borrow().state(), SubmissionState::Success);
        assert_eq!(fx.button.text(), "Request Demo");
    }

    #[test]
    fn resubmitting_keeps_the_newer_message_visible() {
        let fx = fixture();
        let form = mount(&fx, Rc::new(MockSubmitter::new(fx.timers.clone())));

        ContactForm::submit(&form);
        fx.timers.advance(1500);
        fx.timers.advance(2000);
        ContactForm::submit(&form);
        fx.timers.advance(1500);

        // first hide timer fires at 6500, second at 10000
        fx.timers.advance(3000);
        assert_eq!(fx.message.style("display"), "");
        fx.timers.advance(2000);
        assert_eq!(fx.message.style("display"), "none");
    }

    #[test]
    fn captured_fields_are_sent() {
        let fx = fixture();
        let submitter = Rc::new(Scripted { fail_with: None, sent: RefCell::new(Vec::new()) });
        let form = mount(&fx, submitter.clone());

        ContactForm::submit(&form);
        let sent = submitter.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].hospital, "hospital value");
        assert_eq!(sent[0].procedures, "procedures value");

        let body = serde_json::to_value(&sent[0]).expect("serializes");
        assert_eq!(body["email"], "email value");
        assert_eq!(body.as_object().map(|o| o.len()), Some(FIELD_NAMES.len()));
    }

    #[test]
    fn failure_shows_error_and_restores_button() {
        let fx = fixture();
        let submitter = Rc::new(Scripted { fail_with: Some(502), sent: RefCell::new(Vec::new()) });
        let form = mount(&fx, submitter);

        ContactForm::submit(&form);
        assert_eq!(form.borrow().state(), SubmissionState::Failed);
        assert_eq!(fx.message.class_name(), "form-message error");
        assert_eq!(fx.message.text(), error_text("support@deanware.com"));
        assert!(fx.message.text().ends_with("support@deanware.com"));
        assert!(!fx.button.is_disabled());
        assert_eq!(fx.button.text(), "Request Demo");
        // the visitor keeps what they typed
        assert_eq!(fx.fields[0].value(), "name value");
        assert_eq!(fx.timers.pending(), 0);

        // and may try again
        ContactForm::submit(&form);
        assert_eq!(form.borrow().state(), SubmissionState::Failed);
    }

    #[test]
    fn missing_button_and_message_are_tolerated() {
        let page = FakePage::new();
        page.insert("#contact-form", FakeElement::new());
        let timers = ManualTimers::new();
        let (_, form) = ContactForm::mount(&page, Rc::new(MockSubmitter::new(timers.clone())), timers.clone(), "x@y.z")
            .expect("form present");
        let form = Rc::new(RefCell::new(form));

        ContactForm::submit(&form);
        timers.advance(10_000);
        assert_eq!(form.borrow().state(), SubmissionState::Success);
    }

    #[test]
    fn no_form_no_handler() {
        let page = FakePage::new();
        let timers = ManualTimers::new();
        assert!(ContactForm::mount(&page, Rc::new(MockSubmitter::new(timers.clone())), timers, "x@y.z").is_none());
    }

    #[test]
    fn submit_error_messages() {
        assert_eq!(SubmitError::Status(500).to_string(), "server responded with status 500");
        assert_eq!(
            SubmitError::Network("offline".into()).to_string(),
            "network error: offline"
        );
    }
}
