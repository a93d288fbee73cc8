use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};

use crate::components::contact_form::{ContactForm, ContactSubmitter, Submitter};
use crate::components::nav::{anchor_scroll_target, NavController};
use crate::components::reveal::{
    play_hero_stats, RevealGroup, StatsEffect, CARD_OPTIONS, CARD_SELECTOR, FADE_IN_UP_CLASS,
    INSTRUMENT_STAGGER, SECTION_OPTIONS,
};
use crate::components::roi_calculator::RoiCalculator;
use crate::components::scroll::ScrollEffects;
use crate::config::SiteConfig;
use crate::dom::{Element, Event, EventKind, IntersectionEntry, Observer, ObserverOptions, Page, Target};
use crate::timers::Timers;

/// Every component wired to one page. Dropping it leaves the listeners in
/// place; `teardown` removes them.
pub struct Site<P: Page, T: Timers> {
    page: P,
    timers: T,
    listeners: Rc<RefCell<Vec<P::Listener>>>,
    observers: Rc<RefCell<Vec<P::Observer>>>,
    nav: Rc<RefCell<NavController<P::Element>>>,
    scroll: Rc<RefCell<ScrollEffects<P::Element>>>,
    calculator: Option<Rc<RoiCalculator<P::Element>>>,
    contact: Option<Rc<RefCell<ContactForm<P::Element, T>>>>,
}

impl<P: Page, T: Timers> Site<P, T> {
    pub fn start(page: P, timers: T, config: &SiteConfig) -> Self {
        let nav = NavController::mount(&page);
        let scroll = ScrollEffects::mount(&page);
        let mut site = Self {
            page,
            timers,
            listeners: Rc::new(RefCell::new(Vec::new())),
            observers: Rc::new(RefCell::new(Vec::new())),
            nav: Rc::new(RefCell::new(nav)),
            scroll: Rc::new(RefCell::new(scroll)),
            calculator: None,
            contact: None,
        };

        site.wire_navigation();
        site.wire_scroll_effects();
        site.wire_calculator();
        site.wire_contact_form(config);
        site.wire_anchor_links();
        site.wire_card_reveal();
        site.wire_tracking_demo();
        site.wire_hero_stats(config.hero_stats);

        info!(
            "site wired: {} listeners, {} observers",
            site.listeners.borrow().len(),
            site.observers.borrow().len()
        );
        site
    }

    pub fn nav(&self) -> &Rc<RefCell<NavController<P::Element>>> {
        &self.nav
    }

    pub fn calculator(&self) -> Option<&Rc<RoiCalculator<P::Element>>> {
        self.calculator.as_ref()
    }

    pub fn contact_form(&self) -> Option<&Rc<RefCell<ContactForm<P::Element, T>>>> {
        self.contact.as_ref()
    }

    /// Detaches every listener and disconnects every observer.
    pub fn teardown(self) {
        for listener in self.listeners.borrow_mut().drain(..) {
            self.page.unlisten(listener);
        }
        for observer in self.observers.borrow_mut().drain(..) {
            observer.disconnect();
        }
        debug!("site torn down");
    }

    fn listen(&self, target: Target<P::Element>, kind: EventKind, handler: impl FnMut(&Event) + 'static) {
        if let Some(listener) = self.page.listen(target, kind, Box::new(handler)) {
            self.listeners.borrow_mut().push(listener);
        }
    }

    fn wire_navigation(&self) {
        let hamburger = self.nav.borrow().hamburger().cloned();
        if let Some(hamburger) = hamburger {
            let nav = Rc::clone(&self.nav);
            self.listen(Target::Element(hamburger), EventKind::Click, move |_| {
                nav.borrow_mut().toggle_menu();
            });
        }

        let links = self.nav.borrow().links().to_vec();
        for link in links {
            let nav = Rc::clone(&self.nav);
            self.listen(Target::Element(link), EventKind::Click, move |_| {
                nav.borrow_mut().close_menu();
            });
        }
    }

    fn wire_scroll_effects(&self) {
        let page = self.page.clone();
        let nav = Rc::clone(&self.nav);
        let scroll = Rc::clone(&self.scroll);
        self.listen(Target::Window, EventKind::Scroll, move |_| {
            let offset = page.scroll_y();
            scroll.borrow_mut().on_scroll(offset, &nav.borrow());
        });
    }

    fn wire_calculator(&mut self) {
        let Some(calculator) = RoiCalculator::mount(&self.page) else {
            debug!("no roi calculator on this page");
            return;
        };
        let calculator = Rc::new(calculator);
        for input in calculator.inputs() {
            let calculator = Rc::clone(&calculator);
            self.listen(Target::Element(input.clone()), EventKind::Input, move |_| {
                calculator.recalculate();
            });
        }
        calculator.recalculate();
        self.calculator = Some(calculator);
    }

    fn wire_contact_form(&mut self, config: &SiteConfig) {
        let submitter: Rc<dyn Submitter> = Rc::new(submitter_for(config, self.timers.clone()));
        let Some((form_el, form)) =
            ContactForm::mount(&self.page, submitter, self.timers.clone(), &config.support_email)
        else {
            debug!("no contact form on this page");
            return;
        };

        let form = Rc::new(RefCell::new(form));
        let submitting = Rc::clone(&form);
        self.listen(Target::Element(form_el), EventKind::Submit, move |event| {
            event.prevent_default();
            ContactForm::submit(&submitting);
        });
        self.contact = Some(form);
    }

    fn wire_anchor_links(&self) {
        for anchor in self.page.query_all("a[href^=\"#\"]") {
            let page = self.page.clone();
            let clicked = anchor.clone();
            self.listen(Target::Element(anchor), EventKind::Click, move |event| {
                event.prevent_default();
                let href = clicked.attribute("href").unwrap_or_default();
                if let Some(top) = anchor_scroll_target(&page, &href) {
                    page.smooth_scroll_to(top);
                }
            });
        }
    }

    fn wire_card_reveal(&self) {
        let page = self.page.clone();
        let observers = Rc::clone(&self.observers);
        let reveal = move || {
            let cards = page.query_all(CARD_SELECTOR);
            if cards.is_empty() {
                return;
            }
            debug!("revealing {} cards on scroll", cards.len());
            let group = RevealGroup::new(cards, |card: &P::Element| card.add_class(FADE_IN_UP_CLASS));
            if let Some(observer) = observe_group(&page, &CARD_OPTIONS, group) {
                observers.borrow_mut().push(observer);
            }
        };

        if self.page.is_loading() {
            let mut reveal = Some(reveal);
            self.listen(Target::Document, EventKind::Ready, move |_| {
                if let Some(reveal) = reveal.take() {
                    reveal();
                }
            });
        } else {
            reveal();
        }
    }

    fn wire_tracking_demo(&self) {
        let Some(demo) = self.page.query(".tracking-demo") else {
            return;
        };
        let page = self.page.clone();
        let timers = self.timers.clone();
        let group = RevealGroup::new(vec![demo], move |_: &P::Element| {
            let items = page.query_all(".tracking-demo .instrument-item");
            INSTRUMENT_STAGGER.play(&items, &timers);
        });
        if let Some(observer) = observe_group(&self.page, &SECTION_OPTIONS, group) {
            self.observers.borrow_mut().push(observer);
        }
    }

    fn wire_hero_stats(&self, effect: StatsEffect) {
        let stats = self.page.query_all(".stat-number");
        if stats.is_empty() {
            return;
        }
        let Some(hero) = self.page.query(".hero") else {
            return;
        };
        let timers = self.timers.clone();
        let group = RevealGroup::new(vec![hero], move |_: &P::Element| {
            play_hero_stats(&stats, effect, &timers);
        });
        if let Some(observer) = observe_group(&self.page, &SECTION_OPTIONS, group) {
            self.observers.borrow_mut().push(observer);
        }
    }
}

/// Picks the contact submitter the configuration asks for.
pub fn submitter_for<T: Timers>(config: &SiteConfig, timers: T) -> ContactSubmitter<T> {
    ContactSubmitter::for_endpoint(config.contact_url(), timers)
}

fn observe_group<P: Page>(
    page: &P,
    options: &ObserverOptions,
    mut group: RevealGroup<P::Element>,
) -> Option<P::Observer> {
    let targets: Vec<P::Element> = group.targets().cloned().collect();
    let observer = page.observe_intersections(
        options,
        Box::new(move |entries: Vec<IntersectionEntry<P::Element>>, observer: &P::Observer| {
            group.handle(entries, observer);
        }),
    )?;
    for target in &targets {
        observer.observe(target);
    }
    Some(observer)
}
