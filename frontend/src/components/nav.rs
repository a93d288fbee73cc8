use log::debug;

use crate::dom::{Element, Page};

pub const ACTIVE_CLASS: &str = "active";

/// Fixed navbar height the anchor scroller keeps clear of.
pub const NAVBAR_CLEARANCE: f64 = 80.0;

pub struct NavController<E> {
    menu: Option<E>,
    hamburger: Option<E>,
    links: Vec<E>,
    section_links: Vec<E>,
    open: bool,
}

impl<E: Element> NavController<E> {
    pub fn mount<P: Page<Element = E>>(page: &P) -> Self {
        let nav = Self {
            menu: page.query(".nav-menu"),
            hamburger: page.query(".hamburger"),
            links: page.query_all(".nav-menu a"),
            section_links: page.query_all(".nav-menu a[href^=\"#\"]"),
            open: false,
        };
        debug!(
            "nav mounted: menu={} hamburger={} links={}",
            nav.menu.is_some(),
            nav.hamburger.is_some(),
            nav.links.len()
        );
        nav
    }

    pub fn hamburger(&self) -> Option<&E> {
        self.hamburger.as_ref()
    }

    pub fn links(&self) -> &[E] {
        &self.links
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle_menu(&mut self) {
        self.open = !self.open;
        self.sync_menu();
    }

    pub fn close_menu(&mut self) {
        self.open = false;
        self.sync_menu();
    }

    // menu and icon always carry the same marker
    fn sync_menu(&self) {
        for el in self.menu.iter().chain(self.hamburger.iter()) {
            if self.open {
                el.add_class(ACTIVE_CLASS);
            } else {
                el.remove_class(ACTIVE_CLASS);
            }
        }
    }

    pub fn update_active_link(&self, active_section: Option<&str>) {
        let wanted = active_section.map(|id| format!("#{}", id));
        for link in &self.section_links {
            link.remove_class(ACTIVE_CLASS);
            if wanted.is_some() && link.attribute("href") == wanted {
                link.add_class(ACTIVE_CLASS);
            }
        }
    }
}

/// Where a click on an in-page anchor should scroll to, if anywhere.
pub fn anchor_scroll_target<P: Page>(page: &P, href: &str) -> Option<f64> {
    if !href.starts_with('#') || href.len() < 2 {
        return None;
    }
    page.query(href).map(|target| target.offset_top() - NAVBAR_CLEARANCE)
}
