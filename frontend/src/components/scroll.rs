use crate::components::nav::NavController;
use crate::dom::{Element, Page};

/// Offset past which the navbar is drawn elevated.
pub const ELEVATION_THRESHOLD: f64 = 100.0;

/// A section counts as reached this many pixels before its top.
pub const SECTION_LEAD: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavbarShadow {
    Resting,
    Elevated,
}

impl NavbarShadow {
    pub fn for_offset(offset: f64) -> Self {
        if offset > ELEVATION_THRESHOLD {
            NavbarShadow::Elevated
        } else {
            NavbarShadow::Resting
        }
    }

    pub fn box_shadow(self) -> &'static str {
        match self {
            NavbarShadow::Resting => "0 2px 10px rgba(0, 0, 0, 0.1)",
            NavbarShadow::Elevated => "0 4px 20px rgba(0, 0, 0, 0.1)",
        }
    }
}

/// Last section, in document order, whose lead-in has been scrolled past.
pub fn active_section<'a, I>(sections: I, offset: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    sections
        .into_iter()
        .filter(|(_, top)| offset >= top - SECTION_LEAD)
        .last()
        .map(|(id, _)| id)
}

pub struct ScrollEffects<E> {
    navbar: Option<E>,
    sections: Vec<E>,
    last_scroll: f64,
}

impl<E: Element> ScrollEffects<E> {
    pub fn mount<P: Page<Element = E>>(page: &P) -> Self {
        Self {
            navbar: page.query(".navbar"),
            sections: page.query_all("section[id]"),
            last_scroll: 0.0,
        }
    }

    pub fn last_scroll(&self) -> f64 {
        self.last_scroll
    }

    /// Applies the navbar shadow and active link for `offset`, returning the
    /// active section id.
    pub fn on_scroll(&mut self, offset: f64, nav: &NavController<E>) -> Option<String> {
        let shadow = NavbarShadow::for_offset(offset);
        if let Some(navbar) = &self.navbar {
            navbar.set_style("box-shadow", shadow.box_shadow());
        }
        self.last_scroll = offset;

        // section positions are read live, layout can shift after load
        let positions: Vec<(String, f64)> = self
            .sections
            .iter()
            .filter_map(|s| s.attribute("id").map(|id| (id, s.offset_top())))
            .collect();
        let active = active_section(positions.iter().map(|(id, top)| (id.as_str(), *top)), offset)
            .map(str::to_string);

        nav.update_active_link(active.as_deref());
        active
    }
}
