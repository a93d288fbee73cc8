pub mod components {
    pub mod contact_form;
    pub mod nav;
    pub mod reveal;
    pub mod roi_calculator;
    pub mod scroll;
}
pub mod config;
pub mod dom;
pub mod site;
pub mod timers;
pub mod web;

#[cfg(test)]
mod testing;
