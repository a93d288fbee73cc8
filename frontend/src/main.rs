use log::{error, info, Level};

use surgiguard_site::config::SiteConfig;
use surgiguard_site::site::Site;
use surgiguard_site::timers::BrowserTimers;
use surgiguard_site::web::WebPage;

fn greet(support_email: &str) {
    gloo_console::log!("%cSurgiGuard AI", "color: #0066cc; font-size: 24px; font-weight: bold;");
    gloo_console::log!("%cAdvancing surgical safety through AI", "color: #00cc88; font-size: 14px;");
    gloo_console::log!(
        format!("%cInterested in joining our team? Email {}", support_email),
        "color: #666; font-size: 12px;"
    );
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");

    let Some(page) = WebPage::new() else {
        error!("no window or document, nothing to wire");
        return;
    };
    let config = SiteConfig::from_page(&page);

    info!("Starting site script");
    greet(&config.support_email);

    let site = Site::start(page, BrowserTimers, &config);
    // the handlers stay attached for the lifetime of the page
    std::mem::forget(site);
}
