use log::{error, info};

use inteldrop_landing::config;

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting landing page enhancements");
    if let Err(err) = inteldrop_landing::start() {
        error!("Could not start landing page enhancements: {}", err);
    }
}
