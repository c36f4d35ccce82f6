use log::debug;
use web_sys::Document;

use crate::config::PageConfig;
use crate::error::{PageError, Result};

/// Id to give the main landmark, or `None` when it already has one.
pub fn landmark_id(existing: &str, target: &str) -> Option<String> {
    existing.is_empty().then(|| target.to_string())
}

/// Inserts the skip link as the first child of `<body>` and makes sure the
/// main landmark can be targeted by it.
pub fn install(document: &Document, config: &PageConfig) -> Result<()> {
    let body = document
        .body()
        .ok_or_else(|| PageError::MissingElement("body".to_string()))?;

    let link = document.create_element("a")?;
    link.set_attribute("href", &config.skip_link_href())?;
    link.set_text_content(Some(config.skip_link_text.as_str()));
    link.set_class_name(&config.skip_link_class);
    body.insert_before(&link, body.first_child().as_ref())?;

    let main = document.query_selector("main")?.unwrap_or_else(|| body.into());
    match landmark_id(&main.id(), &config.skip_link_target) {
        Some(id) => main.set_id(&id),
        None => debug!("Main landmark keeps its id `{}`", main.id()),
    }
    Ok(())
}
