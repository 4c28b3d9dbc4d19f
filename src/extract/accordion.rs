use std::collections::HashMap;
use std::time::Duration;

use thirtyfour::prelude::*;
use tokio::time::sleep;
use tracing::debug;

const CONTAINER: &str = "aks-accordion";
const ITEM: &str = "aks-accordion-item";
const ITEM_TITLE: &str = "aks-accordion-item-title";
const ITEM_CONTENT: &str = "aks-accordion-item-content";
const EXPAND_SETTLE: Duration = Duration::from_secs(1);

/// Read the disclosure widget on a detail page into a title → content map.
/// Titles are free text from the page; consumers look up the handful they
/// know about. No widget means an empty map, not an error.
pub async fn read(driver: &WebDriver) -> HashMap<String, String> {
    let container = match driver.find(By::ClassName(CONTAINER)).await {
        Ok(el) => el,
        Err(_) => return HashMap::new(),
    };

    let items = container
        .find_all(By::ClassName(ITEM))
        .await
        .unwrap_or_default();

    let mut details = HashMap::new();
    for item in items {
        let Some(title) = super::text_in(&item, By::ClassName(ITEM_TITLE)).await else {
            continue;
        };

        // Already-open items can reject the click; content is read either way.
        if let Err(e) = item.click().await {
            debug!("accordion item {:?} not clickable: {}", title, e);
        }
        sleep(EXPAND_SETTLE).await;

        let content = match item.find(By::ClassName(ITEM_CONTENT)).await {
            Ok(el) => el.text().await.map(|t| flatten_text(&t)).unwrap_or_default(),
            Err(_) => String::new(),
        };
        details.insert(title, content);
    }
    details
}

/// Accordion copy keeps its internal line breaks; a CSV cell wants one line.
pub fn flatten_text(text: &str) -> String {
    text.trim().replace('\n', " ")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::flatten_text;

    #[test]
    fn newlines_become_spaces() {
        assert_eq!(flatten_text("100% wool\nDry clean only"), "100% wool Dry clean only");
    }

    #[test]
    fn surrounding_whitespace_trimmed() {
        assert_eq!(flatten_text("  Made in Italy \n"), "Made in Italy");
        assert_eq!(flatten_text(""), "");
    }
}
