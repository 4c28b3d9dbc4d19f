pub mod accordion;
pub mod detail;
pub mod listing;

use thirtyfour::prelude::*;

// Field lookups return Option: an absent element is data ("this product has
// no such field"), not a failure. Driver-level errors collapse to None too;
// the steps that must not silently degrade check for themselves.

pub(crate) async fn text_in(parent: &WebElement, by: By) -> Option<String> {
    match parent.find(by).await {
        Ok(el) => el.text().await.ok().map(|t| t.trim().to_string()),
        Err(_) => None,
    }
}

pub(crate) async fn attr_in(parent: &WebElement, by: By, name: &str) -> Option<String> {
    match parent.find(by).await {
        Ok(el) => el.attr(name).await.ok().flatten(),
        Err(_) => None,
    }
}

pub(crate) async fn text_at(driver: &WebDriver, by: By) -> Option<String> {
    match driver.find(by).await {
        Ok(el) => el.text().await.ok().map(|t| t.trim().to_string()),
        Err(_) => None,
    }
}
