use thirtyfour::prelude::*;

use super::{attr_in, text_in};
use crate::record::strip_vendor;

// One listing card carries a span with structured data attributes plus a
// season badge and the link to the product's own page.
const DATA_SPAN: &str = "span[data-tema]";
const COLLECTION_BADGE: &str = "bollinostagione";
const DETAIL_LINK: &str = ".cotienifoto a";

/// The cheap fields, read straight off a catalog listing node.
#[derive(Debug, Default)]
pub struct ListingFields {
    pub vendor: Option<String>,
    pub raw_name: Option<String>,
    pub product_type: Option<String>,
    pub color: Option<String>,
    pub collection: Option<String>,
    pub detail_url: Option<String>,
}

impl ListingFields {
    pub async fn read(node: &WebElement) -> Self {
        Self {
            vendor: attr_in(node, By::Css(DATA_SPAN), "data-tema").await,
            raw_name: attr_in(node, By::Css(DATA_SPAN), "data-name").await,
            product_type: attr_in(node, By::Css(DATA_SPAN), "data-category3").await,
            color: attr_in(node, By::Css(DATA_SPAN), "data-variant").await,
            collection: text_in(node, By::ClassName(COLLECTION_BADGE)).await,
            detail_url: attr_in(node, By::Css(DETAIL_LINK), "href").await,
        }
    }

    /// Listing name with the vendor prefix stripped off.
    pub fn sku(&self) -> String {
        strip_vendor(
            self.raw_name.as_deref().unwrap_or(""),
            self.vendor.as_deref().unwrap_or(""),
        )
    }
}
