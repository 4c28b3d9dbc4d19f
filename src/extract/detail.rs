use std::time::Duration;

use anyhow::Result;
use thirtyfour::prelude::*;
use thirtyfour::WindowHandle;
use tracing::{debug, warn};

use super::{accordion, attr_in, listing::ListingFields, text_at};
use crate::record::{self, ProductRecord};
use crate::session;
use crate::sink::CsvSink;

// Every detail page renders this block; without it the template never loaded.
const DETAIL_ANCHOR: &str = "bloccoh1";
const DETAIL_ANCHOR_TIMEOUT: Duration = Duration::from_secs(2);
const POLL: Duration = Duration::from_millis(250);

const PRICE: &str = "#prezzidettaglioprezzoxx span.saldi";
const DISCOUNTED_PRICE: &str = "#prezzidettaglioprezzoxx span.saldi2.saldiproduct";
const SIZE_OPTION: &str = "div.tagliamobileform";
// nth-of-type, not nth-child: the gallery is the third div child and other
// element kinds can sit between the divs.
const GALLERY: &str = "#bloccofotodett > div:nth-of-type(3)";
const GALLERY_ITEM: &str = "dettagli";
const VENDOR_HEADING: &str = "//div[@id='bloccoh1']/h1/a";
const TITLE_XPATH: &str = "//*[@id='bloccoh1']/p/font/font";
const TITLE_CSS: &str = "#bloccoh1 > p > font > font";

const SECTION_DESCRIPTION: &str = "Description";
const SECTION_SIZE_AND_FIT: &str = "Size & Fit";
const SECTION_MADE_IN: &str = "Made in";
const SECTION_COMPOSITION: &str = "Composition";
const SECTION_TISSUE: &str = "Tissue";

/// A product tab opened next to the catalog tab. Both window handles are held
/// explicitly so focus always returns to the catalog, pass or fail — no
/// guessing at window-list indices.
pub struct DetailView {
    catalog: WindowHandle,
    detail: WindowHandle,
}

impl DetailView {
    pub async fn open(driver: &WebDriver, url: &str) -> Result<Self> {
        let catalog = driver.window().await?;
        let detail = driver.new_tab().await?;
        driver.switch_to_window(detail.clone()).await?;
        let view = Self { catalog, detail };
        if let Err(e) = driver.goto(url).await {
            let _ = view.close(driver).await;
            return Err(e.into());
        }
        Ok(view)
    }

    /// Close the detail tab and hand focus back to the catalog tab.
    pub async fn close(self, driver: &WebDriver) -> Result<()> {
        driver.switch_to_window(self.detail).await?;
        driver.close_window().await?;
        driver.switch_to_window(self.catalog).await?;
        Ok(())
    }
}

/// Extract one catalog listing into one CSV row. This is the product-level
/// failure boundary: a failed product is logged (with the error) and skipped,
/// the detail tab is closed, and the next product proceeds.
pub async fn extract_product(driver: &WebDriver, node: &WebElement, sink: &CsvSink) {
    let fields = ListingFields::read(node).await;

    let Some(detail_url) = fields.detail_url.clone() else {
        warn!("listing {:?} has no detail link, skipping", fields.raw_name);
        return;
    };

    let view = match DetailView::open(driver, &detail_url).await {
        Ok(view) => view,
        Err(e) => {
            warn!("could not open detail page {}: {:#}", detail_url, e);
            return;
        }
    };

    let extracted = read_detail_page(driver, &fields).await;

    if let Err(e) = view.close(driver).await {
        warn!("could not close detail tab for {}: {:#}", detail_url, e);
    }

    if let Some(product) = extracted {
        match sink.append(&product).await {
            Ok(()) => debug!("appended row for {}", product.sku),
            Err(e) => warn!("could not append row for {}: {:#}", product.sku, e),
        }
    }
}

/// The per-field walk over the detail page. Runs with the detail tab focused;
/// returns None when the product must be abandoned (page never rendered, or
/// the authoritative vendor heading is missing).
async fn read_detail_page(driver: &WebDriver, fields: &ListingFields) -> Option<ProductRecord> {
    if driver
        .query(By::Id(DETAIL_ANCHOR))
        .wait(DETAIL_ANCHOR_TIMEOUT, POLL)
        .first()
        .await
        .is_err()
    {
        warn!("detail page never rendered, abandoning {:?}", fields.raw_name);
        return None;
    }

    session::translate_page(driver).await;

    // Items with a single displayed price render neither span; both cells
    // stay empty then.
    let (price, discounted_price) = match (
        text_at(driver, By::Css(PRICE)).await,
        text_at(driver, By::Css(DISCOUNTED_PRICE)).await,
    ) {
        (Some(price), Some(discounted)) => (price, discounted),
        _ => (String::new(), String::new()),
    };

    let mut sizes = Vec::new();
    for el in driver
        .find_all(By::Css(SIZE_OPTION))
        .await
        .unwrap_or_default()
    {
        if let Ok(text) = el.text().await {
            sizes.push(text.trim().to_string());
        }
    }
    let size = record::join_sizes(&sizes);

    // Secondary gallery; hero-only products have no such container.
    let images = match driver.find(By::Css(GALLERY)).await {
        Ok(container) => {
            let mut urls = Vec::new();
            for item in container
                .find_all(By::ClassName(GALLERY_ITEM))
                .await
                .unwrap_or_default()
            {
                if let Some(href) = attr_in(&item, By::Tag("a"), "href").await {
                    urls.push(href);
                }
            }
            urls.join(",")
        }
        Err(_) => String::new(),
    };

    // The detail heading is the authoritative vendor; without it the page is
    // not trustworthy enough to emit a row.
    let Some(vendor) = text_at(driver, By::XPath(VENDOR_HEADING)).await else {
        warn!("vendor heading missing, abandoning {:?}", fields.raw_name);
        return None;
    };

    let details = accordion::read(driver).await;

    // Same element, alternate lookup: some renders only resolve via CSS.
    let title = match text_at(driver, By::XPath(TITLE_XPATH)).await {
        Some(title) => title,
        None => text_at(driver, By::Css(TITLE_CSS)).await.unwrap_or_default(),
    };

    let product_type = fields.product_type.clone().unwrap_or_default();
    let color = fields.color.clone().unwrap_or_default();
    let collection = fields.collection.clone().unwrap_or_default();

    Some(ProductRecord {
        sku: fields.sku(),
        title,
        tags: record::build_tags(&product_type, &color, &collection),
        product_type,
        vendor,
        price,
        discounted_price,
        collection,
        color,
        size,
        images,
        description: details.get(SECTION_DESCRIPTION).cloned(),
        size_and_fit: details.get(SECTION_SIZE_AND_FIT).cloned(),
        made_in: details.get(SECTION_MADE_IN).cloned(),
        composition: details.get(SECTION_COMPOSITION).cloned(),
        tissue: details.get(SECTION_TISSUE).cloned(),
    })
}

// ── Tests ──
