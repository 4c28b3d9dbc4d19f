use std::time::Duration;

use anyhow::{Context, Result};
use thirtyfour::prelude::*;
use tokio::time::sleep;
use tracing::info;

use crate::config::PageSpec;
use crate::extract::detail;
use crate::sink::CsvSink;

const CATALOG_CONTAINER: &str = "catalogogen";
const PRODUCT_NODE: &str = "contfoto";
const FIRST_LOAD_SETTLE: Duration = Duration::from_secs(3);
const NEXT_PAGE_SETTLE: Duration = Duration::from_secs(2);

/// Rewrite the `page` query parameter, or install one.
pub fn with_page_param(url: &str, page: u32) -> String {
    match url.find("page=") {
        Some(idx) => format!("{}page={}", &url[..idx], page),
        None => {
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{}{}page={}", url, sep, page)
        }
    }
}

/// Walk one listing URL over the pages its spec covers, extracting every
/// product in listing order. A page with no catalog container or no products
/// ends the walk quietly — that is "no more pages", not a job failure.
pub async fn run(driver: &WebDriver, url: &str, pages: PageSpec, sink: &CsvSink) -> Result<()> {
    let (mut current_url, range) = match pages {
        PageSpec::All => (url.to_string(), None),
        PageSpec::Single(page) => (with_page_param(url, page), None),
        PageSpec::Range(start, end) => (with_page_param(url, start), Some((start, end))),
    };

    driver
        .goto(&current_url)
        .await
        .with_context(|| format!("could not load catalog page {}", current_url))?;
    sleep(FIRST_LOAD_SETTLE).await;

    let mut counter = range.map(|(start, _)| start);

    loop {
        let catalog = match driver.find(By::Id(CATALOG_CONTAINER)).await {
            Ok(el) => el,
            Err(_) => {
                info!("no catalog container at {}, stopping", current_url);
                break;
            }
        };
        let products = catalog
            .find_all(By::ClassName(PRODUCT_NODE))
            .await
            .unwrap_or_default();
        if products.is_empty() {
            info!("no more products at {}, stopping", current_url);
            break;
        }

        info!("extracting {} products from {}", products.len(), current_url);
        for node in &products {
            detail::extract_product(driver, node, sink).await;
        }

        let (Some(page), Some((_, end))) = (counter.as_mut(), range) else {
            break; // single-page spec
        };
        *page += 1;
        if *page > end {
            break;
        }
        current_url = with_page_param(&current_url, *page);
        driver
            .goto(&current_url)
            .await
            .with_context(|| format!("could not load catalog page {}", current_url))?;
        sleep(NEXT_PAGE_SETTLE).await;
    }

    Ok(())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_page_param() {
        assert_eq!(
            with_page_param("https://s.example/it/borse.html", 3),
            "https://s.example/it/borse.html?page=3"
        );
    }

    #[test]
    fn appends_when_other_params_present() {
        assert_eq!(
            with_page_param("https://s.example/borse.html?sort=new", 2),
            "https://s.example/borse.html?sort=new&page=2"
        );
    }

    #[test]
    fn rewrites_existing_page_param() {
        let first = with_page_param("https://s.example/borse.html", 1);
        let second = with_page_param(&first, 2);
        assert_eq!(second, "https://s.example/borse.html?page=2");
        // Rewriting again never stacks parameters.
        assert_eq!(with_page_param(&second, 7), "https://s.example/borse.html?page=7");
    }
}
