use std::str::FromStr;

use anyhow::{bail, Context, Result};

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Everything a job needs to reach the supplier site, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub supplier_url: String,
    pub login: String,
    pub password: String,
    pub webdriver_url: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let supplier_url = std::env::var("SUPPLIER_URL")
            .context("SUPPLIER_URL environment variable must be set")?;
        let login =
            std::env::var("LOGIN").context("LOGIN environment variable must be set")?;
        let password =
            std::env::var("PASSWORD").context("PASSWORD environment variable must be set")?;
        let webdriver_url = std::env::var("WEBDRIVER_URL")
            .unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string());

        Ok(Self {
            supplier_url,
            login,
            password,
            webdriver_url,
        })
    }

    pub fn login_url(&self) -> String {
        format!("{}/it/register.html", self.supplier_url)
    }

    /// Absolute catalog URL for a path given on the command line.
    pub fn catalog_url(&self, path: &str) -> String {
        format!("{}/{}", self.supplier_url, path)
    }
}

/// Which catalog pages one job covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSpec {
    /// The bare listing URL, loaded once.
    All,
    /// One numbered page.
    Single(u32),
    /// Inclusive page range, e.g. "1,5".
    Range(u32, u32),
}

impl FromStr for PageSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        if let Some((start, end)) = s.split_once(',') {
            let start: u32 = start
                .trim()
                .parse()
                .with_context(|| format!("invalid page range start in {:?}", s))?;
            let end: u32 = end
                .trim()
                .parse()
                .with_context(|| format!("invalid page range end in {:?}", s))?;
            if start > end {
                bail!("page range start {} is past end {}", start, end);
            }
            return Ok(Self::Range(start, end));
        }
        let page: u32 = s
            .parse()
            .with_context(|| format!("invalid page spec {:?}", s))?;
        Ok(Self::Single(page))
    }
}

// ── Tests ──
