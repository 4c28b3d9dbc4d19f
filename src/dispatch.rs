use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use thirtyfour::WebDriver;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::{PageSpec, Settings};
use crate::paginate;
use crate::session;
use crate::sink::CsvSink;

/// One (URL, page-range) unit of work. Each job gets its own browser session.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub url: String,
    pub pages: PageSpec,
}

pub struct JobStats {
    pub total: usize,
    pub ok: usize,
    pub failed: usize,
}

/// Pair up URLs and page specs into jobs. The URL list is repeated once per
/// collection; mismatched counts are a configuration error and nothing runs.
pub fn build_jobs(
    settings: &Settings,
    urls: &[String],
    pages: &[String],
    n_collections: usize,
) -> Result<Vec<JobSpec>> {
    if n_collections != pages.len() {
        bail!(
            "number of pages and collections do not match: {} pages, {} collections",
            pages.len(),
            n_collections
        );
    }

    let mut full_urls = Vec::with_capacity(urls.len() * n_collections);
    for _ in 0..n_collections {
        full_urls.extend(urls.iter().map(|u| settings.catalog_url(u)));
    }
    if pages.len() != full_urls.len() {
        bail!(
            "the number of collections, pages, and URLs must be the same: {} pages, {} URLs",
            pages.len(),
            full_urls.len()
        );
    }

    full_urls
        .into_iter()
        .zip(pages)
        .map(|(url, spec)| {
            Ok(JobSpec {
                url,
                pages: spec.parse()?,
            })
        })
        .collect()
}

/// Run all jobs through a bounded worker pool. Job failures are logged and
/// counted, never propagated: one bad job must not take its siblings down.
pub async fn run_jobs(
    settings: Settings,
    jobs: Vec<JobSpec>,
    sink: Arc<CsvSink>,
    max_workers: usize,
    job_timeout: Duration,
) -> JobStats {
    let semaphore = Arc::new(Semaphore::new(max_workers));
    let settings = Arc::new(settings);
    let total = jobs.len();
    let mut handles = Vec::with_capacity(total);

    for (i, job) in jobs.into_iter().enumerate() {
        let sem = Arc::clone(&semaphore);
        let settings = Arc::clone(&settings);
        let sink = Arc::clone(&sink);

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            info!("job {}: starting {} ({:?})", i + 1, job.url, job.pages);
            match run_one(&settings, &job, &sink, job_timeout).await {
                Ok(()) => {
                    info!("job {}: finished", i + 1);
                    true
                }
                Err(e) => {
                    warn!("job {} failed: {:#}", i + 1, e);
                    false
                }
            }
        }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await {
            Ok(true) => ok += 1,
            Ok(false) => {}
            Err(e) => error!("job task panicked: {}", e),
        }
    }

    JobStats {
        total,
        ok,
        failed: total - ok,
    }
}

/// One job, end to end, inside its own exclusive browser session. The session
/// is shut down whatever happens; the deadline covers login and pagination
/// but not session startup/teardown.
async fn run_one(
    settings: &Settings,
    job: &JobSpec,
    sink: &CsvSink,
    job_timeout: Duration,
) -> Result<()> {
    let driver = session::connect(settings).await?;

    let result = match tokio::time::timeout(job_timeout, drive_job(&driver, settings, job, sink)).await
    {
        Ok(result) => result,
        Err(_) => Err(anyhow!("job deadline of {:?} exceeded", job_timeout)),
    };

    if let Err(e) = driver.quit().await {
        warn!("could not shut down browser session: {}", e);
    }
    result
}

async fn drive_job(
    driver: &WebDriver,
    settings: &Settings,
    job: &JobSpec,
    sink: &CsvSink,
) -> Result<()> {
    session::login(driver, settings).await?;
    paginate::run(driver, &job.url, job.pages, sink).await
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            supplier_url: "https://supplier.example".into(),
            login: "u".into(),
            password: "p".into(),
            webdriver_url: "http://localhost:9515".into(),
        }
    }

    #[test]
    fn pairs_urls_with_page_specs() {
        let jobs = build_jobs(&settings(), &["it/borse.html".into()], &["1,2".into()], 1).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].url, "https://supplier.example/it/borse.html");
        assert_eq!(jobs[0].pages, PageSpec::Range(1, 2));
    }

    #[test]
    fn page_spec_all_accepted() {
        let jobs = build_jobs(&settings(), &["it/borse.html".into()], &["all".into()], 1).unwrap();
        assert_eq!(jobs[0].pages, PageSpec::All);
    }

    #[test]
    fn repeats_urls_per_collection() {
        let jobs = build_jobs(
            &settings(),
            &["it/borse.html".into()],
            &["1,2".into(), "3,4".into()],
            2,
        )
        .unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].url, jobs[1].url);
        assert_eq!(jobs[1].pages, PageSpec::Range(3, 4));
    }

    #[test]
    fn count_mismatch_is_fatal() {
        assert!(build_jobs(&settings(), &["a".into()], &["1".into(), "2".into()], 1).is_err());
        assert!(build_jobs(&settings(), &["a".into(), "b".into()], &["1".into()], 1).is_err());
    }

    #[test]
    fn bad_page_spec_is_fatal() {
        assert!(build_jobs(&settings(), &["a".into()], &["one".into()], 1).is_err());
    }
}
