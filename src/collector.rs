use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use futures::StreamExt;
use tokio::{sync::mpsc, task};

use crate::{
    browser_controller::BrowserController,
    types::SnapRecord,
    utils::{candidate_urls, screenshot_path},
};

// a file already on disk means a previous run captured this domain
fn plan_skip(domain: &str, https_url: &str, dest: &Path) -> Option<SnapRecord> {
    if dest.exists() {
        return Some(SnapRecord::skipped(domain, https_url, dest));
    }
    None
}

pub struct Collector {
    browser: Arc<BrowserController>,
    screenshot_dir: PathBuf,
    concurrency: usize,
}

impl Collector {
    pub fn new(
        browser: Arc<BrowserController>,
        screenshot_dir: PathBuf,
        concurrency: usize,
    ) -> Collector {
        Collector {
            browser,
            screenshot_dir,
            concurrency,
        }
    }

    /// Visits every domain with at most `concurrency` tabs in flight and
    /// returns one record per domain, in completion order. Domains still
    /// queued when termination is requested produce no record.
    pub async fn collect(
        &self,
        domains: Vec<String>,
        should_terminate: Arc<AtomicBool>,
    ) -> Vec<SnapRecord> {
        let expected = domains.len();
        let (results_tx, mut results_rx) = mpsc::channel::<SnapRecord>(expected.max(1));

        let browser = self.browser.clone();
        let screenshot_dir = self.screenshot_dir.clone();
        let concurrency = self.concurrency;

        tokio::spawn(async move {
            tokio_stream::iter(domains)
                .for_each_concurrent(concurrency, |domain| {
                    let browser = browser.clone();
                    let screenshot_dir = screenshot_dir.clone();
                    let results_tx = results_tx.clone();
                    let should_terminate = should_terminate.clone();

                    async move {
                        if should_terminate.load(Ordering::Relaxed) {
                            debug!("dropping {} after termination request", domain);
                            return;
                        }
                        let record = Self::snap_domain(browser, screenshot_dir, domain).await;
                        info!("snapshot: {} -> {}", record.domain, record.status);
                        if let Err(e) = results_tx.send(record).await {
                            error!("could not send result to collector channel {}", e);
                        }
                    }
                })
                .await;
        });

        let mut records = Vec::with_capacity(expected);
        while let Some(record) = results_rx.recv().await {
            records.push(record);
        }
        records
    }

    /// Produces exactly one record for `domain` and never fails: any capture
    /// error on both the https and the http attempt reduces to an ERROR row.
    async fn snap_domain(
        browser: Arc<BrowserController>,
        screenshot_dir: PathBuf,
        domain: String,
    ) -> SnapRecord {
        let (https_url, http_url) = candidate_urls(&domain);
        let dest = screenshot_path(&screenshot_dir, &domain);

        if let Some(record) = plan_skip(&domain, &https_url, &dest) {
            debug!("screenshot for {} already on disk", domain);
            return record;
        }

        let fallback = SnapRecord::error(&domain, &http_url);

        let capture = {
            let domain = domain.clone();
            task::spawn_blocking(move || match browser.capture(&https_url, &dest) {
                Ok(()) => SnapRecord::ok(&domain, &https_url, &dest),
                Err(e) => {
                    // fallback to http if https fails
                    warn!("https attempt for {} failed: {:#}", domain, e);
                    match browser.capture(&http_url, &dest) {
                        Ok(()) => SnapRecord::ok(&domain, &http_url, &dest),
                        Err(e) => {
                            warn!("http attempt for {} failed: {:#}", domain, e);
                            SnapRecord::error(&domain, &http_url)
                        }
                    }
                }
            })
        };

        match capture.await {
            Ok(record) => record,
            Err(e) => {
                error!("problem spawning a blocking thread {}", e);
                fallback
            }
        }
    }
}
