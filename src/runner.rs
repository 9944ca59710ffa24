use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        {atomic::AtomicBool, atomic::Ordering},
    },
    time::Duration,
};

use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};

use crate::{
    browser_controller::BrowserController,
    collector::Collector,
    report,
    types::{RunSummary, SnapError},
    utils::{
        DEFAULT_CONCURRENCY, DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_CSV, DEFAULT_SCREENSHOT_DIR,
        DEFAULT_TIMEOUT_SECS,
    },
};

pub struct Runner {
    options: RunnerOptions,
    should_terminate: Arc<AtomicBool>,
}

#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct RunnerOptions {
    // file with one domain per line, blank lines ignored
    #[builder(default = "self.default_input_file()")]
    input_file: PathBuf,
    // csv file the mapping is written to
    #[builder(default = "self.default_output_csv()")]
    output_csv: PathBuf,
    // directory the png files are saved in
    #[builder(default = "self.default_screenshot_dir()")]
    screenshot_dir: PathBuf,
    // total number of concurrently open tabs
    #[builder(default = "DEFAULT_CONCURRENCY")]
    concurrency: usize,
    // navigation timeout in seconds
    #[builder(default = "DEFAULT_TIMEOUT_SECS")]
    timeout: u64,
}

impl RunnerOptions {
    pub fn default_builder() -> RunnerOptionsBuilder {
        RunnerOptionsBuilder::default()
    }
}

impl RunnerOptionsBuilder {
    fn default_input_file(&self) -> PathBuf {
        PathBuf::from(DEFAULT_INPUT_FILE)
    }
    fn default_output_csv(&self) -> PathBuf {
        PathBuf::from(DEFAULT_OUTPUT_CSV)
    }
    fn default_screenshot_dir(&self) -> PathBuf {
        PathBuf::from(DEFAULT_SCREENSHOT_DIR)
    }
}

impl Runner {
    pub fn new(options: RunnerOptions) -> Result<Self> {
        let should_terminate = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(SIGTERM, Arc::clone(&should_terminate))?;
        signal_hook::flag::register(SIGINT, Arc::clone(&should_terminate))?;

        Ok(Runner {
            options,
            should_terminate,
        })
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let domains = read_domains(&self.options.input_file)?;

        info!(
            "snapshotting {} domains with {} concurrent tabs and a {}s navigation timeout",
            domains.len(),
            self.options.concurrency,
            self.options.timeout
        );

        fs::create_dir_all(&self.options.screenshot_dir).context(format!(
            "could not create screenshot directory {:?}",
            self.options.screenshot_dir
        ))?;

        if self.should_terminate.load(Ordering::Relaxed) {
            return Err(SnapError::EarlyTermination.into());
        }

        let browser = Arc::new(
            BrowserController::new(Duration::from_secs(self.options.timeout))
                .context("could not launch browser")?,
        );

        let collector = Collector::new(
            browser,
            self.options.screenshot_dir.clone(),
            self.options.concurrency,
        );
        let records = collector
            .collect(domains, self.should_terminate.clone())
            .await;

        report::write_csv(&self.options.output_csv, &records)?;

        Ok(RunSummary::new(
            &records,
            self.options.output_csv.clone(),
            self.options.screenshot_dir.clone(),
        ))
    }
}

/// The one failure that terminates the whole run: an unreadable domain list.
pub fn read_domains(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .context(format!("could not read domain list at {:?}", path))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::create_random_tmp_folder;

    #[test]
    fn ignores_blank_lines_and_trims() {
        let dir = create_random_tmp_folder().unwrap();
        let input = dir.join("domains.txt");
        fs::write(&input, "example.com\n\n  news.ycombinator.com  \n\t\nexample.org\n").unwrap();

        let domains = read_domains(&input).unwrap();
        assert_eq!(
            domains,
            vec!["example.com", "news.ycombinator.com", "example.org"]
        );

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn duplicates_are_kept() {
        let dir = create_random_tmp_folder().unwrap();
        let input = dir.join("domains.txt");
        fs::write(&input, "example.com\nexample.com\n").unwrap();

        let domains = read_domains(&input).unwrap();
        assert_eq!(domains.len(), 2);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_domain_list_is_an_error() {
        assert!(read_domains(Path::new("/nonexistent/domains.txt")).is_err());
    }
}
