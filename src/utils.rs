use rand::{distributions::Alphanumeric, thread_rng, Rng};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_INPUT_FILE: &str = "domains.txt";
pub const DEFAULT_OUTPUT_CSV: &str = "domain_screenshots.csv";
pub const DEFAULT_SCREENSHOT_DIR: &str = "screenshots";
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

// dots are rewritten so the filename stays flat inside the screenshot dir
pub fn screenshot_filename(domain: &str) -> String {
    format!("{}.png", domain.replace('.', "_"))
}

pub fn screenshot_path(dir: &Path, domain: &str) -> PathBuf {
    dir.join(screenshot_filename(domain))
}

pub fn candidate_urls(domain: &str) -> (String, String) {
    (format!("https://{}", domain), format!("http://{}", domain))
}

pub fn get_random_string(len: i32) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len as usize)
        .map(char::from)
        .collect()
}

pub fn create_random_tmp_folder() -> anyhow::Result<PathBuf> {
    let rand_folder_name: String = get_random_string(11);

    let path = PathBuf::from(format!("/tmp/sitesnap-{}", rand_folder_name));
    fs::create_dir(&path)?;
    Ok(path)
}
