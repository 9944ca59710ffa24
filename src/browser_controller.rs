use anyhow::{Context, Result};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::Tab;
use headless_chrome::{browser::default_executable, Browser, LaunchOptions};
use rand::Rng;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{Pid, PidExt, ProcessExt, System, SystemExt};

// must outlive the slowest navigation or the browser drops the connection
const IDLE_BROWSER_TIMEOUT_SECS: u64 = 45;

// the viewport the screenshots are rendered at
const WINDOW_SIZE: (u32, u32) = (1280, 800);

pub struct BrowserController {
    browser: Browser,
    nav_timeout: Duration,
}

impl BrowserController {
    pub fn new(nav_timeout: Duration) -> Result<Self> {
        let is_docker = std::env::var("IN_DOCKER").is_ok();
        let options = LaunchOptions::default_builder()
            .path(Some(default_executable().map_err(anyhow::Error::msg)?))
            .window_size(Some(WINDOW_SIZE))
            .idle_browser_timeout(Duration::from_secs(IDLE_BROWSER_TIMEOUT_SECS))
            // warning only do this if in docker env
            .sandbox(!is_docker)
            .build()
            .map_err(anyhow::Error::msg)
            .context("could not build browser launch options")?;
        let browser = Browser::new(options).context("browser launching error")?;

        Ok(BrowserController {
            browser,
            nav_timeout,
        })
    }

    /// Navigates to `url` in a fresh incognito tab and writes a full-page
    /// PNG to `dest`. The tab is closed whether or not the capture worked.
    pub fn capture(&self, url: &str, dest: &Path) -> Result<()> {
        // we create a new incognito window (no context)
        let ctx = self
            .browser
            .new_context()
            .context("could not create incognito context")?;
        let tab = ctx.new_tab().context("could not create new tab")?;
        tab.set_default_timeout(self.nav_timeout);

        let res = self.snap(&tab, url, dest);

        if let Err(e) = tab.close(true) {
            debug!("could not close tab for {}: {}", url, e);
        }

        res
    }

    fn snap(&self, tab: &Arc<Tab>, url: &str, dest: &Path) -> Result<()> {
        tab.navigate_to(url)
            .context(format!("could not navigate to {}", url))?;
        tab.wait_until_navigated()
            .context(format!("navigation to {} did not complete", url))?;

        // we give late resources a moment to paint before capturing
        let settle = {
            let mut rng = rand::thread_rng();
            rng.gen_range(300..800)
        };
        debug!("settling on {} for {}ms", url, settle);
        std::thread::sleep(Duration::from_millis(settle));

        // clipping to the body box model captures the whole page, not just
        // the viewport; pages without a measurable body fall back to the
        // plain viewport shot
        let clip = tab
            .wait_for_element("body")
            .ok()
            .and_then(|body| body.get_box_model().ok())
            .map(|model| model.margin_viewport());

        debug!("taking screenshot of {}", url);
        let png = tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, clip, true)
            .context(format!("screenshot for {} could not be captured", url))?;

        fs::write(dest, png).context(format!("could not save screenshot for {}", url))?;

        Ok(())
    }

    pub fn kill(&self) -> bool {
        let pid = match self.browser.get_process_id() {
            Some(pid) => pid,
            None => return false,
        };
        let s = System::new();
        if let Some(process) = s.process(Pid::from_u32(pid)) {
            debug!("killing process with id {}", pid);
            process.kill();
            return true;
        }
        false
    }
}

impl Drop for BrowserController {
    fn drop(&mut self) {
        debug!("killing browser process...");
        self.kill();
    }
}
