use std::{fs, time::Duration};

use sitesnap::{
    browser_controller::BrowserController,
    runner::{Runner, RunnerOptions},
    types::SnapStatus,
    utils::{create_random_tmp_folder, screenshot_path},
};

macro_rules! aw {
    ($e:expr) => {
        tokio_test::block_on($e)
    };
}

/*
RUST_LOG=debug cargo test --package sitesnap --test snap -- snapshot_domains --exact --ignored
*/
#[test]
#[ignore = "needs chrome and network"]
fn snapshot_domains() -> anyhow::Result<()> {
    env_logger::init();
    let dir = create_random_tmp_folder()?;
    let input = dir.join("domains.txt");
    fs::write(&input, "example.com\n\nexample.org\n")?;

    let options = RunnerOptions::default_builder()
        .input_file(input)
        .output_csv(dir.join("mapping.csv"))
        .screenshot_dir(dir.join("screenshots"))
        .concurrency(2usize)
        .timeout(15u64)
        .build()?;
    let runner = Runner::new(options)?;
    let summary = aw!(runner.run())?;
    println!("{summary:#?}");

    assert_eq!(summary.total, 2);
    assert!(dir.join("mapping.csv").exists());

    fs::remove_dir_all(dir)?;
    Ok(())
}

/*
A second run over the same directory must resolve entirely from disk.
*/
#[test]
#[ignore = "needs chrome and network"]
fn second_run_skips_captured_domains() -> anyhow::Result<()> {
    env_logger::init();
    let dir = create_random_tmp_folder()?;
    let input = dir.join("domains.txt");
    fs::write(&input, "example.com\n")?;

    let screenshots = dir.join("screenshots");
    fs::create_dir_all(&screenshots)?;
    fs::write(screenshot_path(&screenshots, "example.com"), b"png")?;

    let options = RunnerOptions::default_builder()
        .input_file(input)
        .output_csv(dir.join("mapping.csv"))
        .screenshot_dir(screenshots)
        .concurrency(1usize)
        .timeout(15u64)
        .build()?;
    let runner = Runner::new(options)?;
    let summary = aw!(runner.run())?;

    assert_eq!(summary.total, 1);
    assert_eq!(summary.skipped, 1);

    let csv = fs::read_to_string(dir.join("mapping.csv"))?;
    assert!(csv.contains(SnapStatus::Skipped.as_str()));

    fs::remove_dir_all(dir)?;
    Ok(())
}

#[test]
#[ignore = "needs chrome and network"]
fn capture_single_page() -> anyhow::Result<()> {
    env_logger::init();
    let dir = create_random_tmp_folder()?;

    let browser = BrowserController::new(Duration::from_secs(15))?;
    let dest = screenshot_path(&dir, "example.com");
    browser.capture("https://example.com", &dest)?;
    assert!(dest.exists());

    fs::remove_dir_all(dir)?;
    Ok(())
}
