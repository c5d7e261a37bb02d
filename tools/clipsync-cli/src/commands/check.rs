//! Check system capabilities.

use clipsync_capture_engine::capabilities::{
    all_required_available, check_capabilities, print_capability_report,
};

use crate::app::App;

pub fn run(app: &App) -> anyhow::Result<()> {
    println!("ClipSync System Check");
    println!("{}", "=".repeat(50));
    println!(
        "[OK] Config file: {}",
        clipsync_common::config::config_file_path().display()
    );
    println!("[OK] Data directory: {}", app.config.data_dir.display());
    if app.is_signed_in() {
        println!("[OK] Signed in");
    } else {
        println!("[WARN] Not signed in; run `clipsync login` before uploading");
    }

    let capabilities = check_capabilities(&app.config.capture);
    println!();
    print_capability_report(&capabilities);

    println!();
    if all_required_available(&capabilities) {
        println!("All required capabilities are available. ClipSync is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}
