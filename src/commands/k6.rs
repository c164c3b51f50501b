//! `loadrig k6` command implementation.

use std::path::Path;

use anyhow::Result;

use loadrig::generator::k6;
use loadrig::loadtest::model::TestConfig;

/// Execute the `k6` command: print the k6 translation of a script file.
pub fn execute(script_path: &Path, vus: u32, duration: u64) -> Result<()> {
    let script = super::load_script(script_path)?;
    let config = TestConfig::new(script.id.clone(), vus, duration);
    print!("{}", k6::render(&script, &config));
    Ok(())
}
