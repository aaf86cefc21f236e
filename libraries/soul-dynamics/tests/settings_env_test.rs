//! Environment overrides for settings files
//!
//! Kept in its own test binary: the variable is process-wide and would leak
//! into the other settings tests.

use std::fs;

use soul_dynamics::{CompressorSettings, ENV_PREFIX};

#[test]
fn environment_overrides_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("compressor.toml");
    fs::write(&path, "makeup_gain_db = 1.0\nratio = 3.0\n").unwrap();

    std::env::set_var(format!("{}_MAKEUP_GAIN_DB", ENV_PREFIX), "6.0");
    let settings = CompressorSettings::load(&path);
    std::env::remove_var(format!("{}_MAKEUP_GAIN_DB", ENV_PREFIX));

    let settings = settings.unwrap();
    assert_eq!(settings.makeup_gain_db, 6.0);
    assert_eq!(settings.ratio, 3.0);
}
