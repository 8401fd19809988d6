// tests/config_hot_reload.rs
//
// Scoring-config loading: the shipped TOML must agree with the compiled
// defaults on the load-bearing thresholds, bad files fall back to defaults,
// and the hot-reload handle picks up mtime changes.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::{fs, thread, time::Duration};

use serial_test::serial;

use recipe_demand_analyzer::config::{
    load_scoring_file, HotReloadConfig, ScoringConfig, ENV_SCORING_CONFIG_PATH,
};

/// Create a unique temporary directory in std::env::temp_dir().
fn unique_tmp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    dir.push(format!("scoring_cfg_test_{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn shipped_config_matches_compiled_defaults() {
    let shipped = load_scoring_file(Path::new("config/scoring.toml"))
        .expect("config/scoring.toml should parse");
    let defaults = ScoringConfig::default();

    assert_eq!(shipped.relevance, defaults.relevance);
    assert_eq!(shipped.quality, defaults.quality);
    assert_eq!(shipped.freshness, defaults.freshness);
    assert_eq!(shipped.barrier, defaults.barrier);
    assert_eq!(shipped.opportunity, defaults.opportunity);
    assert_eq!(shipped.confidence, defaults.confidence);
    assert_eq!(shipped.suggest, defaults.suggest);
    assert_eq!(shipped.gaps, defaults.gaps);
    // The demand section differs only in the float chosen for "any positive
    // growth"; the behavior-bearing fields must agree.
    assert_eq!(shipped.demand.weights_plain, defaults.demand.weights_plain);
    assert_eq!(
        shipped.demand.weights_with_trends,
        defaults.demand.weights_with_trends
    );
    assert_eq!(shipped.demand.band_hot, defaults.demand.band_hot);
    assert_eq!(shipped.demand.band_growing, defaults.demand.band_growing);
    assert_eq!(shipped.demand.band_stable, defaults.demand.band_stable);
}

#[test]
fn unreadable_or_invalid_files_fall_back_to_defaults() {
    assert_eq!(
        ScoringConfig::load_from_file("does/not/exist.toml"),
        ScoringConfig::default()
    );

    let dir = unique_tmp_dir();
    let path = dir.join("broken.toml");
    fs::write(&path, "this is { not toml").unwrap();
    assert_eq!(ScoringConfig::load_from_file(&path), ScoringConfig::default());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
#[serial]
fn env_path_override_and_hot_reload() {
    let dir = unique_tmp_dir();
    let path = dir.join("scoring.toml");
    {
        let mut f = fs::File::create(&path).unwrap();
        write!(f, "[demand]\nband_hot = 80\n").unwrap();
        f.sync_all().unwrap();
    }

    std::env::set_var(ENV_SCORING_CONFIG_PATH, &path);
    let hot = HotReloadConfig::new(None);
    std::env::remove_var(ENV_SCORING_CONFIG_PATH);

    assert_eq!(hot.current().demand.band_hot, 80);
    // Sections missing from the file keep their defaults.
    assert_eq!(hot.current().gaps.min_surviving, 5);

    // Ensure a different mtime (coarse filesystem timestamp granularity).
    thread::sleep(Duration::from_millis(1100));
    {
        let mut f = fs::File::create(&path).unwrap();
        write!(f, "[demand]\nband_hot = 70\n").unwrap();
        f.sync_all().unwrap();
    }

    assert_eq!(hot.current().demand.band_hot, 70);

    let _ = fs::remove_file(&path);
    let _ = fs::remove_dir_all(&dir);
}
