/// Integration tests for dirsorter
///
/// These tests drive complete runs against temporary directories.
///
/// Test categories:
/// 1. Flat mode
/// 2. Recursive mode
/// 3. Dry-run mode
/// 4. Configuration and filtering
/// 5. Errors and edge cases
use dirsorter::cli::{CliError, SortOptions, run};
use dirsorter::config::SorterConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary directory with helpers for building and checking file trees.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create an empty file, creating parent directories as needed.
    fn create_file(&self, rel_path: &str) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, rel_path).expect("Failed to write file");
    }

    fn create_files(&self, names: &[&str]) {
        for name in names {
            self.create_file(name);
        }
    }

    /// Create `count` numbered files inside `rel_dir`.
    fn create_numbered_files(&self, rel_dir: &str, prefix: &str, count: usize) {
        for i in 0..count {
            self.create_file(&format!("{rel_dir}/{prefix}{i:04}.rom"));
        }
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_dir(), "Directory should exist: {}", path.display());
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Path should not exist: {}", path.display());
    }

    /// Count regular files directly inside `rel_dir`.
    fn count_files_in(&self, rel_dir: &str) -> usize {
        fs::read_dir(self.path().join(rel_dir))
            .expect("Failed to read directory")
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .count()
    }

    /// Count subdirectories directly inside `rel_dir`.
    fn count_dirs_in(&self, rel_dir: &str) -> usize {
        fs::read_dir(self.path().join(rel_dir))
            .expect("Failed to read directory")
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .count()
    }

    fn options(&self) -> SortOptions {
        SortOptions::new(self.path())
    }

    fn recursive_options(&self, min_files: usize) -> SortOptions {
        let mut options = self.options();
        options.recursive = true;
        options.min_files = min_files;
        options
    }
}

// ============================================================================
// Test Suite 1: Flat Mode
// ============================================================================

#[test]
fn test_flat_mode_sorts_mixed_names() {
    let fixture = TestFixture::new();
    fixture.create_files(&["apple.txt", "Banana.txt", "7z.exe", "_notes.md"]);

    let summary = run(&fixture.options()).expect("run should succeed");

    assert_eq!(summary.files_moved(), 4);
    fixture.assert_file_exists("a/apple.txt");
    fixture.assert_file_exists("b/Banana.txt");
    fixture.assert_file_exists("0-9/7z.exe");
    fixture.assert_file_exists("_others/_notes.md");
    assert_eq!(fixture.count_files_in("."), 0);
}

#[test]
fn test_flat_mode_empty_directory() {
    let fixture = TestFixture::new();

    let summary = run(&fixture.options()).expect("run should succeed");

    assert_eq!(summary.files_moved(), 0);
    assert_eq!(fixture.count_dirs_in("."), 0);
}

#[test]
fn test_flat_mode_does_not_recurse() {
    let fixture = TestFixture::new();
    fixture.create_files(&["roms/mario.sfc", "zelda.sfc"]);

    let summary = run(&fixture.options()).unwrap();

    assert_eq!(summary.files_moved(), 1);
    fixture.assert_file_exists("roms/mario.sfc");
    fixture.assert_file_exists("z/zelda.sfc");
    fixture.assert_not_exists("r/roms");
}

#[test]
fn test_flat_mode_reuses_existing_buckets() {
    let fixture = TestFixture::new();
    fixture.create_files(&["m/metroid.nes", "mario.nes", "Mega Man.nes"]);

    let summary = run(&fixture.options()).unwrap();

    assert_eq!(summary.files_moved(), 2);
    assert_eq!(fixture.count_files_in("m"), 3);
}

#[test]
fn test_flat_mode_unsquashed_digits() {
    let fixture = TestFixture::new();
    fixture.create_files(&["1942.nes", "007.n64", "3 Ninjas.sfc"]);

    let mut options = fixture.options();
    options.squash_digits = false;
    run(&options).unwrap();

    fixture.assert_file_exists("1/1942.nes");
    fixture.assert_file_exists("0/007.n64");
    fixture.assert_file_exists("3/3 Ninjas.sfc");
    fixture.assert_not_exists("0-9");
}

#[test]
fn test_second_run_is_a_no_op() {
    let fixture = TestFixture::new();
    fixture.create_files(&["apple.txt", "Banana.txt"]);

    run(&fixture.options()).unwrap();
    let again = run(&fixture.options()).unwrap();

    assert_eq!(again.files_moved(), 0);
    fixture.assert_file_exists("a/apple.txt");
    fixture.assert_not_exists("a/a");
}

#[test]
fn test_bucket_summary_counts() {
    let fixture = TestFixture::new();
    fixture.create_files(&["alpha", "Beta", "bravo", "9lives"]);

    let summary = run(&fixture.options()).unwrap();
    let counts = summary.bucket_counts();

    assert_eq!(counts.get("a"), Some(&1));
    assert_eq!(counts.get("b"), Some(&2));
    assert_eq!(counts.get("0-9"), Some(&1));
    assert_eq!(counts.get("_others"), None);
}

// ============================================================================
// Test Suite 2: Recursive Mode
// ============================================================================

#[test]
fn test_recursive_cleans_only_large_directories() {
    let fixture = TestFixture::new();
    fixture.create_numbered_files("big", "rom", 6);
    fixture.create_numbered_files("small", "rom", 2);

    let summary = run(&fixture.recursive_options(5)).unwrap();

    assert_eq!(summary.files_moved(), 6);
    let cleaned: Vec<PathBuf> = summary.cleaned_dirs().map(Path::to_path_buf).collect();
    assert_eq!(cleaned, vec![fixture.path().join("big")]);
    assert_eq!(fixture.count_files_in("big/r"), 6);
    assert_eq!(fixture.count_files_in("small"), 2);
}

#[test]
fn test_recursive_root_with_350_files() {
    let fixture = TestFixture::new();
    fixture.create_numbered_files(".", "game", 350);
    fixture.create_numbered_files("extras", "extra", 10);

    let summary = run(&fixture.recursive_options(300)).unwrap();

    let cleaned: Vec<PathBuf> = summary.cleaned_dirs().map(Path::to_path_buf).collect();
    assert_eq!(cleaned, vec![fixture.path().to_path_buf()]);
    assert_eq!(summary.files_moved(), 350);
    assert_eq!(fixture.count_files_in("g"), 350);
    assert_eq!(fixture.count_files_in("extras"), 10);
}

#[test]
fn test_recursive_cleans_deepest_first() {
    let fixture = TestFixture::new();
    fixture.create_numbered_files("nes", "a", 3);
    fixture.create_numbered_files("nes/hacks", "b", 3);

    let summary = run(&fixture.recursive_options(3)).unwrap();

    let cleaned: Vec<PathBuf> = summary.cleaned_dirs().map(Path::to_path_buf).collect();
    assert_eq!(
        cleaned,
        vec![fixture.path().join("nes/hacks"), fixture.path().join("nes")]
    );
    assert_eq!(fixture.count_files_in("nes/hacks/b"), 3);
    assert_eq!(fixture.count_files_in("nes/a"), 3);
}

#[test]
fn test_recursive_rerun_does_not_nest_buckets() {
    let fixture = TestFixture::new();
    fixture.create_numbered_files("snes", "mario", 4);

    run(&fixture.recursive_options(4)).unwrap();
    fixture.assert_dir_exists("snes/m");

    let again = run(&fixture.recursive_options(4)).unwrap();

    assert_eq!(again.files_moved(), 0);
    assert_eq!(again.reports.len(), 0);
    fixture.assert_not_exists("snes/m/m");
    assert_eq!(fixture.count_files_in("snes/m"), 4);
}

// ============================================================================
// Test Suite 3: Dry-Run Mode
// ============================================================================

#[test]
fn test_dry_run_reports_without_moving() {
    let fixture = TestFixture::new();
    fixture.create_files(&["apple.txt", "Banana.txt", "7z.exe", "_notes.md"]);

    let mut options = fixture.options();
    options.dry_run = true;
    let summary = run(&options).unwrap();

    assert_eq!(summary.files_moved(), 4);
    assert_eq!(fixture.count_files_in("."), 4);
    assert_eq!(fixture.count_dirs_in("."), 0);
}

#[test]
fn test_dry_run_recursive() {
    let fixture = TestFixture::new();
    fixture.create_numbered_files("psx", "crash", 5);

    let mut options = fixture.recursive_options(5);
    options.dry_run = true;
    let summary = run(&options).unwrap();

    assert_eq!(summary.files_moved(), 5);
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(fixture.count_files_in("psx"), 5);
    fixture.assert_not_exists("psx/c");
}

#[test]
fn test_dry_run_matches_real_run_on_half_sorted_tree() {
    let layout = ["m/mario.rom", "mario.rom", "z", "zelda.rom", "kirby.rom"];

    let dry_fixture = TestFixture::new();
    dry_fixture.create_files(&layout);
    let mut dry_options = dry_fixture.options();
    dry_options.dry_run = true;
    let dry = run(&dry_options).unwrap();

    let real_fixture = TestFixture::new();
    real_fixture.create_files(&layout);
    let real = run(&real_fixture.options()).unwrap();

    assert_eq!(real.files_moved(), 1);
    assert_eq!(real.failure_count(), 3);
    assert_eq!(dry.files_moved(), real.files_moved());
    assert_eq!(dry.failure_count(), real.failure_count());

    dry_fixture.assert_file_exists("kirby.rom");
    dry_fixture.assert_not_exists("k");
    real_fixture.assert_file_exists("k/kirby.rom");
}

// ============================================================================
// Test Suite 4: Configuration and Filtering
// ============================================================================

#[test]
fn test_config_excludes_are_left_in_place() {
    let fixture = TestFixture::new();
    fixture.create_files(&["mario.sfc", "mario.srm", "Thumbs.db", ".hidden"]);

    let config = SorterConfig::from_toml(
        r#"
        [filters]
        enable_hidden_files = false

        [filters.exclude]
        filenames = ["Thumbs.db"]
        extensions = ["srm"]
        "#,
    )
    .unwrap();

    let mut options = fixture.options();
    options.filters = config.filters.compile().unwrap();
    let summary = run(&options).unwrap();

    assert_eq!(summary.files_moved(), 1);
    fixture.assert_file_exists("m/mario.sfc");
    fixture.assert_file_exists("mario.srm");
    fixture.assert_file_exists("Thumbs.db");
    fixture.assert_file_exists(".hidden");
}

#[test]
fn test_excluded_files_do_not_count_toward_threshold() {
    let fixture = TestFixture::new();
    fixture.create_numbered_files("gb", "pokemon", 3);
    fixture.create_files(&["gb/save1.sav", "gb/save2.sav"]);

    let config =
        SorterConfig::from_toml("[filters.exclude]\nextensions = [\"sav\"]\n").unwrap();
    let mut options = fixture.recursive_options(5);
    options.filters = config.filters.compile().unwrap();

    let summary = run(&options).unwrap();

    assert_eq!(summary.files_moved(), 0);
    assert_eq!(fixture.count_files_in("gb"), 5);
}

// ============================================================================
// Test Suite 5: Errors and Edge Cases
// ============================================================================

#[test]
fn test_missing_root_is_fatal() {
    let fixture = TestFixture::new();
    let options = SortOptions::new(fixture.path().join("missing"));

    let result = run(&options);

    assert!(matches!(result, Err(CliError::Organize(_))));
}

#[test]
fn test_collision_is_reported_and_run_continues() {
    let fixture = TestFixture::new();
    fixture.create_files(&["s/sonic.md", "sonic.md", "tails.md"]);

    let summary = run(&fixture.options()).unwrap();

    assert_eq!(summary.files_moved(), 1);
    assert_eq!(summary.failure_count(), 1);
    fixture.assert_file_exists("sonic.md");
    fixture.assert_file_exists("t/tails.md");
    assert_eq!(
        fs::read_to_string(fixture.path().join("s/sonic.md")).unwrap(),
        "s/sonic.md"
    );
}

#[test]
fn test_file_named_like_bucket() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a", "apple"]);

    let summary = run(&fixture.options()).unwrap();

    assert_eq!(summary.failure_count(), 2);
    fixture.assert_file_exists("a");
    fixture.assert_file_exists("apple");
}

#[test]
fn test_leading_whitespace_names() {
    let fixture = TestFixture::new();
    fixture.create_files(&["  Kirby.gb", " 1up.txt"]);

    run(&fixture.options()).unwrap();

    fixture.assert_file_exists("k/  Kirby.gb");
    fixture.assert_file_exists("0-9/ 1up.txt");
}
