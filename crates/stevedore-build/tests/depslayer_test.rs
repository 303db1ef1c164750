use std::path::{Path, PathBuf};

use proptest::prelude::*;
use stevedore_build::{DepsLayer, ManifestPatterns, MirrorUpdate, UpdateReason};
use tempfile::TempDir;

fn default_patterns() -> ManifestPatterns {
    ManifestPatterns::new(["Gemfile", "Gemfile.lock", "*.gemspec"]).unwrap()
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn read(root: &Path, relative: &str) -> String {
    std::fs::read_to_string(root.join(relative)).unwrap()
}

/// Run a sync and collect the notices it emitted.
fn sync(root: &Path) -> Vec<MirrorUpdate> {
    let layer = DepsLayer::new(root, "build/depslayer", default_patterns());
    let mut notices = Vec::new();
    let report = layer.sync(|u| notices.push(u.clone())).unwrap();
    assert_eq!(report.updated, notices);
    notices
}

fn sources(notices: &[MirrorUpdate]) -> Vec<PathBuf> {
    notices.iter().map(|n| n.source.clone()).collect()
}

// ── Scenarios ──

#[test]
fn first_sync_mirrors_every_manifest() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a/Gemfile", "X");
    write(tmp.path(), "b/lib.gemspec", "Y");

    let notices = sync(tmp.path());

    assert_eq!(notices.len(), 2);
    assert_eq!(read(tmp.path(), "build/depslayer/a/Gemfile"), "X");
    assert_eq!(read(tmp.path(), "build/depslayer/b/lib.gemspec"), "Y");
    assert!(notices.iter().all(|n| n.reason == UpdateReason::Missing));
}

#[test]
fn second_sync_without_changes_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a/Gemfile", "X");
    write(tmp.path(), "b/lib.gemspec", "Y");
    sync(tmp.path());

    let mirrored = tmp.path().join("build/depslayer/a/Gemfile");
    let before = std::fs::metadata(&mirrored).unwrap().modified().unwrap();

    let notices = sync(tmp.path());

    assert!(notices.is_empty());
    let after = std::fs::metadata(&mirrored).unwrap().modified().unwrap();
    assert_eq!(before, after);
}

#[test]
fn changed_manifest_is_rewritten_once() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a/Gemfile", "X");
    write(tmp.path(), "b/lib.gemspec", "Y");
    sync(tmp.path());

    write(tmp.path(), "a/Gemfile", "X2");
    let notices = sync(tmp.path());

    assert_eq!(sources(&notices), vec![PathBuf::from("a/Gemfile")]);
    assert_eq!(notices[0].reason, UpdateReason::Changed);
    assert_eq!(read(tmp.path(), "build/depslayer/a/Gemfile"), "X2");
    assert_eq!(read(tmp.path(), "build/depslayer/b/lib.gemspec"), "Y");
}

#[test]
fn tampered_copy_is_restored() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "Gemfile.lock", "GEM\n  specs:\n");
    sync(tmp.path());

    write(tmp.path(), "build/depslayer/Gemfile.lock", "stale");
    let notices = sync(tmp.path());

    assert_eq!(notices.len(), 1);
    assert_eq!(read(tmp.path(), "build/depslayer/Gemfile.lock"), "GEM\n  specs:\n");
}

// ── Scan rules ──

#[test]
fn mirror_directory_is_never_rescanned() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "Gemfile", "root");
    sync(tmp.path());
    sync(tmp.path());

    assert!(!tmp.path().join("build/depslayer/build").exists());

    let layer = DepsLayer::new(tmp.path(), "build/depslayer", default_patterns());
    assert_eq!(layer.manifests().unwrap(), vec![PathBuf::from("Gemfile")]);
}

#[test]
fn non_manifest_files_are_ignored() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "Gemfile", "g");
    write(tmp.path(), "app/models/user.rb", "class User; end");
    write(tmp.path(), "Gemfile.local", "nope");
    write(tmp.path(), "README.md", "# hi");

    let notices = sync(tmp.path());

    assert_eq!(sources(&notices), vec![PathBuf::from("Gemfile")]);
    assert!(!tmp.path().join("build/depslayer/Gemfile.local").exists());
    assert!(!tmp.path().join("build/depslayer/app").exists());
}

#[test]
fn hidden_directories_are_skipped() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), ".bundle/Gemfile", "hidden");
    write(tmp.path(), "engines/core/core.gemspec", "spec");

    let notices = sync(tmp.path());

    assert_eq!(
        sources(&notices),
        vec![PathBuf::from("engines/core/core.gemspec")]
    );
}

#[test]
fn notices_name_source_and_destination() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a/Gemfile", "X");

    let notices = sync(tmp.path());

    assert_eq!(
        notices[0].to_string(),
        format!(
            "Update: {} -> {}",
            Path::new("a/Gemfile").display(),
            Path::new("build/depslayer/a/Gemfile").display()
        )
    );
}

#[test]
fn stale_copies_are_not_pruned() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "old/Gemfile", "old");
    sync(tmp.path());

    std::fs::remove_dir_all(tmp.path().join("old")).unwrap();
    let notices = sync(tmp.path());

    assert!(notices.is_empty());
    assert_eq!(read(tmp.path(), "build/depslayer/old/Gemfile"), "old");
}

#[test]
fn mirror_directory_is_created_even_without_manifests() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "src/main.rb", "puts 1");

    let layer = DepsLayer::new(tmp.path(), "build/depslayer", default_patterns());
    let report = layer.sync(|_| {}).unwrap();

    assert_eq!(report.scanned(), 0);
    assert!(report.is_fresh());
    assert!(tmp.path().join("build/depslayer").is_dir());
}

#[test]
fn custom_mirror_directory_and_patterns() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "web/package.json", "{}");
    write(tmp.path(), "web/Gemfile", "ignored");

    let patterns = ManifestPatterns::new(["package.json"]).unwrap();
    let layer = DepsLayer::new(tmp.path(), "docker/deps", patterns);
    let report = layer.sync(|_| {}).unwrap();

    assert_eq!(report.updated.len(), 1);
    assert_eq!(
        report.updated[0].destination,
        Path::new("docker/deps").join("web/package.json")
    );
    assert_eq!(read(tmp.path(), "docker/deps/web/package.json"), "{}");
}

#[test]
fn filesystem_errors_abort_the_sync() {
    let tmp = TempDir::new().unwrap();
    let not_a_dir = tmp.path().join("checkout");
    std::fs::write(&not_a_dir, "plain file").unwrap();

    let layer = DepsLayer::new(&not_a_dir, "build/depslayer", default_patterns());
    let err = layer.sync(|_| {}).unwrap_err();

    assert!(err.to_string().contains("failed to create directory"));
}

#[cfg(unix)]
#[test]
fn symlinked_manifest_is_mirrored_with_target_bytes() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "shared/common.lock", "GEM");
    std::fs::create_dir_all(tmp.path().join("app")).unwrap();
    std::os::unix::fs::symlink("../shared/common.lock", tmp.path().join("app/Gemfile.lock"))
        .unwrap();

    let notices = sync(tmp.path());

    assert_eq!(sources(&notices), vec![PathBuf::from("app/Gemfile.lock")]);
    let mirrored = tmp.path().join("build/depslayer/app/Gemfile.lock");
    assert!(!std::fs::symlink_metadata(&mirrored).unwrap().file_type().is_symlink());
    assert_eq!(read(tmp.path(), "build/depslayer/app/Gemfile.lock"), "GEM");

    assert!(sync(tmp.path()).is_empty());
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_descended() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "vendor/engine/Gemfile", "engine");
    std::os::unix::fs::symlink("vendor/engine", tmp.path().join("engine-link")).unwrap();

    let notices = sync(tmp.path());

    assert_eq!(sources(&notices), vec![PathBuf::from("vendor/engine/Gemfile")]);
    assert!(!tmp.path().join("build/depslayer/engine-link").exists());
}

#[cfg(unix)]
#[test]
fn dangling_symlink_is_ignored() {
    let tmp = TempDir::new().unwrap();
    std::os::unix::fs::symlink("missing.lock", tmp.path().join("Gemfile.lock")).unwrap();

    let notices = sync(tmp.path());

    assert!(notices.is_empty());
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_manifest_name_is_still_mirrored() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tmp = TempDir::new().unwrap();
    let name = OsStr::from_bytes(b"lib\xff.gemspec");
    std::fs::create_dir_all(tmp.path().join("gems")).unwrap();
    std::fs::write(tmp.path().join("gems").join(name), "spec").unwrap();

    let notices = sync(tmp.path());

    assert_eq!(sources(&notices), vec![Path::new("gems").join(name)]);
    let copy = tmp.path().join("build/depslayer/gems").join(name);
    assert_eq!(std::fs::read(copy).unwrap(), b"spec");
}

// ── Properties ──

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_manifest_gets_a_byte_identical_copy(
        dirs in proptest::collection::vec("[a-z]{1,8}", 1..5),
        content in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let tmp = TempDir::new().unwrap();
        for dir in &dirs {
            let path = tmp.path().join(dir).join("Gemfile.lock");
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, &content).unwrap();
        }

        let layer = DepsLayer::new(tmp.path(), "build/depslayer", default_patterns());
        layer.sync(|_| {}).unwrap();

        for dir in &dirs {
            let copy = std::fs::read(
                tmp.path().join("build/depslayer").join(dir).join("Gemfile.lock"),
            ).unwrap();
            prop_assert_eq!(&copy, &content);
        }

        let again = layer.sync(|_| {}).unwrap();
        prop_assert!(again.is_fresh());
    }
}
