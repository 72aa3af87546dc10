//! End-to-end tests for undo runs.

mod common;
use common::prelude::*;

#[test]
fn test_undo_restores_names_and_removes_backup() {
    let fixture = TestFixture::new().with_files(&["No Pressure (2021) S1.E1.1080p.mkv"]);

    fixture
        .command()
        .args(["-f", r".*E(\d+).*", "-r", "$1", "-e", "-x"])
        .assert()
        .success();
    fixture.child("1.mkv").assert(predicate::path::exists());
    assert_eq!(fixture.backup_count(), 1);

    fixture.command().args(["-u", "-x"]).assert().success();

    fixture
        .child("No Pressure (2021) S1.E1.1080p.mkv")
        .assert("No Pressure (2021) S1.E1.1080p.mkv");
    fixture.child("1.mkv").assert(predicate::path::missing());
    assert_eq!(fixture.backup_count(), 0);
}

#[test]
fn test_undo_dry_run_keeps_backup() {
    let fixture = TestFixture::new().with_files(&["a.txt"]);

    fixture
        .command()
        .args(["-f", "a", "-r", "b", "-x"])
        .assert()
        .success();

    fixture
        .command()
        .arg("-u")
        .assert()
        .success()
        .stdout(predicate::str::contains("b.txt"))
        .stdout(predicate::str::contains("Commit the above changes"));

    fixture.child("b.txt").assert(predicate::path::exists());
    assert_eq!(fixture.backup_count(), 1);
}

#[test]
fn test_undo_without_backup_fails() {
    let fixture = TestFixture::new().with_files(&["a.txt"]);

    fixture
        .command()
        .args(["-u", "-x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to undo"));
}

#[test]
fn test_undo_twice_fails_the_second_time() {
    let fixture = TestFixture::new().with_files(&["a.txt"]);

    fixture
        .command()
        .args(["-f", "a", "-r", "b", "-x"])
        .assert()
        .success();
    fixture.command().args(["-u", "-x"]).assert().success();
    fixture.command().args(["-u", "-x"]).assert().failure();

    fixture.child("a.txt").assert(predicate::path::exists());
}

#[test]
fn test_undo_include_dir_chain() {
    let fixture = TestFixture::new().with_files(&["photos/photos-1.jpg"]);

    fixture
        .command()
        .args(["-f", "photos", "-r", "pictures", "-R", "-d", "-x"])
        .assert()
        .success();
    fixture
        .child("pictures/pictures-1.jpg")
        .assert("photos/photos-1.jpg");

    fixture.command().args(["-u", "-x"]).assert().success();

    fixture
        .child("photos/photos-1.jpg")
        .assert("photos/photos-1.jpg");
    fixture.child("pictures").assert(predicate::path::missing());
}

#[test]
fn test_undo_is_scoped_to_working_directory() {
    let first = TestFixture::new().with_files(&["a.txt"]);
    let second = TestFixture::new().with_files(&["a.txt"]);

    first
        .command()
        .args(["-f", "a", "-r", "b", "-x"])
        .assert()
        .success();

    // Same data directory, different working directory
    second
        .command()
        .env("F2_DATA_DIR", first.data_path())
        .args(["-u", "-x"])
        .assert()
        .failure();

    first.child("b.txt").assert(predicate::path::exists());
}
