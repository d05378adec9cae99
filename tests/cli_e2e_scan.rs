//! End-to-end tests for the scan pipeline against local directory targets.

mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Build the two-repository scenario: repo1 has two commits by Alice,
/// repo2 has one commit by Bob and one commit with a blank author email.
fn two_repo_fixture() -> assert_fs::TempDir {
    let temp = assert_fs::TempDir::new().unwrap();
    let repo1 = temp.child("repo1");
    let repo2 = temp.child("repo2");
    repo1.create_dir_all().unwrap();
    repo2.create_dir_all().unwrap();
    common::init_repo(repo1.path());
    common::init_repo(repo2.path());
    common::commit(repo1.path(), "a@x.com", "Alice", "one");
    common::commit(repo1.path(), "a@x.com", "Alice", "two");
    common::commit(repo2.path(), "b@x.com", "Bob", "one");
    common::commit_without_email(repo2.path(), "Anonymous", "no email");
    temp
}

/// Default filtering collapses the four raw records to two merged rows,
/// sorted by email.
#[test]
fn test_default_scan_merges_and_filters() {
    let temp = two_repo_fixture();
    let out = assert_fs::TempDir::new().unwrap();
    let out_file = out.child("authors.txt");

    let mut cmd = cargo_bin_cmd!("authorscan");
    cmd.arg(temp.path())
        .arg("--output")
        .arg(out_file.path())
        .assert()
        .code(0);

    out_file.assert("email,names\na@x.com,Alice\nb@x.com,Bob\n");
}

/// Raw mode keeps the blank-email record as a blank-email row: three rows,
/// only exact-duplicate dedupe applied.
#[test]
fn test_raw_scan_preserves_blank_email() {
    let temp = two_repo_fixture();
    let out = assert_fs::TempDir::new().unwrap();
    let out_file = out.child("authors.txt");

    let mut cmd = cargo_bin_cmd!("authorscan");
    cmd.arg(temp.path())
        .arg("--raw")
        .arg("--output")
        .arg(out_file.path())
        .assert()
        .code(0);

    out_file.assert("email,names\n,Anonymous\na@x.com,Alice\nb@x.com,Bob\n");
}

/// --no-name leaves only the email column and merges on email equality.
#[test]
fn test_no_name_scan_emits_emails_only() {
    let temp = two_repo_fixture();
    let out = assert_fs::TempDir::new().unwrap();
    let out_file = out.child("authors.txt");

    let mut cmd = cargo_bin_cmd!("authorscan");
    cmd.arg(temp.path())
        .arg("--no-name")
        .arg("--output")
        .arg(out_file.path())
        .assert()
        .code(0);

    out_file.assert("email\na@x.com\nb@x.com\n");
}

/// --no-email leaves only the name column; the built-in filters still
/// judge the underlying emails, so the blank-email record is dropped.
#[test]
fn test_no_email_scan_emits_names_only() {
    let temp = two_repo_fixture();
    let out = assert_fs::TempDir::new().unwrap();
    let out_file = out.child("authors.txt");

    let mut cmd = cargo_bin_cmd!("authorscan");
    cmd.arg(temp.path())
        .arg("--no-email")
        .arg("--output")
        .arg(out_file.path())
        .assert()
        .code(0);

    out_file.assert("names\nAlice\nBob\n");
}

/// User-supplied literal patterns exclude matching records.
#[test]
fn test_user_filter_pattern_excludes_record() {
    let temp = two_repo_fixture();
    let out = assert_fs::TempDir::new().unwrap();
    let out_file = out.child("authors.txt");

    let mut cmd = cargo_bin_cmd!("authorscan");
    cmd.arg(temp.path())
        .arg("--filter")
        .arg("b@x.com")
        .arg("--output")
        .arg(out_file.path())
        .assert()
        .code(0);

    out_file.assert("email,names\na@x.com,Alice\n");
}

/// Case-differing author emails merge into one record with both names.
#[test]
fn test_case_insensitive_merge_across_repositories() {
    let temp = assert_fs::TempDir::new().unwrap();
    let repo1 = temp.child("repo1");
    let repo2 = temp.child("repo2");
    repo1.create_dir_all().unwrap();
    repo2.create_dir_all().unwrap();
    common::init_repo(repo1.path());
    common::init_repo(repo2.path());
    common::commit(repo1.path(), "a@x.com", "Alice", "one");
    common::commit(repo2.path(), "A@X.com", "Bob", "one");

    let out = assert_fs::TempDir::new().unwrap();
    let out_file = out.child("authors.txt");

    let mut cmd = cargo_bin_cmd!("authorscan");
    cmd.arg(temp.path())
        .arg("--output")
        .arg(out_file.path())
        .assert()
        .code(0);

    out_file.assert("email,names\na@x.com,Alice / Bob\n");
}

/// Console mode prints the merged identities.
#[test]
fn test_console_output_lists_identities() {
    let temp = two_repo_fixture();

    let mut cmd = cargo_bin_cmd!("authorscan");
    cmd.arg(temp.path())
        .arg("--color")
        .arg("never")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("a@x.com"))
        .stdout(predicate::str::contains("Alice"))
        .stdout(predicate::str::contains("b@x.com"));
}

/// Raw console mode suppresses the banner.
#[test]
fn test_raw_console_output_has_no_banner() {
    let temp = two_repo_fixture();

    let mut cmd = cargo_bin_cmd!("authorscan");
    cmd.arg(temp.path())
        .arg("--raw")
        .arg("--color")
        .arg("never")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("authorscan results").not());
}

/// A scan whose every record is filtered out reports "no matches" and
/// writes no file.
#[test]
fn test_everything_filtered_reports_no_matches() {
    let temp = assert_fs::TempDir::new().unwrap();
    let repo = temp.child("repo");
    repo.create_dir_all().unwrap();
    common::init_repo(repo.path());
    common::commit(repo.path(), "actions@github.com", "CI", "bot");

    let out = assert_fs::TempDir::new().unwrap();
    let out_file = out.child("authors.txt");

    let mut cmd = cargo_bin_cmd!("authorscan");
    cmd.arg(temp.path())
        .arg("--output")
        .arg(out_file.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No matching authors"));

    out_file.assert(predicate::path::missing());
}

/// Batch mode reads several targets from a list file and merges them.
#[test]
fn test_batch_mode_merges_targets() {
    let temp = assert_fs::TempDir::new().unwrap();
    let dir_a = temp.child("alpha");
    let dir_b = temp.child("beta");
    for (dir, email, name) in [(&dir_a, "a@x.com", "Alice"), (&dir_b, "b@x.com", "Bob")] {
        let repo = dir.child("repo");
        repo.create_dir_all().unwrap();
        common::init_repo(repo.path());
        common::commit(repo.path(), email, name, "init");
    }

    let list = temp.child("targets.txt");
    list.write_str(&format!(
        "# targets\n{}\n\n{}\n",
        dir_a.path().display(),
        dir_b.path().display()
    ))
    .unwrap();

    let out = assert_fs::TempDir::new().unwrap();
    let out_file = out.child("authors.txt");

    let mut cmd = cargo_bin_cmd!("authorscan");
    cmd.arg("--input")
        .arg(list.path())
        .arg("--output")
        .arg(out_file.path())
        .assert()
        .code(0);

    out_file.assert("email,names\na@x.com,Alice\nb@x.com,Bob\n");
}

/// Two identical runs produce byte-identical output.
#[test]
fn test_repeated_scan_is_deterministic() {
    let temp = two_repo_fixture();
    let out = assert_fs::TempDir::new().unwrap();
    let first = out.child("first.txt");
    let second = out.child("second.txt");

    for file in [&first, &second] {
        let mut cmd = cargo_bin_cmd!("authorscan");
        cmd.arg(temp.path())
            .arg("--output")
            .arg(file.path())
            .assert()
            .code(0);
    }

    let a = std::fs::read_to_string(first.path()).unwrap();
    let b = std::fs::read_to_string(second.path()).unwrap();
    assert_eq!(a, b);
}
