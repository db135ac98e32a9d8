use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn daybook_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("daybook"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("RUST_LOG")
        .current_dir(home);
    cmd
}

fn write_page(root: &Path, day: &str, prev: Option<&str>, next: Option<&str>) {
    let dir = root.join(day);
    fs::create_dir_all(&dir).expect("mkdir");
    let mut html = format!("<html>\n<body>\n<h1>{day}</h1>\n");
    if let Some(p) = prev {
        html.push_str(&format!("<a class=\"prev\" href=\"/{p}/\">prev</a>\n"));
    }
    if let Some(n) = next {
        html.push_str(&format!("<a class=\"next\" href=\"/{n}/\">next</a>\n"));
    }
    html.push_str("</body>\n</html>\n");
    fs::write(dir.join("index.html"), html).expect("write page");
}

struct Site {
    home: TempDir,
    build: TempDir,
    public: TempDir,
}

impl Site {
    fn new() -> Self {
        Self {
            home: TempDir::new().expect("home"),
            build: TempDir::new().expect("build"),
            public: TempDir::new().expect("public"),
        }
    }

    fn cmd(&self, sub: &str) -> Command {
        let mut cmd = daybook_cmd(self.home.path());
        cmd.arg(sub)
            .arg("--build")
            .arg(self.build.path())
            .arg("--published")
            .arg(self.public.path());
        cmd
    }
}

#[test]
fn sync_publishes_then_reports_nothing() {
    let site = Site::new();
    write_page(site.build.path(), "2023-11-01", None, Some("2023-11-02"));
    write_page(site.build.path(), "2023-11-02", Some("2023-11-01"), None);

    site.cmd("sync")
        .assert()
        .success()
        .stdout(contains("✓ published 2 file(s)"))
        .stdout(contains("2023-11-01/index.html"));
    assert!(site.public.path().join("2023-11-02/index.html").exists());

    site.cmd("sync")
        .assert()
        .success()
        .stdout(contains("✓ nothing to publish"));
}

#[test]
fn dry_run_json_lists_keys_without_writing() {
    let site = Site::new();
    write_page(site.build.path(), "2023-11-01", None, None);
    fs::write(site.build.path().join("style.css"), "body{}").expect("asset");

    let output = site
        .cmd("sync")
        .args(["--dry-run", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["dry_run"], true);
    assert_eq!(
        json["published"],
        serde_json::json!(["2023-11-01/index.html", "style.css"])
    );
    assert!(!site.public.path().join("style.css").exists());
}

#[test]
fn new_day_repairs_published_neighbour() {
    let site = Site::new();
    write_page(site.build.path(), "2023-11-01", None, Some("2023-11-02"));
    site.cmd("sync").assert().success();

    write_page(site.build.path(), "2023-11-03", Some("2023-11-02"), None);
    site.cmd("sync")
        .assert()
        .success()
        .stdout(contains("✓ published 2 file(s)"));

    let first = fs::read_to_string(site.public.path().join("2023-11-01/index.html")).unwrap();
    assert!(first.contains("href=\"/2023-11-03/\""), "got: {first}");
    let third = fs::read_to_string(site.public.path().join("2023-11-03/index.html")).unwrap();
    assert!(third.contains("href=\"/2023-11-01/\""), "got: {third}");
}

#[test]
fn diff_shows_link_repair_and_writes_nothing() {
    let site = Site::new();
    write_page(site.build.path(), "2023-11-01", None, Some("2023-11-02"));
    site.cmd("sync").assert().success();
    write_page(site.build.path(), "2023-11-03", Some("2023-11-02"), None);

    site.cmd("diff")
        .assert()
        .success()
        .stdout(contains("--- a/2023-11-01/index.html"))
        .stdout(contains("+<a class=\"next\" href=\"/2023-11-03/\">next</a>"))
        .stdout(contains("+++ b/2023-11-03/index.html"));
    assert!(!site.public.path().join("2023-11-03").exists());
}

#[test]
fn diff_with_no_changes() {
    let site = Site::new();
    write_page(site.build.path(), "2023-11-01", None, None);
    site.cmd("sync").assert().success();
    site.cmd("diff")
        .assert()
        .success()
        .stdout(contains("No differences."));
}

#[test]
fn chain_json_reports_flags() {
    let site = Site::new();
    write_page(site.build.path(), "2023-11-01", None, Some("2023-11-02"));
    site.cmd("sync").assert().success();
    write_page(site.build.path(), "2023-11-03", Some("2023-11-02"), None);

    let output = site.cmd("chain").arg("--json").output().expect("run");
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["day"], "2023-11-01");
    assert_eq!(rows[0]["next"], "2023-11-03");
    assert_eq!(rows[0]["flags"]["pagination_changed"], true);
    assert_eq!(rows[1]["flags"]["is_new"], true);
    assert_eq!(rows[1]["publish"], true);
}

#[test]
fn chain_table_lists_days() {
    let site = Site::new();
    write_page(site.build.path(), "2023-11-01", None, None);
    site.cmd("chain")
        .assert()
        .success()
        .stdout(contains("2023-11-01"))
        .stdout(contains("1 day(s), 1 to publish"));
}

#[test]
fn config_file_in_working_directory_is_used() {
    let site = Site::new();
    fs::write(site.home.path().join("daybook.yaml"), "fan_out: 0\n").expect("config");
    write_page(site.build.path(), "2023-11-01", None, None);

    site.cmd("sync")
        .assert()
        .failure()
        .stderr(contains("failed to load configuration"))
        .stderr(contains("fan_out must be at least 1"));
}

#[test]
fn command_line_overrides_are_validated() {
    let site = Site::new();
    write_page(site.build.path(), "2023-11-01", None, None);

    site.cmd("sync")
        .args(["--fan-out", "0"])
        .assert()
        .failure()
        .stderr(contains("invalid options"));
}

#[test]
fn missing_explicit_config_fails() {
    let site = Site::new();
    site.cmd("sync")
        .arg("--config")
        .arg(site.home.path().join("nope.yaml"))
        .assert()
        .failure()
        .stderr(contains("config not found").and(contains("nope.yaml")));
}

#[test]
fn missing_build_directory_fails() {
    let site = Site::new();
    let mut cmd = daybook_cmd(site.home.path());
    cmd.args(["sync", "--build"])
        .arg(site.home.path().join("dist"))
        .arg("--published")
        .arg(site.public.path())
        .assert()
        .failure()
        .stderr(contains("sync of"));
}

#[test]
fn pagination_flag_requires_bool() {
    let site = Site::new();
    site.cmd("sync")
        .args(["--pagination", "maybe"])
        .assert()
        .failure()
        .stderr(contains("invalid value"));
}
