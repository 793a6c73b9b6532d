//! End-to-end tests of the `linkcards` binary.
//!
//! Most commands run without a store. `load` runs against a mock store; the
//! full set of store round trips is covered in `src/store.rs`.

use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn linkcards(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_linkcards"))
        .current_dir(dir)
        .env_remove("LINKCARDS_STORE_URL")
        .env_remove("LINKCARDS_STORE_KEY")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run linkcards")
}

fn write_inputs(dir: &Path) -> PathBuf {
    let input = dir.join("cards");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(
        input.join("videos.txt"),
        "https://youtu.be/XYZ789\n\nhttps://www.youtube.com/watch?v=ABC123\n",
    )
    .unwrap();
    std::fs::write(input.join("titles.txt"), "Intro\nDeep dive\n").unwrap();
    std::fs::write(input.join("descriptions.txt"), "Start here\nMore detail\n").unwrap();
    input
}

#[test]
fn generate_writes_cards_to_stdout() {
    let tmp = TempDir::new().unwrap();
    let input = write_inputs(tmp.path());

    let out = linkcards(
        tmp.path(),
        &["generate", "--input", input.to_str().unwrap(), "--no-save"],
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.matches("<!-- Card ").count(), 2);
    assert!(stdout.contains("https://www.youtube.com/embed/XYZ789?showinfo=0"));
    assert!(stdout.contains("https://img.youtube.com/vi/ABC123/hqdefault.jpg"));
}

#[test]
fn generate_writes_output_and_preview_files() {
    let tmp = TempDir::new().unwrap();
    let input = write_inputs(tmp.path());
    let html = tmp.path().join("cards.html");
    let preview = tmp.path().join("preview.html");

    let out = linkcards(
        tmp.path(),
        &[
            "generate",
            "--input",
            input.to_str().unwrap(),
            "--output",
            html.to_str().unwrap(),
            "--preview",
            preview.to_str().unwrap(),
            "--theme",
            "light",
            "--no-save",
        ],
    );
    assert!(out.status.success());

    let cards = std::fs::read_to_string(&html).unwrap();
    assert!(cards.trim_end().ends_with("<!-- Card 2 -->"));
    let page = std::fs::read_to_string(&preview).unwrap();
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains(r#"<body class="light">"#));
}

#[test]
fn generate_without_store_still_renders() {
    let tmp = TempDir::new().unwrap();
    let input = write_inputs(tmp.path());

    let out = linkcards(tmp.path(), &["generate", "--input", input.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("<!-- Card 1 -->"));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Failed to save generation"));
}

#[test]
fn generate_rejects_missing_fields() {
    let tmp = TempDir::new().unwrap();
    let input = write_inputs(tmp.path());
    std::fs::remove_file(input.join("titles.txt")).unwrap();

    let out = linkcards(
        tmp.path(),
        &[
            "generate",
            "--input",
            input.to_str().unwrap(),
            "--image-type",
            "googledrive",
            "--no-save",
        ],
    );
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Please fill in all required fields: image links, titles"));
}

#[test]
fn history_without_store_fails_cleanly() {
    let tmp = TempDir::new().unwrap();
    let out = linkcards(tmp.path(), &["history"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Store is not configured"));
}

#[test]
fn failed_command_is_logged_at_default_level() {
    let tmp = TempDir::new().unwrap();
    let out = linkcards(tmp.path(), &["history"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("ERROR"), "stderr: {stderr}");
    assert!(stderr.contains("command failed"), "stderr: {stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn load_writes_preview_with_requested_theme() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/card_generations"))
        .and(query_param("id", "eq.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 9,
            "video_type": "youtube",
            "image_type": "youtube",
            "video_links": ["https://youtu.be/XYZ789"],
            "image_links": [],
            "titles": ["Intro"],
            "descriptions": ["Start here"],
            "generated_html": "<div class=\"card\">Intro</div>\n<!-- Card 1 -->",
            "created_at": "2025-05-04T08:30:00+00:00"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let preview = tmp.path().join("loaded.html");
    let out = Command::new(env!("CARGO_BIN_EXE_linkcards"))
        .current_dir(tmp.path())
        .env("LINKCARDS_STORE_URL", server.uri())
        .env("LINKCARDS_STORE_KEY", "test-key")
        .env_remove("RUST_LOG")
        .args(["load", "9", "--preview", preview.to_str().unwrap(), "--theme", "light"])
        .output()
        .expect("failed to run linkcards");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    assert!(String::from_utf8_lossy(&out.stdout).contains("<!-- Card 1 -->"));
    let page = std::fs::read_to_string(&preview).unwrap();
    assert!(page.contains(r#"<body class="light">"#));
    assert!(page.contains("Intro"));
}

#[test]
fn gen_config_prints_stock_file() {
    let tmp = TempDir::new().unwrap();
    let out = linkcards(tmp.path(), &["gen-config"]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("[store]"));
    assert!(stdout.contains("table = \"card_generations\""));
}

#[test]
fn invalid_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("linkcards.toml"), "[history]\nlimit = 0\n").unwrap();
    let out = linkcards(tmp.path(), &["history"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("history.limit"));
}
