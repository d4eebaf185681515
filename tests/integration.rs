use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn hbk_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("hbk");
    path
}

/// Minimal valid PDF containing the text "ownership and borrowing".
/// Builds the body first, then the xref with correct byte offsets so the
/// extractors can parse it.
fn minimal_pdf() -> Vec<u8> {
    let phrase = "ownership and borrowing";
    let stream = format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET\n", phrase);

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(
        format!("4 0 obj << /Length {} >> stream\n{}endstream endobj\n", stream.len(), stream)
            .as_bytes(),
    );
    let o5 = out.len();
    out.extend_from_slice(
        b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    out.extend_from_slice(format!("{:010} 00000 n \n", o1).as_bytes());
    out.extend_from_slice(format!("{:010} 00000 n \n", o2).as_bytes());
    out.extend_from_slice(format!("{:010} 00000 n \n", o3).as_bytes());
    out.extend_from_slice(format!("{:010} 00000 n \n", o4).as_bytes());
    out.extend_from_slice(format!("{:010} 00000 n \n", o5).as_bytes());
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();

    let config_content = format!(
        r#"[store]
backend = "sqlite"
path = "{}/data/handbook.sqlite"

[chunking]
chunk_size = 40
overlap = 10

[retrieval]
handbook_k = 10
answer_k = 3

[embedding]
provider = "hashing"

[backend]
provider = "gemini"
model = "gemini-2.0-flash-exp"

[output]
dir = "{}/handbooks"
"#,
        root.display(),
        root.display()
    );

    let config_path = config_dir.join("hbk.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_hbk(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = hbk_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("GEMINI_API_KEY")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run hbk binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_hbk(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data").join("handbook.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_hbk(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_hbk(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_status_on_empty_index() {
    let (_tmp, config_path) = setup_test_env();

    run_hbk(&config_path, &["init"]);
    let (stdout, _, success) = run_hbk(&config_path, &["status"]);
    assert!(success, "status failed");
    assert!(stdout.contains("documents: 0"));
    assert!(stdout.contains("chunks: 0"));
}

#[test]
fn test_add_pdf_and_status() {
    let (tmp, config_path) = setup_test_env();
    let docs_dir = tmp.path().join("docs");
    fs::write(docs_dir.join("notes.pdf"), minimal_pdf()).unwrap();

    run_hbk(&config_path, &["init"]);
    let (stdout, stderr, success) =
        run_hbk(&config_path, &["add", docs_dir.to_str().unwrap()]);
    assert!(success, "add failed: stdout={}, stderr={}", stdout, stderr);
    assert!(
        stdout.contains("indexed: 1 documents"),
        "expected one indexed document, got: {}",
        stdout
    );

    let (status_out, _, success) = run_hbk(&config_path, &["status"]);
    assert!(success);
    assert!(
        status_out.contains("documents: 1") && status_out.contains("notes.pdf"),
        "status should list the ingested document, got: {}",
        status_out
    );
}

#[test]
fn test_add_corrupt_pdf_reports_failure_without_aborting() {
    let (tmp, config_path) = setup_test_env();
    let docs_dir = tmp.path().join("docs");
    fs::write(docs_dir.join("bad.pdf"), b"not a valid pdf").unwrap();
    fs::write(docs_dir.join("good.pdf"), minimal_pdf()).unwrap();

    run_hbk(&config_path, &["init"]);
    let (stdout, stderr, success) =
        run_hbk(&config_path, &["add", docs_dir.to_str().unwrap()]);
    assert!(
        success,
        "batch must succeed despite the bad file: stdout={}, stderr={}",
        stdout, stderr
    );
    assert!(
        stdout.contains("failed: 1 documents"),
        "bad.pdf should be reported as failed, got: {}",
        stdout
    );
    assert!(
        stdout.contains("indexed: 1 documents"),
        "good.pdf should still be indexed, got: {}",
        stdout
    );
}

#[test]
fn test_reingestion_after_clear_reuses_first_ordinal() {
    let (tmp, config_path) = setup_test_env();
    let docs_dir = tmp.path().join("docs");
    fs::write(docs_dir.join("notes.pdf"), minimal_pdf()).unwrap();

    run_hbk(&config_path, &["init"]);
    run_hbk(&config_path, &["add", docs_dir.to_str().unwrap()]);

    let (stdout, _, success) = run_hbk(&config_path, &["clear"]);
    assert!(success, "clear failed");
    assert!(stdout.contains("cleared"));

    let (status_out, _, _) = run_hbk(&config_path, &["status"]);
    assert!(status_out.contains("documents: 0"));

    let (stdout, _, success) = run_hbk(&config_path, &["add", docs_dir.to_str().unwrap()]);
    assert!(success);
    assert!(
        stdout.contains("doc 0"),
        "first document after clear should get ordinal 0, got: {}",
        stdout
    );
}

#[test]
fn test_add_persists_across_invocations() {
    let (tmp, config_path) = setup_test_env();
    let docs_dir = tmp.path().join("docs");
    fs::write(docs_dir.join("first.pdf"), minimal_pdf()).unwrap();

    run_hbk(&config_path, &["init"]);
    run_hbk(&config_path, &["add", docs_dir.to_str().unwrap()]);

    // Second invocation: the counter must seed from the store, not restart at 0.
    fs::write(docs_dir.join("second.pdf"), minimal_pdf()).unwrap();
    fs::remove_file(docs_dir.join("first.pdf")).unwrap();
    let (stdout, _, success) = run_hbk(&config_path, &["add", docs_dir.to_str().unwrap()]);
    assert!(success);
    assert!(
        stdout.contains("doc 1"),
        "second document should get ordinal 1, got: {}",
        stdout
    );

    let (status_out, _, _) = run_hbk(&config_path, &["status"]);
    assert!(status_out.contains("documents: 2"), "got: {}", status_out);
}

#[test]
fn test_ask_requires_api_key() {
    let (_tmp, config_path) = setup_test_env();

    run_hbk(&config_path, &["init"]);
    let (_, stderr, success) = run_hbk(&config_path, &["ask", "what is ownership?"]);
    assert!(!success, "ask without GEMINI_API_KEY should fail");
    assert!(
        stderr.contains("GEMINI_API_KEY"),
        "should name the missing variable, got: {}",
        stderr
    );
}

#[test]
fn test_generate_requires_api_key() {
    let (_tmp, config_path) = setup_test_env();

    run_hbk(&config_path, &["init"]);
    let (_, stderr, success) = run_hbk(&config_path, &["generate", "Rust"]);
    assert!(!success, "generate without GEMINI_API_KEY should fail");
    assert!(
        stderr.contains("GEMINI_API_KEY"),
        "should name the missing variable, got: {}",
        stderr
    );
}

#[test]
fn test_invalid_config_rejected() {
    let (tmp, config_path) = setup_test_env();

    // overlap >= chunk_size is a configuration error, not a runtime surprise
    let bad = fs::read_to_string(&config_path)
        .unwrap()
        .replace("overlap = 10", "overlap = 40");
    let bad_path = tmp.path().join("config").join("bad.toml");
    fs::write(&bad_path, bad).unwrap();

    let (_, stderr, success) = run_hbk(&bad_path, &["init"]);
    assert!(!success, "invalid chunking config should fail");
    assert!(
        stderr.contains("overlap"),
        "should mention the offending field, got: {}",
        stderr
    );
}

#[test]
fn test_help_works_without_config_file() {
    let tmp = TempDir::new().unwrap();
    let absent = tmp.path().join("config").join("nope.toml");

    let (_, _, success) = run_hbk(&absent, &["--help"]);
    assert!(success, "help should work without a config file");
}
