use std::fs;
use std::path::PathBuf;
use std::process::Output;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "traffic_shell_test_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Runs the binary against the state file in `dir`.
fn traffic_shell(dir: &TempDir, args: &[&str]) -> Output {
    let state = dir.join("state.json");
    std::process::Command::new(env!("CARGO_BIN_EXE_traffic-shell"))
        .arg("--state")
        .arg(&state)
        .args(args)
        .env_remove("RUST_LOG")
        .env("COLUMNS", "200")
        .output()
        .expect("failed to run traffic-shell")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_writes_seeded_state() {
    let dir = TempDir::new("init_seeded");
    let output = traffic_shell(&dir, &["init"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let raw = fs::read_to_string(dir.join("state.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(!doc["platforms"].as_array().unwrap().is_empty());
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = TempDir::new("init_overwrite");
    assert!(traffic_shell(&dir, &["init"]).status.success());

    let again = traffic_shell(&dir, &["init"]);
    assert!(!again.status.success());
    assert!(stderr(&again).starts_with("error: "));

    assert!(traffic_shell(&dir, &["init", "--force"]).status.success());
}

// ---------------------------------------------------------------------------
// exec
// ---------------------------------------------------------------------------

#[test]
fn exec_create_then_list_zone() {
    let dir = TempDir::new("exec_zone");
    let created = traffic_shell(
        &dir,
        &["exec", "create", "zone", "example.com", "-description", "Main site"],
    );
    assert!(created.status.success(), "{}", stderr(&created));
    assert!(stdout(&created).starts_with("Created zone 'example.com'"));

    let listed = traffic_shell(&dir, &["exec", "list", "zone"]);
    assert!(listed.status.success());
    let text = stdout(&listed);
    let lines: Vec<&str> = text.lines().collect();
    let header: Vec<&str> = lines[0].split_whitespace().collect();
    assert_eq!(header, ["Domain", "Records", "Description"]);
    assert!(lines[2].starts_with("example.com"));
    assert!(lines[2].contains("Main site"));
}

#[test]
fn exec_show_prints_json() {
    let dir = TempDir::new("exec_show");
    let output = traffic_shell(&dir, &["exec", "show", "platform", "Akamai"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["name"], "Akamai");
    assert_eq!(value["visibility"], "community");
}

#[test]
fn exec_quoted_words_survive() {
    let dir = TempDir::new("exec_quoted");
    let output = traffic_shell(
        &dir,
        &[
            "exec",
            "create",
            "platform",
            "cloud",
            "West Edge",
            "-region",
            "Azure - West Europe",
        ],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let private = traffic_shell(&dir, &["exec", "list", "platform", "private"]);
    let text = stdout(&private);
    assert!(text.contains("West Edge"));
    assert!(text.contains("Azure - West Europe"));
}

#[test]
fn exec_parse_error_exits_nonzero() {
    let dir = TempDir::new("exec_parse_error");
    let output = traffic_shell(&dir, &["exec", "create", "platform", "cloud", "-region", "us"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("command incomplete"));
}

#[test]
fn exec_delete_by_filter() {
    let dir = TempDir::new("exec_delete");
    for name in ["a.test", "b.test", "keep.example"] {
        assert!(traffic_shell(&dir, &["exec", "create", "zone", name]).status.success());
    }

    let deleted = traffic_shell(&dir, &["exec", "delete", "zone", "-filter", r"\.test$"]);
    assert!(deleted.status.success(), "{}", stderr(&deleted));
    assert_eq!(stdout(&deleted), "Deleted 2 zone(s)\n");

    let listed = stdout(&traffic_shell(&dir, &["exec", "list", "zone"]));
    assert!(listed.contains("keep.example"));
    assert!(!listed.contains("a.test"));
}

#[test]
fn exec_exit_says_bye() {
    let dir = TempDir::new("exec_exit");
    let output = traffic_shell(&dir, &["exec", "exit"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Bye!\n");
}

// ---------------------------------------------------------------------------
// complete
// ---------------------------------------------------------------------------

#[test]
fn complete_top_level_text() {
    let dir = TempDir::new("complete_text");
    let output = traffic_shell(&dir, &["complete", "de"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "delete\tDelete resources by name or by filter\n");
}

#[test]
fn complete_named_args_json() {
    let dir = TempDir::new("complete_json");
    let output = traffic_shell(&dir, &["complete", "list zone -", "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value[0]["text"], "-filter");
    assert_eq!(value.as_array().unwrap().len(), 1);
}

#[test]
fn complete_platform_names_are_quoted() {
    let dir = TempDir::new("complete_quoted");
    let output = traffic_shell(&dir, &["complete", "show platform cloudf", "--format", "yaml"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Amazon CloudFront"));
}

#[test]
fn complete_never_fails_on_garbage() {
    let dir = TempDir::new("complete_garbage");
    let output = traffic_shell(&dir, &["complete", "frobnicate now "]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_state_file_is_used() {
    let dir = TempDir::new("config_state");
    let state = dir.join("from-config.json");
    let config = dir.join("shell.yml");
    fs::write(&config, format!("state_file: {}\n", state.display())).unwrap();

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_traffic-shell"))
        .args(["--config", config.to_str().unwrap(), "init"])
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run traffic-shell");
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(state.exists());
}

#[test]
fn missing_config_is_an_error() {
    let dir = TempDir::new("config_missing");
    let output = traffic_shell(
        &dir,
        &["--config", dir.join("absent.yml").to_str().unwrap(), "exec", "help"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to load config"));
}
