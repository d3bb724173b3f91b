use std::env;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn run_command(args: &[&str], config_dir: &str) -> (bool, String, String) {
    // Use cargo run which will build if needed
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .env("MONGOFETCH_CONFIG_DIR", config_dir)
        .env_remove("RUST_LOG")
        .current_dir(env::current_dir().unwrap())
        .output()
        .expect("Failed to execute command");

    let success = output.status.success();
    let stdout = String::from_utf8(output.stdout).unwrap_or_default();
    let stderr = String::from_utf8(output.stderr).unwrap_or_default();

    // Filter out cargo compilation messages from stderr
    let filtered_stderr: String = stderr
        .lines()
        .filter(|line| {
            !line.contains("Compiling")
                && !line.contains("Finished")
                && !line.contains("warning:")
                && !line.contains("note:")
        })
        .collect::<Vec<_>>()
        .join("\n");

    (success, stdout, filtered_stderr)
}

fn setup_config_dir(config: Option<&str>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    if let Some(config) = config {
        fs::write(temp_dir.path().join("mongoctl.config"), config)
            .expect("Failed to write config");
    }
    temp_dir
}

const CUSTOM_CONFIG: &str = r#"{
    "customBinaryRepositories": {
        "mirror": {
            "urlTemplate": "http://mirror.internal/{os_name}/mongodb-{platform_spec}-{mongodb_version}.tgz",
            "supportedEditions": ["community"]
        },
        "vault": {
            "_type": "s3",
            "urlTemplate": "{mongodb_edition}/mongodb-{platform_spec}-{mongodb_version}.tgz",
            "supportedEditions": ["community", "enterprise"],
            "bucketName": "mongodb-binaries",
            "accessKey": "AKIAEXAMPLE",
            "secretKey": "example"
        }
    }
}"#;

#[test]
fn test_repos_lists_default_only_without_config() {
    let temp_dir = setup_config_dir(None);
    let config_dir = temp_dir.path().to_str().unwrap();

    let (success, stdout, stderr) = run_command(&["repos"], config_dir);

    assert!(success, "repos should succeed. stderr: {}", stderr);
    assert!(stdout.contains("1. default [cdn] editions: community, enterprise"));
    assert!(!stdout.contains("2."), "unexpected extra repository: {}", stdout);
}

#[test]
fn test_repos_lists_custom_repositories_in_order() {
    let temp_dir = setup_config_dir(Some(CUSTOM_CONFIG));
    let config_dir = temp_dir.path().to_str().unwrap();

    let (success, stdout, stderr) = run_command(&["repos"], config_dir);

    assert!(success, "repos should succeed. stderr: {}", stderr);
    let default_pos = stdout.find("1. default").expect("default listed");
    let mirror_pos = stdout.find("2. mirror [http]").expect("mirror listed");
    let vault_pos = stdout.find("3. vault [s3]").expect("vault listed");
    assert!(default_pos < mirror_pos && mirror_pos < vault_pos);
}

#[test]
fn test_locate_community() {
    let temp_dir = setup_config_dir(Some(CUSTOM_CONFIG));
    let config_dir = temp_dir.path().to_str().unwrap();

    let (success, stdout, stderr) = run_command(&["locate", "3.0.0"], config_dir);

    if !cfg!(target_os = "linux") {
        return;
    }
    assert!(success, "locate should succeed. stderr: {}", stderr);
    assert!(stdout.contains("http://fastdl.mongodb.org/linux/mongodb-linux-"));
    assert!(stdout.contains("http://mirror.internal/linux/mongodb-linux-"));
    assert!(stdout.contains("community/mongodb-linux-"));
    assert!(stdout.contains("-3.0.0.tgz"));
}

#[test]
fn test_locate_single_repository() {
    let temp_dir = setup_config_dir(Some(CUSTOM_CONFIG));
    let config_dir = temp_dir.path().to_str().unwrap();

    let (success, stdout, stderr) =
        run_command(&["locate", "3.0.0", "--repo", "mirror"], config_dir);

    if !cfg!(target_os = "linux") {
        return;
    }
    assert!(success, "locate should succeed. stderr: {}", stderr);
    assert!(stdout.contains("mirror:"));
    assert!(!stdout.contains("fastdl.mongodb.org"));

    let (success, _, stderr) = run_command(&["locate", "3.0.0", "--repo", "nowhere"], config_dir);
    assert!(!success);
    assert!(stderr.contains("Unknown binary repository 'nowhere'"));
}

#[test]
fn test_download_rejects_invalid_version() {
    let temp_dir = setup_config_dir(None);
    let config_dir = temp_dir.path().to_str().unwrap();

    let (success, _, stderr) = run_command(&["download", "not-a-version"], config_dir);

    assert!(!success, "download with a bad version should fail");
    assert!(
        stderr.contains("Invalid version 'not-a-version'"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_download_rejects_unknown_repository() {
    let temp_dir = setup_config_dir(Some(CUSTOM_CONFIG));
    let config_dir = temp_dir.path().to_str().unwrap();

    let (success, _, stderr) =
        run_command(&["download", "3.0.0", "--repo", "nowhere"], config_dir);

    assert!(!success);
    assert!(
        stderr.contains("Unknown binary repository 'nowhere'"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_download_rejects_unknown_edition() {
    let temp_dir = setup_config_dir(None);
    let config_dir = temp_dir.path().to_str().unwrap();

    let (success, _, stderr) =
        run_command(&["download", "3.0.0", "--edition", "gold"], config_dir);

    assert!(!success);
    assert!(stderr.contains("Unsupported edition 'gold'"), "stderr: {}", stderr);
}

#[test]
fn test_malformed_config_is_fatal() {
    let temp_dir = setup_config_dir(Some(
        r#"{"customBinaryRepositories": {"vault": {"_type": "s3", "urlTemplate": "k", "supportedEditions": ["community"]}}}"#,
    ));
    let config_dir = temp_dir.path().to_str().unwrap();

    let (success, _, stderr) = run_command(&["repos"], config_dir);

    assert!(!success);
    assert!(
        stderr.contains("Invalid binary repository configuration 'vault'"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_config_flag_overrides_location() {
    let temp_dir = setup_config_dir(None);
    let config_dir = temp_dir.path().to_str().unwrap();
    let other = setup_config_dir(Some(CUSTOM_CONFIG));
    let config_file = other.path().join("mongoctl.config");

    let (success, stdout, stderr) = run_command(
        &["--config", config_file.to_str().unwrap(), "repos"],
        config_dir,
    );

    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("2. mirror"));
}

#[test]
fn test_platform_reports_host() {
    let temp_dir = setup_config_dir(None);
    let config_dir = temp_dir.path().to_str().unwrap();

    let (success, stdout, stderr) = run_command(&["platform"], config_dir);

    if cfg!(target_os = "linux") {
        assert!(success, "stderr: {}", stderr);
        assert!(stdout.contains("os: linux"));
        assert!(stdout.contains("platform spec: linux-"));
    }
}
