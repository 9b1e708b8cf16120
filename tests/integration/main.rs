//! Integration tests for cli-dist

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::net::TcpListener;
    use tempfile::TempDir;

    fn cli_dist() -> Command {
        let mut cmd = cargo_bin_cmd!("cli-dist");
        cmd.env_remove("CLI_DIST_CONFIG").env_remove("PORT");
        cmd
    }

    #[test]
    fn help_displays() {
        cli_dist()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Distribution server for the CLI"));
    }

    #[test]
    fn version_displays() {
        cli_dist()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cli-dist"));
    }

    #[test]
    fn serve_help_mentions_port_variable() {
        cli_dist()
            .args(["serve", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("PORT"));
    }

    #[test]
    fn config_init_then_show() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let path = path.to_str().unwrap();

        cli_dist()
            .args(["--config", path, "config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));

        cli_dist()
            .args(["--config", path, "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[server]"))
            .stdout(predicate::str::contains("port = 4000"));

        cli_dist()
            .args(["--config", path, "config", "init"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        cli_dist()
            .args(["--config", path.to_str().unwrap(), "config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn missing_explicit_config_fails() {
        cli_dist()
            .args(["--config", "/nonexistent/cli-dist.toml", "config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Configuration file not found"));
    }

    #[test]
    fn invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = \"four thousand\"\n").unwrap();

        cli_dist()
            .args(["--config", path.to_str().unwrap(), "config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn serve_fails_when_port_is_taken() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port().to_string();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        cli_dist()
            .args(["--config", path.to_str().unwrap(), "serve", "--host", "127.0.0.1"])
            .env("PORT", &port)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to bind"))
            .stderr(predicate::str::contains("Hint:"));
    }
}
