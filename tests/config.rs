use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use zerowaste_cli::cli::runtime::{load_config, resolve_config_path};
use zerowaste_cli::cli::ServeArgs;
use zerowaste_cli::config::{UPSTREAM_URL_ENV, WORKERS_ENV};
use zerowaste_cli::Config;

#[tokio::test]
async fn loads_yaml_from_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "upstream_url: ws://backend:8000/ws/python-script/").unwrap();
    writeln!(file, "catalog_path: /srv/recipes.csv").unwrap();
    writeln!(file, "workers: 8").unwrap();
    file.flush().unwrap();

    let path = file.path().to_path_buf();
    let loaded = load_config(Some(&path)).await.unwrap();
    assert_eq!(loaded.path, path);
    assert_eq!(loaded.config.upstream_url, "ws://backend:8000/ws/python-script/");
    assert_eq!(loaded.config.catalog_path, PathBuf::from("/srv/recipes.csv"));
    assert_eq!(loaded.config.workers, 8);
    assert_eq!(loaded.config.poll_interval_ms, 1000);
}

#[tokio::test]
async fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let loaded = load_config(Some(&path)).await.unwrap();
    assert_eq!(loaded.config, Config::default());
}

#[tokio::test]
async fn unparsable_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "workers: [not, a, number]").unwrap();
    file.flush().unwrap();
    let path = file.path().to_path_buf();
    assert!(load_config(Some(&path)).await.is_err());
}

#[test]
fn explicit_path_wins_resolution() {
    let path = PathBuf::from("/etc/zerowaste/custom.yaml");
    assert_eq!(resolve_config_path(Some(&path)).unwrap(), path);
}

#[test]
fn cli_beats_env_beats_file() {
    let mut config: Config = serde_yaml::from_str("upstream_url: ws://file/\nworkers: 3\n").unwrap();

    let env: HashMap<&str, &str> = [(UPSTREAM_URL_ENV, "ws://env/"), (WORKERS_ENV, "4")]
        .into_iter()
        .collect();
    config
        .apply_env_from(|key| env.get(key).map(|value| value.to_string()))
        .unwrap();
    assert_eq!(config.upstream_url, "ws://env/");
    assert_eq!(config.workers, 4);

    ServeArgs {
        workers: Some(6),
        ..ServeArgs::default()
    }
    .apply(&mut config);
    assert_eq!(config.upstream_url, "ws://env/");
    assert_eq!(config.workers, 6);
}

#[test]
fn bad_worker_env_is_rejected() {
    let mut config = Config::default();
    let err = config
        .apply_env_from(|key| (key == WORKERS_ENV).then(|| "many".to_string()))
        .unwrap_err();
    assert!(err.to_string().contains(WORKERS_ENV));
}

#[test]
fn zero_workers_fail_validation() {
    let config = Config {
        workers: 0,
        ..Config::default()
    };
    assert!(config.validate().is_err());
    assert!(Config::default().validate().is_ok());
}
