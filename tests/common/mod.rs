use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::MockServer;

use household_assistant::config::GatewayConfig;
use household_assistant::gateway::HttpGateway;

#[allow(dead_code)]
pub fn gateway_for(server: &MockServer) -> Arc<HttpGateway> {
    let config = GatewayConfig {
        base_url: server.uri(),
        timeout_seconds: Some(5),
        ..Default::default()
    };
    Arc::new(HttpGateway::new(&config).expect("failed to create gateway"))
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
