//! Build metadata reported by `/healthz/ping`.
//!
//! Commit hash, repository name and build time are captured by `build.rs`.

use chrono::DateTime;
use serde::Serialize;

pub const SERVICE_NAME: &str = "contacts-service";
pub const SERVICE_TYPE: &str = "rest-api";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub repo_name: String,
    pub commit_hash: String,
    pub service_type: String,
    pub service_name: String,
    pub service_version: String,
    pub build_date: String,
    pub build_epoch_sec: i64,
}

impl BuildInfo {
    pub fn current() -> Self {
        let build_epoch_sec: i64 = env!("BUILD_EPOCH_SEC").parse().unwrap_or(0);
        Self {
            repo_name: env!("BUILD_REPO_NAME").to_string(),
            commit_hash: env!("BUILD_COMMIT_HASH").to_string(),
            service_type: SERVICE_TYPE.to_string(),
            service_name: SERVICE_NAME.to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            build_date: build_date(build_epoch_sec),
            build_epoch_sec,
        }
    }
}

fn build_date(epoch_sec: i64) -> String {
    DateTime::from_timestamp(epoch_sec, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string())
}
