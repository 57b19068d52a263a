use serde::Serialize;

/// Every health resource uses the same fixed identity.
pub const HEALTH_RESOURCE_ID: &str = "0";

const MONGODB_OK: &str = "ok";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessAttributes {
    pub mongodb: &'static str,
    pub mongodb_find_one_duration_micros: u64,
}

impl LivenessAttributes {
    pub fn ok(duration_micros: u64) -> Self {
        Self {
            mongodb: MONGODB_OK,
            mongodb_find_one_duration_micros: duration_micros,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessAttributes {
    pub mongodb: &'static str,
    pub mongodb_ping_duration_micros: u64,
}

impl ReadinessAttributes {
    pub fn ok(duration_micros: u64) -> Self {
        Self {
            mongodb: MONGODB_OK,
            mongodb_ping_duration_micros: duration_micros,
        }
    }
}
