use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub in_use: u64,
    pub free: u64,
    pub capacity: u64,
    pub records: usize,
}
