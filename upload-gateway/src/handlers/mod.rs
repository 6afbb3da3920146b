pub mod file_retrieval;
pub mod file_upload;
pub mod validation;

pub async fn health_check() -> &'static str {
    "Upload Gateway is healthy"
}
