/// 存活检查
pub async fn health_check() -> &'static str {
    "healthy"
}
