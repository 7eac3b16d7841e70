// axum handler for `/`
pub async fn root() -> &'static str {
    "API is running. Use /register or /login to interact with the system."
}
