pub async fn check_status(
    response: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_body = response.text().await.unwrap_or_default();
    let detail = error_body.trim();
    if detail.is_empty() {
        return Err(format!("{}: {}", context, status));
    }
    Err(format!("{}: {} {}", context, status, detail))
}
