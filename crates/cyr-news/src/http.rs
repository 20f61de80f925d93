//! Shared HTTP response checks for the search client.
//!
//! Maps 429 to [`SearchError::RateLimited`] (with `Retry-After` parsing),
//! quota-exhaustion 403s to [`SearchError::QuotaExceeded`], and any other
//! non-success status to [`SearchError::Api`].

use crate::error::SearchError;

/// Reasons the search API reports when the quota is used up.
const QUOTA_REASONS: &[&str] = &["dailyLimitExceeded", "rateLimitExceeded", "quotaExceeded"];

/// Check an HTTP response for error statuses, returning it unchanged on success.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, SearchError> {
    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(SearchError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::FORBIDDEN
            && QUOTA_REASONS.iter().any(|reason| message.contains(reason))
        {
            return Err(SearchError::QuotaExceeded(message));
        }
        return Err(SearchError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn rate_limited_uses_retry_after() {
        let resp = reqwest::Response::from(
            ::http::Response::builder()
                .status(429)
                .header("Retry-After", "30")
                .body("")
                .unwrap(),
        );
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::RateLimited {
                retry_after_secs: 30
            }
        ));
    }

    #[tokio::test]
    async fn rate_limited_defaults_to_sixty_seconds() {
        let err = check_response(mock_response(429, "")).await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::RateLimited {
                retry_after_secs: 60
            }
        ));
    }

    #[tokio::test]
    async fn quota_403_is_quota_exceeded() {
        let body = r#"{"error":{"errors":[{"reason":"dailyLimitExceeded"}]}}"#;
        let err = check_response(mock_response(403, body)).await.unwrap_err();
        assert!(matches!(err, SearchError::QuotaExceeded(_)));
    }

    #[tokio::test]
    async fn other_403_is_api_error() {
        let err = check_response(mock_response(403, "forbidden"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn success_passes_through() {
        assert!(check_response(mock_response(200, "{}")).await.is_ok());
    }
}
