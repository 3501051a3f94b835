mod common;

use anyhow::Result;
use portfolio_api::auth::TokenService;
use reqwest::StatusCode;

#[tokio::test]
async fn me_without_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/me", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    // Missing-token case must not clear the (nonexistent) cookie
    assert!(res.headers().get("set-cookie").is_none());

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "No token, authorization denied");
    assert!(body.get("user").is_none(), "no user field expected: {}", body);
    Ok(())
}

#[tokio::test]
async fn me_with_garbage_token_is_rejected_and_cookie_cleared() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/me", server.base_url))
        .header("cookie", "token=garbage")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let set_cookie = res
        .headers()
        .get("set-cookie")
        .expect("invalid token must clear the cookie")
        .to_str()?
        .to_string();
    assert!(set_cookie.starts_with("token=;"), "got: {set_cookie}");
    assert!(set_cookie.contains("Max-Age=0"), "got: {set_cookie}");

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Token is not valid");
    Ok(())
}

#[tokio::test]
async fn resume_mutation_requires_a_session() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .put(format!("{}/api/resume", server.base_url))
        .json(&serde_json::json!({ "content": { "summary": "hi" } }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_routes_require_a_session() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/admin/stats", server.base_url))
        .send()
        .await?;

    // Auth gate fires before the admin gate
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_routes_reject_non_admin_sessions() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // A real session signed with the server's secret, minus the admin claim
    let token = TokenService::new(common::TEST_JWT_SECRET, 7).issue(1, false)?;

    let res = client
        .get(format!("{}/api/admin/stats", server.base_url))
        .header("cookie", format!("token={token}"))
        .send()
        .await?;

    // Logged in but not privileged is 403, distinct from the 401 cases
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Access denied. Admin privileges required.");
    Ok(())
}

#[tokio::test]
async fn logout_clears_the_session_cookie() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/logout", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);

    let set_cookie = res
        .headers()
        .get("set-cookie")
        .expect("logout must clear the cookie")
        .to_str()?
        .to_string();
    assert!(set_cookie.starts_with("token=;"), "got: {set_cookie}");
    assert!(set_cookie.contains("Max-Age=0"), "got: {set_cookie}");
    assert!(set_cookie.contains("HttpOnly"), "got: {set_cookie}");

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Logged out successfully");
    Ok(())
}
