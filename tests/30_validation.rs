mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn signup_rejects_invalid_payload_per_field() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({
            "name": "",
            "email": "not-an-email",
            "password": "123"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    let errors = body["errors"].as_array().expect("errors array");
    let fields: Vec<_> = errors
        .iter()
        .map(|e| e["field"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(fields, ["name", "email", "password"]);
    Ok(())
}

#[tokio::test]
async fn login_requires_email_and_password() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "email": "bad" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    // Validation failures never set a session cookie
    assert!(res.headers().get("set-cookie").is_none());

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["errors"].as_array().map(|a| a.len()), Some(2));
    Ok(())
}

#[tokio::test]
async fn contact_form_rejects_invalid_payload() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/contact", server.base_url))
        .json(&json!({
            "name": "Ann",
            "email": "nope",
            "message": ""
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    let errors = body["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 2);
    Ok(())
}
