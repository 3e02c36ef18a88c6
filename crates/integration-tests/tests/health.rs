//! Health endpoint tests.

use reqwest::StatusCode;

use shopfront_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_liveness_and_readiness() {
    let ctx = TestContext::new().await;
    let client = TestContext::client();

    let resp = client
        .get(ctx.url("/health"))
        .send()
        .await
        .expect("Failed to get /health");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");

    let resp = client
        .get(ctx.url("/health/ready"))
        .send()
        .await
        .expect("Failed to get /health/ready");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}
