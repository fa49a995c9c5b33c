mod common;

use common::TestApp;
use reqwest::StatusCode;

#[tokio::test]
async fn openapi_document_lists_public_routes() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/openapi.json", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let doc: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(doc["info"]["title"], "Rating Prediction API");
    assert!(doc["paths"]["/review"]["post"].is_object());
    assert!(doc["paths"]["/health"]["get"].is_object());
    assert!(doc["paths"].get("/metrics").is_none());

    let schemas = &doc["components"]["schemas"];
    assert_eq!(schemas["ReviewRequest"]["required"], serde_json::json!(["review"]));
    assert!(schemas["Prediction"]["properties"]["label"].is_object());
    assert!(schemas["Prediction"]["properties"]["score"].is_object());
}

#[tokio::test]
async fn swagger_ui_is_served() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/docs/", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("swagger-ui"));
}
