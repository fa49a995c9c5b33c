use rating_service::config::RatingConfig;
use rating_service::services::classifiers::MockClassifier;
use rating_service::services::TextClassifier;
use rating_service::startup::Application;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the service with the default mock classifier.
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(MockClassifier::new())).await
    }

    /// Spawn the service on a random port around `classifier`.
    pub async fn spawn_with(classifier: Arc<dyn TextClassifier>) -> Self {
        let mut config = RatingConfig::load().expect("Failed to load configuration");
        config.common.host = "127.0.0.1".to_string();
        config.common.port = 0; // Random port for testing

        let app = Application::build_with_classifier(config, classifier)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            client,
        }
    }

    pub async fn post_review(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/review", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
