#![allow(dead_code)]

use contacts_service::config::{ContactsConfig, DatastoreBackend, MongoConfig};
use contacts_service::repository::InMemoryContactStore;
use contacts_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<InMemoryContactStore>,
    pub client: reqwest::Client,
}

pub fn test_config() -> ContactsConfig {
    ContactsConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            request_timeout_secs: 30,
        },
        mongodb: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "contacts_test".to_string(),
            collection: "contacts".to_string(),
            server_selection_timeout_ms: 1_000,
        },
        datastore: DatastoreBackend::Memory,
    }
}

impl TestApp {
    /// Spawn the service on a random port, backed by an in-memory store.
    pub async fn spawn() -> Self {
        let store = Arc::new(InMemoryContactStore::new("memory://contacts-test"));

        let app = Application::build_with_store(test_config(), store.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        let ping_url = format!("{}/healthz/ping", address);
        for _ in 0..50 {
            if client.get(&ping_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            client,
        }
    }

    pub fn contacts_url(&self) -> String {
        format!("{}/reference/contacts", self.address)
    }

    pub fn contact_url(&self, id: &str) -> String {
        format!("{}/reference/contacts/{}", self.address, id)
    }

    /// POST a contact and return its generated id.
    pub async fn create_contact(&self, body: serde_json::Value) -> String {
        let response = self
            .client
            .post(self.contacts_url())
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        body["data"]["id"]
            .as_str()
            .expect("Missing contact id")
            .to_string()
    }
}
