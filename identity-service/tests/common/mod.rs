#![allow(dead_code)]

pub mod database;
pub mod memory;

use std::sync::Arc;

use auth::ManualClock;
use auth::PasswordHasher;
use auth::TokenCodec;
use identity_service::domain::account::service::AuthService;
use identity_service::inbound::http::router::create_router;
use serde_json::json;
use serde_json::Value;

use memory::InMemoryStore;
use memory::RecordingEmailSender;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const STRONG_PASSWORD: &str = "Str0ng!Pass";

pub type TestAuthService = AuthService<
    InMemoryStore,
    InMemoryStore,
    InMemoryStore,
    InMemoryStore,
    RecordingEmailSender,
>;

/// Service wired to in-memory adapters and a manual clock.
pub struct TestServices {
    pub service: Arc<TestAuthService>,
    pub store: Arc<InMemoryStore>,
    pub email: Arc<RecordingEmailSender>,
    pub clock: Arc<ManualClock>,
}

impl TestServices {
    pub fn new() -> Self {
        Self::with_email(RecordingEmailSender::new())
    }

    pub fn with_email(email: Arc<RecordingEmailSender>) -> Self {
        let store = InMemoryStore::new();
        let clock = Arc::new(ManualClock::starting_now());
        let codec = Arc::new(TokenCodec::new(JWT_SECRET, clock.clone()));

        // Minimum Argon2 cost keeps the suite fast.
        let hasher = PasswordHasher::with_cost(8, 1, 1).expect("Failed to build test hasher");

        let service = AuthService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            email.clone(),
            codec,
            clock.clone(),
        )
        .with_password_hasher(hasher)
        .with_reset_link_base("https://app.test/reset");

        Self {
            service: Arc::new(service),
            store,
            email,
            clock,
        }
    }
}

/// Test application that serves the HTTP router on a random port
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub services: TestServices,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServices::new()).await
    }

    pub async fn spawn_with(services: TestServices) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let router = create_router(services.service.clone());

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            services,
        }
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(format!("{}{}", self.address, path))
    }

    /// Register a subject and return its id.
    pub async fn register(&self, username: &str, email: &str) -> String {
        let response = self
            .post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": STRONG_PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Log in and return the `data` object of the token pair response.
    pub async fn login(&self, identifier: &str, password: &str) -> Value {
        let response = self
            .post("/api/auth/login")
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }
}
