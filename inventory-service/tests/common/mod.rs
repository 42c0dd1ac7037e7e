use std::sync::Arc;

use auth::Authenticator;
use auth::ClaimSet;
use auth::FixedClock;
use auth::JwtHandler;
use auth::PasswordHasher;
use auth::PasswordScheme;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use inventory_service::domain::user::ports::UserServicePort;
use inventory_service::domain::user::service::UserService;
use inventory_service::inbound::http::router::create_router;
use inventory_service::outbound::repositories::InMemoryUserRepository;
use serde_json::json;

pub const TEST_JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server backed by the in-memory directory
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        // Minimum bcrypt cost keeps the suite fast
        let authenticator = Arc::new(Authenticator::from_parts(
            PasswordHasher::with_scheme(PasswordScheme::Bcrypt { cost: 4 }),
            JwtHandler::new(TEST_JWT_SECRET),
        ));

        let user_repository = Arc::new(InMemoryUserRepository::new());
        let user_service: Arc<dyn UserServicePort> = Arc::new(UserService::new(
            user_repository,
            Arc::clone(&authenticator),
        ));

        let router = create_router(user_service, authenticator);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a user and assert it was created
    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Submit the login form
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register then log in, returning the access token
    pub async fn access_token_for(&self, username: &str, password: &str) -> String {
        let email = format!("{}@example.com", username);
        let response = self.register(username, &email, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let response = self.login(username, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_string()
    }
}

/// Sign a token with the server secret as if it had been issued at `issued_at`
pub fn token_issued_at(sub: &str, issued_at: DateTime<Utc>, ttl: Duration) -> String {
    JwtHandler::new(TEST_JWT_SECRET)
        .with_clock(Arc::new(FixedClock(issued_at)))
        .issue_with_ttl(&ClaimSet::new(sub), ttl)
        .expect("Failed to issue token")
}
