#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use devcamper_api::auth::{generate_jwt, password::hash_password};
use devcamper_api::config::AppConfig;
use devcamper_api::database::models::{Location, NewUser, User};
use devcamper_api::database::DatabaseManager;
use devcamper_api::services::geocoder::GeocodeError;
use devcamper_api::services::mailer::MailError;
use devcamper_api::services::{Geocoder, Mailer, Message};
use devcamper_api::state::AppState;
use devcamper_api::types::Role;

pub const PASSWORD: &str = "123456";

/// Every address lands on the same Boston point.
pub struct FixedGeocoder;

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, address: &str) -> Result<Location, GeocodeError> {
        let mut location = Location::point(-71.104028, 42.350846);
        location.formatted_address = Some(address.to_string());
        location.city = Some("Boston".to_string());
        location.zipcode = Some("02215".to_string());
        Ok(location)
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Message>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: Message) -> Result<(), MailError> {
        self.sent.lock().expect("mailer lock").push(message);
        Ok(())
    }
}

/// A relay that is always down.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: Message) -> Result<(), MailError> {
        Err(MailError::Status(503))
    }
}

/// A live server on an ephemeral port, backed by the database in `DATABASE_URL`
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub upload_dir: PathBuf,
}

/// `None` when no database is configured; callers return early.
pub async fn spawn_app() -> Result<Option<TestApp>> {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut AppConfig)) -> Result<Option<TestApp>> {
    spawn(customize, None).await
}

/// Mail goes to `mailer` instead of the recording stub.
pub async fn spawn_app_with_mailer(mailer: Arc<dyn Mailer>) -> Result<Option<TestApp>> {
    spawn(|_| {}, Some(mailer)).await
}

async fn spawn(
    customize: impl FnOnce(&mut AppConfig),
    mailer_override: Option<Arc<dyn Mailer>>,
) -> Result<Option<TestApp>> {
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping");
        return Ok(None);
    };

    let upload_dir = std::env::temp_dir().join(format!("devcamper-uploads-{}", Uuid::new_v4().simple()));
    tokio::fs::create_dir_all(&upload_dir).await?;

    let mut config = AppConfig::development();
    config.database.url = url;
    config.database.max_connections = 5;
    config.security.jwt_secret = "integration-secret".to_string();
    config.api.enable_request_logging = false;
    config.upload.dir = upload_dir.clone();
    customize(&mut config);

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    let mailer = Arc::new(RecordingMailer::default());
    let outbound: Arc<dyn Mailer> = match mailer_override {
        Some(other) => other,
        None => mailer.clone(),
    };
    let state = AppState::new(config, pool, Arc::new(FixedGeocoder), outbound);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = devcamper_api::server::app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    Ok(Some(TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        state,
        mailer,
        upload_dir,
    }))
}

pub fn unique(prefix: &str) -> String {
    format!("{}{}", prefix, &Uuid::new_v4().simple().to_string()[..10])
}

pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        read(request.send().await?).await
    }

    pub async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, self.url(path)).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        read(request.send().await?).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send_json(reqwest::Method::POST, path, token, body).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send_json(reqwest::Method::PUT, path, token, body).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut request = self.client.delete(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        read(request.send().await?).await
    }

    /// Self-registration through the API
    pub async fn register(&self, role: Role) -> Result<Account> {
        let email = format!("{}@devcamper.test", unique("user"));
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({ "name": "Test User", "email": email, "password": PASSWORD, "role": role }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
        let token = body["token"].as_str().context("token")?.to_string();

        let (_, me) = self.get("/auth/me", Some(&token)).await?;
        let id = me["data"]["id"].as_str().context("id")?.parse()?;
        Ok(Account { id, email, token })
    }

    /// Admins cannot self-register; insert one directly.
    pub async fn admin(&self) -> Result<Account> {
        let email = format!("{}@devcamper.test", unique("admin"));
        let input = NewUser {
            name: Some("Admin".to_string()),
            email: Some(email.clone()),
            password: Some(PASSWORD.to_string()),
            role: Some(Role::Admin),
        };
        let hash = hash_password(PASSWORD)?;
        let id = User::insert(&self.state.pool, &input, &hash).await?;
        let token = generate_jwt(&self.state.config.security, id)?;
        Ok(Account { id, email, token })
    }

    pub async fn create_bootcamp(&self, owner: &Account) -> Result<Value> {
        let (status, body) = self
            .post("/bootcamps", Some(&owner.token), bootcamp_payload(&unique("Camp ")))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create bootcamp failed: {} {}", status, body);
        Ok(body["data"].clone())
    }

    pub async fn create_course(&self, owner: &Account, bootcamp: &str, tuition: i64) -> Result<Value> {
        let (status, body) = self
            .post(
                &format!("/bootcamps/{}/courses", bootcamp),
                Some(&owner.token),
                json!({
                    "title": "Full Stack Web Development",
                    "description": "HTML, CSS, JavaScript and a backend",
                    "weeks": 12,
                    "tuition": tuition,
                    "minimumSkill": "intermediate",
                    "scholarshipAvailable": true
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create course failed: {} {}", status, body);
        Ok(body["data"].clone())
    }

    pub async fn bootcamp(&self, id: &str) -> Result<Value> {
        let (status, body) = self.get(&format!("/bootcamps/{}", id), None).await?;
        anyhow::ensure!(status == StatusCode::OK, "get bootcamp failed: {} {}", status, body);
        Ok(body["data"].clone())
    }
}

pub fn bootcamp_payload(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Full stack JavaScript bootcamp in the heart of Boston",
        "website": "https://devworks.com",
        "phone": "(111) 111-1111",
        "email": "enroll@devworks.com",
        "address": "233 Bay State Rd Boston MA 02215",
        "careers": ["Web Development", "UI/UX"],
        "housing": true,
        "jobAssistance": true
    })
}

async fn read(response: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    Ok((status, body))
}
