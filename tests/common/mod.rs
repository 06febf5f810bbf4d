#![allow(dead_code)]

use reqwest::{header, multipart, Client, StatusCode};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use gadget_shop::{config::Config, create_app, init_database};

pub const ADMIN_PASSWORD: &str = "admin-password";
pub const USER_PASSWORD: &str = "user-password";
pub const MAX_IMAGE_SIZE: usize = 64 * 1024;

/// A running server backed by its own sqlite file and upload directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub upload_dir: PathBuf,
}

pub async fn spawn_app() -> TestApp {
    let root = std::env::temp_dir().join(format!("gadget-shop-{}", Uuid::new_v4()));
    let upload_dir = root.join("uploads");
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .expect("Failed to create upload dir");

    let config = Config {
        database_url: format!("sqlite://{}?mode=rwc", root.join("shop.db").display()),
        secret: "test-secret".to_owned(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        upload_dir: upload_dir.clone(),
        max_image_size: MAX_IMAGE_SIZE,
        admin_password: ADMIN_PASSWORD.to_owned(),
        user_password: USER_PASSWORD.to_owned(),
    };

    let db = init_database(&config).await.expect("Failed to set up database");
    let app = create_app(Arc::new(db), Arc::new(config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        upload_dir,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/api{}", self.addr, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to send login request");
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await.unwrap();
        body["token"]
            .as_str()
            .expect("Token not found in login response")
            .to_owned()
    }

    pub async fn admin_headers(&self) -> header::HeaderMap {
        bearer(&self.login("admin", ADMIN_PASSWORD).await)
    }

    pub async fn user_headers(&self) -> header::HeaderMap {
        bearer(&self.login("user", USER_PASSWORD).await)
    }

    pub async fn upload_image(&self, name: &str) -> Value {
        let form = multipart::Form::new().part(
            name.to_owned(),
            multipart::Part::bytes(b"\x89PNG fake image".to_vec())
                .file_name(format!("{name}.png"))
                .mime_str("image/png")
                .unwrap(),
        );
        let response = self
            .client
            .post(self.url("/admin/image"))
            .headers(self.admin_headers().await)
            .multipart(form)
            .send()
            .await
            .expect("Failed to upload image");
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.unwrap()
    }

    /// Id of a seeded category (`notebooks` or `smartphones`).
    pub async fn category_id(&self, slug: &str) -> i64 {
        let categories: Value = self
            .client
            .get(self.url("/category"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        categories
            .as_array()
            .unwrap()
            .iter()
            .find(|category| category["slug"] == slug)
            .and_then(|category| category["id"].as_i64())
            .expect("Seeded category is missing")
    }

    pub async fn create_notebook(&self, slug: &str, price: &str) -> Value {
        let image = self.upload_image(&format!("img_{}", slug.replace('-', "_"))).await;
        let payload = json!({
            "category_id": self.category_id("notebooks").await,
            "title": format!("Notebook {slug}"),
            "slug": slug,
            "image_id": image["id"],
            "price": price,
            "name": "ThinkPad",
            "diagonal": "14",
            "display_type": "IPS",
            "processor_freq": "3.2",
            "ram": "16",
            "video": "Iris Xe",
            "time_without_charge": "10",
        });
        let response = self
            .client
            .post(self.url("/admin/notebook"))
            .headers(self.admin_headers().await)
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.unwrap()
    }

    pub async fn create_smartphone(&self, slug: &str, price: &str, extra: Value) -> Value {
        let image = self.upload_image(&format!("img_{}", slug.replace('-', "_"))).await;
        let mut payload = json!({
            "category_id": self.category_id("smartphones").await,
            "title": format!("Phone {slug}"),
            "slug": slug,
            "image_id": image["id"],
            "price": price,
            "name": "Pixel",
            "diagonal": "6.1",
            "display_type": "OLED",
            "resolution": "1080x2400",
            "accum_volume": "4500",
            "ram": "8",
            "main_cam_mp": "50",
            "frontal_cam_mp": "10",
        });
        if let (Some(payload), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
            payload.extend(extra.clone());
        }
        let response = self
            .client
            .post(self.url("/admin/smartphone"))
            .headers(self.admin_headers().await)
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.unwrap()
    }
}

pub fn bearer(token: &str) -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {token}"))
            .expect("Failed to create Authorization header"),
    );
    headers
}

/// Decimal fields are serialized as strings.
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    value
        .as_str()
        .expect("Decimal should be a string")
        .parse()
        .expect("Decimal should parse")
}
