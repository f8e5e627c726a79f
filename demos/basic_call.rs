//! Basic demo of the four verbs against a public test API.
//!
//! This demo shows how to:
//! - Point a client at an API with `configure`
//! - Read with query parameters
//! - Create, replace and remove resources
//! - Supply a token through an in-memory store
//!
//! Run with: `cargo run --example basic_call`

use fetchwire::{Client, ConfigOverrides, Error, MemoryStore, StoreTokenResolver};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    body: String,
}

#[derive(Debug, Serialize)]
struct NewPost {
    title: String,
    body: String,
    #[serde(rename = "userId")]
    user_id: u32,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("fetchwire=debug,basic_call=info")
        .init();

    let tokens = Arc::new(MemoryStore::new());
    tokens.set("access_token", "\"demo-token\"");

    let client = Client::builder()
        .token_resolver(StoreTokenResolver::new(tokens))
        .build()?;
    client.configure(ConfigOverrides::new().base_address("https://jsonplaceholder.typicode.com"));

    println!("=== Read with query parameters ===");
    let posts = client
        .read::<Vec<Post>>("/posts", json!({"userId": 1}))
        .await?;
    println!("User 1 has {} posts", posts.len());
    println!("Request latency: {:?}", posts.latency);
    println!();

    println!("=== Create ===");
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };
    let created = client.create::<Post>("/posts", &new_post).await?;
    println!("Created post ID: {}", created.id);
    println!("Status code: {}", created.status);
    println!();

    println!("=== Replace ===");
    let replaced = client
        .replace::<Post>(
            "/posts/1",
            json!({"id": 1, "userId": 1, "title": "Replaced", "body": "New body"}),
        )
        .await?;
    println!("Replaced title: {}", replaced.title);
    println!();

    println!("=== Remove ===");
    let removed = client.remove::<serde_json::Value>("/posts/1", ()).await?;
    println!("Remove answered {} with {}", removed.status, removed.raw_body);

    Ok(())
}
