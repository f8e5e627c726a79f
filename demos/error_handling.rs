//! Demo of the error taxonomy.
//!
//! This demo shows how to:
//! - Tell protocol, serialization and transport failures apart
//! - Inspect status codes on failures
//! - Override configuration for a single call
//!
//! Run with: `cargo run --example error_handling`

use fetchwire::{CallOptions, Client, ConfigOverrides, Error};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    id: u32,
    title: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("fetchwire=info")
        .init();

    let client = Client::builder()
        .base_address("https://jsonplaceholder.typicode.com")
        .build()?;

    println!("=== Protocol failure ===");
    match client.read::<Post>("/posts/999999", ()).await {
        Ok(response) => println!("Success: {:?}", response.data),
        Err(Error::Protocol {
            status,
            message,
            headers,
        }) => {
            println!("HTTP failure!");
            println!("  Status: {}", status);
            println!("  Message: {}", message);
            println!("  Content-Type: {:?}", headers.get("content-type"));
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Serialization failure ===");
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct WrongSchema {
        nonexistent_field: String,
    }

    match client.read::<WrongSchema>("/posts/1", ()).await {
        Ok(_) => println!("Unexpected success"),
        Err(Error::Serialization {
            status,
            raw_response,
            source,
        }) => {
            println!("Parse failed!");
            println!("  Status: {}", status);
            println!("  Parser error: {}", source);
            println!(
                "  Raw response (first 200 chars): {}",
                raw_response.chars().take(200).collect::<String>()
            );
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Transport failure (per-call base address) ===");
    let options = CallOptions::new().overrides(
        ConfigOverrides::new().base_address("https://this-domain-does-not-exist-12345.com"),
    );
    match client
        .read_with::<serde_json::Value>("/", (), &options)
        .await
    {
        Ok(_) => println!("Unexpected success"),
        Err(Error::Transport(e)) => {
            println!("Transport error!");
            println!("  Error: {}", e);
            println!("  Is connect error: {}", e.is_connect());
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Shared configuration is untouched ===");
    println!("Base address is still {}", client.config().base_address);

    Ok(())
}
