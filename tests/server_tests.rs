//! End-to-end tests over a real TCP listener.
//!
//! Requests are issued concurrently with reqwest, so lookups interleave on
//! the server the same way they do in production.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cache_aside::{
    api::create_router, models::UserRecord, origin::SimulatedDatabase, store::MemoryStore,
    AppState, CacheGateway, GatewayOptions,
};
use serde_json::Value;
use tokio::net::TcpListener;

async fn spawn_server(options: GatewayOptions, latency: Duration) -> SocketAddr {
    let gateway = CacheGateway::new(
        Arc::new(MemoryStore::new()),
        Arc::new(SimulatedDatabase::new(latency)),
        options,
    );
    let app = create_router(AppState::new(gateway));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn origin_fetches(client: &reqwest::Client, addr: SocketAddr) -> u64 {
    let stats: Value = client
        .get(format!("http://{}/stats", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    stats["origin_fetches"].as_u64().unwrap()
}

#[tokio::test]
async fn test_second_lookup_is_served_from_cache() {
    let addr = spawn_server(GatewayOptions::default(), Duration::from_secs(1)).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/user/42", addr);

    let started = Instant::now();
    let first = client.get(&url).send().await.unwrap();
    let cold = started.elapsed();
    assert_eq!(first.status(), reqwest::StatusCode::OK);
    assert_eq!(first.headers()["x-cache"], "MISS");
    let user: UserRecord = first.json().await.unwrap();
    assert_eq!(user, UserRecord::new("42", "User 42"));
    assert!(cold >= Duration::from_secs(1));

    let started = Instant::now();
    let second = client.get(&url).send().await.unwrap();
    let warm = started.elapsed();
    assert_eq!(second.headers()["x-cache"], "HIT");
    assert_eq!(second.text().await.unwrap(), r#"{"id":"42","name":"User 42"}"#);
    assert!(warm < Duration::from_millis(500));

    assert_eq!(origin_fetches(&client, addr).await, 1);
}

#[tokio::test]
async fn test_concurrent_misses_are_not_deduplicated_by_default() {
    let addr = spawn_server(GatewayOptions::default(), Duration::from_millis(300)).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/user/7", addr);

    let (a, b) = tokio::join!(client.get(&url).send(), client.get(&url).send());
    let expected = UserRecord::new("7", "User 7");
    assert_eq!(a.unwrap().json::<UserRecord>().await.unwrap(), expected);
    assert_eq!(b.unwrap().json::<UserRecord>().await.unwrap(), expected);

    let fetches = origin_fetches(&client, addr).await;
    assert!((1..=2).contains(&fetches), "origin fetched {} times", fetches);
}

#[tokio::test]
async fn test_concurrent_misses_share_fetch_with_single_flight() {
    let options = GatewayOptions {
        single_flight: true,
        ..GatewayOptions::default()
    };
    let addr = spawn_server(options, Duration::from_millis(300)).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/user/7", addr);

    let responses = fetch_concurrently(&client, &url, 4).await;
    for user in responses {
        assert_eq!(user, UserRecord::new("7", "User 7"));
    }

    assert_eq!(origin_fetches(&client, addr).await, 1);
}

async fn fetch_concurrently(client: &reqwest::Client, url: &str, n: usize) -> Vec<UserRecord> {
    let tasks: Vec<_> = (0..n)
        .map(|_| {
            let request = client.get(url).send();
            tokio::spawn(async move { request.await.unwrap().json::<UserRecord>().await.unwrap() })
        })
        .collect();

    let mut users = Vec::with_capacity(n);
    for task in tasks {
        users.push(task.await.unwrap());
    }
    users
}
