#![cfg(test)]
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// A loopback service publishing a descriptor at the well-known path.
pub struct ServiceFixture {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl ServiceFixture {
    pub async fn start(bind: Ipv4Addr, title: &str) -> anyhow::Result<Self> {
        Self::serve(bind, descriptor(title)).await
    }

    pub async fn serve(bind: Ipv4Addr, body: Value) -> anyhow::Result<Self> {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let router = Router::new().route(
            "/firerest/config.json",
            get(move || {
                let counter = Arc::clone(&counter);
                let body = body.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(body)
                }
            }),
        );

        let listener = TcpListener::bind((bind, 0)).await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(Self { addr, hits })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub fn descriptor(title: &str) -> Value {
    json!({
        "FireREST": { "title": title, "provider": "beacon fixture", "version": "1.0" },
        "cv": { "camera_map": {} }
    })
}
