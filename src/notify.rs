use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::warn;

use crate::types::RestockEvent;

/// Operator-facing sink for restock events.
///
/// Delivery is fire-and-forget: implementations log their own failures and
/// never retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &RestockEvent);
}

/// Posts restock embeds to a Discord webhook.
pub struct DiscordWebhook {
    client: reqwest::Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

/// Discord embed body for one restock.
pub fn embed_payload(event: &RestockEvent) -> Value {
    json!({
        "embeds": [{
            "title": event.title,
            "url": event.url,
            "color": event.accent_color,
            "fields": [
                {"name": "Color", "value": event.color, "inline": true},
                {"name": "Size", "value": event.size, "inline": true},
            ],
            "thumbnail": {"url": event.image},
            "footer": {"text": event.footer},
            "timestamp": event.timestamp,
        }]
    })
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn notify(&self, event: &RestockEvent) {
        let request = self.client.post(&self.url).json(&embed_payload(event));
        let title = event.title.clone();
        tokio::spawn(async move {
            match request.send().await {
                Ok(resp) if !resp.status().is_success() => {
                    warn!("Webhook rejected restock for {title}: {}", resp.status());
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to send webhook for {title}: {e}"),
            }
        });
    }
}

/// Delivers every event to each inner sink in order.
#[derive(Default)]
pub struct Fanout {
    sinks: Vec<Box<dyn Notifier>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl Notifier + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl Notifier for Fanout {
    async fn notify(&self, event: &RestockEvent) {
        for sink in &self.sinks {
            sink.notify(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::types::ProductId;

    fn event() -> RestockEvent {
        RestockEvent {
            timestamp: "2020-02-20T11:00:00+00:00".to_string(),
            product_id: ProductId::from("A1"),
            title: "Box Logo Hooded Sweatshirt".to_string(),
            url: "https://shop.test/shop/A1".to_string(),
            color: "Black".to_string(),
            size: "M".to_string(),
            image: "https://assets.test/A1.jpg".to_string(),
            footer: "footer".to_string(),
            accent_color: 7785669,
        }
    }

    struct Recorder(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl Notifier for Recorder {
        async fn notify(&self, event: &RestockEvent) {
            self.0.lock().unwrap().push(event.size.clone());
        }
    }

    #[test]
    fn embed_has_color_and_size_fields() {
        let payload = embed_payload(&event());
        let embed = &payload["embeds"][0];
        assert_eq!(embed["title"], "Box Logo Hooded Sweatshirt");
        assert_eq!(embed["url"], "https://shop.test/shop/A1");
        assert_eq!(embed["color"], 7785669);
        assert_eq!(embed["fields"][0]["name"], "Color");
        assert_eq!(embed["fields"][0]["value"], "Black");
        assert_eq!(embed["fields"][1]["name"], "Size");
        assert_eq!(embed["fields"][1]["value"], "M");
        assert_eq!(embed["fields"][1]["inline"], true);
        assert_eq!(embed["thumbnail"]["url"], "https://assets.test/A1.jpg");
        assert_eq!(embed["footer"]["text"], "footer");
        assert_eq!(embed["timestamp"], "2020-02-20T11:00:00+00:00");
    }

    #[tokio::test]
    async fn fanout_delivers_to_every_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let fanout = Fanout::new()
            .with(Recorder(seen.clone()))
            .with(Recorder(seen.clone()));
        assert_eq!(fanout.len(), 2);

        fanout.notify(&event()).await;
        assert_eq!(*seen.lock().unwrap(), vec!["M", "M"]);
    }
}
