use serde_json::Value;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::DGError;
use crate::engine::Record;

pub type FetchResult = Result<Vec<Record>, DGError>;

// Envelope members under which a record source may nest its array. The demo
// sources return either a bare array or a "fields" style envelope.
const ENVELOPE_KEYS: [&str; 4] = ["fields", "records", "record", "data"];

/// Fire-and-forget fetch of the record set. The result lands on the channel;
/// the model polls the receiver on every tick. There is no cancellation, the
/// last response to arrive wins.
pub fn spawn_fetch(url: String, sender: Sender<FetchResult>) {
    thread::spawn(move || {
        info!("Fetching records from {url} ...");
        let start_time = Instant::now();
        let result = fetch_records(&url);
        if let Ok(records) = &result {
            debug!(
                "Fetched {} records in {}ms",
                records.len(),
                start_time.elapsed().as_millis()
            );
        }
        // A closed receiver means the app is already shutting down.
        let _ = sender.send(result);
    });
}

fn fetch_records(url: &str) -> FetchResult {
    let body = reqwest::blocking::get(url)?.error_for_status()?.text()?;
    let payload: Value = serde_json::from_str(&body)?;
    unwrap_payload(payload)
}

fn unwrap_payload(payload: Value) -> FetchResult {
    match payload {
        Value::Array(items) => collect_records(items),
        Value::Object(mut envelope) => {
            for key in ENVELOPE_KEYS {
                if let Some(Value::Array(items)) = envelope.remove(key) {
                    return collect_records(items);
                }
            }
            Err(DGError::BadPayload(
                "object payload holds no record array".to_string(),
            ))
        }
        other => Err(DGError::BadPayload(format!(
            "expected a record array, got {other}"
        ))),
    }
}

fn collect_records(items: Vec<Value>) -> FetchResult {
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            other => Err(DGError::BadPayload(format!(
                "expected a flat record object, got {other}"
            ))),
        })
        .collect()
}
