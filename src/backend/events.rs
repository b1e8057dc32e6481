use futures_util::StreamExt;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::BackendClient;

/// Status text for the current launch or download step.
pub const STATUS_EVENT: &str = "progress";
/// Percentage (0..=100) of the current download.
pub const PROGRESS_EVENT: &str = "progressBar";

#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    Status(String),
    Progress(f32),
    /// The stream ended or could not be opened. Sent once, last.
    Disconnected(String),
}

#[derive(Deserialize)]
struct RawEvent {
    event: String,
    #[serde(default)]
    payload: Value,
}

/// Parse one line of the event stream. Blank lines and unknown event names
/// yield `Ok(None)`.
pub fn parse_event_line(line: &str) -> Result<Option<BackendEvent>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let raw: RawEvent = serde_json::from_str(line).map_err(|err| err.to_string())?;
    match raw.event.as_str() {
        STATUS_EVENT => match raw.payload {
            Value::String(text) => Ok(Some(BackendEvent::Status(text))),
            other => Err(format!("{STATUS_EVENT} payload is not text: {other}")),
        },
        PROGRESS_EVENT => raw
            .payload
            .as_f64()
            .map(|value| Some(BackendEvent::Progress(value as f32)))
            .ok_or_else(|| format!("{PROGRESS_EVENT} payload is not a number: {}", raw.payload)),
        other => {
            debug!("events: ignoring unknown event {other:?}");
            Ok(None)
        }
    }
}

/// Follow the backend event stream, forwarding events until it ends.
pub fn spawn_event_listener(
    runtime: &Handle,
    client: BackendClient,
    events: mpsc::UnboundedSender<BackendEvent>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        let reason = match follow_events(&client, &events).await {
            Ok(()) => "event stream closed".to_owned(),
            Err(err) => err,
        };
        warn!("events: {reason}");
        let _ = events.send(BackendEvent::Disconnected(reason));
    })
}

async fn follow_events(
    client: &BackendClient,
    events: &mpsc::UnboundedSender<BackendEvent>,
) -> Result<(), String> {
    let url = format!("{}/events", client.base_url());
    let resp = client
        .http()
        .get(&url)
        .send()
        .await
        .map_err(|err| format!("GET {url} failed: {err}"))?
        .error_for_status()
        .map_err(|err| format!("GET {url} failed: {err}"))?;
    info!("events: subscribed to {url}");

    let mut stream = resp.bytes_stream();
    let mut pending: Vec<u8> = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| format!("stream error: {err}"))?;
        pending.extend_from_slice(&chunk);
        while let Some(newline) = pending.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = pending.drain(..=newline).collect();
            forward_line(&String::from_utf8_lossy(&line), events)?;
        }
    }
    if !pending.is_empty() {
        forward_line(&String::from_utf8_lossy(&pending), events)?;
    }
    Ok(())
}

fn forward_line(line: &str, events: &mpsc::UnboundedSender<BackendEvent>) -> Result<(), String> {
    match parse_event_line(line) {
        Ok(Some(event)) => events
            .send(event)
            .map_err(|_| "event receiver dropped".to_owned()),
        Ok(None) => Ok(()),
        Err(err) => {
            warn!("events: skipping malformed line ({err})");
            Ok(())
        }
    }
}

/// What the sidebar shows about a running download.
///
/// Events are applied in arrival order and the latest one wins.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    pub downloading: bool,
    pub percent: f32,
    pub status: String,
}

impl DownloadProgress {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            downloading: false,
            percent: 0.0,
            status: status.into(),
        }
    }

    pub fn start(&mut self) {
        self.downloading = true;
        self.percent = 0.0;
    }

    pub fn stop(&mut self) {
        self.downloading = false;
    }

    pub fn apply(&mut self, event: &BackendEvent) {
        match event {
            BackendEvent::Status(text) => self.status = text.clone(),
            BackendEvent::Progress(value) => {
                let value = *value;
                let value = if value.is_finite() {
                    value.clamp(0.0, 100.0)
                } else {
                    0.0
                };
                self.percent = value;
                if value >= 100.0 {
                    self.downloading = false;
                }
            }
            BackendEvent::Disconnected(_) => {}
        }
    }

    pub fn fraction(&self) -> f32 {
        self.percent / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;

    #[test]
    fn parses_both_event_kinds() {
        assert_eq!(
            parse_event_line(r#"{"event":"progress","payload":"Downloading assets"}"#),
            Ok(Some(BackendEvent::Status("Downloading assets".into())))
        );
        assert_eq!(
            parse_event_line(r#"{"event":"progressBar","payload":42}"#),
            Ok(Some(BackendEvent::Progress(42.0)))
        );
        assert_eq!(parse_event_line("   "), Ok(None));
        assert_eq!(
            parse_event_line(r#"{"event":"heartbeat","payload":null}"#),
            Ok(None)
        );
    }

    #[test]
    fn rejects_mistyped_payloads() {
        assert!(parse_event_line(r#"{"event":"progress","payload":3}"#).is_err());
        assert!(parse_event_line(r#"{"event":"progressBar","payload":"half"}"#).is_err());
        assert!(parse_event_line("{not json").is_err());
    }

    #[test]
    fn progress_reaching_100_ends_download() {
        let mut progress = DownloadProgress::new("Ready to play");
        progress.start();
        assert!(progress.downloading);

        progress.apply(&BackendEvent::Status("Downloading libraries".into()));
        progress.apply(&BackendEvent::Progress(55.0));
        assert!(progress.downloading);
        assert_eq!(progress.status, "Downloading libraries");
        assert_eq!(progress.fraction(), 0.55);

        progress.apply(&BackendEvent::Progress(100.0));
        assert!(!progress.downloading);
        assert_eq!(progress.percent, 100.0);
    }

    #[test]
    fn last_value_wins_and_values_are_clamped() {
        let mut progress = DownloadProgress::new("");
        progress.start();
        progress.apply(&BackendEvent::Progress(80.0));
        progress.apply(&BackendEvent::Progress(30.0));
        assert_eq!(progress.percent, 30.0);

        progress.apply(&BackendEvent::Progress(-5.0));
        assert_eq!(progress.percent, 0.0);
        progress.apply(&BackendEvent::Progress(f32::NAN));
        assert_eq!(progress.percent, 0.0);
        progress.apply(&BackendEvent::Progress(250.0));
        assert_eq!(progress.percent, 100.0);
        assert!(!progress.downloading);
    }

    #[tokio::test]
    async fn listener_forwards_stream_then_reports_disconnect() {
        let body = [
            r#"{"event":"progress","payload":"Downloading 1.21.4"}"#,
            "garbage",
            r#"{"event":"progressBar","payload":10}"#,
            r#"{"event":"progressBar","payload":100}"#,
        ]
        .join("\n");
        let (base, mut requests) = serve(vec![("200 OK", body)]).await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_event_listener(&Handle::current(), BackendClient::new(base), tx)
            .await
            .unwrap();

        assert_eq!(requests.recv().await.unwrap(), "GET /events HTTP/1.1");
        assert_eq!(
            rx.recv().await,
            Some(BackendEvent::Status("Downloading 1.21.4".into()))
        );
        assert_eq!(rx.recv().await, Some(BackendEvent::Progress(10.0)));
        assert_eq!(rx.recv().await, Some(BackendEvent::Progress(100.0)));
        assert!(matches!(rx.recv().await, Some(BackendEvent::Disconnected(_))));
    }

    #[tokio::test]
    async fn listener_reports_unavailable_stream() {
        let (base, _requests) = serve(vec![("404 Not Found", String::new())]).await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_event_listener(&Handle::current(), BackendClient::new(base), tx)
            .await
            .unwrap();

        match rx.recv().await {
            Some(BackendEvent::Disconnected(reason)) => assert!(reason.contains("404")),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
