//! Client for the launcher backend.
//!
//! Every operation the UI offers is a named command on the backend, invoked as
//! `POST <base>/invoke/<command>` with a JSON object of arguments. Progress of
//! long-running commands arrives separately on the event stream (see
//! [`events`]).

use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;

pub mod events;
pub mod models;

use self::models::{CommandError, ModInfo, VersionCategory, VersionFilters, VersionLoader};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{command}: request failed: {source}")]
    Transport {
        command: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{command}: backend returned {status}")]
    Status { command: String, status: StatusCode },
    #[error("{command}: {message} (code {code})")]
    Command {
        command: String,
        code: i64,
        message: String,
    },
    #[error("{command}: unexpected response: {reason}")]
    Decode { command: String, reason: String },
}

#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|err| {
                warn!("backend client: falling back to default HTTP client configuration ({err})");
                Client::new()
            });
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Invoke `command` with `args` and decode its JSON result.
    ///
    /// An empty body decodes as `null`, which is what unit-returning commands
    /// send.
    pub async fn invoke<A, T>(&self, command: &str, args: &A) -> Result<T, BackendError>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/invoke/{command}", self.base_url);
        debug!("backend: invoking {command}");
        let resp = self
            .client
            .post(&url)
            .json(args)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                command: command.to_owned(),
                source,
            })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|source| BackendError::Transport {
            command: command.to_owned(),
            source,
        })?;

        if !status.is_success() {
            let err = match serde_json::from_str::<CommandError>(&body) {
                Ok(CommandError { code, message }) => BackendError::Command {
                    command: command.to_owned(),
                    code,
                    message,
                },
                Err(_) => BackendError::Status {
                    command: command.to_owned(),
                    status,
                },
            };
            warn!("backend: {err}");
            return Err(err);
        }

        let body = if body.trim().is_empty() { "null" } else { &body };
        serde_json::from_str(body).map_err(|err| BackendError::Decode {
            command: command.to_owned(),
            reason: err.to_string(),
        })
    }

    pub async fn get_versions(&self) -> Result<Vec<String>, BackendError> {
        self.invoke("get_versions", &json!({})).await
    }

    pub async fn load_categorized_versions(
        &self,
        filters: VersionFilters,
    ) -> Result<Vec<VersionCategory>, BackendError> {
        self.invoke("load_categorized_versions", &filters).await
    }

    pub async fn download_version(&self, loader: &VersionLoader) -> Result<(), BackendError> {
        self.invoke("download_version", &json!({ "versionLoader": loader }))
            .await
    }

    pub async fn get_mods(&self) -> Result<Vec<ModInfo>, BackendError> {
        self.invoke("get_mods", &json!({})).await
    }

    pub async fn toggle_mod(&self, info: &ModInfo, toggle: bool) -> Result<(), BackendError> {
        self.invoke("toggle_mod", &json!({ "modInfo": info, "toggle": toggle }))
            .await
    }

    pub async fn delete_mod(&self, info: &ModInfo) -> Result<(), BackendError> {
        self.invoke("delete_mod", &json!({ "modInfo": info })).await
    }

    /// The backend opens its own file picker for this one.
    pub async fn install_mod_from_local(&self) -> Result<(), BackendError> {
        self.invoke("install_mod_from_local", &json!({})).await
    }

    pub async fn get_username(&self) -> Result<String, BackendError> {
        self.invoke("get_username", &json!({})).await
    }

    pub async fn set_username(&self, username: &str) -> Result<(), BackendError> {
        self.invoke("set_username", &json!({ "username": username }))
            .await
    }

    pub async fn get_profiles(&self) -> Result<Vec<String>, BackendError> {
        self.invoke("get_profiles", &json!({})).await
    }

    pub async fn create_offline_profile(&self, username: &str) -> Result<(), BackendError> {
        self.invoke("create_offline_profile", &json!({ "username": username }))
            .await
    }

    /// Configured game memory in MiB; `None` when never set.
    pub async fn get_ram_usage(&self) -> Result<Option<u64>, BackendError> {
        let value: Value = self.invoke("get_ram_usage", &json!({})).await?;
        Ok(value.as_u64().filter(|mib| *mib > 0))
    }

    pub async fn set_ram_usage(&self, ram_usage: u64) -> Result<(), BackendError> {
        self.invoke("set_ram_usage", &json!({ "ramUsage": ram_usage }))
            .await
    }

    /// Physical memory of the machine in MiB.
    pub async fn get_total_ram(&self) -> Result<u64, BackendError> {
        self.invoke("get_total_ram", &json!({})).await
    }

    pub async fn save(&self) -> Result<(), BackendError> {
        self.invoke("save", &json!({})).await
    }

    pub async fn get_language(&self) -> Result<String, BackendError> {
        self.invoke("get_language", &json!({})).await
    }

    pub async fn set_language(&self, language: &str) -> Result<(), BackendError> {
        self.invoke("set_language", &json!({ "language": language }))
            .await
    }

    pub async fn play(&self, selected_version: &str) -> Result<(), BackendError> {
        self.invoke(
            "play_button_handler",
            &json!({ "selectedVersion": selected_version }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::models::VersionBase;
    use super::*;
    use crate::test_support::serve;

    #[tokio::test]
    async fn posts_arguments_and_decodes_result() {
        let (base, mut requests) =
            serve(vec![("200 OK", r#"["1.21.4","1.20.1"]"#.to_owned())]).await;
        let client = BackendClient::new(base);

        let versions = client.get_versions().await.unwrap();

        assert_eq!(versions, vec!["1.21.4", "1.20.1"]);
        assert_eq!(
            requests.recv().await.unwrap(),
            "POST /invoke/get_versions HTTP/1.1"
        );
        assert_eq!(requests.recv().await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn unit_commands_accept_empty_bodies() {
        let (base, mut requests) = serve(vec![("200 OK", String::new())]).await;
        let client = BackendClient::new(base);

        let loader = VersionLoader {
            id: "1.21.4".into(),
            date: "2024-12-03".into(),
            base: VersionBase::Fabric,
        };
        client.download_version(&loader).await.unwrap();

        assert_eq!(
            requests.recv().await.unwrap(),
            "POST /invoke/download_version HTTP/1.1"
        );
        let body: Value = serde_json::from_str(&requests.recv().await.unwrap()).unwrap();
        assert_eq!(body["versionLoader"]["base"], "FABRIC");
        assert_eq!(body["versionLoader"]["id"], "1.21.4");
    }

    #[tokio::test]
    async fn command_errors_keep_code_and_message() {
        let (base, _requests) = serve(vec![(
            "500 Internal Server Error",
            r#"{"code":404,"message":"version not found"}"#.to_owned(),
        )])
        .await;

        let err = BackendClient::new(base).play("9.9").await.unwrap_err();

        match err {
            BackendError::Command { command, code, message } => {
                assert_eq!(command, "play_button_handler");
                assert_eq!(code, 404);
                assert_eq!(message, "version not found");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn opaque_failures_and_bad_payloads_are_distinguished() {
        let (base, _requests) = serve(vec![
            ("502 Bad Gateway", "upstream down".to_owned()),
            ("200 OK", r#"{"not":"a list"}"#.to_owned()),
        ])
        .await;
        let client = BackendClient::new(base);

        assert!(matches!(
            client.get_profiles().await.unwrap_err(),
            BackendError::Status { status, .. } if status == StatusCode::BAD_GATEWAY
        ));
        assert!(matches!(
            client.get_profiles().await.unwrap_err(),
            BackendError::Decode { .. }
        ));
    }

    #[tokio::test]
    async fn unset_ram_usage_reads_as_none() {
        let (base, _requests) = serve(vec![
            ("200 OK", "0".to_owned()),
            ("200 OK", "null".to_owned()),
            ("200 OK", "4096".to_owned()),
        ])
        .await;
        let client = BackendClient::new(base);

        assert_eq!(client.get_ram_usage().await.unwrap(), None);
        assert_eq!(client.get_ram_usage().await.unwrap(), None);
        assert_eq!(client.get_ram_usage().await.unwrap(), Some(4096));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = BackendClient::new(format!("http://{addr}"))
            .save()
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Transport { .. }));
    }
}
