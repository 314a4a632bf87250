//! Bot API client: sticker-set metadata and two-step file download.

use crate::config::DownloaderConfig;
use crate::error::{StickerError, StickerResult};
use crate::models::{ApiResponse, FileInfo, StickerSet};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Where sticker sets and their files come from.
#[async_trait]
pub trait StickerSource: Send + Sync {
    async fn sticker_set(&self, name: &str) -> StickerResult<StickerSet>;

    /// Resolve `file_id` to a download path and fetch its bytes.
    async fn download(&self, file_id: &str) -> StickerResult<Vec<u8>>;
}

pub struct TelegramClient {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(config: &DownloaderConfig) -> Result<Self, reqwest::Error> {
        let mut client_builder = Client::builder().timeout(config.timeout);

        client_builder = match config.proxy.as_deref() {
            Some(proxy_url) => client_builder.proxy(reqwest::Proxy::all(proxy_url)?),
            None => client_builder.no_proxy(),
        };

        Ok(Self {
            client: client_builder.build()?,
            api_base: config.api_base.clone(),
            token: config.token.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, file_path)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, query: &[(&str, &str)]) -> StickerResult<T> {
        let response = self
            .client
            .get(self.method_url(method))
            .query(query)
            .send()
            .await?;
        decode_envelope(response).await
    }

    async fn resolve_file(&self, file_id: &str) -> StickerResult<String> {
        let info: FileInfo = self.call("getFile", &[("file_id", file_id)]).await?;
        info.file_path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| StickerError::api(format!("no file path for {}", info.file_id)))
    }
}

async fn decode_envelope<T: DeserializeOwned>(response: Response) -> StickerResult<T> {
    let status = response.status();
    let body = response.bytes().await?;

    match serde_json::from_slice::<ApiResponse<T>>(&body) {
        Ok(envelope) => envelope.into_result(),
        Err(_) if !status.is_success() => Err(StickerError::api(format!("HTTP {status}"))),
        Err(e) => Err(StickerError::decode(format!("malformed API response: {e}"))),
    }
}

#[async_trait]
impl StickerSource for TelegramClient {
    async fn sticker_set(&self, name: &str) -> StickerResult<StickerSet> {
        self.call("getStickerSet", &[("name", name)]).await
    }

    async fn download(&self, file_id: &str) -> StickerResult<Vec<u8>> {
        let file_path = self.resolve_file(file_id).await?;
        debug!(file_id, file_path, "resolved sticker file");

        let response = self.client.get(self.file_url(&file_path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StickerError::api(format!("HTTP {status} downloading {file_path}")));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
