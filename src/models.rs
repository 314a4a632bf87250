use crate::error::{StickerError, StickerResult};
use serde::{Deserialize, Serialize};

/// Envelope shared by every Bot API method.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> StickerResult<T> {
        if !self.ok {
            return Err(StickerError::api(
                self.description
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }
        self.result
            .ok_or_else(|| StickerError::decode("response is missing the result object"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickerSet {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_animated: bool,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sticker {
    pub file_id: String,
    /// Output base name; unique within a set.
    pub file_unique_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub is_animated: bool,
    #[serde(default)]
    pub is_video: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileInfo {
    pub file_id: String,
    #[serde(default)]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadProgress {
    pub current: usize,
    pub total: usize,
    pub status: String,
    pub percentage: f64,
    pub success_count: usize,
    pub failed_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub set_name: String,
    pub progress: DownloadProgress,
}

impl ProgressEvent {
    pub const NAME: &'static str = "sticker-download-progress";
}

/// Reduced sidecar describing a downloaded set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub title: String,
    pub name: String,
    pub icon: Option<String>,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sticker_set_response_parses() {
        let body = r#"{
            "ok": true,
            "result": {
                "name": "HotCherry",
                "title": "Hot Cherry",
                "sticker_type": "regular",
                "is_animated": true,
                "is_video": false,
                "stickers": [
                    {"file_id": "CAACAgIAAx", "file_unique_id": "AgADBQADwDZPEw",
                     "width": 512, "height": 512, "is_animated": true, "is_video": false,
                     "emoji": "💋"}
                ]
            }
        }"#;
        let resp: ApiResponse<StickerSet> = serde_json::from_str(body).unwrap();
        let set = resp.into_result().unwrap();
        assert_eq!(set.title, "Hot Cherry");
        assert_eq!(set.description, "");
        assert_eq!(set.stickers.len(), 1);
        assert!(set.stickers[0].is_animated);
        assert_eq!(set.stickers[0].width, 512);
    }

    #[test]
    fn not_ok_response_carries_description() {
        let body = r#"{"ok": false, "error_code": 400, "description": "Bad Request: STICKERSET_INVALID"}"#;
        let resp: ApiResponse<StickerSet> = serde_json::from_str(body).unwrap();
        match resp.into_result() {
            Err(StickerError::Api { description }) => {
                assert_eq!(description, "Bad Request: STICKERSET_INVALID")
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn ok_without_result_is_a_decode_error() {
        let resp: ApiResponse<FileInfo> = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert!(matches!(resp.into_result(), Err(StickerError::Decode(_))));
    }

    #[test]
    fn progress_serializes_camel_case() {
        let event = ProgressEvent {
            set_name: "pack".into(),
            progress: DownloadProgress {
                current: 1,
                total: 2,
                status: "x".into(),
                percentage: 50.0,
                success_count: 1,
                failed_count: 0,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["setName"], "pack");
        assert_eq!(json["progress"]["successCount"], 1);
        assert_eq!(json["progress"]["failedCount"], 0);
    }
}
