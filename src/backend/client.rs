//! Async HTTP client for the correlation backend.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::api::{
    AlignResponse, ChannelWindowResponse, ClearResponse, DatasetAlignRequest,
    DatasetDataResponse, DatasetsResponse, GroupAlignRequest, RawSeries, RenameRequest,
    SeriesMap, UploadResponse, WindowQuery,
};
use crate::data::datasets::Dataset;
use crate::data::window_cache::WindowRequest;
use crate::error::{AlignError, Result};

#[derive(Debug, Clone)]
pub struct HttpClient {
    base: Url,
    http: Client,
    upload_timeout: Duration,
}

impl HttpClient {
    pub fn new(base_url: &str, upload_timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| AlignError::Config(format!("backend url '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(AlignError::Config(format!(
                "backend url '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            base,
            http: Client::new(),
            upload_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AlignError::Config(format!("backend url '{}' cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET /data`
    pub async fn fetch_series(&self) -> Result<SeriesMap> {
        let resp = self.http.get(self.endpoint(&["data"])?).send().await?;
        decode_strict(resp).await
    }

    /// `POST /upload` with the file as multipart field `file`.
    pub async fn upload(&self, path: &Path, multi_channel: bool) -> Result<UploadResponse> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AlignError::Network(format!("{}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        debug!(file = %file_name, bytes = bytes.len(), multi_channel, "uploading");
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("multiChannel", multi_channel.to_string());
        let resp = self
            .http
            .post(self.endpoint(&["upload"])?)
            .multipart(form)
            .timeout(self.upload_timeout)
            .send()
            .await?;
        decode_lenient(resp).await
    }

    /// `POST /clear`
    pub async fn clear(&self) -> Result<ClearResponse> {
        let resp = self.http.post(self.endpoint(&["clear"])?).send().await?;
        decode_strict(resp).await
    }

    /// `POST /align`
    pub async fn align_groups(&self, request: &GroupAlignRequest) -> Result<AlignResponse> {
        let resp = self
            .http
            .post(self.endpoint(&["align"])?)
            .json(request)
            .send()
            .await?;
        decode_lenient(resp).await
    }

    /// `POST /datasets/align`
    pub async fn align_datasets(&self, request: &DatasetAlignRequest) -> Result<AlignResponse> {
        let resp = self
            .http
            .post(self.endpoint(&["datasets", "align"])?)
            .json(request)
            .send()
            .await?;
        decode_lenient(resp).await
    }

    /// `GET /datasets`
    pub async fn list_datasets(&self) -> Result<Vec<Dataset>> {
        let resp = self.http.get(self.endpoint(&["datasets"])?).send().await?;
        let body: DatasetsResponse = decode_strict(resp).await?;
        Ok(body.datasets)
    }

    /// `GET /datasets/{id}/data`
    pub async fn dataset_data(&self, id: &str) -> Result<DatasetDataResponse> {
        let resp = self
            .http
            .get(self.endpoint(&["datasets", id, "data"])?)
            .send()
            .await?;
        decode_strict(resp).await
    }

    /// Downsampled window of one channel. A request with a span goes to
    /// `/channels/{ch}/window_by_time`, otherwise to `/channels/{ch}/window`.
    pub async fn channel_window(&self, request: &WindowRequest) -> Result<RawSeries> {
        let channel = request.key.channel.as_str();
        let (url, query) = match request.span {
            Some((start, end)) => (
                self.endpoint(&["channels", channel, "window_by_time"])?,
                WindowQuery {
                    target_points: request.target_points,
                    dataset_id: request.key.dataset.clone(),
                    start_time: Some(start),
                    end_time: Some(end),
                },
            ),
            None => (
                self.endpoint(&["channels", channel, "window"])?,
                WindowQuery {
                    target_points: request.target_points,
                    dataset_id: request.key.dataset.clone(),
                    start_time: None,
                    end_time: None,
                },
            ),
        };
        let resp = self.http.get(url).query(&query).send().await?;
        let body: ChannelWindowResponse = decode_strict(resp).await?;
        Ok(body.data)
    }

    /// `POST /datasets/rename`
    pub async fn rename_dataset(&self, request: &RenameRequest) -> Result<()> {
        let resp = self
            .http
            .post(self.endpoint(&["datasets", "rename"])?)
            .json(request)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = resp.text().await.unwrap_or_default();
            Err(AlignError::Network(format!("HTTP {status}: {text}")))
        }
    }
}

/// Decode a 2xx JSON body; any other status is a network error.
async fn decode_strict<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(AlignError::Network(format!("HTTP {status}: {text}")));
    }
    Ok(resp.json::<T>().await?)
}

/// Decode a JSON body regardless of status. Upload and alignment failures
/// carry a structured body that is worth more than the status line.
async fn decode_lenient<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    match serde_json::from_slice::<T>(&bytes) {
        Ok(body) => Ok(body),
        Err(_) if !status.is_success() => Err(AlignError::Network(format!(
            "HTTP {status}: {}",
            String::from_utf8_lossy(&bytes)
        ))),
        Err(e) => Err(e.into()),
    }
}
