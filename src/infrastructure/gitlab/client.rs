// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{HostConfig, HttpSettings};
use crate::domain::models::{ArchiveFile, EntityPath, ExportStatus, Project};
use crate::domain::repositories::host_client::{DownloadAttempt, ExportTrigger, HostClient};
use crate::infrastructure::metrics;
use crate::utils::errors::HostError;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response, StatusCode};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

/// 认证请求头
const PRIVATE_TOKEN: &str = "private-token";

#[derive(Debug, Deserialize)]
struct GroupRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct ExportState {
    #[serde(default)]
    export_status: ExportStatus,
}

/// GitLab REST API v4 客户端
///
/// 每个实例（源或目标）一个客户端；内部的 `reqwest::Client` 复用连接，
/// 可以通过 `Arc` 在多个迁移单元之间共享。
#[derive(Clone)]
pub struct GitlabClient {
    client: Client,
    api_url: String,
}

impl GitlabClient {
    /// 创建新的客户端实例
    ///
    /// # 参数
    ///
    /// * `config` - 实例地址和访问令牌
    /// * `http` - HTTP 超时和 User-Agent 设置
    ///
    /// # 返回值
    ///
    /// * `Ok(GitlabClient)` - 客户端
    /// * `Err(HostError)` - 地址或令牌无效
    pub fn new(config: &HostConfig, http: &HttpSettings) -> Result<Self, HostError> {
        let base = Url::parse(&config.url)
            .map_err(|e| HostError::Malformed(format!("invalid url '{}': {}", config.url, e)))?;

        let mut token = HeaderValue::from_str(&config.token)
            .map_err(|_| HostError::Malformed("access token is not a valid header value".into()))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(PRIVATE_TOKEN, token);
        if let Ok(agent) = HeaderValue::from_str(&http.user_agent) {
            headers.insert(header::USER_AGENT, agent);
        }

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .read_timeout(Duration::from_secs(http.read_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: format!("{}/api/v4", base.as_str().trim_end_matches('/')),
        })
    }

    fn group_url(&self, group: &EntityPath) -> String {
        format!("{}/groups/{}", self.api_url, group.encoded())
    }

    fn project_url(&self, project: &EntityPath) -> String {
        format!("{}/projects/{}", self.api_url, project.encoded())
    }

    /// 把响应体流式写入归档文件
    ///
    /// 先写临时文件，完整写入后再重命名，失败的请求不会覆盖已有的归档；
    /// 任何一步失败都会删除临时文件
    async fn stream_to_archive(response: Response, archive: &ArchiveFile) -> Result<(), HostError> {
        let partial = archive.partial_path();
        let written = Self::write_partial(response, &partial).await;

        let result = match written {
            Ok(()) => tokio::fs::rename(&partial, archive.path())
                .await
                .map_err(HostError::from),
            Err(e) => Err(e),
        };
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(&partial).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(file = %partial.display(), error = %e, "Failed to remove partial archive");
                }
            }
        }
        result
    }

    async fn write_partial(response: Response, partial: &Path) -> Result<(), HostError> {
        let mut file = tokio::fs::File::create(partial).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        Ok(())
    }

    /// 以流的方式构造上传的归档文件字段
    async fn archive_part(archive: &ArchiveFile) -> Result<Part, HostError> {
        let file = tokio::fs::File::open(archive.path()).await?;
        let length = file.metadata().await?.len();
        let part = Part::stream_with_length(Body::from(file), length)
            .file_name(archive.file_name())
            .mime_str("application/gzip")?;
        Ok(part)
    }
}

#[async_trait]
impl HostClient for GitlabClient {
    async fn resolve_group_id(&self, path: &EntityPath) -> Result<Option<u64>, HostError> {
        metrics::record_request("resolve_group_id");
        let response = self.client.get(self.group_url(path)).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let group: GroupRef = response.json().await?;
                Ok(Some(group.id))
            }
            status => Err(HostError::UnexpectedStatus {
                operation: "resolve_group_id",
                status,
            }),
        }
    }

    async fn group_exists(&self, path: &EntityPath) -> Result<bool, HostError> {
        metrics::record_request("group_exists");
        let response = self.client.get(self.group_url(path)).send().await?;
        Ok(response.status() == StatusCode::OK)
    }

    async fn start_group_export(&self, path: &EntityPath) -> Result<ExportTrigger, HostError> {
        let Some(id) = self.resolve_group_id(path).await? else {
            return Ok(ExportTrigger::NotFound);
        };

        metrics::record_request("start_group_export");
        let url = format!("{}/groups/{}/export", self.api_url, id);
        let response = self.client.post(url).send().await?;

        match response.status() {
            StatusCode::ACCEPTED => Ok(ExportTrigger::Accepted),
            status => Ok(ExportTrigger::Rejected(status)),
        }
    }

    async fn download_group_export(
        &self,
        path: &EntityPath,
        archive: &ArchiveFile,
    ) -> Result<DownloadAttempt, HostError> {
        metrics::record_request("download_group_export");
        let url = format!("{}/export/download", self.group_url(path));
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(group = %path, %status, "Group export not ready");
            return Ok(DownloadAttempt::NotReady(status));
        }

        Self::stream_to_archive(response, archive).await?;
        Ok(DownloadAttempt::Ready(archive.clone()))
    }

    async fn import_group(
        &self,
        destination: &EntityPath,
        archive: &ArchiveFile,
    ) -> Result<(), HostError> {
        let name = destination.name().to_string();
        let mut form = Form::new()
            .text("name", name.clone())
            .text("path", name);

        if let Some(parent) = destination.parent() {
            let parent_id = self
                .resolve_group_id(&parent)
                .await?
                .ok_or_else(|| HostError::NotFound(format!("parent group {}", parent)))?;
            form = form.text("parent_id", parent_id.to_string());
        }
        form = form.part("file", Self::archive_part(archive).await?);

        metrics::record_request("import_group");
        let url = format!("{}/groups/import", self.api_url);
        let response = self.client.post(url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(group = %destination, %status, "Group import submission was not accepted");
        }
        Ok(())
    }

    async fn get_project(&self, path: &EntityPath) -> Result<Option<Project>, HostError> {
        metrics::record_request("get_project");
        let response = self.client.get(self.project_url(path)).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(HostError::UnexpectedStatus {
                operation: "get_project",
                status,
            }),
        }
    }

    async fn archive_project(&self, path: &EntityPath) -> Result<(), HostError> {
        metrics::record_request("archive_project");
        let url = format!("{}/archive", self.project_url(path));
        let response = self.client.post(url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(HostError::NotFound(format!("project {}", path))),
            status => Err(HostError::UnexpectedStatus {
                operation: "archive_project",
                status,
            }),
        }
    }

    async fn create_project_export(&self, path: &EntityPath) -> Result<(), HostError> {
        metrics::record_request("create_project_export");
        let url = format!("{}/export", self.project_url(path));
        let response = self.client.post(url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(HostError::UnexpectedStatus {
                operation: "create_project_export",
                status,
            }),
        }
    }

    async fn project_export_status(&self, path: &EntityPath) -> Result<ExportStatus, HostError> {
        metrics::record_request("project_export_status");
        let url = format!("{}/export", self.project_url(path));
        let response = self.client.get(url).send().await?;

        match response.status() {
            status if status.is_success() => {
                let state: ExportState = response.json().await?;
                Ok(state.export_status)
            }
            status => Err(HostError::UnexpectedStatus {
                operation: "project_export_status",
                status,
            }),
        }
    }

    async fn download_project_export(
        &self,
        path: &EntityPath,
        archive: &ArchiveFile,
    ) -> Result<(), HostError> {
        metrics::record_request("download_project_export");
        let url = format!("{}/export/download", self.project_url(path));
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::OK => Self::stream_to_archive(response, archive).await,
            status => Err(HostError::UnexpectedStatus {
                operation: "download_project_export",
                status,
            }),
        }
    }

    async fn submit_project_import(
        &self,
        destination: &EntityPath,
        archive: &ArchiveFile,
        name: &str,
        path: &str,
    ) -> Result<(), HostError> {
        let mut form = Form::new()
            .text("path", path.to_string())
            .text("name", name.to_string());
        if let Some(namespace) = destination.parent() {
            form = form.text("namespace", namespace.to_string());
        }
        form = form.part("file", Self::archive_part(archive).await?);

        metrics::record_request("submit_project_import");
        let url = format!("{}/projects/import", self.api_url);
        let response = self.client.post(url).multipart(form).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(HostError::UnexpectedStatus {
                operation: "submit_project_import",
                status,
            }),
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
