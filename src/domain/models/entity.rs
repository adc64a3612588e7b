// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 实体路径错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid entity path '{0}': segments must not be empty")]
pub struct InvalidPath(pub String);

/// 实体路径
///
/// 以斜杠分隔的命名空间路径，分组形如 `parent/child`，
/// 项目形如 `namespace/name`。同一路径同时用于定位源实例和目标实例上的实体。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityPath(String);

impl EntityPath {
    /// 创建新的实体路径，首尾的斜杠和空白会被去掉
    pub fn new(path: impl AsRef<str>) -> Result<Self, InvalidPath> {
        let raw = path.as_ref();
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() || trimmed.split('/').any(|segment| segment.trim().is_empty()) {
            return Err(InvalidPath(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 最后一段路径，导入时同时作为名称和路径
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// 除最后一段之外的父级路径
    pub fn parent(&self) -> Option<EntityPath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| EntityPath(parent.to_string()))
    }

    /// 把路径分隔符替换为下划线，用于本地文件名
    pub fn sanitized(&self) -> String {
        self.0.replace('/', "_")
    }

    /// URL编码后的路径，可直接作为 API 中的 `:id`
    pub fn encoded(&self) -> Cow<'_, str> {
        urlencoding::encode(&self.0)
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityPath {
    type Err = InvalidPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntityPath {
    type Error = InvalidPath;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityPath> for String {
    fn from(path: EntityPath) -> Self {
        path.0
    }
}

/// 实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Group,
    Project,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Group => "group",
            EntityKind::Project => "project",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 迁移任务
///
/// 一个任务对应一次期望的迁移：把源实例上的 `src` 迁移到目标实例上的 `dest`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationTask {
    /// 源实例上的实体路径
    pub src: EntityPath,
    /// 目标实例上的实体路径
    pub dest: EntityPath,
}

impl MigrationTask {
    pub fn new(src: EntityPath, dest: EntityPath) -> Self {
        Self { src, dest }
    }

    /// 由两个字符串构造任务
    pub fn parse(src: &str, dest: &str) -> Result<Self, InvalidPath> {
        Ok(Self::new(src.parse()?, dest.parse()?))
    }
}

impl fmt::Display for MigrationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dest)
    }
}
