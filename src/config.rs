use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::clients::{source_for, WorkbookSource};
use crate::models::SchemaDescriptor;

/// 程序配置
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 工作簿位置：本地路径或 http(s) 地址
    pub workbook_location: String,
    /// 工作簿结构描述
    pub schema: SchemaDescriptor,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workbook_location: "public/questions.xlsx".to_string(),
            schema: SchemaDescriptor::current(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量读取配置
    ///
    /// - `BANK_CONFIG`: TOML 配置文件路径（作为基础配置）
    /// - `BANK_WORKBOOK`: 工作簿位置
    /// - `BANK_SCHEMA`: 预设布局名称（`legacy` / `current`）
    /// - `VERBOSE_LOGGING`: `true` / `false`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 同 `from_env`，变量由 `lookup` 提供
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base = match lookup("BANK_CONFIG") {
            Some(path) => Self::from_toml_file(&path).unwrap_or_else(|e| {
                warn!("⚠️ 配置文件无效，使用默认配置: {:#}", e);
                Self::default()
            }),
            None => Self::default(),
        };

        let schema = match lookup("BANK_SCHEMA") {
            Some(name) => SchemaDescriptor::preset(&name).unwrap_or_else(|| {
                warn!("⚠️ 未知的布局预设 '{}'，保持原配置", name);
                base.schema.clone()
            }),
            None => base.schema.clone(),
        };

        Self {
            workbook_location: lookup("BANK_WORKBOOK").unwrap_or(base.workbook_location),
            schema,
            verbose_logging: lookup("VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.verbose_logging),
        }
    }

    /// 从 TOML 文件读取配置
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 按工作簿位置创建来源
    pub fn workbook_source(&self) -> Arc<dyn WorkbookSource> {
        Arc::from(source_for(&self.workbook_location))
    }
}
