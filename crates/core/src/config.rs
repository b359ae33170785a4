use crate::dates::DEFAULT_DATE_STAMP_TAGS;
use crate::flatten::DEFAULT_KEY_SEPARATOR;
use crate::report::ReportOptions;
use crate::zone::{parse_zone, LocalZone, Timezone};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub default_zone: Option<String>,
    pub include_all_default: bool,
    pub local_zone: Option<String>,
    pub date_stamp_tags: Vec<String>,
    pub key_separator: String,
    pub exiftool_fallback: bool,
    pub exiftool_args: Vec<String>,
    pub exiftool_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_zone: None,
            include_all_default: false,
            local_zone: None,
            date_stamp_tags: DEFAULT_DATE_STAMP_TAGS
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
            key_separator: DEFAULT_KEY_SEPARATOR.to_string(),
            exiftool_fallback: true,
            exiftool_args: vec!["-g1".to_string()],
            exiftool_path: None,
        }
    }
}

impl AppConfig {
    pub fn resolve_local_zone(&self) -> Result<LocalZone> {
        match self.local_zone.as_deref().map(str::trim) {
            None | Some("") => Ok(LocalZone::System),
            Some(name) if name.eq_ignore_ascii_case("system") => Ok(LocalZone::System),
            Some(name) => Timezone::parse(name)
                .map(LocalZone::Named)
                .context("設定の local_zone が不正です"),
        }
    }

    pub fn report_options(
        &self,
        zone: Option<Timezone>,
        include_all: bool,
    ) -> Result<ReportOptions> {
        let zone = match zone {
            Some(zone) => Some(zone),
            None => parse_zone(self.default_zone.as_deref())
                .context("設定の default_zone が不正です")?,
        };

        Ok(ReportOptions {
            zone,
            include_all: include_all || self.include_all_default,
            local_zone: self.resolve_local_zone()?,
            date_stamp_tags: self.date_stamp_tags.clone(),
            key_separator: self.key_separator.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("org", "exif-dates", "exif-dates")
        .context("OS標準設定ディレクトリを取得できませんでした")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    load_config_from(&paths.config_path)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("設定ファイルを読めませんでした: {}", path.display()))?;

    let config = toml::from_str::<AppConfig>(&raw).context("設定ファイルのパースに失敗しました")?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<PathBuf> {
    let paths = app_paths()?;
    save_config_to(config, &paths.config_path)?;
    Ok(paths.config_path)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| {
            format!("設定ディレクトリを作成できませんでした: {}", dir.display())
        })?;
    }
    let body = toml::to_string_pretty(config).context("設定のシリアライズに失敗しました")?;
    fs::write(path, body)
        .with_context(|| format!("設定ファイルを書き込めませんでした: {}", path.display()))?;
    Ok(())
}
