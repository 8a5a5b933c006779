use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error};
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::scrape::FetchReport;

/// Credentials and driver selection for the blob store, read from a JSON
/// config file at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub provider: String,
    pub username: String,
    pub api_key: String,
    pub region: String,
    /// Root directory for the `local` provider.
    pub root: Option<PathBuf>,
    #[serde(default = "default_container")]
    pub container: String,
}

fn default_container() -> String {
    "gameday".to_string()
}

#[derive(Debug, Error)]
pub enum StorageError {
    /// Missing or invalid credentials. Fatal: raised to the caller at
    /// startup, before any crawling happens.
    #[error("invalid storage config: {0}")]
    Config(String),
    #[error("container {0} does not exist")]
    ContainerMissing(String),
    #[error("container {0} already exists")]
    ContainerExists(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Handle to a provider container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub name: String,
}

/// Object storage boundary. Cloud providers live behind this trait; the
/// local driver below backs tests and on-disk stores.
pub trait Driver {
    fn get_container(&self, name: &str) -> Result<Container, StorageError>;
    fn create_container(&self, name: &str) -> Result<Container, StorageError>;
    fn upload_object(
        &self,
        container: &Container,
        object_name: &str,
        data: &str,
    ) -> Result<(), StorageError>;
}

/// Read the storage config file.
pub fn load_config(path: &Path) -> Result<StorageConfig, StorageError> {
    let raw = fs::read_to_string(path)
        .map_err(|err| StorageError::Config(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&raw).map_err(|err| StorageError::Config(err.to_string()))
}

/// Build the driver the config names.
pub fn get_driver(config: &StorageConfig) -> Result<Box<dyn Driver>, StorageError> {
    match config.provider.as_str() {
        "local" => {
            let root = config
                .root
                .clone()
                .ok_or_else(|| StorageError::Config("local provider needs a root".to_string()))?;
            Ok(Box::new(LocalDriver::new(root)))
        }
        other => Err(StorageError::Config(format!(
            "unknown storage provider {}",
            other
        ))),
    }
}

/// Fetch the named container, creating it on demand when the provider
/// reports it missing.
pub fn get_container(driver: &dyn Driver, name: &str) -> Result<Container, StorageError> {
    match driver.get_container(name) {
        Err(StorageError::ContainerMissing(_)) => driver.create_container(name),
        other => other,
    }
}

/// Push `urls` into the store under `container`, one object per file,
/// named by host + path. Same skip and failure contract as
/// `scrape::download`.
pub fn upload<I>(
    client: &Client,
    urls: I,
    driver: &dyn Driver,
    container: &Container,
) -> FetchReport
where
    I: IntoIterator<Item = String>,
{
    let mut completed = 0;
    let mut failures = Vec::new();

    for url in urls {
        let parsed = match Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(err) => {
                error!("upload error: {} raised {}", url, err);
                failures.push(url);
                continue;
            }
        };
        // Skip directory pages.
        if parsed.path().ends_with('/') {
            continue;
        }
        let object_name = format!(
            "{}{}",
            parsed.host_str().unwrap_or_default(),
            parsed.path()
        );

        let body = client
            .get(parsed.clone())
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text());
        let body = match body {
            Ok(body) => body,
            Err(err) => {
                error!("upload error: {} raised {}", url, err);
                failures.push(url);
                continue;
            }
        };

        match driver.upload_object(container, &object_name, &body) {
            Ok(()) => {
                debug!("uploaded {}", url);
                completed += 1;
            }
            Err(err) => {
                error!("upload error: {} raised {}", url, err);
                failures.push(url);
            }
        }
    }

    FetchReport {
        completed,
        failures,
    }
}

/// Containers as directories, objects as files.
pub struct LocalDriver {
    root: PathBuf,
}

impl LocalDriver {
    pub fn new(root: PathBuf) -> Self {
        LocalDriver { root }
    }
}

impl Driver for LocalDriver {
    fn get_container(&self, name: &str) -> Result<Container, StorageError> {
        if self.root.join(name).is_dir() {
            Ok(Container {
                name: name.to_string(),
            })
        } else {
            Err(StorageError::ContainerMissing(name.to_string()))
        }
    }

    fn create_container(&self, name: &str) -> Result<Container, StorageError> {
        let path = self.root.join(name);
        if path.is_dir() {
            return Err(StorageError::ContainerExists(name.to_string()));
        }
        fs::create_dir_all(&path)?;
        Ok(Container {
            name: name.to_string(),
        })
    }

    fn upload_object(
        &self,
        container: &Container,
        object_name: &str,
        data: &str,
    ) -> Result<(), StorageError> {
        let target = self.root.join(&container.name).join(object_name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, data)?;
        Ok(())
    }
}
