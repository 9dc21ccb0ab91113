//! Application settings loaded from config.toml
//!
//! Besides server and catalog settings, the file may list categories, menu items and
//! tables. These are seeded into the database on startup when they are missing, so a
//! fresh install comes up with a usable menu.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Menu listing settings
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Categories to seed
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    /// Menu items to seed
    #[serde(default)]
    pub menu_items: Vec<MenuItemSeed>,
    /// Dining tables to seed
    #[serde(default)]
    pub tables: Vec<TableSeed>,
}

/// HTTP server settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

/// Menu listing settings
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CatalogConfig {
    /// Page size used when the request does not specify one
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Upper bound applied to requested page sizes
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

const fn default_page_size() -> u64 {
    9
}

const fn default_max_page_size() -> u64 {
    100
}

/// A category to seed
#[derive(Debug, Deserialize, Clone)]
pub struct CategorySeed {
    /// Category name
    pub name: String,
}

/// A menu item to seed; `category` refers to a category by name
#[derive(Debug, Deserialize, Clone)]
pub struct MenuItemSeed {
    /// Item name
    pub name: String,
    /// Item description
    #[serde(default)]
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Quantity on hand
    #[serde(default)]
    pub quantity: i32,
    /// Name of the category to list the item under
    pub category: String,
    /// Preparation time in minutes
    #[serde(default)]
    pub preparation_time: i32,
    /// Optional image location
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A dining table to seed
#[derive(Debug, Deserialize, Clone)]
pub struct TableSeed {
    /// Table number
    pub number: i32,
    /// Maximum guests
    pub capacity: i32,
    /// Location label
    #[serde(default)]
    pub location: String,
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if config.catalog.default_page_size == 0 || config.catalog.max_page_size == 0 {
        return Err(Error::Config {
            message: "catalog page sizes must be greater than zero".to_string(),
        });
    }

    Ok(config)
}

/// Loads configuration from `TAPROOM_CONFIG`, or `./config.toml` when unset.
///
/// A missing file is not an error: the service starts with defaults and no seed data.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("TAPROOM_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        warn!("Config file {} not found, using defaults", path);
        return Ok(AppConfig::default());
    }
    load_config(path)
}
