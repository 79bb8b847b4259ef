//! Optional `gormgen.toml` defaults.
//!
//! Looked up in the current directory first, then in
//! `<config dir>/gormgen/config.toml`. Every key is optional and command
//! line flags take precedence.
//!
//! ```toml
//! package = "entity"
//! table_prefix = ["t_", "tbl_"]
//! json_tag = true
//! null_style = "ptr"
//!
//! [database]
//! url = "mysql://root@localhost/shop"
//! tables = ["t_user", "t_order"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GenError, GenResult};
use crate::options::{Options, split_prefixes};

/// File name looked up in the working directory.
pub const LOCAL_FILE: &str = "gormgen.toml";

/// A prefix list, written either as an array or as a comma separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PrefixList {
    Many(Vec<String>),
    One(String),
}

impl PrefixList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Many(v) => v.into_iter().filter(|p| !p.is_empty()).collect(),
            Self::One(s) => split_prefixes(&s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    #[serde(default)]
    pub tables: Vec<String>,
}

/// One layer of settings. The file and the command line each produce one;
/// [`Settings::merge`] stacks them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub package: Option<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub json_tag: Option<bool>,
    pub json_style: Option<String>,
    pub table_prefix: Option<PrefixList>,
    pub column_prefix: Option<PrefixList>,
    pub no_null_type: Option<bool>,
    pub null_style: Option<String>,
    pub gorm_type: Option<bool>,
    pub force_table_name: Option<bool>,
    pub serve_address: Option<String>,
    #[serde(default)]
    pub database: DatabaseSettings,
}

impl Settings {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> GenResult<Self> {
        toml::from_str(content).map_err(|e| GenError::Config(e.to_string()))
    }

    /// Read and parse a settings file.
    pub fn from_file(path: &Path) -> GenResult<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| GenError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Values of `over` win; unset ones fall back to `self`.
    pub fn merge(self, over: Settings) -> Settings {
        Settings {
            package: over.package.or(self.package),
            charset: over.charset.or(self.charset),
            collation: over.collation.or(self.collation),
            json_tag: over.json_tag.or(self.json_tag),
            json_style: over.json_style.or(self.json_style),
            table_prefix: over.table_prefix.or(self.table_prefix),
            column_prefix: over.column_prefix.or(self.column_prefix),
            no_null_type: over.no_null_type.or(self.no_null_type),
            null_style: over.null_style.or(self.null_style),
            gorm_type: over.gorm_type.or(self.gorm_type),
            force_table_name: over.force_table_name.or(self.force_table_name),
            serve_address: over.serve_address.or(self.serve_address),
            database: DatabaseSettings {
                url: over.database.url.or(self.database.url),
                tables: if over.database.tables.is_empty() {
                    self.database.tables
                } else {
                    over.database.tables
                },
            },
        }
    }

    /// Build generation options, validating enumerated values.
    pub fn to_options(&self) -> GenResult<Options> {
        let opts = Options {
            charset: self.charset.clone(),
            collation: self.collation.clone(),
            json_tag: self.json_tag.unwrap_or(false),
            json_style: self.json_style.as_deref().unwrap_or_default().parse()?,
            table_prefix: self
                .table_prefix
                .clone()
                .map(PrefixList::into_vec)
                .unwrap_or_default(),
            column_prefix: self
                .column_prefix
                .clone()
                .map(PrefixList::into_vec)
                .unwrap_or_default(),
            no_null_type: self.no_null_type.unwrap_or(false),
            null_style: self.null_style.as_deref().unwrap_or_default().parse()?,
            package: self.package.clone(),
            gorm_type: self.gorm_type.unwrap_or(false),
            force_table_name: self.force_table_name.unwrap_or(false),
        };
        opts.validate()?;
        Ok(opts)
    }
}

/// Candidate settings files, most specific first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("gormgen").join("config.toml"));
    }
    paths
}

/// Load the first settings file that exists, if any.
pub fn load() -> GenResult<Option<(PathBuf, Settings)>> {
    for path in search_paths() {
        if path.is_file() {
            let settings = Settings::from_file(&path)?;
            tracing::debug!(path = %path.display(), "loaded settings");
            return Ok(Some((path, settings)));
        }
    }
    Ok(None)
}
