//! Baseline configuration bundles rendered per pool.
mod static_bundle;

pub use static_bundle::*;


#[cfg(test)]
use mockall::automock;

use crate::api::ControllerConfig;
use crate::api::FileEntry;
use crate::RenderError;

/// Renders the baseline files of one pool from the cluster-wide snapshot
#[cfg_attr(test, automock)]
pub trait TemplateRenderer: Send + Sync + 'static {
    fn render(
        &self,
        snapshot: &ControllerConfig,
        pool: &str,
    ) -> Result<Vec<FileEntry>, RenderError>;
}

/// Rendered baseline files of one pool
#[derive(Debug, Clone, Default)]
pub struct BaselineBundle {
    pool: String,
    files: Vec<FileEntry>,
}

impl BaselineBundle {
    pub fn new(
        pool: impl Into<String>,
        files: Vec<FileEntry>,
    ) -> Self {
        Self {
            pool: pool.into(),
            files,
        }
    }

    pub fn find(
        &self,
        path: &str,
    ) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Like [`BaselineBundle::find`], failing when the file was not rendered
    pub fn require(
        &self,
        path: &'static str,
    ) -> Result<&FileEntry, RenderError> {
        self.find(path).ok_or_else(|| RenderError::MissingFile {
            pool: self.pool.clone(),
            path,
        })
    }
}
