use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use super::TemplateRenderer;
use crate::api::ControllerConfig;
use crate::api::FileEntry;
use crate::constants::RENDERED_FILE_MODE;
use crate::envelope;
use crate::RenderError;

/// Renders bundles from a directory tree of templates
///
/// `<templates_dir>/<pool>/etc/crio/crio.conf` becomes `/etc/crio/crio.conf`.
/// Pools without their own directory use `<templates_dir>/<fallback_role>`.
#[derive(Debug, Clone)]
pub struct StaticBundleRenderer {
    templates_dir: PathBuf,
    fallback_role: String,
}

impl StaticBundleRenderer {
    pub fn new(
        templates_dir: impl Into<PathBuf>,
        fallback_role: impl Into<String>,
    ) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            fallback_role: fallback_role.into(),
        }
    }

    fn role_dir(
        &self,
        pool: &str,
    ) -> Result<PathBuf, RenderError> {
        let own = self.templates_dir.join(pool);
        if own.is_dir() {
            return Ok(own);
        }
        let fallback = self.templates_dir.join(&self.fallback_role);
        if fallback.is_dir() {
            debug!(%pool, fallback = %self.fallback_role, "using fallback templates");
            return Ok(fallback);
        }
        Err(RenderError::MissingTemplates {
            pool: pool.to_string(),
            dir: self.templates_dir.display().to_string(),
        })
    }
}

impl TemplateRenderer for StaticBundleRenderer {
    fn render(
        &self,
        snapshot: &ControllerConfig,
        pool: &str,
    ) -> Result<Vec<FileEntry>, RenderError> {
        let root = self.role_dir(pool)?;
        let mut paths = Vec::new();
        collect_files(&root, &mut paths)?;
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let template = fs::read_to_string(&path).map_err(|source| RenderError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let rendered = substitute(&template, snapshot, pool);
            files.push(FileEntry {
                path: target_path(&root, &path),
                mode: RENDERED_FILE_MODE,
                contents: envelope::encode(rendered.as_bytes()),
            });
        }
        debug!(%pool, files = files.len(), "rendered baseline bundle");
        Ok(files)
    }
}

fn collect_files(
    dir: &Path,
    out: &mut Vec<PathBuf>,
) -> Result<(), RenderError> {
    let io_err = |source| RenderError::Io {
        path: dir.display().to_string(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn target_path(
    root: &Path,
    file: &Path,
) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", parts.join("/"))
}

fn substitute(
    template: &str,
    snapshot: &ControllerConfig,
    pool: &str,
) -> String {
    let spec = &snapshot.spec;
    template
        .replace("{{ .PoolName }}", pool)
        .replace("{{ .Platform }}", &spec.platform)
        .replace("{{ .ReleaseImage }}", &spec.release_image)
        .replace("{{ .InfraImage }}", &spec.infra_image)
}
