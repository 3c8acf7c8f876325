use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::context::{build_context, Globals};
use super::names::{Partial, SharedPartial, View};
use super::{LAYOUT_FILE, SHARED_DIR};
use crate::config::ViewsConfig;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template error: {0}")]
    Tera(#[from] tera::Error),

    #[error("template reload failed: {0}")]
    Reload(String),
}

/// Every compiled template, one bundle per view directory.
///
/// A directory bundle holds the layout, the global shared partials, the
/// directory's own `shared/` partials (which replace global ones with the same
/// file name) and the directory's views and partials. The shared bundle holds
/// only the global shared partials.
pub struct TemplateSet {
    bundles: HashMap<String, Tera>,
    shared: Tera,
}

impl TemplateSet {
    pub fn load(root: &Path) -> Result<Self, RenderError> {
        let layout_path = root.join(LAYOUT_FILE);
        let layout = std::fs::read_to_string(&layout_path).map_err(|source| RenderError::Io {
            path: layout_path,
            source,
        })?;

        let global_shared: Vec<(String, String)> = html_files(&root.join(SHARED_DIR))?
            .into_iter()
            .map(|(file, content)| (format!("{}/{}", SHARED_DIR, file), content))
            .collect();

        let mut shared = Tera::default();
        shared.add_raw_templates(global_shared.clone())?;

        let mut bundles = HashMap::new();
        for dir in view_directories(root)? {
            let mut templates: BTreeMap<String, String> = BTreeMap::new();
            templates.insert(LAYOUT_FILE.to_string(), layout.clone());
            templates.extend(global_shared.iter().cloned());
            for (file, content) in html_files(&root.join(&dir).join(SHARED_DIR))? {
                templates.insert(format!("{}/{}", SHARED_DIR, file), content);
            }
            for (file, content) in html_files(&root.join(&dir))? {
                templates.insert(format!("{}/{}", dir, file), content);
            }

            let mut tera = Tera::default();
            tera.add_raw_templates(templates)?;
            debug!(directory = %dir, "compiled template bundle");
            bundles.insert(dir, tera);
        }

        let set = Self { bundles, shared };
        set.verify()?;
        Ok(set)
    }

    /// Fails on the first known view or partial that has no template
    fn verify(&self) -> Result<(), RenderError> {
        for view in View::ALL {
            self.bundle_with(view.directory(), &view.template_name())?;
        }
        for partial in Partial::ALL {
            self.bundle_with(partial.directory(), &partial.template_name())?;
        }
        for partial in SharedPartial::ALL {
            let name = partial.template_name();
            if !contains(&self.shared, &name) {
                return Err(RenderError::NotFound(name));
            }
        }
        Ok(())
    }

    fn bundle_with(&self, directory: &str, name: &str) -> Result<&Tera, RenderError> {
        self.bundles
            .get(directory)
            .filter(|tera| contains(tera, name))
            .ok_or_else(|| RenderError::NotFound(name.to_string()))
    }

    pub fn render_view(&self, view: View, context: &Context) -> Result<String, RenderError> {
        let name = view.template_name();
        Ok(self.bundle_with(view.directory(), &name)?.render(&name, context)?)
    }

    pub fn render_partial(&self, partial: Partial, context: &Context) -> Result<String, RenderError> {
        let name = partial.template_name();
        Ok(self.bundle_with(partial.directory(), &name)?.render(&name, context)?)
    }

    pub fn render_shared(&self, partial: SharedPartial, context: &Context) -> Result<String, RenderError> {
        let name = partial.template_name();
        if !contains(&self.shared, &name) {
            return Err(RenderError::NotFound(name));
        }
        Ok(self.shared.render(&name, context)?)
    }

    pub fn directories(&self) -> Vec<&str> {
        let mut dirs: Vec<&str> = self.bundles.keys().map(String::as_str).collect();
        dirs.sort_unstable();
        dirs
    }
}

fn contains(tera: &Tera, name: &str) -> bool {
    tera.get_template_names().any(|n| n == name)
}

/// `.html` files directly inside `dir`, sorted by name. A missing directory is empty.
fn html_files(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(RenderError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| RenderError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }
        let Some(file) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        let content = std::fs::read_to_string(&path).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        files.push((file, content));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// Subdirectories of the views root that hold views, excluding `shared/`
fn view_directories(root: &Path) -> Result<Vec<String>, RenderError> {
    let entries = std::fs::read_dir(root).map_err(|source| RenderError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| RenderError::Io {
                path: root.to_path_buf(),
                source,
            })?
            .path();
        if !path.is_dir() {
            continue;
        }
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if name != SHARED_DIR && !name.starts_with('.') => dirs.push(name.to_string()),
            _ => {}
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Renders views and fragments from a [`TemplateSet`].
///
/// With `compile_on_render` the whole set is rebuilt from disk before each
/// render and swapped in; otherwise the set built at startup is used forever.
pub struct Renderer {
    root: PathBuf,
    compile_on_render: bool,
    templates: RwLock<Arc<TemplateSet>>,
}

impl Renderer {
    pub fn new(config: &ViewsConfig) -> Result<Self, RenderError> {
        Self::from_dir(&config.dir, config.compile_on_render)
    }

    pub fn from_dir(root: impl Into<PathBuf>, compile_on_render: bool) -> Result<Self, RenderError> {
        let root = root.into();
        let set = TemplateSet::load(&root)?;
        info!(
            root = %root.display(),
            directories = ?set.directories(),
            compile_on_render,
            "templates loaded"
        );
        Ok(Self {
            root,
            compile_on_render,
            templates: RwLock::new(Arc::new(set)),
        })
    }

    async fn current(&self) -> Result<Arc<TemplateSet>, RenderError> {
        if !self.compile_on_render {
            return Ok(self.templates.read().await.clone());
        }

        let root = self.root.clone();
        let set = tokio::task::spawn_blocking(move || TemplateSet::load(&root))
            .await
            .map_err(|e| RenderError::Reload(e.to_string()))??;
        let set = Arc::new(set);
        *self.templates.write().await = set.clone();
        Ok(set)
    }

    pub async fn render_view<T: Serialize>(
        &self,
        view: View,
        globals: &Globals,
        data: &T,
    ) -> Result<String, RenderError> {
        let context = build_context(globals, data)?;
        self.current().await?.render_view(view, &context)
    }

    pub async fn render_partial<T: Serialize>(
        &self,
        partial: Partial,
        globals: &Globals,
        data: &T,
    ) -> Result<String, RenderError> {
        let context = build_context(globals, data)?;
        self.current().await?.render_partial(partial, &context)
    }

    pub async fn render_shared<T: Serialize>(
        &self,
        partial: SharedPartial,
        globals: &Globals,
        data: &T,
    ) -> Result<String, RenderError> {
        let context = build_context(globals, data)?;
        self.current().await?.render_shared(partial, &context)
    }
}
