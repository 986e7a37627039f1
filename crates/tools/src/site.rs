use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::template::{Template, TemplateError};

pub const TEMPLATE_DIR: &str = "templates";
pub const LAYOUT_FILE: &str = "layout.html";
/// Optional page list inside the template directory.
pub const PAGES_FILE: &str = "pages.json";
pub const DEFAULT_TITLE: &str = "Road Trip";

#[derive(Debug)]
pub enum SiteError {
    Io { path: PathBuf, source: io::Error },
    Pages { path: PathBuf, reason: String },
    MissingLayout(PathBuf),
    NoPages(PathBuf),
    /// Strict build only: the layout has a placeholder no page fills.
    Template { page: String, source: TemplateError },
}

impl std::fmt::Display for SiteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            SiteError::Pages { path, reason } => {
                write!(f, "invalid page list {}: {reason}", path.display())
            }
            SiteError::MissingLayout(path) => write!(f, "layout not found: {}", path.display()),
            SiteError::NoPages(dir) => write!(f, "no page templates in {}", dir.display()),
            SiteError::Template { page, source } => write!(f, "{page}: {source}"),
        }
    }
}

impl std::error::Error for SiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SiteError::Io { source, .. } => Some(source),
            SiteError::Template { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> SiteError + '_ {
    move |source| SiteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One generated page: a body template wrapped in the shared layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageSpec {
    /// File name inside the template directory.
    pub template: String,
    /// Output path relative to the site root; defaults to `template`.
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub styles: String,
    #[serde(default)]
    pub scripts: String,
}

impl PageSpec {
    pub fn output(&self) -> &str {
        self.output.as_deref().unwrap_or(&self.template)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SitePlan {
    #[serde(default = "default_title")]
    pub title: String,
    pub pages: Vec<PageSpec>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl SitePlan {
    /// Reads `templates/pages.json`, or lists every `templates/*.html` other
    /// than the layout when there is no page list.
    pub fn load(site_dir: &Path) -> Result<Self, SiteError> {
        let template_dir = site_dir.join(TEMPLATE_DIR);
        let pages_path = template_dir.join(PAGES_FILE);
        if pages_path.is_file() {
            let text = fs::read_to_string(&pages_path).map_err(io_err(&pages_path))?;
            return serde_json::from_str(&text).map_err(|e| SiteError::Pages {
                path: pages_path,
                reason: e.to_string(),
            });
        }

        let mut pages = Vec::new();
        for entry in fs::read_dir(&template_dir).map_err(io_err(&template_dir))? {
            let entry = entry.map_err(io_err(&template_dir))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name != LAYOUT_FILE && name.ends_with(".html") {
                pages.push(PageSpec {
                    template: name,
                    output: None,
                    title: None,
                    styles: String::new(),
                    scripts: String::new(),
                });
            }
        }
        pages.sort_by(|a, b| a.template.cmp(&b.template));
        Ok(SitePlan {
            title: default_title(),
            pages,
        })
    }
}

/// Renders one page into the layout. Placeholders the layout does not fill
/// stay as written, unless `strict` is set, in which case they are errors.
pub fn render_page(
    layout: &Template,
    plan_title: &str,
    page: &PageSpec,
    body: &str,
    strict: bool,
) -> Result<String, TemplateError> {
    let title = page.title.as_deref().unwrap_or(plan_title);
    let vars = BTreeMap::from([
        ("title", title),
        ("styles", page.styles.as_str()),
        ("content", body),
        ("scripts", page.scripts.as_str()),
    ]);
    if strict {
        layout.substitute(&vars)
    } else {
        Ok(layout.safe_substitute(&vars))
    }
}

/// Builds every page of `site_dir` and returns the written files in order.
/// A strict build writes nothing once any page fails to render.
pub fn build_site(site_dir: &Path, strict: bool) -> Result<Vec<PathBuf>, SiteError> {
    let template_dir = site_dir.join(TEMPLATE_DIR);
    let layout_path = template_dir.join(LAYOUT_FILE);
    if !layout_path.is_file() {
        return Err(SiteError::MissingLayout(layout_path));
    }
    let layout = Template::new(fs::read_to_string(&layout_path).map_err(io_err(&layout_path))?);

    let plan = SitePlan::load(site_dir)?;
    if plan.pages.is_empty() {
        return Err(SiteError::NoPages(template_dir));
    }

    let mut rendered = Vec::with_capacity(plan.pages.len());
    for page in &plan.pages {
        let src = template_dir.join(&page.template);
        let body = fs::read_to_string(&src).map_err(io_err(&src))?;
        let html = render_page(&layout, &plan.title, page, &body, strict).map_err(|source| {
            SiteError::Template {
                page: page.template.clone(),
                source,
            }
        })?;
        rendered.push((page, html));
    }

    let mut written = Vec::with_capacity(rendered.len());
    for (page, html) in rendered {
        let out = site_dir.join(page.output());
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        fs::write(&out, html).map_err(io_err(&out))?;
        written.push(out);
    }
    Ok(written)
}
