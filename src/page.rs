use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};

use crate::app::PagePublisher;
use crate::error::ShowcaseError;
use crate::html::render_document;
use crate::render::CatalogPage;

pub const DEFAULT_OUTPUT: &str = "showcase.html";

#[derive(Debug, Clone)]
pub struct HtmlFilePublisher {
    path: Utf8PathBuf,
    title: String,
}

impl HtmlFilePublisher {
    pub fn new(path: Utf8PathBuf, title: impl Into<String>) -> Self {
        Self {
            path,
            title: title.into(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl PagePublisher for HtmlFilePublisher {
    fn publish(&self, page: &CatalogPage) -> Result<(), ShowcaseError> {
        let html = render_document(page, &self.title);
        write_atomic(&self.path, html.as_bytes())?;
        tracing::info!(path = %self.path, phase = page.phase().label(), "page written");
        Ok(())
    }
}

pub fn write_atomic(dest: &Utf8Path, contents: &[u8]) -> Result<(), ShowcaseError> {
    let parent = match dest.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| ShowcaseError::Filesystem(err.to_string()))?;
    let mut temp = tempfile::Builder::new()
        .prefix(".showcase-page")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| ShowcaseError::Filesystem(err.to_string()))?;
    temp.write_all(contents)
        .map_err(|err| ShowcaseError::Filesystem(err.to_string()))?;
    temp.persist(dest.as_std_path())
        .map_err(|err| ShowcaseError::Filesystem(format!("write {dest}: {}", err.error)))?;
    Ok(())
}
