//! Prompt overrides from a directory
//!
//! Every `<id>.prompt` file in the directory becomes the template `<id>`,
//! replacing the built-in of the same id:
//!
//! ```text
//! prompts/
//! ├── parser_suql.prompt
//! ├── if_db_classification.prompt
//! └── investment_response_SQL.prompt
//! ```

use crate::{JinjaTemplate, PromptError, PromptRegistry, PromptTemplate, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const PROMPT_EXTENSION: &str = "prompt";

#[derive(Debug, Clone)]
pub struct FileLoader {
    dir: PathBuf,
}

fn read_error(path: &Path) -> impl FnOnce(std::io::Error) -> PromptError + '_ {
    move |source| PromptError::Read {
        path: path.to_path_buf(),
        source,
    }
}

impl FileLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load `<id>.prompt`
    pub fn load_template(&self, id: &str) -> Result<JinjaTemplate> {
        let path = self.dir.join(format!("{id}.{PROMPT_EXTENSION}"));
        let source = fs::read_to_string(&path).map_err(read_error(&path))?;
        JinjaTemplate::new(id, source)
    }

    /// Load every `.prompt` file, sorted by id
    pub fn load_all(&self) -> Result<Vec<JinjaTemplate>> {
        let mut templates = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(read_error(&self.dir))? {
            let path = entry.map_err(read_error(&self.dir))?.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(PROMPT_EXTENSION)
            {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                templates.push(self.load_template(id)?);
            }
        }

        templates.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(templates)
    }

    /// Register every template in the directory; returns how many were loaded
    pub fn load_into(&self, registry: &PromptRegistry) -> Result<usize> {
        let templates = self.load_all()?;
        let count = templates.len();
        for template in templates {
            let id = template.id().to_string();
            if registry.register(template) {
                debug!("{} overrides the built-in template", id);
            } else {
                debug!("Loaded new template {}", id);
            }
        }
        Ok(count)
    }
}
