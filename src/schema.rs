use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Ordered column names for every log line of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Reads a column file whose whitespace-separated tokens are the field names.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read column file {:?}", path))?;
        let schema = Self::parse(&content);
        if schema.is_empty() {
            anyhow::bail!("Column file {:?} does not name any fields", path);
        }

        info!(
            action = "loaded",
            component = "schema",
            file_path = ?path,
            field_count = schema.len(),
            "Loaded log schema"
        );
        Ok(schema)
    }

    pub fn parse(content: &str) -> Self {
        Self::new(content.split_whitespace().map(str::to_string).collect())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
