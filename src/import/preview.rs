use std::fmt::Write;

use anyhow::Result;
use colored::Colorize;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::models::property::DraftProperty;

use super::batch_import::PropertyBatch;

/// A cursor over the rows of a batch under preview. Traversal clamps at the
/// ends, it never wraps around.
pub struct PreviewNavigator<'a> {
    batch: &'a PropertyBatch,
    cursor: usize,
}

impl<'a> PreviewNavigator<'a> {
    pub fn new(batch: &'a PropertyBatch) -> PreviewNavigator<'a> {
        PreviewNavigator { batch, cursor: 0 }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn current(&self) -> Option<&DraftProperty> {
        self.batch.rows().get(self.cursor)
    }

    pub fn next(&mut self) {
        if self.cursor + 1 < self.batch.len() {
            self.cursor += 1;
        }
    }

    pub fn previous(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.batch.len()
    }

    pub fn has_previous(&self) -> bool {
        self.cursor > 0
    }

    /// Renders the row under the cursor: position, title and code, the key
    /// summary fields, the names of the attached files and the colorized
    /// JSON the backend would receive.
    pub fn render_current(&self) -> Result<String> {
        let row = self
            .current()
            .ok_or_else(|| anyhow::anyhow!("the batch has no rows to preview"))?;

        let mut out = String::new();
        writeln!(
            out,
            "{}",
            format!("Property preview {} of {}", self.cursor + 1, self.batch.len()).bold()
        )?;
        writeln!(out, "{} ({})", row.title, row.code)?;
        writeln!(
            out,
            "Neighborhood: {} | City: {} | Type: {} | Price: {}",
            row.neighborhood, row.city, row.property_type, row.price
        )?;

        writeln!(out, "Selected image files:")?;
        if row.image_files.is_empty() {
            writeln!(out, "  (no files selected)")?;
        } else {
            for name in &row.image_files {
                writeln!(out, "  - {}", name)?;
            }
        }

        writeln!(out, "Full JSON:")?;
        let json = serde_json::to_string_pretty(row)?;
        writeln!(out, "{}", syntax_highlight(&json))?;

        Ok(out)
    }
}

lazy_static! {
    // One token per match: a string (optionally a key when followed by a
    // colon), a true/false/null literal, or a number.
    static ref JSON_TOKEN_REGEX: Regex = Regex::new(
        r#""(\\u[a-zA-Z0-9]{4}|\\[^u]|[^\\"])*"(\s*:)?|\b(true|false|null)\b|-?\d+(?:\.\d*)?(?:[eE][+\-]?\d+)?"#
    )
    .unwrap();
}

/// Colorizes serialized JSON for the preview: key strings purple, value
/// strings green, true/false red, null dimmed, numbers yellow.
pub fn syntax_highlight(json: &str) -> String {
    JSON_TOKEN_REGEX
        .replace_all(json, |caps: &Captures| {
            let token = &caps[0];
            if token.starts_with('"') {
                if token.ends_with(':') {
                    token.purple().to_string()
                } else {
                    token.green().to_string()
                }
            } else if token == "true" || token == "false" {
                token.red().to_string()
            } else if token == "null" {
                token.bright_black().to_string()
            } else {
                token.yellow().to_string()
            }
        })
        .to_string()
}
