pub mod console;
pub mod html;
pub mod json;
pub mod junit;

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::view::DashboardView;

/// Output formats for a dashboard snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Html,
    Junit,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
            OutputFormat::Junit => "junit",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            "junit" | "xml" => Ok(OutputFormat::Junit),
            other => anyhow::bail!("Unknown format: {}", other),
        }
    }
}

/// Render a snapshot in `format`
pub fn render(view: &DashboardView, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(console::render(view)),
        OutputFormat::Json => json::render(view),
        OutputFormat::Html => Ok(html::render(view)),
        OutputFormat::Junit => junit::render(view),
    }
}

/// Render a snapshot to `output`, or to stdout when no path is given
pub fn write(view: &DashboardView, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let rendered = render(view, format)?;

    if let Some(path) = output {
        std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {} to {}", format, path.display()))?;
        println!("{} report saved to: {}", format, path.display());
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::DashboardState;

    #[test]
    fn test_parse_format() {
        assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!("xml".parse::<OutputFormat>().unwrap(), OutputFormat::Junit);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_write_to_file() {
        let dir = std::env::temp_dir().join(format!("flakesense-render-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snapshot.json");

        let view = DashboardView::from_state(&DashboardState::default());
        write(&view, OutputFormat::Json, Some(&path)).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["stats"]["total"], 0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
