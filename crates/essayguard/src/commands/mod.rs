//! Command implementations.

use std::io::Read;

use anyhow::{Context, bail};
use camino::Utf8Path;
use essayguard_core::{AnalyzeOptions, Analyzer, Config};

pub mod analyze;
pub mod fix;
pub mod info;
pub mod rules;
#[cfg(feature = "mcp")]
pub mod serve;

/// Read a file, or stdin for `-`, and validate its size against the configured limit.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    if path.as_str() == "-" {
        return read_stdin(max_bytes);
    }

    // Preflight: check file size via metadata before reading into memory.
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    if let Some(max) = max_bytes {
        let size = metadata.len() as usize;
        if size > max {
            bail!("input too large: {path} is {size} bytes (limit: {max} bytes)");
        }
    }

    let content = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read {path}"))?;
    Ok(content)
}

fn read_stdin(max_bytes: Option<usize>) -> anyhow::Result<String> {
    let mut content = String::new();
    let stdin = std::io::stdin().lock();
    match max_bytes {
        Some(max) => {
            // One byte past the limit is enough to know it was exceeded.
            stdin
                .take(max as u64 + 1)
                .read_to_string(&mut content)
                .context("failed to read stdin")?;
            if content.len() > max {
                bail!("input too large: stdin exceeds {max} bytes");
            }
        }
        None => {
            let mut stdin = stdin;
            stdin
                .read_to_string(&mut content)
                .context("failed to read stdin")?;
        }
    }
    Ok(content)
}

/// Build the analyzer described by `config`.
pub fn build_analyzer(config: &Config) -> anyhow::Result<Analyzer> {
    Analyzer::from_config(config).context("invalid analysis settings in configuration")
}

/// Options for a CLI request: every phrase or rule id in `exclude` is hidden.
pub fn request_options(exclude: &[String]) -> AnalyzeOptions {
    AnalyzeOptions::new().excluding(exclude.iter().map(|s| s.trim()).filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_file_within_limit() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("essay.txt");
        std::fs::write(&path, "hello there").unwrap();
        let path = camino::Utf8PathBuf::try_from(path).unwrap();
        assert_eq!(read_input_file(&path, Some(100)).unwrap(), "hello there");
    }

    #[test]
    fn rejects_oversized_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("essay.txt");
        std::fs::write(&path, "0123456789").unwrap();
        let path = camino::Utf8PathBuf::try_from(path).unwrap();
        let err = read_input_file(&path, Some(5)).unwrap_err();
        assert!(err.to_string().contains("input too large"));
    }

    #[test]
    fn missing_file_has_context() {
        let err = read_input_file(Utf8Path::new("/nonexistent/essay.txt"), None).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn request_options_skip_blank_entries() {
        let opts = request_options(&["utilize".into(), " ".into(), " delve ".into()]);
        assert_eq!(opts.excluded_phrases, vec!["utilize", "delve"]);
    }
}
