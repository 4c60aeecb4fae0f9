//! Parser for RFC 822 style core metadata (`METADATA` / `PKG-INFO`).

use crate::{PackageError, PackageMetadata};

/// Metadata versions this reader understands.
pub const SUPPORTED_METADATA_VERSIONS: &[&str] =
    &["1.0", "1.1", "1.2", "2.0", "2.1", "2.2", "2.3", "2.4"];

/// Prefix used by some tools to protect blank lines in a folded
/// `Description` header.
const DESCRIPTION_PIPE: &str = "       |";

/// Split raw metadata text into `(name, value)` headers and the body.
///
/// Folded continuation lines are kept, each on its own line, without their
/// leading whitespace removed.
pub fn split_headers(text: &str) -> (Vec<(String, String)>, &str) {
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let (line, next) = match rest.find('\n') {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (rest, ""),
        };
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return (headers, next);
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some((_, value)) = headers.last_mut() {
                value.push('\n');
                value.push_str(line);
            }
        } else if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim_start().to_string()));
        }
        // Lines that are neither headers nor continuations are dropped.

        rest = next;
    }
    (headers, "")
}

/// Unfold a header value: continuation lines are stripped and joined with
/// spaces.
fn collapse(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unfold a `Description` header, keeping its line structure.
fn dedent_description(value: &str) -> String {
    let mut lines = value.lines();
    let mut out: Vec<&str> = lines.next().into_iter().collect();
    for line in lines {
        let line = line
            .strip_prefix(DESCRIPTION_PIPE)
            .or_else(|| line.strip_prefix("        "))
            .unwrap_or_else(|| line.trim_start());
        out.push(line);
    }
    out.join("\n")
}

/// Parse raw metadata bytes.
pub fn parse_metadata(data: &[u8]) -> Result<PackageMetadata, PackageError> {
    let text = std::str::from_utf8(data)
        .map_err(|_| PackageError::InvalidMetadata("metadata is not valid UTF-8".to_string()))?;
    let (headers, body) = split_headers(text);

    let mut meta = PackageMetadata::default();
    for (name, value) in &headers {
        let key = name.to_ascii_lowercase();
        if key == "description" {
            meta.description = Some(dedent_description(value));
            continue;
        }

        let value = collapse(value);
        match key.as_str() {
            "metadata-version" => meta.metadata_version = Some(value),
            "name" => meta.name = Some(value),
            "version" => meta.version = Some(value),
            "summary" => meta.summary = Some(value),
            "home-page" => meta.home_page = Some(value),
            "download-url" => meta.download_url = Some(value),
            "author" => meta.author = Some(value),
            "author-email" => meta.author_email = Some(value),
            "maintainer" => meta.maintainer = Some(value),
            "maintainer-email" => meta.maintainer_email = Some(value),
            "license" => meta.license = Some(value),
            "license-expression" => meta.license_expression = Some(value),
            "keywords" => meta.keywords = Some(value),
            "requires-python" => meta.requires_python = Some(value),
            "description-content-type" => meta.description_content_type = Some(value),
            "classifier" => meta.classifiers.push(value),
            "platform" => meta.platforms.push(value),
            "supported-platform" => meta.supported_platforms.push(value),
            "requires-dist" => meta.requires_dist.push(value),
            "provides-dist" => meta.provides_dist.push(value),
            "obsoletes-dist" => meta.obsoletes_dist.push(value),
            "requires-external" => meta.requires_external.push(value),
            "project-url" => meta.project_urls.push(value),
            "provides-extra" => meta.provides_extras.push(value),
            "license-file" => meta.license_files.push(value),
            "dynamic" => meta.dynamic.push(value),
            _ => {}
        }
    }

    if !body.trim().is_empty() {
        meta.description = Some(body.to_string());
    }

    validate(&meta)?;
    Ok(meta)
}

fn validate(meta: &PackageMetadata) -> Result<(), PackageError> {
    let version = meta
        .metadata_version
        .as_deref()
        .ok_or_else(|| PackageError::InvalidMetadata("missing Metadata-Version".to_string()))?;
    if !SUPPORTED_METADATA_VERSIONS.contains(&version) {
        return Err(PackageError::InvalidMetadata(format!(
            "unsupported Metadata-Version '{}'",
            version
        )));
    }
    for (field, value) in [("Name", &meta.name), ("Version", &meta.version)] {
        if value.as_deref().map_or(true, str::is_empty) {
            return Err(PackageError::InvalidMetadata(format!(
                "missing required field '{}'",
                field
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_headers_and_body() {
        let text = "Name: pkg\nSummary: one\n  two\n\nBody text\n";
        let (headers, body) = split_headers(text);
        assert_eq!(
            headers,
            vec![
                ("Name".to_string(), "pkg".to_string()),
                ("Summary".to_string(), "one\n  two".to_string()),
            ]
        );
        assert_eq!(body, "Body text\n");
    }

    #[test]
    fn test_body_description() {
        let meta = parse_metadata(
            b"Metadata-Version: 2.1\nName: pkg\nVersion: 1.0\n\
              Description-Content-Type: text/markdown\n\n# Title\n",
        )
        .unwrap();
        assert_eq!(meta.description.as_deref(), Some("# Title\n"));
        assert_eq!(meta.description_content_type.as_deref(), Some("text/markdown"));
    }

    #[test]
    fn test_header_description_is_dedented() {
        let meta = parse_metadata(
            b"Metadata-Version: 1.1\nName: pkg\nVersion: 1.0\n\
              Description: Title\n        =====\n       |\n        Body.\n",
        )
        .unwrap();
        assert_eq!(meta.description.as_deref(), Some("Title\n=====\n\nBody."));
    }

    #[test]
    fn test_multi_use_fields() {
        let meta = parse_metadata(
            b"Metadata-Version: 2.1\nName: pkg\nVersion: 1.0\n\
              Classifier: A\nClassifier: B\nProject-URL: Docs, https://x\n",
        )
        .unwrap();
        assert_eq!(meta.classifiers, vec!["A", "B"]);
        assert_eq!(meta.project_urls, vec!["Docs, https://x"]);
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let meta = parse_metadata(b"metadata-version: 2.1\nNAME: pkg\nversion: 2.0\n").unwrap();
        assert_eq!(meta.name.as_deref(), Some("pkg"));
        assert_eq!(meta.version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_missing_metadata_version() {
        let err = parse_metadata(b"Name: pkg\nVersion: 1.0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid distribution metadata: missing Metadata-Version"
        );
    }

    #[test]
    fn test_unsupported_metadata_version() {
        let err = parse_metadata(b"Metadata-Version: 9.9\nName: pkg\nVersion: 1.0\n").unwrap_err();
        assert!(err.to_string().contains("unsupported Metadata-Version '9.9'"));
    }

    #[test]
    fn test_missing_name() {
        let err = parse_metadata(b"Metadata-Version: 2.1\nVersion: 1.0\n").unwrap_err();
        assert!(err.to_string().contains("'Name'"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let meta =
            parse_metadata(b"Metadata-Version: 2.1\r\nName: pkg\r\nVersion: 1.0\r\n").unwrap();
        assert_eq!(meta.name.as_deref(), Some("pkg"));
    }
}
