//! Loading documents, stop words, queries, and configuration from disk.

use crate::normalize::clean_text;
use crate::trec::parse_trec;
use anyhow::{Context, Result};
use serde::Deserialize;
use sri_core::{EngineConfig, SourceDocument};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const EXTENSIONS: &[&str] = &["xml", "trec", "json", "jsonl"];

#[derive(Debug, Deserialize)]
struct InputDoc {
    #[serde(alias = "docno")]
    id: String,
    #[serde(default, alias = "headline")]
    title: String,
    #[serde(alias = "text")]
    body: String,
}

#[derive(Debug, Clone, Copy)]
pub struct SourceOptions {
    /// Run [`clean_text`] over every body. Disable for corpora that are
    /// already normalized.
    pub clean: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self { clean: true }
    }
}

impl SourceOptions {
    fn body(&self, raw: String) -> String {
        if self.clean {
            clean_text(&raw)
        } else {
            raw
        }
    }
}

/// Input files under `path`, in sorted order. A file path is returned as is.
pub fn collect_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("input path {} does not exist", path.display());
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| EXTENSIONS.contains(&ext))
        })
        .collect();
    files.sort();
    Ok(files)
}

pub fn load_documents(path: &Path, options: &SourceOptions) -> Result<Vec<SourceDocument>> {
    let mut docs = Vec::new();
    for file in collect_files(path)? {
        let before = docs.len();
        read_file(&file, options, &mut docs)
            .with_context(|| format!("failed to read {}", file.display()))?;
        tracing::info!(file = %file.display(), docs = docs.len() - before, "loaded documents");
    }
    Ok(docs)
}

fn read_file(file: &Path, options: &SourceOptions, out: &mut Vec<SourceDocument>) -> Result<()> {
    match file.extension().and_then(|s| s.to_str()) {
        Some("jsonl") => read_jsonl(file, options, out),
        Some("json") => read_json(file, options, out),
        _ => read_trec(file, options, out),
    }
}

fn read_trec(file: &Path, options: &SourceOptions, out: &mut Vec<SourceDocument>) -> Result<()> {
    let input = fs::read_to_string(file)?;
    let parsed = parse_trec(&input);
    if parsed.skipped > 0 {
        tracing::warn!(file = %file.display(), skipped = parsed.skipped, "DOC elements without DOCNO");
    }
    out.extend(parsed.articles.into_iter().map(|a| SourceDocument {
        id: a.doc_no,
        title: a.headline,
        body: options.body(a.text),
    }));
    Ok(())
}

fn read_jsonl(file: &Path, options: &SourceOptions, out: &mut Vec<SourceDocument>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("line {}", lineno + 1))?;
        out.push(to_source(doc, options));
    }
    Ok(())
}

fn read_json(file: &Path, options: &SourceOptions, out: &mut Vec<SourceDocument>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let doc: InputDoc = serde_json::from_value(v)?;
                out.push(to_source(doc, options));
            }
        }
        serde_json::Value::Object(_) => {
            let doc: InputDoc = serde_json::from_value(json)?;
            out.push(to_source(doc, options));
        }
        _ => anyhow::bail!("expected a JSON object or array of objects"),
    }
    Ok(())
}

fn to_source(doc: InputDoc, options: &SourceOptions) -> SourceDocument {
    SourceDocument { id: doc.id, title: doc.title, body: options.body(doc.body) }
}

/// Stop words, whitespace separated (normally one per line).
pub fn load_stopwords(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read stop words from {}", path.display()))?;
    Ok(text.split_whitespace().map(str::to_owned).collect())
}

/// One query per non-blank line.
pub fn load_queries(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read queries from {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Reads a JSON engine configuration, or the defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    EngineConfig::from_json_str(&json).with_context(|| format!("invalid config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_jsonl_and_json_in_sorted_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("b.jsonl"),
            "{\"id\":\"2\",\"title\":\"Dois\",\"body\":\"Gato, Cachorro!\"}\n\n{\"id\":\"3\",\"body\":\"peixe\"}\n",
        )
        .unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"id":"1","title":"Um","body":"Arara"}]"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = load_documents(dir.path(), &SourceOptions::default()).unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(docs[1].body, "gato  cachorro");
        assert_eq!(docs[2].title, "");
    }

    #[test]
    fn raw_option_keeps_bodies() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("one.json");
        fs::write(&file, r#"{"id":"1","body":"Arara Azul"}"#).unwrap();
        let docs = load_documents(&file, &SourceOptions { clean: false }).unwrap();
        assert_eq!(docs[0].body, "Arara Azul");
    }

    #[test]
    fn reads_trec_dump() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("dump.xml"),
            "<DOC><DOCNO>9</DOCNO><HEADLINE>Rio</HEADLINE><P>O Rio {{Info}} é &lt;i&gt;grande&lt;/i&gt;.</P></DOC>",
        )
        .unwrap();
        let docs = load_documents(dir.path(), &SourceOptions::default()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Rio");
        assert_eq!(docs[0].body.split_whitespace().collect::<Vec<_>>(), vec!["o", "rio", "é", "grande"]);
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.jsonl"), "{not json}\n").unwrap();
        let err = load_documents(dir.path(), &SourceOptions::default()).unwrap_err();
        assert!(format!("{err:#}").contains("bad.jsonl"));
    }

    #[test]
    fn missing_input_is_an_error() {
        assert!(load_documents(Path::new("/definitely/not/here"), &SourceOptions::default()).is_err());
    }

    #[test]
    fn queries_and_stopwords_skip_blanks() {
        let dir = tempdir().unwrap();
        let q = dir.path().join("queries.txt");
        fs::write(&q, "estados unidos\n\n  winston churchill \n").unwrap();
        assert_eq!(load_queries(&q).unwrap(), vec!["estados unidos", "winston churchill"]);

        let s = dir.path().join("stopwords.txt");
        fs::write(&s, "a\no\n\nde\n").unwrap();
        assert_eq!(load_stopwords(&s).unwrap(), vec!["a", "o", "de"]);
    }

    #[test]
    fn config_defaults_without_path() {
        assert_eq!(load_config(None).unwrap(), EngineConfig::default());
    }
}
