// src/stages/sourcemap.rs

//! Version 3 source maps with line granularity.

use serde_json::json;

use crate::errors::Result;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Builds a source map one generated line at a time.
///
/// Every mapped line gets a single segment at column 0 pointing at the
/// start of a line in one of the sources.
#[derive(Debug, Clone)]
pub struct SourceMapBuilder {
    file: String,
    sources: Vec<String>,
    contents: Vec<String>,
    lines: Vec<Option<(usize, usize)>>,
}

impl SourceMapBuilder {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            sources: Vec::new(),
            contents: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Register a source and return its index.
    pub fn add_source(&mut self, name: impl Into<String>, content: impl Into<String>) -> usize {
        self.sources.push(name.into());
        self.contents.push(content.into());
        self.sources.len() - 1
    }

    /// Generated lines with no original (vendor code, comments).
    pub fn skip_lines(&mut self, count: usize) {
        self.lines.extend(std::iter::repeat_n(None, count));
    }

    /// `count` generated lines that correspond line by line to `source`,
    /// starting at `first_line`.
    pub fn map_lines(&mut self, source: usize, first_line: usize, count: usize) {
        self.lines
            .extend((0..count).map(|i| Some((source, first_line + i))));
    }

    /// `count` generated lines that all point at the start of `source`.
    pub fn map_to_start(&mut self, source: usize, count: usize) {
        self.lines.extend(std::iter::repeat_n(Some((source, 0)), count));
    }

    pub fn mappings(&self) -> String {
        let mut out = String::new();
        let mut prev_source = 0i64;
        let mut prev_line = 0i64;
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            if let Some((source, src_line)) = line {
                let (source, src_line) = (*source as i64, *src_line as i64);
                encode_vlq(0, &mut out);
                encode_vlq(source - prev_source, &mut out);
                encode_vlq(src_line - prev_line, &mut out);
                encode_vlq(0, &mut out);
                prev_source = source;
                prev_line = src_line;
            }
        }
        out
    }

    /// Serialize with sources served from `/source/`.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let map = json!({
            "version": 3,
            "file": self.file,
            "sources": self.sources,
            "sourcesContent": self.contents,
            "names": [],
            "mappings": self.mappings(),
            "sourceRoot": "/source/",
        });
        Ok(serde_json::to_vec(&map)?)
    }
}

fn encode_vlq(value: i64, out: &mut String) {
    let mut v = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };
    loop {
        let mut digit = (v & 31) as usize;
        v >>= 5;
        if v > 0 {
            digit |= 32;
        }
        out.push(BASE64[digit] as char);
        if v == 0 {
            break;
        }
    }
}
