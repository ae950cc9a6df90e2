// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn save_into(&self, dir: &Path) -> Result<PathBuf> {
        let Some(name) = Path::new(&self.file_name).file_name() else {
            bail!(
                "server sent an unusable file name {:?} -- save the file manually",
                self.file_name
            );
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("create download dir {}", dir.display()))?;
        let path = dir.join(name);
        fs::write(&path, &self.bytes).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}

pub fn file_name_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;
    for part in header.split(';').map(str::trim) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let encoded = value
                    .trim()
                    .split_once("''")
                    .map_or(value.trim(), |(_, rest)| rest);
                extended = percent_decode(encoded.trim_matches('"'));
            }
            "filename" => plain = Some(value.trim().trim_matches('"').to_owned()),
            _ => {}
        }
    }
    extended
        .or(plain)
        .filter(|name| !name.trim().is_empty())
}

fn percent_decode(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let hex = value.get(index + 1..index + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            index += 3;
        } else {
            out.push(bytes[index]);
            index += 1;
        }
    }
    String::from_utf8(out).ok()
}
