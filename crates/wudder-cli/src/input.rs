//! Reading JSON documents from files or stdin.

use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Read and parse a JSON document. `-` reads stdin.
pub fn read_json<T: DeserializeOwned>(source: &str) -> Result<T> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?
    };

    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", source))
}
