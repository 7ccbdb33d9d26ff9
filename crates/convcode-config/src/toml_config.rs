use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use crate::profile::CoderProfile;

/// Build a [`CoderProfile`] from a TOML configuration string.
pub fn from_toml_str(toml_str: &str) -> Result<CoderProfile, Box<dyn std::error::Error>> {
    let root: TomlProfileRoot = toml::from_str(toml_str)?;

    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }

    Ok(CoderProfile {
        name: root.name,
        k: root.k,
        polys: root.polys,
        recursive: root.recursive.unwrap_or(false),
        tail_terminated: root.tail_terminated.unwrap_or(true),
        uncertainty_100: root.uncertainty_100.unwrap_or(100),
        interleave_cols: root.interleave_cols,
    })
}

/// Build a [`CoderProfile`] from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<CoderProfile, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build a [`CoderProfile`] from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<CoderProfile, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    from_reader(r)
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

#[derive(Deserialize)]
struct TomlProfileRoot {
    name: String,
    k: u8,
    polys: Vec<u32>,
    #[serde(default)]
    recursive: Option<bool>,
    #[serde(default)]
    tail_terminated: Option<bool>,
    #[serde(default)]
    uncertainty_100: Option<u8>,
    #[serde(default)]
    interleave_cols: Option<usize>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}
