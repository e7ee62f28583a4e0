use std::collections::HashSet;

use regex::Regex;

lazy_static! {
    pub static ref RECURSIVE_CONTENT_REGEX: Regex =
        Regex::new(r"/content/([a-fA-F0-9]{64}i[0-9]+)").unwrap();
}

/// Decodes reveal content bytes, hex encoded with an optional `0x` prefix.
/// Anything undecodable is treated as empty content.
pub fn decode_content_bytes(content_bytes: &str) -> Vec<u8> {
    let content_bytes = content_bytes.strip_prefix("0x").unwrap_or(content_bytes);
    hex::decode(content_bytes).unwrap_or_default()
}

/// Inscription ids referenced through `/content/<id>` paths, deduplicated in
/// first-occurrence order. Ids are lowercased so they match stored genesis
/// ids. Binary payloads simply produce no references.
pub fn get_recursive_inscription_refs(content: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(content);
    let mut seen = HashSet::new();
    let mut refs = vec![];
    for captures in RECURSIVE_CONTENT_REGEX.captures_iter(&text) {
        let inscription_id = captures[1].to_lowercase();
        if seen.insert(inscription_id.clone()) {
            refs.push(inscription_id);
        }
    }
    refs
}
