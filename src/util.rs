use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn codepoint_label(id: &str) -> String {
    match id.chars().next() {
        Some(ch) => format!("U+{:04X}", ch as u32),
        None => "U+????".to_owned(),
    }
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

pub fn stable_unit(id: &str) -> f32 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    (hasher.finish() & 0xffff) as f32 / 65_535.0
}
