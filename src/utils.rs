use std::{
    fs,
    path::{Path, PathBuf},
};

use dirs::data_dir;
use once_cell::sync::Lazy;

static DATA_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let base = data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let root = base.join("eventco");
    if let Err(err) = fs::create_dir_all(&root) {
        log::warn!("failed to create data root {}: {err}", root.display());
    }
    root
});

pub fn data_root() -> PathBuf {
    DATA_ROOT.clone()
}

pub fn database_path() -> PathBuf {
    data_root().join("eventco.sqlite")
}

pub fn config_path() -> PathBuf {
    data_root().join("config.json")
}

pub fn exports_dir() -> PathBuf {
    data_root().join("exports")
}

pub fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            log::warn!("failed to create parent {}: {err}", parent.display());
        }
    }
}

/// Inline SVG tile bearing the event title, for events without cover
/// art. Generated on demand, never persisted.
pub fn svg_placeholder(title: &str) -> String {
    let svg = format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1200\" height=\"600\">",
            "<rect width=\"100%\" height=\"100%\" fill=\"#f3f6ff\"/>",
            "<text x=\"48\" y=\"320\" font-size=\"40\" fill=\"#374151\" font-family=\"Arial\">{}</text>",
            "</svg>"
        ),
        escape_xml(title)
    );
    format!("data:image/svg+xml;utf8,{}", urlencoding::encode(&svg))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_a_data_uri_with_the_title_escaped() {
        let uri = svg_placeholder("Tea & <Cakes>");
        assert!(uri.starts_with("data:image/svg+xml;utf8,"));
        assert!(uri.contains(&urlencoding::encode("Tea &amp; &lt;Cakes&gt;").into_owned()));
        assert!(!uri.contains('<'));
    }
}
