use std::path::Path;

use crate::config::app::Settings;

pub const IMAGE_KEY: &str = "Image";
pub const MAX_WIDTH_KEY: &str = "MaxWidth";
pub const MAX_HEIGHT_KEY: &str = "MaxHeight";

/// Raw lines of the config file, in file order.
///
/// Lines that are not a recognized `Key=Value` entry are kept untouched so
/// that hand edits survive a save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLines {
    lines: Vec<String>,
}

impl ConfigLines {
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.lines().map(str::to_owned).collect(),
        }
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Iterates over `(key, value)` for every recognized line.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.lines.iter().filter_map(|line| recognize(line))
    }

    /// Serialized file content: one line per entry, newline terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Returns the recognized key of `line` and its trimmed value.
fn recognize(line: &str) -> Option<(&'static str, &str)> {
    [IMAGE_KEY, MAX_WIDTH_KEY, MAX_HEIGHT_KEY]
        .into_iter()
        .find_map(|key| {
            line.strip_prefix(key)
                .and_then(|rest| rest.strip_prefix('='))
                .map(|value| (key, value.trim()))
        })
}

/// The file is UTF-8, so a path that is not would be written lossily. The app
/// refuses such images before they reach the settings.
fn image_value(path: Option<&Path>) -> String {
    path.map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Merges `settings` into `previous`.
///
/// Every line holding a recognized key is rewritten in place with the current
/// value. `MaxWidth` and `MaxHeight` are appended when missing; `Image` is
/// appended only when missing and a path is set. Other lines keep their
/// content and relative order.
pub fn merge(previous: &ConfigLines, settings: &Settings) -> ConfigLines {
    let image = image_value(settings.image_path.as_deref());
    let value_of = |key: &str| match key {
        IMAGE_KEY => image.clone(),
        MAX_WIDTH_KEY => settings.max_width.to_string(),
        _ => settings.max_height.to_string(),
    };

    let mut found_image = false;
    let mut found_width = false;
    let mut found_height = false;

    let mut lines: Vec<String> = previous
        .lines
        .iter()
        .map(|line| match recognize(line) {
            Some((key, _)) => {
                match key {
                    IMAGE_KEY => found_image = true,
                    MAX_WIDTH_KEY => found_width = true,
                    _ => found_height = true,
                }
                format!("{key}={}", value_of(key))
            }
            None => line.clone(),
        })
        .collect();

    if !found_image && !image.is_empty() {
        lines.push(format!("{IMAGE_KEY}={image}"));
    }
    if !found_width {
        lines.push(format!("{MAX_WIDTH_KEY}={}", settings.max_width));
    }
    if !found_height {
        lines.push(format!("{MAX_HEIGHT_KEY}={}", settings.max_height));
    }

    ConfigLines { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings(image: Option<&str>, w: u32, h: u32) -> Settings {
        Settings {
            image_path: image.map(PathBuf::from),
            max_width: w,
            max_height: h,
        }
    }

    #[test]
    fn test_merge_into_empty_skips_empty_image() {
        let merged = merge(&ConfigLines::default(), &settings(None, 1920, 1080));
        assert_eq!(merged.lines(), ["MaxWidth=1920", "MaxHeight=1080"]);
    }

    #[test]
    fn test_merge_into_empty_with_image() {
        let merged = merge(&ConfigLines::default(), &settings(Some("a.png"), 800, 600));
        assert_eq!(merged.lines(), ["Image=a.png", "MaxWidth=800", "MaxHeight=600"]);
    }

    #[test]
    fn test_merge_rewrites_in_place_and_keeps_unrelated_lines() {
        let previous = ConfigLines::parse("# overlay\nMaxHeight=10\nTheme=dark\nImage=old.gif\n\n");
        let merged = merge(&previous, &settings(Some("new.png"), 640, 480));
        assert_eq!(
            merged.lines(),
            [
                "# overlay",
                "MaxHeight=480",
                "Theme=dark",
                "Image=new.png",
                "",
                "MaxWidth=640",
            ]
        );
    }

    #[test]
    fn test_merge_clears_existing_image_line() {
        let previous = ConfigLines::parse("Image=old.png\nMaxWidth=1\nMaxHeight=2\n");
        let merged = merge(&previous, &settings(None, 1, 2));
        assert_eq!(merged.lines(), ["Image=", "MaxWidth=1", "MaxHeight=2"]);
    }

    #[test]
    fn test_merge_never_duplicates_image_line() {
        let once = merge(&ConfigLines::default(), &settings(Some("a.png"), 5, 5));
        let twice = merge(&once, &settings(Some("b.png"), 5, 5));
        let image_lines = twice
            .lines()
            .iter()
            .filter(|l| l.starts_with("Image="))
            .count();
        assert_eq!(image_lines, 1);
        assert_eq!(twice.lines()[0], "Image=b.png");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let previous = ConfigLines::parse("x=1\nMaxWidth=3\n");
        let s = settings(Some("c.jpg"), 100, 200);
        let first = merge(&previous, &s);
        let second = merge(&first, &s);
        assert_eq!(first.render(), second.render());
    }

    #[test]
    fn test_keys_need_exact_prefix() {
        let lines = ConfigLines::parse(" MaxWidth=5\nMaxWidthX=6\nmaxwidth=7\nMaxWidth = 8\n");
        assert_eq!(lines.entries().count(), 0);
    }

    #[test]
    fn test_entries_trim_values() {
        let lines = ConfigLines::parse("Image=  a b.png  \r\nMaxHeight=42\n");
        let entries: Vec<_> = lines.entries().collect();
        assert_eq!(entries, [("Image", "a b.png"), ("MaxHeight", "42")]);
    }
}
