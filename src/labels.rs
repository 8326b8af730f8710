//! Label file parsing.
//!
//! Label files are tag based: every line that carries both a
//! `value="<label>"` and a `background="<color>"` attribute describes one
//! component. Other lines are ignored.
//!
//! ```rust
//! use taxonomy::labels::parse_labels;
//!
//! let labels = parse_labels(r##"<Label value="115_breaker" background="#F20D7A"/>"##);
//! assert_eq!(labels[0].label, "115_breaker");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static VALUE_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"value="([^"]*)""#).unwrap());
static BACKGROUND_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"background="([^"]*)""#).unwrap());

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelEntry {
    pub label: String,
    pub color: String,
    pub index: i32,
}

/// Parse label lines in file order; indices count matching lines only
pub fn parse_labels(text: &str) -> Vec<LabelEntry> {
    text.lines()
        .filter_map(|line| {
            let label = VALUE_ATTR.captures(line)?.get(1)?.as_str();
            let color = BACKGROUND_ATTR.captures(line)?.get(1)?.as_str();
            Some((label.to_string(), color.to_string()))
        })
        .zip(0..)
        .map(|((label, color), index)| LabelEntry {
            label,
            color,
            index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_without_background_is_ignored() {
        let text = r##"<View>
  <Label value="115_breaker" background="#F20D7A"/>
  <Label value="foo"/>
</View>"##;

        assert_eq!(
            parse_labels(text),
            vec![LabelEntry {
                label: "115_breaker".to_string(),
                color: "#F20D7A".to_string(),
                index: 0,
            }]
        );
    }

    #[test]
    fn test_indices_skip_non_matching_lines() {
        let text = r##"<RectangleLabels name="label" toName="image">
<Label value="disconnect" background="#00FF00"/>
<Label background="#0000FF"/>
<Label background="#123456" value="transformer"/>
</RectangleLabels>"##;

        let labels = parse_labels(text);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label, "disconnect");
        assert_eq!(labels[0].index, 0);
        assert_eq!(labels[1].label, "transformer");
        assert_eq!(labels[1].color, "#123456");
        assert_eq!(labels[1].index, 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_labels("").is_empty());
        assert!(parse_labels("<View>\n</View>").is_empty());
    }
}
