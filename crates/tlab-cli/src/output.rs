//! Printing results either as pretty JSON or as one line per item.

use anyhow::Result;
use serde::Serialize;

/// Print `value` as JSON when `json` is set, otherwise the lines produced
/// by `summary`.
pub fn emit<T, F>(json: bool, value: &T, summary: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> Vec<String>,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        let lines = summary(value);
        if lines.is_empty() {
            println!("(none)");
        }
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}

/// `value` or `-`.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Shorten `text` to at most `max` characters, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_dash_fills_gaps() {
        assert_eq!(or_dash(Some(3)), "3");
        assert_eq!(or_dash::<u32>(None), "-");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("Rhythmus", 20), "Rhythmus");
        assert_eq!(truncate("Überraschungsworkshop", 10), "Überras...");
    }
}
