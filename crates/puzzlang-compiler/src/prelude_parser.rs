use puzzlang_types::{PRELUDE_SETTINGS, Prelude, PreludeFlags};

use crate::script_lexer::SourceLine;

/// Parse `key [value]` prelude lines. Unknown keys are logged and skipped.
pub fn parse_prelude(lines: &[SourceLine]) -> Prelude {
    let mut prelude = Prelude::default();

    for line in lines {
        let text = line.value.as_str();
        if text.is_empty() {
            continue;
        }
        let (key, value) = match text.split_once(char::is_whitespace) {
            Some((k, v)) => (k.to_ascii_lowercase(), v.trim()),
            None => (text.to_ascii_lowercase(), ""),
        };

        if let Some(flag) = PreludeFlags::from_keyword(&key) {
            prelude.flags |= flag;
        } else if PRELUDE_SETTINGS.contains(&key.as_str()) {
            prelude.settings.insert(key, value.to_string());
        } else {
            log::warn!("line {}: unknown prelude key '{key}'", line.line);
        }
    }
    prelude
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script_lexer::Located;

    fn lines(raw: &[&str]) -> Vec<SourceLine> {
        raw.iter()
            .enumerate()
            .map(|(i, s)| Located {
                value: (*s).to_string(),
                line: i + 1,
            })
            .collect()
    }

    #[test]
    fn settings_and_flags() {
        let prelude = parse_prelude(&lines(&[
            "title Simple Block Pushing Game",
            "author Stephen Lavelle",
            "",
            "NOUNDO",
            "run_rules_on_level_start",
            "frobnicate 3",
        ]));
        assert_eq!(prelude.setting("title"), Some("Simple Block Pushing Game"));
        assert_eq!(prelude.setting("author"), Some("Stephen Lavelle"));
        assert!(prelude.has(PreludeFlags::NOUNDO));
        assert!(prelude.has(PreludeFlags::RUN_RULES_ON_LEVEL_START));
        assert!(!prelude.has(PreludeFlags::NORESTART));
        assert_eq!(prelude.setting("frobnicate"), None);
    }
}
