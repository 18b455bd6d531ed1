use std::str::FromStr;

use puzzlang_types::{DirectionMask, GlobalSound, MAX_SFX, ObjectSound, SoundDef, SoundTrigger};

use crate::error::Diagnostics;
use crate::legend_parser::LegendTable;
use crate::script_lexer::SourceLine;

fn parse_sfx(word: &str) -> Option<u8> {
    let n: u8 = word.strip_prefix("sfx")?.parse().ok()?;
    (n <= MAX_SFX).then_some(n)
}

/// Parse the SOUNDS section. Every declaration ends with its generator seed.
pub fn parse_sounds(lines: &[SourceLine], legend: &LegendTable, diags: &mut Diagnostics) -> Vec<SoundDef> {
    let mut sounds = Vec::new();

    for line in lines.iter().filter(|l| !l.value.is_empty()) {
        let words: Vec<String> = line.value.split_whitespace().map(str::to_lowercase).collect();
        let Some((seed_word, head)) = words.split_last() else {
            continue;
        };
        let Ok(seed) = seed_word.parse::<u64>() else {
            diags.syntax(line.line, format!("sound must end with a numeric seed, found '{seed_word}'"));
            continue;
        };

        match head {
            [event] => {
                let trigger = if let Some(n) = parse_sfx(event) {
                    SoundTrigger::Sfx(n)
                } else if let Ok(global) = GlobalSound::from_str(event) {
                    SoundTrigger::Global(global)
                } else {
                    diags.syntax(line.line, format!("unknown sound event '{event}'"));
                    continue;
                };
                sounds.push(SoundDef {
                    trigger,
                    seed,
                    line: line.line,
                });
            }
            [name, event, dirs @ ..] => {
                let Ok(event) = ObjectSound::from_str(event) else {
                    diags.syntax(line.line, format!("unknown object sound event '{event}'"));
                    continue;
                };
                let mut directions = DirectionMask::empty();
                let mut ok = true;
                for dir in dirs {
                    match DirectionMask::from_keyword(dir) {
                        Some(mask) if matches!(event, ObjectSound::Move | ObjectSound::CantMove) => {
                            directions |= mask;
                        }
                        _ => {
                            diags.syntax(line.line, format!("unexpected '{dir}' in sound declaration"));
                            ok = false;
                        }
                    }
                }
                let Some(kind) = legend.lookup(name) else {
                    diags.undefined(line.line, name);
                    continue;
                };
                if !ok {
                    continue;
                }
                for object in kind.objects() {
                    sounds.push(SoundDef {
                        trigger: SoundTrigger::Object {
                            object: *object,
                            event,
                            directions,
                        },
                        seed,
                        line: line.line,
                    });
                }
            }
            [] => diags.syntax(line.line, "sound declaration has no event"),
        }
    }

    log::debug!("compiled {} sounds", sounds.len());
    sounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script_lexer::Located;
    use puzzlang_types::{LegendKind, ObjectId};
    use std::collections::BTreeSet;

    fn legend() -> LegendTable {
        let mut table = LegendTable::default();
        table
            .names
            .insert("crate".into(), LegendKind::ExactSet(BTreeSet::from([ObjectId(2)])));
        table.names.insert(
            "colour".into(),
            LegendKind::AnyOf(BTreeSet::from([ObjectId(3), ObjectId(4)])),
        );
        table
    }

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
    fn all_trigger_shapes() {
        let mut diags = Diagnostics::default();
        let sounds = parse_sounds(
            &lines(&["sfx3 1234", "EndLevel 99", "Crate move up left 555", "colour destroy 7"]),
            &legend(),
            &mut diags,
        );
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(sounds.len(), 5);
        assert_eq!(sounds[0].trigger, SoundTrigger::Sfx(3));
        assert_eq!(sounds[1].trigger, SoundTrigger::Global(GlobalSound::EndLevel));
        assert_eq!(
            sounds[2].trigger,
            SoundTrigger::Object {
                object: ObjectId(2),
                event: ObjectSound::Move,
                directions: DirectionMask::UP | DirectionMask::LEFT,
            }
        );
        assert_eq!(sounds[2].seed, 555);
        assert!(sounds[3..].iter().all(|s| s.seed == 7));
    }

    #[test]
    fn malformed_sounds() {
        let mut diags = Diagnostics::default();
        let sounds = parse_sounds(
            &lines(&["sfx11 3", "crate teleport 4", "ghost move 5", "sfx1 loud", "crate create up 6"]),
            &legend(),
            &mut diags,
        );
        assert!(sounds.is_empty());
        assert_eq!(diags.len(), 5);
    }
}
