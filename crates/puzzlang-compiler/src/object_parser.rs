//! OBJECTS section: name line, colour line, optional `text` line, optional
//! 5x5 sprite.

use std::collections::BTreeSet;
use std::str::FromStr;

use puzzlang_types::{Color, ObjectDef, ObjectId, SPRITE_SIZE, Sprite};

use crate::error::Diagnostics;
use crate::script_lexer::SourceLine;

/// An object being accumulated from consecutive lines.
struct PendingObject {
    name: String,
    aliases: Vec<String>,
    line: usize,
    colors: Vec<Color>,
    text: Option<String>,
    sprite_rows: Vec<SourceLine>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Name,
    Colors,
    Sprite,
}

fn is_sprite_row(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c == '.' || c.is_ascii_digit())
}

/// The value of a `text <value>` attribute line, as written.
fn text_value(line: &str) -> Option<&str> {
    let (keyword, value) = line.split_once(char::is_whitespace)?;
    let value = value.trim();
    (keyword.eq_ignore_ascii_case("text") && !value.is_empty()).then_some(value)
}

struct ObjectParser<'a> {
    diags: &'a mut Diagnostics,
    objects: Vec<ObjectDef>,
    taken: BTreeSet<String>,
    pending: Option<PendingObject>,
}

impl<'a> ObjectParser<'a> {
    fn new(diags: &'a mut Diagnostics) -> Self {
        Self {
            diags,
            objects: Vec::new(),
            taken: BTreeSet::new(),
            pending: None,
        }
    }

    fn start(&mut self, line: &SourceLine) {
        self.finish();
        let mut words = line.value.split_whitespace().map(str::to_lowercase);
        let Some(name) = words.next() else {
            return;
        };
        self.pending = Some(PendingObject {
            name,
            aliases: words.collect(),
            line: line.line,
            colors: Vec::new(),
            text: None,
            sprite_rows: Vec::new(),
        });
    }

    fn colors(&mut self, line: &SourceLine) {
        let mut colors = Vec::new();
        for word in line.value.split_whitespace() {
            match Color::from_str(word) {
                Ok(c) => colors.push(c),
                Err(e) => self.diags.syntax(line.line, e.to_string()),
            }
        }
        if let Some(p) = self.pending.as_mut() {
            p.colors = colors;
        }
    }

    /// Only directly after the colour line.
    fn accepts_text(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.text.is_none() && p.sprite_rows.is_empty())
    }

    fn text(&mut self, value: &str) {
        if let Some(p) = self.pending.as_mut() {
            p.text = Some(value.to_string());
        }
    }

    fn sprite_row(&mut self, line: &SourceLine) {
        if let Some(p) = self.pending.as_mut() {
            p.sprite_rows.push(line.clone());
        }
    }

    fn sprite_full(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.sprite_rows.len() >= SPRITE_SIZE)
    }

    fn build_sprite(&mut self, p: &PendingObject) -> Option<Sprite> {
        if p.sprite_rows.is_empty() {
            return None;
        }
        if p.sprite_rows.len() != SPRITE_SIZE {
            self.diags.syntax(
                p.line,
                format!("sprite of '{}' must have {SPRITE_SIZE} rows", p.name),
            );
            return None;
        }
        let mut pixels = [[None; SPRITE_SIZE]; SPRITE_SIZE];
        let mut ok = true;
        for (row, src) in pixels.iter_mut().zip(&p.sprite_rows) {
            if src.value.chars().count() != SPRITE_SIZE {
                self.diags.syntax(
                    src.line,
                    format!("sprite rows must be {SPRITE_SIZE} pixels wide"),
                );
                ok = false;
                continue;
            }
            for (px, ch) in row.iter_mut().zip(src.value.chars()) {
                let Some(digit) = ch.to_digit(10) else {
                    continue;
                };
                if digit as usize >= p.colors.len() {
                    self.diags.syntax(
                        src.line,
                        format!(
                            "sprite of '{}' uses colour {digit} but only {} are declared",
                            p.name,
                            p.colors.len()
                        ),
                    );
                    ok = false;
                }
                *px = Some(digit as u8);
            }
        }
        ok.then_some(Sprite { pixels })
    }

    fn finish(&mut self) {
        let Some(p) = self.pending.take() else {
            return;
        };
        if p.colors.is_empty() {
            self.diags
                .syntax(p.line, format!("object '{}' has no colours", p.name));
        }
        let sprite = self.build_sprite(&p);

        for name in std::iter::once(&p.name).chain(&p.aliases) {
            if !self.taken.insert(name.clone()) {
                self.diags
                    .syntax(p.line, format!("'{name}' is already defined"));
            }
        }

        let id = ObjectId(self.objects.len() as u16);
        self.objects.push(ObjectDef {
            id,
            name: p.name,
            aliases: p.aliases,
            colors: p.colors,
            text: p.text,
            sprite,
            layer: 0,
            line: p.line,
        });
    }
}

/// Parse the OBJECTS section. Ids follow declaration order.
pub fn parse_objects(lines: &[SourceLine], diags: &mut Diagnostics) -> Vec<ObjectDef> {
    let mut parser = ObjectParser::new(diags);
    let mut state = State::Name;

    for line in lines {
        let text = line.value.as_str();
        if text.is_empty() {
            parser.finish();
            state = State::Name;
            continue;
        }
        state = match (state, text_value(text)) {
            (State::Name, _) => {
                parser.start(line);
                State::Colors
            }
            (State::Colors, _) => {
                parser.colors(line);
                State::Sprite
            }
            (State::Sprite, Some(value)) if parser.accepts_text() => {
                parser.text(value);
                State::Sprite
            }
            (State::Sprite, _) if is_sprite_row(text) && !parser.sprite_full() => {
                parser.sprite_row(line);
                State::Sprite
            }
            (State::Sprite, _) => {
                parser.start(line);
                State::Colors
            }
        };
    }
    parser.finish();

    let objects = parser.objects;
    log::debug!("compiled {} objects", objects.len());
    objects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script_lexer::Located;

    fn lines(raw: &str) -> Vec<SourceLine> {
        raw.lines()
            .enumerate()
            .map(|(i, s)| Located {
                value: s.trim().to_string(),
                line: i + 1,
            })
            .collect()
    }

    #[test]
    fn objects_with_and_without_sprites() {
        let src = "Background\nLIGHTGREEN GREEN\n11111\n01111\n11101\n11111\n10111\n\nPLAYER P\nwhite\nCrate\n#f80\n";
        let mut diags = Diagnostics::default();
        let objects = parse_objects(&lines(src), &mut diags);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(objects.len(), 3);
        assert_eq!(objects[0].name, "background");
        assert_eq!(objects[0].colors.len(), 2);
        let sprite = objects[0].sprite.as_ref().expect("sprite");
        assert_eq!(sprite.pixels[1][0], Some(0));
        assert_eq!(sprite.pixels[0][0], Some(1));
        assert_eq!(objects[1].name, "player");
        assert_eq!(objects[1].aliases, vec!["p".to_string()]);
        assert!(objects[1].sprite.is_none());
        assert_eq!(objects[2].id, ObjectId(2));
        assert_eq!(objects[2].colors, vec![Color::Rgb(0xFF, 0x88, 0x00)]);
    }

    #[test]
    fn transparent_pixels() {
        let src = "Target\nDarkBlue\n.....\n.000.\n.0.0.\n.000.\n.....\n";
        let mut diags = Diagnostics::default();
        let objects = parse_objects(&lines(src), &mut diags);
        assert!(diags.is_empty());
        let sprite = objects[0].sprite.as_ref().expect("sprite");
        assert_eq!(sprite.pixels[0][0], None);
        assert_eq!(sprite.pixels[1][1], Some(0));
    }

    #[test]
    fn duplicate_names_and_bad_palette() {
        let src = "Wall\nbrown\n\nwall\nred\n\nBox\nred\n00000\n01110\n00000\n00000\n00000\n";
        let mut diags = Diagnostics::default();
        let objects = parse_objects(&lines(src), &mut diags);
        assert_eq!(objects.len(), 3);
        assert_eq!(diags.len(), 2, "duplicate name plus palette index 1");
    }

    #[test]
    fn text_attribute_follows_the_colours() {
        let src = "S\npurple\ntext SSS\nText\nred\ntext Hello World\n.....\n.000.\n.0.0.\n.000.\n.....\n";
        let mut diags = Diagnostics::default();
        let objects = parse_objects(&lines(src), &mut diags);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].text.as_deref(), Some("SSS"));
        assert_eq!(objects[1].name, "text", "a bare `text` line names an object");
        assert_eq!(objects[1].text.as_deref(), Some("Hello World"));
        assert!(objects[1].sprite.is_some());
    }

    #[test]
    fn short_sprite_is_reported() {
        let src = "Box\nred\n000\n000\n000\n000\n000\n";
        let mut diags = Diagnostics::default();
        parse_objects(&lines(src), &mut diags);
        assert_eq!(diags.len(), 5);
    }
}
