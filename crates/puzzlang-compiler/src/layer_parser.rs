use std::collections::BTreeMap;

use puzzlang_types::{ObjectDef, ObjectId};

use crate::error::{Diagnostics, ErrorKind};
use crate::legend_parser::LegendTable;
use crate::script_lexer::SourceLine;

/// Parse COLLISIONLAYERS and record each object's layer in `objects`.
///
/// Every object has to end up in exactly one layer. Aggregates whose members
/// share a layer could never be placed and are rejected here too.
pub fn parse_layers(
    lines: &[SourceLine],
    objects: &mut [ObjectDef],
    legend: &LegendTable,
    diags: &mut Diagnostics,
) -> Vec<Vec<ObjectId>> {
    let mut layers: Vec<Vec<ObjectId>> = Vec::new();
    let mut assigned: BTreeMap<ObjectId, usize> = BTreeMap::new();

    for line in lines.iter().filter(|l| !l.value.is_empty()) {
        let index = layers.len();
        let mut layer = Vec::new();
        for name in line
            .value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|w| !w.is_empty())
        {
            let Some(kind) = legend.lookup(name) else {
                diags.undefined(line.line, name);
                continue;
            };
            for id in kind.objects() {
                match assigned.get(id) {
                    Some(&prev) if prev == index => {}
                    Some(&prev) => diags.push(
                        ErrorKind::LayerConflict,
                        line.line,
                        format!("object '{}' already appears in layer {prev}", object_name(objects, *id)),
                    ),
                    None => {
                        assigned.insert(*id, index);
                        layer.push(*id);
                    }
                }
            }
        }
        layers.push(layer);
    }

    for obj in objects.iter_mut() {
        match assigned.get(&obj.id) {
            Some(&layer) => obj.layer = layer,
            None => diags.push(
                ErrorKind::LayerConflict,
                obj.line,
                format!("object '{}' is not in any collision layer", obj.name),
            ),
        }
    }

    for entry in legend.entries.iter().filter(|e| e.kind.is_aggregate()) {
        let mut seen: BTreeMap<usize, ObjectId> = BTreeMap::new();
        for id in entry.kind.objects() {
            let Some(&layer) = assigned.get(id) else {
                continue;
            };
            if let Some(other) = seen.insert(layer, *id) {
                diags.push(
                    ErrorKind::LayerConflict,
                    entry.line,
                    format!(
                        "'{}' combines '{}' and '{}', which share a collision layer",
                        entry.symbol,
                        object_name(objects, other),
                        object_name(objects, *id)
                    ),
                );
            }
        }
    }

    log::debug!("compiled {} collision layers", layers.len());
    layers
}

fn object_name(objects: &[ObjectDef], id: ObjectId) -> &str {
    objects.get(id.index()).map_or("?", |o| o.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script_lexer::Located;
    use puzzlang_types::{LegendEntry, LegendKind};
    use std::collections::BTreeSet;

    fn object(id: u16, name: &str) -> ObjectDef {
        ObjectDef {
            id: ObjectId(id),
            name: name.to_string(),
            aliases: Vec::new(),
            colors: Vec::new(),
            text: None,
            sprite: None,
            layer: 0,
            line: 10 + id as usize,
        }
    }

    fn setup() -> (Vec<ObjectDef>, LegendTable) {
        let objects = vec![object(0, "background"), object(1, "player"), object(2, "wall"), object(3, "crate")];
        let mut legend = LegendTable::default();
        for o in &objects {
            legend
                .names
                .insert(o.name.clone(), LegendKind::ExactSet(BTreeSet::from([o.id])));
        }
        let solid = LegendKind::AnyOf(BTreeSet::from([ObjectId(2), ObjectId(3)]));
        legend.names.insert("solid".into(), solid.clone());
        legend.entries.push(LegendEntry {
            symbol: "solid".into(),
            kind: solid,
            line: 5,
        });
        (objects, legend)
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
    fn layers_assign_objects() {
        let (mut objects, legend) = setup();
        let mut diags = Diagnostics::default();
        let layers = parse_layers(&lines(&["Background", "", "Player, Solid"]), &mut objects, &legend, &mut diags);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1], vec![ObjectId(1), ObjectId(2), ObjectId(3)]);
        assert_eq!(objects[3].layer, 1);
        assert_eq!(objects[0].layer, 0);
    }

    #[test]
    fn object_in_two_layers_and_missing_object() {
        let (mut objects, legend) = setup();
        let mut diags = Diagnostics::default();
        parse_layers(&lines(&["Background", "Player Wall", "Wall"]), &mut objects, &legend, &mut diags);
        let err = diags.into_error("t");
        assert_eq!(err.errors.len(), 2, "{:?}", err.errors);
        assert!(err.errors.iter().all(|e| e.kind == ErrorKind::LayerConflict));
        assert_eq!(err.errors[1].line, 13, "crate has no layer");
    }

    #[test]
    fn aggregate_within_one_layer() {
        let (mut objects, mut legend) = setup();
        legend.entries.push(LegendEntry {
            symbol: "stack".into(),
            kind: LegendKind::ExactSet(BTreeSet::from([ObjectId(2), ObjectId(3)])),
            line: 7,
        });
        let mut diags = Diagnostics::default();
        parse_layers(&lines(&["Background", "Player", "Wall Crate"]), &mut objects, &legend, &mut diags);
        let err = diags.into_error("t");
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].line, 7);
        assert_eq!(err.errors[0].kind, ErrorKind::LayerConflict);
    }
}
