//! LEGEND section: `symbol = name`, `symbol = a and b ...`, `symbol = a or b ...`.
//!
//! Definitions may refer to symbols declared further down, so every line is
//! parsed first and the table is resolved afterwards with a memoised
//! depth-first walk.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use puzzlang_types::{LegendEntry, LegendKind, ObjectDef, ObjectId};

use crate::error::{Diagnostics, ErrorKind};
use crate::script_lexer::SourceLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connector {
    Single,
    And,
    Or,
}

#[derive(Debug, Clone)]
struct RawDefinition {
    symbol: String,
    connector: Connector,
    names: Vec<String>,
    line: usize,
}

/// Resolved legend plus every name later sections may refer to.
#[derive(Debug, Default)]
pub struct LegendTable {
    pub entries: Vec<LegendEntry>,
    /// Object names, aliases and legend symbols, all lower-cased.
    pub names: BTreeMap<String, LegendKind>,
    pub player: BTreeSet<ObjectId>,
    pub background: Option<ObjectId>,
}

impl LegendTable {
    pub fn lookup(&self, name: &str) -> Option<&LegendKind> {
        self.names.get(&name.to_lowercase())
    }
}

fn parse_definition(line: &SourceLine, diags: &mut Diagnostics) -> Option<RawDefinition> {
    let Some((lhs, rhs)) = line.value.split_once('=') else {
        diags.syntax(line.line, "legend lines look like 'symbol = definition'");
        return None;
    };
    let symbol = lhs.trim().to_lowercase();
    if symbol.is_empty() || symbol.contains(char::is_whitespace) {
        diags.syntax(line.line, format!("invalid legend symbol '{}'", lhs.trim()));
        return None;
    }

    let words: Vec<String> = rhs.split_whitespace().map(str::to_lowercase).collect();
    if words.is_empty() {
        diags.syntax(line.line, format!("'{symbol}' has an empty definition"));
        return None;
    }

    // Names sit at even positions, connectors at odd ones.
    let mut connector = Connector::Single;
    let mut names = Vec::new();
    for (i, word) in words.iter().enumerate() {
        if i % 2 == 0 {
            if word == "and" || word == "or" {
                diags.syntax(line.line, format!("expected a name, found '{word}'"));
                return None;
            }
            names.push(word.clone());
            continue;
        }
        let this = match word.as_str() {
            "and" => Connector::And,
            "or" => Connector::Or,
            other => {
                diags.syntax(line.line, format!("expected 'and' or 'or', found '{other}'"));
                return None;
            }
        };
        if connector != Connector::Single && connector != this {
            diags.syntax(line.line, "cannot mix 'and' and 'or' in one definition");
            return None;
        }
        connector = this;
    }
    if words.len() % 2 == 0 {
        diags.syntax(line.line, format!("'{symbol}' ends with a connector"));
        return None;
    }

    Some(RawDefinition {
        symbol,
        connector,
        names,
        line: line.line,
    })
}

struct Resolver<'a> {
    objects: HashMap<&'a str, ObjectId>,
    definitions: HashMap<String, RawDefinition>,
    resolved: HashMap<String, LegendKind>,
    visiting: HashSet<String>,
    failed: HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn resolve(&mut self, symbol: &str, diags: &mut Diagnostics) -> Option<LegendKind> {
        if let Some(kind) = self.resolved.get(symbol) {
            return Some(kind.clone());
        }
        if self.failed.contains(symbol) {
            return None;
        }
        let def = self.definitions.get(symbol)?.clone();
        if !self.visiting.insert(symbol.to_string()) {
            diags.push(
                ErrorKind::Cycle,
                def.line,
                format!("'{symbol}' is defined in terms of itself"),
            );
            self.failed.insert(symbol.to_string());
            return None;
        }

        let kind = self.resolve_definition(&def, diags);
        self.visiting.remove(symbol);
        match &kind {
            Some(k) => {
                self.resolved.insert(symbol.to_string(), k.clone());
            }
            None => {
                self.failed.insert(symbol.to_string());
            }
        }
        kind
    }

    fn resolve_member(&mut self, name: &str, line: usize, diags: &mut Diagnostics) -> Option<LegendKind> {
        if let Some(id) = self.objects.get(name) {
            return Some(LegendKind::ExactSet(BTreeSet::from([*id])));
        }
        if self.definitions.contains_key(name) {
            return self.resolve(name, diags);
        }
        diags.undefined(line, name);
        None
    }

    fn resolve_definition(&mut self, def: &RawDefinition, diags: &mut Diagnostics) -> Option<LegendKind> {
        let mut members = Vec::with_capacity(def.names.len());
        let mut complete = true;
        for name in &def.names {
            match self.resolve_member(name, def.line, diags) {
                Some(kind) => members.push((name, kind)),
                None => complete = false,
            }
        }
        if !complete {
            return None;
        }

        match def.connector {
            Connector::Single => members.pop().map(|(_, kind)| kind),
            Connector::And => {
                let mut ids = BTreeSet::new();
                for (name, kind) in members {
                    if kind.is_property() {
                        diags.syntax(
                            def.line,
                            format!("'{name}' is an 'or' property and cannot be used with 'and'"),
                        );
                        return None;
                    }
                    ids.extend(kind.objects());
                }
                Some(LegendKind::ExactSet(ids))
            }
            Connector::Or => {
                let mut ids = BTreeSet::new();
                for (name, kind) in members {
                    if kind.is_aggregate() {
                        diags.syntax(
                            def.line,
                            format!("'{name}' is an 'and' aggregate and cannot be used with 'or'"),
                        );
                        return None;
                    }
                    ids.extend(kind.objects());
                }
                Some(LegendKind::AnyOf(ids))
            }
        }
    }
}

/// Parse and resolve the LEGEND section against the object table.
pub fn parse_legend(lines: &[SourceLine], objects: &[ObjectDef], diags: &mut Diagnostics) -> LegendTable {
    let mut object_names = HashMap::new();
    for obj in objects {
        object_names.insert(obj.name.as_str(), obj.id);
        for alias in &obj.aliases {
            object_names.insert(alias.as_str(), obj.id);
        }
    }

    let mut order = Vec::new();
    let mut definitions = HashMap::new();
    for line in lines.iter().filter(|l| !l.value.is_empty()) {
        let Some(def) = parse_definition(line, diags) else {
            continue;
        };
        if object_names.contains_key(def.symbol.as_str()) || definitions.contains_key(&def.symbol) {
            diags.syntax(def.line, format!("'{}' is already defined", def.symbol));
            continue;
        }
        order.push(def.symbol.clone());
        definitions.insert(def.symbol.clone(), def);
    }

    let mut resolver = Resolver {
        objects: object_names,
        definitions,
        resolved: HashMap::new(),
        visiting: HashSet::new(),
        failed: HashSet::new(),
    };

    let mut table = LegendTable::default();
    for (name, id) in &resolver.objects {
        table
            .names
            .insert((*name).to_string(), LegendKind::ExactSet(BTreeSet::from([*id])));
    }
    for symbol in &order {
        let Some(kind) = resolver.resolve(symbol, diags) else {
            continue;
        };
        let line = resolver.definitions.get(symbol).map_or(0, |d| d.line);
        table.names.insert(symbol.clone(), kind.clone());
        table.entries.push(LegendEntry {
            symbol: symbol.clone(),
            kind,
            line,
        });
    }

    match table.lookup("player") {
        Some(kind) => table.player = kind.objects().clone(),
        None if !resolver.failed.contains("player") => diags.undefined(0, "player"),
        None => {}
    }
    match table.lookup("background") {
        Some(kind) => {
            if kind.objects().len() > 1 {
                log::warn!("background names several objects, using the first for level fill");
            }
            table.background = kind.objects().iter().next().copied();
        }
        None if !resolver.failed.contains("background") => diags.undefined(0, "background"),
        None => {}
    }

    log::debug!(
        "resolved {} legend entries, {} names",
        table.entries.len(),
        table.names.len()
    );
    table
}
