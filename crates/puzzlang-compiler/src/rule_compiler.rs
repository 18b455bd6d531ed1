//! Lowering of parsed rules into direction-expanded [`RuleGroup`]s.
//!
//! Per source rule: shape checks, name resolution, concretisation of
//! right-hand properties, aggregate expansion, then one [`Rule`] per
//! direction in the prefix (all four by default) with relative qualifiers
//! made absolute. Single-cell rules look the same in every direction, so
//! their duplicates are dropped.

use std::collections::{BTreeMap, BTreeSet};

use puzzlang_types::{
    CellPattern, CellTerm, Direction, DirectionMask, LegendKind, MoveQualifier, ObjectId, RowPattern, Rule,
    RuleFlags, RuleGroup,
};

use crate::error::{Diagnostics, ErrorKind};
use crate::legend_parser::LegendTable;
use crate::rule_parser::{AstCell, AstRow, AstTerm, Qualifier, RuleAst};

#[derive(Debug, Default)]
pub struct CompiledRules {
    pub early: Vec<RuleGroup>,
    pub late: Vec<RuleGroup>,
}

#[derive(Debug, Clone)]
struct ResolvedTerm {
    name: String,
    kind: LegendKind,
    negated: bool,
    random: bool,
    qualifier: Option<Qualifier>,
}

#[derive(Debug, Clone)]
enum ResolvedCell {
    Cell(Vec<ResolvedTerm>),
    Ellipsis,
}

type ResolvedRow = Vec<ResolvedCell>;

fn shape_error(diags: &mut Diagnostics, line: usize, msg: impl Into<String>) {
    diags.push(ErrorKind::RuleShape, line, msg);
}

fn check_shape(ast: &RuleAst, diags: &mut Diagnostics) -> bool {
    let mut ok = true;
    for row in &ast.lhs {
        let ellipses: Vec<usize> = row
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, AstCell::Ellipsis))
            .map(|(i, _)| i)
            .collect();
        if ellipses.len() > 1 {
            shape_error(diags, ast.line, "a row may contain at most one '...'");
            ok = false;
        }
        if ellipses.iter().any(|&i| i == 0 || i + 1 == row.len()) {
            shape_error(diags, ast.line, "'...' cannot start or end a row");
            ok = false;
        }
    }

    if ast.rhs.is_empty() {
        return ok;
    }
    if ast.lhs.len() != ast.rhs.len() {
        shape_error(
            diags,
            ast.line,
            format!(
                "left-hand side has {} rows but right-hand side has {}",
                ast.lhs.len(),
                ast.rhs.len()
            ),
        );
        return false;
    }
    for (i, (l, r)) in ast.lhs.iter().zip(&ast.rhs).enumerate() {
        if l.len() != r.len() {
            shape_error(
                diags,
                ast.line,
                format!("row {i} has {} cells on the left but {} on the right", l.len(), r.len()),
            );
            ok = false;
            continue;
        }
        let aligned = l
            .iter()
            .zip(r)
            .all(|(a, b)| matches!(a, AstCell::Ellipsis) == matches!(b, AstCell::Ellipsis));
        if !aligned {
            shape_error(diags, ast.line, format!("'...' positions differ between the sides of row {i}"));
            ok = false;
        }
    }
    ok
}

struct Resolution<'a> {
    legend: &'a LegendTable,
    line: usize,
    late: bool,
    ok: bool,
}

impl Resolution<'_> {
    fn term(&mut self, term: &AstTerm, right: bool, diags: &mut Diagnostics) -> Option<ResolvedTerm> {
        let Some(kind) = self.legend.lookup(&term.name).cloned() else {
            diags.undefined(self.line, &term.name);
            self.ok = false;
            return None;
        };

        let mut problems: Vec<(ErrorKind, String)> = Vec::new();
        match term.qualifier {
            Some(Qualifier::Perpendicular | Qualifier::Parallel) => problems.push((
                ErrorKind::Syntax,
                "'perpendicular' and 'parallel' are not supported".into(),
            )),
            Some(Qualifier::RandomDir) if !right => problems.push((
                ErrorKind::RuleShape,
                "'randomdir' is only allowed on the right-hand side".into(),
            )),
            Some(_) if self.late => problems.push((
                ErrorKind::RuleShape,
                format!("late rules cannot use movement ('{}')", term.name),
            )),
            _ => {}
        }
        if term.negated && kind.is_aggregate() {
            problems.push((
                ErrorKind::RuleShape,
                format!("'no' cannot be used with the aggregate '{}'", term.name),
            ));
        }
        if term.random && !right {
            problems.push((
                ErrorKind::RuleShape,
                "'random' objects are only allowed on the right-hand side".into(),
            ));
        } else if term.random && (term.negated || term.qualifier.is_some() || kind.is_aggregate()) {
            problems.push((
                ErrorKind::RuleShape,
                format!("'random {}' must name a plain object or property", term.name),
            ));
        }
        for (kind, msg) in problems {
            diags.push(kind, self.line, msg);
            self.ok = false;
        }

        Some(ResolvedTerm {
            name: term.name.clone(),
            kind,
            negated: term.negated,
            random: term.random,
            qualifier: term.qualifier,
        })
    }

    fn rows(&mut self, rows: &[AstRow], right: bool, diags: &mut Diagnostics) -> Vec<ResolvedRow> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = Vec::with_capacity(row.len());
            for cell in row {
                cells.push(match cell {
                    AstCell::Ellipsis => ResolvedCell::Ellipsis,
                    AstCell::Cell(terms) => {
                        let mut resolved = Vec::with_capacity(terms.len());
                        for t in terms {
                            resolved.extend(self.term(t, right, diags));
                        }
                        ResolvedCell::Cell(resolved)
                    }
                });
            }
            out.push(cells);
        }
        out
    }
}

/// Names of right-hand properties that need one rule per member, after
/// checking each appears in the matching left-hand cell.
fn properties_to_concretise(
    lhs: &[ResolvedRow],
    rhs: &[ResolvedRow],
    line: usize,
    diags: &mut Diagnostics,
) -> Option<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    let mut ok = true;
    for (lrow, rrow) in lhs.iter().zip(rhs) {
        for (lcell, rcell) in lrow.iter().zip(rrow) {
            let (ResolvedCell::Cell(lterms), ResolvedCell::Cell(rterms)) = (lcell, rcell) else {
                continue;
            };
            for term in rterms.iter().filter(|t| !t.negated && !t.random && t.kind.is_property()) {
                let on_left = lterms.iter().any(|l| !l.negated && l.name == term.name);
                if on_left {
                    names.insert(term.name.clone());
                } else {
                    shape_error(
                        diags,
                        line,
                        format!(
                            "'{}' on the right must also appear in the matching left-hand cell",
                            term.name
                        ),
                    );
                    ok = false;
                }
            }
        }
    }
    ok.then_some(names)
}

/// Every assignment of one member to each property name.
fn assignments(names: &BTreeSet<String>, legend: &LegendTable) -> Vec<BTreeMap<String, ObjectId>> {
    let mut out = vec![BTreeMap::new()];
    for name in names {
        let members: Vec<ObjectId> = legend
            .lookup(name)
            .map(|k| k.objects().iter().copied().collect())
            .unwrap_or_default();
        out = out
            .into_iter()
            .flat_map(|partial| {
                members.iter().map(move |id| {
                    let mut next = partial.clone();
                    next.insert(name.clone(), *id);
                    next
                })
            })
            .collect();
    }
    out
}

fn absolute(qualifier: Option<Qualifier>, dir: Direction) -> MoveQualifier {
    let Some(q) = qualifier else {
        return MoveQualifier::Unspecified;
    };
    match q {
        Qualifier::Up => MoveQualifier::Toward(Direction::Up),
        Qualifier::Down => MoveQualifier::Toward(Direction::Down),
        Qualifier::Left => MoveQualifier::Toward(Direction::Left),
        Qualifier::Right => MoveQualifier::Toward(Direction::Right),
        Qualifier::Forward => MoveQualifier::Toward(dir),
        Qualifier::Back => MoveQualifier::Toward(dir.opposite()),
        Qualifier::Ccw => MoveQualifier::Toward(dir.counter_clockwise()),
        Qualifier::Cw => MoveQualifier::Toward(dir.clockwise()),
        Qualifier::Moving => MoveQualifier::Moving,
        Qualifier::Stationary => MoveQualifier::Stationary,
        Qualifier::Action => MoveQualifier::Action,
        Qualifier::RandomDir => MoveQualifier::RandomDir,
        // Rejected during resolution.
        Qualifier::Perpendicular | Qualifier::Parallel => MoveQualifier::Moving,
    }
}

fn lower_term(term: &ResolvedTerm, binding: &BTreeMap<String, ObjectId>, dir: Direction) -> Vec<CellTerm> {
    let movement = absolute(term.qualifier, dir);
    let bound = if term.random {
        None
    } else {
        binding.get(&term.name).copied()
    };
    if let Some(id) = bound {
        return vec![CellTerm {
            negated: term.negated,
            ..CellTerm::present(BTreeSet::from([id]), movement)
        }];
    }
    match &term.kind {
        LegendKind::ExactSet(ids) if !term.negated => ids
            .iter()
            .map(|id| CellTerm::present(BTreeSet::from([*id]), movement))
            .collect(),
        kind => vec![CellTerm {
            objects: kind.objects().clone(),
            negated: term.negated,
            movement,
            random_spawn: term.random,
        }],
    }
}

fn lower_rows(rows: &[ResolvedRow], binding: &BTreeMap<String, ObjectId>, dir: Direction) -> Vec<RowPattern> {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    ResolvedCell::Ellipsis => CellPattern::Ellipsis,
                    ResolvedCell::Cell(terms) => {
                        CellPattern::Cell(terms.iter().flat_map(|t| lower_term(t, binding, dir)).collect())
                    }
                })
                .collect()
        })
        .collect()
}

fn is_single_cell(rows: &[RowPattern]) -> bool {
    rows.iter().all(|r| r.len() == 1)
}

/// Lower one parsed rule to its direction-expanded variants, or `None` when
/// it has errors.
fn compile_rule(ast: &RuleAst, legend: &LegendTable, diags: &mut Diagnostics) -> Option<Vec<Rule>> {
    if !check_shape(ast, diags) {
        return None;
    }
    let mut resolution = Resolution {
        legend,
        line: ast.line,
        late: ast.flags.contains(RuleFlags::LATE),
        ok: true,
    };
    let lhs = resolution.rows(&ast.lhs, false, diags);
    let rhs = resolution.rows(&ast.rhs, true, diags);
    if !resolution.ok {
        return None;
    }
    let names = properties_to_concretise(&lhs, &rhs, ast.line, diags)?;

    let directions = ast.directions.unwrap_or(DirectionMask::ORTHOGONAL);
    let mut rules: Vec<Rule> = Vec::new();
    for binding in assignments(&names, legend) {
        let first_of_binding = rules.len();
        for dir in directions.directions() {
            let rule = Rule {
                line: ast.line,
                direction: dir,
                flags: ast.flags,
                lhs: lower_rows(&lhs, &binding, dir),
                rhs: lower_rows(&rhs, &binding, dir),
                commands: ast.commands.clone(),
            };
            let duplicate = is_single_cell(&rule.lhs)
                && rules[first_of_binding..]
                    .iter()
                    .any(|r| r.lhs == rule.lhs && r.rhs == rule.rhs);
            if !duplicate {
                rules.push(rule);
            }
        }
    }
    log::trace!("line {}: {} compiled rules", ast.line, rules.len());
    Some(rules)
}

/// Compile every parsed rule, joining `+` rules into their predecessor's
/// group and splitting early from late groups.
pub fn compile_rules(asts: &[RuleAst], legend: &LegendTable, diags: &mut Diagnostics) -> CompiledRules {
    let mut groups: Vec<RuleGroup> = Vec::new();
    let mut current_open = false;

    for ast in asts {
        let compiled = compile_rule(ast, legend, diags);

        if ast.joined && current_open {
            let Some(group) = groups.last_mut() else {
                continue;
            };
            if group.is_late() != ast.flags.contains(RuleFlags::LATE) {
                shape_error(
                    diags,
                    ast.line,
                    format!("'+' joins a rule to the group at line {} but only one of them is late", group.line),
                );
                continue;
            }
            if let Some(rules) = compiled {
                group.flags |= ast.flags & RuleFlags::RANDOM;
                group.rules.extend(rules);
            }
            continue;
        }
        if ast.joined && groups.is_empty() && compiled.is_some() {
            diags.syntax(ast.line, "'+' with no earlier rule to join");
        }

        match compiled {
            Some(rules) => {
                groups.push(RuleGroup {
                    line: ast.line,
                    flags: ast.flags & (RuleFlags::LATE | RuleFlags::RANDOM),
                    rules,
                });
                current_open = true;
            }
            None => current_open = false,
        }
    }

    let (late, early): (Vec<_>, Vec<_>) = groups.into_iter().partition(RuleGroup::is_late);
    log::debug!("compiled {} rule groups, {} late", early.len(), late.len());
    CompiledRules { early, late }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_parser::parse_rule;
    use crate::script_lexer::Located;
    use puzzlang_types::RuleCommand;

    const BACKGROUND: u16 = 0;
    const PLAYER: u16 = 1;
    const CRATE: u16 = 2;
    const RED: u16 = 3;
    const GREEN: u16 = 4;
    const WALL: u16 = 5;

    fn legend() -> LegendTable {
        let mut table = LegendTable::default();
        for (name, id) in [
            ("background", BACKGROUND),
            ("player", PLAYER),
            ("crate", CRATE),
            ("red", RED),
            ("green", GREEN),
            ("wall", WALL),
        ] {
            table
                .names
                .insert(name.into(), LegendKind::ExactSet(BTreeSet::from([ObjectId(id)])));
        }
        table.names.insert(
            "colour".into(),
            LegendKind::AnyOf(BTreeSet::from([ObjectId(RED), ObjectId(GREEN)])),
        );
        table.names.insert(
            "stack".into(),
            LegendKind::ExactSet(BTreeSet::from([ObjectId(CRATE), ObjectId(WALL)])),
        );
        table
    }

    fn compile(lines: &[&str]) -> (CompiledRules, Diagnostics) {
        let mut diags = Diagnostics::default();
        let asts: Vec<RuleAst> = lines
            .iter()
            .enumerate()
            .map(|(i, s)| {
                parse_rule(&Located {
                    value: (*s).to_string(),
                    line: i + 1,
                })
                .expect("rule parses")
            })
            .collect();
        let rules = compile_rules(&asts, &legend(), &mut diags);
        (rules, diags)
    }

    fn one(id: u16) -> BTreeSet<ObjectId> {
        BTreeSet::from([ObjectId(id)])
    }

    #[test]
    fn push_rule_expands_to_four_directions() {
        let (rules, diags) = compile(&["[ > Player | Crate ] -> [ > Player | > Crate ]"]);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(rules.early.len(), 1);
        let group = &rules.early[0];
        assert_eq!(group.rules.len(), 4);
        for rule in &group.rules {
            let lhs = rule.lhs[0][0].terms();
            assert_eq!(lhs[0].movement, MoveQualifier::Toward(rule.direction));
            assert_eq!(lhs[0].objects, one(PLAYER));
            assert_eq!(rule.rhs[0][1].terms()[0].movement, MoveQualifier::Toward(rule.direction));
        }
    }

    #[test]
    fn relative_qualifiers_rotate() {
        let (rules, diags) = compile(&["right [ ^ Player | v Crate | < Wall ] -> [ Player | Crate | Wall ]"]);
        assert!(diags.is_empty(), "{diags:?}");
        let rule = &rules.early[0].rules[0];
        assert_eq!(rule.direction, Direction::Right);
        let row = &rule.lhs[0];
        assert_eq!(row[0].terms()[0].movement, MoveQualifier::Toward(Direction::Up));
        assert_eq!(row[1].terms()[0].movement, MoveQualifier::Toward(Direction::Down));
        assert_eq!(row[2].terms()[0].movement, MoveQualifier::Toward(Direction::Left));
    }

    #[test]
    fn single_cell_rules_are_deduplicated() {
        let (rules, diags) = compile(&["[ Crate Wall ] -> [ Wall ]", "[ > Player ] -> [ Player ]"]);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(rules.early[0].rules.len(), 1);
        assert_eq!(rules.early[1].rules.len(), 4, "relative movement differs per direction");
    }

    #[test]
    fn properties_are_concretised() {
        let (rules, diags) = compile(&["right [ > Player | Colour ] -> [ > Player | > Colour ]"]);
        assert!(diags.is_empty(), "{diags:?}");
        let group = &rules.early[0];
        assert_eq!(group.rules.len(), 2);
        let members: Vec<_> = group.rules.iter().map(|r| r.lhs[0][1].terms()[0].objects.clone()).collect();
        assert_eq!(members, vec![one(RED), one(GREEN)]);
        for rule in &group.rules {
            assert_eq!(rule.lhs[0][1].terms()[0].objects, rule.rhs[0][1].terms()[0].objects);
        }
    }

    #[test]
    fn left_only_property_matches_any_member() {
        let (rules, diags) = compile(&["right [ Player | Colour ] -> [ Player | ]"]);
        assert!(diags.is_empty(), "{diags:?}");
        let rule = &rules.early[0].rules[0];
        assert_eq!(rule.lhs[0][1].terms()[0].objects.len(), 2);
        assert!(rule.rhs[0][1].terms().is_empty());
    }

    #[test]
    fn aggregates_expand_to_members() {
        let (rules, diags) = compile(&["[ Player ] -> [ Player Stack ]"]);
        assert!(diags.is_empty(), "{diags:?}");
        let rhs = rules.early[0].rules[0].rhs[0][0].terms();
        assert_eq!(rhs.len(), 3);
    }

    #[test]
    fn groups_and_late_split() {
        let (rules, diags) = compile(&[
            "[ Player ] -> [ Player ]",
            "+ [ Crate ] -> [ Crate ]",
            "late [ Player Crate ] -> [ Player ] sfx1",
            "random [ Crate ] -> [ Wall ]",
        ]);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(rules.early.len(), 2);
        assert_eq!(rules.early[0].rules.len(), 2);
        assert!(rules.early[1].is_random());
        assert_eq!(rules.late.len(), 1);
        assert_eq!(rules.late[0].rules[0].commands, vec![RuleCommand::Sfx(1)]);
    }

    #[test]
    fn shape_errors() {
        let cases = [
            "[ Player | Crate ] -> [ Player ]",
            "[ Player ] [ Crate ] -> [ Player ]",
            "[ Player | ... | Crate ] -> [ Player | Crate | ... ]",
            "[ ... | Crate ] -> [ ... | Crate ]",
            "[ Player ] -> [ Player Colour ]",
            "[ no Stack ] -> [ Player ]",
            "late [ > Player ] -> [ Player ]",
            "[ randomdir Player ] -> [ Player ]",
            "[ random Crate ] -> [ Crate ]",
        ];
        for case in cases {
            let (rules, diags) = compile(&[case]);
            let err = diags.into_error("t");
            assert!(err.has_kind(ErrorKind::RuleShape), "{case}: {:?}", err.errors);
            assert!(rules.early.is_empty() && rules.late.is_empty(), "{case}");
        }
    }

    #[test]
    fn undefined_and_unsupported() {
        let (_, diags) = compile(&["[ Ghost ] -> [ ]", "[ perpendicular Player ] -> [ Player ]"]);
        let err = diags.into_error("t");
        assert!(err.has_kind(ErrorKind::UndefinedReference));
        assert!(err.has_kind(ErrorKind::Syntax));
    }

    #[test]
    fn late_mismatch_in_group() {
        let (rules, diags) = compile(&["[ Player ] -> [ Player ]", "+ late [ Crate ] -> [ Crate ]"]);
        assert_eq!(diags.len(), 1);
        assert_eq!(rules.early[0].rules.len(), 1);
    }

    #[test]
    fn commands_only_rule_has_no_rhs() {
        let (rules, diags) = compile(&["[ Player Crate ] -> win"]);
        assert!(diags.is_empty(), "{diags:?}");
        let rule = &rules.early[0].rules[0];
        assert!(rule.rhs.is_empty());
        assert_eq!(rule.commands, vec![RuleCommand::Win]);
    }
}
