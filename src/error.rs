use puzzlang_types::ObjectId;

/// Errors raised while driving a [`GameModel`](crate::GameModel).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("level {0} does not exist")]
    LevelNotFound(usize),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("unknown object '{0}'")]
    UnknownObject(String),
    #[error("unknown object id {0}")]
    UnknownObjectId(ObjectId),
    #[error("rules starting at line {line} did not settle after {iterations} iterations")]
    RuleNontermination { line: usize, iterations: usize },
    #[error("no level is loaded")]
    NoLevelLoaded,
}
