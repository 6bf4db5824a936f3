mod level;
mod types;

pub use level::{load_level, parse_level, LevelErrorCode, LevelLoadError, SourceLocation};
pub use types::{ActorDef, ActorRole, AiState, LevelAssets, LevelDef, MapDef};
