// Moderation: data models, hit aggregation and the engine that ties the
// normalizer, rule matcher and semantic detector together.

pub mod aggregate;
pub mod engine;
pub mod models;

pub use aggregate::aggregate;
pub use engine::{Moderator, ModeratorBuilder, DEFAULT_SEMANTIC_TIMEOUT};
pub use models::{Hit, HitSource, ModerateOptions, ModerationRequest, ModerationResult};
