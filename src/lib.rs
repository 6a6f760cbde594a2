// Bleep: obfuscation-resistant profanity detection and censoring
//
// This is the library root. Each module corresponds to one stage of the
// moderation pipeline or one of its collaborators.

pub mod audit;
pub mod censor;
pub mod config;
pub mod moderation;
pub mod normalize;
pub mod output;
pub mod rules;
pub mod semantic;
pub mod words;

pub use censor::{censor, censor_result};
pub use moderation::{Hit, HitSource, ModerateOptions, ModerationResult, Moderator};
pub use normalize::normalize;
