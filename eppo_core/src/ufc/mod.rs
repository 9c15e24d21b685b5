mod assignment;
mod eval;
pub mod eval_details;
mod models;
mod rules;

pub use assignment::{Assignment, AssignmentValue, AssignmentWithDetails};
pub use eval::FlagEvalResult;
pub use models::{
    Allocation, BanditVariation, Condition, ConditionOperator, ConditionValue, Flag, Rule, Shard,
    ShardRange, Split, TryParse, UniversalFlagConfig, Value, Variation, VariationType,
};
