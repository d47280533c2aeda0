pub mod config;
pub mod error;
pub mod lookup;

pub use config::{
    AggregationSpec, ArithOp, CmpOp, Coercion, CoercionSpec, Condition, DeriveSpec, FilterSpec,
    JoinSpec, Literal, MissingPolicy, NormalizeSpec, Operand, PipelineConfig, Reduction,
    SelectSpec, StatsSpec,
};
pub use error::{Result, SiftError};
pub use lookup::CaseInsensitiveSet;
