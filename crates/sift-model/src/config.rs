//! Pipeline configuration model.
//!
//! A [`PipelineConfig`] is the declarative description of one cleaning run:
//! which columns to coerce and how, which filtered and selected views to
//! report, which aggregations to compute, how to treat missing values, and
//! which derived, normalized, and joined columns to add.
//!
//! Configs are authored as JSON. Every section is optional; an empty config
//! is a valid pipeline that just loads and re-emits the table.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Per-column coercion rule.
///
/// Coercion is cell-level and never fails the run: a token that cannot be
/// converted becomes a missing cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Coercion {
    /// Parse each cell as a number; unparseable or non-finite tokens become
    /// missing.
    NumericParse,
    /// Replace exact tokens via the map (token comparison is
    /// case-sensitive), then parse the remainder numerically.
    Remap {
        map: BTreeMap<String, f64>,
    },
    /// Leave the column untouched.
    Passthrough,
}

impl Coercion {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NumericParse => "numeric",
            Self::Remap { .. } => "remap",
            Self::Passthrough => "passthrough",
        }
    }
}

/// A coercion applied to one named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoercionSpec {
    pub column: String,
    #[serde(flatten)]
    pub rule: Coercion,
}

impl CoercionSpec {
    pub fn new(column: impl Into<String>, rule: Coercion) -> Self {
        Self {
            column: column.into(),
            rule,
        }
    }
}

/// Comparison operator for row filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// A comparison value: a JSON number compares numerically, a JSON string
/// compares on the cell's text form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    Text(String),
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One column comparison. Rows whose cell is missing fail the comparison,
/// whatever the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column: String,
    pub op: CmpOp,
    pub value: Literal,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: CmpOp, value: impl Into<Literal>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }
}

/// A reported row view: the conjunction of its conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub label: Option<String>,
    pub conditions: Vec<Condition>,
}

impl FilterSpec {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self {
            label: None,
            conditions,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label for summaries and reports; falls back to a positional name.
    pub fn display_label(&self, index: usize) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("filter-{}", index + 1))
    }
}

/// A reported positional view: rows `start..end` projected to `columns`.
///
/// The row range is half-open and clamps to the table height, so a range
/// past the end yields an empty view rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectSpec {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub start: usize,
    pub end: usize,
    pub columns: Vec<String>,
}

impl SelectSpec {
    pub fn display_label(&self, index: usize) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("select-{}", index + 1))
    }
}

/// Reduction applied to each group's target cells. Missing targets are
/// ignored by every reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Arithmetic mean; a group with no present targets reduces to an
    /// undefined value, not zero.
    Mean,
    /// Number of distinct present target values.
    CountDistinct,
    /// Number of present target cells.
    Frequency,
}

impl Reduction {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::CountDistinct => "count_distinct",
            Self::Frequency => "frequency",
        }
    }
}

/// One grouped aggregation over the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    #[serde(default)]
    pub label: Option<String>,
    pub group_by: String,
    pub target: String,
    pub reduction: Reduction,
}

impl AggregationSpec {
    pub fn new(
        group_by: impl Into<String>,
        target: impl Into<String>,
        reduction: Reduction,
    ) -> Self {
        Self {
            label: None,
            group_by: group_by.into(),
            target: target.into(),
            reduction,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| {
            format!(
                "{}({}) by {}",
                self.reduction.display_name(),
                self.target,
                self.group_by
            )
        })
    }
}

/// Missing-value policy. Policies run in config order, each against the
/// table state the previous one produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Keep missing cells as they are.
    Leave,
    /// Replace missing cells with the column mean. An empty column list
    /// means every numeric column; an all-missing column is left alone.
    FillMean {
        #[serde(default)]
        columns: Vec<String>,
    },
    /// Drop rows whose fraction of present cells falls below the
    /// threshold. Rows at exactly the threshold are kept.
    DropSparseRows {
        min_present_fraction: f64,
    },
    /// Drop rows missing a value in any of the named columns.
    DropMissingIn {
        columns: Vec<String>,
    },
}

impl MissingPolicy {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Leave => "leave",
            Self::FillMean { .. } => "fill_mean",
            Self::DropSparseRows { .. } => "drop_sparse_rows",
            Self::DropMissingIn { .. } => "drop_missing_in",
        }
    }
}

/// Arithmetic operator for derived columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

/// A derive operand: a JSON string names a column, a JSON number is a
/// constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Number(f64),
    Column(String),
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Self::Column(value.to_string())
    }
}

/// A new column computed row-wise from two operands. A missing operand
/// yields a missing result; so does division by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeriveSpec {
    pub name: String,
    pub left: Operand,
    pub op: ArithOp,
    pub right: Operand,
}

impl DeriveSpec {
    pub fn new(
        name: impl Into<String>,
        left: impl Into<Operand>,
        op: ArithOp,
        right: impl Into<Operand>,
    ) -> Self {
        Self {
            name: name.into(),
            left: left.into(),
            op,
            right: right.into(),
        }
    }
}

/// Min-max normalization of one numeric column into `<column>_norm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeSpec {
    pub column: String,
}

impl NormalizeSpec {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    /// Name of the column the normalization adds.
    pub fn output_name(&self) -> String {
        format!("{}_norm", self.column)
    }
}

/// A key-based column attachment. With no `source`, the table joins
/// itself; with one, the named file is loaded as the right-hand side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub key: String,
    pub extra_columns: Vec<String>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub source: Option<PathBuf>,
}

impl JoinSpec {
    pub fn self_join(key: impl Into<String>, extra_columns: Vec<String>) -> Self {
        Self {
            key: key.into(),
            extra_columns,
            strict: false,
            source: None,
        }
    }
}

/// Descriptive-statistics request. An empty column list means every
/// numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSpec {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub correlations: bool,
}

/// The full declarative pipeline. Sections run in the fixed order
/// coerce, filters, selections, aggregations, missing policies, derives,
/// normalize, joins, stats; within a section, entries run in config order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub coercions: Vec<CoercionSpec>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(default)]
    pub selections: Vec<SelectSpec>,
    #[serde(default)]
    pub aggregations: Vec<AggregationSpec>,
    #[serde(default)]
    pub missing: Vec<MissingPolicy>,
    #[serde(default)]
    pub derives: Vec<DeriveSpec>,
    #[serde(default)]
    pub normalize: Vec<NormalizeSpec>,
    #[serde(default)]
    pub joins: Vec<JoinSpec>,
    #[serde(default)]
    pub stats: Option<StatsSpec>,
}

impl PipelineConfig {
    pub fn is_empty(&self) -> bool {
        self.step_count() == 0
    }

    /// Total number of configured steps across all sections.
    pub fn step_count(&self) -> usize {
        self.coercions.len()
            + self.filters.len()
            + self.selections.len()
            + self.aggregations.len()
            + self.missing.len()
            + self.derives.len()
            + self.normalize.len()
            + self.joins.len()
            + usize::from(self.stats.is_some())
    }
}
