//! Boolean filter expressions over note metadata.
//!
//! A [`FilterExpr`] is backend-neutral. The Qdrant translation lives next to the Qdrant client in
//! `trunq-storage`; [`FilterExpr::matches`] evaluates an expression in process.

use crate::Intent;

/// Metadata key holding a note's intent category.
pub const INTENT_KEY: &str = "intent";
/// Metadata key holding a note's scheduled time as integer epoch seconds.
pub const SCHEDULED_FOR_KEY: &str = "scheduled_for";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
	Gt,
	Gte,
	Lt,
	Lte,
	Eq,
}
impl NumericOp {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Gt => ">",
			Self::Gte => ">=",
			Self::Lt => "<",
			Self::Lte => "<=",
			Self::Eq => "=",
		}
	}

	pub fn holds(self, left: i64, right: i64) -> bool {
		match self {
			Self::Gt => left > right,
			Self::Gte => left >= right,
			Self::Lt => left < right,
			Self::Lte => left <= right,
			Self::Eq => left == right,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataCondition {
	pub key: String,
	pub value: String,
	pub negate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericCondition {
	pub key: String,
	pub op: NumericOp,
	pub value: i64,
	pub negate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
	And(Vec<FilterExpr>),
	Or(Vec<FilterExpr>),
	Metadata(MetadataCondition),
	Numeric(NumericCondition),
}
impl FilterExpr {
	pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self::Metadata(MetadataCondition { key: key.into(), value: value.into(), negate: false })
	}

	pub fn numeric(key: impl Into<String>, op: NumericOp, value: i64) -> Self {
		Self::Numeric(NumericCondition { key: key.into(), op, value, negate: false })
	}

	/// Flips the `negate` flag on a leaf condition. Composite nodes are returned unchanged; only
	/// leaves carry negation.
	pub fn negated(self) -> Self {
		match self {
			Self::Metadata(mut cond) => {
				cond.negate = !cond.negate;

				Self::Metadata(cond)
			},
			Self::Numeric(mut cond) => {
				cond.negate = !cond.negate;

				Self::Numeric(cond)
			},
			composite => composite,
		}
	}

	/// Evaluates the expression against a metadata lookup. Missing keys never satisfy a
	/// non-negated condition.
	pub fn matches(&self, lookup: &dyn MetadataLookup) -> bool {
		match self {
			Self::And(operands) => operands.iter().all(|operand| operand.matches(lookup)),
			Self::Or(operands) => operands.iter().any(|operand| operand.matches(lookup)),
			Self::Metadata(cond) => {
				let hit = lookup.text(&cond.key).is_some_and(|value| value == cond.value);

				hit != cond.negate
			},
			Self::Numeric(cond) => {
				let hit =
					lookup.integer(&cond.key).is_some_and(|value| cond.op.holds(value, cond.value));

				hit != cond.negate
			},
		}
	}
}

/// Read access to a record's metadata bag for in-process filter evaluation.
pub trait MetadataLookup {
	fn text(&self, key: &str) -> Option<&str>;

	fn integer(&self, key: &str) -> Option<i64>;
}

/// Category membership condition for the structured store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentMembership {
	pub intents: Vec<Intent>,
}
impl IntentMembership {
	pub fn as_strings(&self) -> Vec<String> {
		self.intents.iter().map(|intent| intent.as_str().to_string()).collect()
	}
}
