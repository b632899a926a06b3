//! Declarative row predicates compiled to parameterised SQL.
//!
//! Field names and comparison operators come from closed enums; every
//! externally supplied number travels as a bound parameter.

use rusqlite::types::Value;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `=`
    Eq,
    /// `<>`
    Ne,
}

impl Comparator {
    fn as_sql(self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Eq => "=",
            Comparator::Ne => "<>",
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    /// Absolute integer threshold.
    Int(i64),
    /// Threshold proportional to the row's length (`value * length`).
    PerBase(f64),
}

/// A column (or derived expression) a predicate may test.
pub trait Field: Copy {
    /// SQL expression for the field; pushes any parameters it binds.
    fn expr(&self, params: &mut Vec<Value>) -> String;

    /// SQL expression for the row's length, used by [`Operand::PerBase`].
    fn length_expr() -> &'static str;

    /// `field < value`
    fn lt(self, value: i64) -> Predicate<Self> {
        Predicate::compare(self, Comparator::Lt, Operand::Int(value))
    }

    /// `field > value`
    fn gt(self, value: i64) -> Predicate<Self> {
        Predicate::compare(self, Comparator::Gt, Operand::Int(value))
    }
}

/// Testable fields of the `loci` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocusField {
    /// Locus identifier.
    Id,
    /// Alignment depth.
    Depth,
    /// Consensus length.
    Length,
}

impl Field for LocusField {
    fn expr(&self, _params: &mut Vec<Value>) -> String {
        match self {
            LocusField::Id => "id",
            LocusField::Depth => "depth",
            LocusField::Length => "length",
        }
        .to_string()
    }

    fn length_expr() -> &'static str {
        "length"
    }
}

/// Testable fields of the `regions` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionField {
    /// Region identifier.
    Id,
    /// Source locus.
    LocusId,
    /// Start offset.
    Start,
    /// Stop offset.
    Stop,
    /// `stop - start`.
    Length,
    /// Gap symbols.
    GapCount,
    /// Missing-data symbols.
    BadCount,
    /// Variable sites inside the region.
    VariantCount,
    /// Variants of the region's locus within `flank` bases of the region.
    FlankedVariants(u32),
}

impl Field for RegionField {
    fn expr(&self, params: &mut Vec<Value>) -> String {
        match self {
            RegionField::Id => "regions.id".to_string(),
            RegionField::LocusId => "regions.locus_id".to_string(),
            RegionField::Start => "regions.start".to_string(),
            RegionField::Stop => "regions.stop".to_string(),
            RegionField::Length => Self::length_expr().to_string(),
            RegionField::GapCount => "regions.gap_count".to_string(),
            RegionField::BadCount => "regions.bad_count".to_string(),
            RegionField::VariantCount => "regions.variant_count".to_string(),
            RegionField::FlankedVariants(flank) => {
                params.push(Value::Integer(i64::from(*flank)));
                params.push(Value::Integer(i64::from(*flank)));
                "(SELECT COUNT(*) FROM variants v \
                 WHERE v.locus_id = regions.locus_id \
                 AND v.position >= regions.start - ? \
                 AND v.position < regions.stop + ?)"
                    .to_string()
            }
        }
    }

    fn length_expr() -> &'static str {
        "(regions.stop - regions.start)"
    }
}

/// Boolean predicate over the rows of one table.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<F> {
    /// `field <cmp> operand`
    Compare {
        /// Tested field.
        field: F,
        /// Operator.
        cmp: Comparator,
        /// Threshold.
        value: Operand,
    },
    /// Both hold.
    And(Box<Predicate<F>>, Box<Predicate<F>>),
    /// Either holds.
    Or(Box<Predicate<F>>, Box<Predicate<F>>),
    /// Negation.
    Not(Box<Predicate<F>>),
}

impl<F: Field> Predicate<F> {
    /// Single comparison.
    pub fn compare(field: F, cmp: Comparator, value: Operand) -> Self {
        Predicate::Compare { field, cmp, value }
    }

    /// Conjunction.
    pub fn and(self, other: Self) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    /// Disjunction.
    pub fn or(self, other: Self) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    /// Negation.
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Render as a SQL boolean expression, appending bound values to `params`
    /// in placeholder order.
    pub fn compile(&self, params: &mut Vec<Value>) -> String {
        match self {
            Predicate::Compare { field, cmp, value } => {
                let lhs = field.expr(params);
                let rhs = match value {
                    Operand::Int(v) => {
                        params.push(Value::Integer(*v));
                        "?".to_string()
                    }
                    Operand::PerBase(v) => {
                        params.push(Value::Real(*v));
                        format!("(? * {})", F::length_expr())
                    }
                };
                format!("({lhs} {} {rhs})", cmp.as_sql())
            }
            Predicate::And(a, b) => {
                let a = a.compile(params);
                let b = b.compile(params);
                format!("({a} AND {b})")
            }
            Predicate::Or(a, b) => {
                let a = a.compile(params);
                let b = b.compile(params);
                format!("({a} OR {b})")
            }
            Predicate::Not(a) => format!("(NOT {})", a.compile(params)),
        }
    }
}
