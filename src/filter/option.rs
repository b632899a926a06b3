use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};
use thiserror::Error;

use crate::store::{Comparator, Field, Operand, Predicate, RegionField};

/// Errors raised while parsing filter or selection codes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterParseError {
    /// The option code is not one of `g`, `n`, `m`, `M`, `r`.
    #[error("unknown filter code '{0}'")]
    UnknownCode(String),

    /// The code is known but its arguments are not.
    #[error("invalid arguments for filter '{code}': {reason}")]
    InvalidArguments {
        /// Filter code.
        code: String,
        /// What was wrong.
        reason: String,
    },

    /// Unknown single-region selection rule.
    #[error("unknown region selection rule '{0}'")]
    UnknownRule(String),
}

/// Variant-count threshold, absolute or relative to region length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariantLimit {
    /// Absolute number of variants.
    Count(u32),
    /// Variants per base of region length.
    PerBase(f64),
}

impl VariantLimit {
    fn operand(self) -> Operand {
        match self {
            VariantLimit::Count(n) => Operand::Int(i64::from(n)),
            VariantLimit::PerBase(rate) => Operand::PerBase(rate),
        }
    }
}

/// One region filter, selected by value from its short code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOption {
    /// `g=<n>`: exclude regions with more than `n` gaps.
    MaxGaps(u32),
    /// `n=<n>`: exclude regions with more than `n` missing bases.
    MaxBad(u32),
    /// `m=<limit>[,<flank>]`: exclude regions with fewer variants.
    MinVariants {
        /// Lower bound.
        limit: VariantLimit,
        /// Bases on either side of the region also counted.
        flank: u32,
    },
    /// `M=<limit>[,<flank>]`: exclude regions with more variants.
    MaxVariants {
        /// Upper bound.
        limit: VariantLimit,
        /// Bases on either side of the region also counted.
        flank: u32,
    },
    /// `r=<k>`: keep `k` surviving regions at random.
    Downsample(usize),
}

impl FilterOption {
    /// Position of the filter in the fixed pipeline order.
    pub fn stage(&self) -> usize {
        match self {
            FilterOption::MaxGaps(_) => 0,
            FilterOption::MaxBad(_) => 1,
            FilterOption::MinVariants { .. } => 2,
            FilterOption::MaxVariants { .. } => 3,
            FilterOption::Downsample(_) => 4,
        }
    }

    /// Short code of the filter.
    pub fn code(&self) -> char {
        match self {
            FilterOption::MaxGaps(_) => 'g',
            FilterOption::MaxBad(_) => 'n',
            FilterOption::MinVariants { .. } => 'm',
            FilterOption::MaxVariants { .. } => 'M',
            FilterOption::Downsample(_) => 'r',
        }
    }

    /// What running the filter does to the candidate regions.
    pub fn action(&self) -> FilterAction {
        let variants_field = |flank: u32| {
            if flank == 0 {
                RegionField::VariantCount
            } else {
                RegionField::FlankedVariants(flank)
            }
        };
        match *self {
            FilterOption::MaxGaps(max) => {
                FilterAction::Exclude(RegionField::GapCount.gt(i64::from(max)))
            }
            FilterOption::MaxBad(max) => {
                FilterAction::Exclude(RegionField::BadCount.gt(i64::from(max)))
            }
            FilterOption::MinVariants { limit, flank } => FilterAction::Exclude(
                Predicate::compare(variants_field(flank), Comparator::Lt, limit.operand()),
            ),
            FilterOption::MaxVariants { limit, flank } => FilterAction::Exclude(
                Predicate::compare(variants_field(flank), Comparator::Gt, limit.operand()),
            ),
            FilterOption::Downsample(keep) => FilterAction::Downsample(keep),
        }
    }
}

/// Effect of one [`FilterOption`] on the store.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterAction {
    /// Exclude every candidate region matching the predicate.
    Exclude(Predicate<RegionField>),
    /// Keep this many candidate regions chosen at random.
    Downsample(usize),
}

fn invalid(code: &str, reason: impl Into<String>) -> FilterParseError {
    FilterParseError::InvalidArguments {
        code: code.to_string(),
        reason: reason.into(),
    }
}

fn parse_count<T: FromStr>(code: &str, text: &str) -> Result<T, FilterParseError> {
    text.trim()
        .parse()
        .map_err(|_| invalid(code, format!("'{text}' is not a non-negative integer")))
}

fn parse_variant_args(code: &str, args: &str) -> Result<(VariantLimit, u32), FilterParseError> {
    let mut parts = args.split(',');
    let limit_text = parts.next().unwrap_or("").trim();
    let limit = if limit_text.contains('.') {
        let rate: f64 = limit_text
            .parse()
            .map_err(|_| invalid(code, format!("'{limit_text}' is not a number")))?;
        if !(rate.is_finite() && rate >= 0.0) {
            return Err(invalid(code, "per-base limit must be a non-negative number"));
        }
        VariantLimit::PerBase(rate)
    } else {
        VariantLimit::Count(parse_count(code, limit_text)?)
    };
    let flank = match parts.next() {
        Some(text) => parse_count(code, text)?,
        None => 0,
    };
    if parts.next().is_some() {
        return Err(invalid(code, "expected at most two values"));
    }
    Ok((limit, flank))
}

impl FromStr for FilterOption {
    type Err = FilterParseError;

    /// Parse `code=args`, e.g. `g=2`, `m=1,50`, `M=0.02`, `r=100`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (code, args) = s
            .split_once('=')
            .ok_or_else(|| FilterParseError::UnknownCode(s.to_string()))?;
        match code.trim() {
            "g" => Ok(FilterOption::MaxGaps(parse_count(code, args)?)),
            "n" => Ok(FilterOption::MaxBad(parse_count(code, args)?)),
            "m" => {
                let (limit, flank) = parse_variant_args(code, args)?;
                Ok(FilterOption::MinVariants { limit, flank })
            }
            "M" => {
                let (limit, flank) = parse_variant_args(code, args)?;
                Ok(FilterOption::MaxVariants { limit, flank })
            }
            "r" => {
                let keep: usize = parse_count(code, args)?;
                if keep == 0 {
                    return Err(invalid(code, "random retain count must be > 0"));
                }
                Ok(FilterOption::Downsample(keep))
            }
            other => Err(FilterParseError::UnknownCode(other.to_string())),
        }
    }
}

impl fmt::Display for VariantLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantLimit::Count(n) => write!(f, "{n}"),
            VariantLimit::PerBase(rate) => write!(f, "{rate:?}"),
        }
    }
}

impl fmt::Display for FilterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOption::MaxGaps(n) => write!(f, "g={n}"),
            FilterOption::MaxBad(n) => write!(f, "n={n}"),
            FilterOption::MinVariants { limit, flank } => write!(f, "m={limit},{flank}"),
            FilterOption::MaxVariants { limit, flank } => write!(f, "M={limit},{flank}"),
            FilterOption::Downsample(k) => write!(f, "r={k}"),
        }
    }
}

impl<'de> Deserialize<'de> for FilterOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Rule choosing the one region kept on a locus when multiple regions are
/// not allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectRule {
    /// Lowest start position.
    #[default]
    First,
    /// Most variable sites.
    MostVariants,
    /// Fewest variable sites.
    FewestVariants,
    /// Fewest missing bases.
    FewestBad,
    /// Uniformly at random.
    Random,
}

impl FromStr for SelectRule {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(SelectRule::First),
            "most-variants" => Ok(SelectRule::MostVariants),
            "fewest-variants" => Ok(SelectRule::FewestVariants),
            "fewest-bad" => Ok(SelectRule::FewestBad),
            "random" => Ok(SelectRule::Random),
            other => Err(FilterParseError::UnknownRule(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for SelectRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
