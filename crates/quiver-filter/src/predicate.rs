//! Filter builder and compiled predicate.
//!
//! A [`Filter`] collects raw `attribute__op` specs with their operands.
//! [`Filter::compile`] parses every spec up front into a [`Predicate`], the
//! logical AND of one [`Clause`] per spec. OR across specs is expressed by
//! combining two filtered results, not inside one filter.

use crate::clause::{Clause, Operand};
use crate::error::Result;
use crate::traits::Record;
use crate::value::Value;

/// Uncompiled filter: an ordered list of `(spec, operand)` pairs.
///
/// # Example
///
/// ```
/// use quiver_filter::Filter;
///
/// let filter = Filter::new()
///     .with("year__gt", 2000)
///     .with("title__icontains", "over");
///
/// let predicate = filter.compile().unwrap();
/// assert_eq!(predicate.clauses().len(), 2);
///
/// assert!(Filter::new().with("year__between", 1).compile().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    specs: Vec<(String, Operand)>,
}

impl Filter {
    /// Creates an empty filter. An empty filter matches every item.
    pub fn new() -> Self {
        Filter::default()
    }

    /// Adds a spec. Parsing is deferred to [`Filter::compile`].
    pub fn with(mut self, spec: impl Into<String>, operand: impl Into<Operand>) -> Self {
        self.specs.push((spec.into(), operand.into()));
        self
    }

    /// Returns the raw specs in insertion order.
    pub fn specs(&self) -> &[(String, Operand)] {
        &self.specs
    }

    /// Returns `true` if no spec was added.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Parses every spec into a clause.
    ///
    /// Fails on the first unknown operator, empty attribute name or invalid
    /// regex, without evaluating anything.
    pub fn compile(&self) -> Result<Predicate> {
        let clauses = self
            .specs
            .iter()
            .map(|(spec, operand)| Clause::parse(spec, operand.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Predicate { clauses })
    }
}

/// Builds a [`Filter`] from keyword-style specs.
///
/// ```
/// use quiver_filter::filter;
///
/// let f = filter!(year__gt = 2000, title__icontains = "over");
/// assert_eq!(f.specs().len(), 2);
/// assert_eq!(f.specs()[0].0, "year__gt");
/// ```
#[macro_export]
macro_rules! filter {
    ($($spec:ident = $operand:expr),* $(,)?) => {
        $crate::Filter::new()$(.with(stringify!($spec), $operand))*
    };
}

/// A compiled filter: every clause must hold for an item to match.
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Builds a predicate from already-constructed clauses.
    pub fn from_clauses(clauses: Vec<Clause>) -> Self {
        Predicate { clauses }
    }

    /// Returns the clauses in evaluation order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns `true` if this predicate has no clauses (matches everything).
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Tests a [`Record`] against every clause, stopping at the first miss.
    ///
    /// Attribute names are read with [`Record::lookup`], so `album__title`
    /// reaches into nested records.
    pub fn matches<T: Record + ?Sized>(&self, item: &T) -> Result<bool> {
        for clause in &self.clauses {
            if !clause.evaluate(&item.lookup(&clause.attribute))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Tests an item through an explicit accessor function.
    pub fn matches_with<T, F>(&self, item: &T, accessor: F) -> Result<bool>
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        for clause in &self.clauses {
            if !clause.evaluate(&accessor(item, &clause.attribute))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Filters a slice, returning references to matching items in order.
    pub fn filter<'a, T, F>(&self, items: &'a [T], accessor: F) -> Result<Vec<&'a T>>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        let mut results = Vec::new();
        for item in items {
            if self.matches_with(item, &accessor)? {
                results.push(item);
            }
        }
        Ok(results)
    }

    /// Counts the matching items.
    pub fn count<T, F>(&self, items: &[T], accessor: F) -> Result<usize>
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        Ok(self.filter(items, accessor)?.len())
    }

    /// Finds the first matching item.
    pub fn find<'a, T, F>(&self, items: &'a [T], accessor: F) -> Result<Option<&'a T>>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        for item in items {
            if self.matches_with(item, &accessor)? {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}
