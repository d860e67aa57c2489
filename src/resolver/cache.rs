//! Concurrent memoization of conversion plans.

use super::engine::{ConversionPlan, ConversionResolver};
use crate::error::Result;
use crate::rational::Rational;
use crate::unit_id::UnitIdentifier;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;

type PlanKey = (UnitIdentifier, UnitIdentifier);
type PlanCell = Arc<OnceCell<Result<ConversionPlan>>>;

/// Memoizes the [`ConversionPlan`]s of one resolver per canonical
/// `(source, target)` pair.
///
/// The cache borrows its resolver, so every entry was planned under the same
/// graph and [`ResolverConfig`](super::ResolverConfig). Safe to share between
/// threads. Each distinct pair is planned at most once, even when many
/// threads ask for it at the same moment: late callers block on the first
/// computation and then read its result. Failures are cached as well, since
/// resolution is a pure function of the graph and the config.
///
/// # Examples
///
/// ```
/// use u_unitconv::graph::{ConversionGraph, EdgeRecord};
/// use u_unitconv::rational::Rational;
/// use u_unitconv::resolver::{ConversionCache, ConversionResolver};
///
/// let inch = EdgeRecord::new("length", "inch", "meter").with_factor("0.0254".parse().unwrap());
/// let graph = ConversionGraph::builder().with_record(inch).build().unwrap();
/// let resolver = ConversionResolver::new(&graph);
/// let cache = ConversionCache::new(&resolver);
///
/// let inch = graph.parse_unit("inch").unwrap();
/// let cm = graph.parse_unit("centimeter").unwrap();
/// let result = cache.convert(&Rational::one(), &inch, &cm).unwrap();
/// assert_eq!(result, "2.54".parse().unwrap());
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug)]
pub struct ConversionCache<'r, 'g> {
    resolver: &'r ConversionResolver<'g>,
    plans: DashMap<PlanKey, PlanCell>,
}

impl<'r, 'g> ConversionCache<'r, 'g> {
    pub fn new(resolver: &'r ConversionResolver<'g>) -> Self {
        Self {
            resolver,
            plans: DashMap::new(),
        }
    }

    /// The resolver every cached plan comes from.
    pub fn resolver(&self) -> &'r ConversionResolver<'g> {
        self.resolver
    }

    /// Returns the cached plan, computing it on first use.
    pub fn get_plan(
        &self,
        source: &UnitIdentifier,
        target: &UnitIdentifier,
    ) -> Result<ConversionPlan> {
        let graph = self.resolver.graph();
        let key = (graph.canonicalize(source), graph.canonicalize(target));
        let resolver = self.resolver;
        self.get_or_compute(key, |(source, target)| resolver.plan(source, target))
    }

    fn get_or_compute<F>(&self, key: PlanKey, compute: F) -> Result<ConversionPlan>
    where
        F: FnOnce(&PlanKey) -> Result<ConversionPlan>,
    {
        // Clone the cell out so the shard lock is not held while planning.
        let cell = self
            .plans
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        cell.get_or_init(|| compute(&key)).clone()
    }

    /// Converts through a cached plan.
    pub fn convert(
        &self,
        amount: &Rational,
        source: &UnitIdentifier,
        target: &UnitIdentifier,
    ) -> Result<Rational> {
        self.get_plan(source, target)?.apply(amount)
    }

    /// Number of cached pairs.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Drops every cached plan.
    pub fn clear(&self) {
        self.plans.clear();
    }
}
