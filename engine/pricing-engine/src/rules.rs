//! Rule Engine - ordered, explainable price adjustments
//!
//! A [`RuleEngine`] walks its chain strictly in declaration order. Each rule sees the
//! running price left by the rules before it, plus the per-request [`PricingContext`]
//! (demand is computed once per request and never re-derived mid-chain). A firing rule
//! changes the running price through an [`Adjustment`]; multipliers therefore compound and
//! reordering the chain changes the result.
//!
//! # Audit trail
//!
//! Every evaluation produces the same shape of trail:
//!
//! 1. `Start base: B`
//! 2. one entry per chain rule, in order, each ending with the running price after it:
//!    - `Rule [N] applied (kind m): a -> b`
//!    - `Rule [N] skipped (not applicable): p`
//!    - `Rule [N] skipped (evaluation fault: reason): p`
//!    - `Rule [N] skipped (halted by exclusive rule [E]): p`
//!
//!    plus `Rule [E] is exclusive; halting remaining rules` right after a firing exclusive rule
//! 3. one entry for the [`MinimumPriceFloor`], which always runs last
//! 4. `Final price: P`
//!
//! # Fault isolation
//!
//! A rule that returns an error, panics, or produces a negative or non-finite price is
//! logged, counted in [`MetricsCollector::rule_faults_total`] and treated as not firing. The
//! rest of the chain still runs against the unchanged running price.

use crate::config::RulesConfig;
use crate::error::{PricingError, Result};
use crate::metrics::MetricsCollector;
use crate::types::{
    ceil_cents, round_cents, Adjustment, AppliedRule, DemandIndex, PriceQuoteRequest, UserSegment,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Free-form details a rule attaches to its [`AppliedRule`]
pub type RuleMetadata = BTreeMap<String, Value>;

/// Outcome of a single rule callback; the error string becomes the fault reason
pub type RuleResult<T> = std::result::Result<T, String>;

/// Name of the mandatory floor rule
pub const MINIMUM_PRICE_FLOOR: &str = "MinimumPriceFloor";

/// Immutable per-request facts a rule may read
#[derive(Debug, Clone, PartialEq)]
pub struct PricingContext {
    pub request: PriceQuoteRequest,
    pub demand_index: DemandIndex,
    pub occupancy: f64,
    pub lead_time_days: i64,
    pub base_price: f64,
    pub competitor_price: Option<f64>,
    pub season_multiplier: f64,
}

/// A named predicate plus adjustment
pub trait PricingRule: Send + Sync {
    /// Unique, stable identifier used in applied rules and the audit trail
    fn name(&self) -> &str;

    /// When true and the rule fires, the remaining chain rules are skipped
    fn exclusive(&self) -> bool {
        false
    }

    fn applies(&self, ctx: &PricingContext, price: f64) -> RuleResult<bool>;

    fn adjustment(&self, ctx: &PricingContext, price: f64) -> RuleResult<(Adjustment, RuleMetadata)>;
}

fn metadata<const N: usize>(entries: [(&str, Value); N]) -> RuleMetadata {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Applies the catalog's seasonal multiplier for the check-in month
#[derive(Debug, Clone)]
pub struct SeasonalMultiplier {
    pub name: String,
}

impl PricingRule for SeasonalMultiplier {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies(&self, ctx: &PricingContext, _price: f64) -> RuleResult<bool> {
        Ok(ctx.season_multiplier != 1.0)
    }

    fn adjustment(&self, ctx: &PricingContext, _price: f64) -> RuleResult<(Adjustment, RuleMetadata)> {
        Ok((
            Adjustment::Multiplier(ctx.season_multiplier),
            metadata([("month", json!(ctx.request.check_in.month()))]),
        ))
    }
}

/// Surcharge once occupancy reaches a threshold, growing with the excess
#[derive(Debug, Clone)]
pub struct OccupancySurge {
    pub name: String,
    pub threshold: f64,
    pub base_uplift: f64,
    pub slope: f64,
}

impl PricingRule for OccupancySurge {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies(&self, ctx: &PricingContext, _price: f64) -> RuleResult<bool> {
        Ok(ctx.occupancy >= self.threshold)
    }

    fn adjustment(&self, ctx: &PricingContext, _price: f64) -> RuleResult<(Adjustment, RuleMetadata)> {
        let excess = ctx.occupancy - self.threshold;
        Ok((
            Adjustment::Multiplier(1.0 + self.base_uplift + self.slope * excess),
            metadata([("occupancy", json!(ctx.occupancy)), ("threshold", json!(self.threshold))]),
        ))
    }
}

/// Flat multiplier when the demand index is high
#[derive(Debug, Clone)]
pub struct HighDemandSurge {
    pub name: String,
    pub demand_threshold: f64,
    pub multiplier: f64,
}

impl PricingRule for HighDemandSurge {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies(&self, ctx: &PricingContext, _price: f64) -> RuleResult<bool> {
        Ok(ctx.demand_index.value() >= self.demand_threshold)
    }

    fn adjustment(&self, ctx: &PricingContext, _price: f64) -> RuleResult<(Adjustment, RuleMetadata)> {
        Ok((
            Adjustment::Multiplier(self.multiplier),
            metadata([("demandIndex", json!(ctx.demand_index.value()))]),
        ))
    }
}

/// Caps the price just under a competitor that undercuts the seasonal base rate.
///
/// Exclusive: once it fires no further chain rule is evaluated.
#[derive(Debug, Clone)]
pub struct CompetitorAlign {
    pub name: String,
    pub undercut_pct: f64,
    pub trigger_pct: f64,
}

impl PricingRule for CompetitorAlign {
    fn name(&self) -> &str {
        &self.name
    }

    fn exclusive(&self) -> bool {
        true
    }

    fn applies(&self, ctx: &PricingContext, _price: f64) -> RuleResult<bool> {
        let reference = ctx.base_price * ctx.season_multiplier * self.trigger_pct;
        Ok(matches!(ctx.competitor_price, Some(competitor) if competitor < reference))
    }

    fn adjustment(&self, ctx: &PricingContext, _price: f64) -> RuleResult<(Adjustment, RuleMetadata)> {
        let competitor = ctx
            .competitor_price
            .ok_or_else(|| "competitor price disappeared".to_string())?;
        Ok((
            Adjustment::Cap(competitor * (1.0 - self.undercut_pct)),
            metadata([("competitorPrice", json!(competitor))]),
        ))
    }
}

/// Surcharge for close-in stays while demand is high
#[derive(Debug, Clone)]
pub struct LastMinuteSurcharge {
    pub name: String,
    pub max_days: u32,
    pub min_demand: f64,
    pub surcharge_pct: f64,
}

impl PricingRule for LastMinuteSurcharge {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies(&self, ctx: &PricingContext, _price: f64) -> RuleResult<bool> {
        Ok(ctx.lead_time_days <= i64::from(self.max_days)
            && ctx.demand_index.value() >= self.min_demand)
    }

    fn adjustment(&self, ctx: &PricingContext, _price: f64) -> RuleResult<(Adjustment, RuleMetadata)> {
        Ok((
            Adjustment::Multiplier(1.0 + self.surcharge_pct),
            metadata([("leadTimeDays", json!(ctx.lead_time_days))]),
        ))
    }
}

/// Discount for close-in stays at an emptier hotel
#[derive(Debug, Clone)]
pub struct LastMinuteDeal {
    pub name: String,
    pub max_days: u32,
    pub max_occupancy: f64,
    pub discount_pct: f64,
}

impl PricingRule for LastMinuteDeal {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies(&self, ctx: &PricingContext, _price: f64) -> RuleResult<bool> {
        Ok(ctx.lead_time_days <= i64::from(self.max_days) && ctx.occupancy <= self.max_occupancy)
    }

    fn adjustment(&self, ctx: &PricingContext, _price: f64) -> RuleResult<(Adjustment, RuleMetadata)> {
        Ok((
            Adjustment::Multiplier(1.0 - self.discount_pct),
            metadata([
                ("leadTimeDays", json!(ctx.lead_time_days)),
                ("occupancy", json!(ctx.occupancy)),
            ]),
        ))
    }
}

/// Discount for bookings made well in advance
#[derive(Debug, Clone)]
pub struct EarlyBirdDiscount {
    pub name: String,
    pub min_days: u32,
    pub discount_pct: f64,
}

impl PricingRule for EarlyBirdDiscount {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies(&self, ctx: &PricingContext, _price: f64) -> RuleResult<bool> {
        Ok(ctx.lead_time_days >= i64::from(self.min_days))
    }

    fn adjustment(&self, ctx: &PricingContext, _price: f64) -> RuleResult<(Adjustment, RuleMetadata)> {
        Ok((
            Adjustment::Multiplier(1.0 - self.discount_pct),
            metadata([("leadTimeDays", json!(ctx.lead_time_days))]),
        ))
    }
}

/// Per-segment percentage: negative for a discount, positive for a surcharge
#[derive(Debug, Clone)]
pub struct SegmentAdjustment {
    pub name: String,
    pub adjustments: BTreeMap<String, f64>,
}

impl SegmentAdjustment {
    fn pct_for(&self, segment: UserSegment) -> Option<f64> {
        self.adjustments.get(segment.as_str()).copied().filter(|pct| *pct != 0.0)
    }
}

impl PricingRule for SegmentAdjustment {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies(&self, ctx: &PricingContext, _price: f64) -> RuleResult<bool> {
        Ok(self.pct_for(ctx.request.user_segment).is_some())
    }

    fn adjustment(&self, ctx: &PricingContext, _price: f64) -> RuleResult<(Adjustment, RuleMetadata)> {
        let segment = ctx.request.user_segment;
        let pct = self
            .pct_for(segment)
            .ok_or_else(|| format!("no adjustment for segment {}", segment))?;
        Ok((
            Adjustment::Multiplier(1.0 + pct),
            metadata([("segment", json!(segment.as_str())), ("pct", json!(pct))]),
        ))
    }
}

/// Flat amount added to the running price
#[derive(Debug, Clone)]
pub struct FixedSurcharge {
    pub name: String,
    pub amount: f64,
}

impl PricingRule for FixedSurcharge {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies(&self, _ctx: &PricingContext, _price: f64) -> RuleResult<bool> {
        Ok(self.amount != 0.0)
    }

    fn adjustment(&self, _ctx: &PricingContext, _price: f64) -> RuleResult<(Adjustment, RuleMetadata)> {
        Ok((Adjustment::Additive(self.amount), RuleMetadata::new()))
    }
}

/// Caps the running price at a multiple of the base price
#[derive(Debug, Clone)]
pub struct PriceCap {
    pub name: String,
    pub max_multiple: f64,
}

impl PricingRule for PriceCap {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies(&self, ctx: &PricingContext, price: f64) -> RuleResult<bool> {
        Ok(price > ctx.base_price * self.max_multiple)
    }

    fn adjustment(&self, ctx: &PricingContext, _price: f64) -> RuleResult<(Adjustment, RuleMetadata)> {
        Ok((
            Adjustment::Cap(ctx.base_price * self.max_multiple),
            metadata([("maxMultiple", json!(self.max_multiple))]),
        ))
    }
}

/// Safety net evaluated after the chain: the price never ends below a fraction of base
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimumPriceFloor {
    min_fraction: f64,
}

impl MinimumPriceFloor {
    pub fn new(min_fraction: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&min_fraction) {
            return Err(PricingError::Config(format!(
                "min_price_fraction must be in [0, 1], got {}",
                min_fraction
            )));
        }
        Ok(Self { min_fraction })
    }

    pub fn min_fraction(&self) -> f64 {
        self.min_fraction
    }

    /// Lowest acceptable price for a base price, rounded up to the cent
    pub fn floor_for(&self, base_price: f64) -> f64 {
        ceil_cents(base_price * self.min_fraction)
    }
}

/// Serializable rule definition, as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleSpec {
    SeasonalMultiplier { name: String },
    OccupancySurge { name: String, threshold: f64, base_uplift: f64, slope: f64 },
    HighDemandSurge { name: String, demand_threshold: f64, multiplier: f64 },
    CompetitorAlign { name: String, undercut_pct: f64, trigger_pct: f64 },
    LastMinuteSurcharge { name: String, max_days: u32, min_demand: f64, surcharge_pct: f64 },
    LastMinuteDeal { name: String, max_days: u32, max_occupancy: f64, discount_pct: f64 },
    EarlyBirdDiscount { name: String, min_days: u32, discount_pct: f64 },
    SegmentAdjustment { name: String, adjustments: BTreeMap<String, f64> },
    FixedSurcharge { name: String, amount: f64 },
    PriceCap { name: String, max_multiple: f64 },
}

impl RuleSpec {
    pub fn name(&self) -> &str {
        match self {
            RuleSpec::SeasonalMultiplier { name }
            | RuleSpec::OccupancySurge { name, .. }
            | RuleSpec::HighDemandSurge { name, .. }
            | RuleSpec::CompetitorAlign { name, .. }
            | RuleSpec::LastMinuteSurcharge { name, .. }
            | RuleSpec::LastMinuteDeal { name, .. }
            | RuleSpec::EarlyBirdDiscount { name, .. }
            | RuleSpec::SegmentAdjustment { name, .. }
            | RuleSpec::FixedSurcharge { name, .. }
            | RuleSpec::PriceCap { name, .. } => name,
        }
    }

    /// Reject parameters that would break the price floor or occupancy monotonicity
    pub fn validate(&self) -> Result<()> {
        let name = self.name();
        if name.trim().is_empty() {
            return Err(PricingError::Config("rule name must not be empty".to_string()));
        }

        let ensure = |ok: bool, what: &str| -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(PricingError::Config(format!("rule '{}': {}", name, what)))
            }
        };
        let unit = |x: f64| (0.0..=1.0).contains(&x);
        let fraction = |x: f64| (0.0..1.0).contains(&x);
        let non_negative = |x: f64| x.is_finite() && x >= 0.0;

        match self {
            RuleSpec::SeasonalMultiplier { .. } => Ok(()),
            RuleSpec::OccupancySurge { threshold, base_uplift, slope, .. } => {
                ensure(unit(*threshold), "threshold must be in [0, 1]")?;
                ensure(non_negative(*base_uplift), "base_uplift must be non-negative")?;
                ensure(non_negative(*slope), "slope must be non-negative")
            }
            RuleSpec::HighDemandSurge { demand_threshold, multiplier, .. } => {
                ensure(unit(*demand_threshold), "demand_threshold must be in [0, 1]")?;
                ensure(multiplier.is_finite() && *multiplier >= 1.0, "multiplier must be >= 1")
            }
            RuleSpec::CompetitorAlign { undercut_pct, trigger_pct, .. } => {
                ensure(fraction(*undercut_pct), "undercut_pct must be in [0, 1)")?;
                ensure(trigger_pct.is_finite() && *trigger_pct > 0.0, "trigger_pct must be positive")
            }
            RuleSpec::LastMinuteSurcharge { min_demand, surcharge_pct, .. } => {
                ensure(unit(*min_demand), "min_demand must be in [0, 1]")?;
                ensure(non_negative(*surcharge_pct), "surcharge_pct must be non-negative")
            }
            RuleSpec::LastMinuteDeal { max_occupancy, discount_pct, .. } => {
                ensure(unit(*max_occupancy), "max_occupancy must be in [0, 1]")?;
                ensure(fraction(*discount_pct), "discount_pct must be in [0, 1)")
            }
            RuleSpec::EarlyBirdDiscount { discount_pct, .. } => {
                ensure(fraction(*discount_pct), "discount_pct must be in [0, 1)")
            }
            RuleSpec::SegmentAdjustment { adjustments, .. } => {
                for (segment, pct) in adjustments {
                    ensure(
                        UserSegment::known(segment).map(|s| s.as_str()) == Some(segment.as_str()),
                        format!("unknown segment '{}'", segment).as_str(),
                    )?;
                    ensure(
                        pct.is_finite() && *pct > -1.0,
                        format!("invalid pct for '{}'", segment).as_str(),
                    )?;
                }
                Ok(())
            }
            RuleSpec::FixedSurcharge { amount, .. } => ensure(amount.is_finite(), "amount must be finite"),
            RuleSpec::PriceCap { max_multiple, .. } => {
                ensure(max_multiple.is_finite() && *max_multiple >= 1.0, "max_multiple must be >= 1")
            }
        }
    }

    pub fn build(&self) -> Box<dyn PricingRule> {
        match self.clone() {
            RuleSpec::SeasonalMultiplier { name } => Box::new(SeasonalMultiplier { name }),
            RuleSpec::OccupancySurge { name, threshold, base_uplift, slope } => {
                Box::new(OccupancySurge { name, threshold, base_uplift, slope })
            }
            RuleSpec::HighDemandSurge { name, demand_threshold, multiplier } => {
                Box::new(HighDemandSurge { name, demand_threshold, multiplier })
            }
            RuleSpec::CompetitorAlign { name, undercut_pct, trigger_pct } => {
                Box::new(CompetitorAlign { name, undercut_pct, trigger_pct })
            }
            RuleSpec::LastMinuteSurcharge { name, max_days, min_demand, surcharge_pct } => {
                Box::new(LastMinuteSurcharge { name, max_days, min_demand, surcharge_pct })
            }
            RuleSpec::LastMinuteDeal { name, max_days, max_occupancy, discount_pct } => {
                Box::new(LastMinuteDeal { name, max_days, max_occupancy, discount_pct })
            }
            RuleSpec::EarlyBirdDiscount { name, min_days, discount_pct } => {
                Box::new(EarlyBirdDiscount { name, min_days, discount_pct })
            }
            RuleSpec::SegmentAdjustment { name, adjustments } => {
                Box::new(SegmentAdjustment { name, adjustments })
            }
            RuleSpec::FixedSurcharge { name, amount } => Box::new(FixedSurcharge { name, amount }),
            RuleSpec::PriceCap { name, max_multiple } => Box::new(PriceCap { name, max_multiple }),
        }
    }
}

/// Result of running the chain
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    /// Final price, rounded to cents
    pub final_price: f64,
    pub applied_rules: Vec<AppliedRule>,
    pub audit_trail: Vec<String>,
}

enum Step {
    Fired { adjustment: Adjustment, metadata: RuleMetadata, price_after: f64 },
    Skipped,
    Fault(String),
}

/// Ordered rule chain followed by the minimum price floor
pub struct RuleEngine {
    rules: Vec<Box<dyn PricingRule>>,
    floor: MinimumPriceFloor,
    metrics: Arc<MetricsCollector>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Box<dyn PricingRule>>, floor: MinimumPriceFloor) -> Result<Self> {
        let mut seen = HashSet::new();
        seen.insert(MINIMUM_PRICE_FLOOR.to_string());
        for rule in &rules {
            if !seen.insert(rule.name().to_string()) {
                return Err(PricingError::Config(format!("duplicate rule name '{}'", rule.name())));
            }
        }

        Ok(Self { rules, floor, metrics: Arc::new(MetricsCollector::new()) })
    }

    /// Build the configured chain
    pub fn from_config(config: &RulesConfig) -> Result<Self> {
        let mut rules = Vec::with_capacity(config.chain.len());
        for spec in &config.chain {
            spec.validate()?;
            rules.push(spec.build());
        }
        Self::new(rules, MinimumPriceFloor::new(config.min_price_fraction)?)
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Run the chain and the floor starting from `base_price`
    pub fn evaluate(&self, ctx: &PricingContext, base_price: f64) -> RuleOutcome {
        let mut price = base_price;
        let mut applied_rules = Vec::new();
        let mut audit_trail = vec![format!("Start base: {:.2}", base_price)];
        let mut halted_by: Option<&str> = None;

        for rule in &self.rules {
            let name = rule.name();

            if let Some(exclusive) = halted_by {
                audit_trail.push(format!(
                    "Rule [{}] skipped (halted by exclusive rule [{}]): {:.2}",
                    name, exclusive, price
                ));
                continue;
            }

            match run_rule(rule.as_ref(), ctx, price) {
                Step::Skipped => {
                    audit_trail.push(format!("Rule [{}] skipped (not applicable): {:.2}", name, price));
                }
                Step::Fault(reason) => {
                    self.metrics.rule_faults_total.inc();
                    let fault =
                        PricingError::RuleEvaluationFault { rule: name.to_string(), reason: reason.clone() };
                    warn!("{}; continuing without it", fault);
                    audit_trail.push(format!(
                        "Rule [{}] skipped (evaluation fault: {}): {:.2}",
                        name, reason, price
                    ));
                }
                Step::Fired { adjustment, metadata, price_after } => {
                    audit_trail.push(applied_entry(name, &adjustment, price, price_after));
                    applied_rules.push(applied_rule(
                        name,
                        &adjustment,
                        price,
                        price_after,
                        rule.exclusive(),
                        metadata,
                    ));
                    debug!("Rule {} moved price {:.4} -> {:.4}", name, price, price_after);
                    price = price_after;

                    if rule.exclusive() {
                        audit_trail.push(format!("Rule [{}] is exclusive; halting remaining rules", name));
                        halted_by = Some(name);
                    }
                }
            }
        }

        let floor = self.floor.floor_for(base_price);
        if price < floor {
            let adjustment = Adjustment::Floor(floor);
            let price_after = adjustment.apply(price);
            audit_trail.push(applied_entry(MINIMUM_PRICE_FLOOR, &adjustment, price, price_after));
            applied_rules.push(applied_rule(
                MINIMUM_PRICE_FLOOR,
                &adjustment,
                price,
                price_after,
                false,
                metadata([("minFraction", json!(self.floor.min_fraction()))]),
            ));
            price = price_after;
        } else {
            audit_trail.push(format!(
                "Rule [{}] checked: price {:.2} >= floor {:.2}",
                MINIMUM_PRICE_FLOOR, price, floor
            ));
        }

        let final_price = round_cents(price);
        audit_trail.push(format!("Final price: {:.2}", final_price));

        RuleOutcome { final_price, applied_rules, audit_trail }
    }
}

fn run_rule(rule: &dyn PricingRule, ctx: &PricingContext, price: f64) -> Step {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> RuleResult<Option<(Adjustment, RuleMetadata)>> {
        if !rule.applies(ctx, price)? {
            return Ok(None);
        }
        rule.adjustment(ctx, price).map(Some)
    }));

    match outcome {
        Err(payload) => Step::Fault(panic_message(payload.as_ref())),
        Ok(Err(reason)) => Step::Fault(reason),
        Ok(Ok(None)) => Step::Skipped,
        Ok(Ok(Some((adjustment, metadata)))) => {
            let price_after = adjustment.apply(price);
            if price_after.is_finite() && price_after >= 0.0 {
                Step::Fired { adjustment, metadata, price_after }
            } else {
                Step::Fault(format!("adjustment produced invalid price {}", price_after))
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {}", msg)
    } else {
        "panicked".to_string()
    }
}

/// Magnitude as shown in the trail: at most four decimals, trailing zeros dropped
fn format_magnitude(magnitude: f64) -> String {
    let text = format!("{:.4}", magnitude);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn applied_entry(name: &str, adjustment: &Adjustment, before: f64, after: f64) -> String {
    format!(
        "Rule [{}] applied ({} {}): {:.2} -> {:.2}",
        name,
        adjustment.kind(),
        format_magnitude(adjustment.magnitude()),
        before,
        after
    )
}

fn applied_rule(
    name: &str,
    adjustment: &Adjustment,
    before: f64,
    after: f64,
    exclusive: bool,
    metadata: RuleMetadata,
) -> AppliedRule {
    AppliedRule {
        name: name.to_string(),
        kind: adjustment.kind(),
        magnitude: (adjustment.magnitude() * 10_000.0).round() / 10_000.0,
        price_before: round_cents(before),
        price_after: round_cents(after),
        exclusive,
        metadata,
    }
}
