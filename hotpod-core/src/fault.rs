//! Probabilistic error injection.
//!
//! Rules map endpoints to an error rate, a set of status codes, and an
//! optional expiry. An endpoint rule dominates the global rule for that
//! endpoint. Rules are immutable once inserted; mutation is replacement.
//! The request hot path takes a shared lock only for the rule lookup and
//! rolls the dice unlocked.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use rand::Rng;

/// Error injection rule for an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRule {
    /// Probability of injecting an error (0.0 to 1.0)
    pub rate: f64,
    /// HTTP status codes to select from uniformly
    pub codes: Vec<u16>,
    /// When this rule expires (None means never)
    pub expires_at: Option<DateTime<Utc>>,
}

impl ErrorRule {
    /// True once the rule's expiry has passed.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Utc::now() > at,
            None => false,
        }
    }

    /// Roll the dice against the rule's rate.
    fn should_inject(&self) -> bool {
        if self.rate <= 0.0 {
            return false;
        }
        if self.rate >= 1.0 {
            return true;
        }
        rand::thread_rng().gen::<f64>() < self.rate
    }

    /// Pick a status code uniformly from the configured set.
    fn select_code(&self) -> u16 {
        match self.codes.len() {
            0 => 500,
            1 => self.codes[0],
            n => self.codes[rand::thread_rng().gen_range(0..n)],
        }
    }
}

/// Manages error injection rules for endpoints.
#[derive(Default)]
pub struct FaultInjector {
    rules: RwLock<HashMap<String, ErrorRule>>,
    global: RwLock<Option<ErrorRule>>,
}

impl FaultInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rule for a specific endpoint. A rate of zero or less removes
    /// any existing rule.
    pub fn set_endpoint_rule(&self, endpoint: &str, rule: ErrorRule) {
        let mut rules = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        if rule.rate <= 0.0 {
            rules.remove(endpoint);
        } else {
            rules.insert(endpoint.to_string(), rule);
        }
    }

    /// Set the global rule applied to endpoints without their own rule.
    pub fn set_global_rule(&self, rule: ErrorRule) {
        let mut global = self.global.write().unwrap_or_else(PoisonError::into_inner);
        *global = if rule.rate <= 0.0 { None } else { Some(rule) };
    }

    /// The rule that applies to an endpoint: its own non-expired rule if
    /// present, otherwise the non-expired global rule.
    pub fn rule_for(&self, endpoint: &str) -> Option<ErrorRule> {
        {
            let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(rule) = rules.get(endpoint) {
                if !rule.is_expired() {
                    return Some(rule.clone());
                }
            }
        }

        let global = self.global.read().unwrap_or_else(PoisonError::into_inner);
        global.as_ref().filter(|r| !r.is_expired()).cloned()
    }

    /// Decide whether to inject an error for this endpoint. Returns the
    /// status code to inject, or `None` to let the request through.
    pub fn should_inject(&self, endpoint: &str) -> Option<u16> {
        let rule = self.rule_for(endpoint)?;
        if !rule.should_inject() {
            return None;
        }
        Some(rule.select_code())
    }

    /// Configured rate for an endpoint, for metrics.
    pub fn rate_for(&self, endpoint: &str) -> f64 {
        self.rule_for(endpoint).map(|r| r.rate).unwrap_or(0.0)
    }

    /// Snapshot of the global rule, if set and not expired.
    pub fn global_rule(&self) -> Option<ErrorRule> {
        let global = self.global.read().unwrap_or_else(PoisonError::into_inner);
        global.as_ref().filter(|r| !r.is_expired()).cloned()
    }

    /// Snapshot copy of all non-expired endpoint rules.
    pub fn endpoint_rules(&self) -> HashMap<String, ErrorRule> {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        rules
            .iter()
            .filter(|(_, rule)| !rule.is_expired())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Atomically remove every rule.
    pub fn reset(&self) {
        let mut rules = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        let mut global = self.global.write().unwrap_or_else(PoisonError::into_inner);
        rules.clear();
        *global = None;
    }
}
