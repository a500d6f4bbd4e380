//! Mock backend for testing
//!
//! Returns canned advice without any network access. Useful for unit tests
//! and for running the CLI or server without a model credential.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{AdviceSummary, BudgetAdvice, BudgetInputs, CategorySplit, Prediction};

use super::AdvisorBackend;

/// Mock AI backend for testing
///
/// Always answers with the same advice, or always fails. The advice is not
/// derived from the inputs.
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    reply: std::result::Result<BudgetAdvice, String>,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, answers with `sample_advice`)
    pub fn new() -> Self {
        Self::with_advice(Self::sample_advice())
    }

    /// Answer every request with the given advice
    pub fn with_advice(advice: BudgetAdvice) -> Self {
        Self {
            healthy: true,
            reply: Ok(advice),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail every request with the given message
    pub fn failing(message: &str) -> Self {
        Self {
            healthy: false,
            reply: Err(message.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }

    /// Number of `advise` calls made (shared across clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Advice for the default form values
    pub fn sample_advice() -> BudgetAdvice {
        BudgetAdvice {
            summary: AdviceSummary {
                income: 25000.0,
                total_expenses: 21000.0,
                savings: 4000.0,
            },
            categories: CategorySplit {
                needs: 16000.0,
                wants: 5000.0,
                savings: 4000.0,
            },
            alerts: vec![],
            suggestions: vec!["Reduce shopping".to_string()],
            next_month_prediction: Prediction {
                rent: 8400.0,
                food: 5250.0,
                travel: 2100.0,
                loans: 1050.0,
                wants: 5250.0,
                estimated_total: 22050.0,
                estimated_savings: 2950.0,
            },
        }
    }
}

#[async_trait]
impl AdvisorBackend for MockBackend {
    async fn advise(&self, _inputs: &BudgetInputs) -> Result<BudgetAdvice> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .map_err(|message| Error::Api { status: 500, body: message })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
