//! View model derived from a `BudgetAdvice`
//!
//! Pure functions only: nothing here performs I/O or mutates the advice.
//! The numbers shown are the model's numbers; the only local arithmetic is
//! the savings rate, bar widths, and clamping the allocation chart.

use std::fmt::Write;

use serde::Serialize;

use crate::models::{AdviceSummary, BudgetAdvice};

/// Shown in place of the alerts list when the model reported none
pub const ALL_CLEAR_MESSAGE: &str = "Budget health is excellent. No critical risks found.";

/// Absolute difference (in rupees) tolerated before a consistency note is raised
pub const CONSISTENCY_TOLERANCE: f64 = 1.0;

/// One slice of the needs / wants / savings allocation chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub name: &'static str,
    pub value: f64,
}

/// One group of the current-vs-next-month comparison chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonBar {
    pub name: &'static str,
    pub current: f64,
    pub predicted: f64,
}

/// One tile of the projected itemization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub label: &'static str,
    pub value: f64,
}

/// A place where the model's numbers don't add up
///
/// Informational only. Displayed numbers are never corrected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discrepancy {
    pub check: &'static str,
    pub expected: f64,
    pub reported: f64,
}

impl std::fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {}, model reported {}",
            self.check,
            format_amount(self.expected),
            format_amount(self.reported)
        )
    }
}

/// Allocation chart series: Needs, Wants, Savings
///
/// Every slice is clamped at zero so the chart never receives a negative
/// value. The summary card keeps the unclamped savings.
pub fn category_split(advice: &BudgetAdvice) -> Vec<CategorySlice> {
    let c = &advice.categories;
    vec![
        CategorySlice {
            name: "Needs",
            value: clamp_non_negative(c.needs),
        },
        CategorySlice {
            name: "Wants",
            value: clamp_non_negative(c.wants),
        },
        CategorySlice {
            name: "Savings",
            value: clamp_non_negative(c.savings),
        },
    ]
}

/// Comparison chart series: this month vs the model's projection
pub fn comparison_series(advice: &BudgetAdvice) -> Vec<ComparisonBar> {
    vec![
        ComparisonBar {
            name: "Expenses",
            current: advice.summary.total_expenses,
            predicted: advice.next_month_prediction.estimated_total,
        },
        ComparisonBar {
            name: "Savings",
            current: advice.summary.savings,
            predicted: advice.next_month_prediction.estimated_savings,
        },
    ]
}

/// Ratio of `part` to income as a percentage, or `None` when undefined
fn percent_of_income(part: f64, summary: &AdviceSummary) -> Option<f64> {
    if summary.income <= 0.0 {
        return None;
    }
    let pct = part / summary.income * 100.0;
    pct.is_finite().then_some(pct)
}

/// Savings as a whole percentage of income, in `[0, 100]`
///
/// Zero when income is zero or negative.
pub fn savings_rate(summary: &AdviceSummary) -> u32 {
    percent_of_income(summary.savings, summary)
        .map(|pct| pct.round().clamp(0.0, 100.0) as u32)
        .unwrap_or(0)
}

/// Width of the savings progress bar, in percent
pub fn savings_bar_width(summary: &AdviceSummary) -> f64 {
    percent_of_income(summary.savings, summary)
        .map(|pct| pct.clamp(0.0, 100.0))
        .unwrap_or(0.0)
}

/// Width of the spending progress bar, in percent
pub fn expense_bar_width(summary: &AdviceSummary) -> f64 {
    percent_of_income(summary.total_expenses, summary)
        .map(|pct| pct.clamp(0.0, 100.0))
        .unwrap_or(0.0)
}

/// Projected itemization tiles
pub fn itemization(advice: &BudgetAdvice) -> Vec<LineItem> {
    let p = &advice.next_month_prediction;
    vec![
        LineItem {
            label: "Rent",
            value: p.rent,
        },
        LineItem {
            label: "Food",
            value: p.food,
        },
        LineItem {
            label: "Travel",
            value: p.travel,
        },
        LineItem {
            label: "Loans",
            value: p.loans,
        },
        LineItem {
            label: "Wants",
            value: p.wants,
        },
        LineItem {
            label: "Next Savings",
            value: p.estimated_savings,
        },
    ]
}

/// Arithmetic checks over the model's numbers
pub fn discrepancies(advice: &BudgetAdvice) -> Vec<Discrepancy> {
    let s = &advice.summary;
    let c = &advice.categories;
    let p = &advice.next_month_prediction;

    let checks = [
        ("needs + wants + savings vs income", s.income, c.needs + c.wants + c.savings),
        ("total expenses vs needs + wants", c.needs + c.wants, s.total_expenses),
        ("savings vs income - total expenses", s.income - s.total_expenses, s.savings),
        ("category savings vs summary savings", s.savings, c.savings),
        (
            "projected total vs projected items",
            p.rent + p.food + p.travel + p.loans + p.wants,
            p.estimated_total,
        ),
        (
            "projected savings vs income - projected total",
            s.income - p.estimated_total,
            p.estimated_savings,
        ),
    ];

    checks
        .into_iter()
        .filter(|(_, expected, reported)| (expected - reported).abs() > CONSISTENCY_TOLERANCE)
        .map(|(check, expected, reported)| Discrepancy {
            check,
            expected,
            reported,
        })
        .collect()
}

/// Everything the result panel displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdviceView {
    pub income: f64,
    pub total_expenses: f64,
    /// Unclamped; may be negative
    pub savings: f64,
    pub savings_negative: bool,
    pub savings_rate: u32,
    pub savings_bar_width: f64,
    pub expense_bar_width: f64,
    pub allocation: Vec<CategorySlice>,
    pub comparison: Vec<ComparisonBar>,
    pub alerts: Vec<String>,
    /// Set when there are no alerts
    pub all_clear: Option<&'static str>,
    pub suggestions: Vec<String>,
    pub itemization: Vec<LineItem>,
    pub discrepancies: Vec<Discrepancy>,
}

impl AdviceView {
    pub fn from_advice(advice: &BudgetAdvice) -> Self {
        let summary = &advice.summary;
        Self {
            income: summary.income,
            total_expenses: summary.total_expenses,
            savings: summary.savings,
            savings_negative: summary.savings < 0.0,
            savings_rate: savings_rate(summary),
            savings_bar_width: savings_bar_width(summary),
            expense_bar_width: expense_bar_width(summary),
            allocation: category_split(advice),
            comparison: comparison_series(advice),
            alerts: advice.alerts.clone(),
            all_clear: advice.alerts.is_empty().then_some(ALL_CLEAR_MESSAGE),
            suggestions: advice.suggestions.clone(),
            itemization: itemization(advice),
            discrepancies: discrepancies(advice),
        }
    }
}

/// Plain-text rendering of the result panel
pub fn render_text(view: &AdviceView) -> String {
    let mut out = String::new();

    // writeln! into a String cannot fail
    let _ = writeln!(out, "Savings:        {}", format_amount(view.savings));
    let _ = writeln!(out, "Total Spending: {}", format_amount(view.total_expenses));
    let _ = writeln!(out, "Savings Rate:   {}% of total monthly income", view.savings_rate);

    let _ = writeln!(out, "\nAllocation");
    for slice in &view.allocation {
        let _ = writeln!(out, "  {:<8} {}", slice.name, format_amount(slice.value));
    }

    let _ = writeln!(out, "\nPrediction (next month)");
    for bar in &view.comparison {
        let _ = writeln!(
            out,
            "  {:<8} {} -> {}",
            bar.name,
            format_amount(bar.current),
            format_amount(bar.predicted)
        );
    }

    let _ = writeln!(out, "\nRisk Assessment");
    match view.all_clear {
        Some(message) => {
            let _ = writeln!(out, "  {}", message);
        }
        None => {
            for alert in &view.alerts {
                let _ = writeln!(out, "  ! {}", alert);
            }
        }
    }

    let _ = writeln!(out, "\nStrategic Advice");
    for suggestion in &view.suggestions {
        let _ = writeln!(out, "  * {}", suggestion);
    }

    let _ = writeln!(out, "\nProjected Itemization");
    for item in &view.itemization {
        let _ = writeln!(out, "  {:<13} {}", item.label, format_amount(item.value));
    }

    if !view.discrepancies.is_empty() {
        let _ = writeln!(out, "\nConsistency notes");
        for d in &view.discrepancies {
            let _ = writeln!(out, "  ~ {}", d);
        }
    }

    out
}

/// Format a rupee amount with thousands separators and up to two decimals
///
/// `25000.0` -> `₹25,000`, `-1200.0` -> `-₹1,200`, `1234.5` -> `₹1,234.5`
pub fn format_amount(value: f64) -> String {
    let value = if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    };
    let negative = value < 0.0;
    let abs = value.abs();
    let sign = if negative { "-" } else { "" };

    // past u64 the cast saturates; print the plain value
    if abs >= u64::MAX as f64 {
        return format!("{}₹{}", sign, abs);
    }

    let whole = abs.trunc() as u64;
    let cents = ((abs - abs.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let fraction = match cents {
        0 => String::new(),
        c if c % 10 == 0 => format!(".{}", c / 10),
        c => format!(".{:02}", c),
    };

    format!("{}₹{}{}", sign, grouped, fraction)
}

fn clamp_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
