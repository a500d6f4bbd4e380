//! Domain models for Budgie

use serde::{Deserialize, Deserializer, Serialize};

/// The eight monthly figures a household enters on the form
///
/// Amounts are non-negative. Form edits go through [`coerce_amount`], so
/// blank or invalid text lands as zero rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetInputs {
    #[serde(default, deserialize_with = "de_amount")]
    pub income: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub rent: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub food: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub travel: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub loans: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub shopping: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub entertainment: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub luxury: f64,
}

impl Default for BudgetInputs {
    /// Starting values shown on a fresh form
    fn default() -> Self {
        Self {
            income: 25000.0,
            rent: 8000.0,
            food: 5000.0,
            travel: 2000.0,
            loans: 1000.0,
            shopping: 3000.0,
            entertainment: 1500.0,
            luxury: 500.0,
        }
    }
}

impl BudgetInputs {
    /// All fields set to zero (an empty form)
    pub fn zeroed() -> Self {
        Self {
            income: 0.0,
            rent: 0.0,
            food: 0.0,
            travel: 0.0,
            loans: 0.0,
            shopping: 0.0,
            entertainment: 0.0,
            luxury: 0.0,
        }
    }

    pub fn get(&self, field: BudgetField) -> f64 {
        match field {
            BudgetField::Income => self.income,
            BudgetField::Rent => self.rent,
            BudgetField::Food => self.food,
            BudgetField::Travel => self.travel,
            BudgetField::Loans => self.loans,
            BudgetField::Shopping => self.shopping,
            BudgetField::Entertainment => self.entertainment,
            BudgetField::Luxury => self.luxury,
        }
    }

    fn slot(&mut self, field: BudgetField) -> &mut f64 {
        match field {
            BudgetField::Income => &mut self.income,
            BudgetField::Rent => &mut self.rent,
            BudgetField::Food => &mut self.food,
            BudgetField::Travel => &mut self.travel,
            BudgetField::Loans => &mut self.loans,
            BudgetField::Shopping => &mut self.shopping,
            BudgetField::Entertainment => &mut self.entertainment,
            BudgetField::Luxury => &mut self.luxury,
        }
    }

    /// Set a field, clamping negative or non-finite values to zero
    pub fn set(&mut self, field: BudgetField, value: f64) {
        *self.slot(field) = sanitize(value);
    }

    /// Set a field from raw form text
    pub fn set_raw(&mut self, field: BudgetField, raw: &str) {
        *self.slot(field) = coerce_amount(raw);
    }

    /// Return a copy with one field replaced
    pub fn with(mut self, field: BudgetField, value: f64) -> Self {
        self.set(field, value);
        self
    }
}

/// One of the eight form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetField {
    Income,
    Rent,
    Food,
    Travel,
    Loans,
    Shopping,
    Entertainment,
    Luxury,
}

/// How a field is grouped on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Income,
    Needs,
    Wants,
}

impl BudgetField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Rent => "rent",
            Self::Food => "food",
            Self::Travel => "travel",
            Self::Loans => "loans",
            Self::Shopping => "shopping",
            Self::Entertainment => "entertainment",
            Self::Luxury => "luxury",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Monthly Income",
            Self::Rent => "Rent",
            Self::Food => "Food",
            Self::Travel => "Travel",
            Self::Loans => "Loans",
            Self::Shopping => "Shopping",
            Self::Entertainment => "Entertainment",
            Self::Luxury => "Luxury",
        }
    }

    pub fn group(&self) -> FieldGroup {
        match self {
            Self::Income => FieldGroup::Income,
            Self::Rent | Self::Food | Self::Travel | Self::Loans => FieldGroup::Needs,
            Self::Shopping | Self::Entertainment | Self::Luxury => FieldGroup::Wants,
        }
    }

    /// All fields in form order
    pub fn all() -> &'static [BudgetField] {
        &[
            Self::Income,
            Self::Rent,
            Self::Food,
            Self::Travel,
            Self::Loans,
            Self::Shopping,
            Self::Entertainment,
            Self::Luxury,
        ]
    }
}

impl std::str::FromStr for BudgetField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "rent" => Ok(Self::Rent),
            "food" => Ok(Self::Food),
            "travel" => Ok(Self::Travel),
            "loans" | "loan" => Ok(Self::Loans),
            "shopping" => Ok(Self::Shopping),
            "entertainment" => Ok(Self::Entertainment),
            "luxury" => Ok(Self::Luxury),
            _ => Err(format!("Unknown budget field: {}", s)),
        }
    }
}

impl std::fmt::Display for BudgetField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coerce raw form text into an amount
///
/// Blank, unparsable, negative, or non-finite input becomes `0.0`.
/// A leading rupee sign and `,` group separators are accepted.
/// There is no prefix parsing: `"12abc"` is unparsable, not `12`.
pub fn coerce_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    cleaned.parse::<f64>().map(sanitize).unwrap_or(0.0)
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Accepts a number, numeric text, or null for an amount field
fn de_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<RawAmount>::deserialize(deserializer)? {
        Some(RawAmount::Number(n)) => sanitize(n),
        Some(RawAmount::Text(s)) => coerce_amount(&s),
        None => 0.0,
    })
}

/// Advice returned by the hosted model
///
/// Every number here was computed by the model. Nothing checks it for
/// arithmetic consistency before display; see [`crate::view::Discrepancy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAdvice {
    pub summary: AdviceSummary,
    pub categories: CategorySplit,
    pub alerts: Vec<String>,
    pub suggestions: Vec<String>,
    pub next_month_prediction: Prediction,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdviceSummary {
    pub income: f64,
    pub total_expenses: f64,
    pub savings: f64,
}

/// Needs / wants / savings split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategorySplit {
    pub needs: f64,
    pub wants: f64,
    pub savings: f64,
}

/// Next-month projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub rent: f64,
    pub food: f64,
    pub travel: f64,
    pub loans: f64,
    pub wants: f64,
    pub estimated_total: f64,
    pub estimated_savings: f64,
}
