use serde::{Deserialize, Serialize};

/// Steps used when a recipe arrives without any analyzed instructions.
pub const PLACEHOLDER_STEPS: [&str; 3] = [
    "Prepare all ingredients",
    "Cook according to recipe",
    "Serve and enjoy!",
];

/// A recipe as served by the provider. Field names follow the upstream
/// camelCase shape so bundled and live data deserialize identically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    pub id: u64,
    pub title: String,
    pub image: String,
    pub ready_in_minutes: u32,
    pub servings: u32,
    pub source_url: String,
    pub spoonacular_score: f64,
    pub health_score: f64,
    pub cuisines: Vec<String>,
    pub dish_types: Vec<String>,
    pub summary: String,
    pub analyzed_instructions: Vec<InstructionGroup>,
    pub extended_ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstructionGroup {
    pub name: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Step {
    pub number: u32,
    pub step: String,
}

impl Step {
    pub fn new(number: u32, step: impl Into<String>) -> Self {
        Self {
            number,
            step: step.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingredient {
    pub id: u64,
    pub name: String,
    pub image: String,
    pub amount: f64,
    pub unit: String,
}

impl Ingredient {
    /// "400 g spaghetti" style line for detail views
    pub fn display_line(&self) -> String {
        let amount = if self.amount.fract() == 0.0 {
            format!("{}", self.amount as i64)
        } else {
            format!("{:.1}", self.amount)
        };
        if self.unit.is_empty() {
            format!("{} {}", amount, self.name)
        } else {
            format!("{} {} {}", amount, self.unit, self.name)
        }
    }
}

impl Recipe {
    /// Ordered instruction steps of the first instruction group, or the
    /// placeholder sequence when the recipe has none.
    pub fn steps(&self) -> Vec<Step> {
        match self.analyzed_instructions.first() {
            Some(group) if !group.steps.is_empty() => group.steps.clone(),
            _ => PLACEHOLDER_STEPS
                .iter()
                .enumerate()
                .map(|(i, text)| Step::new(i as u32 + 1, *text))
                .collect(),
        }
    }

    /// Rating on a five star scale, derived from the 0-100 upstream score.
    pub fn stars(&self) -> f64 {
        (self.spoonacular_score / 20.0).clamp(0.0, 5.0)
    }

    pub fn source_url(&self) -> Option<&str> {
        let url = self.source_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

/// Query parameters for recipe search. Unset fields use the provider defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilter {
    pub query: Option<String>,
    pub cuisine: Option<String>,
    pub number: Option<usize>,
    pub offset: Option<usize>,
}

impl SearchFilter {
    pub const DEFAULT_NUMBER: usize = 12;

    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn number(&self) -> usize {
        self.number.unwrap_or(Self::DEFAULT_NUMBER)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<Recipe>,
    pub offset: usize,
    pub number: usize,
    pub total_results: usize,
}
