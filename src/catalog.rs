use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{debug, warn};

use crate::recipe::{Recipe, SearchFilter, SearchResponse};

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/data");
const BUNDLED_FILE: &str = "recipes.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("recipe {0} not found")]
    NotFound(u64),
    #[error("upstream recipe source unavailable: {0}")]
    Upstream(String),
    #[error("bundled recipe data is missing")]
    MissingBundle,
    #[error("recipe data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Anything that can answer recipe queries. The bundled dataset implements
/// this, and so can an upstream API client plugged into [`Catalog`].
pub trait RecipeProvider {
    fn search(&self, filter: &SearchFilter) -> Result<SearchResponse, CatalogError>;
    fn recipe_by_id(&self, id: u64) -> Result<Recipe, CatalogError>;
    fn random(&self, count: usize) -> Result<Vec<Recipe>, CatalogError>;
    fn by_ingredients(&self, names: &[String]) -> Result<Vec<Recipe>, CatalogError>;
}

/// Fixed dataset compiled into the binary
#[derive(Debug, Clone)]
pub struct BundledRecipes {
    recipes: Vec<Recipe>,
}

impl BundledRecipes {
    pub fn load() -> Result<Self, CatalogError> {
        let file = DATA_DIR
            .get_file(BUNDLED_FILE)
            .ok_or(CatalogError::MissingBundle)?;
        let recipes: Vec<Recipe> = serde_json::from_slice(file.contents())?;
        debug!(count = recipes.len(), "loaded bundled recipes");
        Ok(Self { recipes })
    }

    pub fn from_recipes(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    pub fn all(&self) -> &[Recipe] {
        &self.recipes
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl RecipeProvider for BundledRecipes {
    fn search(&self, filter: &SearchFilter) -> Result<SearchResponse, CatalogError> {
        // query wins over cuisine when both are given
        let matching: Vec<&Recipe> = self
            .recipes
            .iter()
            .filter(|recipe| match (&filter.query, &filter.cuisine) {
                (Some(query), _) => contains_ignore_case(&recipe.title, query),
                (None, Some(cuisine)) => recipe
                    .cuisines
                    .iter()
                    .any(|c| contains_ignore_case(c, cuisine)),
                (None, None) => true,
            })
            .collect();

        let results = matching
            .iter()
            .skip(filter.offset())
            .take(filter.number())
            .map(|r| (*r).clone())
            .collect();

        Ok(SearchResponse {
            results,
            offset: filter.offset(),
            number: filter.number(),
            total_results: matching.len(),
        })
    }

    fn recipe_by_id(&self, id: u64) -> Result<Recipe, CatalogError> {
        self.recipes
            .iter()
            .find(|r| r.id == id)
            .or_else(|| self.recipes.first())
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    fn random(&self, count: usize) -> Result<Vec<Recipe>, CatalogError> {
        let mut rng = rand::thread_rng();
        Ok(self
            .recipes
            .choose_multiple(&mut rng, count)
            .cloned()
            .collect())
    }

    fn by_ingredients(&self, names: &[String]) -> Result<Vec<Recipe>, CatalogError> {
        Ok(self
            .recipes
            .iter()
            .filter(|recipe| {
                names.iter().any(|wanted| {
                    recipe
                        .extended_ingredients
                        .iter()
                        .any(|ing| contains_ignore_case(&ing.name, wanted))
                })
            })
            .cloned()
            .collect())
    }
}

/// Recipe provider that prefers an upstream source and degrades to the
/// bundled dataset whenever the upstream is missing or fails.
pub struct Catalog {
    upstream: Option<Box<dyn RecipeProvider>>,
    bundled: BundledRecipes,
}

impl Catalog {
    pub fn new(upstream: Option<Box<dyn RecipeProvider>>, bundled: BundledRecipes) -> Self {
        if upstream.is_none() {
            warn!("no upstream recipe source configured, using bundled recipes");
        }
        Self { upstream, bundled }
    }

    /// Catalog backed only by the bundled dataset
    pub fn offline() -> Result<Self, CatalogError> {
        Ok(Self::new(None, BundledRecipes::load()?))
    }

    pub fn is_live(&self) -> bool {
        self.upstream.is_some()
    }

    fn with_fallback<T>(
        &self,
        op: &'static str,
        live: impl FnOnce(&dyn RecipeProvider) -> Result<T, CatalogError>,
        fallback: impl FnOnce(&BundledRecipes) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        if let Some(upstream) = self.upstream.as_deref() {
            match live(upstream) {
                Ok(value) => return Ok(value),
                Err(err) => warn!(op, %err, "upstream recipe source failed, serving bundled data"),
            }
        }
        fallback(&self.bundled)
    }
}

impl RecipeProvider for Catalog {
    fn search(&self, filter: &SearchFilter) -> Result<SearchResponse, CatalogError> {
        self.with_fallback("search", |p| p.search(filter), |b| b.search(filter))
    }

    fn recipe_by_id(&self, id: u64) -> Result<Recipe, CatalogError> {
        self.with_fallback("recipe_by_id", |p| p.recipe_by_id(id), |b| b.recipe_by_id(id))
    }

    fn random(&self, count: usize) -> Result<Vec<Recipe>, CatalogError> {
        self.with_fallback("random", |p| p.random(count), |b| b.random(count))
    }

    fn by_ingredients(&self, names: &[String]) -> Result<Vec<Recipe>, CatalogError> {
        self.with_fallback(
            "by_ingredients",
            |p| p.by_ingredients(names),
            |b| b.by_ingredients(names),
        )
    }
}
