//! Play-area geometry: ingredient tokens, cooking stations and their
//! layout for the two viewport classes.
//!
//! Coordinates are abstract play-area units with the origin at the top-left
//! corner. The terminal shell maps cells onto these units; the engine never
//! sees cells.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::recipe::Recipe;

/// Edge length of a token's square footprint
pub const TOKEN_SIZE: f64 = 96.0;
/// Pointer offset from a token's top-left corner while it is dragged
pub const DRAG_ANCHOR: f64 = TOKEN_SIZE / 2.0;
/// Only the first ingredients of a recipe become tokens
pub const MAX_TOKENS: usize = 6;
/// Play areas narrower than this use the compact layout
pub const NARROW_BREAKPOINT: f64 = 768.0;
/// A processed token rests this far inside its station's corner
pub const DROP_INSET: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Edges count as inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum ViewportClass {
    #[strum(serialize = "narrow")]
    Narrow,
    #[strum(serialize = "wide")]
    Wide,
}

impl ViewportClass {
    pub fn from_width(width: f64) -> Self {
        if width < NARROW_BREAKPOINT {
            Self::Narrow
        } else {
            Self::Wide
        }
    }
}

/// Bounds of the surface tokens can be dragged across
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub width: f64,
    pub height: f64,
}

impl PlayArea {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn viewport_class(&self) -> ViewportClass {
        ViewportClass::from_width(self.width)
    }

    /// Top-left corner for a token held at `pointer`, kept fully inside the area.
    pub fn clamp_token(&self, pointer: Point) -> Point {
        let max_x = (self.width - TOKEN_SIZE).max(0.0);
        let max_y = (self.height - TOKEN_SIZE).max(0.0);
        Point::new(
            (pointer.x - DRAG_ANCHOR).clamp(0.0, max_x),
            (pointer.y - DRAG_ANCHOR).clamp(0.0, max_y),
        )
    }
}

impl Default for PlayArea {
    fn default() -> Self {
        Self::new(1024.0, 480.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum StationKind {
    #[strum(serialize = "cutting-board")]
    CuttingBoard,
    #[strum(serialize = "pan")]
    Pan,
    #[strum(serialize = "pot")]
    Pot,
    #[strum(serialize = "oven")]
    Oven,
    #[strum(serialize = "plate")]
    Plate,
}

impl StationKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CuttingBoard => "Cutting Board",
            Self::Pan => "Frying Pan",
            Self::Pot => "Cooking Pot",
            Self::Oven => "Oven",
            Self::Plate => "Serving Plate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::CuttingBoard => "Chop & Prepare",
            Self::Pan => "Fry & Sauté",
            Self::Pot => "Boil & Simmer",
            Self::Oven => "Bake & Roast",
            Self::Plate => "Serve & Plate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub usize);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ingredient-{}", self.0)
    }
}

/// One draggable ingredient in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientToken {
    pub id: TokenId,
    pub name: String,
    pub image: String,
    pub position: Point,
    pub is_dragging: bool,
    processed_as: Option<StationKind>,
}

impl IngredientToken {
    pub fn new(id: TokenId, name: impl Into<String>, image: impl Into<String>, position: Point) -> Self {
        Self {
            id,
            name: name.into(),
            image: image.into(),
            position,
            is_dragging: false,
            processed_as: None,
        }
    }

    pub fn is_processed(&self) -> bool {
        self.processed_as.is_some()
    }

    pub fn processed_as(&self) -> Option<StationKind> {
        self.processed_as
    }

    /// Records the first processing only. Returns false if the token was
    /// already processed, in which case nothing changes.
    pub(crate) fn mark_processed(&mut self, kind: StationKind) -> bool {
        if self.processed_as.is_some() {
            return false;
        }
        self.processed_as = Some(kind);
        true
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, TOKEN_SIZE, TOKEN_SIZE)
    }
}

/// A fixed drop target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationTarget {
    pub id: String,
    pub name: String,
    pub kind: StationKind,
    pub rect: Rect,
    pub is_hovered: bool,
    contents: Vec<TokenId>,
}

impl StationTarget {
    pub fn new(kind: StationKind, rect: Rect) -> Self {
        Self {
            id: kind.to_string(),
            name: kind.display_name().to_string(),
            kind,
            rect,
            is_hovered: false,
            contents: Vec::new(),
        }
    }

    pub fn contents(&self) -> &[TokenId] {
        &self.contents
    }

    pub(crate) fn push_content(&mut self, token: TokenId) {
        self.contents.push(token);
    }

    /// Where a token dropped here comes to rest
    pub fn resting_point(&self) -> Point {
        Point::new(self.rect.x + DROP_INSET, self.rect.y + DROP_INSET)
    }
}

/// Lays out up to [`MAX_TOKENS`] ingredient tokens in a grid.
pub fn build_tokens(recipe: &Recipe, viewport: ViewportClass) -> Vec<IngredientToken> {
    recipe
        .extended_ingredients
        .iter()
        .take(MAX_TOKENS)
        .enumerate()
        .map(|(i, ingredient)| {
            let position = match viewport {
                ViewportClass::Narrow => {
                    Point::new(10.0 + (i % 2) as f64 * 90.0, 80.0 + (i / 2) as f64 * 90.0)
                }
                ViewportClass::Wide => {
                    Point::new(30.0 + (i % 3) as f64 * 120.0, 100.0 + (i / 3) as f64 * 120.0)
                }
            };
            IngredientToken::new(TokenId(i), &ingredient.name, &ingredient.image, position)
        })
        .collect()
}

/// Builds the default station set: cutting board, pan, pot and plate.
pub fn build_stations(area: &PlayArea) -> Vec<StationTarget> {
    let layout: [(StationKind, f64, f64); 4] = match area.viewport_class() {
        ViewportClass::Narrow => {
            let left = area.width * 0.52;
            let right = area.width * 0.72;
            [
                (StationKind::CuttingBoard, left, 80.0),
                (StationKind::Pan, left, 150.0),
                (StationKind::Pot, right, 80.0),
                (StationKind::Plate, right, 150.0),
            ]
        }
        ViewportClass::Wide => [
            (StationKind::CuttingBoard, 450.0, 100.0),
            (StationKind::Pan, 590.0, 100.0),
            (StationKind::Pot, 450.0, 200.0),
            (StationKind::Plate, 590.0, 200.0),
        ],
    };
    let (width, height) = match area.viewport_class() {
        ViewportClass::Narrow => (80.0, 60.0),
        ViewportClass::Wide => (120.0, 80.0),
    };

    layout
        .into_iter()
        .map(|(kind, x, y)| StationTarget::new(kind, Rect::new(x, y, width, height)))
        .collect()
}
