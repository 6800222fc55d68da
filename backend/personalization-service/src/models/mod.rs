use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Catalog product, read-only for the scorer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default)]
    pub occasion: Option<Occasion>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Northern-hemisphere meteorological seasons.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }

    /// Occasions that fit this part of the day.
    pub fn matching_occasions(&self) -> &'static [Occasion] {
        match self {
            TimeOfDay::Morning => &[Occasion::Work, Occasion::Sport],
            TimeOfDay::Afternoon => &[Occasion::Casual, Occasion::Work],
            TimeOfDay::Evening => &[Occasion::Party, Occasion::Formal],
            TimeOfDay::Night => &[Occasion::Party, Occasion::Lounge],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Occasion {
    Casual,
    Formal,
    Work,
    Party,
    Sport,
    Lounge,
}

impl Occasion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Occasion::Casual => "casual",
            Occasion::Formal => "formal",
            Occasion::Work => "work",
            Occasion::Party => "party",
            Occasion::Sport => "sport",
            Occasion::Lounge => "lounge",
        }
    }
}

/// The engine's view of "now" used for context weighting and boosting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextSnapshot {
    pub season: Season,
    pub time_of_day: TimeOfDay,
}

impl ContextSnapshot {
    pub fn from_datetime(now: DateTime<Utc>) -> Self {
        Self {
            season: Season::from_month(now.month()),
            time_of_day: TimeOfDay::from_hour(now.hour()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    View,
    Click,
    AddToCart,
    Purchase,
    Wishlist,
    Share,
}

impl InteractionType {
    /// Base weight of an interaction before time and context adjustments.
    pub fn base_weight(&self) -> f64 {
        match self {
            InteractionType::View => 1.0,
            InteractionType::Click => 2.0,
            InteractionType::AddToCart => 5.0,
            InteractionType::Purchase => 10.0,
            InteractionType::Wishlist => 3.0,
            InteractionType::Share => 2.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::View => "view",
            InteractionType::Click => "click",
            InteractionType::AddToCart => "add_to_cart",
            InteractionType::Purchase => "purchase",
            InteractionType::Wishlist => "wishlist",
            InteractionType::Share => "share",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "view" => Some(InteractionType::View),
            "click" => Some(InteractionType::Click),
            "add_to_cart" | "addtocart" | "cart" => Some(InteractionType::AddToCart),
            "purchase" | "buy" => Some(InteractionType::Purchase),
            "wishlist" => Some(InteractionType::Wishlist),
            "share" => Some(InteractionType::Share),
            _ => None,
        }
    }

    /// Interactions that count as a commitment signal for collaborative filtering.
    pub fn is_conversion_signal(&self) -> bool {
        matches!(self, InteractionType::Purchase | InteractionType::AddToCart)
    }
}

/// A validated shopper interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub kind: InteractionType,
    pub product_id: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub style: Option<String>,
    pub tags: Vec<String>,
    pub season: Option<Season>,
    pub time_of_day: Option<TimeOfDay>,
    pub timestamp: DateTime<Utc>,
}

impl Interaction {
    pub fn new(kind: InteractionType, product_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            product_id: product_id.into(),
            category: None,
            brand: None,
            price: None,
            style: None,
            tags: Vec::new(),
            season: None,
            time_of_day: None,
            timestamp,
        }
    }

    /// Copy the descriptive fields of a catalog product onto the interaction.
    pub fn for_product(kind: InteractionType, product: &Product, timestamp: DateTime<Utc>) -> Self {
        Self {
            category: Some(product.category.clone()),
            brand: product.brand.clone(),
            price: product.price,
            tags: product.tags.clone(),
            season: product.season,
            ..Self::new(kind, product.id.clone(), timestamp)
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context(mut self, season: Option<Season>, time_of_day: Option<TimeOfDay>) -> Self {
        self.season = season;
        self.time_of_day = time_of_day;
        self
    }
}

/// Loosely typed interaction as it arrives from the storefront.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInteraction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, alias = "productId")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default, alias = "timeOfDay")]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InteractionError {
    #[error("Unknown interaction type: {0}")]
    UnknownType(String),

    #[error("Interaction is missing a product id")]
    MissingProductId,

    #[error("Purchase of {0} has no price")]
    MissingPurchasePrice(String),
}

impl RawInteraction {
    /// Validate into an [`Interaction`], stamping `fallback_timestamp` when
    /// the payload carries none.
    pub fn validate(self, fallback_timestamp: DateTime<Utc>) -> Result<Interaction, InteractionError> {
        let kind = InteractionType::parse(&self.kind)
            .ok_or_else(|| InteractionError::UnknownType(self.kind.clone()))?;

        let product_id = self
            .product_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(InteractionError::MissingProductId)?;

        // Non-finite or negative prices are treated as absent.
        let price = self.price.filter(|p| p.is_finite() && *p >= 0.0);
        if kind == InteractionType::Purchase && price.is_none() {
            return Err(InteractionError::MissingPurchasePrice(product_id));
        }

        Ok(Interaction {
            kind,
            product_id,
            category: non_empty(self.category),
            brand: non_empty(self.brand),
            price,
            style: non_empty(self.style),
            tags: self.tags,
            season: self.season,
            time_of_day: self.time_of_day,
            timestamp: self.timestamp.unwrap_or(fallback_timestamp),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// An interaction after weighting, as kept in the behavior history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightedInteraction {
    pub interaction: Interaction,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseRecord {
    pub product_id: String,
    pub price: f64,
    pub category: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Closed numeric interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn point(value: f64) -> Self {
        Self { min: value, max: value }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn widened_to(&self, value: f64) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Accumulated shopper preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub category_affinities: HashMap<String, f64>,
    #[serde(default)]
    pub brand_affinities: HashMap<String, f64>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub preferred_price_range: Option<PriceRange>,
    #[serde(default)]
    pub style_profile: HashMap<String, u32>,
    #[serde(default)]
    pub behavior_history: VecDeque<WeightedInteraction>,
    #[serde(default)]
    pub purchase_history: Vec<PurchaseRecord>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub total_interactions: u64,
    #[serde(default)]
    pub conversion_rate: f64,
    #[serde(default)]
    pub average_order_value: f64,
    #[serde(default)]
    pub lifetime_value: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Fresh profile with zero affinities.
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            category_affinities: HashMap::new(),
            brand_affinities: HashMap::new(),
            price_range: None,
            preferred_price_range: None,
            style_profile: HashMap::new(),
            behavior_history: VecDeque::new(),
            purchase_history: Vec::new(),
            view_count: 0,
            total_interactions: 0,
            conversion_rate: 0.0,
            average_order_value: 0.0,
            lifetime_value: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn category_affinity(&self, category: &str) -> f64 {
        self.category_affinities.get(category).copied().unwrap_or(0.0)
    }

    pub fn brand_affinity(&self, brand: &str) -> f64 {
        self.brand_affinities.get(brand).copied().unwrap_or(0.0)
    }

    pub fn style_count(&self, token: &str) -> u32 {
        self.style_profile.get(token).copied().unwrap_or(0)
    }

    pub fn purchase_count(&self) -> usize {
        self.purchase_history.len()
    }
}

/// A product with the score that placed it in a ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredProduct {
    pub product: Product,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    Collaborative,
    ContentBased,
    Hybrid,
}

impl RecommendationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationSource::Collaborative => "collaborative",
            RecommendationSource::ContentBased => "content_based",
            RecommendationSource::Hybrid => "hybrid",
        }
    }
}

/// Final ranked output handed to the display layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub product: Product,
    pub score: f64,
    pub source: RecommendationSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarUser {
    pub user_id: String,
    pub similarity: f64,
}
