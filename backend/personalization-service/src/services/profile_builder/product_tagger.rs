// ============================================
// Product Tagger
// ============================================
//
// Derives season and occasion for catalog products once, at load time,
// by whole-word keyword matching over name, description and tags. Values
// already present on a product are kept.

use crate::models::{Occasion, Product, Season};
use crate::utils::{contains_phrase, word_tokens};

const SEASON_KEYWORDS: &[(Season, &[&str])] = &[
    (
        Season::Winter,
        &[
            "winter", "wool", "fleece", "thermal", "puffer", "down", "scarf", "beanie", "knit",
            "knitted", "knitwear",
        ],
    ),
    (
        Season::Summer,
        &["summer", "linen", "swim", "beach", "sandal", "shorts", "sunglasses", "tank"],
    ),
    (
        Season::Spring,
        &["spring", "floral", "rain", "pastel", "light jacket", "trench"],
    ),
    (
        Season::Autumn,
        &["autumn", "fall", "flannel", "corduroy", "suede", "cardigan"],
    ),
];

const OCCASION_KEYWORDS: &[(Occasion, &[&str])] = &[
    (
        Occasion::Formal,
        &["formal", "suit", "blazer", "tuxedo", "gown", "oxford"],
    ),
    (
        Occasion::Party,
        &["party", "sequin", "cocktail", "evening", "glitter"],
    ),
    (
        Occasion::Work,
        &["office", "work", "business", "chino", "loafer"],
    ),
    (
        Occasion::Sport,
        &["sport", "running", "gym", "training", "athletic", "yoga"],
    ),
    (
        Occasion::Lounge,
        &["lounge", "pajama", "sleep", "slipper", "robe"],
    ),
    (
        Occasion::Casual,
        &["casual", "denim", "jeans", "t-shirt", "tee", "sneaker", "hoodie"],
    ),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct ProductTagger;

impl ProductTagger {
    pub fn new() -> Self {
        Self
    }

    pub fn tag(&self, mut product: Product) -> Product {
        let words = word_tokens(&Self::searchable_text(&product));

        if product.season.is_none() {
            product.season = first_match(SEASON_KEYWORDS, &words);
        }
        if product.occasion.is_none() {
            product.occasion = first_match(OCCASION_KEYWORDS, &words);
        }

        product
    }

    pub fn tag_all(&self, products: Vec<Product>) -> Vec<Product> {
        products.into_iter().map(|p| self.tag(p)).collect()
    }

    fn searchable_text(product: &Product) -> String {
        let mut text = String::with_capacity(product.name.len() + product.description.len() + 32);
        text.push_str(&product.name);
        text.push(' ');
        text.push_str(&product.description);
        for tag in &product.tags {
            text.push(' ');
            text.push_str(tag);
        }
        text
    }
}

fn first_match<T: Copy>(table: &[(T, &[&str])], words: &[String]) -> Option<T> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| contains_phrase(words, k)))
        .map(|(value, _)| *value)
}
