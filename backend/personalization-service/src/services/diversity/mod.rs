use crate::models::Recommendation;
use std::collections::HashMap;

/// Category diversity filter.
///
/// First pass walks the score-ordered list and admits an item only while its
/// category has fewer than `ceil(limit * diversity_factor)` admitted items.
/// Second pass fills remaining slots from the leftovers regardless of
/// category. The output keeps the input's score order.
pub struct CategoryDiversityFilter {
    diversity_factor: f64,
}

impl CategoryDiversityFilter {
    pub fn new(diversity_factor: f64) -> Self {
        Self {
            diversity_factor: diversity_factor.max(0.0),
        }
    }

    pub fn category_cap(&self, limit: usize) -> usize {
        (limit as f64 * self.diversity_factor).ceil() as usize
    }

    pub fn select(&self, ranked: Vec<Recommendation>, limit: usize) -> Vec<Recommendation> {
        if ranked.is_empty() || limit == 0 {
            return Vec::new();
        }

        let cap = self.category_cap(limit);
        let mut admitted = vec![false; ranked.len()];
        let mut admitted_count = 0;
        let mut category_counts: HashMap<&str, usize> = HashMap::new();

        for (i, rec) in ranked.iter().enumerate() {
            if admitted_count >= limit {
                break;
            }
            let count = category_counts
                .entry(rec.product.category.as_str())
                .or_insert(0);
            if *count < cap {
                *count += 1;
                admitted[i] = true;
                admitted_count += 1;
            }
        }

        for flag in admitted.iter_mut() {
            if admitted_count >= limit {
                break;
            }
            if !*flag {
                *flag = true;
                admitted_count += 1;
            }
        }

        ranked
            .into_iter()
            .zip(admitted)
            .filter_map(|(rec, keep)| keep.then_some(rec))
            .collect()
    }
}
