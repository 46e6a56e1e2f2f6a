//! Review Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_rating() -> u8 { 5 }

/// What a shopper submits. Storage assigns the id.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[validate(range(min = 1))]
    pub product_id: i64,
    #[serde(default)]
    pub product_name: String,
    #[validate(length(min = 1))]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default = "default_rating")]
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: String,
    /// Photo as a data URL.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    id: i64,
    product_id: i64,
    product_name: String,
    user_id: String,
    user_name: String,
    rating: u8,
    comment: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

impl Review {
    pub fn create(id: i64, new: NewReview) -> Self {
        Self {
            id, product_id: new.product_id, product_name: new.product_name, user_id: new.user_id,
            user_name: new.user_name, rating: new.rating, comment: new.comment.trim().to_string(),
            image: new.image, created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> i64 { self.id }
    pub fn product_id(&self) -> i64 { self.product_id }
    pub fn rating(&self) -> u8 { self.rating }
    pub fn comment(&self) -> &str { &self.comment }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_defaults_and_bounds() {
        let new: NewReview = serde_json::from_str(r#"{"productId": 3, "userId": "u-1", "comment": " Lovely fabric "}"#).unwrap();
        assert_eq!(new.rating, 5);
        assert!(new.validate().is_ok());
        let review = Review::create(1, new.clone());
        assert_eq!(review.comment(), "Lovely fabric");

        let mut bad = new.clone();
        bad.rating = 0;
        assert!(bad.validate().is_err());
        bad.rating = 6;
        assert!(bad.validate().is_err());
        let mut anonymous = new;
        anonymous.user_id = String::new();
        assert!(anonymous.validate().is_err());
    }
}
