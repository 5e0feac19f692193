//! Product review as stored in the realtime database.
//!
//! Records live at `reviews/<productId>/<autoId>`. A record becomes a [`Review`] only
//! when every field is present with the right JSON type; anything else is rejected
//! with a [`ReviewRecordError`] and never partially constructed.

use serde_json::{Map, Value, json};
use thiserror::Error;

/// Why a stored record could not become a review.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewRecordError {
    /// The record is not a JSON object.
    #[error("review record is not an object")]
    NotAnObject,
    /// A required field is absent.
    #[error("review record is missing `{0}`")]
    MissingField(&'static str),
    /// A required field has the wrong JSON type.
    #[error("review record field `{0}` has the wrong type")]
    WrongType(&'static str),
}

/// A single user review of a product.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    /// Store-assigned key
    pub id: String,
    /// Reviewed product
    pub product_id: i64,
    /// Display name of the author
    pub user_name: String,
    /// Review body
    pub text: String,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
}

impl Review {
    /// Builds a review from its store key and raw record.
    ///
    /// # Errors
    /// Returns a [`ReviewRecordError`] when the record is not an object or any of
    /// `productId`, `userName`, `text`, `timestamp` is missing or mistyped.
    pub fn from_record(id: impl Into<String>, record: &Value) -> Result<Self, ReviewRecordError> {
        let fields = record.as_object().ok_or(ReviewRecordError::NotAnObject)?;

        let product_id = field(fields, "productId")?
            .as_i64()
            .ok_or(ReviewRecordError::WrongType("productId"))?;
        let user_name = field(fields, "userName")?
            .as_str()
            .ok_or(ReviewRecordError::WrongType("userName"))?;
        let text = field(fields, "text")?
            .as_str()
            .ok_or(ReviewRecordError::WrongType("text"))?;
        let timestamp = field(fields, "timestamp")?
            .as_f64()
            .ok_or(ReviewRecordError::WrongType("timestamp"))?;

        Ok(Self {
            id: id.into(),
            product_id,
            user_name: user_name.to_string(),
            text: text.to_string(),
            timestamp,
        })
    }

    /// The record written to the store (the id is the store key, not a field).
    #[must_use]
    pub fn to_record(&self) -> Value {
        json!({
            "productId": self.product_id,
            "userName": self.user_name,
            "text": self.text,
            "timestamp": self.timestamp,
        })
    }
}

fn field<'a>(fields: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, ReviewRecordError> {
    fields.get(name).ok_or(ReviewRecordError::MissingField(name))
}
