// Wire representation of catalog records.
//
// The admin API has a couple of quirks the rest of the workspace should
// never see: `is_enabled` travels as 0/1, price fields may arrive as JSON
// numbers or strings depending on how the record was last saved, and the
// image fields use camelCase keys while everything else is snake_case.
// The serde codecs here absorb all of that.

use serde::{Deserialize, Serialize};

/// A catalog product as the admin API sees it.
///
/// `id` is assigned by the server; unsaved records carry `None` and the
/// field is omitted from outgoing payloads entirely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, with = "lenient_number")]
    pub origin_price: f64,
    #[serde(default, with = "lenient_number")]
    pub price: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, with = "int_bool")]
    pub is_enabled: bool,
    /// Primary image URL; may be empty.
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
    /// Secondary image URLs, insertion order significant, at most 5.
    #[serde(rename = "imagesUrl", default)]
    pub images_url: Vec<String>,
}

/// `GET .../admin/products` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductsEnvelope {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Acknowledgement body for create/update/delete.
#[derive(Debug, Deserialize)]
pub(crate) struct MutationAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl MutationAck {
    /// Flatten the `message` field (string or array of strings) into one line.
    pub(crate) fn message_text(&self) -> String {
        match &self.message {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            _ => String::new(),
        }
    }
}

/// Error body shape shared by all endpoints: `{"success": false, "message": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl ErrorBody {
    pub(crate) fn message_text(&self) -> Option<String> {
        match &self.message {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Array(items)) => {
                let joined = items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                (!joined.is_empty()).then_some(joined)
            }
            _ => None,
        }
    }
}

/// Booleans that travel as 0/1 integers (but may come back as real booleans).
mod int_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrInt {
        Bool(bool),
        Int(i64),
    }

    pub fn serialize<S: Serializer>(value: &bool, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
        Ok(match BoolOrInt::deserialize(de)? {
            BoolOrInt::Bool(b) => b,
            BoolOrInt::Int(i) => i != 0,
        })
    }
}

/// Numbers that may arrive as JSON strings. Unparseable strings collapse
/// to zero rather than failing the whole record.
mod lenient_number {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Num(f64),
        Str(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_f64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
        Ok(match NumberOrString::deserialize(de)? {
            NumberOrString::Num(n) => n,
            NumberOrString::Str(s) => s.trim().parse().unwrap_or(0.0),
        })
    }
}
