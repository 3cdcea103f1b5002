use serde::Deserialize;
use serde_json::json;

use stockroom_products::{BlacklistWord, Product, ProductHistory};

#[derive(Debug, Deserialize)]
pub struct AddWordRequest {
    pub word: String,
}

pub fn product_to_json(p: &Product) -> serde_json::Value {
    json!({
        "id": p.id.to_string(),
        "name": p.name,
        "category": p.category,
        "description": p.description,
        "price": p.price,
        "quantity": p.quantity,
        "created_at": p.created_at.to_rfc3339(),
        "updated_at": p.updated_at.to_rfc3339(),
    })
}

pub fn history_to_json(h: &ProductHistory) -> serde_json::Value {
    json!({
        "id": h.id.to_string(),
        "product_id": h.product_id.to_string(),
        "field": h.field.as_str(),
        "old_value": h.old_value,
        "new_value": h.new_value,
        "changed_at": h.changed_at.to_rfc3339(),
    })
}

pub fn word_to_json(w: &BlacklistWord) -> serde_json::Value {
    json!({
        "id": w.id.to_string(),
        "word": w.word,
    })
}
