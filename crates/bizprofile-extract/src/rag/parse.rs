//! Lenient decoding of the model's JSON reply into a partial profile.

use bizprofile_core::{PartialProfile, SocialLinks};
use serde_json::{Map, Value};

/// Remove markdown code fences the model adds despite being told not to.
#[must_use]
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```JSON", "").replace("```", "").trim().to_string()
}

/// Decode a model reply. Returns `None` when the reply is not a JSON object.
///
/// Canonical camelCase keys and their display forms (`"Business Name"`,
/// `"Twitter / X"`) are both accepted. A string where a list is expected
/// becomes a one-element list, and an object in a list field contributes its
/// values.
#[must_use]
pub fn parse_profile(raw: &str) -> Option<PartialProfile> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(&cleaned).ok()?;
    let obj = value.as_object()?;

    Some(PartialProfile {
        business_name: text_field(obj, &["businessName", "Business Name", "business_name", "name"]),
        about_us: text_field(obj, &["aboutUs", "About Us", "about_us", "about"]),
        main_services: list_field(obj, &["mainServices", "Main Services", "main_services", "services"]),
        email: list_field(obj, &["email", "Email", "emails"]),
        phone: list_field(obj, &["phone", "Phone", "phones"]),
        address: list_field(obj, &["address", "Address", "addresses"]),
        social: SocialLinks {
            facebook: text_field(obj, &["facebook", "Facebook"]),
            instagram: text_field(obj, &["instagram", "Instagram"]),
            linkedin: text_field(obj, &["linkedin", "LinkedIn", "linkedIn"]),
            twitter_x: text_field(obj, &["twitterX", "Twitter / X", "twitter", "Twitter", "x"]),
        },
        description: text_field(obj, &["description", "Description"]),
    })
}

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k)).filter(|v| !v.is_null())
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> String {
    match lookup(obj, keys) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_text)
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

fn list_field(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(value) = lookup(obj, keys) {
        collect_items(value, &mut out);
    }
    out
}

fn collect_items(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_items(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_items(item, out)),
        other => {
            if let Some(text) = scalar_text(other) {
                out.push(text);
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
