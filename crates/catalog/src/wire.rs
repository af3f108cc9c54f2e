//! Decoding of the `cgi/search.pl` JSON payload.
//!
//! The catalog is crowd-sourced, so every per-product field is read leniently: missing, null,
//! or oddly typed values fall back to the unknown/worst-case defaults instead of failing the
//! whole response. Only a body that is not a JSON object with an optional `products` array is
//! a parse error.

use leafscore_core::{CandidateRecord, CatalogError, Grade, ProcessingLevel};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    count: Option<Value>,
    #[serde(default)]
    products: Option<Vec<ProductRecord>>,
}

#[derive(Debug, Default, Deserialize)]
struct ProductRecord {
    #[serde(default)]
    product_name: Option<Value>,
    #[serde(default)]
    nutriscore_grade: Option<Value>,
    #[serde(default)]
    nova_group: Option<Value>,
    #[serde(default)]
    ecoscore_grade: Option<Value>,
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    brands: Option<Value>,
}

impl ProductRecord {
    fn into_candidate(self) -> CandidateRecord {
        CandidateRecord {
            name: text(self.product_name).unwrap_or_default(),
            nutrition_grade: grade(self.nutriscore_grade),
            processing_level: processing_level(self.nova_group),
            eco_grade: grade(self.ecoscore_grade),
            code: text(self.code).filter(|code| !code.trim().is_empty()),
            brands: text(self.brands).filter(|brands| !brands.trim().is_empty()),
        }
    }
}

pub(crate) struct DecodedSearch {
    pub reported_count: Option<u64>,
    pub candidates: Vec<CandidateRecord>,
}

pub(crate) fn decode_search_response(body: &[u8]) -> Result<DecodedSearch, CatalogError> {
    let response: SearchResponse =
        serde_json::from_slice(body).map_err(|error| CatalogError::Parse(error.to_string()))?;

    let reported_count = response.count.as_ref().and_then(number);
    let candidates = response
        .products
        .unwrap_or_default()
        .into_iter()
        .map(ProductRecord::into_candidate)
        .collect();

    Ok(DecodedSearch { reported_count, candidates })
}

fn text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn grade(value: Option<Value>) -> Grade {
    text(value).map(|letter| Grade::from_letter(&letter)).unwrap_or(Grade::Unknown)
}

fn processing_level(value: Option<Value>) -> Option<ProcessingLevel> {
    let level = match value? {
        Value::String(text) => text.trim().parse::<u64>().ok(),
        other => number(&other),
    }?;
    u8::try_from(level).ok().and_then(ProcessingLevel::new)
}

/// Non-negative integral JSON number, accepting `4` and `4.0` alike.
fn number(value: &Value) -> Option<u64> {
    let Value::Number(number) = value else {
        return None;
    };
    number.as_u64().or_else(|| {
        number
            .as_f64()
            .filter(|float| float.fract() == 0.0 && *float >= 0.0 && *float <= u32::MAX as f64)
            .map(|float| float as u64)
    })
}

#[cfg(test)]
mod tests {
    use leafscore_core::{CatalogError, Grade};

    use super::decode_search_response;

    #[test]
    fn decodes_typical_search_payload() {
        let body = br#"{
            "count": 2,
            "page": 1,
            "products": [
                {
                    "product_name": "Choco Crunch Cereal",
                    "nutriscore_grade": "d",
                    "nova_group": 4,
                    "ecoscore_grade": "c",
                    "code": "3017620422003",
                    "brands": "Crunchy Co"
                },
                {
                    "product_name": "Organic Oat Cereal",
                    "nutriscore_grade": "b",
                    "nova_group": 2,
                    "ecoscore_grade": "a"
                }
            ]
        }"#;

        let decoded = decode_search_response(body).expect("decode");

        assert_eq!(decoded.reported_count, Some(2));
        assert_eq!(decoded.candidates.len(), 2);
        let first = &decoded.candidates[0];
        assert_eq!(first.name, "Choco Crunch Cereal");
        assert_eq!(first.nutrition_grade, Grade::D);
        assert_eq!(first.processing_level.map(|level| level.get()), Some(4));
        assert_eq!(first.eco_grade, Grade::C);
        assert_eq!(first.code.as_deref(), Some("3017620422003"));
        assert_eq!(first.brands.as_deref(), Some("Crunchy Co"));
        assert_eq!(decoded.candidates[1].eco_grade, Grade::A);
    }

    #[test]
    fn missing_and_null_fields_fall_back_to_defaults() {
        let body = br#"{"products": [
            {},
            {"product_name": null, "nutriscore_grade": null,
             "nova_group": null, "ecoscore_grade": null},
            {"product_name": "Tea", "nutriscore_grade": "not-applicable",
             "ecoscore_grade": "unknown"}
        ]}"#;

        let decoded = decode_search_response(body).expect("decode");

        assert_eq!(decoded.candidates.len(), 3);
        for candidate in &decoded.candidates {
            assert_eq!(candidate.nutrition_grade, Grade::Unknown);
            assert_eq!(candidate.eco_grade, Grade::Unknown);
            assert_eq!(candidate.processing_level, None);
        }
        assert_eq!(decoded.candidates[0].name, "");
        assert_eq!(decoded.candidates[1].name, "");
        assert_eq!(decoded.candidates[2].name, "Tea");
    }

    #[test]
    fn nova_group_accepts_strings_and_floats_but_not_out_of_range() {
        let body = br#"{"products": [
            {"nova_group": "3"},
            {"nova_group": 2.0},
            {"nova_group": 7},
            {"nova_group": 0},
            {"nova_group": "ultra"},
            {"nova_group": 1.5}
        ]}"#;

        let levels: Vec<Option<u8>> = decode_search_response(body)
            .expect("decode")
            .candidates
            .iter()
            .map(|candidate| candidate.processing_level.map(|level| level.get()))
            .collect();

        assert_eq!(levels, vec![Some(3), Some(2), None, None, None, None]);
    }

    #[test]
    fn uppercase_grades_and_numeric_codes_are_tolerated() {
        let body =
            br#"{"products": [{"nutriscore_grade": "A", "ecoscore_grade": "E", "code": 123}]}"#;

        let candidate = &decode_search_response(body).expect("decode").candidates[0];

        assert_eq!(candidate.nutrition_grade, Grade::A);
        assert_eq!(candidate.eco_grade, Grade::E);
        assert_eq!(candidate.code.as_deref(), Some("123"));
    }

    #[test]
    fn zero_matches_is_an_empty_success() {
        let with_empty = decode_search_response(br#"{"count": 0, "products": []}"#).expect("empty");
        let without_products = decode_search_response(br#"{"count": 0}"#).expect("no products");
        let null_products = decode_search_response(br#"{"products": null}"#).expect("null");

        assert!(with_empty.candidates.is_empty());
        assert!(without_products.candidates.is_empty());
        assert!(null_products.candidates.is_empty());
    }

    #[test]
    fn malformed_bodies_are_parse_errors() {
        let bodies: [&[u8]; 4] =
            [b"<html>rate limited</html>", b"42", b"{\"products\": {}}", b""];
        for body in bodies {
            let result = decode_search_response(body);
            assert!(matches!(result, Err(CatalogError::Parse(_))), "body {body:?}");
        }
    }
}
