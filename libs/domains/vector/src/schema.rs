//! Collection naming, schema derivation and row-to-record conversion.

use serde_json::{Map, Value};

use crate::error::{VectorError, VectorResult};
use crate::models::{CollectionSchema, FieldSchema, FieldType, Row};

pub(crate) const TRUNCATION_MARKER: &str = "..";

/// Keeps ASCII alphanumerics and `_`, dropping everything else.
pub fn sanitize_collection_name(raw: &str) -> VectorResult<String> {
    let name: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if name.is_empty() {
        return Err(VectorError::Validation(format!(
            "collection name '{}' has no usable characters",
            raw
        )));
    }

    Ok(name)
}

/// Derives a collection schema from a CSV header.
///
/// `primary_key_column` becomes an `Int64` primary field, every other column
/// a `VarChar(text_max_length)`, and `vector_field` is appended as a
/// `FloatVector(dimension)`.
pub fn build_schema(
    header: &[String],
    primary_key_column: &str,
    text_max_length: u32,
    vector_field: &str,
    dimension: u32,
) -> VectorResult<CollectionSchema> {
    if !header.iter().any(|c| c == primary_key_column) {
        return Err(VectorError::Validation(format!(
            "primary key column '{}' is not in the CSV header",
            primary_key_column
        )));
    }
    if header.iter().any(|c| c == vector_field) {
        return Err(VectorError::Validation(format!(
            "vector field '{}' collides with a CSV column",
            vector_field
        )));
    }
    if text_max_length <= TRUNCATION_MARKER.len() as u32 {
        return Err(VectorError::Validation(format!(
            "text max length must exceed {}",
            TRUNCATION_MARKER.len()
        )));
    }

    let mut fields: Vec<FieldSchema> = header
        .iter()
        .map(|column| {
            if column == primary_key_column {
                FieldSchema::primary_int64(column.as_str())
            } else {
                FieldSchema::varchar(column.as_str(), text_max_length)
            }
        })
        .collect();
    fields.push(FieldSchema::float_vector(vector_field, dimension));

    CollectionSchema::new(fields)
}

/// Shortens `text` to at most `max_len` bytes, marking the cut with `..`.
///
/// Milvus measures `VarChar` lengths in UTF-8 bytes. The cut lands on a
/// character boundary, so multi-byte text may end up a little shorter.
pub fn truncate_with_marker(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }

    let mut keep = max_len.saturating_sub(TRUNCATION_MARKER.len());
    while !text.is_char_boundary(keep) {
        keep -= 1;
    }

    let mut out = String::with_capacity(keep + TRUNCATION_MARKER.len());
    out.push_str(&text[..keep]);
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Builds the insert record for `row` under `schema`, placing `vector` in
/// the schema's vector field.
///
/// Columns the schema does not know are dropped. A schema field missing
/// from the row, or an `Int64` value that does not parse, is an error.
pub fn to_record(
    row: &Row,
    schema: &CollectionSchema,
    vector: Vec<f32>,
) -> VectorResult<Map<String, Value>> {
    let mut record = Map::with_capacity(schema.fields.len());

    for field in &schema.fields {
        match field.field_type {
            FieldType::FloatVector => {
                let expected = field.dimension.unwrap_or_default() as usize;
                if vector.len() != expected {
                    return Err(VectorError::Validation(format!(
                        "vector has {} dimensions, field '{}' expects {}",
                        vector.len(),
                        field.name,
                        expected
                    )));
                }
                record.insert(field.name.clone(), Value::from(vector.clone()));
            }
            FieldType::Int64 => {
                let raw = row.get(&field.name).ok_or_else(|| missing(row, &field.name))?;
                let parsed: i64 = raw.trim().parse().map_err(|_| {
                    VectorError::Validation(format!(
                        "line {}: '{}' is not an integer for field '{}'",
                        row.line(),
                        raw,
                        field.name
                    ))
                })?;
                record.insert(field.name.clone(), Value::from(parsed));
            }
            FieldType::VarChar => {
                let raw = row.get(&field.name).ok_or_else(|| missing(row, &field.name))?;
                let value = match field.max_length {
                    Some(max) => truncate_with_marker(raw, max as usize),
                    None => raw.to_string(),
                };
                record.insert(field.name.clone(), Value::from(value));
            }
        }
    }

    Ok(record)
}

fn missing(row: &Row, field: &str) -> VectorError {
    VectorError::Validation(format!("line {}: missing value for field '{}'", row.line(), field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_sanitize_strips_disallowed_characters() {
        assert_eq!(
            sanitize_collection_name("Questions Master _ ChildOther").unwrap(),
            "QuestionsMaster_ChildOther"
        );
        assert_eq!(sanitize_collection_name("a-b.c/d").unwrap(), "abcd");
    }

    #[test]
    fn test_sanitize_rejects_empty_result() {
        assert!(matches!(
            sanitize_collection_name("-- !!"),
            Err(VectorError::Validation(_))
        ));
    }

    #[test]
    fn test_build_schema_from_header() {
        let schema = build_schema(
            &header(&["question_id", "question", "category"]),
            "question_id",
            256,
            "embedding",
            512,
        )
        .unwrap();

        assert_eq!(schema.fields.len(), 4);
        let primary = schema.primary_field().unwrap();
        assert_eq!(primary.name, "question_id");
        assert_eq!(primary.field_type, FieldType::Int64);

        let text = schema.field("question").unwrap();
        assert_eq!(text.field_type, FieldType::VarChar);
        assert_eq!(text.max_length, Some(256));

        let vector = schema.vector_field().unwrap();
        assert_eq!(vector.name, "embedding");
        assert_eq!(vector.dimension, Some(512));
    }

    #[test]
    fn test_build_schema_requires_primary_key_column() {
        let err = build_schema(&header(&["id", "title"]), "question_id", 256, "embedding", 8)
            .unwrap_err();
        assert!(err.to_string().contains("question_id"));
    }

    #[test]
    fn test_build_schema_rejects_vector_field_collision() {
        let result = build_schema(&header(&["id", "embedding"]), "id", 256, "embedding", 8);
        assert!(matches!(result, Err(VectorError::Validation(_))));
    }

    #[test]
    fn test_truncate_with_marker() {
        assert_eq!(truncate_with_marker("short", 10), "short");
        assert_eq!(truncate_with_marker("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_with_marker("abcdefghijkl", 10), "abcdefgh..");
        assert_eq!(truncate_with_marker("abcdefghijkl", 10).chars().count(), 10);
    }

    #[test]
    fn test_truncate_counts_bytes_on_char_boundaries() {
        // 'é' is two bytes: 8 bytes of budget keep three of them
        let out = truncate_with_marker("ééééééééééé", 8);
        assert_eq!(out, "ééé..");
        assert!(out.len() <= 8);

        // odd budgets never split a character
        let out = truncate_with_marker("ééééééééééé", 9);
        assert_eq!(out, "ééé..");

        // within the char count but over the byte limit
        let out = truncate_with_marker("日本語のテキスト", 10);
        assert_eq!(out, "日本..");
        assert!(out.len() <= 10);
    }

    #[test]
    fn test_to_record_converts_per_schema() {
        let schema = build_schema(&header(&["id", "title"]), "id", 8, "embedding", 2).unwrap();
        let row = Row::new(
            2,
            vec![
                ("id".into(), " 42 ".into()),
                ("title".into(), "a very long title".into()),
                ("extra".into(), "ignored".into()),
            ],
        );

        let record = to_record(&row, &schema, vec![0.5, 1.0]).unwrap();
        assert_eq!(record["id"], 42);
        assert_eq!(record["title"], "a very..");
        assert_eq!(record["embedding"], serde_json::json!([0.5, 1.0]));
        assert!(!record.contains_key("extra"));
    }

    #[test]
    fn test_to_record_rejects_bad_integer() {
        let schema = build_schema(&header(&["id", "title"]), "id", 16, "embedding", 2).unwrap();
        let row = Row::new(3, vec![("id".into(), "x1".into()), ("title".into(), "t".into())]);

        assert!(matches!(
            to_record(&row, &schema, vec![0.0, 0.0]),
            Err(VectorError::Validation(_))
        ));
    }

    #[test]
    fn test_to_record_rejects_wrong_dimension() {
        let schema = build_schema(&header(&["id", "title"]), "id", 16, "embedding", 3).unwrap();
        let row = Row::new(2, vec![("id".into(), "1".into()), ("title".into(), "t".into())]);

        assert!(to_record(&row, &schema, vec![0.0, 0.0]).is_err());
    }
}
