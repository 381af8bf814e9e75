//! Input adapters.
//!
//! Both adapters produce [`RawRecord`]s and leave all checking to the validator.

use std::io::Read;

use serde_json::{Map, Value};

use crate::models::RawRecord;

/// Read every row of a CSV document with a header row.
///
/// Columns are matched by header name; unknown columns are ignored and missing
/// columns leave the field absent.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let columns = [
        column("first_name"),
        column("last_name"),
        column("type"),
        column("title"),
        column("email"),
        column("phone"),
        column("year"),
        column("birthday"),
        column("groups"),
    ];

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let [first_name, last_name, user_type, title, email, phone, year, birthday, groups] =
            columns.map(|idx| idx.and_then(|i| record.get(i)).map(str::to_string));

        rows.push(RawRecord {
            first_name,
            last_name,
            user_type,
            title,
            email,
            phone,
            year,
            birthday,
            groups,
            enable: None,
        });
    }

    Ok(rows)
}

/// Convert one element of a JSON batch into a raw record.
///
/// Numbers are accepted for text fields; `enable` must be a JSON boolean. Anything
/// that is not an object yields an empty record.
pub fn record_from_json(value: &Value) -> RawRecord {
    let Some(object) = value.as_object() else {
        return RawRecord::default();
    };

    RawRecord {
        first_name: text(object, "first_name"),
        last_name: text(object, "last_name"),
        user_type: text(object, "type"),
        title: text(object, "title"),
        email: text(object, "email"),
        phone: text(object, "phone"),
        year: text(object, "year"),
        birthday: text(object, "birthday"),
        groups: text(object, "groups"),
        enable: object.get("enable").and_then(Value::as_bool),
    }
}

fn text(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_csv_by_header_name() {
        let data = "\
email,first_name,last_name,type,title,phone,year,birthday,groups,notes
kd@example.com,Kyle,DeBarge,PLAYER,Infielder,337-555-0199,Senior,2001-01-01,\"hitters,pitchers\",x
";
        let rows = read_csv(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].first_name.as_deref(), Some("Kyle"));
        assert_eq!(rows[0].email.as_deref(), Some("kd@example.com"));
        assert_eq!(rows[0].groups.as_deref(), Some("hitters,pitchers"));
        assert_eq!(rows[0].enable, None);
    }

    #[test]
    fn test_read_csv_missing_columns_and_short_rows() {
        let data = "first_name,last_name,type\nMatt,Deggs\n";
        let rows = read_csv(data.as_bytes()).unwrap();

        assert_eq!(rows[0].last_name.as_deref(), Some("Deggs"));
        assert_eq!(rows[0].user_type, None);
        assert_eq!(rows[0].email, None);
    }

    #[test]
    fn test_read_csv_keeps_empty_cells() {
        let data = "first_name,last_name,year\nMatt,,\n";
        let rows = read_csv(data.as_bytes()).unwrap();

        assert_eq!(rows[0].last_name.as_deref(), Some(""));
    }

    #[test]
    fn test_record_from_json() {
        let record = record_from_json(&json!({
            "first_name": "Kyle",
            "last_name": "DeBarge",
            "type": "RECRUIT",
            "phone": 3375550199u64,
            "groups": "hitters",
            "enable": false
        }));

        assert_eq!(record.user_type.as_deref(), Some("RECRUIT"));
        assert_eq!(record.phone.as_deref(), Some("3375550199"));
        assert_eq!(record.enable, Some(false));
        assert_eq!(record.title, None);
    }

    #[test]
    fn test_record_from_json_enable_must_be_boolean() {
        let record = record_from_json(&json!({ "enable": "true" }));
        assert_eq!(record.enable, None);
    }

    #[test]
    fn test_record_from_json_non_object() {
        assert_eq!(record_from_json(&json!("hello")), RawRecord::default());
    }
}
