use serde_json::{map::Entry, Map, Value};

/// Turns a sequence of flat records into one record of columns.
///
/// Each key maps to the values it had in every record, in record order.
/// A record that lacks a key contributes nothing to that column, so columns
/// may differ in length.
pub fn transpose<I>(records: I) -> Map<String, Value>
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    let mut columns = Map::new();
    for record in records {
        for (key, value) in record {
            match columns.entry(key) {
                Entry::Vacant(column) => {
                    column.insert(Value::Array(vec![value]));
                }
                Entry::Occupied(mut column) => {
                    if let Value::Array(items) = column.get_mut() {
                        items.push(value);
                    }
                }
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_transpose_preserves_record_order() {
        let columns = transpose(vec![
            record(json!({"id": 1, "vlan": 100})),
            record(json!({"id": 2, "vlan": 200})),
            record(json!({"id": 3, "vlan": 300})),
        ]);

        assert_eq!(
            Value::Object(columns),
            json!({"id": [1, 2, 3], "vlan": [100, 200, 300]})
        );
    }

    #[test]
    fn test_missing_keys_are_not_padded() {
        let columns = transpose(vec![
            record(json!({"id": 1})),
            record(json!({"id": 2, "extra": "x"})),
        ]);

        assert_eq!(Value::Object(columns), json!({"id": [1, 2], "extra": ["x"]}));
    }

    #[test]
    fn test_empty_input_gives_empty_record() {
        assert!(transpose(Vec::new()).is_empty());
    }
}
