//! JSON rows to containers and back.

use remap_api::{Container, Mapping, Sequence, Shape, Value};

/// Container of `shape` holding the scalars of `json`.
///
/// Arrays become sequences, objects become mappings. Returns `Ok(None)` when
/// the JSON value does not fit `shape`.
pub fn to_container(
    json: serde_json::Value,
    shape: Shape,
) -> Result<Option<Container>, serde_json::Error> {
    let container = match (json, shape) {
        (serde_json::Value::Array(items), Shape::Sequence(element)) => {
            let items = items
                .into_iter()
                .map(serde_json::from_value::<Value>)
                .collect::<Result<Vec<_>, _>>()?;
            Container::Sequence(Sequence { element, items })
        }
        (serde_json::Value::Object(entries), Shape::Mapping(value)) => {
            let entries = entries
                .into_iter()
                .map(|(k, v)| serde_json::from_value::<Value>(v).map(|v| (k, v)))
                .collect::<Result<_, _>>()?;
            Container::Mapping(Mapping { value, entries })
        }
        _ => return Ok(None),
    };
    Ok(Some(container))
}

/// JSON rendering of a sequence or mapping. Records render as `null`.
pub fn to_json(container: &Container) -> Result<serde_json::Value, serde_json::Error> {
    match container {
        Container::Sequence(seq) => serde_json::to_value(&seq.items),
        Container::Mapping(map) => serde_json::to_value(&map.entries),
        Container::Record(_) => Ok(serde_json::Value::Null),
    }
}

/// Name of the JSON value a shape is read from.
pub fn expected(shape: Shape) -> &'static str {
    match shape {
        Shape::Sequence(_) => "array",
        Shape::Mapping(_) => "object",
        Shape::Record { .. } => "record",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remap_api::Kind;
    use serde_json::json;

    #[test]
    fn array_to_sequence() {
        let container = to_container(json!(["a", 1, -2, 1.5, true, null]), Shape::Sequence(Kind::Any))
            .unwrap()
            .unwrap();
        assert_eq!(
            container.as_sequence().map(|s| s.items.clone()),
            Some(vec![
                Value::from("a"),
                Value::Int(1),
                Value::Int(-2),
                Value::Float(1.5),
                Value::Bool(true),
                Value::Null,
            ])
        );
        assert_eq!(container.shape(), Shape::Sequence(Kind::Any));
    }

    #[test]
    fn object_to_mapping() {
        let container = to_container(json!({"id": 7, "name": "x"}), Shape::Mapping(Kind::Any))
            .unwrap()
            .unwrap();
        let map = container.as_mapping().unwrap();
        assert_eq!(map.get("id"), Some(&Value::Int(7)));
        assert_eq!(map.get("name"), Some(&Value::from("x")));
    }

    #[test]
    fn wrong_shape_is_none() {
        assert!(to_container(json!({"a": 1}), Shape::Sequence(Kind::Any)).unwrap().is_none());
        assert!(to_container(json!([1]), Shape::Mapping(Kind::Any)).unwrap().is_none());
    }

    #[test]
    fn nested_values_are_rejected() {
        assert!(to_container(json!([[1]]), Shape::Sequence(Kind::Any)).is_err());
    }

    #[test]
    fn renders_scalars() {
        let seq = Container::from(Sequence::from_values(Kind::Any, [Value::Int(-1), Value::Null]));
        assert_eq!(to_json(&seq).unwrap(), json!([-1, null]));

        let map = Container::from(Mapping::from_entries(Kind::String, [("b", "2"), ("a", "1")]));
        assert_eq!(to_json(&map).unwrap().to_string(), r#"{"a":"1","b":"2"}"#);
    }
}
