use serde::{Deserialize, Deserializer, Serialize};

pub type PersonId = i64;

/// An assignable entity. Read-only from the client's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    #[serde(default)]
    pub name: String,
}

/// Convert a person selector value into a nullable numeric reference.
///
/// Empty or non-numeric input yields `None`. Integral decimals such as `"3.0"`
/// are accepted since selector values may come from a float-typed source.
pub fn to_nullable_number(val: &str) -> Option<PersonId> {
    let val = val.trim();
    if val.is_empty() {
        return None;
    }
    if let Ok(n) = val.parse::<PersonId>() {
        return Some(n);
    }
    let f = val.parse::<f64>().ok()?;
    integral(f)
}

fn integral(f: f64) -> Option<PersonId> {
    if f.is_finite() && f.fract() == 0.0 && f >= PersonId::MIN as f64 && f <= PersonId::MAX as f64 {
        Some(f as PersonId)
    } else {
        None
    }
}

/// Lenient `personId` decoding: numbers, numeric strings, `""` and `null`.
pub(crate) fn deserialize_person_id<'de, D>(deserializer: D) -> Result<Option<PersonId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Some(serde_json::Value::String(s)) => to_nullable_number(&s),
        Some(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_invalid_selectors_are_null() {
        assert_eq!(to_nullable_number(""), None);
        assert_eq!(to_nullable_number("   "), None);
        assert_eq!(to_nullable_number("bob"), None);
        assert_eq!(to_nullable_number("1.5"), None);
    }

    #[test]
    fn numeric_selectors_parse() {
        assert_eq!(to_nullable_number("7"), Some(7));
        assert_eq!(to_nullable_number(" 12 "), Some(12));
        assert_eq!(to_nullable_number("3.0"), Some(3));
        assert_eq!(to_nullable_number("-4"), Some(-4));
    }

    #[test]
    fn person_decodes_from_wire() {
        let p: Person = serde_json::from_str(r#"{"id": 2, "name": "Alice"}"#).unwrap();
        assert_eq!(p, Person { id: 2, name: "Alice".to_string() });
    }
}
