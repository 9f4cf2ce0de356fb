//! Records returned by the lookup service.
//!
//! Both record types are immutable once decoded; a new query replaces the whole
//! collection rather than merging into it.

use lookup_types::DocumentNumber;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::hash::Hash;

/// A person returned by the document-number search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "Abrev_Tipo_Doc", deserialize_with = "null_as_empty")]
    pub document_type: String,
    #[serde(rename = "Numero_Documento")]
    pub document_number: DocumentNumber,
    #[serde(rename = "Fecha_Nacimiento", deserialize_with = "null_as_empty")]
    pub birth_date: String,
    #[serde(rename = "Genero", deserialize_with = "null_as_empty")]
    pub gender: String,
    /// Age in years; the service leaves it null when the birth date is unknown.
    #[serde(rename = "EDAD", default)]
    pub age: Option<u32>,
}

impl Person {
    /// Identity key used for list rendering.
    pub fn key(&self) -> &DocumentNumber {
        &self.document_number
    }

    /// Short label such as `DNI: 12345678`.
    pub fn label(&self) -> String {
        format!("{}: {}", self.document_type, self.document_number)
    }

    /// Age for display, `-` when unknown.
    pub fn age_text(&self) -> String {
        self.age.map_or_else(|| "-".to_string(), |age| age.to_string())
    }
}

/// Composite identity of an attention event within one query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttentionKey {
    pub visit_id: String,
    pub item_code: String,
}

impl std::fmt::Display for AttentionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.visit_id, self.item_code)
    }
}

/// A clinical attention event for one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttentionEvent {
    /// Row number as assigned by the service, when present.
    #[serde(rename = "N", default, deserialize_with = "lenient_opt_string")]
    pub row_number: Option<String>,
    #[serde(rename = "Id_Cita", deserialize_with = "string_or_number")]
    pub visit_id: String,
    #[serde(rename = "F_ATENCION", deserialize_with = "null_as_empty")]
    pub visit_date: String,
    #[serde(rename = "Codigo_Item", deserialize_with = "null_as_empty")]
    pub item_code: String,
    #[serde(rename = "Descripcion_Item", deserialize_with = "null_as_empty")]
    pub item_description: String,
    #[serde(rename = "LAB1", default, deserialize_with = "null_as_empty")]
    pub lab1: String,
    #[serde(rename = "LAB2", default, deserialize_with = "null_as_empty")]
    pub lab2: String,
    #[serde(rename = "LAB3", default, deserialize_with = "null_as_empty")]
    pub lab3: String,
    #[serde(rename = "F_REGISTRO", deserialize_with = "null_as_empty")]
    pub registered_at: String,
    #[serde(rename = "F_MODIFICACION", default)]
    pub modified_at: Option<String>,
    #[serde(rename = "ESTABLECIMIENTO", deserialize_with = "null_as_empty")]
    pub facility: String,
    #[serde(rename = "DISTRITO | PROVINCIA", deserialize_with = "null_as_empty")]
    pub district_province: String,
    #[serde(rename = "SISTEMA", default)]
    pub system: Option<String>,
    #[serde(rename = "REGISTRADOR", deserialize_with = "null_as_empty")]
    pub registered_by: String,
}

impl AttentionEvent {
    pub fn key(&self) -> AttentionKey {
        AttentionKey {
            visit_id: self.visit_id.clone(),
            item_code: self.item_code.clone(),
        }
    }
}

/// Drops later records whose key was already seen, keeping the first.
///
/// Returns the surviving records and the keys that were dropped.
pub(crate) fn dedupe_by_key<T, K, F>(items: Vec<T>, key: F) -> (Vec<T>, Vec<K>)
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(items.len());
    let mut dropped = Vec::new();
    let kept = items
        .into_iter()
        .filter(|item| {
            let k = key(item);
            if seen.insert(k.clone()) {
                true
            } else {
                dropped.push(k);
                false
            }
        })
        .collect();
    (kept, dropped)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::Text(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn person(ndoc: &str) -> Person {
        Person {
            document_type: "DNI".into(),
            document_number: DocumentNumber::new(ndoc).unwrap(),
            birth_date: "1990-04-12".into(),
            gender: "F".into(),
            age: Some(34),
        }
    }

    pub fn attention(visit_id: &str, item_code: &str) -> AttentionEvent {
        AttentionEvent {
            row_number: None,
            visit_id: visit_id.into(),
            visit_date: "2024-03-01".into(),
            item_code: item_code.into(),
            item_description: format!("item {item_code}"),
            lab1: String::new(),
            lab2: String::new(),
            lab3: String::new(),
            registered_at: "2024-03-01 10:00:00".into(),
            modified_at: None,
            facility: "Centro de Salud Norte".into(),
            district_province: "Lima | Lima".into(),
            system: None,
            registered_by: "operator".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn decodes_person_payload_names() {
        let json = r#"{
            "Abrev_Tipo_Doc": "DNI",
            "Numero_Documento": "12345678",
            "Fecha_Nacimiento": "1990-04-12",
            "Genero": "F",
            "EDAD": 34
        }"#;
        let person: Person = serde_json::from_str(json).expect("person should decode");
        assert_eq!(person, fixtures::person("12345678"));
        assert_eq!(person.key().as_str(), "12345678");
        assert_eq!(person.label(), "DNI: 12345678");
    }

    #[test]
    fn decodes_person_with_long_number_and_null_age() {
        let json = r#"{
            "Abrev_Tipo_Doc": "CE",
            "Numero_Documento": "000123456789012345678901",
            "Fecha_Nacimiento": null,
            "Genero": "M",
            "EDAD": null
        }"#;
        let person: Person = serde_json::from_str(json).expect("person should decode");
        assert_eq!(person.document_number.as_str(), "000123456789012345678901");
        assert_eq!(person.age, None);
        assert_eq!(person.age_text(), "-");
        assert_eq!(person.birth_date, "");
        assert_eq!(person.label(), "CE: 000123456789012345678901");
    }

    #[test]
    fn decodes_person_without_age_field() {
        let json = r#"{
            "Abrev_Tipo_Doc": "DNI",
            "Numero_Documento": 12345678,
            "Fecha_Nacimiento": "1990-04-12",
            "Genero": "F"
        }"#;
        let person: Person = serde_json::from_str(json).expect("person should decode");
        assert_eq!(person.document_number.as_str(), "12345678");
        assert_eq!(person.age, None);
    }

    #[test]
    fn decodes_attention_with_nulls_and_numeric_visit_id() {
        let json = r#"{
            "N": 1,
            "Id_Cita": 99812,
            "F_ATENCION": "2024-03-01",
            "Codigo_Item": "Z001",
            "Descripcion_Item": "Control",
            "LAB1": null,
            "LAB2": "A",
            "F_REGISTRO": "2024-03-01 10:00:00",
            "F_MODIFICACION": null,
            "ESTABLECIMIENTO": "Centro de Salud Norte",
            "DISTRITO | PROVINCIA": "Lima | Lima",
            "SISTEMA": null,
            "REGISTRADOR": "operator"
        }"#;
        let event: AttentionEvent = serde_json::from_str(json).expect("attention should decode");
        assert_eq!(event.row_number.as_deref(), Some("1"));
        assert_eq!(event.visit_id, "99812");
        assert_eq!(event.lab1, "");
        assert_eq!(event.lab2, "A");
        assert_eq!(event.lab3, "");
        assert_eq!(event.modified_at, None);
        assert_eq!(event.system, None);
        assert_eq!(event.key().to_string(), "99812-Z001");
    }

    #[test]
    fn dedupe_keeps_first_occurrence_in_order() {
        let items = vec![
            attention("1", "A"),
            attention("2", "B"),
            attention("1", "A"),
            attention("3", "C"),
        ];
        let (kept, dropped) = dedupe_by_key(items, AttentionEvent::key);
        let keys: Vec<String> = kept.iter().map(|a| a.key().to_string()).collect();
        assert_eq!(keys, vec!["1-A", "2-B", "3-C"]);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].to_string(), "1-A");
    }
}
