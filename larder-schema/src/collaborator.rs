use serde::{Deserialize, Deserializer, Serialize};

use crate::resource::ResourceRef;

/// Bulk collaborator creation payload.
///
/// Both id lists are untrusted: they may overlap, repeat ids, or include the
/// resource owner. Each list accepts either a JSON array of integers or the
/// comma-separated string produced by picker widgets (`"3,7, 9"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorRequest {
    #[serde(flatten)]
    pub resource: ResourceRef,

    #[serde(default, alias = "user_ids", deserialize_with = "deserialize_id_list")]
    pub person_ids: Vec<i64>,

    #[serde(default, deserialize_with = "deserialize_id_list")]
    pub group_ids: Vec<i64>,
}

/// Query for the "who can I add" picker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateQuery {
    #[serde(default, alias = "q")]
    pub query: String,

    #[serde(
        default,
        alias = "ineligible_user_ids",
        deserialize_with = "deserialize_id_list"
    )]
    pub excluded_person_ids: Vec<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdList {
    One(i64),
    Many(Vec<IdItem>),
    Joined(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdItem {
    Number(i64),
    Text(String),
}

fn parse_id<E: serde::de::Error>(raw: &str) -> Result<i64, E> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| E::custom(format!("invalid id: {raw:?}")))
}

fn deserialize_id_list<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match IdList::deserialize(deserializer)? {
        IdList::One(id) => Ok(vec![id]),
        IdList::Many(items) => items
            .into_iter()
            .map(|item| match item {
                IdItem::Number(id) => Ok(id),
                IdItem::Text(s) => parse_id(&s),
            })
            .collect(),
        IdList::Joined(s) => s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(parse_id)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_legacy_field_names_and_joined_ids() {
        let req: CollaboratorRequest = serde_json::from_value(json!({
            "resourceable_type": "Package",
            "resourceable_id": 4,
            "user_ids": "3, 7,,9",
            "group_ids": 2,
        }))
        .expect("request deserializes");

        assert_eq!(req.resource, ResourceRef::new("Package", 4));
        assert_eq!(req.person_ids, vec![3, 7, 9]);
        assert_eq!(req.group_ids, vec![2]);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let req: CollaboratorRequest =
            serde_json::from_value(json!({"kind": "Tool", "id": 1})).expect("request deserializes");
        assert!(req.person_ids.is_empty());
        assert!(req.group_ids.is_empty());
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = serde_json::from_value::<CandidateQuery>(json!({
            "q": "jim",
            "ineligible_user_ids": ["1", "abc"],
        }));
        assert!(err.is_err());
    }
}
