//! Row-level access to the health_documents table.
//!
//! One JSON document per user. The row key is derived from the user id
//! (`doc:{user_id}`) so the store's key space stays distinct from raw
//! identifiers.

use rusqlite::{params, Connection};

use super::StoreError;
use crate::models::{DayPlan, HealthDocument, Suggestion};

/// Store-internal row key for a user's document.
pub fn doc_key(user_id: &str) -> String {
    format!("doc:{user_id}")
}

/// Partial update applied by [`merge_document`].
///
/// The base score is immutable after creation and deliberately has no
/// field here.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub display_score: Option<u8>,
    pub suggestions: Option<Vec<Suggestion>>,
    pub daily_plan: Option<Vec<DayPlan>>,
}

impl DocumentPatch {
    fn apply(self, doc: &mut HealthDocument) {
        if let Some(score) = self.display_score {
            doc.display_score = score;
        }
        if let Some(suggestions) = self.suggestions {
            doc.suggestions = suggestions;
        }
        if let Some(daily_plan) = self.daily_plan {
            doc.daily_plan = daily_plan;
        }
    }
}

/// Get the stored document for a user. Returns None if absent.
pub fn get_document(
    conn: &Connection,
    user_id: &str,
) -> Result<Option<HealthDocument>, StoreError> {
    let mut stmt = conn.prepare("SELECT document FROM health_documents WHERE doc_key = ?1")?;
    match stmt.query_row([doc_key(user_id)], |row| row.get::<_, String>(0)) {
        Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StoreError::from(e)),
    }
}

/// Write the full document for a user (upsert, overwrites any prior state).
pub fn put_document(
    conn: &Connection,
    user_id: &str,
    doc: &HealthDocument,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(doc)?;
    conn.execute(
        "INSERT INTO health_documents (doc_key, user_id, document, updated_at)
         VALUES (?1, ?2, ?3, datetime('now'))
         ON CONFLICT(doc_key) DO UPDATE SET document = ?3, updated_at = datetime('now')",
        params![doc_key(user_id), user_id, json],
    )?;
    Ok(())
}

/// Apply a partial update to a user's stored document and return the merged
/// result. Read-modify-write runs inside a transaction so a partial state
/// never reaches disk.
///
/// Fails with [`StoreError::NotFound`] if no document exists for the user.
pub fn merge_document(
    conn: &mut Connection,
    user_id: &str,
    patch: DocumentPatch,
) -> Result<HealthDocument, StoreError> {
    let tx = conn.transaction()?;

    let mut doc = {
        let mut stmt = tx.prepare("SELECT document FROM health_documents WHERE doc_key = ?1")?;
        match stmt.query_row([doc_key(user_id)], |row| row.get::<_, String>(0)) {
            Ok(json) => serde_json::from_str::<HealthDocument>(&json)?,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(StoreError::NotFound {
                    user_id: user_id.to_string(),
                })
            }
            Err(e) => return Err(StoreError::from(e)),
        }
    };

    patch.apply(&mut doc);

    let json = serde_json::to_string(&doc)?;
    tx.execute(
        "UPDATE health_documents SET document = ?2, updated_at = datetime('now')
         WHERE doc_key = ?1",
        params![doc_key(user_id), json],
    )?;
    tx.commit()?;

    Ok(doc)
}

/// Delete a user's stored document. Deleting an absent document is a no-op.
pub fn delete_document(conn: &Connection, user_id: &str) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM health_documents WHERE doc_key = ?1",
        [doc_key(user_id)],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlanTask;
    use crate::store::sqlite::open_memory_database;

    fn sample_doc() -> HealthDocument {
        HealthDocument::new(
            60,
            vec![Suggestion {
                text: "Eat more vegetables".into(),
                completed: false,
            }],
            vec![DayPlan {
                day: 1,
                title: "Getting Started".into(),
                tasks: vec![
                    PlanTask {
                        text: "Walk 20 minutes".into(),
                        completed: false,
                    },
                    PlanTask {
                        text: "Drink 2L of water".into(),
                        completed: false,
                    },
                ],
            }],
        )
    }

    #[test]
    fn get_absent_document_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_document(&conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn put_then_get_round_trips() {
        let conn = open_memory_database().unwrap();
        let doc = sample_doc();
        put_document(&conn, "anon-user-1", &doc).unwrap();

        let loaded = get_document(&conn, "anon-user-1").unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn put_overwrites_prior_document() {
        let conn = open_memory_database().unwrap();
        put_document(&conn, "u", &sample_doc()).unwrap();

        let replacement = HealthDocument::new(85, vec![], vec![]);
        put_document(&conn, "u", &replacement).unwrap();

        let loaded = get_document(&conn, "u").unwrap().unwrap();
        assert_eq!(loaded, replacement);
    }

    #[test]
    fn merge_absent_document_fails_not_found() {
        let mut conn = open_memory_database().unwrap();
        let result = merge_document(&mut conn, "ghost", DocumentPatch::default());
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn merge_updates_only_patched_fields() {
        let mut conn = open_memory_database().unwrap();
        let doc = sample_doc();
        put_document(&conn, "u", &doc).unwrap();

        let mut suggestions = doc.suggestions.clone();
        suggestions[0].completed = true;
        let merged = merge_document(
            &mut conn,
            "u",
            DocumentPatch {
                display_score: Some(63),
                suggestions: Some(suggestions.clone()),
                daily_plan: None,
            },
        )
        .unwrap();

        assert_eq!(merged.display_score, 63);
        assert_eq!(merged.suggestions, suggestions);
        // Unpatched fields untouched
        assert_eq!(merged.base_score, doc.base_score);
        assert_eq!(merged.daily_plan, doc.daily_plan);

        let loaded = get_document(&conn, "u").unwrap().unwrap();
        assert_eq!(loaded, merged);
    }

    #[test]
    fn delete_removes_document() {
        let conn = open_memory_database().unwrap();
        put_document(&conn, "u", &sample_doc()).unwrap();
        delete_document(&conn, "u").unwrap();
        assert!(get_document(&conn, "u").unwrap().is_none());
        // Deleting again is a no-op
        delete_document(&conn, "u").unwrap();
    }

    #[test]
    fn doc_key_is_derived_but_distinct() {
        assert_eq!(doc_key("abc"), "doc:abc");
        assert_ne!(doc_key("abc"), "abc");
    }

    #[test]
    fn documents_are_isolated_per_user() {
        let conn = open_memory_database().unwrap();
        put_document(&conn, "alice", &sample_doc()).unwrap();
        let other = HealthDocument::new(30, vec![], vec![]);
        put_document(&conn, "bob", &other).unwrap();

        assert_eq!(get_document(&conn, "alice").unwrap().unwrap().base_score, Some(60));
        assert_eq!(get_document(&conn, "bob").unwrap().unwrap().base_score, Some(30));
    }
}
