use crate::storage::Entry;
use migration::entities::url_entry;

/// 将 Sea-ORM Model 转换为 Entry
pub fn model_to_entry(model: url_entry::Model) -> Entry {
    Entry {
        token: model.token,
        original_url: model.original_url,
        expires_at: model.expires_at,
        id: model.id,
        created_at: model.created_at,
    }
}

/// 将 Entry 转换为 ActiveModel（仅用于插入）
pub fn entry_to_active_model(entry: &Entry) -> url_entry::ActiveModel {
    use sea_orm::ActiveValue::Set;

    url_entry::ActiveModel {
        token: Set(entry.token.clone()),
        id: Set(entry.id),
        original_url: Set(entry.original_url.clone()),
        expires_at: Set(entry.expires_at),
        created_at: Set(entry.created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::ActiveValue;

    #[test]
    fn test_model_to_entry_generated() {
        let expires = Utc::now() + Duration::days(7);
        let model = url_entry::Model {
            token: "1C".to_string(),
            id: Some(74),
            original_url: "https://example.com".to_string(),
            expires_at: Some(expires),
            created_at: Utc::now(),
        };

        let entry = model_to_entry(model);

        assert_eq!(entry.token, "1C");
        assert_eq!(entry.id, Some(74));
        assert_eq!(entry.original_url, "https://example.com");
        assert_eq!(entry.expires_at, Some(expires));
    }

    #[test]
    fn test_model_to_entry_custom_has_no_id() {
        let model = url_entry::Model {
            token: "my-link".to_string(),
            id: None,
            original_url: "https://example.com".to_string(),
            expires_at: None,
            created_at: Utc::now(),
        };

        let entry = model_to_entry(model);
        assert!(entry.id.is_none());
        assert!(entry.expires_at.is_none());
    }

    #[test]
    fn test_entry_to_active_model_sets_every_column() {
        let entry = Entry::generated(3, "3".to_string(), "https://target.com".to_string(), None);
        let active_model = entry_to_active_model(&entry);

        assert!(matches!(active_model.token, ActiveValue::Set(ref t) if t == "3"));
        assert!(matches!(active_model.id, ActiveValue::Set(Some(3))));
        assert!(matches!(active_model.original_url, ActiveValue::Set(_)));
        assert!(matches!(active_model.expires_at, ActiveValue::Set(None)));
        assert!(matches!(active_model.created_at, ActiveValue::Set(_)));
    }
}
