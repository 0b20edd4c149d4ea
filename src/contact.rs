use chrono::Utc;

use crate::{content::ContactMessage, error::Result, storage::ContactStore};

/// 保存访客留言，不做校验和去重
pub async fn submit<S: ContactStore>(store: &S, mut message: ContactMessage) -> Result<()> {
    message.date_created = Utc::now();
    store.insert_contact(&message).await?;
    tracing::info!(subject = %message.subject, "contact message received");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_submit_stamps_time() {
        let store = MemoryStore::new();
        let before = Utc::now();
        submit(
            &store,
            ContactMessage {
                name: "Ann".into(),
                subject: "Hi".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let saved = store.contacts();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "Ann");
        assert!(saved[0].email.is_empty());
        assert!(saved[0].date_created >= before);
    }
}
