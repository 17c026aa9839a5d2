use anyhow::Result;

use super::LinkhutClient;

impl LinkhutClient {
    /// Rename a tag on every bookmark that carries it.
    pub async fn rename_tag(&self, old_tag: &str, new_tag: &str) -> Result<bool> {
        let fields = [("old", old_tag.to_string()), ("new", new_tag.to_string())];
        let result = self.call_for_result("/v1/tags/rename", &fields).await?;
        Ok(result.as_deref() == Some("done"))
    }

    /// Remove a tag from every bookmark that carries it.
    pub async fn delete_tag(&self, tag: &str) -> Result<bool> {
        let fields = [("tag", tag.to_string())];
        let result = self.call_for_result("/v1/tags/delete", &fields).await?;
        Ok(result.as_deref() == Some("done"))
    }
}
