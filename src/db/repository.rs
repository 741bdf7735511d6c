use async_trait::async_trait;

use crate::db::json_store::JsonStore;
use crate::db::models::{Post, PostFilter, SortOrder};
use crate::error::AppError;

const NOT_AUTHOR: &str = "You do not have permission to perform this action";

/// Repository trait for chirp operations.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Store a new chirp under the next free id.
    async fn create_post(&self, body: &str, author_id: i64) -> Result<Post, AppError>;

    /// Soft-delete a chirp. Only its author may do so.
    ///
    /// An unknown id behaves like a chirp written by account `0`: any real
    /// requester gets `Unauthorized`, not `NotFound`.
    async fn delete_post(&self, id: i64, requester_id: i64) -> Result<(), AppError>;

    /// List visible chirps matching `filter`, sorted by id.
    async fn list_posts(&self, filter: PostFilter, order: SortOrder)
        -> Result<Vec<Post>, AppError>;

    /// Fetch a visible chirp by id.
    async fn get_post(&self, id: i64) -> Result<Post, AppError>;
}

#[async_trait]
impl PostRepository for JsonStore {
    async fn create_post(&self, body: &str, author_id: i64) -> Result<Post, AppError> {
        let post = self
            .mutate(|doc| {
                let post = Post {
                    author_id,
                    body: body.to_string(),
                    id: doc.next_post_id()?,
                    deleted: false,
                };
                doc.chirps.insert(post.id, post.clone());
                Ok(post)
            })
            .await?;

        tracing::debug!(post_id = post.id, author_id, "chirp created");
        Ok(post)
    }

    async fn delete_post(&self, id: i64, requester_id: i64) -> Result<(), AppError> {
        self.mutate(|doc| match doc.chirps.get_mut(&id) {
            Some(post) if post.author_id == requester_id => {
                post.deleted = true;
                Ok(())
            }
            Some(_) => Err(AppError::Unauthorized(NOT_AUTHOR.into())),
            None if requester_id != Post::default().author_id => {
                Err(AppError::Unauthorized(NOT_AUTHOR.into()))
            }
            None => Err(AppError::NotFound(format!("Chirp {id} not found"))),
        })
        .await?;

        tracing::debug!(post_id = id, requester_id, "chirp deleted");
        Ok(())
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        order: SortOrder,
    ) -> Result<Vec<Post>, AppError> {
        let mut posts = self
            .read(|doc| {
                Ok(doc
                    .chirps
                    .values()
                    .filter(|post| filter.matches(post))
                    .cloned()
                    .collect::<Vec<_>>())
            })
            .await?;

        match order {
            SortOrder::Asc => posts.sort_by_key(|post| post.id),
            SortOrder::Desc => posts.sort_by_key(|post| std::cmp::Reverse(post.id)),
        }

        Ok(posts)
    }

    async fn get_post(&self, id: i64) -> Result<Post, AppError> {
        self.read(|doc| {
            doc.chirps
                .get(&id)
                .filter(|post| !post.deleted)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Chirp not found".into()))
        })
        .await
    }
}
