use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::ServiceResult;
use crate::models::catalog::{Bhajan, Book, PanchangEntry, Vidhi};
use crate::models::page::{PageRequest, Paginated};
use crate::models::social::{Comment, NewReel, Notification, Reel, UserProfile};

/// Typed content queries against the hosted backend. List operations honor
/// the pagination contract (`has_more = page * page_size < total`).
#[async_trait]
pub trait DatabaseService: Send + Sync {
    async fn list_books(&self, page: PageRequest) -> ServiceResult<Paginated<Book>>;
    async fn get_book(&self, id: &str) -> ServiceResult<Book>;

    async fn list_bhajans(&self, page: PageRequest) -> ServiceResult<Paginated<Bhajan>>;
    async fn get_bhajan(&self, id: &str) -> ServiceResult<Bhajan>;

    async fn list_vidhis(&self, page: PageRequest) -> ServiceResult<Paginated<Vidhi>>;
    async fn get_vidhi(&self, id: &str) -> ServiceResult<Vidhi>;

    /// Soft-fail contract: a missing entry is `Ok(None)`, never an error.
    async fn get_panchang(
        &self,
        date: NaiveDate,
        city: &str,
    ) -> ServiceResult<Option<PanchangEntry>>;

    async fn list_reels(&self, page: PageRequest) -> ServiceResult<Paginated<Reel>>;
    async fn create_reel(&self, reel: NewReel) -> ServiceResult<Reel>;
    /// Returns the reel's updated like count.
    async fn like_reel(&self, reel_id: &str, user_id: &str) -> ServiceResult<u64>;
    async fn unlike_reel(&self, reel_id: &str, user_id: &str) -> ServiceResult<u64>;
    async fn add_comment(
        &self,
        reel_id: &str,
        user_id: &str,
        body: &str,
    ) -> ServiceResult<Comment>;
    async fn list_comments(
        &self,
        reel_id: &str,
        page: PageRequest,
    ) -> ServiceResult<Paginated<Comment>>;

    async fn follow_user(&self, follower_id: &str, followee_id: &str) -> ServiceResult<()>;
    async fn unfollow_user(&self, follower_id: &str, followee_id: &str) -> ServiceResult<()>;

    async fn list_notifications(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> ServiceResult<Paginated<Notification>>;
    async fn mark_notification_read(&self, id: &str) -> ServiceResult<()>;

    async fn get_profile(&self, user_id: &str) -> ServiceResult<UserProfile>;
    async fn update_profile(&self, profile: UserProfile) -> ServiceResult<UserProfile>;
}
