use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::backend::live::client::BackendClient;
use crate::error::{ServiceError, ServiceResult};
use crate::models::catalog::{Bhajan, Book, PanchangEntry, Vidhi};
use crate::models::page::{PageRequest, Paginated};
use crate::models::social::{
    Comment, NewReel, Notification, Reel, UserProfile,
};
use crate::services::database_service::DatabaseService;

/// Typed queries against `/rest/v1`. Social/reels operations have no backing
/// tables yet and uniformly report `not_implemented`.
pub struct LiveDatabaseService {
    client: Arc<BackendClient>,
}

impl LiveDatabaseService {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }

    fn reels_not_ready<T>() -> ServiceResult<T> {
        Err(ServiceError::NotImplemented(
            "reels are not available on this backend yet".to_string(),
        ))
    }
}

#[async_trait]
impl DatabaseService for LiveDatabaseService {
    async fn list_books(&self, page: PageRequest) -> ServiceResult<Paginated<Book>> {
        self.client.get_paginated("books", &[], page).await
    }

    async fn get_book(&self, id: &str) -> ServiceResult<Book> {
        self.client
            .get_row("books", &[("id", format!("eq.{id}"))], &format!("book {id}"))
            .await
    }

    async fn list_bhajans(&self, page: PageRequest) -> ServiceResult<Paginated<Bhajan>> {
        self.client.get_paginated("bhajans", &[], page).await
    }

    async fn get_bhajan(&self, id: &str) -> ServiceResult<Bhajan> {
        self.client
            .get_row(
                "bhajans",
                &[("id", format!("eq.{id}"))],
                &format!("bhajan {id}"),
            )
            .await
    }

    async fn list_vidhis(&self, page: PageRequest) -> ServiceResult<Paginated<Vidhi>> {
        self.client.get_paginated("vidhis", &[], page).await
    }

    async fn get_vidhi(&self, id: &str) -> ServiceResult<Vidhi> {
        self.client
            .get_row(
                "vidhis",
                &[("id", format!("eq.{id}"))],
                &format!("vidhi {id}"),
            )
            .await
    }

    async fn get_panchang(
        &self,
        date: NaiveDate,
        city: &str,
    ) -> ServiceResult<Option<PanchangEntry>> {
        let entry = self
            .client
            .get_optional_row(
                "panchang",
                &[
                    ("date", format!("eq.{date}")),
                    ("city", format!("ilike.{city}")),
                ],
            )
            .await?;
        if entry.is_none() {
            tracing::debug!(%date, city, "no panchang entry, returning empty");
        }
        Ok(entry)
    }

    async fn list_reels(&self, _page: PageRequest) -> ServiceResult<Paginated<Reel>> {
        Self::reels_not_ready()
    }

    async fn create_reel(&self, _reel: NewReel) -> ServiceResult<Reel> {
        Self::reels_not_ready()
    }

    async fn like_reel(&self, _reel_id: &str, _user_id: &str) -> ServiceResult<u64> {
        Self::reels_not_ready()
    }

    async fn unlike_reel(&self, _reel_id: &str, _user_id: &str) -> ServiceResult<u64> {
        Self::reels_not_ready()
    }

    async fn add_comment(
        &self,
        _reel_id: &str,
        _user_id: &str,
        _body: &str,
    ) -> ServiceResult<Comment> {
        Self::reels_not_ready()
    }

    async fn list_comments(
        &self,
        _reel_id: &str,
        _page: PageRequest,
    ) -> ServiceResult<Paginated<Comment>> {
        Self::reels_not_ready()
    }

    async fn follow_user(&self, _follower_id: &str, _followee_id: &str) -> ServiceResult<()> {
        Self::reels_not_ready()
    }

    async fn unfollow_user(&self, _follower_id: &str, _followee_id: &str) -> ServiceResult<()> {
        Self::reels_not_ready()
    }

    async fn list_notifications(
        &self,
        _user_id: &str,
        _page: PageRequest,
    ) -> ServiceResult<Paginated<Notification>> {
        Self::reels_not_ready()
    }

    async fn mark_notification_read(&self, _id: &str) -> ServiceResult<()> {
        Self::reels_not_ready()
    }

    async fn get_profile(&self, user_id: &str) -> ServiceResult<UserProfile> {
        self.client
            .get_row(
                "profiles",
                &[("user_id", format!("eq.{user_id}"))],
                &format!("profile {user_id}"),
            )
            .await
    }

    async fn update_profile(&self, profile: UserProfile) -> ServiceResult<UserProfile> {
        self.client.upsert("profiles", &profile).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_social_operations_report_not_implemented() {
        let client = Arc::new(BackendClient::new("https://api.bhakti.app", "anon"));
        let db = LiveDatabaseService::new(client);

        let err = db.list_reels(PageRequest::default()).await.unwrap_err();
        assert_eq!(err.code(), "not_implemented");

        let err = db.like_reel("r1", "u1").await.unwrap_err();
        assert_eq!(err.code(), "not_implemented");

        let err = db.follow_user("u1", "u2").await.unwrap_err();
        assert_eq!(err.code(), "not_implemented");
    }
}
