use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::catalog::Catalog;
use crate::error::{ServiceError, ServiceResult};
use crate::models::catalog::{Bhajan, Book, PanchangEntry, Vidhi};
use crate::models::page::{paginate, PageRequest, Paginated};
use crate::models::social::{
    Comment, NewReel, Notification, NotificationKind, Reel, UserProfile,
};
use crate::services::database_service::DatabaseService;

/// In-memory database over the injected catalog plus mutable social state.
/// Likes, comments and follows generate notifications for the affected user.
pub struct MockDatabaseService {
    catalog: Arc<Catalog>,
    reels: Mutex<Vec<Reel>>,
    likes: Mutex<HashSet<(String, String)>>,
    comments: Mutex<Vec<Comment>>,
    follows: Mutex<HashSet<(String, String)>>,
    notifications: Mutex<Vec<Notification>>,
    profiles: Mutex<HashMap<String, UserProfile>>,
    latency: Duration,
}

impl MockDatabaseService {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            reels: Mutex::new(Vec::new()),
            likes: Mutex::new(HashSet::new()),
            comments: Mutex::new(Vec::new()),
            follows: Mutex::new(HashSet::new()),
            notifications: Mutex::new(Vec::new()),
            profiles: Mutex::new(HashMap::new()),
            latency: Duration::from_millis(10),
        }
    }

    async fn simulate_latency(&self) {
        tokio::time::sleep(self.latency).await;
    }

    fn push_notification(&self, user_id: &str, kind: NotificationKind, message: String) {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Notification {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                kind,
                message,
                read: false,
                created_at: chrono::Utc::now().to_rfc3339(),
            });
    }

    fn reel_author(&self, reel_id: &str) -> ServiceResult<String> {
        self.reels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .find(|r| r.id == reel_id)
            .map(|r| r.author_id.clone())
            .ok_or_else(|| ServiceError::NotFound(format!("reel {reel_id}")))
    }

    fn set_reel_likes(&self, reel_id: &str, delta: i64) -> ServiceResult<u64> {
        let mut reels = self
            .reels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let reel = reels
            .iter_mut()
            .find(|r| r.id == reel_id)
            .ok_or_else(|| ServiceError::NotFound(format!("reel {reel_id}")))?;
        reel.likes = reel.likes.saturating_add_signed(delta);
        Ok(reel.likes)
    }
}

#[async_trait]
impl DatabaseService for MockDatabaseService {
    async fn list_books(&self, page: PageRequest) -> ServiceResult<Paginated<Book>> {
        self.simulate_latency().await;
        Ok(paginate(&self.catalog.books, page))
    }

    async fn get_book(&self, id: &str) -> ServiceResult<Book> {
        self.simulate_latency().await;
        self.catalog
            .book(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("book {id}")))
    }

    async fn list_bhajans(&self, page: PageRequest) -> ServiceResult<Paginated<Bhajan>> {
        self.simulate_latency().await;
        Ok(paginate(&self.catalog.bhajans, page))
    }

    async fn get_bhajan(&self, id: &str) -> ServiceResult<Bhajan> {
        self.simulate_latency().await;
        self.catalog
            .bhajan(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("bhajan {id}")))
    }

    async fn list_vidhis(&self, page: PageRequest) -> ServiceResult<Paginated<Vidhi>> {
        self.simulate_latency().await;
        Ok(paginate(&self.catalog.vidhis, page))
    }

    async fn get_vidhi(&self, id: &str) -> ServiceResult<Vidhi> {
        self.simulate_latency().await;
        self.catalog
            .vidhi(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("vidhi {id}")))
    }

    async fn get_panchang(
        &self,
        date: NaiveDate,
        city: &str,
    ) -> ServiceResult<Option<PanchangEntry>> {
        self.simulate_latency().await;
        let entry = self.catalog.panchang_for(date, city).cloned();
        if entry.is_none() {
            tracing::debug!(%date, city, "no panchang entry, returning empty");
        }
        Ok(entry)
    }

    async fn list_reels(&self, page: PageRequest) -> ServiceResult<Paginated<Reel>> {
        self.simulate_latency().await;
        let reels = self
            .reels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        Ok(paginate(&reels, page))
    }

    async fn create_reel(&self, reel: NewReel) -> ServiceResult<Reel> {
        self.simulate_latency().await;
        let created = Reel {
            id: uuid::Uuid::new_v4().to_string(),
            author_id: reel.author_id,
            caption: reel.caption,
            video_url: reel.video_url,
            likes: 0,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.reels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(created.clone());
        Ok(created)
    }

    async fn like_reel(&self, reel_id: &str, user_id: &str) -> ServiceResult<u64> {
        self.simulate_latency().await;
        let author = self.reel_author(reel_id)?;

        let inserted = self
            .likes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((reel_id.to_string(), user_id.to_string()));
        if !inserted {
            // already liked, count unchanged
            return self.set_reel_likes(reel_id, 0);
        }

        let count = self.set_reel_likes(reel_id, 1)?;
        if author != user_id {
            self.push_notification(
                &author,
                NotificationKind::Like,
                format!("{user_id} liked your reel"),
            );
        }
        Ok(count)
    }

    async fn unlike_reel(&self, reel_id: &str, user_id: &str) -> ServiceResult<u64> {
        self.simulate_latency().await;
        self.reel_author(reel_id)?;

        let removed = self
            .likes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&(reel_id.to_string(), user_id.to_string()));
        self.set_reel_likes(reel_id, if removed { -1 } else { 0 })
    }

    async fn add_comment(
        &self,
        reel_id: &str,
        user_id: &str,
        body: &str,
    ) -> ServiceResult<Comment> {
        self.simulate_latency().await;
        let author = self.reel_author(reel_id)?;

        let comment = Comment {
            id: uuid::Uuid::new_v4().to_string(),
            reel_id: reel_id.to_string(),
            author_id: user_id.to_string(),
            body: body.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.comments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(comment.clone());

        if author != user_id {
            self.push_notification(
                &author,
                NotificationKind::Comment,
                format!("{user_id} commented on your reel"),
            );
        }
        Ok(comment)
    }

    async fn list_comments(
        &self,
        reel_id: &str,
        page: PageRequest,
    ) -> ServiceResult<Paginated<Comment>> {
        self.simulate_latency().await;
        let comments: Vec<Comment> = self
            .comments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|c| c.reel_id == reel_id)
            .cloned()
            .collect();
        Ok(paginate(&comments, page))
    }

    async fn follow_user(&self, follower_id: &str, followee_id: &str) -> ServiceResult<()> {
        self.simulate_latency().await;
        if follower_id == followee_id {
            return Err(ServiceError::Unknown(
                "cannot follow yourself".to_string(),
            ));
        }

        let inserted = self
            .follows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((follower_id.to_string(), followee_id.to_string()));
        if inserted {
            let mut profiles = self
                .profiles
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(profile) = profiles.get_mut(followee_id) {
                profile.followers += 1;
            }
            if let Some(profile) = profiles.get_mut(follower_id) {
                profile.following += 1;
            }
            drop(profiles);
            self.push_notification(
                followee_id,
                NotificationKind::Follow,
                format!("{follower_id} started following you"),
            );
        }
        Ok(())
    }

    async fn unfollow_user(&self, follower_id: &str, followee_id: &str) -> ServiceResult<()> {
        self.simulate_latency().await;
        let removed = self
            .follows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&(follower_id.to_string(), followee_id.to_string()));
        if removed {
            let mut profiles = self
                .profiles
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(profile) = profiles.get_mut(followee_id) {
                profile.followers = profile.followers.saturating_sub(1);
            }
            if let Some(profile) = profiles.get_mut(follower_id) {
                profile.following = profile.following.saturating_sub(1);
            }
        }
        Ok(())
    }

    async fn list_notifications(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> ServiceResult<Paginated<Notification>> {
        self.simulate_latency().await;
        let mine: Vec<Notification> = self
            .notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        Ok(paginate(&mine, page))
    }

    async fn mark_notification_read(&self, id: &str) -> ServiceResult<()> {
        self.simulate_latency().await;
        let mut notifications = self
            .notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                Ok(())
            }
            None => Err(ServiceError::NotFound(format!("notification {id}"))),
        }
    }

    async fn get_profile(&self, user_id: &str) -> ServiceResult<UserProfile> {
        self.simulate_latency().await;
        self.profiles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(user_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("profile {user_id}")))
    }

    async fn update_profile(&self, profile: UserProfile) -> ServiceResult<UserProfile> {
        self.simulate_latency().await;
        self.profiles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(profile.user_id.clone(), profile.clone());
        Ok(profile)
    }
}
