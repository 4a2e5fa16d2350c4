use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::AppError;
use crate::models::container::{ResourceContainer, ResourceKind};
use crate::models::notes::Topic;
use crate::models::paper::PastPaper;
use crate::models::question::Mcq;

/// Repository trait for resource container operations.
///
/// This trait allows mocking the persistence layer in tests.
/// Implementations validate payloads before persisting them, so nothing
/// invalid ever reaches storage.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Create a container or replace an existing one (matched by its
    /// subject/course/exam-board triple).
    async fn create_or_update(&self, container: ResourceContainer) -> Result<(), AppError>;

    /// Find a container by its subject/course/exam-board triple.
    async fn find_by_course(
        &self,
        subject: &str,
        course: &str,
        exam_board: &str,
    ) -> Result<Option<ResourceContainer>, AppError>;

    /// Find a container by id.
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<ResourceContainer>, AppError>;

    /// List every container, ordered by subject then course.
    async fn list_all(&self) -> Result<Vec<ResourceContainer>, AppError>;

    /// Append a revision-notes topic to the container, keeping the stored
    /// list sorted by `order`.
    ///
    /// Fails with [`AppError::Conflict`] when the container already holds
    /// a topic with the same `order`.
    async fn submit_topic(&self, container_id: &ObjectId, topic: &Topic) -> Result<(), AppError>;

    /// Append an MCQ to the named topic/sub-section of the exam-questions
    /// tree.
    async fn submit_question(
        &self,
        container_id: &ObjectId,
        topic_title: &str,
        sub_section_title: &str,
        question: &Mcq,
    ) -> Result<(), AppError>;

    /// Append a past paper to the container's flat list.
    async fn add_past_paper(
        &self,
        container_id: &ObjectId,
        paper: &PastPaper,
    ) -> Result<(), AppError>;

    /// Replace the past paper at `index`. Callers should re-fetch the
    /// container afterwards; there is no optimistic-lock token.
    async fn update_past_paper(
        &self,
        container_id: &ObjectId,
        index: usize,
        paper: &PastPaper,
    ) -> Result<(), AppError>;

    /// Delete the past paper at `index`.
    async fn delete_past_paper(
        &self,
        container_id: &ObjectId,
        index: usize,
    ) -> Result<(), AppError>;

    /// Toggle visibility of one resource kind. Idempotent; content is
    /// untouched.
    async fn set_enabled(
        &self,
        container_id: &ObjectId,
        kind: ResourceKind,
        enabled: bool,
    ) -> Result<(), AppError>;
}

/// MongoDB implementation of the ResourceRepository.
pub struct MongoResourceRepository {
    collection: mongodb::Collection<ResourceContainer>,
}

impl MongoResourceRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("resources"),
        }
    }

    fn now_bson() -> Result<mongodb::bson::Bson, AppError> {
        mongodb::bson::to_bson(&chrono::Utc::now())
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}

#[async_trait]
impl ResourceRepository for MongoResourceRepository {
    async fn create_or_update(&self, container: ResourceContainer) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::ReplaceOptions;

        let filter = doc! {
            "subject": &container.subject,
            "course": &container.course,
            "examBoard": &container.exam_board,
        };
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection
            .replace_one(filter, &container)
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn find_by_course(
        &self,
        subject: &str,
        course: &str,
        exam_board: &str,
    ) -> Result<Option<ResourceContainer>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! {
                "subject": subject,
                "course": course,
                "examBoard": exam_board,
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<ResourceContainer>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "_id": *id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<ResourceContainer>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "subject": 1, "course": 1 })
            .build();

        let mut cursor = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut containers = Vec::new();
        while let Some(container) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            containers.push(container);
        }

        Ok(containers)
    }

    async fn submit_topic(&self, container_id: &ObjectId, topic: &Topic) -> Result<(), AppError> {
        use mongodb::bson::{doc, to_bson};

        if topic.title.trim().is_empty() {
            return Err(AppError::BadRequest("Topic title cannot be empty".into()));
        }

        // Duplicate order is detected here, per item, so a bulk batch can
        // report it without aborting the remaining submissions.
        let conflict = self
            .collection
            .find_one(doc! {
                "_id": *container_id,
                "revisionNotes.topics.order": topic.order,
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if conflict.is_some() {
            return Err(AppError::Conflict("Order already exists".into()));
        }

        let topic_bson = to_bson(topic).map_err(|e| AppError::Internal(e.to_string()))?;

        let result = self
            .collection
            .update_one(
                doc! { "_id": *container_id },
                doc! {
                    "$push": {
                        "revisionNotes.topics": {
                            "$each": [topic_bson],
                            "$sort": { "order": 1 },
                        }
                    },
                    "$set": { "lastUpdated": Self::now_bson()? },
                },
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "No container with id {container_id}"
            )));
        }

        Ok(())
    }

    async fn submit_question(
        &self,
        container_id: &ObjectId,
        topic_title: &str,
        sub_section_title: &str,
        question: &Mcq,
    ) -> Result<(), AppError> {
        use mongodb::bson::{doc, to_bson};
        use mongodb::options::UpdateOptions;

        question.validate()?;

        let question_bson = to_bson(question).map_err(|e| AppError::Internal(e.to_string()))?;
        let options = UpdateOptions::builder()
            .array_filters(vec![
                doc! { "t.title": topic_title },
                doc! { "s.title": sub_section_title },
            ])
            .build();

        let result = self
            .collection
            .update_one(
                doc! { "_id": *container_id },
                doc! {
                    "$push": {
                        "examQuestions.topics.$[t].subSections.$[s].questions": question_bson
                    },
                    "$set": { "lastUpdated": Self::now_bson()? },
                },
            )
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "No container with id {container_id}"
            )));
        }
        if result.modified_count == 0 {
            return Err(AppError::NotFound(format!(
                "No sub-section '{sub_section_title}' under topic '{topic_title}'"
            )));
        }

        Ok(())
    }

    async fn add_past_paper(
        &self,
        container_id: &ObjectId,
        paper: &PastPaper,
    ) -> Result<(), AppError> {
        use mongodb::bson::{doc, to_bson};

        paper.validate()?;

        let paper_bson = to_bson(paper).map_err(|e| AppError::Internal(e.to_string()))?;

        let result = self
            .collection
            .update_one(
                doc! { "_id": *container_id },
                doc! {
                    "$push": { "pastPapers.papers": paper_bson },
                    "$set": { "lastUpdated": Self::now_bson()? },
                },
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "No container with id {container_id}"
            )));
        }

        Ok(())
    }

    async fn update_past_paper(
        &self,
        container_id: &ObjectId,
        index: usize,
        paper: &PastPaper,
    ) -> Result<(), AppError> {
        use mongodb::bson::{doc, to_bson, Document};

        paper.validate()?;

        let slot = format!("pastPapers.papers.{index}");

        // The filter asserts the slot exists, so an out-of-range index
        // surfaces as not-found instead of growing the array.
        let mut filter = doc! { "_id": *container_id };
        filter.insert(slot.as_str(), doc! { "$exists": true });

        let mut set = Document::new();
        set.insert(
            slot,
            to_bson(paper).map_err(|e| AppError::Internal(e.to_string()))?,
        );
        set.insert("lastUpdated", Self::now_bson()?);

        let result = self
            .collection
            .update_one(filter, doc! { "$set": set })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "No past paper at index {index} in container {container_id}"
            )));
        }

        Ok(())
    }

    async fn delete_past_paper(
        &self,
        container_id: &ObjectId,
        index: usize,
    ) -> Result<(), AppError> {
        use mongodb::bson::{doc, Bson, Document};

        let slot = format!("pastPapers.papers.{index}");

        let mut filter = doc! { "_id": *container_id };
        filter.insert(slot.as_str(), doc! { "$exists": true });

        // MongoDB cannot remove an array element by index directly: unset
        // the slot to null, then pull the null placeholder.
        let mut unset = Document::new();
        unset.insert(slot, 1_i32);

        let result = self
            .collection
            .update_one(filter, doc! { "$unset": unset })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "No past paper at index {index} in container {container_id}"
            )));
        }

        self.collection
            .update_one(
                doc! { "_id": *container_id },
                doc! {
                    "$pull": { "pastPapers.papers": Bson::Null },
                    "$set": { "lastUpdated": Self::now_bson()? },
                },
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn set_enabled(
        &self,
        container_id: &ObjectId,
        kind: ResourceKind,
        enabled: bool,
    ) -> Result<(), AppError> {
        use mongodb::bson::{doc, Document};

        let mut set = Document::new();
        set.insert(format!("{}.isEnabled", kind.field_name()), enabled);

        let result = self
            .collection
            .update_one(doc! { "_id": *container_id }, doc! { "$set": set })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "No container with id {container_id}"
            )));
        }

        Ok(())
    }
}
