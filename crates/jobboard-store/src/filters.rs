//! Filter, update and pipeline builders.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};

use jobboard_models::{CategoryCount, JobFilter, ReviewChanges, ReviewFilter};

use crate::error::{StoreError, StoreResult};
use crate::json::bson_to_json;

/// Fields searched by the job `search` term.
pub const JOB_SEARCH_FIELDS: [&str; 3] = ["title", "summary", "category"];

/// Parse a path id into an ObjectId.
pub fn parse_object_id(id: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

/// `{ _id: <id> }`
pub fn id_filter(id: &str) -> StoreResult<Document> {
    Ok(doc! { "_id": parse_object_id(id)? })
}

/// `{ _id: <id>, userEmail: <owner> }`
pub fn owned_filter(id: &str, owner: &str) -> StoreResult<Document> {
    Ok(doc! { "_id": parse_object_id(id)?, "userEmail": owner })
}

/// Build the job listing filter.
///
/// The search term is matched literally: regex metacharacters are escaped
/// before the case-insensitive `$regex` is built.
pub fn job_filter(filter: &JobFilter) -> Document {
    let mut query = Document::new();

    if let Some(category) = &filter.category {
        query.insert("category", category.as_str());
    }

    if let Some(term) = &filter.search {
        let pattern = regex::escape(term);
        let clauses: Vec<Bson> = JOB_SEARCH_FIELDS
            .iter()
            .map(|field| {
                let mut clause = Document::new();
                clause.insert(*field, doc! { "$regex": pattern.as_str(), "$options": "i" });
                Bson::Document(clause)
            })
            .collect();
        query.insert("$or", clauses);
    }

    query
}

/// Sort applied to every job listing.
pub fn job_sort() -> Document {
    doc! { "postedDate": -1 }
}

/// Build the review listing filter.
pub fn review_filter(filter: &ReviewFilter) -> Document {
    let mut query = Document::new();
    if let Some(job_id) = filter.job_id.as_deref().filter(|s| !s.is_empty()) {
        query.insert("jobId", job_id);
    }
    if let Some(email) = filter.user_email.as_deref().filter(|s| !s.is_empty()) {
        query.insert("userEmail", email);
    }
    query
}

/// Sort applied to review listings.
pub fn review_sort() -> Document {
    doc! { "createdAt": -1 }
}

/// `$set` document for a review edit.
pub fn review_update(changes: &ReviewChanges) -> Document {
    let mut set = doc! { "updatedAt": changes.updated_at.as_str() };
    if let Some(text) = &changes.text {
        set.insert("text", text.as_str());
    }
    if let Some(rating) = changes.rating {
        set.insert("rating", rating);
    }
    doc! { "$set": set }
}

/// Aggregation grouping jobs by category, largest groups first.
pub fn category_stats_pipeline() -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$category", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1, "_id": 1 } },
    ]
}

/// Convert `$group` output rows into category counts.
///
/// Keys that are null, missing, empty, `false` or zero all count as
/// uncategorized and are merged into one row.
pub fn category_counts(groups: Vec<Document>) -> StoreResult<Vec<CategoryCount>> {
    let mut counts: Vec<CategoryCount> = Vec::with_capacity(groups.len());

    for mut group in groups {
        let count = match group.get("count") {
            Some(Bson::Int32(n)) => u64::try_from(*n).unwrap_or(0),
            Some(Bson::Int64(n)) => u64::try_from(*n).unwrap_or(0),
            Some(Bson::Double(n)) if *n >= 0.0 => *n as u64,
            other => {
                return Err(StoreError::invalid_document(format!(
                    "category group without a count: {:?}",
                    other
                )))
            }
        };

        let entry = CategoryCount::new(category_label(group.remove("_id")), count);
        match counts.iter_mut().find(|c| c.category == entry.category) {
            Some(existing) => existing.count += entry.count,
            None => counts.push(entry),
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    Ok(counts)
}

fn category_label(key: Option<Bson>) -> Option<String> {
    match key? {
        Bson::Null | Bson::Undefined | Bson::Boolean(false) | Bson::Int32(0) | Bson::Int64(0) => {
            None
        }
        Bson::Double(n) if n == 0.0 || n.is_nan() => None,
        Bson::String(s) => Some(s),
        other => Some(bson_to_json(other).to_string()),
    }
}
