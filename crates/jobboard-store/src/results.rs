//! Conversions from driver write results to client acknowledgments.

use mongodb::bson::Bson;
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};

use jobboard_models::{DeleteAck, InsertAck, UpdateAck};

use crate::json::bson_to_json;

/// Render a document id for clients (hex for ObjectIds).
pub fn id_to_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => bson_to_json(other).to_string(),
    }
}

pub fn insert_ack(result: InsertOneResult) -> InsertAck {
    InsertAck {
        acknowledged: true,
        inserted_id: id_to_string(result.inserted_id),
    }
}

pub fn update_ack(result: UpdateResult) -> UpdateAck {
    UpdateAck {
        acknowledged: true,
        matched_count: result.matched_count,
        modified_count: result.modified_count,
        upserted_count: u64::from(result.upserted_id.is_some()),
        upserted_id: result.upserted_id.map(id_to_string),
    }
}

pub fn delete_ack(result: DeleteResult) -> DeleteAck {
    DeleteAck {
        acknowledged: true,
        deleted_count: result.deleted_count,
    }
}
