use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use zerowaste_core_types::RecipeId;
use zerowaste_ranking::RankQuery;

use crate::error::SchedulerError;

pub const HANDSHAKE_TYPE: &str = "connected";
/// Envelope types that carry a ranking request.
pub const REQUEST_TYPES: [&str; 2] = ["run-request", "message"];

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InboundEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl InboundEnvelope {
    pub fn parse(raw: &str) -> Result<Self, SchedulerError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn is_handshake(&self) -> bool {
        self.kind == HANDSHAKE_TYPE
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RunRequest {
    pub email: String,
    #[serde(rename = "Allergens")]
    pub allergens: Vec<String>,
    #[serde(rename = "Preferences")]
    pub preferences: Vec<String>,
    #[serde(rename = "Difficulty", default)]
    pub difficulty: Option<Vec<i64>>,
    #[serde(rename = "Time", default)]
    pub time: Option<i64>,
    #[serde(rename = "Type", default)]
    pub types: Option<Vec<String>>,
    #[serde(rename = "Liked Recipes", default, deserialize_with = "lenient_ids")]
    pub liked: Option<Vec<RecipeId>>,
    #[serde(rename = "Disliked Recipes", default, deserialize_with = "lenient_ids")]
    pub disliked: Option<Vec<RecipeId>>,
    #[serde(rename = "Expiring Products", default)]
    pub expiring: Option<Vec<String>>,
}

impl RunRequest {
    /// Decode one raw inbound frame into a request.
    pub fn from_frame(raw: &str) -> Result<Self, SchedulerError> {
        let envelope = InboundEnvelope::parse(raw)?;
        if !REQUEST_TYPES.contains(&envelope.kind.as_str()) {
            return Err(SchedulerError::MalformedRequest(format!(
                "unexpected message type `{}`",
                envelope.kind
            )));
        }
        Ok(serde_json::from_value(envelope.payload)?)
    }

    pub fn to_query(&self) -> RankQuery {
        RankQuery {
            allergens: self.allergens.clone(),
            preferences: self.preferences.clone(),
            difficulty: self.difficulty.clone(),
            time: self.time,
            types: self.types.clone(),
            liked: self.liked.clone(),
            disliked: self.disliked.clone(),
            expiring: self.expiring.clone(),
        }
    }
}

/// Ids that cannot name a catalog recipe (negative, fractional, too large)
/// are dropped instead of failing the request.
fn lenient_ids<'de, D>(deserializer: D) -> Result<Option<Vec<RecipeId>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(values.map(|values| {
        values
            .iter()
            .filter_map(Value::as_u64)
            .filter_map(|id| u32::try_from(id).ok())
            .map(RecipeId)
            .collect()
    }))
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RunResponse {
    pub recipe_ids: Vec<RecipeId>,
    pub email: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum OutboundMessage {
    #[serde(rename = "run")]
    Run(RunResponse),
}

impl OutboundMessage {
    pub fn to_json(&self) -> Result<String, SchedulerError> {
        serde_json::to_string(self).map_err(|err| SchedulerError::Internal(err.to_string()))
    }
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub workers: usize,
    /// Upper bound on how long an idle worker waits before rechecking shutdown.
    pub poll_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            poll_interval: Duration::from_secs(1),
        }
    }
}
