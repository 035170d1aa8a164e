//! Request-level operations and their status mapping.
//!
//! Each operation has a typed form returning `Result`, and a JSON form
//! that maps the outcome onto a [`ServiceResponse`]:
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | Success | 200 | operation result |
//! | `NotReady` | 503 | `{"error": msg, "retryable": true}` |
//! | Any other error | 400 | `{"error": msg}` |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::allocation::{GreedyAllocator, WorkloadKpi};
use crate::config::AllotConfig;
use crate::error::{AllotError, Result};
use crate::models::{Distribution, Task};
use crate::store::{ModelStore, Readiness};
use crate::training::{self, TrainingReport};

/// Body of a distribution request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributeRequest {
    /// Tasks to distribute.
    pub data: Vec<Task>,
    /// Candidate assignees, in tie-break order.
    #[serde(rename = "selectedAssignees")]
    pub selected_assignees: Vec<String>,
}

/// Body of a training request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainRequest {
    /// Historical task records.
    pub data: Vec<Task>,
}

/// Status code and JSON body of a handled request.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    /// HTTP-style status code.
    pub status: u16,
    /// JSON response body.
    pub body: Value,
}

impl ServiceResponse {
    /// A 200 response carrying `body`.
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// Maps an error onto 503 (retryable) or 400.
    pub fn from_error(err: &AllotError) -> Self {
        if err.is_retryable() {
            Self {
                status: 503,
                body: json!({ "error": err.to_string(), "retryable": true }),
            }
        } else {
            Self {
                status: 400,
                body: json!({ "error": err.to_string() }),
            }
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Store status report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// Whether a model is installed and loadable.
    pub ready: bool,
    /// Store generation at the time of the report.
    pub generation: u64,
    /// Where the model artifact lives.
    pub model_path: String,
}

/// Allocation service over a model store.
#[derive(Debug)]
pub struct AllotService {
    store: ModelStore,
    config: AllotConfig,
}

impl AllotService {
    /// Creates a service whose store lives at `config.model.path`.
    pub fn new(config: AllotConfig) -> Self {
        Self {
            store: ModelStore::new(config.model.path.clone()),
            config,
        }
    }

    /// The underlying model store.
    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// The configuration the service runs with.
    pub fn config(&self) -> &AllotConfig {
        &self.config
    }

    /// Distributes tasks with the current model.
    ///
    /// Waits for the model per `model.readiness`. On success each task
    /// carries its derived `class`.
    pub fn distribute(&self, request: &mut DistributeRequest) -> Result<Distribution> {
        let loaded = self.store.wait_for_model(&self.config.model.readiness)?;
        let allocator =
            GreedyAllocator::from_artifact(&loaded.artifact).with_cost_model(self.config.cost);
        let distribution = allocator.distribute(&mut request.data, &request.selected_assignees)?;

        let kpi = WorkloadKpi::calculate(&distribution, &self.config.cost);
        info!(
            generation = loaded.generation,
            tasks = kpi.total_tasks,
            imbalance_days = kpi.imbalance_days,
            "distribution served"
        );
        Ok(distribution)
    }

    /// Trains a model on `request.data` and installs it.
    pub fn train(&self, request: &TrainRequest) -> Result<TrainingReport> {
        let (artifact, report) = training::train(&request.data, &self.config.training)?;
        self.store.install(&artifact)?;
        Ok(report)
    }

    /// Deletes the model. Succeeds when none exists.
    pub fn delete_model(&self) -> Result<bool> {
        self.store.delete()
    }

    /// Reports readiness without waiting.
    pub fn status(&self) -> StatusReport {
        let (ready, generation) = match self.store.readiness() {
            Readiness::Ready { generation } => (true, generation),
            Readiness::NotReady => (false, self.store.generation()),
        };
        StatusReport {
            ready,
            generation,
            model_path: self.store.path().display().to_string(),
        }
    }

    /// JSON form of [`Self::distribute`]. Body: assignee → tasks.
    pub fn handle_distribute(&self, body: Value) -> ServiceResponse {
        respond(
            parse::<DistributeRequest>(body)
                .and_then(|mut request| self.distribute(&mut request))
                .and_then(|distribution| Ok(serde_json::to_value(distribution)?)),
        )
    }

    /// JSON form of [`Self::train`]. Body: the training report.
    pub fn handle_train(&self, body: Value) -> ServiceResponse {
        respond(
            parse::<TrainRequest>(body)
                .and_then(|request| self.train(&request))
                .and_then(|report| Ok(serde_json::to_value(report)?)),
        )
    }

    /// JSON form of [`Self::delete_model`].
    pub fn handle_delete_model(&self) -> ServiceResponse {
        respond(
            self.delete_model()
                .map(|_| json!({ "message": "Model file deleted successfully." })),
        )
    }

    /// JSON form of [`Self::status`].
    pub fn handle_status(&self) -> ServiceResponse {
        respond(serde_json::to_value(self.status()).map_err(AllotError::from))
    }
}

fn parse<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body)
        .map_err(|e| AllotError::InvalidInput(format!("malformed request: {e}")))
}

fn respond(result: Result<Value>) -> ServiceResponse {
    match result {
        Ok(body) => ServiceResponse::ok(body),
        Err(err) => {
            warn!(error = %err, "request failed");
            ServiceResponse::from_error(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{BaggedTrees, DecisionTree, ModelArtifact, TreeNode};
    use crate::features::FeatureSchema;
    use crate::models::EffortClass;
    use crate::store::ReadinessPolicy;
    use std::path::Path;

    fn service(dir: &Path) -> AllotService {
        let mut config = AllotConfig::default();
        config.model.path = dir.join("model.json");
        config.model.readiness = ReadinessPolicy::immediate();
        config.training.n_estimators = 5;
        config.training.balance = false;
        AllotService::new(config)
    }

    /// alice → class 1, anyone else → class 3.
    fn alice_is_fast() -> ModelArtifact {
        let tree = DecisionTree::from_nodes(vec![
            TreeNode::Split {
                feature: 0,
                threshold: 0.5,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf {
                distribution: [0.0, 0.0, 1.0],
            },
            TreeNode::Leaf {
                distribution: [1.0, 0.0, 0.0],
            },
        ]);
        let model = BaggedTrees::new(2, vec![tree]).unwrap();
        ModelArtifact::new(model, FeatureSchema::new(["alice", "bob"]).unwrap()).unwrap()
    }

    fn distribute_body() -> Value {
        json!({
            "data": [
                { "burnedPoints": 1.0 },
                { "burnedPoints": 3.0 }
            ],
            "selectedAssignees": ["bob", "alice"]
        })
    }

    #[test]
    fn test_distribute_without_model_is_503() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let resp = svc.handle_distribute(distribute_body());
        assert_eq!(resp.status, 503);
        assert_eq!(resp.body["retryable"], json!(true));
    }

    #[test]
    fn test_distribute_ok() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        svc.store().install(&alice_is_fast()).unwrap();

        let resp = svc.handle_distribute(distribute_body());
        assert!(resp.is_success());
        assert_eq!(
            resp.body,
            json!({
                "bob": [],
                "alice": [
                    { "title": "task1", "best_class_estimated": 1 },
                    { "title": "task2", "best_class_estimated": 1 }
                ]
            })
        );
    }

    #[test]
    fn test_distribute_keeps_assignee_order() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        svc.store().install(&alice_is_fast()).unwrap();

        let resp = svc.handle_distribute(distribute_body());
        let keys: Vec<&str> = resp
            .body
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["bob", "alice"]);
        assert_eq!(serde_json::to_string(&resp.body).unwrap().find("bob"), Some(2));
    }

    #[test]
    fn test_distribute_tags_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        svc.store().install(&alice_is_fast()).unwrap();

        let mut request: DistributeRequest = serde_json::from_value(distribute_body()).unwrap();
        svc.distribute(&mut request).unwrap();
        let classes: Vec<_> = request.data.iter().map(Task::class).collect();
        assert_eq!(
            classes,
            [Some(EffortClass::Medium), Some(EffortClass::High)]
        );
    }

    #[test]
    fn test_empty_assignees_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        svc.store().install(&alice_is_fast()).unwrap();

        let resp = svc.handle_distribute(json!({ "data": [], "selectedAssignees": [] }));
        assert_eq!(resp.status, 400);
        assert!(resp.body.get("retryable").is_none());
    }

    #[test]
    fn test_malformed_request_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let resp = svc.handle_distribute(json!({ "data": "nope" }));
        assert_eq!(resp.status, 400);
        assert!(resp.body["error"].as_str().unwrap().contains("malformed request"));
    }

    #[test]
    fn test_delete_model_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        svc.store().install(&alice_is_fast()).unwrap();

        for _ in 0..2 {
            let resp = svc.handle_delete_model();
            assert_eq!(resp.status, 200);
            assert_eq!(resp.body["message"], "Model file deleted successfully.");
        }
        assert!(!svc.status().ready);
    }

    #[test]
    fn test_train_installs_model() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let records: Vec<Value> = (0..6)
            .map(|i| {
                json!({
                    "burnedPoints": if i % 2 == 0 { 0.2 } else { 3.0 },
                    "assignees": [if i % 2 == 0 { "alice" } else { "bob" }]
                })
            })
            .collect();

        let resp = svc.handle_train(json!({ "data": records }));
        assert!(resp.is_success(), "{:?}", resp.body);
        assert_eq!(resp.body["records"], 6);
        assert_eq!(resp.body["trees"], 5);

        let status = svc.status();
        assert!(status.ready);
        assert_eq!(status.generation, 1);
    }

    #[test]
    fn test_status_body() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let resp = svc.handle_status();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["ready"], false);
        assert_eq!(resp.body["generation"], 0);
    }
}
