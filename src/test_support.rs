//! In-memory adapters for unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use usagewatch_adapters::{
    AdapterError, CodeLocation, FunctionRegistry, FunctionSpec, HistoryApi, HistoryPage,
    HistoryQuery, ObjectStore,
};
use usagewatch_types::Message;

/// A page of notifier messages at the given timestamps.
pub fn page(timestamps: &[f64], has_more: bool) -> HistoryPage {
    HistoryPage {
        messages: timestamps
            .iter()
            .map(|ts| Message::new("incoming-webhook", "laser is now available", *ts))
            .collect(),
        has_more,
    }
}

/// Replays a fixed sequence of responses, then empty final pages.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHistory {
    script: Arc<Mutex<VecDeque<Result<HistoryPage, AdapterError>>>>,
    queries: Arc<Mutex<Vec<HistoryQuery>>>,
}

impl ScriptedHistory {
    pub fn new(script: Vec<Result<HistoryPage, AdapterError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            queries: Arc::default(),
        }
    }

    pub fn queries(&self) -> Vec<HistoryQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryApi for ScriptedHistory {
    async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage, AdapterError> {
        self.queries.lock().unwrap().push(query.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(HistoryPage::default()))
    }
}

/// Keeps objects in memory and records public-read grants.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<Mutex<BTreeMap<(String, String), Vec<u8>>>>,
    public: Arc<Mutex<Vec<(String, String)>>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every write fails.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_public(&self, bucket: &str, key: &str) -> bool {
        self.public
            .lock()
            .unwrap()
            .contains(&(bucket.to_string(), key.to_string()))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), AdapterError> {
        if self.fail_writes {
            return Err(AdapterError::Http("API returned status 503 Service Unavailable".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), body);
        Ok(())
    }

    async fn set_public_read(&self, bucket: &str, key: &str) -> Result<(), AdapterError> {
        self.public
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        Ok(())
    }

    fn description(&self) -> &str {
        "memory"
    }
}

/// Function registry that records calls against a fixed set of existing names.
#[derive(Debug, Clone, Default)]
pub struct RecordingRegistry {
    existing: Vec<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingRegistry {
    pub fn with_existing(names: &[&str]) -> Self {
        Self {
            existing: names.iter().map(|n| n.to_string()).collect(),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FunctionRegistry for RecordingRegistry {
    async fn exists(&self, name: &str) -> Result<bool, AdapterError> {
        Ok(self.existing.iter().any(|n| n == name))
    }

    async fn create(&self, spec: &FunctionSpec, code: &CodeLocation) -> Result<(), AdapterError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create {} {}/{}", spec.name, code.bucket, code.key));
        Ok(())
    }

    async fn update_code(&self, name: &str, code: &CodeLocation) -> Result<(), AdapterError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("update {} {}/{}", name, code.bucket, code.key));
        Ok(())
    }
}
