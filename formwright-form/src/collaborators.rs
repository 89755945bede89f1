//! Collaborator interfaces: where configuration values come from and go to,
//! and how the user is asked questions.

use crate::error::{DialogError, IoError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Loads and saves configuration values by id.
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn load(&self, id: &str) -> Result<Value, IoError>;

    async fn save(&self, id: &str, value: &Value) -> Result<(), IoError>;
}

/// Outcome of a prompt dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptOutcome {
    Submitted(Value),
    Cancelled,
}

/// Asks the user something. Each call resolves exactly once.
#[async_trait]
pub trait Dialogs: Send + Sync {
    async fn confirm(&self, message: &str) -> Result<bool, DialogError>;

    async fn prompt(&self, message: &str, initial: Option<&Value>) -> Result<PromptOutcome, DialogError>;
}

/// Keeps values in memory. Useful for tests and the CLI.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one value.
    pub fn with_value(id: impl Into<String>, value: Value) -> Self {
        let mut values = HashMap::new();
        values.insert(id.into(), value);
        Self {
            values: RwLock::new(values),
        }
    }

    pub async fn get(&self, id: &str) -> Option<Value> {
        self.values.read().await.get(id).cloned()
    }
}

#[async_trait]
impl Persistence for InMemoryPersistence {
    async fn load(&self, id: &str) -> Result<Value, IoError> {
        self.values
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| IoError::new(format!("no configuration with id '{id}'")))
    }

    async fn save(&self, id: &str, value: &Value) -> Result<(), IoError> {
        self.values.write().await.insert(id.to_string(), value.clone());
        Ok(())
    }
}

/// Test doubles for collaborators.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Semaphore;

    /// Answers dialogs from queues filled in advance.
    #[derive(Debug, Default)]
    pub struct ScriptedDialogs {
        confirms: Mutex<VecDeque<bool>>,
        prompts: Mutex<VecDeque<PromptOutcome>>,
        asked: Mutex<Vec<String>>,
    }

    impl ScriptedDialogs {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn answer_confirm(self, answer: bool) -> Self {
            lock(&self.confirms).push_back(answer);
            self
        }

        pub fn answer_prompt(self, outcome: PromptOutcome) -> Self {
            lock(&self.prompts).push_back(outcome);
            self
        }

        /// Messages of every dialog shown so far.
        pub fn asked(&self) -> Vec<String> {
            lock(&self.asked).clone()
        }
    }

    #[async_trait]
    impl Dialogs for ScriptedDialogs {
        async fn confirm(&self, message: &str) -> Result<bool, DialogError> {
            lock(&self.asked).push(message.to_string());
            lock(&self.confirms).pop_front().ok_or(DialogError::Dismissed)
        }

        async fn prompt(&self, message: &str, _initial: Option<&Value>) -> Result<PromptOutcome, DialogError> {
            lock(&self.asked).push(message.to_string());
            lock(&self.prompts).pop_front().ok_or(DialogError::Dismissed)
        }
    }

    /// In-memory persistence whose saves block until released.
    #[derive(Debug)]
    pub struct GatedPersistence {
        inner: InMemoryPersistence,
        gate: Semaphore,
        save_calls: AtomicUsize,
        fail_next: AtomicBool,
    }

    impl Default for GatedPersistence {
        fn default() -> Self {
            Self {
                inner: InMemoryPersistence::new(),
                gate: Semaphore::new(0),
                save_calls: AtomicUsize::new(0),
                fail_next: AtomicBool::new(false),
            }
        }
    }

    impl GatedPersistence {
        pub fn new() -> Self {
            Self::default()
        }

        /// Lets one pending (or future) save proceed.
        pub fn release(&self) {
            self.gate.add_permits(1);
        }

        /// Makes the next save fail once it is released.
        pub fn fail_next(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }

        /// Number of saves that reached this collaborator.
        pub fn save_calls(&self) -> usize {
            self.save_calls.load(Ordering::SeqCst)
        }

        pub async fn stored(&self, id: &str) -> Option<Value> {
            self.inner.get(id).await
        }
    }

    #[async_trait]
    impl Persistence for GatedPersistence {
        async fn load(&self, id: &str) -> Result<Value, IoError> {
            self.inner.load(id).await
        }

        async fn save(&self, id: &str, value: &Value) -> Result<(), IoError> {
            self.save_calls.fetch_add(1, Ordering::SeqCst);
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| IoError::new("persistence closed"))?;
            permit.forget();
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(IoError::new("backend unavailable"));
            }
            self.inner.save(id, value).await
        }
    }

    fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
