//! In-memory [`JsonSource`] used by the unit tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::client::JsonSource;
use crate::error::Result;

// == Scripted Step ==
/// One scripted reply: wait `delay` (virtual time in paused tests), then answer.
#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub delay: Duration,
    pub reply: Result<Value>,
}

impl Step {
    pub fn ok(value: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            reply: Ok(value),
        }
    }

    pub fn err(err: crate::error::FetchError) -> Self {
        Self {
            delay: Duration::ZERO,
            reply: Err(err),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

// == Scripted Source ==
/// Replays scripted steps in order; the last step repeats once the script
/// runs out. Records every requested path.
#[derive(Debug, Default)]
pub(crate) struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl JsonSource for ScriptedSource {
    async fn get_json(&self, path: &str) -> Result<Value> {
        self.requests.lock().push(path.to_string());

        let step = {
            let next = self.steps.lock().pop_front();
            let mut last = self.last.lock();
            match next {
                Some(step) => {
                    *last = Some(step.clone());
                    step
                }
                None => last.clone().unwrap_or_else(|| Step::ok(Value::Null)),
            }
        };

        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        step.reply
    }
}
