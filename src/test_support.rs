//! In-memory [`NodeCli`] for unit tests.

use std::convert::Infallible;

use crate::{error::AppError, node::NodeCli};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateKey(String),
    CreateSphere(String),
    SetCounterpart(String),
    Launch(Vec<String>),
}

/// Records every call. `fail_on` names a step (`"key create"`,
/// `"sphere create"`, `"sphere config set counterpart"`, `"serve"`) that
/// should return an error instead.
#[derive(Debug, Default)]
pub struct RecordingNode {
    pub calls: Vec<Call>,
    fail_on: Option<&'static str>,
}

impl RecordingNode {
    pub fn failing_on(step: &'static str) -> Self {
        Self { calls: Vec::new(), fail_on: Some(step) }
    }

    fn record(&mut self, step: &'static str, call: Call) -> Result<(), AppError> {
        self.calls.push(call);
        if self.fail_on == Some(step) {
            return Err(AppError::step(step, "exit status: 1"));
        }
        Ok(())
    }
}

impl NodeCli for RecordingNode {
    fn create_key(&mut self, name: &str) -> Result<(), AppError> {
        self.record("key create", Call::CreateKey(name.to_string()))
    }

    fn create_sphere(&mut self, owner_key: &str) -> Result<(), AppError> {
        self.record("sphere create", Call::CreateSphere(owner_key.to_string()))
    }

    fn set_counterpart(&mut self, counterpart: &str) -> Result<(), AppError> {
        self.record("sphere config set counterpart", Call::SetCounterpart(counterpart.to_string()))
    }

    fn launch(&mut self, args: &[String]) -> Result<Infallible, AppError> {
        self.calls.push(Call::Launch(args.to_vec()));
        Err(AppError::Launch("recording node does not exec".into()))
    }
}
