//! Test helpers shared by unit and integration tests

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::confirm::{ConfirmRequest, Confirmer};

/// Confirmer answering from a queue and recording every question.
///
/// Once the queue is empty it answers with `fallback`.
#[derive(Debug, Default)]
pub struct ScriptedConfirmer {
    answers: VecDeque<bool>,
    fallback: bool,
    pub requests: Vec<ConfirmRequest>,
}

impl ScriptedConfirmer {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            fallback: false,
            requests: Vec::new(),
        }
    }

    pub fn always(answer: bool) -> Self {
        Self {
            answers: VecDeque::new(),
            fallback: answer,
            requests: Vec::new(),
        }
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        self.requests.push(request.clone());
        self.answers.pop_front().unwrap_or(self.fallback)
    }
}
