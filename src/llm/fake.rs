//! A scripted model for tests and offline demos.

use std::collections::VecDeque;
use std::sync::Mutex;

use futures::{
    FutureExt,
    future::BoxFuture,
    stream::{self, BoxStream, StreamExt},
};
use serde_json::json;

use crate::message::Message;
use crate::llm::{
    traits::LLM,
    tokens::TokenUsage,
    stream::StreamData,
    error::LLMError,
    GenerateResult,
    LLMResult,
};

/// Replays canned responses in order and records every prompt it receives.
#[derive(Debug, Default)]
pub struct FakeLLM {
    responses: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<Vec<Message>>>,
    usage: TokenUsage,
}

impl FakeLLM {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            seen: Mutex::new(Vec::new()),
            usage: TokenUsage::new(10, 5),
        }
    }

    /// Usage reported for every call.
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    /// The message lists passed to each call so far.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn next_response(&self, messages: &[Message]) -> LLMResult<String> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(messages.to_vec());
        }
        self.responses
            .lock()
            .map_err(|_| LLMError::InvalidResponse("fake llm state poisoned".into()))?
            .pop_front()
            .ok_or_else(|| LLMError::InvalidResponse("fake llm has no responses left".into()))
    }
}

impl LLM for FakeLLM {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> BoxFuture<'a, LLMResult<GenerateResult>> {
        async move {
            let text = self.next_response(messages)?;
            Ok(GenerateResult::from_generation(text, self.usage))
        }
        .boxed()
    }

    fn stream<'a>(&'a self, messages: &'a [Message]) -> BoxStream<'a, LLMResult<StreamData>> {
        match self.next_response(messages) {
            Ok(text) => {
                let usage = self.usage;
                let words: Vec<String> = text.split_inclusive(' ').map(str::to_string).collect();
                let last = words.len().saturating_sub(1);
                stream::iter(words.into_iter().enumerate().map(move |(i, word)| {
                    let tokens = (i == last).then_some(usage);
                    Ok(StreamData::new(json!({ "delta": word }), tokens, word))
                }))
                .boxed()
            }
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }
}
