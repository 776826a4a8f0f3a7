//! engine::stream
//!
//! The remaining raw tokens of one invocation.
//!
//! Only the phase currently running removes tokens, always from the head.

use std::collections::VecDeque;

/// Ordered, consumable argument tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgStream {
    tokens: VecDeque<String>,
}

impl ArgStream {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn peek(&self) -> Option<&str> {
        self.tokens.front().map(String::as_str)
    }

    pub fn pop(&mut self) -> Option<String> {
        self.tokens.pop_front()
    }

    /// Pop the head token only if it satisfies `pred`.
    pub fn pop_if(&mut self, pred: impl FnOnce(&str) -> bool) -> Option<String> {
        if self.peek().is_some_and(pred) {
            self.tokens.pop_front()
        } else {
            None
        }
    }

    /// Remove and return every remaining token.
    pub fn drain(&mut self) -> Vec<String> {
        self.tokens.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ArgStream {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}
