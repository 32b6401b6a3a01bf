//! Scriptable in-memory session for exercising the automation stages
//! without a browser.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;

use super::error::{BrowserError, BrowserResult};
use super::session::{Interactability, PageSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement {
    pub id: u32,
}

impl FakeElement {
    pub fn new(id: u32) -> Self {
        Self { id }
    }
}

/// Fake [`PageSession`] that records every call and answers lookups
/// from scripted plans. Unscripted selectors match nothing; unscripted
/// elements report themselves usable.
#[derive(Default)]
pub struct FakeSession {
    pub url: String,
    pub calls: Vec<String>,
    redirects: HashMap<String, String>,
    find_queue: HashMap<String, VecDeque<Vec<FakeElement>>>,
    find_always: HashMap<String, Vec<FakeElement>>,
    interactability_queue: HashMap<u32, VecDeque<Interactability>>,
    interactability: HashMap<u32, Interactability>,
    click_failures: HashMap<u32, VecDeque<BrowserError>>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a navigation to `from` land on `to`, simulating a
    /// server-side redirect.
    pub fn redirect(&mut self, from: &str, to: &str) {
        self.redirects.insert(from.to_string(), to.to_string());
    }

    /// Script consecutive `find` results for a selector; once the queue
    /// drains, lookups fall back to [`always_find`] or nothing.
    ///
    /// [`always_find`]: FakeSession::always_find
    pub fn queue_find(&mut self, selector: &str, batches: Vec<Vec<FakeElement>>) {
        self.find_queue
            .insert(selector.to_string(), batches.into());
    }

    pub fn always_find(&mut self, selector: &str, elements: Vec<FakeElement>) {
        self.find_always.insert(selector.to_string(), elements);
    }

    pub fn set_interactability(&mut self, id: u32, state: Interactability) {
        self.interactability.insert(id, state);
    }

    /// Script consecutive interactability reports for an element; the
    /// final entry keeps repeating once reached.
    pub fn queue_interactability(&mut self, id: u32, states: Vec<Interactability>) {
        self.interactability_queue.insert(id, states.into());
    }

    pub fn fail_click_once(&mut self, id: u32, error: BrowserError) {
        self.click_failures
            .entry(id)
            .or_default()
            .push_back(error);
    }
}

#[async_trait(?Send)]
impl PageSession for FakeSession {
    type Element = FakeElement;

    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        self.calls.push(format!("navigate:{url}"));
        self.url = self
            .redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
        Ok(())
    }

    async fn current_url(&mut self) -> BrowserResult<String> {
        Ok(self.url.clone())
    }

    async fn find(&mut self, selector: &str) -> BrowserResult<Vec<FakeElement>> {
        self.calls.push(format!("find:{selector}"));
        if let Some(queue) = self.find_queue.get_mut(selector) {
            if let Some(batch) = queue.pop_front() {
                return Ok(batch);
            }
        }
        Ok(self
            .find_always
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn interactability(
        &mut self,
        element: &FakeElement,
    ) -> BrowserResult<Interactability> {
        self.calls.push(format!("interactability:{}", element.id));
        if let Some(queue) = self.interactability_queue.get_mut(&element.id) {
            if queue.len() > 1 {
                if let Some(state) = queue.pop_front() {
                    return Ok(state);
                }
            }
            if let Some(state) = queue.front() {
                return Ok(*state);
            }
        }
        Ok(self
            .interactability
            .get(&element.id)
            .copied()
            .unwrap_or(Interactability {
                displayed: true,
                enabled: true,
            }))
    }

    async fn scroll_into_view(&mut self, element: &FakeElement) -> BrowserResult<()> {
        self.calls.push(format!("scroll_into_view:{}", element.id));
        Ok(())
    }

    async fn scroll_by(&mut self, delta_y: f64) -> BrowserResult<()> {
        self.calls.push(format!("scroll_by:{delta_y}"));
        Ok(())
    }

    async fn click(&mut self, element: &FakeElement) -> BrowserResult<()> {
        self.calls.push(format!("click:{}", element.id));
        if let Some(failures) = self.click_failures.get_mut(&element.id) {
            if let Some(error) = failures.pop_front() {
                return Err(error);
            }
        }
        Ok(())
    }

    async fn clear(&mut self, element: &FakeElement) -> BrowserResult<()> {
        self.calls.push(format!("clear:{}", element.id));
        Ok(())
    }

    async fn type_text(&mut self, element: &FakeElement, text: &str) -> BrowserResult<()> {
        self.calls.push(format!("type:{}:{text}", element.id));
        Ok(())
    }

    async fn submit(&mut self, element: &FakeElement) -> BrowserResult<()> {
        self.calls.push(format!("submit:{}", element.id));
        Ok(())
    }
}
