//! In-memory browser doubles for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use accessprobe_cdp::{CdpError, DeviceMetrics, NavigationOutcome};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::browser::{BrowserDriver, BrowserPage, PageProbe};
use crate::error::BrowserError;
use crate::extract::{script_category, Category};

/// Result for categories without a fixture: what a blank page would return.
pub(crate) fn empty_result(category: Category) -> Value {
    match category {
        Category::Html => json!("<html><head></head><body></body></html>"),
        Category::Metadata => json!({"title": "", "lang": null, "charset": "UTF-8"}),
        Category::Images => json!({"images": [], "backgrounds": []}),
        Category::Forms => json!({"inputs": [], "forms": []}),
        _ => json!([]),
    }
}

/// How a fake page responds to `navigate`.
#[derive(Debug, Clone)]
pub(crate) enum FakeNavigation {
    Loaded(Option<u16>),
    Fails(String),
    /// Never completes; the caller's timeout must fire.
    Hangs,
}

#[derive(Debug, Default)]
pub(crate) struct PageCounters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub evaluations: AtomicUsize,
}

impl PageCounters {
    pub fn open_pages(&self) -> usize {
        self.opened.load(Ordering::SeqCst) - self.closed.load(Ordering::SeqCst)
    }
}

/// Page that answers extractor scripts from canned JSON keyed by category.
#[derive(Debug, Clone)]
pub(crate) struct FakePage {
    fixtures: HashMap<Category, Value>,
    failures: HashMap<Category, String>,
    navigation: FakeNavigation,
    counters: Arc<PageCounters>,
    closed: Arc<AtomicBool>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            fixtures: HashMap::new(),
            failures: HashMap::new(),
            navigation: FakeNavigation::Loaded(Some(200)),
            counters: Arc::new(PageCounters::default()),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with(mut self, category: Category, value: Value) -> Self {
        self.fixtures.insert(category, value);
        self
    }

    pub fn failing(mut self, category: Category, message: &str) -> Self {
        self.failures.insert(category, message.to_string());
        self
    }

    pub fn navigation(mut self, navigation: FakeNavigation) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn counters(&self) -> &PageCounters {
        &self.counters
    }
}

#[async_trait]
impl PageProbe for FakePage {
    async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        self.counters.evaluations.fetch_add(1, Ordering::SeqCst);
        let category = script_category(expression)
            .ok_or_else(|| CdpError::JavaScript(format!("unexpected script: {expression:.40}")))?;
        if let Some(message) = self.failures.get(&category) {
            return Err(CdpError::JavaScript(message.clone()));
        }
        Ok(self
            .fixtures
            .get(&category)
            .cloned()
            .unwrap_or_else(|| empty_result(category)))
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn configure(&self, _metrics: DeviceMetrics, _user_agent: &str) -> Result<(), CdpError> {
        Ok(())
    }

    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<NavigationOutcome, CdpError> {
        match &self.navigation {
            FakeNavigation::Loaded(status) => Ok(NavigationOutcome {
                frame_id: "frame-1".into(),
                loader_id: Some("loader-1".into()),
                status: *status,
                elapsed: Duration::from_millis(5),
            }),
            FakeNavigation::Fails(reason) => {
                Err(CdpError::NavigationFailed(format!("{reason} ({url})")))
            }
            FakeNavigation::Hangs => {
                std::future::pending::<()>().await;
                Err(CdpError::SessionClosed)
            }
        }
    }

    async fn close(&self) -> Result<(), CdpError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Driver handing out clones of a template page, each with its own close flag.
pub(crate) struct FakeDriver {
    template: FakePage,
    refuse: Option<String>,
    pub shutdowns: AtomicUsize,
}

impl FakeDriver {
    pub fn new(template: FakePage) -> Self {
        Self {
            template,
            refuse: None,
            shutdowns: AtomicUsize::new(0),
        }
    }

    /// `new_page` fails as if Chrome could not be reached.
    pub fn unreachable(message: &str) -> Self {
        Self {
            refuse: Some(message.to_string()),
            ..Self::new(FakePage::new())
        }
    }

    pub fn counters(&self) -> &PageCounters {
        self.template.counters()
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    type Page = FakePage;

    async fn new_page(&self) -> Result<FakePage, BrowserError> {
        if let Some(message) = &self.refuse {
            return Err(BrowserError::ConnectionFailed(message.clone()));
        }
        self.template.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakePage {
            closed: Arc::new(AtomicBool::new(false)),
            ..self.template.clone()
        })
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
