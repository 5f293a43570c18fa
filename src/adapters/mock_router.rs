use tracing::debug;

use crate::domain::mock::{MockOptions, MockRule, RouteDecision, UrlPattern};
use crate::domain::InterceptedRoute;
use crate::error::{MockError, MockResult};

/// Declarative interception rules for one browser context.
///
/// When several rules match a request, the most recently registered one
/// wins. This mirrors how browser drivers stack route handlers.
#[derive(Debug, Default)]
pub struct MockRouter {
    rules: Vec<MockRule>,
}

impl MockRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a rule. The body is normalized and parsed here, so a bad body
    /// fails before the page ever issues the request.
    pub fn register<P>(&mut self, pattern: P, options: MockOptions) -> MockResult<&MockRule>
    where
        P: TryInto<UrlPattern, Error = MockError>,
    {
        self.register_pattern(pattern.try_into()?, options)
    }

    /// Install a rule for an already compiled pattern
    pub fn register_pattern(&mut self, pattern: UrlPattern, options: MockOptions) -> MockResult<&MockRule> {
        let rule = MockRule::new(pattern, options)?;
        debug!(
            "Registered {:?} mock for {} {}",
            rule.action(),
            rule.method(),
            rule.pattern().as_str()
        );
        self.rules.push(rule);
        Ok(&self.rules[self.rules.len() - 1])
    }

    /// Register a fulfill rule with default options (`GET`, 200, `{}`)
    pub fn mock<P>(&mut self, pattern: P) -> MockResult<&MockRule>
    where
        P: TryInto<UrlPattern, Error = MockError>,
    {
        self.register(pattern, MockOptions::default())
    }

    /// Decide the fate of a request without touching the network.
    pub fn decide(&self, method: &str, url: &str) -> RouteDecision {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(method, url))
            .map(MockRule::decision)
            .unwrap_or(RouteDecision::Continue)
    }

    /// Apply the decision to a driver-owned route.
    ///
    /// Every route ends up fulfilled, aborted or continued, so the page never
    /// waits on an unanswered request.
    pub async fn handle<R>(&self, route: &mut R) -> MockResult<RouteDecision>
    where
        R: InterceptedRoute + ?Sized,
    {
        let decision = self.decide(route.method(), route.url());
        match &decision {
            RouteDecision::Fulfill { status, body } => {
                debug!("Fulfilling {} {} with {}", route.method(), route.url(), status);
                route.fulfill(*status, body).await?;
            }
            RouteDecision::Abort => {
                debug!("Aborting {} {}", route.method(), route.url());
                route.abort().await?;
            }
            RouteDecision::Continue => route.fallback().await?,
        }
        Ok(decision)
    }

    pub fn rules(&self) -> &[MockRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }
}
