//! In-process replay of fixed HTML pages
//!
//! `StaticDomSession` evaluates CSS selectors with `scraper` against pages
//! registered on a [`StaticSite`]. Clicks can swap the page, follow a link
//! or set cookies, which is enough to model description tabs and login
//! forms. Sessions record what they did in a shared [`SessionStats`].
//!
//! `scraper::Html` is not `Send`, so the raw markup is stored and parsed per
//! query inside synchronous helpers; no parsed DOM is held across `.await`.

use parking_lot::Mutex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

use super::types::{ElementSnapshot, SessionCookie, SessionError};
use super::{BrowserSession, SessionFactory};

/// What a click on a registered selector does
#[derive(Debug, Clone, Default)]
pub struct ClickEffect {
    replace_html: Option<String>,
    navigate_to: Option<String>,
    set_cookies: Vec<SessionCookie>,
    requires_filled: Vec<(String, String)>,
}

impl ClickEffect {
    /// Replace the current document, e.g. a tab revealing hidden content
    #[must_use]
    pub fn replace_html(html: impl Into<String>) -> Self {
        Self {
            replace_html: Some(html.into()),
            ..Self::default()
        }
    }

    /// Load another registered page, e.g. a post-login redirect
    #[must_use]
    pub fn navigate_to(url: impl Into<String>) -> Self {
        Self {
            navigate_to: Some(url.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn set_cookie(mut self, cookie: SessionCookie) -> Self {
        self.set_cookies.push(cookie);
        self
    }

    /// Only fire when `selector` was filled with exactly `value`
    #[must_use]
    pub fn requires(mut self, selector: impl Into<String>, value: impl Into<String>) -> Self {
        self.requires_filled.push((selector.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone)]
enum PageSource {
    Fixed(String),
    /// Rendered differently depending on whether a cookie is present
    Gated {
        cookie: String,
        authorized: String,
        anonymous: String,
    },
}

/// Callback run whenever a registered URL is loaded
#[derive(Clone)]
struct VisitHook(Arc<dyn Fn() + Send + Sync>);

impl fmt::Debug for VisitHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VisitHook")
    }
}

/// A fixed set of pages keyed by normalized absolute URL
#[derive(Debug, Clone, Default)]
pub struct StaticSite {
    pages: HashMap<String, PageSource>,
    clicks: HashMap<(String, String), ClickEffect>,
    visits: HashMap<String, VisitHook>,
    latency: Duration,
}

fn normalize(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_string(), |u| u.to_string())
}

impl StaticSite {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(normalize(url), PageSource::Fixed(html.into()));
        self
    }

    /// Page that renders `authorized` only when `cookie` is in the jar
    #[must_use]
    pub fn gated_page(
        mut self,
        url: &str,
        cookie: impl Into<String>,
        authorized: impl Into<String>,
        anonymous: impl Into<String>,
    ) -> Self {
        self.pages.insert(
            normalize(url),
            PageSource::Gated {
                cookie: cookie.into(),
                authorized: authorized.into(),
                anonymous: anonymous.into(),
            },
        );
        self
    }

    #[must_use]
    pub fn on_click(mut self, url: &str, selector: impl Into<String>, effect: ClickEffect) -> Self {
        self.clicks.insert((normalize(url), selector.into()), effect);
        self
    }

    /// Run `hook` each time `url` is loaded, after the page is in place
    #[must_use]
    pub fn on_visit(mut self, url: &str, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.visits.insert(normalize(url), VisitHook(Arc::new(hook)));
        self
    }

    /// Delay applied to every navigation and reload
    #[must_use]
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn render(&self, url: &str, jar: &[SessionCookie]) -> Option<String> {
        match self.pages.get(url)? {
            PageSource::Fixed(html) => Some(html.clone()),
            PageSource::Gated {
                cookie,
                authorized,
                anonymous,
            } => {
                let allowed = jar.iter().any(|c| &c.name == cookie);
                let html = if allowed { authorized } else { anonymous };
                Some(html.clone())
            }
        }
    }
}

/// Counters shared by every session a [`StaticDomFactory`] opens
#[derive(Debug, Default)]
pub struct SessionStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
    quit: AtomicUsize,
    live: AtomicUsize,
    peak_live: AtomicUsize,
    cookies_added: AtomicUsize,
    navigations: Mutex<Vec<String>>,
    clicks: Mutex<Vec<String>>,
}

impl SessionStats {
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn quit(&self) -> usize {
        self.quit.load(Ordering::SeqCst)
    }

    /// Highest number of sessions alive at the same time
    #[must_use]
    pub fn peak_live(&self) -> usize {
        self.peak_live.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn cookies_added(&self) -> usize {
        self.cookies_added.load(Ordering::SeqCst)
    }

    /// Every URL loaded by `navigate` across all sessions, in call order
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }

    /// Number of `force_click` calls on `selector`, whether or not it fired
    #[must_use]
    pub fn clicks_on(&self, selector: &str) -> usize {
        self.clicks.lock().iter().filter(|s| *s == selector).count()
    }

    /// Number of loads of `url`
    #[must_use]
    pub fn navigations_to(&self, url: &str) -> usize {
        let url = normalize(url);
        self.navigations.lock().iter().filter(|u| **u == url).count()
    }
}

#[derive(Debug, Default)]
struct PageState {
    url: Option<String>,
    html: String,
    jar: Vec<SessionCookie>,
    filled: HashMap<String, String>,
    closed: bool,
}

/// One replay session over a shared [`StaticSite`]
#[derive(Debug)]
pub struct StaticDomSession {
    site: Arc<StaticSite>,
    stats: Arc<SessionStats>,
    state: Mutex<PageState>,
}

fn parse_selector(selector: &str) -> Result<Selector, SessionError> {
    Selector::parse(selector)
        .map_err(|e| SessionError::Browser(format!("invalid selector '{selector}': {e:?}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn snapshot(element: ElementRef<'_>, attributes: &[&str]) -> ElementSnapshot {
    let attributes = attributes
        .iter()
        .filter_map(|name| {
            element
                .value()
                .attr(name)
                .map(|v| ((*name).to_string(), v.to_string()))
        })
        .collect();
    ElementSnapshot {
        text: element_text(element),
        attributes,
    }
}

impl StaticDomSession {
    #[must_use]
    pub fn new(site: Arc<StaticSite>, stats: Arc<SessionStats>) -> Self {
        Self {
            site,
            stats,
            state: Mutex::new(PageState::default()),
        }
    }

    fn load(&self, url: &str) -> Result<(), SessionError> {
        let url = normalize(url);
        let mut state = self.state.lock();
        if state.closed {
            return Err(SessionError::Browser("page is closed".into()));
        }
        let html = self
            .site
            .render(&url, &state.jar)
            .ok_or_else(|| SessionError::Navigation {
                url: url.clone(),
                message: "404 Not Found".into(),
            })?;
        state.html = html;
        state.url = Some(url.clone());
        state.filled.clear();
        drop(state);

        if let Some(VisitHook(hook)) = self.site.visits.get(&url) {
            hook();
        }
        Ok(())
    }

    /// Run `f` on a freshly parsed copy of the current document
    fn with_dom<R>(&self, f: impl FnOnce(&Html) -> R) -> Result<R, SessionError> {
        let html = {
            let state = self.state.lock();
            if state.closed {
                return Err(SessionError::Browser("page is closed".into()));
            }
            if state.url.is_none() {
                return Err(SessionError::Browser("no page loaded".into()));
            }
            state.html.clone()
        };
        let document = Html::parse_document(&html);
        Ok(f(&document))
    }

    fn select_all(&self, selector: &str, attributes: &[&str]) -> Result<Vec<ElementSnapshot>, SessionError> {
        let parsed = parse_selector(selector)?;
        self.with_dom(|dom| dom.select(&parsed).map(|el| snapshot(el, attributes)).collect())
    }

    fn exists(&self, selector: &str) -> Result<bool, SessionError> {
        let parsed = parse_selector(selector)?;
        self.with_dom(|dom| dom.select(&parsed).next().is_some())
    }

    fn apply_click(&self, selector: &str) -> Result<(), SessionError> {
        if !self.exists(selector)? {
            return Err(SessionError::not_found(selector));
        }
        let effect = {
            let state = self.state.lock();
            let url = state.url.clone().unwrap_or_default();
            match self.site.clicks.get(&(url, selector.to_string())) {
                Some(effect)
                    if effect
                        .requires_filled
                        .iter()
                        .all(|(sel, value)| state.filled.get(sel) == Some(value)) =>
                {
                    effect.clone()
                }
                _ => return Ok(()),
            }
        };

        {
            let mut state = self.state.lock();
            state.jar.extend(effect.set_cookies.iter().cloned());
            if let Some(html) = effect.replace_html {
                state.html = html;
            }
        }
        if let Some(target) = effect.navigate_to {
            self.load(&target)?;
        }
        Ok(())
    }
}

impl BrowserSession for StaticDomSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        if !self.site.latency.is_zero() {
            tokio::time::sleep(self.site.latency).await;
        }
        self.stats.navigations.lock().push(normalize(url));
        self.load(url)
    }

    async fn reload(&self) -> Result<(), SessionError> {
        let url = self
            .state
            .lock()
            .url
            .clone()
            .ok_or_else(|| SessionError::Browser("nothing to reload".into()))?;
        if !self.site.latency.is_zero() {
            tokio::time::sleep(self.site.latency).await;
        }
        self.load(&url)
    }

    async fn query(&self, selector: &str, attributes: &[&str]) -> Result<Vec<ElementSnapshot>, SessionError> {
        self.select_all(selector, attributes)
    }

    async fn query_scoped(
        &self,
        scope: &str,
        selector: &str,
        attributes: &[&str],
    ) -> Result<Vec<ElementSnapshot>, SessionError> {
        let scope_sel = parse_selector(scope)?;
        let inner_sel = parse_selector(selector)?;
        self.with_dom(|dom| match dom.select(&scope_sel).next() {
            Some(container) => container
                .select(&inner_sel)
                .map(|el| snapshot(el, attributes))
                .collect(),
            None => Vec::new(),
        })
    }

    async fn query_rows(&self, table: &str, cells: &str) -> Result<Vec<Vec<String>>, SessionError> {
        let table_sel = parse_selector(table)?;
        let row_sel = parse_selector("tr")?;
        let cell_sel = parse_selector(cells)?;
        self.with_dom(|dom| match dom.select(&table_sel).next() {
            Some(table) => table
                .select(&row_sel)
                .map(|row| row.select(&cell_sel).map(element_text).collect())
                .collect(),
            None => Vec::new(),
        })
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<ElementSnapshot, SessionError> {
        // Static markup never changes on its own, so one look is final
        self.select_all(selector, &[])?
            .into_iter()
            .next()
            .ok_or_else(|| SessionError::Timeout {
                what: format!("'{selector}'"),
                secs: timeout.as_secs(),
            })
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<(), SessionError> {
        if !self.exists(selector)? {
            return Err(SessionError::not_found(selector));
        }
        self.state
            .lock()
            .filled
            .insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn force_click(&self, selector: &str) -> Result<(), SessionError> {
        self.stats.clicks.lock().push(selector.to_string());
        self.apply_click(selector)
    }

    async fn cookies(&self) -> Result<Vec<SessionCookie>, SessionError> {
        Ok(self.state.lock().jar.clone())
    }

    async fn add_cookie(&self, cookie: &SessionCookie) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if state.url.is_none() {
            return Err(SessionError::Browser(
                "cookies can only be set after loading a page on their origin".into(),
            ));
        }
        state.jar.retain(|c| c.name != cookie.name);
        state.jar.push(cookie.clone());
        self.stats.cookies_added.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.state.lock().closed = true;
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn quit(self) -> Result<(), SessionError> {
        self.stats.quit.fetch_add(1, Ordering::SeqCst);
        let _ = self
            .stats
            .live
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        Ok(())
    }
}

/// Opens [`StaticDomSession`]s over one shared site
#[derive(Debug)]
pub struct StaticDomFactory {
    site: Arc<StaticSite>,
    stats: Arc<SessionStats>,
    healthy_opens: AtomicUsize,
    failing_opens: AtomicUsize,
}

impl StaticDomFactory {
    #[must_use]
    pub fn new(site: StaticSite) -> Self {
        Self {
            site: Arc::new(site),
            stats: Arc::new(SessionStats::default()),
            healthy_opens: AtomicUsize::new(0),
            failing_opens: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` calls to `open` fail like a crashed launch
    #[must_use]
    pub fn fail_next_opens(self, count: usize) -> Self {
        self.fail_opens_after(0, count)
    }

    /// Let `healthy` opens succeed, then fail the `count` after them
    #[must_use]
    pub fn fail_opens_after(self, healthy: usize, count: usize) -> Self {
        self.healthy_opens.store(healthy, Ordering::SeqCst);
        self.failing_opens.store(count, Ordering::SeqCst);
        self
    }

    #[must_use]
    pub fn stats(&self) -> Arc<SessionStats> {
        Arc::clone(&self.stats)
    }
}

impl SessionFactory for StaticDomFactory {
    type Session = StaticDomSession;

    async fn open(&self) -> Result<StaticDomSession, SessionError> {
        let healthy = self
            .healthy_opens
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let should_fail = !healthy
            && self
                .failing_opens
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
        if should_fail {
            return Err(SessionError::Launch("simulated browser crash".into()));
        }

        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        let live = self.stats.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.peak_live.fetch_max(live, Ordering::SeqCst);
        Ok(StaticDomSession::new(Arc::clone(&self.site), Arc::clone(&self.stats)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <h1 class="title">  Brake   pad </h1>
          <div class="gallery"><img src="https://cdn.test/a.jpg" data-src="https://cdn.test/lazy.jpg"></div>
          <img class="logo" src="https://cdn.test/logo.png">
          <table class="spec"><tr><th>Brand:</th><td>Bosch</td></tr><tr><th>Weight</th><td></td></tr></table>
          <input id="user"><button id="go">Go</button>
        </body></html>"#;

    fn session(site: StaticSite) -> StaticDomSession {
        StaticDomSession::new(Arc::new(site), Arc::new(SessionStats::default()))
    }

    #[tokio::test]
    async fn queries_text_and_attributes() {
        let s = session(StaticSite::new().page("https://shop.test/p", PAGE));
        s.navigate("https://shop.test/p").await.unwrap();

        let titles = s.query("h1.title", &[]).await.unwrap();
        assert_eq!(titles[0].text, "Brake pad");

        let imgs = s.query_scoped(".gallery", "img", &["src", "data-src"]).await.unwrap();
        assert_eq!(imgs.len(), 1);
        assert_eq!(imgs[0].attr("data-src"), Some("https://cdn.test/lazy.jpg"));

        let rows = s.query_rows("table.spec", "th, td").await.unwrap();
        assert_eq!(rows, vec![vec!["Brand:", "Bosch"], vec!["Weight", ""]]);
    }

    #[tokio::test]
    async fn unknown_url_is_navigation_error() {
        let s = session(StaticSite::new());
        let err = s.navigate("https://shop.test/missing").await.unwrap_err();
        assert!(matches!(err, SessionError::Navigation { .. }));
    }

    #[tokio::test]
    async fn click_requires_filled_value() {
        let site = StaticSite::new().page("https://shop.test/p", PAGE).on_click(
            "https://shop.test/p",
            "#go",
            ClickEffect::default()
                .requires("#user", "alice")
                .set_cookie(SessionCookie::new("sid", "1")),
        );
        let s = session(site);
        s.navigate("https://shop.test/p").await.unwrap();

        s.force_click("#go").await.unwrap();
        assert!(s.cookies().await.unwrap().is_empty());

        s.fill("#user", "alice").await.unwrap();
        s.force_click("#go").await.unwrap();
        assert_eq!(s.cookies().await.unwrap()[0].name, "sid");
    }

    #[tokio::test]
    async fn cookies_need_an_origin() {
        let s = session(StaticSite::new().page("https://shop.test/p", PAGE));
        assert!(s.add_cookie(&SessionCookie::new("a", "b")).await.is_err());
        s.navigate("https://shop.test/p").await.unwrap();
        s.add_cookie(&SessionCookie::new("a", "b")).await.unwrap();
    }
}
