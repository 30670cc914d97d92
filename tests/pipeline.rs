use async_trait::async_trait;
use rate_scout::llm::LlmResult;
use rate_scout::models::{RoomPrices, Stage};
use rate_scout::{
    ChatCompletion, DateRange, FetchedPages, LlmError, PageFetcher, Pipeline, Settings, Site,
    SiteLinks, SiteOutcome,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Fails for configured sites, returns "<site> page" for the rest
struct StubFetcher {
    failing: HashSet<Site>,
}

impl StubFetcher {
    fn failing(sites: &[Site]) -> Self {
        Self {
            failing: sites.iter().copied().collect(),
        }
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_all(&self, links: &SiteLinks) -> FetchedPages {
        let mut fetched = FetchedPages::default();
        for site in links.keys().copied() {
            let result = if self.failing.contains(&site) {
                Err(anyhow::anyhow!("net::ERR_NAME_NOT_RESOLVED"))
            } else {
                Ok(format!("{} page", site))
            };
            fetched.record(site, result);
        }
        fetched
    }

    fn backend_name(&self) -> &'static str {
        "stub"
    }
}

/// Answers by matching the site label in the system prompt
struct CannedModel {
    answers: Vec<(&'static str, Result<&'static str, u16>)>,
    prompts: Mutex<Vec<String>>,
}

impl CannedModel {
    fn new(answers: Vec<(&'static str, Result<&'static str, u16>)>) -> Self {
        Self {
            answers,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatCompletion for CannedModel {
    async fn complete(&self, system: &str, user: &str, _temperature: f32) -> LlmResult<String> {
        self.prompts.lock().unwrap().push(user.to_string());
        for (label, answer) in &self.answers {
            if system.contains(label) {
                return match answer {
                    Ok(text) => Ok(text.to_string()),
                    Err(status) => Err(LlmError::Api {
                        status: *status,
                        body: "quota exceeded".to_string(),
                    }),
                };
            }
        }
        Ok(String::new())
    }
}

fn range() -> DateRange {
    DateRange::new("2025-07-02".parse().unwrap(), "2025-07-03".parse().unwrap()).unwrap()
}

fn prices(pairs: &[(&str, &str)]) -> RoomPrices {
    pairs
        .iter()
        .map(|(room, price)| (room.to_string(), price.to_string()))
        .collect()
}

#[tokio::test]
async fn fetch_failure_is_isolated_to_its_site() {
    let fetcher = StubFetcher::failing(&[Site::Booking]);
    let model = Arc::new(CannedModel::new(vec![
        ("Agoda", Ok("Superior Room – ₹3100\nnot a price line\nDeluxe Dbl – ₹3999")),
        ("Goibibo", Ok("Superior Rooms – ₹2800")),
    ]));
    let pipeline = Pipeline::new(fetcher, model.clone(), Settings::default());

    let results = pipeline.run(&range()).await.unwrap();
    let all = results.prices();

    assert_eq!(all.len(), 3);
    assert!(all[&Site::Booking].is_empty());
    assert_eq!(
        all[&Site::Agoda],
        prices(&[("Superior Room", "₹3100"), ("Deluxe Dbl", "₹3999")])
    );
    assert_eq!(all[&Site::Goibibo], prices(&[("Superior Rooms", "₹2800")]));

    let diagnostics = results.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].site, Site::Booking);
    assert_eq!(diagnostics[0].stage, Stage::Scrape);
    assert!(diagnostics[0].message.contains("ERR_NAME_NOT_RESOLVED"));

    // The failed site never reaches the model
    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts.iter().all(|p| !p.contains("booking page")));
}

#[tokio::test]
async fn empty_answer_differs_from_failure_only_in_diagnostics() {
    let model = Arc::new(CannedModel::new(vec![
        ("Booking", Ok("")),
        ("Agoda", Err(429)),
        ("Goibibo", Ok("Super Deluxe Rooms – ₹4100")),
    ]));
    let pipeline = Pipeline::new(StubFetcher::failing(&[]), model, Settings::default());

    let results = pipeline.run(&range()).await.unwrap();

    assert_eq!(results.outcome(Site::Booking), Some(&SiteOutcome::EmptyResult));
    assert!(matches!(
        results.outcome(Site::Agoda),
        Some(SiteOutcome::ExtractFailed(reason)) if reason.contains("429")
    ));

    let all = results.prices();
    assert!(all[&Site::Booking].is_empty());
    assert!(all[&Site::Agoda].is_empty());
    assert_eq!(all[&Site::Goibibo], prices(&[("Super Deluxe Rooms", "₹4100")]));

    let diagnostics = results.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].site, Site::Agoda);
    assert_eq!(diagnostics[0].stage, Stage::Extract);
}

#[tokio::test]
async fn every_site_failing_still_yields_full_result_set() {
    let fetcher = StubFetcher::failing(&[Site::Booking, Site::Agoda, Site::Goibibo]);
    let pipeline = Pipeline::new(fetcher, Arc::new(CannedModel::new(vec![])), Settings::default());

    let results = pipeline.run(&range()).await.unwrap();

    assert_eq!(results.diagnostics().len(), 3);
    assert!(results.prices().values().all(|p| p.is_empty()));
}

#[tokio::test]
async fn page_text_reaches_the_prompt_verbatim() {
    let model = Arc::new(CannedModel::new(vec![]));
    let pipeline = Pipeline::new(StubFetcher::failing(&[]), model.clone(), Settings::default());

    pipeline.run(&range()).await.unwrap();

    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].contains("From the Booking.com page text"));
    assert!(prompts[0].ends_with("booking page\n"));
    assert!(prompts[2].ends_with("goibibo page\n"));
}

#[tokio::test]
async fn run_links_reports_missing_pages_as_fetch_failures() {
    struct SilentFetcher;

    #[async_trait]
    impl PageFetcher for SilentFetcher {
        async fn fetch_all(&self, _links: &SiteLinks) -> FetchedPages {
            FetchedPages::default()
        }

        fn backend_name(&self) -> &'static str {
            "silent"
        }
    }

    let pipeline = Pipeline::new(SilentFetcher, Arc::new(CannedModel::new(vec![])), Settings::default());
    let links = rate_scout::build_links(
        "2025-07-02".parse().unwrap(),
        "2025-07-03".parse().unwrap(),
        pipeline.settings(),
    )
    .unwrap();

    let results = pipeline.run_links(&links).await;
    assert!(matches!(
        results.outcome(Site::Goibibo),
        Some(SiteOutcome::FetchFailed(reason)) if reason == "no page text captured"
    ));
}
