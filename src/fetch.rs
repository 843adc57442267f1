use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use texting_robots::Robot;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::decode::decode_page;

const FORM_URL: &str = "https://cp.trf5.jus.br/cp/cp.do";
const ROBOTS_URL: &str = "https://cp.trf5.jus.br/robots.txt";
const USER_AGENT: &str = concat!("trf5_scraper/", env!("CARGO_PKG_VERSION"));
const CONCURRENCY: usize = 8;
const DOWNLOAD_DELAY_MS: u64 = 500;
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;

/// Fields of the TRF5 search form; `filtro` carries the case number.
const FORM_TEMPLATE: &[(&str, &str)] = &[
    ("navigation", "Netscape"),
    ("filtroCpfRequest", ""),
    ("tipo", "xmlproc"),
    ("filtro", ""),
    ("filtroCPF2", ""),
    ("tipoproc", "T"),
    ("filtroRPV_Precatorios", ""),
    ("uf_rpv", "PE"),
    ("numOriginario", ""),
    ("numRequisitorio", ""),
    ("numProcessExec", ""),
    ("uf_rpv_OAB", "PE"),
    ("filtro_processo_OAB", ""),
    ("filtro_CPFCNPJ", ""),
    ("campo_data_de", ""),
    ("campo_data_ate", ""),
    ("vinculados", "true"),
    ("ordenacao", "D"),
    ("ordenacao cpf", "D"),
];

/// One answer from the court: the page body, or why there is none.
pub struct FetchedPage {
    pub case_number: String,
    pub html: Result<String>,
}

pub fn build_form(case_number: &str) -> Vec<(&'static str, String)> {
    FORM_TEMPLATE
        .iter()
        .map(|&(key, value)| {
            let value = if key == "filtro" { case_number } else { value };
            (key, value.to_string())
        })
        .collect()
}

pub fn client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("pt-BR,pt;q=0.9,en;q=0.8"));

    Client::builder()
        .default_headers(headers)
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(60))
        .build()
        .context("Failed to build HTTP client")
}

/// Spaces consecutive requests to the court at least `period` apart,
/// whichever task sends them.
#[derive(Clone)]
pub struct RateGate {
    interval: Arc<Mutex<Interval>>,
}

impl RateGate {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        RateGate {
            interval: Arc::new(Mutex::new(interval)),
        }
    }

    pub async fn wait(&self) {
        self.interval.lock().await.tick().await;
    }
}

/// robots.txt rules for the court host. No rules means everything is allowed.
pub struct RobotsPolicy {
    robot: Option<Robot>,
}

impl RobotsPolicy {
    pub fn allow_all() -> Self {
        RobotsPolicy { robot: None }
    }

    pub fn from_body(body: &[u8]) -> Self {
        match Robot::new(USER_AGENT, body) {
            Ok(robot) => RobotsPolicy { robot: Some(robot) },
            Err(e) => {
                warn!("Unparseable robots.txt, treating as allow-all: {}", e);
                Self::allow_all()
            }
        }
    }

    pub fn allows(&self, url: &str) -> bool {
        self.robot.as_ref().map_or(true, |r| r.allowed(url))
    }
}

/// Fetch robots.txt once for the run. A missing file or a failed request
/// leaves the site unrestricted.
pub async fn load_robots(client: &Client) -> RobotsPolicy {
    let response = match client.get(ROBOTS_URL).send().await {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            info!("robots.txt returned HTTP {}, no restrictions", r.status());
            return RobotsPolicy::allow_all();
        }
        Err(e) => {
            warn!("Cannot fetch robots.txt, no restrictions: {}", e);
            return RobotsPolicy::allow_all();
        }
    };
    match response.bytes().await {
        Ok(body) => RobotsPolicy::from_body(&body),
        Err(e) => {
            warn!("Cannot read robots.txt, no restrictions: {}", e);
            RobotsPolicy::allow_all()
        }
    }
}

/// Fetch every case number concurrently. Pages arrive on the returned channel
/// in completion order; the channel closes once every request has finished.
pub fn spawn_fetches(
    client: Client,
    robots: &RobotsPolicy,
    case_numbers: Vec<String>,
) -> mpsc::Receiver<FetchedPage> {
    let semaphore = Arc::new(Semaphore::new(CONCURRENCY));
    let gate = RateGate::new(Duration::from_millis(DOWNLOAD_DELAY_MS));
    let allowed = robots.allows(FORM_URL);
    if !allowed {
        warn!("robots.txt disallows {}, skipping {} requests", FORM_URL, case_numbers.len());
    }
    let (tx, rx) = mpsc::channel::<FetchedPage>(CONCURRENCY * 2);

    for case_number in case_numbers {
        let client = client.clone();
        let sem = Arc::clone(&semaphore);
        let gate = gate.clone();
        let tx = tx.clone();

        tokio::spawn(async move {
            let html = if !allowed {
                Err(anyhow::anyhow!("{} is disallowed by robots.txt", FORM_URL))
            } else {
                match sem.acquire().await {
                    Ok(_permit) => fetch_with_retry(&client, &gate, &case_number).await,
                    Err(e) => Err(e.into()),
                }
            };
            let _ = tx.send(FetchedPage { case_number, html }).await;
        });
    }

    rx
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

async fn fetch_with_retry(client: &Client, gate: &RateGate, case_number: &str) -> Result<String> {
    let mut attempt = 0;
    loop {
        gate.wait().await;
        let start = Instant::now();
        let outcome = client.post(FORM_URL).form(&build_form(case_number)).send().await;

        let retry_reason = match outcome {
            Ok(response) if is_retryable(response.status()) => format!("HTTP {}", response.status()),
            Ok(response) => {
                let response = response.error_for_status()?;
                let body = response.bytes().await.context("Failed to read TRF5 response")?;
                debug!(
                    numero = case_number,
                    bytes = body.len(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Fetched"
                );
                return Ok(decode_page(case_number, &body));
            }
            Err(e) if e.is_timeout() || e.is_connect() || e.is_request() => e.to_string(),
            Err(e) => return Err(e.into()),
        };

        if attempt == MAX_RETRIES {
            anyhow::bail!("giving up on {} after {} retries: {}", case_number, MAX_RETRIES, retry_reason);
        }

        let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
        warn!(
            "{} on {} (attempt {}/{}), backing off {:.1}s",
            retry_reason,
            case_number,
            attempt + 1,
            MAX_RETRIES,
            backoff.as_secs_f64()
        );
        tokio::time::sleep(backoff).await;
        attempt += 1;
    }
}
