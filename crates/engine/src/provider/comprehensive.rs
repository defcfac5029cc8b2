use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use super::{LookupProvider, ProviderRegistry};
use crate::error::LookupError;
use crate::report::{PREFERRED_REPORT_ORDER, format_failure, format_report};

pub const COMPREHENSIVE_REPORT_NAME: &str = "Comprehensive Report";
const COMPREHENSIVE_FLAG_NAME: &str = "comprehensive-report";

/// Runs every other available provider concurrently and merges the results.
///
/// Holds a weak handle to the registry it is registered in. Unavailable
/// providers are left out of the report entirely; failures are embedded in
/// their own section and never fail the report.
#[derive(Debug)]
pub struct ComprehensiveProvider {
    registry: Weak<ProviderRegistry>,
    preferred_order: Vec<String>,
    provider_timeout: Option<Duration>,
}

impl ComprehensiveProvider {
    pub fn new(registry: Weak<ProviderRegistry>) -> Self {
        Self {
            registry,
            preferred_order: PREFERRED_REPORT_ORDER.iter().map(|name| name.to_string()).collect(),
            provider_timeout: None,
        }
    }

    /// Override the section order.
    pub fn with_preferred_order(mut self, order: Vec<String>) -> Self {
        self.preferred_order = order;
        self
    }

    /// Bound how long any single provider may take.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = Some(timeout);
        self
    }

    async fn collect_results(&self, target: &str) -> HashMap<String, String> {
        let Some(registry) = self.registry.upgrade() else {
            warn!("provider registry dropped; comprehensive report is empty");
            return HashMap::new();
        };

        let mut tasks = Vec::new();
        for provider in registry.providers() {
            if provider.name() == self.name() {
                continue;
            }
            if !provider.check_availability() {
                debug!(provider = %provider.name(), "skipping unavailable provider");
                continue;
            }
            let name = provider.name().to_string();
            let target = target.to_string();
            let timeout = self.provider_timeout;
            let handle = tokio::spawn(async move { run_bounded(provider, &target, timeout).await });
            tasks.push((name, handle));
        }

        let (names, handles): (Vec<String>, Vec<_>) = tasks.into_iter().unzip();
        let mut results = HashMap::with_capacity(names.len());
        for (name, joined) in names.into_iter().zip(join_all(handles).await) {
            let text = match joined {
                Ok(Ok(output)) => output,
                Ok(Err(error)) => format_failure(&error),
                Err(join_error) => {
                    warn!(provider = %name, error = %join_error, "lookup task did not complete");
                    format!("Error: lookup task did not complete: {join_error}\nOutput:\n")
                }
            };
            results.insert(name, text);
        }
        results
    }
}

async fn run_bounded(provider: Arc<dyn LookupProvider>, target: &str, timeout: Option<Duration>) -> Result<String, LookupError> {
    match timeout {
        None => provider.execute(target).await,
        Some(after) => match tokio::time::timeout(after, provider.execute(target)).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::TimedOut {
                provider: provider.name().to_string(),
                after,
            }),
        },
    }
}

#[async_trait]
impl LookupProvider for ComprehensiveProvider {
    fn name(&self) -> &str {
        COMPREHENSIVE_REPORT_NAME
    }

    fn flag_name(&self) -> &str {
        COMPREHENSIVE_FLAG_NAME
    }

    fn usage(&self) -> String {
        format!("Run {} (all lookups) on domains from <filename>", self.name())
    }

    fn is_watchable(&self) -> bool {
        false
    }

    /// Always available; each sub-provider is checked during execution.
    fn check_availability(&self) -> bool {
        true
    }

    async fn execute(&self, target: &str) -> Result<String, LookupError> {
        let results = self.collect_results(target).await;
        info!(target = %target, sections = results.len(), "comprehensive report finished");
        Ok(format_report(target, &results, &self.preferred_order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::AvailabilityCache;
    use dlookup_util::derive_flag_name;

    #[derive(Debug)]
    struct StubProvider {
        name: String,
        flag: String,
        available: bool,
        delay: Duration,
        result: Result<String, LookupError>,
    }

    impl StubProvider {
        fn new(name: &str, result: Result<String, LookupError>) -> Self {
            Self {
                name: name.to_string(),
                flag: derive_flag_name(name),
                available: true,
                delay: Duration::ZERO,
                result,
            }
        }
    }

    #[async_trait]
    impl LookupProvider for StubProvider {
        fn name(&self) -> &str {
            &self.name
        }
        fn flag_name(&self) -> &str {
            &self.flag
        }
        fn check_availability(&self) -> bool {
            self.available
        }
        async fn execute(&self, _target: &str) -> Result<String, LookupError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.result.clone()
        }
    }

    fn registry_with(providers: Vec<StubProvider>, timeout: Option<Duration>) -> Arc<ProviderRegistry> {
        let registry = Arc::new(ProviderRegistry::new(Arc::new(AvailabilityCache::with_probe(|_| true))));
        for provider in providers {
            registry.register(Arc::new(provider)).unwrap();
        }
        let mut comprehensive = ComprehensiveProvider::new(Arc::downgrade(&registry));
        if let Some(timeout) = timeout {
            comprehensive = comprehensive.with_provider_timeout(timeout);
        }
        registry.register(Arc::new(comprehensive)).unwrap();
        registry
    }

    fn failed(message: &str, output: &str) -> LookupError {
        LookupError::Failed {
            command_line: "stub".into(),
            reason: message.into(),
            stderr: String::new(),
            output: output.into(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn mixes_success_failure_and_unavailable() {
        let mut offline = StubProvider::new("Offline", Ok("never".into()));
        offline.available = false;
        let registry = registry_with(
            vec![
                StubProvider::new("Good", Ok("A".into())),
                StubProvider::new("Bad", Err(failed("boom", "partial"))),
                offline,
            ],
            None,
        );

        let report = registry
            .get(COMPREHENSIVE_REPORT_NAME)
            .unwrap()
            .execute("example.com")
            .await
            .unwrap();

        assert!(report.contains("--- Good ---\nA\n"), "{report}");
        let bad_section = &report[report.find("--- Bad ---").expect("bad section")..];
        assert!(bad_section.contains("Error:"), "{report}");
        assert!(bad_section.contains("boom"), "{report}");
        assert!(bad_section.contains("partial"), "{report}");
        assert!(!report.contains("Offline"), "{report}");
        assert!(!report.contains("--- Comprehensive Report ---"), "{report}");
    }

    #[tokio::test]
    async fn uses_preferred_order_regardless_of_completion_order() {
        let mut slow_dig = StubProvider::new("DIG (A)", Ok("93.184.216.34".into()));
        slow_dig.delay = Duration::from_millis(30);
        let registry = registry_with(vec![StubProvider::new("WHOIS", Ok("Registrar: Example".into())), slow_dig], None);

        let provider = ComprehensiveProvider::new(Arc::downgrade(&registry))
            .with_preferred_order(vec!["DIG (A)".into(), "WHOIS".into()]);
        let report = provider.execute("example.com").await.unwrap();

        assert!(report.starts_with("Comprehensive Report for: example.com\n"));
        let dig = report.find("--- DIG (A) ---").unwrap();
        let whois = report.find("--- WHOIS ---").unwrap();
        assert!(dig < whois, "{report}");
    }

    #[tokio::test]
    async fn slow_provider_times_out_in_its_own_section() {
        let mut hung = StubProvider::new("WHOIS", Ok("late".into()));
        hung.delay = Duration::from_secs(30);
        let registry = registry_with(
            vec![StubProvider::new("NSLOOKUP", Ok("Address: 1.1.1.1".into())), hung],
            Some(Duration::from_millis(20)),
        );

        let report = registry
            .get(COMPREHENSIVE_REPORT_NAME)
            .unwrap()
            .execute("one.one.one.one")
            .await
            .unwrap();

        assert!(report.contains("--- NSLOOKUP ---\nAddress: 1.1.1.1"), "{report}");
        assert!(report.contains("--- WHOIS ---\nError: WHOIS timed out"), "{report}");
    }

    #[tokio::test]
    async fn dropped_registry_yields_header_only() {
        let registry = registry_with(vec![StubProvider::new("WHOIS", Ok("w".into()))], None);
        let provider = ComprehensiveProvider::new(Arc::downgrade(&registry));
        drop(registry);

        let report = provider.execute("example.com").await.unwrap();
        assert!(report.starts_with("Comprehensive Report for: example.com"));
        assert!(!report.contains("---"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reports_do_not_share_results() {
        let registry = registry_with(vec![StubProvider::new("DIG (A)", Ok("1.2.3.4".into()))], None);
        let provider = registry.get(COMPREHENSIVE_REPORT_NAME).unwrap();

        let first = tokio::spawn({
            let provider = Arc::clone(&provider);
            async move { provider.execute("first.example").await }
        });
        let second = tokio::spawn({
            let provider = Arc::clone(&provider);
            async move { provider.execute("second.example").await }
        });

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        assert!(first.starts_with("Comprehensive Report for: first.example"));
        assert!(second.starts_with("Comprehensive Report for: second.example"));
        assert_eq!(first.matches("--- DIG (A) ---").count(), 1);
        assert_eq!(second.matches("--- DIG (A) ---").count(), 1);
    }

    #[test]
    fn is_not_watchable_and_always_available() {
        let provider = ComprehensiveProvider::new(Weak::new());
        assert!(!provider.is_watchable());
        assert!(provider.check_availability());
        assert_eq!(provider.flag_name(), "comprehensive-report");
        assert_eq!(provider.usage(), "Run Comprehensive Report (all lookups) on domains from <filename>");
    }
}
