use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Once, PoisonError, RwLock};
use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, info};

use super::{CommandProvider, ComprehensiveProvider, DigVerbosity, LookupProvider};
use crate::availability::AvailabilityCache;
use crate::error::RegistryError;
use crate::runner::CommandRunner;

/// Process-wide catalog of lookup providers.
///
/// Built once at startup and shared behind an `Arc`. Names and flag names are
/// unique; a rejected registration leaves the registry untouched. Iteration
/// follows registration order.
pub struct ProviderRegistry {
    providers: RwLock<IndexMap<String, Arc<dyn LookupProvider>>>,
    availability: Arc<AvailabilityCache>,
    precheck: Once,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ProviderRegistry")
            .field("providers", &providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new(availability: Arc<AvailabilityCache>) -> Self {
        Self {
            providers: RwLock::new(IndexMap::new()),
            availability,
            precheck: Once::new(),
        }
    }

    /// Build the standard provider set: nslookup, the dig family, whois, and
    /// the comprehensive report.
    ///
    /// `report_timeout` bounds each provider inside a comprehensive report.
    pub fn with_default_providers(
        runner: Arc<dyn CommandRunner>,
        availability: Arc<AvailabilityCache>,
        report_timeout: Option<Duration>,
    ) -> Result<Arc<Self>, RegistryError> {
        let registry = Arc::new(Self::new(Arc::clone(&availability)));

        registry.register(Arc::new(CommandProvider::nslookup(Arc::clone(&runner), Arc::clone(&availability))))?;
        let dig_variants = [
            ("A", DigVerbosity::Short),
            ("AAAA", DigVerbosity::Short),
            ("MX", DigVerbosity::Short),
            ("CNAME", DigVerbosity::Short),
            ("TXT", DigVerbosity::AnswerSection),
            ("SOA", DigVerbosity::AnswerSection),
            ("ANY", DigVerbosity::AnswerSection),
        ];
        for (record_type, verbosity) in dig_variants {
            registry.register(Arc::new(CommandProvider::dig(
                record_type,
                verbosity,
                Arc::clone(&runner),
                Arc::clone(&availability),
            )))?;
        }
        registry.register(Arc::new(CommandProvider::whois(runner, availability)))?;

        let mut comprehensive = ComprehensiveProvider::new(Arc::downgrade(&registry));
        if let Some(timeout) = report_timeout {
            comprehensive = comprehensive.with_provider_timeout(timeout);
        }
        registry.register(Arc::new(comprehensive))?;

        info!(provider_count = registry.len(), "provider registry built");
        Ok(registry)
    }

    /// Add a provider, rejecting duplicate names or flag names.
    pub fn register(&self, provider: Arc<dyn LookupProvider>) -> Result<(), RegistryError> {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        let name = provider.name().to_string();
        if providers.contains_key(&name) {
            return Err(RegistryError::DuplicateName { name });
        }
        if let Some(existing) = providers.values().find(|existing| existing.flag_name() == provider.flag_name()) {
            return Err(RegistryError::DuplicateFlag {
                flag: provider.flag_name().to_string(),
                existing: existing.name().to_string(),
            });
        }
        debug!(provider = %name, flag = %provider.flag_name(), "registered provider");
        providers.insert(name, provider);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn LookupProvider>> {
        self.providers.read().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }

    pub fn get_by_flag(&self, flag_name: &str) -> Option<Arc<dyn LookupProvider>> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|provider| provider.flag_name() == flag_name)
            .cloned()
    }

    /// All providers in registration order.
    pub fn providers(&self) -> Vec<Arc<dyn LookupProvider>> {
        self.providers.read().unwrap_or_else(PoisonError::into_inner).values().cloned().collect()
    }

    /// All providers, after probing every base command once.
    ///
    /// The first call warms the availability cache so later checks are cheap.
    pub fn list_available_providers(&self) -> Vec<Arc<dyn LookupProvider>> {
        let providers = self.providers();
        self.precheck.call_once(|| {
            for provider in &providers {
                provider.check_availability();
            }
        });
        providers
    }

    /// Base commands that are not installed, sorted and deduplicated.
    pub fn missing_commands(&self) -> Vec<String> {
        self.list_available_providers()
            .iter()
            .filter_map(|provider| provider.base_command().map(str::to_string))
            .filter(|command| !self.availability.is_available(command))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct StaticProvider {
        name: &'static str,
        flag: &'static str,
    }

    #[async_trait]
    impl LookupProvider for StaticProvider {
        fn name(&self) -> &str {
            self.name
        }
        fn flag_name(&self) -> &str {
            self.flag
        }
        fn check_availability(&self) -> bool {
            true
        }
        async fn execute(&self, _target: &str) -> Result<String, LookupError> {
            Ok(String::new())
        }
    }

    struct NeverRunner;

    #[async_trait]
    impl CommandRunner for NeverRunner {
        async fn run(&self, command: &str, _args: &[String]) -> Result<String, LookupError> {
            panic!("unexpected spawn of {command}");
        }
    }

    fn empty_registry() -> ProviderRegistry {
        ProviderRegistry::new(Arc::new(AvailabilityCache::with_probe(|_| true)))
    }

    #[test]
    fn duplicate_name_is_rejected_without_growing() {
        let registry = empty_registry();
        registry.register(Arc::new(StaticProvider { name: "WHOIS", flag: "whois" })).unwrap();

        let error = registry
            .register(Arc::new(StaticProvider { name: "WHOIS", flag: "whois-2" }))
            .unwrap_err();
        assert_eq!(error, RegistryError::DuplicateName { name: "WHOIS".into() });
        assert_eq!(registry.len(), 1);
        assert!(registry.get_by_flag("whois-2").is_none());
    }

    #[test]
    fn duplicate_flag_is_rejected_without_growing() {
        let registry = empty_registry();
        registry.register(Arc::new(StaticProvider { name: "DIG (A)", flag: "dig-a" })).unwrap();

        let error = registry
            .register(Arc::new(StaticProvider { name: "Dig A", flag: "dig-a" }))
            .unwrap_err();
        assert_eq!(
            error,
            RegistryError::DuplicateFlag {
                flag: "dig-a".into(),
                existing: "DIG (A)".into()
            }
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.get("Dig A").is_none());
    }

    #[test]
    fn lookups_by_name_and_flag() {
        let registry = empty_registry();
        registry.register(Arc::new(StaticProvider { name: "NSLOOKUP", flag: "nslookup" })).unwrap();
        registry.register(Arc::new(StaticProvider { name: "WHOIS", flag: "whois" })).unwrap();

        assert_eq!(registry.get("WHOIS").map(|p| p.flag_name().to_string()), Some("whois".into()));
        assert_eq!(registry.get_by_flag("nslookup").map(|p| p.name().to_string()), Some("NSLOOKUP".into()));
        assert!(registry.get("DIG (A)").is_none());
        let names: Vec<_> = registry.providers().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, ["NSLOOKUP", "WHOIS"]);
    }

    #[test]
    fn default_providers_cover_every_lookup_type() {
        let availability = Arc::new(AvailabilityCache::with_probe(|command| command != "whois"));
        let registry = ProviderRegistry::with_default_providers(Arc::new(NeverRunner), availability, None).unwrap();

        let names: Vec<_> = registry.providers().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(
            names,
            [
                "NSLOOKUP",
                "DIG (A)",
                "DIG (AAAA)",
                "DIG (MX)",
                "DIG (CNAME)",
                "DIG (TXT)",
                "DIG (SOA)",
                "DIG (ANY)",
                "WHOIS",
                "Comprehensive Report"
            ]
        );
        assert!(registry.get_by_flag("dig-cname").is_some());
        assert!(registry.get_by_flag("comprehensive-report").is_some());
        assert_eq!(registry.missing_commands(), ["whois"]);
    }

    #[test]
    fn list_available_providers_warms_the_cache_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let probes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&probes);
        let availability = Arc::new(AvailabilityCache::with_probe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }));
        let registry = ProviderRegistry::with_default_providers(Arc::new(NeverRunner), availability, None).unwrap();

        assert_eq!(registry.list_available_providers().len(), 10);
        registry.list_available_providers();
        // nslookup, dig, whois
        assert_eq!(probes.load(Ordering::SeqCst), 3);
    }
}
