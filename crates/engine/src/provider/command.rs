use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dlookup_util::derive_flag_name;
use tracing::debug;

use super::LookupProvider;
use crate::availability::AvailabilityCache;
use crate::error::LookupError;
use crate::runner::CommandRunner;

/// Output verbosity for dig variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigVerbosity {
    /// `+short`: bare record values.
    Short,
    /// `+noall +answer`: the full answer section.
    AnswerSection,
}

impl DigVerbosity {
    fn flags(self) -> &'static [&'static str] {
        match self {
            DigVerbosity::Short => &["+short"],
            DigVerbosity::AnswerSection => &["+noall", "+answer"],
        }
    }
}

/// Provider backed by an external executable.
///
/// Runs `<base_command> <target> <fixed_args...>`.
pub struct CommandProvider {
    name: String,
    flag_name: String,
    base_command: String,
    fixed_args: Vec<String>,
    runner: Arc<dyn CommandRunner>,
    availability: Arc<AvailabilityCache>,
}

impl fmt::Debug for CommandProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandProvider")
            .field("name", &self.name)
            .field("flag_name", &self.flag_name)
            .field("base_command", &self.base_command)
            .field("fixed_args", &self.fixed_args)
            .finish()
    }
}

impl CommandProvider {
    pub fn new(
        name: impl Into<String>,
        base_command: impl Into<String>,
        fixed_args: Vec<String>,
        runner: Arc<dyn CommandRunner>,
        availability: Arc<AvailabilityCache>,
    ) -> Self {
        let name = name.into();
        Self {
            flag_name: derive_flag_name(&name),
            name,
            base_command: base_command.into(),
            fixed_args,
            runner,
            availability,
        }
    }

    /// `DIG (<record_type>)`, e.g. `dig example.com MX +short`.
    pub fn dig(record_type: &str, verbosity: DigVerbosity, runner: Arc<dyn CommandRunner>, availability: Arc<AvailabilityCache>) -> Self {
        let mut fixed_args = vec![record_type.to_string()];
        fixed_args.extend(verbosity.flags().iter().map(|flag| flag.to_string()));
        Self::new(format!("DIG ({record_type})"), "dig", fixed_args, runner, availability)
    }

    pub fn nslookup(runner: Arc<dyn CommandRunner>, availability: Arc<AvailabilityCache>) -> Self {
        Self::new("NSLOOKUP", "nslookup", Vec::new(), runner, availability)
    }

    pub fn whois(runner: Arc<dyn CommandRunner>, availability: Arc<AvailabilityCache>) -> Self {
        Self::new("WHOIS", "whois", Vec::new(), runner, availability)
    }

    pub fn fixed_args(&self) -> &[String] {
        &self.fixed_args
    }

    fn arguments_for(&self, target: &str) -> Vec<String> {
        let mut arguments = Vec::with_capacity(self.fixed_args.len() + 1);
        arguments.push(target.to_string());
        arguments.extend(self.fixed_args.iter().cloned());
        arguments
    }
}

#[async_trait]
impl LookupProvider for CommandProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn flag_name(&self) -> &str {
        &self.flag_name
    }

    fn base_command(&self) -> Option<&str> {
        Some(&self.base_command)
    }

    fn check_availability(&self) -> bool {
        self.availability.is_available(&self.base_command)
    }

    async fn execute(&self, target: &str) -> Result<String, LookupError> {
        if !self.check_availability() {
            return Err(LookupError::CommandNotFound {
                command: self.base_command.clone(),
            });
        }
        let arguments = self.arguments_for(target);
        debug!(provider = %self.name, target = %target, "executing lookup");
        self.runner.run(&self.base_command, &arguments).await
    }
}
