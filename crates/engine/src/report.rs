//! Deterministic formatting of comprehensive reports.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::error::LookupError;

/// Section order used by the comprehensive report.
pub const PREFERRED_REPORT_ORDER: [&str; 9] = [
    "NSLOOKUP",
    "DIG (A)",
    "DIG (AAAA)",
    "DIG (MX)",
    "DIG (CNAME)",
    "DIG (TXT)",
    "DIG (SOA)",
    "DIG (ANY)",
    "WHOIS",
];

const SEPARATOR_BASE_WIDTH: usize = 40;

/// Render a provider failure as report section text.
pub fn format_failure(error: &LookupError) -> String {
    format!("Error: {error}\nOutput:\n{}", error.output())
}

/// Merge per-provider results into one report.
///
/// Sections listed in `preferred_order` come first, in that order; names in
/// the order but missing from `results` are skipped. Remaining names follow in
/// ascending lexicographic order. Output depends only on the arguments.
pub fn format_report<S: AsRef<str>>(target: &str, results: &HashMap<String, String>, preferred_order: &[S]) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "Comprehensive Report for: {target}");
    report.push_str(&"=".repeat(SEPARATOR_BASE_WIDTH + target.chars().count()));
    report.push('\n');

    let mut emitted: HashSet<&str> = HashSet::new();
    for name in preferred_order.iter().map(AsRef::as_ref) {
        if emitted.contains(name) {
            continue;
        }
        if let Some(text) = results.get(name) {
            push_section(&mut report, name, text);
            emitted.insert(name);
        }
    }

    let mut remaining: Vec<&String> = results.keys().filter(|name| !emitted.contains(name.as_str())).collect();
    remaining.sort();
    for name in remaining {
        push_section(&mut report, name, &results[name]);
    }

    report
}

fn push_section(report: &mut String, name: &str, text: &str) {
    let _ = write!(report, "\n--- {name} ---\n{}\n", text.trim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn results(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries.iter().map(|(name, text)| (name.to_string(), text.to_string())).collect()
    }

    #[test]
    fn header_and_sections_follow_the_preferred_order() {
        let report = format_report(
            "example.com",
            &results(&[("WHOIS", "Registrar: Example"), ("DIG (A)", "93.184.216.34")]),
            &["DIG (A)", "WHOIS"],
        );

        let expected = format!(
            "Comprehensive Report for: example.com\n{}\n\n--- DIG (A) ---\n93.184.216.34\n\n--- WHOIS ---\nRegistrar: Example\n",
            "=".repeat(51)
        );
        assert_eq!(report, expected);
    }

    #[test]
    fn empty_results_render_only_the_header() {
        let report = format_report("example.com", &HashMap::new(), &PREFERRED_REPORT_ORDER);
        assert!(report.starts_with("Comprehensive Report for: example.com\n"));
        assert!(!report.contains("---"));
    }

    #[test]
    fn unordered_names_sort_after_ordered_ones() {
        let report = format_report(
            "example.com",
            &results(&[("Zeta", "z"), ("Alpha", "a"), ("WHOIS", "w"), ("NSLOOKUP", "n")]),
            &PREFERRED_REPORT_ORDER,
        );
        let positions: Vec<_> = ["--- NSLOOKUP ---", "--- WHOIS ---", "--- Alpha ---", "--- Zeta ---"]
            .iter()
            .map(|header| report.find(header).expect(header))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{report}");
    }

    #[test]
    fn section_text_is_trimmed() {
        let report = format_report("x", &results(&[("DIG (A)", "\n  1.2.3.4  \n")]), &["DIG (A)"]);
        assert!(report.ends_with("--- DIG (A) ---\n1.2.3.4\n"), "{report}");
    }

    #[test]
    fn failure_text_includes_error_and_partial_output() {
        let error = LookupError::Failed {
            command_line: "whois example.com".into(),
            reason: "exit status: 1".into(),
            stderr: String::new(),
            output: "partial".into(),
        };
        assert_eq!(
            format_failure(&error),
            "Error: command 'whois example.com' failed: exit status: 1\nOutput:\npartial"
        );
    }

    proptest! {
        #[test]
        fn formatting_is_pure(
            target in "[a-z]{1,12}\\.com",
            entries in proptest::collection::hash_map("[A-Z ()]{1,10}", "[a-z0-9 ]{0,20}", 0..8),
        ) {
            let first = format_report(&target, &entries, &PREFERRED_REPORT_ORDER);
            let second = format_report(&target, &entries, &PREFERRED_REPORT_ORDER);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn ordered_then_sorted_and_no_phantom_sections(
            present in proptest::collection::hash_set(0usize..9, 0..9),
            extras in proptest::collection::hash_set("x[a-z]{1,6}", 0..5),
        ) {
            let mut entries = HashMap::new();
            for index in &present {
                entries.insert(PREFERRED_REPORT_ORDER[*index].to_string(), "value".to_string());
            }
            for extra in &extras {
                entries.insert(extra.clone(), "value".to_string());
            }

            let report = format_report("example.com", &entries, &PREFERRED_REPORT_ORDER);
            let headers: Vec<String> = report
                .lines()
                .filter_map(|line| line.strip_prefix("--- ").and_then(|rest| rest.strip_suffix(" ---")))
                .map(str::to_string)
                .collect();

            let mut expected: Vec<String> = PREFERRED_REPORT_ORDER
                .iter()
                .enumerate()
                .filter(|(index, _)| present.contains(index))
                .map(|(_, name)| name.to_string())
                .collect();
            let mut sorted_extras: Vec<String> = extras.into_iter().collect();
            sorted_extras.sort();
            expected.extend(sorted_extras);

            prop_assert_eq!(headers, expected);
        }
    }
}
