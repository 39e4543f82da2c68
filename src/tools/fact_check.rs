//! Claim intake for the fact-checking agent.

/// Accept claims as a single string or a JSON list of claims.
pub fn claims_from_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        _ => None,
    }
}

/// Number of non-blank lines in a claims block.
pub fn count_claims(claims: &str) -> usize {
    claims.lines().filter(|l| !l.trim().is_empty()).count()
}

/// Verification brief handed back to the agent before it starts searching.
pub fn fact_check_brief(claims: &str) -> String {
    format!(
        "Ready to fact-check {} claim(s):\n\n\
         {}\n\n\
         Please search for credible sources and evidence to verify or debunk each claim.\n\
         For each claim, provide:\n\
         - Verification status (TRUE/FALSE/MISLEADING/UNVERIFIED)\n\
         - Detailed evidence from multiple sources\n\
         - Source URLs with publication dates\n\
         - Confidence score",
        count_claims(claims),
        claims
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_count_claims_ignores_blank_lines() {
        assert_eq!(count_claims("a\n\n  \nb\n"), 2);
        assert_eq!(count_claims(""), 0);
    }

    #[test]
    fn test_claims_from_list() {
        let claims = claims_from_value(&json!(["The moon is cheese", "Water boils at 100C"])).unwrap();
        assert_eq!(claims, "The moon is cheese\nWater boils at 100C");
        assert!(claims_from_value(&json!(42)).is_none());
    }

    #[test]
    fn test_fact_check_brief() {
        let brief = fact_check_brief("claim one\nclaim two");
        assert!(brief.starts_with("Ready to fact-check 2 claim(s):"));
        assert!(brief.contains("TRUE/FALSE/MISLEADING/UNVERIFIED"));
    }
}
