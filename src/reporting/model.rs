use crate::scanner::params::ParameterCandidate;
use crate::xss::context::{Classification, XssContext};
use crate::xss::probe::ReflectionEvidence;
use serde::Serialize;

#[derive(Debug, Serialize, Clone)]
pub struct Finding {
    pub url: String,
    pub parameter: ParameterCandidate,
    pub payload: String,
    pub context: Classification,
    pub test_url: String,
    pub evidence: ReflectionEvidence,
    pub severity: Severity,
    pub cwe: String,
    pub remediation: String,
    pub references: Vec<String>,
}

impl Finding {
    /// Reflected XSS confirmed by the reflection heuristic
    pub fn reflected_xss(
        url: &str,
        parameter: ParameterCandidate,
        payload: &str,
        context: Classification,
        test_url: &str,
        evidence: ReflectionEvidence,
    ) -> Self {
        // Verbatim reflection is the strongest signal the heuristic has
        let severity = match evidence {
            ReflectionEvidence::Verbatim => Severity::High,
            ReflectionEvidence::EntityEncoded | ReflectionEvidence::TriggerToken(_) => {
                Severity::Medium
            }
        };

        Self {
            url: url.to_string(),
            remediation: remediation_for(context.context),
            parameter,
            payload: payload.to_string(),
            context,
            test_url: test_url.to_string(),
            evidence,
            severity,
            cwe: "CWE-79".to_string(),
            references: vec![
                "https://cheatsheetseries.owasp.org/cheatsheets/Cross_Site_Scripting_Prevention_Cheat_Sheet.html".to_string(),
                "https://cwe.mitre.org/data/definitions/79.html".to_string(),
                "https://portswigger.net/web-security/cross-site-scripting".to_string(),
            ],
        }
    }

    /// (url, parameter name) identity used for first-success de-duplication
    pub fn key(&self) -> (String, String) {
        (self.url.clone(), self.parameter.name.clone())
    }
}

fn remediation_for(context: XssContext) -> String {
    let specific = match context {
        XssContext::Html => "HTML-encode < > & \" ' before writing the value between tags",
        XssContext::Script => {
            "Never interpolate request data into script blocks; serialize it as JSON \
             into a data attribute or escape it for a JavaScript string literal"
        }
        XssContext::Attribute => "Quote every attribute and attribute-encode the value",
        XssContext::Url => {
            "Allow-list URL schemes (http, https) before writing the value into href/src"
        }
    };

    format!(
        "1. {}\n\
         2. Deploy a Content-Security-Policy without 'unsafe-inline'\n\
         3. Validate the parameter against its expected type and length",
        specific
    )
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub enum Severity {
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Medium => write!(f, "🟡 MEDIUM"),
            Severity::High => write!(f, "🟠 HIGH"),
        }
    }
}

/// Terminal artifact of one run
#[derive(Debug, Serialize, Clone, Default)]
pub struct ScanReport {
    pub target: String,
    pub findings: Vec<Finding>,
    /// Every progress line, in emission order
    pub log: Vec<String>,
    pub pages_crawled: usize,
    pub parameters_tested: usize,
    pub requests_sent: usize,
    pub cancelled: bool,
}
