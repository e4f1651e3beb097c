use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// One finding in the checked text, trimmed down to what the editor shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarMatch {
    pub message: String,
    pub short_message: String,
    pub offset: usize,
    pub length: usize,
    pub replacements: Vec<String>,
    pub rule_id: String,
    pub rule_description: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckLanguage {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub matches: Vec<GrammarMatch>,
    pub language: CheckLanguage,
}

// What the LanguageTool API actually answers. Everything optional: the
// service omits fields freely and a missing one must not sink the check.
#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
    language: Option<ApiLanguage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMatch {
    message: String,
    #[serde(default)]
    short_message: String,
    offset: usize,
    length: usize,
    #[serde(default)]
    replacements: Vec<ApiReplacement>,
    rule: Option<ApiRule>,
}

#[derive(Deserialize)]
struct ApiReplacement {
    value: String,
}

#[derive(Deserialize)]
struct ApiRule {
    #[serde(default)]
    id: String,
    #[serde(default)]
    description: String,
    category: Option<ApiCategory>,
}

#[derive(Deserialize)]
struct ApiCategory {
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiLanguage {
    code: Option<String>,
    name: Option<String>,
    detected_language: Option<ApiDetectedLanguage>,
}

#[derive(Deserialize)]
struct ApiDetectedLanguage {
    name: Option<String>,
}

/// Thin LanguageTool client. The endpoint can be the public API or a
/// self-hosted instance; the wire contract is the same.
pub struct GrammarClient {
    client: reqwest::Client,
    endpoint: String,
}

impl GrammarClient {
    pub fn new(endpoint: String) -> Self {
        GrammarClient {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Checks `text`, returning every match the service reports.
    /// Whitespace-only text resolves to an empty result without touching the
    /// network.
    pub async fn check(&self, text: &str, language: &str) -> anyhow::Result<CheckResult> {
        if text.trim().is_empty() {
            return Ok(empty_result(language));
        }

        let body = serde_urlencoded::to_string([
            ("text", text),
            ("language", language),
            ("enabledOnly", "false"),
        ])
        .context("Error encoding grammar request")?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .with_context(|| format!("Error calling grammar service at {}", self.endpoint))?;

        if !response.status().is_success() {
            bail!("Grammar check failed: {}", response.status());
        }

        let api: ApiResponse = response
            .json()
            .await
            .context("Error parsing grammar service response")?;

        Ok(map_response(api, language))
    }
}

fn empty_result(language: &str) -> CheckResult {
    let name = if language == "es" { "Spanish" } else { "English" };
    CheckResult {
        matches: vec![],
        language: CheckLanguage {
            code: language.to_string(),
            name: name.to_string(),
            detected_language: None,
        },
    }
}

fn map_response(api: ApiResponse, requested_language: &str) -> CheckResult {
    let matches = api
        .matches
        .into_iter()
        .map(|m| {
            let short_message = if m.short_message.is_empty() {
                m.message.clone()
            } else {
                m.short_message
            };
            let replacements = m
                .replacements
                .into_iter()
                .take(5)
                .map(|r| r.value)
                .collect();
            let (rule_id, rule_description, category) = match m.rule {
                Some(rule) => (
                    rule.id,
                    rule.description,
                    rule.category
                        .and_then(|c| c.name)
                        .filter(|name| !name.is_empty())
                        .unwrap_or_else(|| "Grammar".to_string()),
                ),
                None => (String::new(), String::new(), "Grammar".to_string()),
            };
            GrammarMatch {
                message: m.message,
                short_message,
                offset: m.offset,
                length: m.length,
                replacements,
                rule_id,
                rule_description,
                category,
            }
        })
        .collect();

    let language = match api.language {
        Some(lang) => CheckLanguage {
            code: lang.code.unwrap_or_else(|| requested_language.to_string()),
            name: lang.name.unwrap_or_default(),
            detected_language: lang.detected_language.and_then(|d| d.name),
        },
        None => CheckLanguage {
            code: requested_language.to_string(),
            name: String::new(),
            detected_language: None,
        },
    };

    CheckResult { matches, language }
}
