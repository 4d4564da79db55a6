use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

use super::types::{Classification, Difficulty, Provider};

// Every table below is evaluated top to bottom and the first hit wins, so the
// declaration order is part of the behavior.

const FILENAME_PROVIDER_RULES: &[(&[&str], Provider)] = &[
    (&["google cloud", "gcp"], Provider::Gcp),
    (&["aws", "amazon"], Provider::Aws),
    (&["azure", "microsoft"], Provider::Azure),
    (&["oracle", "oci"], Provider::Oracle),
    (&["salesforce"], Provider::Salesforce),
];

const CONTENT_PROVIDER_RULES: &[(&[&str], Provider)] = &[
    (&["tensorflow", "neural", "machine learning"], Provider::Ml),
    (&["aws", "amazon", "ec2", "s3", "dynamodb", "lambda"], Provider::Aws),
    (
        &["google cloud", "gcp", "gke", "bigquery", "data studio"],
        Provider::Gcp,
    ),
    (&["azure", "microsoft", "azure functions"], Provider::Azure),
    (&["kubernetes", "docker", "container"], Provider::DevOps),
];

const FILENAME_CERTIFICATION_RULES: &[(&str, &str)] = &[
    ("professional data engineer", "PDE"),
    ("professional cloud architect", "PCA"),
    ("associate cloud engineer", "ACE"),
    ("professional cloud developer", "PCD"),
    ("professional cloud security engineer", "PCSE"),
    ("professional cloud network engineer", "PCNE"),
    ("professional cloud devops engineer", "PCDE"),
    ("professional machine learning engineer", "PMLE"),
    ("solutions architect associate", "SAA-C03"),
    ("solutions architect professional", "SAP-C02"),
    ("developer associate", "DVA-C02"),
    ("sysops administrator", "SOA-C02"),
    ("devops engineer professional", "DOP-C02"),
    ("security specialty", "SCS-C02"),
    ("machine learning specialty", "MLS-C01"),
    ("data analytics specialty", "DAS-C01"),
    ("database specialty", "DBS-C01"),
    ("advanced networking specialty", "ANS-C01"),
    ("azure fundamentals", "AZ-900"),
    ("azure administrator", "AZ-104"),
    ("azure developer", "AZ-204"),
    ("azure solutions architect expert", "AZ-305"),
    ("azure devops engineer expert", "AZ-400"),
    ("azure security engineer", "AZ-500"),
    ("azure data engineer", "DP-203"),
    ("azure data scientist", "DP-100"),
    ("azure ai engineer", "AI-102"),
    ("certified kubernetes administrator", "CKA"),
    ("certified kubernetes application developer", "CKAD"),
    ("certified kubernetes security specialist", "CKS"),
];

const CONTENT_CERTIFICATION_RULES: &[(&str, &str)] = &[
    (r"solutions architect associate|saa.c03", "SAA-C03"),
    (r"solutions architect associate|saa.c02", "SAA-C02"),
    (r"developer associate|dva.c01", "DVA-C01"),
    (r"sysops administrator|soa.c02", "SOA-C02"),
    (r"professional data engineer|bigquery|dataflow|pub/sub", "PDE"),
    (r"professional cloud architect|gcp architect", "PCA"),
    (r"associate cloud engineer|ace", "ACE"),
    (r"azure fundamentals|az.900", "AZ-900"),
    (r"azure administrator|az.104", "AZ-104"),
    (r"azure developer|az.204", "AZ-204"),
    (r"certified kubernetes administrator|cka", "CKA"),
    (r"certified kubernetes application developer|ckad", "CKAD"),
    (r"machine learning|tensorflow|neural.network|ai", "ML-Specialty"),
];

const CATEGORY_RULES: &[(&str, &str)] = &[
    (
        r"bigquery|dataflow|dataproc|apache beam|spark|hadoop|etl|batch processing|stream processing",
        "Data Processing",
    ),
    (
        r"cloud storage|bigtable|firestore|cloud sql|spanner|data lake|warehouse",
        "Data Storage",
    ),
    (
        r"pub/sub|dataflow|cloud composer|airflow|pipeline|orchestration|workflow",
        "Data Pipeline",
    ),
    (
        r"tensorflow|ai platform|automl|vertex ai|ml|neural.network|model|training|prediction",
        "Machine Learning",
    ),
    (
        r"data studio|looker|analytics|reporting|visualization|dashboard|bi",
        "Analytics & BI",
    ),
    (
        r"database|sql|nosql|bigtable|spanner|firestore|cloud sql|mysql|postgresql",
        "Database",
    ),
    (
        r"compute engine|gke|kubernetes|app engine|cloud functions|cloud run|containers",
        "Compute",
    ),
    (
        r"iam|security|encryption|kms|service account|authentication|authorization",
        "Security & Identity",
    ),
    (
        r"vpc|network|subnet|firewall|load balancer|dns|cdn|interconnect",
        "Networking",
    ),
    (
        r"stackdriver|cloud monitoring|logging|alerting|debugging|profiler",
        "Monitoring & Operations",
    ),
    (
        r"cloud storage|persistent disk|filestore|archive|backup",
        "Storage",
    ),
    (
        r"cloud functions|cloud run|app engine|serverless|event driven",
        "Serverless",
    ),
    (
        r"cloud build|container registry|deployment|ci/cd|source repositories",
        "DevOps & CI/CD",
    ),
    (
        r"database migration service|transfer|import|export|migration",
        "Data Migration",
    ),
    (
        r"billing|cost|pricing|budget|optimization|resource management",
        "Cost Optimization",
    ),
];

const TAG_RULES: &[(&str, &str)] = &[
    (r"tensorflow", "tensorflow"),
    (r"neural.network", "neural-networks"),
    (r"overfitting|overfit", "overfitting"),
    (r"dropout|regularization", "regularization"),
    (r"machine.learning|ml", "machine-learning"),
    (r"ec2|elastic.compute", "aws-ec2"),
    (r"s3|simple.storage", "aws-s3"),
    (r"lambda|serverless", "aws-lambda"),
    (r"kubernetes|k8s", "kubernetes"),
    (r"docker|container", "docker"),
    (r"security|encryption|auth", "security"),
    (r"network|vpc|subnet", "networking"),
    (r"database|sql|nosql", "database"),
    (r"monitoring|logging|metrics", "monitoring"),
    (r"performance|optimization|scaling", "performance"),
];

const HARD_KEYWORDS: &[&str] = &["advanced", "complex", "optimize", "troubleshoot"];
const EASY_KEYWORDS: &[&str] = &["basic", "simple", "what is", "which of"];

const HARD_OPTION_COUNT: usize = 6;
const HARD_TEXT_CHARS: usize = 500;
const EASY_TEXT_CHARS: usize = 150;

const GENERAL: &str = "General";

pub(crate) struct Classifier {
    content_certifications: Vec<(Regex, &'static str)>,
    categories: Vec<(Regex, &'static str)>,
    tags: Vec<(Regex, &'static str)>,
}

impl Classifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            content_certifications: compile_rules(CONTENT_CERTIFICATION_RULES, "certification")?,
            categories: compile_rules(CATEGORY_RULES, "category")?,
            tags: compile_rules(TAG_RULES, "tag")?,
        })
    }

    pub fn classify(&self, text: &str, source_name: &str, option_count: usize) -> Classification {
        let source_name = normalize_source_name(source_name);

        Classification {
            provider: extract_provider(text, &source_name),
            certification: self.extract_certification(text, &source_name),
            category: self.extract_category(text),
            difficulty: extract_difficulty(text, option_count),
            tags: self.extract_tags(text),
        }
    }

    pub fn extract_certification(&self, text: &str, source_name: &str) -> &'static str {
        let file = source_name.to_lowercase();
        if let Some((_, code)) = FILENAME_CERTIFICATION_RULES
            .iter()
            .find(|(phrase, _)| file.contains(phrase))
        {
            return *code;
        }

        first_match(&self.content_certifications, text).unwrap_or(GENERAL)
    }

    pub fn extract_category(&self, text: &str) -> &'static str {
        first_match(&self.categories, text).unwrap_or(GENERAL)
    }

    pub fn extract_tags(&self, text: &str) -> Vec<&'static str> {
        self.tags
            .iter()
            .filter(|(pattern, _)| pattern.is_match(text))
            .map(|(_, tag)| *tag)
            .collect()
    }
}

pub(crate) fn extract_provider(text: &str, source_name: &str) -> Provider {
    let file = source_name.to_lowercase();
    if let Some(provider) = first_substring_match(FILENAME_PROVIDER_RULES, &file) {
        return provider;
    }

    let text = text.to_lowercase();
    first_substring_match(CONTENT_PROVIDER_RULES, &text).unwrap_or(Provider::General)
}

pub(crate) fn extract_difficulty(text: &str, option_count: usize) -> Difficulty {
    let text = text.to_lowercase();
    let length = text.encode_utf16().count();

    if HARD_KEYWORDS.iter().any(|keyword| text.contains(keyword))
        || option_count > HARD_OPTION_COUNT
        || length > HARD_TEXT_CHARS
    {
        return Difficulty::Hard;
    }

    if EASY_KEYWORDS.iter().any(|keyword| text.contains(keyword)) || length < EASY_TEXT_CHARS {
        return Difficulty::Easy;
    }

    Difficulty::Medium
}

/// Lowercases a file stem and folds `-`, `_`, `.` and whitespace runs into
/// single spaces so `AWS-Developer-Associate` matches "developer associate".
pub(crate) fn normalize_source_name(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut pending_space = false;

    for ch in stem.chars() {
        if matches!(ch, '-' | '_' | '.') || ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.extend(ch.to_lowercase());
    }

    out
}

fn compile_rules(
    rules: &[(&str, &'static str)],
    kind: &str,
) -> Result<Vec<(Regex, &'static str)>> {
    rules
        .iter()
        .map(|(pattern, label)| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(|regex| (regex, *label))
                .with_context(|| format!("failed to compile {kind} rule for {label}"))
        })
        .collect()
}

fn first_match(rules: &[(Regex, &'static str)], text: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, label)| *label)
}

fn first_substring_match(rules: &[(&[&str], Provider)], haystack: &str) -> Option<Provider> {
    rules
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| haystack.contains(needle)))
        .map(|(_, provider)| *provider)
}
