use sha2::{Digest, Sha256};

use super::types::RawOption;

const OPTION_DELIMITER: &str = "|";

pub(crate) fn compute_content_hash(question_text: &str, options: &[RawOption]) -> String {
    let normalized_text = question_text.trim().to_lowercase();

    let mut normalized_options = options
        .iter()
        .map(|option| option.text.trim().to_lowercase())
        .collect::<Vec<String>>();
    // UTF-16 code unit order, not byte order.
    normalized_options.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));

    let mut hasher = Sha256::new();
    hasher.update(normalized_text.as_bytes());
    hasher.update(normalized_options.join(OPTION_DELIMITER).as_bytes());

    format!("{:x}", hasher.finalize())
}
