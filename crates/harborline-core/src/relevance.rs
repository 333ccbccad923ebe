//! Keyword relevance gate.
//!
//! Cheap admission control that runs before any embedding or search cost
//! is spent. The policy, in order:
//!
//! 1. Any off-topic keyword match (either language) → not relevant.
//! 2. Any in-domain keyword match (either language) → relevant.
//! 3. No match at all → relevant. Ambiguous queries pass through to
//!    retrieval rather than being rejected; over-answering is preferred
//!    over turning away a newcomer with an unusual phrasing.
//!
//! Matching is case-insensitive substring search over the lowercased
//! query. Both languages' lists are always consulted — a Vietnamese
//! speaker may ask about the weather while requesting English output — but
//! the requested language's lists are scanned first.

use crate::models::Language;

const OFF_TOPIC_EN: &[&str] = &[
    "weather",
    "forecast",
    "temperature outside",
    "cooking",
    "recipe",
    "restaurant",
    "movie",
    "film",
    "netflix",
    "music",
    "concert",
    "celebrity",
    "sports",
    "football",
    "soccer",
    "hockey",
    "video game",
    "lottery",
    "horoscope",
    "bitcoin",
    "crypto",
    "stock market",
    "stock price",
    "exchange rate",
    "currency",
];

const OFF_TOPIC_VI: &[&str] = &[
    "thời tiết",
    "dự báo",
    "nấu ăn",
    "công thức",
    "nhà hàng",
    "phim",
    "ca nhạc",
    "ca sĩ",
    "thể thao",
    "bóng đá",
    "xổ số",
    "tử vi",
    "chứng khoán",
    "tỷ giá",
    "tiền ảo",
];

const IN_DOMAIN_EN: &[&str] = &[
    "harborline",
    "service",
    "settlement",
    "settle",
    "immigration",
    "immigrant",
    "refugee",
    "newcomer",
    "housing",
    "shelter",
    "legal",
    "lawyer",
    "health",
    "doctor",
    "family",
    "child",
    "youth",
    "senior",
    "women",
    "employment",
    "job",
    "resume",
    "english class",
    "language class",
    "interpretation",
    "translation",
    "appointment",
    "office",
    "hours",
    "location",
    "address",
    "contact",
    "phone",
    "email",
    "volunteer",
    "donate",
    "donation",
    "program",
    "workshop",
    "counselling",
    "counseling",
    "support",
    "help",
    "assistance",
    "benefit",
    "tax clinic",
    "citizenship",
    "permanent resident",
    "work permit",
];

const IN_DOMAIN_VI: &[&str] = &[
    "dịch vụ",
    "định cư",
    "di trú",
    "nhập cư",
    "tị nạn",
    "người mới đến",
    "nhà ở",
    "pháp lý",
    "luật sư",
    "sức khỏe",
    "bác sĩ",
    "gia đình",
    "trẻ em",
    "thanh thiếu niên",
    "người cao tuổi",
    "phụ nữ",
    "việc làm",
    "lớp tiếng anh",
    "thông dịch",
    "phiên dịch",
    "cuộc hẹn",
    "văn phòng",
    "giờ làm việc",
    "địa chỉ",
    "liên hệ",
    "điện thoại",
    "tình nguyện",
    "quyên góp",
    "chương trình",
    "tư vấn",
    "hỗ trợ",
    "giúp đỡ",
    "trợ giúp",
    "quốc tịch",
    "thường trú",
    "giấy phép làm việc",
];

/// Decide whether a query is worth retrieval and generation cost.
///
/// Deterministic: identical query and language always yield the same
/// answer. An off-topic match always wins over an in-domain match.
pub fn is_relevant(query: &str, language: Language) -> bool {
    let q = query.to_lowercase();

    let (off_first, off_second, in_first, in_second) = match language {
        Language::En => (OFF_TOPIC_EN, OFF_TOPIC_VI, IN_DOMAIN_EN, IN_DOMAIN_VI),
        Language::Vi => (OFF_TOPIC_VI, OFF_TOPIC_EN, IN_DOMAIN_VI, IN_DOMAIN_EN),
    };

    if contains_any(&q, off_first) || contains_any(&q, off_second) {
        return false;
    }
    if contains_any(&q, in_first) || contains_any(&q, in_second) {
        return true;
    }
    true
}

fn contains_any(query: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| query.contains(kw))
}
