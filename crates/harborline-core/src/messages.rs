//! Localized canned messages for the designed non-answer branches.
//!
//! These strings are user-facing copy, not error text: empty queries,
//! off-topic redirects, empty retrieval results, and the outermost apology
//! all resolve to one of these, with the organization's contact details
//! substituted in.

use crate::models::{ContactInfo, Language};

/// Validation message for an empty or whitespace-only query.
pub fn empty_query(language: Language) -> String {
    match language {
        Language::En => "Please enter a question so I can help you.".to_string(),
        Language::Vi => "Vui lòng nhập câu hỏi để tôi có thể giúp bạn.".to_string(),
    }
}

/// Redirect for queries the relevance gate marked off-topic.
pub fn off_topic_redirect(language: Language) -> String {
    match language {
        Language::En => "I can only answer questions about Harborline Family Services — our \
                         programs, settlement support, and how to reach us. Please ask me about \
                         our services."
            .to_string(),
        Language::Vi => "Tôi chỉ có thể trả lời các câu hỏi về Harborline Family Services — các \
                         chương trình, dịch vụ định cư và cách liên hệ với chúng tôi. Vui lòng \
                         hỏi tôi về các dịch vụ của chúng tôi."
            .to_string(),
    }
}

/// Message when retrieval returned nothing usable.
pub fn no_results(language: Language, contact: &ContactInfo) -> String {
    match language {
        Language::En => format!(
            "I couldn't find specific information about that. Please contact us at {} or {} \
             for assistance.",
            contact.email, contact.phone
        ),
        Language::Vi => format!(
            "Tôi không tìm thấy thông tin cụ thể về điều đó. Vui lòng liên hệ với chúng tôi qua \
             {} hoặc {} để được hỗ trợ.",
            contact.email, contact.phone
        ),
    }
}

/// Referral used when the best grounding chunk is a bare question with no
/// answer attached.
pub fn contact_referral(language: Language, contact: &ContactInfo) -> String {
    match language {
        Language::En => format!(
            "I found information about that. Please contact us at {} or {} for details.",
            contact.email, contact.phone
        ),
        Language::Vi => format!(
            "Tôi đã tìm thấy thông tin về điều đó. Vui lòng liên hệ với chúng tôi qua {} hoặc \
             {} để biết chi tiết.",
            contact.email, contact.phone
        ),
    }
}

/// Outermost-boundary apology; raw error text never reaches the user.
pub fn apology(language: Language, contact: &ContactInfo) -> String {
    match language {
        Language::En => format!(
            "Sorry, something went wrong on our side. Please try again in a moment, or contact \
             us at {} or {}.",
            contact.email, contact.phone
        ),
        Language::Vi => format!(
            "Xin lỗi, đã xảy ra sự cố từ phía chúng tôi. Vui lòng thử lại sau, hoặc liên hệ với \
             chúng tôi qua {} hoặc {}.",
            contact.email, contact.phone
        ),
    }
}
