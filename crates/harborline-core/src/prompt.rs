//! Prompt construction for the language-model gateway.
//!
//! Two fixed instructional templates, selected by language, embed the
//! retrieved context verbatim. The wording is part of the contract with
//! the downstream model: answer only from context, never invent contact
//! details, keep phone numbers literal, bullet lists with `•`, no markup,
//! and never echo the question back.

use crate::models::Language;

/// Build the full generation prompt for a query and its assembled context.
pub fn build_prompt(query: &str, context: &str, language: Language) -> String {
    match language {
        Language::En => format!(
            "You are a helpful assistant for Harborline Family Services, a non-profit \
             organization helping refugees and immigrants in Toronto.\n\
             \n\
             Use the following context to answer the user's question. Be concise, helpful, and \
             accurate.\n\
             \n\
             IMPORTANT INSTRUCTIONS:\n\
             - Answer only from the context below — if the context does not contain the answer, \
             say so and suggest contacting the office\n\
             - Never invent phone numbers, emails, or addresses; copy contact details exactly as \
             they appear in the context\n\
             - Answer the question directly — DO NOT repeat or rephrase the question\n\
             - Use bullet points (•) when listing multiple items, services, or options\n\
             - Keep paragraphs short and easy to read, with line breaks between sections\n\
             - Do not use HTML or any other markup\n\
             \n\
             CONTEXT:\n\
             {context}\n\
             \n\
             USER QUESTION: {query}\n\
             \n\
             ANSWER (start directly with the answer, do not repeat the question):"
        ),
        Language::Vi => format!(
            "Bạn là trợ lý của Harborline Family Services, một tổ chức phi lợi nhuận giúp đỡ \
             người tị nạn và người nhập cư tại Toronto.\n\
             \n\
             Hãy dùng ngữ cảnh dưới đây để trả lời câu hỏi. Trả lời ngắn gọn, hữu ích và chính \
             xác, bằng tiếng Việt.\n\
             \n\
             HƯỚNG DẪN QUAN TRỌNG:\n\
             - Chỉ trả lời dựa trên ngữ cảnh bên dưới — nếu ngữ cảnh không có câu trả lời, hãy \
             nói rõ và đề nghị liên hệ văn phòng\n\
             - Không bao giờ tự bịa số điện thoại, email hay địa chỉ; sao chép thông tin liên hệ \
             đúng như trong ngữ cảnh\n\
             - Trả lời thẳng vào câu hỏi — KHÔNG lặp lại hay diễn đạt lại câu hỏi\n\
             - Dùng dấu đầu dòng (•) khi liệt kê nhiều mục, dịch vụ hoặc lựa chọn\n\
             - Giữ đoạn văn ngắn gọn, dễ đọc, có xuống dòng giữa các phần\n\
             - Không dùng HTML hay bất kỳ định dạng đánh dấu nào\n\
             \n\
             NGỮ CẢNH:\n\
             {context}\n\
             \n\
             CÂU HỎI: {query}\n\
             \n\
             TRẢ LỜI (bắt đầu ngay với câu trả lời, không lặp lại câu hỏi):"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_and_query_embedded_verbatim() {
        let context = "[Document 1] (Source: org.json, Score: 0.912)\nHours: 9am-5pm\n";
        let prompt = build_prompt("What are your hours?", context, Language::En);
        assert!(prompt.contains(context));
        assert!(prompt.contains("USER QUESTION: What are your hours?"));
    }

    #[test]
    fn test_template_selected_by_language() {
        let en = build_prompt("q", "ctx", Language::En);
        let vi = build_prompt("q", "ctx", Language::Vi);
        assert!(en.contains("IMPORTANT INSTRUCTIONS"));
        assert!(vi.contains("HƯỚNG DẪN QUAN TRỌNG"));
        assert_ne!(en, vi);
    }

    #[test]
    fn test_grounding_instructions_present() {
        let prompt = build_prompt("q", "ctx", Language::En);
        assert!(prompt.contains("only from the context"));
        assert!(prompt.contains("Never invent phone numbers"));
    }
}
