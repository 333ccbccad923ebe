//! The answering service: one query in, one [`Answer`] out, infallibly.
//!
//! [`answer_query`] never returns an error and never returns an empty
//! response. The degradation ladder, in order:
//!
//! 1. empty query → validation message
//! 2. off-topic query → redirect, no retrieval cost spent
//! 3. retrieval empty → localized "couldn't find" with contact details
//! 4. generation succeeded → post-processed model text (or fallback
//!    extraction when the model returned only whitespace)
//! 5. generation failed → fallback extraction from the top retrieved chunk
//! 6. anything else went wrong → apology with contact details
//!
//! Raw error text never reaches the user; operational detail goes to
//! stderr.

use anyhow::Result;

use harborline_core::embedding::Embedder;
use harborline_core::generate::Generator;
use harborline_core::messages;
use harborline_core::models::{Answer, DocRef, Language, RetrievedDoc};
use harborline_core::postprocess::{extract_fallback, postprocess};
use harborline_core::prompt::build_prompt;
use harborline_core::relevance::is_relevant;
use harborline_core::retrieve::{assemble_context, retrieve};
use harborline_core::store::VectorStore;

use crate::config::Config;

/// Everything a running service needs, seams boxed so tests can substitute
/// in-memory stores and stub generators.
pub struct AppContext {
    pub config: Config,
    pub embedder: Box<dyn Embedder>,
    pub store: Box<dyn VectorStore>,
    pub generator: Box<dyn Generator>,
}

/// Answer a user query. Total: every input maps to a usable [`Answer`].
pub async fn answer_query(ctx: &AppContext, query: &str, language: Language) -> Answer {
    let contact = &ctx.config.contact;

    if query.trim().is_empty() {
        return canned(messages::empty_query(language));
    }
    if !is_relevant(query, language) {
        return canned(messages::off_topic_redirect(language));
    }

    match try_answer(ctx, query, language).await {
        Ok(answer) => answer,
        Err(err) => {
            eprintln!("answer pipeline failed: {err:#}");
            canned(messages::apology(language, contact))
        }
    }
}

async fn try_answer(ctx: &AppContext, query: &str, language: Language) -> Result<Answer> {
    let contact = &ctx.config.contact;

    let docs = retrieve(
        ctx.store.as_ref(),
        ctx.embedder.as_ref(),
        &ctx.config.store.collection,
        query,
        ctx.config.retrieval.top_k,
    )
    .await?;

    if docs.is_empty() {
        return Ok(canned(messages::no_results(language, contact)));
    }

    let context = assemble_context(&docs);
    let prompt = build_prompt(query, &context, language);

    let response = match ctx.generator.generate(&prompt).await {
        Ok(raw) => {
            let cleaned = postprocess(&raw);
            if cleaned.trim().is_empty() {
                postprocess(&extract_fallback(&docs[0], language, contact))
            } else {
                cleaned
            }
        }
        Err(err) => {
            eprintln!("generation failed ({err}), falling back to retrieved text");
            postprocess(&extract_fallback(&docs[0], language, contact))
        }
    };

    Ok(Answer {
        response,
        retrieved_docs: doc_refs(&docs),
        context,
    })
}

fn doc_refs(docs: &[RetrievedDoc]) -> Vec<DocRef> {
    docs.iter()
        .map(|doc| DocRef {
            source: doc.source.clone(),
            score: doc.score,
        })
        .collect()
}

fn canned(response: String) -> Answer {
    Answer {
        response,
        retrieved_docs: Vec::new(),
        context: String::new(),
    }
}
