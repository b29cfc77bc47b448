//! Prompt assembly for article and summary generation.
//!
//! Each (language, mode) pair has its own template written in the target
//! language. A prompt is the template intro, one block per source video with
//! localized labels, then the template instructions. Transcripts are truncated
//! and, for Chinese, normalized before inclusion.

use vidsum_models::{GenerationRequest, Language, OutputMode, VideoSource};

use crate::text::{normalize_chinese, truncate_transcript};

/// A generation template: the lead-in before the source videos and the
/// instruction block after them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub intro: &'static str,
    pub instructions: &'static str,
}

/// Localized labels for the per-video blocks.
struct SourceLabels {
    title: &'static str,
    content: &'static str,
}

const EN_ARTICLE: PromptTemplate = PromptTemplate {
    intro: "Generate a comprehensive article based on the following YouTube videos:",
    instructions: "Please ensure the article:\n\
        1. Synthesizes the main ideas from all videos into one coherent narrative\n\
        2. Uses direct quotes from the transcripts where they strengthen a point\n\
        3. Has a clear introduction, body and conclusion\n\
        4. Uses headings and paragraphs for readable formatting\n\
        5. Maintains a professional yet engaging tone\n\n\
        Write the entire article in English.",
};

const EN_SUMMARY: PromptTemplate = PromptTemplate {
    intro: "Generate a concise summary of the following YouTube videos:",
    instructions: "Please ensure the summary:\n\
        1. Captures the key points of every video\n\
        2. Merges them into a single flowing text instead of a per-video list\n\
        3. Stays within a few short paragraphs\n\
        4. Maintains a neutral, informative tone\n\n\
        Write the entire summary in English.",
};

const JA_ARTICLE: PromptTemplate = PromptTemplate {
    intro: "以下のYouTube動画の内容をもとに、包括的な記事を作成してください。",
    instructions: "記事の要件:\n\
        1. すべての動画の主要なポイントを一つの首尾一貫した記事に統合すること\n\
        2. 論点を補強できる場合は文字起こしからの引用を使うこと\n\
        3. 導入、本文、結論の明確な構成を持つこと\n\
        4. 見出しと段落を使った読みやすい形式にすること\n\
        5. 専門的でありながら親しみやすい文体を保つこと\n\n\
        記事全体を必ず日本語で書いてください。",
};

const JA_SUMMARY: PromptTemplate = PromptTemplate {
    intro: "以下のYouTube動画の内容を簡潔に要約してください。",
    instructions: "要約の要件:\n\
        1. 各動画の重要なポイントを漏らさず押さえること\n\
        2. 動画ごとの箇条書きではなく、一つの流れる文章にまとめること\n\
        3. 数段落以内の簡潔な長さに収めること\n\
        4. 中立的で情報量の多い文体を保つこと\n\n\
        要約全体を必ず日本語で書いてください。",
};

const ZH_ARTICLE: PromptTemplate = PromptTemplate {
    intro: "请根据以下YouTube视频的内容，撰写一篇全面的文章。",
    instructions: "文章要求：\n\
        1. 将所有视频的核心观点整合为一篇连贯的文章\n\
        2. 在能够支撑论点时引用字幕原文\n\
        3. 包含清晰的引言、正文和结论\n\
        4. 使用标题和段落，保持良好的排版\n\
        5. 保持专业而生动的行文风格\n\n\
        请务必全文使用中文撰写，不要使用其他语言。",
};

const ZH_SUMMARY: PromptTemplate = PromptTemplate {
    intro: "请为以下YouTube视频的内容撰写一份简明摘要。",
    instructions: "摘要要求：\n\
        1. 涵盖每个视频的关键要点\n\
        2. 将要点融合为一段连贯的文字，而不是逐个视频罗列\n\
        3. 篇幅控制在几个段落以内\n\
        4. 保持客观、信息充实的风格\n\n\
        请务必全文使用中文撰写，不要使用其他语言。",
};

/// Appended to the prompt when a Chinese generation came back without any
/// Chinese characters and is retried once.
const CHINESE_RETRY_DIRECTIVE: &str =
    "\n\n重要提示：必须使用中文回答。禁止使用英文或其他任何语言。";

/// Looks up the template for a language and output mode.
pub fn template_for(language: Language, mode: OutputMode) -> PromptTemplate {
    match (language, mode) {
        (Language::En, OutputMode::Article) => EN_ARTICLE,
        (Language::En, OutputMode::Summary) => EN_SUMMARY,
        (Language::Ja, OutputMode::Article) => JA_ARTICLE,
        (Language::Ja, OutputMode::Summary) => JA_SUMMARY,
        (Language::Zh, OutputMode::Article) => ZH_ARTICLE,
        (Language::Zh, OutputMode::Summary) => ZH_SUMMARY,
    }
}

fn labels_for(language: Language) -> SourceLabels {
    match language {
        Language::En => SourceLabels { title: "Video Title: ", content: "Transcript: " },
        Language::Ja => SourceLabels { title: "動画タイトル: ", content: "文字起こし: " },
        Language::Zh => SourceLabels { title: "视频标题: ", content: "字幕内容: " },
    }
}

/// Builds the full generation prompt for a request.
///
/// Deterministic: the same request always yields the same prompt. Sources
/// appear in request order.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let template = template_for(request.language, request.mode);
    let labels = labels_for(request.language);

    let mut prompt = String::with_capacity(
        template.intro.len() + template.instructions.len() + request.sources.len() * 2048,
    );
    prompt.push_str(template.intro);
    prompt.push_str("\n\n");
    for source in &request.sources {
        let excerpt = prepare_transcript(&source.transcript, request.language);
        prompt.push_str(labels.title);
        prompt.push_str(&source.title);
        prompt.push('\n');
        prompt.push_str(labels.content);
        prompt.push_str(&excerpt);
        prompt.push_str("\n\n");
    }
    prompt.push_str(template.instructions);
    prompt
}

/// Appends the stronger language directive used for the Chinese retry.
pub fn amend_prompt_for_chinese(prompt: &str) -> String {
    format!("{prompt}{CHINESE_RETRY_DIRECTIVE}")
}

fn prepare_transcript(transcript: &str, language: Language) -> String {
    let truncated = truncate_transcript(transcript, language);
    match language {
        Language::Zh => normalize_chinese(&truncated),
        Language::Ja | Language::En => truncated,
    }
}
