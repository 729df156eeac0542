//! Chat messages for a fusion request.
//!
//! Three axes pick the system instruction: language, agent mode and the
//! detail flag. Pitch mode has its own template per language regardless of
//! detail. Every template demands strict JSON so that
//! [`crate::normalize`] has something to recover.

use crate::models::{Agent, ChatMessage, FusionContext, Language, Role};

const ZH_FUSION_LITE: &str = "你是创意融合专家。请深入分析两个概念，理解它们的本质特征、目标用户和应用场景，然后创造性地将它们融合成一个新的、有价值的创意方案。输出严格的 JSON 格式：{\"title\": \"融合后的创意标题（要具体、有吸引力）\", \"notes\": [\"卖点：结合两个概念的核心优势，说明融合后的独特价值\", \"反共识：提出与传统认知不同的创新点\", \"最小验证：说明如何快速验证这个融合创意的可行性\", \"话术：如何向目标用户描述这个融合方案\"]}。请确保标题具体、有创意，不要使用占位符。";

const ZH_FUSION_DETAIL: &str = r#"你是资深的营销策略专家，擅长将不同领域的概念融合成可执行的营销方案。请深度分析两个概念的：
1. 核心价值主张
2. 目标用户群体
3. 应用场景
4. 差异化优势
然后创造性地融合成完整的营销方案。

输出严格的 JSON 格式（不要任何额外文字）：
{
  "title": "融合后的方案标题",
  "oneSentence": "一句话概括方案核心价值",
  "bigIdea": "核心创意理念",
  "titlesTop5": ["5个备选标题"],
  "hooksTop5": ["5个吸引人的开场话术"],
  "pipeline": ["传播渠道，如：抖音、小红书、视频号、社群等"],
  "assets": ["需要的营销素材，如：品牌主视觉、短视频脚本、海报等"],
  "sellingPoints": ["核心卖点列表"],
  "contrarianPoints": ["反共识的创新点"],
  "talkTracks": ["话术脚本"],
  "mvp": "最小可行产品描述",
  "milestones": [{"name": "里程碑名称", "desc": "描述"}],
  "kpis": [{"name": "指标名称", "target": "目标值"}],
  "notes": ["卖点", "反共识", "最小验证", "话术"]
}

请确保内容具体、可执行，避免使用占位符或模板化文字。"#;

const ZH_PITCH: &str = "你是 Pitch-Agent，专门将融合概念转化为一页式提案材料。请分析两个概念的核心价值和互补性，创造性地融合成有说服力的方案。输出严格 JSON：{\"title\":\"具体方案标题\",\"oneSentence\":\"一句话价值主张\",\"bigIdea\":\"核心创意\",\"titlesTop5\":[\"备选标题\"],\"hooksTop5\":[\"开场话术\"],\"sellingPoints\":[\"核心卖点\"],\"contrarianPoints\":[\"反共识点\"],\"talkTracks\":[\"话术\"],\"mvp\":\"最小可行方案\",\"notes\":[\"卖点\",\"反共识\",\"验证\",\"话术\"]}。内容要具体、有创意，避免占位符。";

const EN_FUSION_LITE: &str = r#"You are a creative fusion assistant. Analyze two concepts and generate innovative fusion ideas. Output strict JSON only: {"title": "Fused idea title", "notes": ["Selling point: ...", "Contrarian view: ...", "MVP validation: ...", "Talk track: ..."]}. No additional text."#;

const EN_FUSION_DETAIL: &str = r#"You are a marketing strategy expert. Create comprehensive marketing plans by fusing concepts. Output strict JSON only with fields: {"title":"...","oneSentence":"...","bigIdea":"...","titlesTop5":["..."],"hooksTop5":["..."],"pipeline":["Platform1","Platform2",...],"assets":["Asset1","Asset2",...],"sellingPoints":["..."],"contrarianPoints":["..."],"talkTracks":["..."],"mvp":"...","milestones":[{"name":"...","desc":"..."}],"kpis":[{"name":"...","target":"..."}],"notes":["Selling point: ...","Contrarian: ...","MVP: ...","Talk track: ..."]}."#;

const EN_PITCH: &str = r#"You are a Pitch-Agent. Transform fused concepts into compelling one-page pitch materials. Output strict JSON: {"title":"...","oneSentence":"...","bigIdea":"...","titlesTop5":["..."],"hooksTop5":["..."],"sellingPoints":["..."],"contrarianPoints":["..."],"talkTracks":["..."],"mvp":"...","notes":["..."]}."#;

pub fn system_instruction(language: Language, agent: Agent, detail: bool) -> &'static str {
    match (language, agent, detail) {
        (Language::Zh, Agent::Pitch, _) => ZH_PITCH,
        (Language::Zh, Agent::Fusion, true) => ZH_FUSION_DETAIL,
        (Language::Zh, Agent::Fusion, false) => ZH_FUSION_LITE,
        (Language::En, Agent::Pitch, _) => EN_PITCH,
        (Language::En, Agent::Fusion, true) => EN_FUSION_DETAIL,
        (Language::En, Agent::Fusion, false) => EN_FUSION_LITE,
    }
}

pub fn user_instruction(a: &str, b: &str, prompt: Option<&str>, language: Language) -> String {
    match language {
        Language::En => {
            let extra = prompt
                .map(|p| format!("Additional requirements: {p}"))
                .unwrap_or_default();
            format!(
                "Fuse \"{a}\" with \"{b}\".\n\n\
                 Context:\n\
                 - Concept A: {a}\n\
                 - Concept B: {b}\n\n\
                 {extra}\n\n\
                 Please create an innovative fusion that combines the strengths of both concepts. The result should be:\n\
                 - Practical and actionable\n\
                 - Unique and differentiated\n\
                 - Target user-focused\n\
                 - Value-driven\n\n\
                 Generate a creative title and comprehensive suggestions."
            )
        }
        Language::Zh => {
            let extra = prompt.map(|p| format!("额外要求：{p}")).unwrap_or_default();
            format!(
                "请将「{a}」与「{b}」这两个概念进行深度融合。\n\n\
                 概念分析：\n\
                 - {a}：请思考这个概念的核心特征、应用场景和目标用户\n\
                 - {b}：请思考这个概念的核心特征、应用场景和目标用户\n\n\
                 {extra}\n\n\
                 融合要求：\n\
                 1. 深入理解两个概念的本质，找出它们的互补性和协同点\n\
                 2. 创造性地融合成一个新的、有价值的方案\n\
                 3. 方案要具体、可执行，而不是抽象的模板\n\
                 4. 针对目标用户提供有价值的解决方案\n\n\
                 请生成一个有创意、具体的标题和详细的建议方案。"
            )
        }
    }
}

/// System message followed by user message; chat endpoints rely on that order.
pub fn build_messages(a: &str, b: &str, context: &FusionContext) -> Vec<ChatMessage> {
    let language = context.language();
    vec![
        ChatMessage {
            role: Role::System,
            content: system_instruction(language, context.agent(), context.detail()).to_string(),
        },
        ChatMessage {
            role: Role::User,
            content: user_instruction(a, b, context.prompt(), language),
        },
    ]
}
