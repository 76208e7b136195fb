use serde::{Serialize, Serializer};

use crate::models::{ChatInput, Message};

/**
 * \brief 客户端可选的助手角色；未识别的取值一律回落到 StyleAdvisor。
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatRole {
    #[default]
    StyleAdvisor,
    CitedLawAdvisor,
    Unconstrained,
}

impl ChatRole {
    /**
     * \brief 解析角色标签，兼容原有德语标签与英文别名，大小写不敏感。
     */
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "disziplinar_experte" | "cited-law-advisor" | "law-advisor" => {
                ChatRole::CitedLawAdvisor
            }
            "frei" | "unconstrained" => ChatRole::Unconstrained,
            _ => ChatRole::StyleAdvisor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::StyleAdvisor => "sprach_experte",
            ChatRole::CitedLawAdvisor => "disziplinar_experte",
            ChatRole::Unconstrained => "frei",
        }
    }
}

impl Serialize for ChatRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

pub const UNCONSTRAINED_PROMPT: &str =
    "You are a helpful assistant. Follow the user's instructions without adding style constraints.";

pub const STYLE_ADVISOR_PROMPT: &str = concat!(
    "Rolle: Sprach- und Stil-Experte für dienstliche E-Mails und Schriftverkehr in der Bundeswehr. ",
    "Aufgabe: Korrigiere Grammatik, Rechtschreibung, Zeichensetzung und Gliederung des Textes. ",
    "Ziel: formal, präzise, fehlerfrei, gut verständlich; sachlicher Ton, aktive Verben, kein überakademischer Stil. ",
    "Halte die Kernaussagen unverändert. ",
    "Antworte mit dem korrigierten Text; danach optional kurze Hinweise zu den wichtigsten Verbesserungen."
);

pub const CITED_LAW_PROMPT: &str = concat!(
    "Rolle: Berater für Disziplinar- und Beschwerderecht der Bundeswehr. ",
    "Du hast keinen Zugriff auf externe Rechtsdatenbanken. ",
    "Antworte ausschließlich auf Grundlage der Vorschriften, die der Nutzer ausdrücklich genannt hat (z. B. § / Abs. WDO, WBO, SG, WStG). ",
    "Hat der Nutzer keine konkrete Rechtsgrundlage genannt, bitte um die genaue Fundstelle; erfinde niemals Rechtsgrundlagen. ",
    "Gliedere die Antwort: (1) Kurzbewertung, (2) Begründung mit Bezug auf die genannte Vorschrift, (3) Empfehlung. ",
    "Kennzeichne Unsicherheiten; keine individuelle Rechtsberatung, nur fachliche Information."
);

pub const CITED_LAW_REMINDER: &str = "Hinweis: Antworte nur, wenn ich oben eine konkrete Rechtsgrundlage genannt habe; andernfalls frage nach der genauen Fundstelle.";

pub fn system_prompt(role: ChatRole) -> &'static str {
    match role {
        ChatRole::Unconstrained => UNCONSTRAINED_PROMPT,
        ChatRole::StyleAdvisor => STYLE_ADVISOR_PROMPT,
        ChatRole::CitedLawAdvisor => CITED_LAW_PROMPT,
    }
}

/**
 * \brief 生成 user 消息内容；法律顾问角色会在末尾附加一次引用提醒。
 */
pub fn user_content(role: ChatRole, message: &str) -> String {
    match role {
        ChatRole::CitedLawAdvisor => format!("{}\n\n{}", message, CITED_LAW_REMINDER),
        _ => message.to_string(),
    }
}

pub fn build_messages(input: &ChatInput) -> [Message; 2] {
    [
        Message::system(system_prompt(input.role)),
        Message::user(user_content(input.role, &input.message)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(role: ChatRole, message: &str) -> ChatInput {
        ChatInput {
            message: message.to_string(),
            role,
            model: "gpt-4o-mini".into(),
            temperature: 0.2,
            request_id: "r".into(),
        }
    }

    #[test]
    fn parse_accepts_wire_tags_and_aliases() {
        assert_eq!(ChatRole::parse("frei"), ChatRole::Unconstrained);
        assert_eq!(ChatRole::parse("Unconstrained"), ChatRole::Unconstrained);
        assert_eq!(ChatRole::parse("disziplinar_experte"), ChatRole::CitedLawAdvisor);
        assert_eq!(ChatRole::parse(" cited-law-advisor "), ChatRole::CitedLawAdvisor);
        assert_eq!(ChatRole::parse("sprach_experte"), ChatRole::StyleAdvisor);
        assert_eq!(ChatRole::parse("default-style-advisor"), ChatRole::StyleAdvisor);
    }

    #[test]
    fn unknown_roles_fall_back_to_style_advisor() {
        for tag in ["", "pirate", "SYSTEM", "frei2"] {
            let role = ChatRole::parse(tag);
            assert_eq!(role, ChatRole::StyleAdvisor, "tag {tag:?}");
            assert_eq!(system_prompt(role), STYLE_ADVISOR_PROMPT);
        }
    }

    #[test]
    fn cited_law_wraps_message_with_reminder_once() {
        let msg = "Gem. §10 Abs.2 WDO: Frage X";
        let [system, user] = build_messages(&input(ChatRole::CitedLawAdvisor, msg));
        assert_eq!(system.role, "system");
        assert_eq!(system.content, CITED_LAW_PROMPT);
        assert_eq!(user.role, "user");
        assert!(user.content.starts_with(msg));
        assert_eq!(user.content.matches(CITED_LAW_REMINDER).count(), 1);
        assert_eq!(user.content.matches(msg).count(), 1);
    }

    #[test]
    fn other_roles_pass_message_through() {
        let msg = "bitte korrigieren: Wir haben gestern Meeting.";
        for role in [ChatRole::StyleAdvisor, ChatRole::Unconstrained] {
            let [_, user] = build_messages(&input(role, msg));
            assert_eq!(user.content, msg);
        }
    }

    #[test]
    fn law_prompt_forbids_invented_grounds() {
        assert!(CITED_LAW_PROMPT.contains("keinen Zugriff auf externe Rechtsdatenbanken"));
        assert!(CITED_LAW_PROMPT.contains("erfinde niemals Rechtsgrundlagen"));
        assert!(CITED_LAW_PROMPT.contains("(3) Empfehlung"));
    }
}
