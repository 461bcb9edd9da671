//! System prompt and request builder for the Sage assistant.
//!
//! Assembles the system prompt from org/user context plus the selected
//! voiceprint, using XML tag boundaries for clear section delineation, and
//! builds the complete completion request deterministically: the same
//! inputs always produce the same payload.
//!
//! Layout:
//! ```text
//! <voice>{voiceprint injection}</voice>
//! <organization>Name: ... Id: ...</organization>
//! <user>Role: ...</user>
//! <instructions>You are Sage, Sagebright's onboarding assistant...</instructions>
//! ```

use sagebright_types::config::LlmSettings;
use sagebright_types::org::OrgRef;
use sagebright_types::sage::{SagePromptMessage, SageRequest, SageRole};
use sagebright_types::user::User;
use sagebright_types::voice::VoiceSelection;

use crate::prompt::voiceprint;

/// The context a prompt is personalized from.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub org: Option<OrgRef>,
    pub user: Option<User>,
}

impl PromptContext {
    /// Build a context from an auth snapshot.
    pub fn from_snapshot(snapshot: &sagebright_types::session::AuthSnapshot) -> Self {
        Self {
            org: snapshot.org.clone(),
            user: snapshot.user.clone(),
        }
    }
}

/// Builds system prompts and completion requests.
pub struct PromptAssembler {
    settings: LlmSettings,
}

impl PromptAssembler {
    pub fn new(settings: LlmSettings) -> Self {
        Self { settings }
    }

    /// Assemble the system prompt for the given context and voice.
    ///
    /// Unknown voices resolve to the default voiceprint; empty context
    /// sections are omitted.
    pub fn build_system_prompt(&self, context: &PromptContext, voice: &VoiceSelection) -> String {
        let voiceprint = voiceprint::lookup(voice.resolved_name());
        let mut sections = Vec::with_capacity(4);

        sections.push(format!("<voice>\n{}\n</voice>", voiceprint.injection));

        if let Some(org) = &context.org {
            sections.push(format!(
                "<organization>\nName: {}\nId: {}\n</organization>",
                org.slug, org.id
            ));
        }

        if let Some(user) = &context.user {
            sections.push(format!("<user>\nRole: {}\n</user>", user.role));
        }

        sections.push(
            "<instructions>\n\
             You are Sage, Sagebright's onboarding assistant.\n\
             Ground every answer in the organization context above.\n\
             Keep the selected voice consistently through the response.\n\
             When you don't know something about this organization, say so \
             rather than guessing.\n\
             </instructions>"
                .to_string(),
        );

        sections.join("\n\n")
    }

    /// Build the complete completion request for one user message.
    pub fn build_request(
        &self,
        context: &PromptContext,
        voice: &VoiceSelection,
        user_content: &str,
    ) -> SageRequest {
        SageRequest {
            model: self.settings.model.clone(),
            messages: vec![
                SagePromptMessage {
                    role: SageRole::System,
                    content: self.build_system_prompt(context, voice),
                },
                SagePromptMessage {
                    role: SageRole::User,
                    content: user_content.to_string(),
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            voice_injection: voice.resolved_name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagebright_types::org::OrgId;
    use sagebright_types::user::{UserId, UserMetadata, UserRole};
    use sagebright_types::voice::DEFAULT_VOICE;

    fn assembler() -> PromptAssembler {
        PromptAssembler::new(LlmSettings::default())
    }

    fn full_context() -> PromptContext {
        PromptContext {
            org: Some(OrgRef {
                id: OrgId::from("org_01"),
                slug: "acme".to_string(),
            }),
            user: Some(User {
                id: UserId::new(),
                role: UserRole::Employee,
                metadata: UserMetadata::default(),
            }),
        }
    }

    #[test]
    fn test_full_prompt_has_all_sections() {
        let prompt = assembler().build_system_prompt(
            &full_context(),
            &VoiceSelection::Named { name: "warm".to_string() },
        );

        assert!(prompt.contains("<voice>"));
        assert!(prompt.contains("</voice>"));
        assert!(prompt.contains("warmly"));
        assert!(prompt.contains("<organization>"));
        assert!(prompt.contains("Name: acme"));
        assert!(prompt.contains("Id: org_01"));
        assert!(prompt.contains("<user>"));
        assert!(prompt.contains("Role: employee"));
        assert!(prompt.contains("<instructions>"));
        assert!(prompt.contains("You are Sage"));
    }

    #[test]
    fn test_empty_context_omits_sections() {
        let prompt = assembler()
            .build_system_prompt(&PromptContext::default(), &VoiceSelection::Default);
        assert!(prompt.contains("<voice>"));
        assert!(!prompt.contains("<organization>"));
        assert!(!prompt.contains("<user>"));
        assert!(prompt.contains("<instructions>"));
    }

    #[test]
    fn test_unknown_voice_uses_default_voiceprint() {
        let unknown = VoiceSelection::Unknown { requested: "pirate".to_string() };
        let prompt = assembler().build_system_prompt(&full_context(), &unknown);
        let default_prompt = assembler()
            .build_system_prompt(&full_context(), &VoiceSelection::Default);

        // Same voiceprint text as the default persona; the unknown name
        // appears nowhere.
        assert_eq!(prompt, default_prompt);
        assert!(!prompt.contains("pirate"));
    }

    #[test]
    fn test_request_shape_and_determinism() {
        let context = full_context();
        let voice = VoiceSelection::Named { name: "direct".to_string() };

        let a = assembler().build_request(&context, &voice, "What benefits do I get?");
        let b = assembler().build_request(&context, &voice, "What benefits do I get?");
        assert_eq!(a, b);

        assert_eq!(a.model, LlmSettings::default().model);
        assert_eq!(a.messages.len(), 2);
        assert_eq!(a.messages[0].role, SageRole::System);
        assert_eq!(a.messages[1].role, SageRole::User);
        assert_eq!(a.messages[1].content, "What benefits do I get?");
        assert_eq!(a.voice_injection, "direct");
    }

    #[test]
    fn test_request_with_unknown_voice_injects_default_name() {
        let request = assembler().build_request(
            &full_context(),
            &VoiceSelection::Unknown { requested: "pirate".to_string() },
            "hi",
        );
        assert_eq!(request.voice_injection, DEFAULT_VOICE);
    }
}
