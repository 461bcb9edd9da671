//! The fixed voiceprint catalog.
//!
//! A voiceprint is a named response-style template injected into the system
//! prompt. The catalog owns the persona-name set the voice query parameter
//! is validated against. Lookup never fails: unknown names resolve to the
//! default voiceprint.

use sagebright_types::voice::DEFAULT_VOICE;

/// A named response-style template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voiceprint {
    pub name: &'static str,
    pub description: &'static str,
    /// Text injected into the `<voice>` section of the system prompt.
    pub injection: &'static str,
}

const VOICEPRINTS: &[Voiceprint] = &[
    Voiceprint {
        name: DEFAULT_VOICE,
        description: "Balanced, helpful onboarding guide",
        injection: "Respond in a balanced, professional tone. Be helpful and \
                    clear without being overly casual or overly formal.",
    },
    Voiceprint {
        name: "warm",
        description: "Encouraging and personable",
        injection: "Respond warmly and personably. Acknowledge how the user \
                    might be feeling during onboarding and be generous with \
                    encouragement.",
    },
    Voiceprint {
        name: "direct",
        description: "Brief and to the point",
        injection: "Respond directly and concisely. Lead with the answer, \
                    skip pleasantries, and keep responses short.",
    },
    Voiceprint {
        name: "coach",
        description: "Guiding questions over direct answers",
        injection: "Respond like a coach. Prefer guiding questions and next \
                    steps over handing out complete answers, so the user \
                    builds their own understanding.",
    },
];

/// Names of every known persona, in catalog order.
pub fn persona_names() -> &'static [&'static str] {
    // Kept in sync with VOICEPRINTS; checked by test below.
    &[DEFAULT_VOICE, "warm", "direct", "coach"]
}

/// Whether `name` names a known persona.
pub fn is_known(name: &str) -> bool {
    persona_names().contains(&name)
}

/// Look up a voiceprint by name, falling back to the default persona for
/// unknown names.
pub fn lookup(name: &str) -> &'static Voiceprint {
    VOICEPRINTS
        .iter()
        .find(|v| v.name == name)
        .unwrap_or(&VOICEPRINTS[0])
}
