//! Prompts for claim categorization and note elaboration

/// Which categorization prompt to send
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptVariant {
    /// Short extraction instruction
    #[default]
    Terse,
    /// Extraction instruction with per-category keyword hints
    Guided,
}

impl PromptVariant {
    pub fn from_better_prompt(better_prompt: bool) -> Self {
        if better_prompt {
            PromptVariant::Guided
        } else {
            PromptVariant::Terse
        }
    }
}

/// Category names with the keywords that point to them
pub const CATEGORY_GUIDELINES: &[(&str, &[&str])] = &[
    ("Water Damage", &["pipe burst", "flooding", "leakage"]),
    ("Fire Damage", &["fire", "burned", "smoke damage"]),
    ("Theft/Burglary", &["theft", "stolen", "break-in"]),
    ("Auto Accident", &["car crash", "vehicle damage", "collision"]),
    ("Natural Disaster", &["storm", "earthquake", "hurricane"]),
    ("Health/Medical", &["medical care", "hospitalization", "health treatment"]),
    ("Liability Claims", &["legal liability", "personal injury", "property damage"]),
];

/// Build the categorization prompt for one piece of claim text
pub fn build_categorization_prompt(claim_text: &str, variant: PromptVariant) -> String {
    match variant {
        PromptVariant::Terse => format!(
            "Please extract the Claim Amount, Claims Category, Date, and Policyholder ID from the following text. Please structure data in JSON: '{claim_text}'"
        ),
        PromptVariant::Guided => {
            let guidelines: String = CATEGORY_GUIDELINES
                .iter()
                .map(|(category, keywords)| {
                    let quoted: Vec<String> = keywords.iter().map(|k| format!("'{k}'")).collect();
                    format!("- {category}: Look for keywords like {}.\n", quoted.join(", "))
                })
                .collect();

            format!(
                "Please extract the Claim Amount, Claims Category, Date, and Policyholder ID from the following text, structuring the data in JSON format. For categorization, use these guidelines:\n\n\
                 {guidelines}\n\
                 Example text for extraction:\n'{claim_text}'.\n\n\
                 If uncertain about the category, suggest the most likely one and confirm. For unique incidents, provide your best judgment on categorization based on these guidelines."
            )
        }
    }
}

/// Build the prompt that turns a brief note into an adjuster-style note
pub fn build_elaboration_prompt(note: &str) -> String {
    format!(
        "Please transform this brief note into a more detailed claim adjuster's note. Focus on the date, the type of damage, and the details of the claim. Keep it factual and under three sentences. Here's the note: {note} Please elaborate on the incident, ensuring it reads naturally stick to the facts and number provided."
    )
}
