//! Synthetic policyholders and claim notes for demos and load testing

use chrono::{NaiveDate, TimeDelta, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::Policyholder;

const MIN_AGE: u32 = 18;
const MAX_AGE: u32 = 99;
const POLICY_HISTORY_DAYS: i64 = 5 * 365;
const INCIDENT_HISTORY_DAYS: i64 = 2 * 365;
const MIN_POLICY_AMOUNT: f64 = 90_000.0;
const MAX_POLICY_AMOUNT: f64 = 900_000.0;
const OUTLIER_PROBABILITY: f64 = 0.1;

const FIRST_NAMES: &[&str] = &[
    "Olivia", "Liam", "Emma", "Noah", "Ava", "Mateo", "Sofia", "Lucas", "Amara", "Kenji", "Priya",
    "Elena", "Omar", "Grace", "Hugo", "Nadia",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Garcia", "Okafor", "Nguyen", "Johansson", "Patel", "Rossi", "Kim", "Müller", "Dubois",
    "Haddad", "Walsh", "Tanaka", "Silva",
];

/// Incident type, its sentence bank and its usual claim amount range
struct IncidentType {
    category: &'static str,
    sentences: &'static [&'static str],
    amount_range: (f64, f64),
}

const INCIDENT_TYPES: &[IncidentType] = &[
    IncidentType {
        category: "Water Damage",
        sentences: &[
            "Significant water leakage in the basement.",
            "Pipe burst in the bathroom, causing floor damage.",
            "Flooding from the washing machine soaked the hallway carpet.",
        ],
        amount_range: (3_000.0, 20_000.0),
    },
    IncidentType {
        category: "Fire Damage",
        sentences: &[
            "Kitchen fire damaged appliances and cabinets.",
            "Electrical fault caused a small fire in the living room.",
            "Smoke damage throughout the upper floor after a chimney fire.",
        ],
        amount_range: (10_000.0, 50_000.0),
    },
    IncidentType {
        category: "Theft/Burglary",
        sentences: &[
            "Break-in through the back door, electronics stolen.",
            "Jewelry and a laptop were stolen while the family was away.",
        ],
        amount_range: (1_000.0, 15_000.0),
    },
    IncidentType {
        category: "Auto Accident",
        sentences: &[
            "Rear-end collision at a traffic light, bumper and trunk damaged.",
            "Vehicle damage from a side impact in a parking lot.",
        ],
        amount_range: (2_000.0, 25_000.0),
    },
    IncidentType {
        category: "Natural Disaster",
        sentences: &[
            "Storm winds tore shingles off the roof.",
            "Hurricane flooding reached the ground floor.",
        ],
        amount_range: (15_000.0, 80_000.0),
    },
];

/// Produces free-text claim notes
pub trait NoteGenerator: Send + Sync {
    fn generate_note(&self, policyholder_id: &str) -> String;
}

/// Builds notes from a fixed sentence bank with randomized dates and amounts
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateNoteGenerator;

impl NoteGenerator for TemplateNoteGenerator {
    fn generate_note(&self, policyholder_id: &str) -> String {
        let mut rng = rand::thread_rng();

        let incident = &INCIDENT_TYPES[rng.gen_range(0..INCIDENT_TYPES.len())];
        let detail = incident.sentences.choose(&mut rng).copied().unwrap_or_default();
        let incident_date = random_past_date(&mut rng, INCIDENT_HISTORY_DAYS);
        let amount = claim_amount(&mut rng, incident.amount_range);

        let mut note = format!(
            "{incident_date} - Claim by {name}.\n\
             Policyholder ID: {policyholder_id}\n\
             Category: {category}\n\
             Details: {detail}\n\
             Estimated Claim Amount: ${amount:.2}\n",
            name = random_name(&mut rng),
            category = incident.category,
        );

        if amount > incident.amount_range.1 {
            note.push_str("Note: High claim amount - requires additional review.\n");
        }
        note
    }
}

/// Build one random policyholder
pub fn generate_policyholder() -> Policyholder {
    let mut rng = rand::thread_rng();
    Policyholder {
        id: uuid::Uuid::new_v4().to_string(),
        name: random_name(&mut rng),
        age: rng.gen_range(MIN_AGE..=MAX_AGE),
        policy_start_date: random_past_date(&mut rng, POLICY_HISTORY_DAYS)
            .format("%Y-%m-%d")
            .to_string(),
        policy_amount: round_cents(rng.gen_range(MIN_POLICY_AMOUNT..=MAX_POLICY_AMOUNT)),
    }
}

/// Claim amount for a category range
///
/// Usually lands in the range, clustered around its middle. One claim in ten is
/// an outlier: half of those between 1.5x and 3x the max, the rest between a
/// third of the min and the min.
fn claim_amount<R: Rng>(rng: &mut R, (min, max): (f64, f64)) -> f64 {
    let amount = if rng.gen_bool(OUTLIER_PROBABILITY) {
        if rng.gen_bool(0.5) {
            rng.gen_range(max * 1.5..=max * 3.0)
        } else {
            rng.gen_range(min / 3.0..=min)
        }
    } else {
        let samples: f64 = (0..3).map(|_| rng.gen_range(min..=max)).sum();
        samples / 3.0
    };
    round_cents(amount)
}

fn random_name<R: Rng>(rng: &mut R) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Doe");
    format!("{first} {last}")
}

fn random_past_date<R: Rng>(rng: &mut R, max_days_ago: i64) -> NaiveDate {
    let today = Utc::now().date_naive();
    today - TimeDelta::days(rng.gen_range(0..=max_days_ago))
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
